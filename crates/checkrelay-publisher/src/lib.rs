pub mod error;
pub mod log;
pub mod membership;
pub mod publisher;
pub mod reconciler;

// Re-export commonly used types
pub use error::{PublishError, PublishResult};
pub use log::{BuildLog, ConsoleBuildLog, TracingBuildLog, sanitize_log_line};
pub use membership::MembershipResolver;
pub use publisher::{ChecksPublisher, PublishOutcome, PublisherConfig, SkipReason};
pub use reconciler::{CheckRunReconciler, Reconciled};
