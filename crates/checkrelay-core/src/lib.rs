pub mod context;
pub mod error;
pub mod policy;
pub mod properties;
pub mod reconcile;
pub mod record;
pub mod request;

// Re-export commonly used types
pub use context::CheckRunContext;
pub use error::{CoreError, CoreResult, RecordError};
pub use policy::{PolicyConfig, should_publish};
pub use properties::{BuildResult, StatusChecksProperties};
pub use reconcile::{CheckRunOperation, CheckRunPayload, OperationKind, build_payload, plan_operation};
pub use record::{InMemoryPublishRecord, JsonFilePublishRecord, PublishRecord};
pub use request::{
    CheckConclusion, CheckRunAction, CheckRunId, CheckRunOutput, CheckRunRequest, CheckStatus,
};
