pub use checkrelay_core as core;
pub use checkrelay_github as github;
pub use checkrelay_publisher as publisher;

pub use checkrelay_core::{
    CheckConclusion, CheckRunContext, CheckRunRequest, CheckStatus, PolicyConfig,
    StatusChecksProperties, should_publish,
};
pub use checkrelay_github::{GithubCredentials, GithubSessionProvider};
pub use checkrelay_publisher::{ChecksPublisher, PublishOutcome, PublisherConfig};
