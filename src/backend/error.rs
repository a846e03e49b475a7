use crate::backend::{
    actions::ActionKind, artifact::ArtifactError, client::ClientError, storage::StorageError,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("deployment failure: {0}")]
    DeploymentFailure(ClientError),
    #[error("role resolution failure: {0}")]
    RoleResolutionFailure(ClientError),
    #[error("{kind} failed: {source}")]
    ActionFailure {
        kind: ActionKind,
        source: ClientError,
    },
    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("contract artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("invalid contract ABI: {0}")]
    InvalidAbi(#[from] serde_json::Error),
}
