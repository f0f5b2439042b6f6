use thiserror::Error;

/// Exit status for conditions that make promotion unsafe.
pub const UNSAFE_PROMOTION_EXIT_CODE: i32 = 42;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("A blue-green deployment is in progress in {env_id} for [{}]", .flows.join(", "))]
    BlueGreenDeployment { env_id: String, flows: Vec<String> },

    #[error("In Flow {flow} repo_url entries are different ({incoming_repo_url} vs {outgoing_repo_url})")]
    RepoMismatch {
        flow: String,
        incoming_repo_url: String,
        outgoing_repo_url: String,
    },

    #[error("Unknown CI provenance for commit_url: {0}")]
    UnknownProvenance(String),

    #[error("Malformed commit_url: {0}")]
    MalformedCommitUrl(String),

    #[error("Invalid snapshot_id (expected env#sequence): {0}")]
    InvalidSnapshotId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Process exit code this error maps to.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::BlueGreenDeployment { .. } | CoreError::RepoMismatch { .. } => {
                UNSAFE_PROMOTION_EXIT_CODE
            }
            _ => 1,
        }
    }

    /// Human-readable diagnostic lines, without the `ERROR:` prefix.
    pub fn diagnostics(&self) -> Vec<String> {
        match self {
            CoreError::BlueGreenDeployment { env_id, flows } => vec![
                format!("A blue-green deployment is in progress in {env_id}"),
                format!("For [{}]", flows.join(", ")),
            ],
            CoreError::RepoMismatch {
                flow,
                incoming_repo_url,
                outgoing_repo_url,
            } => vec![
                format!("In Flow {flow} repo_url entries are different."),
                format!("Incoming repo_url={incoming_repo_url}"),
                format!("Outgoing repo_url={outgoing_repo_url}"),
            ],
            other => vec![other.to_string()],
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
