//! Snapshot identifiers and their Kosli URLs

use crate::{CoreError, Result};

pub const KOSLI_APP_URL: &str = "https://app.kosli.com";

/// A `snapshot_id` split into environment name and sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRef<'a> {
    pub env: &'a str,
    pub sequence: &'a str,
}

impl<'a> SnapshotRef<'a> {
    pub fn parse(snapshot_id: &'a str) -> Result<Self> {
        match snapshot_id.split_once('#') {
            Some((env, sequence)) if !env.is_empty() && !sequence.is_empty() => {
                Ok(Self { env, sequence })
            }
            _ => Err(CoreError::InvalidSnapshotId(snapshot_id.to_string())),
        }
    }

    /// Browsable URL of this snapshot, focused on one artifact
    pub fn url(&self, org: &str, fingerprint: &str) -> String {
        format!(
            "{KOSLI_APP_URL}/{org}/environments/{}/snapshots/{}?fingerprint={fingerprint}",
            self.env, self.sequence
        )
    }
}
