//! Input document model: the environment diff produced by the fleet-diffing CLI

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::Result;

/// A deployed artifact as reported in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Image reference, e.g. `registry/saver:6e191a0@sha256:...`
    pub name: String,
    pub fingerprint: String,
    pub flow: String,
    pub commit_url: String,
}

/// Point-in-time artifact inventory of one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// `{env}#{sequence}`
    pub snapshot_id: String,
    pub artifacts: Vec<Artifact>,
}

/// Only the flow name of an artifact is needed from the common lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    pub flow: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactList {
    pub artifacts: Vec<FlowRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    /// Incoming environment
    pub snappish1: Snapshot,
    /// Outgoing environment
    pub snappish2: Snapshot,
    pub changed: ArtifactList,
    #[serde(rename = "not-changed")]
    pub not_changed: ArtifactList,
}

impl Diff {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn incoming(&self) -> &Snapshot {
        &self.snappish1
    }

    pub fn outgoing(&self) -> &Snapshot {
        &self.snappish2
    }

    /// Flow names of artifacts present in both environments, changed first
    pub fn common_flows(&self) -> impl Iterator<Item = &str> {
        self.changed
            .artifacts
            .iter()
            .chain(self.not_changed.artifacts.iter())
            .map(|a| a.flow.as_str())
    }
}

impl Snapshot {
    pub fn flows(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|a| a.flow.as_str())
    }
}
