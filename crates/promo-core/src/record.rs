//! Promotion records
//!
//! A record is serialized as one flat JSON object. Artifact fields carry an
//! `incoming_` or `outgoing_` prefix so the downstream job matrix can address
//! them directly.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{Artifact, CiSystem, CommitRef, Result};

/// Which environment an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Incoming,
    Outgoing,
}

impl Side {
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Incoming => "incoming",
            Side::Outgoing => "outgoing",
        }
    }
}

/// Artifact with its commit URL broken into parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedArtifact {
    pub image_name: String,
    pub fingerprint: String,
    pub repo_url: String,
    pub repo_name: String,
    pub commit_sha: String,
    pub flow: String,
    pub ci_system: Option<CiSystem>,
}

impl NormalizedArtifact {
    pub fn from_artifact(artifact: &Artifact) -> Result<Self> {
        let commit = CommitRef::parse(&artifact.commit_url)?;
        Ok(Self {
            image_name: artifact.name.clone(),
            fingerprint: artifact.fingerprint.clone(),
            repo_url: commit.repo_url,
            repo_name: commit.repo_name,
            commit_sha: commit.commit_sha,
            flow: artifact.flow.clone(),
            ci_system: Some(commit.ci_system),
        })
    }

    /// Stand-in for an artifact with no counterpart: every field empty
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.flow.is_empty()
    }

    fn serialize_fields<M: SerializeMap>(&self, side: Side, map: &mut M) -> std::result::Result<(), M::Error> {
        let prefix = side.prefix();
        let ci_system = self.ci_system.map(|ci| ci.as_str()).unwrap_or("");
        let fields = [
            ("image_name", self.image_name.as_str()),
            ("fingerprint", self.fingerprint.as_str()),
            ("repo_url", self.repo_url.as_str()),
            ("repo_name", self.repo_name.as_str()),
            ("commit_sha", self.commit_sha.as_str()),
            ("flow", self.flow.as_str()),
            ("ci_system", ci_system),
        ];
        for (key, value) in fields {
            map.serialize_entry(&format!("{prefix}_{key}"), value)?;
        }
        Ok(())
    }
}

/// Where the artifacts were observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub incoming_snapshot_id: String,
    pub incoming_snapshot_url: String,
    pub outgoing_snapshot_id: String,
}

/// One flow to promote from the incoming to the outgoing environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRecord {
    pub snapshot: SnapshotInfo,
    pub incoming: NormalizedArtifact,
    pub outgoing: NormalizedArtifact,
    pub deployment_diff_url: String,
}

impl PromotionRecord {
    /// True when the flow has never been deployed to the outgoing environment
    pub fn is_new(&self) -> bool {
        self.outgoing.is_blank()
    }
}

impl Serialize for PromotionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(18))?;
        map.serialize_entry("incoming_snapshot_id", &self.snapshot.incoming_snapshot_id)?;
        map.serialize_entry("incoming_snapshot_url", &self.snapshot.incoming_snapshot_url)?;
        map.serialize_entry("outgoing_snapshot_id", &self.snapshot.outgoing_snapshot_id)?;
        self.incoming.serialize_fields(Side::Incoming, &mut map)?;
        self.outgoing.serialize_fields(Side::Outgoing, &mut map)?;
        map.serialize_entry("deployment_diff_url", &self.deployment_diff_url)?;
        map.end()
    }
}
