//! Core domain models and logic for promotions
//!
//! This crate contains:
//! - Domain models (Diff, Snapshot, Artifact)
//! - Commit URL parsing and CI provenance detection
//! - The blue-green guard and the promotion resolver
//! - Annotation side-file generation

pub mod annotate;
pub mod error;
pub mod guard;
pub mod model;
pub mod provenance;
pub mod record;
pub mod resolve;
pub mod snapshot;

pub use annotate::{annotation_line, annotation_tokens, write_annotations};
pub use error::{CoreError, Result};
pub use model::{Artifact, ArtifactList, Diff, FlowRef, Snapshot};
pub use provenance::{CiSystem, CommitRef};
pub use record::{NormalizedArtifact, PromotionRecord, Side, SnapshotInfo};
pub use resolve::{ResolvePolicy, Resolver};
pub use snapshot::SnapshotRef;
