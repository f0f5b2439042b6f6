//! Annotation side-file
//!
//! The CI job that fans out over the promotion records also wants each diff
//! URL attached to its deployment as a shell flag.

use std::path::Path;

use tracing::debug;

use crate::{PromotionRecord, Result};

/// Default location of the side-file, relative to the working directory
pub const DEFAULT_ANNOTATIONS_PATH: &str = "all-annotations.txt";

/// One `--annotate "<repo>_diff_URL=<url>"` token per record
pub fn annotation_tokens(records: &[PromotionRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "--annotate \"{}_diff_URL={}\"",
                r.incoming.repo_name, r.deployment_diff_url
            )
        })
        .collect()
}

pub fn annotation_line(records: &[PromotionRecord]) -> String {
    annotation_tokens(records).join(" ")
}

pub fn write_annotations(path: &Path, records: &[PromotionRecord]) -> Result<()> {
    std::fs::write(path, annotation_line(records))?;
    debug!(path = %path.display(), count = records.len(), "Wrote annotations");
    Ok(())
}
