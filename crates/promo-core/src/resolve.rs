//! Promotion resolver
//!
//! Turns an environment diff into one [`PromotionRecord`] per incoming flow.
//! The pipeline is fail-fast: either every record is produced or an error is
//! returned and nothing is emitted.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::{
    CoreError, Diff, NormalizedArtifact, PromotionRecord, Result, SnapshotInfo, SnapshotRef,
    guard,
};

/// Default Kosli organisation used in snapshot URLs
pub const DEFAULT_KOSLI_ORG: &str = "cyber-dojo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePolicy {
    pub kosli_org: String,
    /// Flows dropped from both environments before matching
    pub excluded_flows: BTreeSet<String>,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            kosli_org: DEFAULT_KOSLI_ORG.to_string(),
            excluded_flows: BTreeSet::new(),
        }
    }
}

impl ResolvePolicy {
    pub fn is_excluded(&self, flow: &str) -> bool {
        self.excluded_flows.contains(flow)
    }
}

pub struct Resolver {
    policy: ResolvePolicy,
}

impl Resolver {
    pub fn new(policy: ResolvePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ResolvePolicy {
        &self.policy
    }

    pub fn resolve(&self, diff: &Diff) -> Result<Vec<PromotionRecord>> {
        // 1. Refuse environments that are mid blue-green deployment
        guard::check_diff(diff)?;

        let incoming = diff.incoming();
        let outgoing = diff.outgoing();

        // 2. Index the outgoing environment by flow; normalized only when matched
        let mut outgoing_by_flow = HashMap::new();
        for artifact in &outgoing.artifacts {
            if self.policy.is_excluded(&artifact.flow) {
                warn!(flow = %artifact.flow, env = %outgoing.snapshot_id, "Skipping excluded flow");
                continue;
            }
            outgoing_by_flow.insert(artifact.flow.as_str(), artifact);
        }

        // 3. Match each incoming flow and compute its diff URL
        let mut records = Vec::with_capacity(incoming.artifacts.len());
        for artifact in &incoming.artifacts {
            if self.policy.is_excluded(&artifact.flow) {
                warn!(flow = %artifact.flow, env = %incoming.snapshot_id, "Skipping excluded flow");
                continue;
            }
            let incoming_artifact = NormalizedArtifact::from_artifact(artifact)?;
            let outgoing_artifact = match outgoing_by_flow.remove(artifact.flow.as_str()) {
                Some(matched) => NormalizedArtifact::from_artifact(matched)?,
                None => NormalizedArtifact::blank(),
            };

            let deployment_diff_url = deployment_diff_url(&incoming_artifact, &outgoing_artifact)?;
            debug!(flow = %artifact.flow, url = %deployment_diff_url, "Resolved promotion");

            let snapshot = SnapshotRef::parse(&incoming.snapshot_id)?;

            records.push(PromotionRecord {
                snapshot: SnapshotInfo {
                    incoming_snapshot_id: incoming.snapshot_id.clone(),
                    incoming_snapshot_url: snapshot
                        .url(&self.policy.kosli_org, &artifact.fingerprint),
                    outgoing_snapshot_id: outgoing.snapshot_id.clone(),
                },
                incoming: incoming_artifact,
                outgoing: outgoing_artifact,
                deployment_diff_url,
            });
        }

        info!(
            incoming = %incoming.snapshot_id,
            outgoing = %outgoing.snapshot_id,
            records = records.len(),
            "Resolved promotions"
        );
        Ok(records)
    }
}

/// URL showing what promoting `incoming` over `outgoing` would change
pub fn deployment_diff_url(
    incoming: &NormalizedArtifact,
    outgoing: &NormalizedArtifact,
) -> Result<String> {
    if outgoing.is_blank() {
        return Ok(format!("{}/commit/{}", incoming.repo_url, incoming.commit_sha));
    }

    if incoming.repo_url != outgoing.repo_url {
        return Err(CoreError::RepoMismatch {
            flow: incoming.flow.clone(),
            incoming_repo_url: incoming.repo_url.clone(),
            outgoing_repo_url: outgoing.repo_url.clone(),
        });
    }

    debug_assert_eq!(incoming.flow, outgoing.flow);
    Ok(format!(
        "{}/compare/{}...{}",
        incoming.repo_url, outgoing.commit_sha, incoming.commit_sha
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Artifact, ArtifactList, FlowRef, Snapshot};

    const SHA_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const SHA_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn artifact(flow: &str, repo: &str, sha: &str) -> Artifact {
        Artifact {
            name: format!("img:{flow}"),
            fingerprint: format!("fp-{flow}-{}", &sha[..4]),
            flow: flow.to_string(),
            commit_url: format!("{repo}/commit/{sha}"),
        }
    }

    fn diff(incoming: Vec<Artifact>, outgoing: Vec<Artifact>) -> Diff {
        Diff {
            snappish1: Snapshot {
                snapshot_id: "aws-beta#5081".to_string(),
                artifacts: incoming,
            },
            snappish2: Snapshot {
                snapshot_id: "aws-prod#3699".to_string(),
                artifacts: outgoing,
            },
            changed: ArtifactList { artifacts: vec![] },
            not_changed: ArtifactList { artifacts: vec![] },
        }
    }

    #[test]
    fn test_new_artifact_gets_commit_url() {
        let d = diff(
            vec![artifact("nginx-ci", "https://github.com/org/nginx", SHA_A)],
            vec![],
        );
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert!(r.is_new());
        assert_eq!(r.outgoing.flow, "");
        assert_eq!(
            r.deployment_diff_url,
            format!("https://github.com/org/nginx/commit/{SHA_A}")
        );
    }

    #[test]
    fn test_matched_artifact_gets_compare_url() {
        let repo = "https://github.com/cyber-dojo/saver";
        let d = diff(
            vec![artifact("saver-ci", repo, SHA_A)],
            vec![artifact("saver-ci", repo, SHA_B)],
        );
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        assert_eq!(
            records[0].deployment_diff_url,
            format!("{repo}/compare/{SHA_B}...{SHA_A}")
        );
        assert_eq!(records[0].outgoing.commit_sha, SHA_B);
    }

    #[test]
    fn test_gitlab_compare_url() {
        let d = diff(
            vec![Artifact {
                commit_url: format!("https://gitlab.com/org/runner/-/commit/{SHA_A}"),
                ..artifact("runner-ci", "unused", SHA_A)
            }],
            vec![Artifact {
                commit_url: format!("https://gitlab.com/org/runner/-/commit/{SHA_B}"),
                ..artifact("runner-ci", "unused", SHA_B)
            }],
        );
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        assert_eq!(
            records[0].deployment_diff_url,
            format!("https://gitlab.com/org/runner/compare/{SHA_B}...{SHA_A}")
        );
    }

    #[test]
    fn test_repo_mismatch_is_fatal() {
        let d = diff(
            vec![artifact("saver-ci", "https://github.com/new-org/saver", SHA_A)],
            vec![artifact("saver-ci", "https://github.com/old-org/saver", SHA_B)],
        );
        let err = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap_err();
        match &err {
            CoreError::RepoMismatch {
                flow,
                incoming_repo_url,
                outgoing_repo_url,
            } => {
                assert_eq!(flow, "saver-ci");
                assert_eq!(incoming_repo_url, "https://github.com/new-org/saver");
                assert_eq!(outgoing_repo_url, "https://github.com/old-org/saver");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn test_one_record_per_incoming_flow_in_order() {
        let d = diff(
            vec![
                artifact("web-ci", "https://github.com/org/web", SHA_A),
                artifact("saver-ci", "https://github.com/org/saver", SHA_A),
                artifact("runner-ci", "https://github.com/org/runner", SHA_A),
            ],
            vec![
                artifact("runner-ci", "https://github.com/org/runner", SHA_B),
                artifact("differ-ci", "https://github.com/org/differ", SHA_B),
            ],
        );
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        let flows: Vec<&str> = records.iter().map(|r| r.incoming.flow.as_str()).collect();
        assert_eq!(flows, vec!["web-ci", "saver-ci", "runner-ci"]);
        assert!(records[0].is_new());
        assert!(!records[2].is_new());
    }

    #[test]
    fn test_excluded_flows_are_dropped() {
        let d = diff(
            vec![
                artifact("differ-ci", "https://github.com/org/differ", SHA_A),
                artifact("saver-ci", "https://github.com/org/saver", SHA_A),
            ],
            vec![artifact("differ-ci", "https://github.com/elsewhere/differ", SHA_B)],
        );
        let policy = ResolvePolicy {
            excluded_flows: ["differ-ci".to_string(), "creator-ci".to_string()]
                .into_iter()
                .collect(),
            ..ResolvePolicy::default()
        };
        let records = Resolver::new(policy).resolve(&d).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].incoming.flow, "saver-ci");
    }

    #[test]
    fn test_blue_green_detected_before_normalizing() {
        let mut d = diff(
            vec![
                artifact("saver-ci", "https://github.com/org/saver", SHA_A),
                artifact("saver-ci", "https://github.com/org/saver", SHA_B),
            ],
            vec![],
        );
        d.changed.artifacts.push(FlowRef {
            flow: "web-ci".to_string(),
        });
        let err = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap_err();
        assert!(matches!(err, CoreError::BlueGreenDeployment { .. }));
    }

    #[test]
    fn test_snapshot_info() {
        let d = diff(
            vec![artifact("saver-ci", "https://github.com/org/saver", SHA_A)],
            vec![],
        );
        let policy = ResolvePolicy {
            kosli_org: "acme".to_string(),
            ..ResolvePolicy::default()
        };
        let records = Resolver::new(policy).resolve(&d).unwrap();
        let info = &records[0].snapshot;
        assert_eq!(info.incoming_snapshot_id, "aws-beta#5081");
        assert_eq!(info.outgoing_snapshot_id, "aws-prod#3699");
        assert_eq!(
            info.incoming_snapshot_url,
            "https://app.kosli.com/acme/environments/aws-beta/snapshots/5081?fingerprint=fp-saver-ci-aaaa"
        );
    }

    #[test]
    fn test_unknown_provenance_is_input_error() {
        let d = diff(
            vec![artifact("saver-ci", "https://example.com/org/saver", SHA_A)],
            vec![],
        );
        let err = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap_err();
        assert!(matches!(err, CoreError::UnknownProvenance(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_no_incoming_artifacts_needs_no_snapshot_url() {
        let mut d = diff(vec![], vec![]);
        d.snappish1.snapshot_id = "aws-beta".to_string();
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_all_incoming_excluded_needs_no_snapshot_url() {
        let mut d = diff(
            vec![artifact("differ-ci", "https://github.com/org/differ", SHA_A)],
            vec![],
        );
        d.snappish1.snapshot_id = "aws-beta".to_string();
        let policy = ResolvePolicy {
            excluded_flows: ["differ-ci".to_string()].into_iter().collect(),
            ..ResolvePolicy::default()
        };
        assert!(Resolver::new(policy).resolve(&d).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_snapshot_id_fails_when_url_needed() {
        let mut d = diff(
            vec![artifact("saver-ci", "https://github.com/org/saver", SHA_A)],
            vec![],
        );
        d.snappish1.snapshot_id = "aws-beta".to_string();
        let err = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSnapshotId(_)));
    }

    #[test]
    fn test_unmatched_outgoing_with_unknown_provenance_is_ignored() {
        let d = diff(
            vec![artifact("saver-ci", "https://github.com/org/saver", SHA_A)],
            vec![artifact("legacy-ci", "https://example.com/org/legacy", SHA_B)],
        );
        let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_new());
    }

    #[test]
    fn test_matched_outgoing_with_unknown_provenance_fails() {
        let d = diff(
            vec![artifact("saver-ci", "https://github.com/org/saver", SHA_A)],
            vec![artifact("saver-ci", "https://example.com/org/saver", SHA_B)],
        );
        let err = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap_err();
        assert!(matches!(err, CoreError::UnknownProvenance(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// Distinct flow names in generation order
        fn flows() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("[a-z]{1,6}-ci", 0..12).prop_map(|names| {
                let mut seen = BTreeSet::new();
                names
                    .into_iter()
                    .filter(|name| seen.insert(name.clone()))
                    .collect()
            })
        }

        fn repo(flow: &str) -> String {
            format!("https://github.com/org/{flow}")
        }

        proptest! {
            #[test]
            fn test_one_record_per_distinct_incoming_flow(
                incoming in flows(),
                outgoing in flows(),
            ) {
                let d = diff(
                    incoming.iter().map(|f| artifact(f, &repo(f), SHA_A)).collect(),
                    outgoing.iter().map(|f| artifact(f, &repo(f), SHA_B)).collect(),
                );
                let records = Resolver::new(ResolvePolicy::default()).resolve(&d).unwrap();

                let resolved: Vec<&str> = records.iter().map(|r| r.incoming.flow.as_str()).collect();
                let expected: Vec<&str> = incoming.iter().map(String::as_str).collect();
                prop_assert_eq!(resolved, expected);

                for record in &records {
                    let flow = &record.incoming.flow;
                    if outgoing.contains(flow) {
                        prop_assert_eq!(
                            &record.deployment_diff_url,
                            &format!("{}/compare/{SHA_B}...{SHA_A}", repo(flow))
                        );
                    } else {
                        prop_assert_eq!(&record.outgoing.flow, "");
                        let commit_suffix = format!("/commit/{SHA_A}");
                        prop_assert!(record.deployment_diff_url.ends_with(&commit_suffix));
                    }
                }
            }

            #[test]
            fn test_excluded_flows_never_emitted(
                incoming in flows(),
                excluded in prop::collection::btree_set("[a-z]{1,6}-ci", 0..6),
            ) {
                let d = diff(
                    incoming.iter().map(|f| artifact(f, &repo(f), SHA_A)).collect(),
                    vec![],
                );
                let policy = ResolvePolicy {
                    excluded_flows: excluded.clone(),
                    ..ResolvePolicy::default()
                };
                let records = Resolver::new(policy).resolve(&d).unwrap();

                let kept = incoming.iter().filter(|f| !excluded.contains(*f)).count();
                prop_assert_eq!(records.len(), kept);
                prop_assert!(records.iter().all(|r| !excluded.contains(&r.incoming.flow)));
            }
        }
    }
}
