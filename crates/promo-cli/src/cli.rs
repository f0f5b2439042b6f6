use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = r#"Reads a Kosli environment diff as JSON on stdin and prints one
promotion record per flow of the incoming environment, e.g.

  $ kosli diff snapshots aws-beta aws-prod --output=json | promotions
  [
    {
      "incoming_snapshot_id": "aws-beta#5081",
      "incoming_snapshot_url": "https://app.kosli.com/cyber-dojo/environments/aws-beta/snapshots/5081?fingerprint=b3237b0e...",
      "outgoing_snapshot_id": "aws-prod#3699",
      "incoming_image_name": "244531986313.dkr.ecr.eu-central-1.amazonaws.com/saver:6e191a0@sha256:b3237b0e...",
      "incoming_fingerprint": "b3237b0e...",
      "incoming_repo_url": "https://github.com/cyber-dojo/saver",
      "incoming_repo_name": "saver",
      "incoming_commit_sha": "6e191a0a86cf3d264955c4910bc3b9df518c4bcd",
      "incoming_flow": "saver-ci",
      "incoming_ci_system": "github",
      "outgoing_image_name": "244531986313.dkr.ecr.eu-central-1.amazonaws.com/saver:42f4e5b@sha256:1c0e4a1a...",
      "outgoing_fingerprint": "1c0e4a1a...",
      "outgoing_repo_url": "https://github.com/cyber-dojo/saver",
      "outgoing_repo_name": "saver",
      "outgoing_commit_sha": "42f4e5b3a2de9d2ac0a6f4bbcd2c1b5dc4f0b1c2",
      "outgoing_flow": "saver-ci",
      "outgoing_ci_system": "github",
      "deployment_diff_url": "https://github.com/cyber-dojo/saver/compare/42f4e5b3a2de9d2ac0a6f4bbcd2c1b5dc4f0b1c2...6e191a0a86cf3d264955c4910bc3b9df518c4bcd"
    }
  ]

Exits 42 when either environment is mid blue-green deployment or a flow
maps to different repositories in the two environments."#;

#[derive(Parser)]
#[command(name = "promotions")]
#[command(about = "Compute artifact promotions between two environments", long_about = None)]
#[command(version)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Read the diff from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Config file (default: platform config dir, if present)
    #[arg(short, long, env = "PROMOTIONS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Kosli organisation used in snapshot URLs
    #[arg(long, env = "PROMOTIONS_KOSLI_ORG")]
    pub org: Option<String>,

    /// Flow to leave out of the promotions (repeatable)
    #[arg(long = "exclude-flow", value_name = "FLOW")]
    pub exclude_flows: Vec<String>,

    /// Where to write the annotations side-file
    #[arg(long, value_name = "PATH")]
    pub annotations: Option<PathBuf>,

    /// Do not write the annotations side-file
    #[arg(long, conflicts_with = "annotations")]
    pub no_annotations: bool,
}
