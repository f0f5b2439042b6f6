use anyhow::Context;
use promo_core::ResolvePolicy;
use promo_core::annotate::DEFAULT_ANNOTATIONS_PATH;
use promo_core::resolve::DEFAULT_KOSLI_ORG;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for promotions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_kosli_org")]
    pub kosli_org: String,

    /// Flows never promoted, e.g. the tooling that computes the promotions
    #[serde(default)]
    pub excluded_flows: Vec<String>,

    #[serde(default)]
    pub annotations: AnnotationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationsConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_annotations_path")]
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kosli_org: default_kosli_org(),
            excluded_flows: Vec::new(),
            annotations: AnnotationsConfig::default(),
        }
    }
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_annotations_path(),
        }
    }
}

fn default_kosli_org() -> String {
    DEFAULT_KOSLI_ORG.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_annotations_path() -> PathBuf {
    PathBuf::from(DEFAULT_ANNOTATIONS_PATH)
}

impl Config {
    /// Load config from an explicit path, else the default location if it
    /// exists, else built-in defaults. Never writes a file.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "promotions", "promotions")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolver policy for this configuration
    pub fn policy(&self) -> ResolvePolicy {
        ResolvePolicy {
            kosli_org: self.kosli_org.clone(),
            excluded_flows: self.excluded_flows.iter().cloned().collect(),
        }
    }
}
