use anyhow::{Context, Result};
use promo_config::Config;
use promo_core::{Diff, Resolver, write_annotations};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use crate::cli::Cli;

/// Settings after layering command-line flags over the config file
struct Settings {
    config: Config,
    annotations: Option<PathBuf>,
}

impl Settings {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;

        if let Some(org) = &cli.org {
            config.kosli_org = org.clone();
        }
        for flow in &cli.exclude_flows {
            if !config.excluded_flows.contains(flow) {
                config.excluded_flows.push(flow.clone());
            }
        }

        // An explicit path enables the side-file even if the config disables it
        let annotations = match &cli.annotations {
            _ if cli.no_annotations => None,
            Some(path) => Some(path.clone()),
            None if config.annotations.enabled => Some(config.annotations.path.clone()),
            None => None,
        };

        Ok(Self {
            config,
            annotations,
        })
    }
}

pub fn handle(cli: Cli) -> Result<()> {
    let settings = Settings::from_cli(&cli)?;

    let diff = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Diff::from_reader(BufReader::new(file))?
        }
        None => Diff::from_reader(io::stdin().lock())?,
    };

    let resolver = Resolver::new(settings.config.policy());
    let records = resolver.resolve(&diff)?;

    println!("{}", serde_json::to_string_pretty(&records)?);

    if let Some(path) = &settings.annotations {
        write_annotations(path, &records)?;
    }

    Ok(())
}
