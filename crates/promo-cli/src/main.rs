mod cli;
mod commands;

use clap::Parser;
use promo_core::CoreError;

fn main() {
    // Logs go to stderr; stdout carries the promotion records
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();

    if let Err(err) = commands::promote::handle(cli) {
        std::process::exit(report(&err));
    }
}

/// Print diagnostics for a fatal error and pick the exit code
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<CoreError>() {
        Some(core) => {
            for line in core.diagnostics() {
                eprintln!("ERROR: {line}");
            }
            core.exit_code()
        }
        None => {
            eprintln!("ERROR: {err:#}");
            1
        }
    }
}
