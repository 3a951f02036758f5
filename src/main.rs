//! procal - Main Entry Point
//!
//! One-shot subcommands, or an interactive bias-variance session when none
//! is given.

use clap::Parser;
use procal_knn::cli::{cmd_curve, cmd_fit, cmd_info, cmd_inspect, cmd_interactive, cmd_pin, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "procal_knn=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Fit { data, k, output, history_out }) => {
            cmd_fit(&cli.global, data.as_deref(), &k, &output, history_out.as_deref())?;
        }
        Some(Commands::Inspect { data, output }) => {
            cmd_inspect(&cli.global, data.as_deref(), &output)?;
        }
        Some(Commands::Curve { parameter, output }) => {
            cmd_curve(&cli.global, &parameter, &output)?;
        }
        Some(Commands::Pin { file }) => {
            cmd_pin(&file)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data)?;
        }
        None => {
            cmd_interactive(&cli.global)?;
        }
    }

    Ok(())
}
