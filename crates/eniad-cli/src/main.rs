//! ENIAD gateway CLI
//!
//! Ask the assistant a question or inspect engine availability.

use anyhow::Result;
use clap::Parser;
use eniad_core::error::exit_codes;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = eniad_core::Config::load()?;

    match cli.command {
        Commands::Ask(args) => {
            let answered = commands::ask::run(args, &config, cli.format).await?;
            if !answered {
                std::process::exit(exit_codes::ENGINE_UNAVAILABLE);
            }
        }
        Commands::Status => commands::status::run(&config, cli.format).await?,
    }
    Ok(())
}
