//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "eniad")]
#[command(author, version, about = "Ask the ENIAD assistant from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question
    Ask(AskArgs),

    /// Show engine availability
    Status,
}

#[derive(Args)]
pub struct AskArgs {
    /// The question to ask
    pub query: String,

    /// Interface language (detected from the query when omitted)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Also run a web-search pass and combine it with the documentary answer
    #[arg(short, long)]
    pub search: bool,

    /// Skip the documentary (retrieval) pass
    #[arg(long)]
    pub no_rag: bool,

    /// Maximum number of cited sources
    #[arg(long, default_value_t = 5)]
    pub max_sources: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Cli,
    /// JSON for scripting
    Json,
}
