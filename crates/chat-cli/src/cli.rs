//! CLI argument parsing for chat-topics.
//!
//! CLI flags override every other configuration source.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Chat topic builder
///
/// Reconstructs conversation topics from a normalized chat message export.
#[derive(Parser, Debug)]
#[command(name = "chat-topics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/chat-topics/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build topics from a JSON array of messages
    Build(BuildArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Input file: JSON array of normalized messages
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for the topic list (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override base time window in seconds
    #[arg(long)]
    pub time_window: Option<i64>,

    /// Override minimum messages per topic
    #[arg(long)]
    pub min_messages: Option<usize>,

    /// Override semantic merge threshold (0.0-1.0)
    #[arg(long)]
    pub semantic_threshold: Option<f32>,

    /// Disable reply-chain linking
    #[arg(long)]
    pub no_reply_chain: bool,

    /// Disable semantic merging
    #[arg(long)]
    pub no_semantic: bool,

    /// Use the fixed base window instead of the density-adaptive one
    #[arg(long)]
    pub no_adaptive_window: bool,
}
