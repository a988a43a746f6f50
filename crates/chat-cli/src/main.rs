//! Chat topic builder
//!
//! Reconstructs conversation topics from a normalized chat export.
//!
//! # Usage
//!
//! ```bash
//! chat-topics build --input messages.json [--output topics.json]
//! chat-topics config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/chat-topics/config.toml)
//! 3. Environment variables (CHAT_TOPICS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use chat_cli::{init_tracing, load_settings, run_build, show_config, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;

    match cli.command {
        Commands::Build(args) => {
            init_tracing(&settings.log_level)?;
            run_build(&settings, &args)?;
        }
        Commands::Config => {
            show_config(&settings)?;
        }
    }

    Ok(())
}
