//! chat-topics command-line front end.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (build, config)

pub mod cli;
pub mod commands;

pub use cli::{BuildArgs, Cli, Commands};
pub use commands::{
    apply_overrides, init_tracing, load_settings, read_messages, render_config, run_build,
    show_config,
};
