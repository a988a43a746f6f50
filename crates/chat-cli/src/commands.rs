//! Command implementations for chat-topics.
//!
//! Handles:
//! - build: Load messages, run the topic pipeline, write topics as JSON
//! - config: Print the effective settings

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use chat_topics::{BuildReport, TopicBuilder};
use chat_types::{ChatMessage, Settings, TopicBuilderConfig};

use crate::cli::BuildArgs;

/// Load layered settings and apply the global CLI log level.
pub fn load_settings(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Apply build flag overrides on top of loaded configuration.
pub fn apply_overrides(config: &mut TopicBuilderConfig, args: &BuildArgs) {
    if let Some(time_window) = args.time_window {
        config.time_window = time_window;
    }
    if let Some(min_messages) = args.min_messages {
        config.min_messages = min_messages;
    }
    if let Some(threshold) = args.semantic_threshold {
        config.semantic_threshold = threshold;
    }
    if args.no_reply_chain {
        config.enable_reply_chain = false;
    }
    if args.no_semantic {
        config.enable_semantic = false;
    }
    if args.no_adaptive_window {
        config.enable_adaptive_window = false;
    }
}

/// Read a JSON array of messages.
pub fn read_messages(path: &Path) -> Result<Vec<ChatMessage>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    ChatMessage::list_from_bytes(&bytes)
        .with_context(|| format!("Failed to parse messages from {}", path.display()))
}

/// Run the build command.
///
/// 1. Apply CLI overrides to the loaded pipeline configuration
/// 2. Read the input messages
/// 3. Run the pipeline
/// 4. Write topics as pretty JSON to the output file or stdout
pub fn run_build(settings: &Settings, args: &BuildArgs) -> Result<BuildReport> {
    let mut config = settings.topics.clone();
    apply_overrides(&mut config, args);
    debug!(?config, "Effective pipeline configuration");

    let builder = TopicBuilder::try_new(config).context("Invalid pipeline configuration")?;
    let messages = read_messages(&args.input)?;
    info!(
        input = %args.input.display(),
        messages = messages.len(),
        "Loaded messages"
    );

    let build = builder.run_with_report(&messages);
    let report = build.report;
    info!(
        window_groups = report.window_groups,
        reply_relations = report.reply_relations,
        reply_groups = report.reply_groups,
        semantic_groups = report.semantic_groups,
        filtered_out = report.filtered_out(),
        topics = report.topics,
        "Topic build complete"
    );

    let json = serde_json::to_string_pretty(&build.topics).context("Failed to serialize topics")?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create output directory")?;
            }
            fs::write(path, json)
                .with_context(|| format!("Failed to write output file {}", path.display()))?;
            info!(output = %path.display(), "Wrote topics");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json).context("Failed to write topics to stdout")?;
        }
    }

    Ok(report)
}

/// Render the effective settings as TOML.
pub fn render_config(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize settings")
}

/// Print the effective settings.
pub fn show_config(settings: &Settings) -> Result<()> {
    print!("{}", render_config(settings)?);
    Ok(())
}
