//! Configuration for topic building.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at `~/.config/chat-topics/config.toml`
//! (platform equivalent via `directories`).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ChatError;

/// Construction-time settings for the topic pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicBuilderConfig {
    /// Base time window in seconds
    #[serde(default = "default_time_window")]
    pub time_window: i64,

    /// Minimum messages for a group to become a topic
    #[serde(default = "default_min_messages")]
    pub min_messages: usize,

    /// Cosine similarity needed to merge two groups (0.0-1.0)
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f32,

    /// Merge groups connected by quoted replies
    #[serde(default = "default_true")]
    pub enable_reply_chain: bool,

    /// Merge groups with similar representative text
    #[serde(default = "default_true")]
    pub enable_semantic: bool,

    /// Scale the time window by message density
    #[serde(default = "default_true")]
    pub enable_adaptive_window: bool,

    /// Vocabulary cap for the TF-IDF model
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

fn default_time_window() -> i64 {
    300
}

fn default_min_messages() -> usize {
    2
}

fn default_semantic_threshold() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_max_features() -> usize {
    100
}

impl Default for TopicBuilderConfig {
    fn default() -> Self {
        Self {
            time_window: default_time_window(),
            min_messages: default_min_messages(),
            semantic_threshold: default_semantic_threshold(),
            enable_reply_chain: default_true(),
            enable_semantic: default_true(),
            enable_adaptive_window: default_true(),
            max_features: default_max_features(),
        }
    }
}

impl TopicBuilderConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.semantic_threshold) {
            return Err(format!(
                "semantic_threshold must be 0.0-1.0, got {}",
                self.semantic_threshold
            ));
        }
        if self.time_window <= 0 {
            return Err(format!(
                "time_window must be > 0, got {}",
                self.time_window
            ));
        }
        if self.max_features == 0 {
            return Err("max_features must be > 0".to_string());
        }
        Ok(())
    }
}

/// Application settings for the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Pipeline configuration
    #[serde(default)]
    pub topics: TopicBuilderConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            topics: TopicBuilderConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/chat-topics/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CHAT_TOPICS_*, nested keys split on `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, ChatError> {
        let defaults = TopicBuilderConfig::default();
        let default_config_path = default_config_dir().join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(config_error)?
            .set_default("topics.time_window", defaults.time_window)
            .map_err(config_error)?
            .set_default("topics.min_messages", defaults.min_messages as i64)
            .map_err(config_error)?
            .set_default(
                "topics.semantic_threshold",
                f64::from(defaults.semantic_threshold),
            )
            .map_err(config_error)?
            .set_default("topics.enable_reply_chain", defaults.enable_reply_chain)
            .map_err(config_error)?
            .set_default("topics.enable_semantic", defaults.enable_semantic)
            .map_err(config_error)?
            .set_default(
                "topics.enable_adaptive_window",
                defaults.enable_adaptive_window,
            )
            .map_err(config_error)?
            .set_default("topics.max_features", defaults.max_features as i64)
            .map_err(config_error)?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CHAT_TOPICS_LOG_LEVEL, CHAT_TOPICS_TOPICS__MIN_MESSAGES, ...
        builder = builder.add_source(
            Environment::with_prefix("CHAT_TOPICS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        settings.topics.validate().map_err(ChatError::Config)?;
        Ok(settings)
    }
}

fn config_error(e: config::ConfigError) -> ChatError {
    ChatError::Config(e.to_string())
}

/// Platform config directory for chat-topics.
pub fn default_config_dir() -> PathBuf {
    ProjectDirs::from("", "", "chat-topics")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
