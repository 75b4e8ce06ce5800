//! Logging setup on top of `tracing-subscriber`
//!
//! The configured level is the default directive; `RUST_LOG` still wins.

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text format (default)
    #[default]
    Text,
    /// JSON structured format
    Json,
}

impl LogFormat {
    /// Parse log format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging section of the settings file
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Parse log level from string
    pub fn parse_level(s: &str) -> Option<Level> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }

    /// Configured level, falling back to INFO when it does not parse
    pub fn level_filter(&self) -> LevelFilter {
        Self::parse_level(&self.level)
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::INFO)
    }
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level_filter().into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter);

    match config.format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    }
}
