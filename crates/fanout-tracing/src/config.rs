//! Tracing configuration types.

use serde::Deserialize;

/// Configuration for the log subscriber.
#[derive(Debug, Clone, Deserialize)]
pub struct TracingConfig {
    /// Log level filter (e.g. "info", "fanout_proxy=debug,info").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit newline-delimited JSON log lines instead of the human-readable
    /// format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}
