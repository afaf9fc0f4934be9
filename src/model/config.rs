use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Number of history rows shown by `ck history` and the TUI
    #[serde(default = "default_recent_days")]
    pub recent_days: usize,
    /// How long the reset banner stays on screen
    #[serde(default = "default_notice_seconds")]
    pub notice_seconds: u64,
    /// TUI color overrides, e.g. `green = "#44FF88"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            recent_days: default_recent_days(),
            notice_seconds: default_notice_seconds(),
            colors: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter; `CHECKLIST_LOG` overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_recent_days() -> usize {
    7
}

fn default_notice_seconds() -> u64 {
    5
}

fn default_log_level() -> String {
    "warn".to_string()
}
