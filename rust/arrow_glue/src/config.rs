//! Environment-driven configuration
//!
//! Read once per process by [`GlueConfig::global`]:
//!
//! | Variable                | Default   |
//! |-------------------------|-----------|
//! | `ARROW_GLUE_LOG`        | `warn`    |
//! | `ARROW_GLUE_LOG_FORMAT` | `compact` |
//! | `ARROW_GLUE_LEAK_CHECK` | `true`    |

use std::env;

use once_cell::sync::OnceCell;

use crate::logging::LogFormat;

pub const ENV_LOG: &str = "ARROW_GLUE_LOG";
pub const ENV_LOG_FORMAT: &str = "ARROW_GLUE_LOG_FORMAT";
pub const ENV_LEAK_CHECK: &str = "ARROW_GLUE_LEAK_CHECK";

static CONFIG: OnceCell<GlueConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlueConfig {
    /// `EnvFilter` directive, e.g. `info` or `arrow_glue=debug`
    pub log_level: String,
    pub log_format: LogFormat,
    /// Log handles still registered at shutdown
    pub leak_check: bool,
}

impl Default for GlueConfig {
    fn default() -> Self {
        GlueConfig {
            log_level: "warn".to_string(),
            log_format: LogFormat::Compact,
            leak_check: true,
        }
    }
}

impl GlueConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GlueConfig::default();

        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_format = LogFormat::parse(&format);
        }
        if let Some(flag) = lookup(ENV_LEAK_CHECK) {
            config.leak_check = parse_flag(&flag).unwrap_or(config.leak_check);
        }

        config
    }

    /// The process-wide configuration, read from the environment on first use
    pub fn global() -> &'static GlueConfig {
        CONFIG.get_or_init(GlueConfig::from_env)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
