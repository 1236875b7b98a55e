//! Logging setup
//!
//! The crates log through the `log` facade. [`init`] installs a
//! `tracing-subscriber` formatter on stderr and bridges `log` records into
//! it with `tracing_log::LogTracer`. Hosts that install their own logger
//! simply never call it.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::EnvFilter;

use crate::config::GlueConfig;

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Log format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the configured level, keeping Arrow quiet
fn build_env_filter(level: &str) -> EnvFilter {
    let directives = format!("{},arrow=warn", level);
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber
///
/// Returns `false` if logging was already set up, here or by the host.
pub fn init(config: &GlueConfig) -> bool {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return false;
    }

    // Bridge `log` crate → tracing; fails if the host installed a logger
    if tracing_log::LogTracer::init().is_err() {
        return false;
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(&config.log_level))
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Compact => builder.compact().try_init().is_ok(),
    };

    if installed {
        log::debug!(
            "logging initialized: level={}, format={:?}",
            config.log_level,
            config.log_format
        );
    }
    installed
}
