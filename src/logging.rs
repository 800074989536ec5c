//! Logging System
//!
//! Structured logging via the `tracing` crate. Level, format, and output
//! destination come from the configuration file with `CRATEPACK_LOG*`
//! environment overrides; CLI flags are applied by the binary before
//! initialization.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Master switch; `--quiet`-style behavior when false
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (when output is "file")
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, terminal destinations only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    // Command results go to stdout; logs stay out of their way.
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order (highest to lowest): environment variables
/// (CRATEPACK_LOG, CRATEPACK_LOG_FORMAT, CRATEPACK_LOG_OUTPUT), then the
/// provided configuration, then defaults.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let base = Registry::default().with(filter);

    match output {
        Output::File => {
            let log_file = config.file.clone().unwrap_or_else(|| {
                PathBuf::from("cratepack.log")
            });
            if let Some(parent) = log_file.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ConfigError::Logging(format!("Failed to create log directory: {e}"))
                    })?;
                }
            }
            let writer = Arc::new(
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&log_file)
                    .map_err(|e| {
                        ConfigError::Logging(format!(
                            "Failed to open log file {log_file:?}: {e}"
                        ))
                    })?,
            );
            if format == "json" {
                base.with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(writer),
                )
                .init();
            } else {
                base.with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            }
        }
        Output::Stdout => {
            if format == "json" {
                base.with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stdout),
                )
                .init();
            } else {
                base.with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(config.color)
                        .with_writer(std::io::stdout),
                )
                .init();
            }
        }
        Output::Stderr => {
            if format == "json" {
                base.with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(std::io::stderr),
                )
                .init();
            } else {
                base.with(
                    fmt::layer()
                        .with_target(true)
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(config.color)
                        .with_writer(std::io::stderr),
                )
                .init();
            }
        }
    }

    Ok(())
}

/// Build the level filter from the CRATEPACK_LOG environment variable or
/// the configuration, including module-specific directives.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env("CRATEPACK_LOG") {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, module_level) in &config.modules {
        let directive = format!("{module}={module_level}");
        filter = filter.add_directive(directive.parse().map_err(|e| {
            ConfigError::Logging(format!("Invalid log directive '{directive}': {e}"))
        })?);
    }
    Ok(filter)
}

fn determine_format(config: &LoggingConfig) -> Result<String, ConfigError> {
    if let Ok(format) = std::env::var("CRATEPACK_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    match config.format.as_str() {
        "json" | "text" => Ok(config.format.clone()),
        other => Err(ConfigError::Logging(format!(
            "Invalid log format: {other} (must be 'json' or 'text')"
        ))),
    }
}

enum Output {
    Stdout,
    Stderr,
    File,
}

fn determine_output(config: &LoggingConfig) -> Result<Output, ConfigError> {
    let output = std::env::var("CRATEPACK_LOG_OUTPUT").unwrap_or_else(|_| config.output.clone());
    match output.as_str() {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        "file" => Ok(Output::File),
        other => Err(ConfigError::Logging(format!(
            "Invalid log output: {other} (must be 'stdout', 'stderr', or 'file')"
        ))),
    }
}
