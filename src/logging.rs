//! Structured logging setup for the generator binary.
//!
//! Logging is plain `tracing` with a `tracing-subscriber` registry: an
//! [`EnvFilter`] built from the configured level plus optional per-target
//! directives, and a single fmt layer in either JSON or pretty form.
//!
//! ## Environment Variables
//!
//! - `BRRTR_LOG_LEVEL` - trace/debug/info/warn/error (default `info`)
//! - `BRRTR_LOG_FORMAT` - `json` or `pretty` (default `pretty`)
//! - `BRRTR_LOG_TARGET_FILTER` - extra comma-separated filter directives
//! - `BRRTR_LOG_INCLUDE_LOCATION` - include file:line in records
//!
//! `RUST_LOG`, when set, takes precedence over `BRRTR_LOG_LEVEL`.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for machine consumption, pretty-print for terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Module filter (comma-separated directives)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("BRRTR_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("BRRTR_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            target_filter: lookup("BRRTR_LOG_TARGET_FILTER").filter(|s| !s.trim().is_empty()),
            include_location: lookup("BRRTR_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Raise the level to `debug` (used by `--verbose`)
    pub fn verbose(mut self) -> Self {
        self.log_level = "debug".to_string();
        self
    }
}

/// Map a level name to a [`Level`], defaulting to INFO
pub fn parse_level(raw: &str) -> Level {
    match raw.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the filter for `config`.
///
/// Invalid target directives are reported on stderr and skipped; logging is
/// not up yet at this point.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    let level = parse_level(&config.log_level);
    let mut env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => eprintln!("Warning: Invalid log filter directive: {}", filter),
            }
        }
    }
    env_filter
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use brrtrouter_codegen::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::from_env()).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = build_filter(config);

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        level = %config.log_level,
        format = ?config.format,
        "Logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("whatever"), LogFormat::Pretty);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Level::TRACE);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_log_config_from_lookup_defaults() {
        let config = LogConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.target_filter.is_none());
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_from_lookup_values() {
        let config = LogConfig::from_lookup(lookup_from(&[
            ("BRRTR_LOG_LEVEL", "debug"),
            ("BRRTR_LOG_FORMAT", "json"),
            ("BRRTR_LOG_TARGET_FILTER", "minijinja=warn"),
            ("BRRTR_LOG_INCLUDE_LOCATION", "true"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.target_filter.as_deref(), Some("minijinja=warn"));
        assert!(config.include_location);
    }

    #[test]
    fn test_blank_target_filter_ignored() {
        let config = LogConfig::from_lookup(lookup_from(&[("BRRTR_LOG_TARGET_FILTER", "  ")]));
        assert!(config.target_filter.is_none());
    }

    #[test]
    fn test_verbose_raises_level() {
        assert_eq!(LogConfig::default().verbose().log_level, "debug");
    }

    #[test]
    fn test_build_filter_skips_invalid_directives() {
        let config = LogConfig {
            target_filter: Some("brrtrouter_codegen=trace,[[bad,".to_string()),
            ..LogConfig::default()
        };
        let filter = build_filter(&config);
        assert!(filter.to_string().contains("brrtrouter_codegen=trace"));
    }
}
