//! Logging infrastructure for kbqa.
//!
//! All logs are emitted to stderr so stdout carries only answers and
//! command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Default filter when neither `--log-level` nor `RUST_LOG` is set.
///
/// The interactive session shares the terminal with the log output, so only
/// warnings and errors are shown unless asked for.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Initialize the tracing subscriber with stderr output.
///
/// # Arguments
/// * `log_level` - Optional filter override (e.g., "debug", "kbqa_knowledge=trace")
/// * `no_color` - Disable colored output
///
/// # Example
/// ```no_run
/// use kbqa_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let env_filter = build_filter(log_level)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Resolve the effective filter from an explicit level, `RUST_LOG`, or the default.
fn build_filter(log_level: Option<&str>) -> AppResult<EnvFilter> {
    let default_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))
}

/// Check if the terminal supports color output.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter(Some("debug")).is_ok());
        assert!(build_filter(Some("kbqa_knowledge=trace,warn")).is_ok());
    }

    #[test]
    fn test_explicit_level_wins() {
        let filter = build_filter(Some("kbqa_knowledge=trace")).unwrap();
        assert_eq!(filter.to_string(), "kbqa_knowledge=trace");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));

        let filter = build_filter(Some("error")).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_invalid_filter_is_config_error() {
        let err = build_filter(Some("kbqa=notalevel")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("kbqa=notalevel"));
    }
}
