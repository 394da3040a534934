//! # Structured Logging Module
//!
//! Environment-aware tracing setup for the extraction pipeline. Operational
//! logging is the only user-visible error surface, so every component logs
//! through `tracing` and this module decides the filter and output format.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize tracing with environment-specific configuration.
///
/// The filter comes from `AUDITFLOW_LOG` when set, otherwise from the
/// deployment environment (`AUDITFLOW_ENV`/`APP_ENV`). Setting
/// `AUDITFLOW_LOG_FORMAT=json` switches to JSON output for log shippers.
/// Safe to call more than once.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env("AUDITFLOW_LOG")
            .unwrap_or_else(|_| EnvFilter::new(default_log_level(&detect_environment())));

        let json_output = std::env::var("AUDITFLOW_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        // try_init so embedding this library in a host that already set a
        // global subscriber is not an error.
        let result = if json_output {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_ansi(false).json())
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init()
        };

        if result.is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }
    });
}

/// Get current deployment environment from environment variables
fn detect_environment() -> String {
    std::env::var("AUDITFLOW_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Default log level for a given environment
fn default_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_defaults_to_info() {
        assert_eq!(default_log_level("production"), "info");
    }

    #[test]
    fn other_environments_default_to_debug() {
        assert_eq!(default_log_level("development"), "debug");
        assert_eq!(default_log_level("test"), "debug");
        assert_eq!(default_log_level("staging"), "debug");
    }

    #[test]
    fn init_is_idempotent() {
        init_logging();
        init_logging();
    }
}
