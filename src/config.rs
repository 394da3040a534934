//! # Configuration
//!
//! Environment-driven configuration for the extraction pipeline. The
//! deployment contract is flat `AUDITFLOW_*` environment variables; a
//! missing required variable is fatal before any work is performed, and
//! the loaded configuration is validated up front.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AuditflowError, Result};

/// Upstream audit API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the audit-log endpoint
    pub api_url: String,
    /// Bearer token for the upstream API
    #[serde(skip_serializing)]
    pub token: String,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,
}

/// Durable storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory (bucket mount) for stored pages
    pub root_dir: String,
    /// Key prefix under the root
    pub prefix: String,
    /// Gzip page payloads on write
    pub compress: bool,
}

/// Queue settings for the main and dead-letter queues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// PostgreSQL connection string for PGMQ
    #[serde(skip_serializing)]
    pub database_url: String,
    /// Main work queue name
    pub main_queue: String,
    /// Dead-letter queue name
    pub dead_letter_queue: String,
    /// Visibility timeout for reads, in seconds
    pub visibility_timeout_seconds: i32,
    /// Delivery budget before a message is moved to the dead-letter queue
    pub max_read_count: u32,
    /// Delay applied to replayed dead-letter messages, in seconds
    pub replay_delay_seconds: u64,
    /// Idle sleep between empty polls, in milliseconds
    pub poll_interval_ms: u64,
}

/// Extraction job settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// How many days back the scheduled trigger looks when picking the log date
    pub lookback_days: u32,
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditflowConfig {
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
    pub queues: QueueConfig,
    pub extraction: ExtractionConfig,
}

impl AuditflowConfig {
    /// Load configuration from `AUDITFLOW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `from_env` goes through here; tests pass a map-backed closure so they
    /// never mutate process-global environment state.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Self {
            upstream: UpstreamConfig {
                api_url: required(lookup, "AUDITFLOW_API_URL")?,
                token: resolve_token(lookup)?,
                request_timeout_seconds: parsed_or(lookup, "AUDITFLOW_REQUEST_TIMEOUT_SECONDS", 5)?,
            },
            storage: StorageConfig {
                root_dir: required(lookup, "AUDITFLOW_STORAGE_ROOT")?,
                prefix: lookup("AUDITFLOW_STORAGE_PREFIX")
                    .unwrap_or_else(|| "audit-logs".to_string()),
                compress: parsed_or(lookup, "AUDITFLOW_COMPRESS", true)?,
            },
            queues: QueueConfig {
                database_url: required(lookup, "AUDITFLOW_DATABASE_URL")?,
                main_queue: lookup("AUDITFLOW_MAIN_QUEUE")
                    .unwrap_or_else(|| "audit_extract_queue".to_string()),
                dead_letter_queue: lookup("AUDITFLOW_DEAD_LETTER_QUEUE")
                    .unwrap_or_else(|| "audit_extract_dlq".to_string()),
                visibility_timeout_seconds: parsed_or(
                    lookup,
                    "AUDITFLOW_VISIBILITY_TIMEOUT_SECONDS",
                    300,
                )?,
                max_read_count: parsed_or(lookup, "AUDITFLOW_MAX_READ_COUNT", 3)?,
                replay_delay_seconds: parsed_or(lookup, "AUDITFLOW_REPLAY_DELAY_SECONDS", 900)?,
                poll_interval_ms: parsed_or(lookup, "AUDITFLOW_POLL_INTERVAL_MS", 1000)?,
            },
            extraction: ExtractionConfig {
                lookback_days: parsed_or(lookup, "AUDITFLOW_LOOKBACK_DAYS", 1)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream.api_url.trim().is_empty() {
            return Err(AuditflowError::configuration("upstream api_url is empty"));
        }
        if self.upstream.token.trim().is_empty() {
            return Err(AuditflowError::configuration("upstream token is empty"));
        }
        if self.upstream.request_timeout_seconds == 0 {
            return Err(AuditflowError::configuration(
                "request timeout must be at least 1 second",
            ));
        }
        if self.storage.root_dir.trim().is_empty() {
            return Err(AuditflowError::configuration("storage root_dir is empty"));
        }
        if self.queues.main_queue == self.queues.dead_letter_queue {
            return Err(AuditflowError::configuration(
                "main queue and dead-letter queue must be distinct",
            ));
        }
        if self.queues.visibility_timeout_seconds <= 0 {
            return Err(AuditflowError::configuration(
                "visibility timeout must be positive",
            ));
        }
        if self.queues.max_read_count == 0 {
            return Err(AuditflowError::configuration(
                "max read count must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Load configuration from a plain map (test and embedding convenience)
pub fn from_map(vars: &HashMap<String, String>) -> Result<AuditflowConfig> {
    AuditflowConfig::from_lookup(&|name| vars.get(name).cloned())
}

fn required(lookup: &dyn Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| {
        AuditflowError::configuration(format!("missing required environment variable: {name}"))
    })
}

/// The token comes either directly from `AUDITFLOW_API_TOKEN` or from a
/// mounted secret file named by `AUDITFLOW_API_TOKEN_FILE`.
fn resolve_token(lookup: &dyn Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(token) = lookup("AUDITFLOW_API_TOKEN") {
        return Ok(token);
    }
    if let Some(path) = lookup("AUDITFLOW_API_TOKEN_FILE") {
        return std::fs::read_to_string(&path)
            .map(|contents| contents.trim().to_string())
            .map_err(|e| {
                AuditflowError::configuration(format!("failed to read token file {path}: {e}"))
            });
    }
    Err(AuditflowError::configuration(
        "missing required environment variable: AUDITFLOW_API_TOKEN (or AUDITFLOW_API_TOKEN_FILE)",
    ))
}

fn parsed_or<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T> {
    match lookup(name) {
        Some(raw) => raw.parse().map_err(|_| {
            AuditflowError::configuration(format!("invalid value for {name}: {raw}"))
        }),
        None => Ok(default),
    }
}
