//! # Error Types
//!
//! Structured error handling for the extraction pipeline using thiserror
//! instead of `Box<dyn Error>` patterns. Every failure mode the pipeline can
//! hit maps to one variant so callers can distinguish fatal configuration
//! problems from per-message failures that the queue retry path absorbs.

use thiserror::Error;

/// Errors raised by the extraction pipeline
#[derive(Error, Debug)]
pub enum AuditflowError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    QueueOperation {
        queue_name: String,
        operation: String,
        message: String,
    },

    #[error("Upstream request failed: {message}")]
    Upstream { message: String },

    #[error("Storage write failed: {key}: {message}")]
    Storage { key: String, message: String },

    #[error("Malformed message body: {message}")]
    MalformedMessage { message: String },
}

impl AuditflowError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a queue operation error
    pub fn queue_operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an upstream request error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a malformed message error
    pub fn malformed_message(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AuditflowError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed_message(err.to_string())
    }
}

impl From<reqwest::Error> for AuditflowError {
    fn from(err: reqwest::Error) -> Self {
        Self::upstream(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuditflowError>;
