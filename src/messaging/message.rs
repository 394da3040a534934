//! # Work Message Structures
//!
//! Wire format for the messages that drive the extraction state machine.
//! A logical job ("extract every page of audit data for one date") is never
//! materialized anywhere; it exists only as the set of messages sharing a
//! `log_date`. Progress is encoded entirely in message payloads traveling
//! through the queue, so these types are the whole persistence story.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// State-machine branch a message drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// First message of a job: discover the page count, then fan out
    ExtractInit,
    /// Resume fan-out from a later page
    ExtractContinue,
    /// Fetch and store exactly one page
    Extract,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ExtractInit => "extract_init",
            Operation::ExtractContinue => "extract_continue",
            Operation::Extract => "extract",
        }
    }
}

/// One unit of work flowing through the queue.
///
/// All fields except `retry_count` are required on read; unknown fields are
/// ignored so the format can grow without breaking older consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkMessage {
    /// Calendar date (`YYYY-MM-DD`) of the audit log being extracted.
    /// Immutable for the life of the job.
    pub log_date: String,
    /// 1-indexed page number; the resume point for continuations
    pub page: u32,
    /// Discovered page count, copied unchanged through every descendant
    /// message. `1` is the placeholder before discovery.
    pub total_pages: u32,
    pub operation: Operation,
    /// Replay bookkeeping only; not needed for forward progress
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
}

impl WorkMessage {
    /// First message of a new job. `total_pages` starts as the placeholder
    /// value until the pagination probe overwrites it.
    pub fn init(log_date: impl Into<String>) -> Self {
        Self {
            log_date: log_date.into(),
            page: 1,
            total_pages: 1,
            operation: Operation::ExtractInit,
            retry_count: None,
        }
    }

    /// Per-page extraction message
    pub fn extract(log_date: impl Into<String>, page: u32, total_pages: u32) -> Self {
        Self {
            log_date: log_date.into(),
            page,
            total_pages,
            operation: Operation::Extract,
            retry_count: None,
        }
    }

    /// Continuation message resuming fan-out at `page`
    pub fn continuation(log_date: impl Into<String>, page: u32, total_pages: u32) -> Self {
        Self {
            log_date: log_date.into(),
            page,
            total_pages,
            operation: Operation::ExtractContinue,
            retry_count: None,
        }
    }

    /// Parse a delivered message body
    pub fn from_json_str(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Serialize for queue storage
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// One entry of a batch send.
///
/// The queue's batch API takes up to ten entries per call, each with an id
/// that only needs to be unique within that one call. Ids here are the loop
/// indices assigned while the batch is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub id: String,
    pub body: WorkMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_serialize_snake_case() {
        let msg = WorkMessage::init("2026-08-26");
        let json = msg.to_json().unwrap();
        assert_eq!(json["operation"], "extract_init");
        assert_eq!(json["page"], 1);
        assert_eq!(json["total_pages"], 1);
        // placeholder retry_count is absent, not null
        assert!(json.get("retry_count").is_none());
    }

    #[test]
    fn round_trips_through_the_wire_format() {
        let msg = WorkMessage::extract("2026-08-26", 7, 25);
        let body = serde_json::to_string(&msg).unwrap();
        let parsed = WorkMessage::from_json_str(&body).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn unknown_fields_are_ignored_on_read() {
        let body = r#"{
            "log_date": "2026-08-26",
            "page": 3,
            "total_pages": 9,
            "operation": "extract_continue",
            "trace_id": "abc-123",
            "region": "eu-west-1"
        }"#;
        let parsed = WorkMessage::from_json_str(body).unwrap();
        assert_eq!(parsed.operation, Operation::ExtractContinue);
        assert_eq!(parsed.page, 3);
        assert_eq!(parsed.retry_count, None);
    }

    #[test]
    fn retry_count_survives_when_present() {
        let body = r#"{"log_date":"2026-08-26","page":2,"total_pages":4,"operation":"extract","retry_count":5}"#;
        let parsed = WorkMessage::from_json_str(body).unwrap();
        assert_eq!(parsed.retry_count, Some(5));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let body = r#"{"page":1,"total_pages":1,"operation":"extract"}"#;
        assert!(WorkMessage::from_json_str(body).is_err());
    }
}
