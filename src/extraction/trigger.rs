//! # Trigger Classification
//!
//! Inspects an inbound invocation payload and routes it: a scheduled tick
//! starts a new job, a queue-delivery envelope continues an existing one,
//! and anything else is a deliberate no-op.

use chrono::{Days, Utc};
use serde_json::Value;

/// `source` value marking a timer-origin invocation
pub const SCHEDULE_SOURCE: &str = "schedule";

/// Classified origin of an invocation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Timer tick; carries no job data
    Scheduled,
    /// Queue delivery; holds the body of the first delivered record
    QueueDelivery(String),
    /// Unknown payload shape; processed as a no-op, not an error
    Unrecognized,
}

/// Classify an invocation payload.
///
/// Precondition for the queue branch: the main-queue consumer is configured
/// with a delivery batch size of 1, so only the first record of the envelope
/// carries work. Larger delivery batches would silently drop work here;
/// that is an external queue-configuration invariant, not a choice this
/// function gets to make.
pub fn classify(payload: &Value) -> Trigger {
    if payload.get("source").and_then(Value::as_str) == Some(SCHEDULE_SOURCE) {
        return Trigger::Scheduled;
    }

    if let Some(records) = payload.get("records").and_then(Value::as_array) {
        if let Some(body) = records
            .first()
            .and_then(|record| record.get("body"))
            .and_then(Value::as_str)
        {
            return Trigger::QueueDelivery(body.to_string());
        }
    }

    Trigger::Unrecognized
}

/// Compute the log date a new job targets: today (UTC) minus the configured
/// lookback, formatted `YYYY-MM-DD`.
pub fn log_date_for_lookback(lookback_days: u32) -> String {
    let date = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or_else(|| Utc::now().date_naive());
    date.format("%Y-%m-%d").to_string()
}
