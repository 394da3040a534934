//! # Work Queue Seam
//!
//! The outbound queue operations the extraction state machine consumes,
//! behind a trait so the scheduler, dispatcher, and replayer can run
//! against an in-memory double, the same seam [`crate::storage::AuditStore`]
//! provides for stores. [`crate::messaging::ExtractionQueues`] is the PGMQ
//! implementation.

use async_trait::async_trait;
use pgmq::types::Message;
use serde_json::Value;

use crate::error::Result;
use crate::messaging::message::{BatchEntry, WorkMessage};

/// Outbound and dead-letter queue operations of the state machine
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Send a single work message to the main queue
    async fn send(&self, message: &WorkMessage) -> Result<i64>;

    /// Send a batch of work messages to the main queue in one call
    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<Vec<i64>>;

    /// Re-send a raw replayed body to the main queue with a visibility delay
    async fn send_replay(&self, body: &Value, delay_seconds: u64) -> Result<i64>;

    /// Read a batch of messages from the dead-letter queue
    async fn read_dead_letters(
        &self,
        visibility_timeout: i32,
        limit: i32,
    ) -> Result<Vec<Message<Value>>>;

    /// Delete a replayed message from the dead-letter queue
    async fn delete_dead_letter(&self, message_id: i64) -> Result<()>;
}
