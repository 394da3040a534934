//! # Extraction Queue Client
//!
//! PGMQ wrapper for the main work queue and its dead-letter companion.
//! Exposes exactly the queue operations the state machine consumes: single
//! send, validated batch send, delayed send for replays, visibility-timeout
//! reads, deletes, and the explicit move of a poisoned message to the
//! dead-letter queue.

use async_trait::async_trait;
use pgmq::{types::Message, PGMQueue};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;
use crate::error::{AuditflowError, Result};
use crate::messaging::message::{BatchEntry, WorkMessage};
use crate::messaging::work_queue::WorkQueue;

/// Upper bound the queue's batch-send API accepts per call
pub const QUEUE_BATCH_LIMIT: usize = 10;

/// Client for the main and dead-letter extraction queues
#[derive(Debug, Clone)]
pub struct ExtractionQueues {
    pgmq: PGMQueue,
    main_queue: String,
    dead_letter_queue: String,
}

impl ExtractionQueues {
    /// Connect to PGMQ using the configured connection string
    pub async fn connect(config: &QueueConfig) -> Result<Self> {
        debug!("Connecting to pgmq for extraction queues");

        let pgmq = PGMQueue::new(config.database_url.clone())
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&config.main_queue, "connect", e.to_string())
            })?;

        Ok(Self {
            pgmq,
            main_queue: config.main_queue.clone(),
            dead_letter_queue: config.dead_letter_queue.clone(),
        })
    }

    /// Create the main and dead-letter queues if they do not exist yet
    pub async fn ensure_queues(&self) -> Result<()> {
        for queue in [&self.main_queue, &self.dead_letter_queue] {
            self.pgmq.create(queue).await.map_err(|e| {
                AuditflowError::queue_operation(queue, "create", e.to_string())
            })?;
            debug!(queue = %queue, "Queue ready");
        }
        Ok(())
    }

    pub fn main_queue_name(&self) -> &str {
        &self.main_queue
    }

    pub fn dead_letter_queue_name(&self) -> &str {
        &self.dead_letter_queue
    }

    /// Read one message from the main queue with a visibility timeout
    pub async fn read_main(&self, visibility_timeout: i32) -> Result<Option<Message<Value>>> {
        self.pgmq
            .read::<Value>(&self.main_queue, Some(visibility_timeout))
            .await
            .map_err(|e| AuditflowError::queue_operation(&self.main_queue, "read", e.to_string()))
    }

    /// Delete a processed message from the main queue
    pub async fn delete_main(&self, message_id: i64) -> Result<()> {
        self.pgmq
            .delete(&self.main_queue, message_id)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.main_queue, "delete", e.to_string())
            })?;
        debug!(queue = %self.main_queue, message_id, "Message deleted");
        Ok(())
    }

    /// Move a message that exhausted its delivery budget to the dead-letter
    /// queue, removing it from the main queue.
    pub async fn move_to_dead_letters(&self, body: &Value, message_id: i64) -> Result<()> {
        self.pgmq
            .send(&self.dead_letter_queue, body)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.dead_letter_queue, "send", e.to_string())
            })?;
        self.delete_main(message_id).await?;

        warn!(
            queue = %self.dead_letter_queue,
            message_id,
            "Message moved to dead-letter queue"
        );
        Ok(())
    }
}

#[async_trait]
impl WorkQueue for ExtractionQueues {
    /// Send a single work message to the main queue
    async fn send(&self, message: &WorkMessage) -> Result<i64> {
        let message_id = self
            .pgmq
            .send(&self.main_queue, message)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.main_queue, "send", e.to_string())
            })?;

        info!(
            queue = %self.main_queue,
            message_id,
            operation = message.operation.as_str(),
            log_date = %message.log_date,
            page = message.page,
            "Message sent"
        );
        Ok(message_id)
    }

    /// Send a batch of work messages to the main queue in one call.
    ///
    /// Enforces the batch-send contract before dispatch: at most
    /// [`QUEUE_BATCH_LIMIT`] entries, each with an id unique within the batch.
    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<Vec<i64>> {
        validate_batch(entries)
            .map_err(|reason| {
                AuditflowError::queue_operation(&self.main_queue, "send_batch", reason)
            })?;

        let bodies = entries
            .iter()
            .map(|entry| entry.body.to_json())
            .collect::<Result<Vec<Value>>>()?;

        let message_ids = self
            .pgmq
            .send_batch(&self.main_queue, &bodies)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.main_queue, "send_batch", e.to_string())
            })?;

        info!(
            queue = %self.main_queue,
            entries = entries.len(),
            "Batch sent"
        );
        Ok(message_ids)
    }

    /// Re-send a raw replayed body to the main queue with a visibility delay.
    ///
    /// Takes the body as raw JSON rather than a [`WorkMessage`] so that
    /// fields this crate does not know about survive the replay untouched.
    async fn send_replay(&self, body: &Value, delay_seconds: u64) -> Result<i64> {
        let message_id = self
            .pgmq
            .send_delay(&self.main_queue, body, delay_seconds)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.main_queue, "send_delay", e.to_string())
            })?;

        debug!(
            queue = %self.main_queue,
            message_id,
            delay_seconds,
            "Replay message sent with delay"
        );
        Ok(message_id)
    }

    /// Read a batch of messages from the dead-letter queue
    async fn read_dead_letters(
        &self,
        visibility_timeout: i32,
        limit: i32,
    ) -> Result<Vec<Message<Value>>> {
        let messages = self
            .pgmq
            .read_batch::<Value>(&self.dead_letter_queue, Some(visibility_timeout), limit)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.dead_letter_queue, "read_batch", e.to_string())
            })?
            .unwrap_or_default();

        debug!(
            queue = %self.dead_letter_queue,
            count = messages.len(),
            "Read dead-letter messages"
        );
        Ok(messages)
    }

    /// Delete a replayed message from the dead-letter queue
    async fn delete_dead_letter(&self, message_id: i64) -> Result<()> {
        self.pgmq
            .delete(&self.dead_letter_queue, message_id)
            .await
            .map_err(|e| {
                AuditflowError::queue_operation(&self.dead_letter_queue, "delete", e.to_string())
            })?;
        debug!(queue = %self.dead_letter_queue, message_id, "Dead letter deleted");
        Ok(())
    }
}

/// Check the batch-send contract: size cap and intra-batch id uniqueness
fn validate_batch(entries: &[BatchEntry]) -> std::result::Result<(), String> {
    if entries.len() > QUEUE_BATCH_LIMIT {
        return Err(format!(
            "batch of {} entries exceeds the limit of {QUEUE_BATCH_LIMIT}",
            entries.len()
        ));
    }
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id.as_str()) {
            return Err(format!("duplicate batch entry id: {}", entry.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::message::WorkMessage;

    fn entry(id: &str, page: u32) -> BatchEntry {
        BatchEntry {
            id: id.to_string(),
            body: WorkMessage::extract("2026-08-26", page, 25),
        }
    }

    #[test]
    fn batches_within_the_limit_pass() {
        let entries: Vec<BatchEntry> = (0..10).map(|i| entry(&i.to_string(), i + 1)).collect();
        assert!(validate_batch(&entries).is_ok());
    }

    #[test]
    fn oversized_batches_are_rejected() {
        let entries: Vec<BatchEntry> = (0..11).map(|i| entry(&i.to_string(), i + 1)).collect();
        let reason = validate_batch(&entries).unwrap_err();
        assert!(reason.contains("exceeds the limit"));
    }

    #[test]
    fn duplicate_entry_ids_are_rejected() {
        let entries = vec![entry("0", 1), entry("1", 2), entry("0", 3)];
        let reason = validate_batch(&entries).unwrap_err();
        assert!(reason.contains("duplicate"));
    }

    #[test]
    fn empty_batches_pass_validation() {
        // the scheduler never sends one, but the contract itself allows it
        assert!(validate_batch(&[]).is_ok());
    }
}
