//! # Dead-Letter Replayer
//!
//! Reinjects messages that exhausted their delivery budget on the main
//! queue. Each dead-letter body is re-sent unchanged except for
//! `retry_count`, which is forced back to zero, and every replay carries
//! the same fixed delay, a cooldown long enough for transient upstream
//! outages to clear. No deduplication, no backoff growth, no inspection of
//! why the message failed.
//!
//! Unlike the main-queue consumer, the replayer processes every delivered
//! record, not just the first.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;
use crate::messaging::WorkQueue;

/// Visibility timeout while a dead-letter batch is being replayed
const REPLAY_READ_TIMEOUT_SECONDS: i32 = 60;
/// Dead letters pulled per read
const REPLAY_READ_BATCH: i32 = 10;

/// Result of one drain pass over the dead-letter queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub replayed: usize,
}

/// Replays dead-lettered work messages onto the main queue
#[derive(Clone)]
pub struct DeadLetterReplayer {
    queues: Arc<dyn WorkQueue>,
    delay_seconds: u64,
}

impl DeadLetterReplayer {
    pub fn new(queues: Arc<dyn WorkQueue>, delay_seconds: u64) -> Self {
        Self {
            queues,
            delay_seconds,
        }
    }

    /// Drain the dead-letter queue, replaying every message onto the main
    /// queue with the configured delay.
    pub async fn drain(&self) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();

        loop {
            let batch = self
                .queues
                .read_dead_letters(REPLAY_READ_TIMEOUT_SECONDS, REPLAY_READ_BATCH)
                .await?;
            if batch.is_empty() {
                break;
            }

            for delivery in batch {
                let mut body = delivery.message.clone();
                reset_retry_count(&mut body);

                self.queues.send_replay(&body, self.delay_seconds).await?;
                self.queues.delete_dead_letter(delivery.msg_id).await?;
                summary.replayed += 1;

                info!(
                    message_id = delivery.msg_id,
                    operation = body.get("operation").and_then(serde_json::Value::as_str).unwrap_or("?"),
                    page = body.get("page").and_then(serde_json::Value::as_u64).unwrap_or(0),
                    delay_seconds = self.delay_seconds,
                    "Replayed dead-letter message to main queue"
                );
            }
        }

        if summary.replayed == 0 {
            info!("Dead-letter queue empty; nothing to replay");
        } else {
            warn!(replayed = summary.replayed, "Dead-letter messages replayed");
        }
        Ok(summary)
    }
}

/// Force `retry_count` to zero, leaving everything else in the body alone.
///
/// Operates on raw JSON so fields this crate does not know about survive
/// the replay byte-for-byte. Non-object bodies are left untouched; they
/// will fail parsing on redelivery and dead-letter again, which is the
/// correct fate for garbage.
pub fn reset_retry_count(body: &mut Value) {
    if let Some(object) = body.as_object_mut() {
        object.insert("retry_count".to_string(), Value::from(0));
    }
}
