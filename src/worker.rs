//! # Extraction Worker
//!
//! Poll loop over the main queue. Each iteration reads at most one message
//! under a visibility timeout and dispatches it. Success deletes the
//! message; failure leaves it invisible until the timeout expires, which is
//! the system's retry mechanism. A message seen more times than the
//! delivery budget allows is moved to the dead-letter queue instead of
//! being processed again.
//!
//! Workers hold no state between messages; many of them can run against the
//! same queue because pages are disjoint units of work and extraction is
//! idempotent per page.

use std::sync::Arc;
use std::time::Duration;

use pgmq::types::Message;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::QueueConfig;
use crate::error::Result;
use crate::extraction::Dispatcher;
use crate::messaging::ExtractionQueues;

/// Queue-driven worker processing extraction messages
#[derive(Clone)]
pub struct ExtractionWorker {
    queues: Arc<ExtractionQueues>,
    dispatcher: Dispatcher,
    visibility_timeout: i32,
    max_read_count: u32,
    poll_interval: Duration,
}

impl ExtractionWorker {
    pub fn new(queues: Arc<ExtractionQueues>, dispatcher: Dispatcher, config: &QueueConfig) -> Self {
        Self {
            queues,
            dispatcher,
            visibility_timeout: config.visibility_timeout_seconds,
            max_read_count: config.max_read_count,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Run the poll loop until the process is stopped.
    ///
    /// Queue-level read failures are logged and retried after the poll
    /// interval; per-message failures never escape the loop.
    pub async fn run(&self) -> Result<()> {
        info!(
            queue = self.queues.main_queue_name(),
            "Extraction worker started"
        );

        loop {
            match self.queues.read_main(self.visibility_timeout).await {
                Ok(Some(delivery)) => self.process(delivery).await,
                Ok(None) => tokio::time::sleep(self.poll_interval).await,
                Err(e) => {
                    error!(error = %e, "Queue read failed; backing off");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Process one delivery end to end
    async fn process(&self, delivery: Message<Value>) {
        if exceeded_delivery_budget(delivery.read_ct, self.max_read_count) {
            warn!(
                message_id = delivery.msg_id,
                read_ct = delivery.read_ct,
                budget = self.max_read_count,
                "Delivery budget exhausted; dead-lettering message"
            );
            if let Err(e) = self
                .queues
                .move_to_dead_letters(&delivery.message, delivery.msg_id)
                .await
            {
                error!(message_id = delivery.msg_id, error = %e, "Dead-letter move failed");
            }
            return;
        }

        let body = delivery.message.to_string();
        match self.dispatcher.handle_delivery(&body).await {
            Ok(outcome) => {
                info!(message_id = delivery.msg_id, outcome = %outcome, "Message processed");
                if let Err(e) = self.queues.delete_main(delivery.msg_id).await {
                    // the message will be redelivered and reprocessed;
                    // harmless because extraction is idempotent per page
                    error!(message_id = delivery.msg_id, error = %e, "Delete failed");
                }
            }
            Err(e) => {
                // leave the message in place; visibility timeout expiry
                // redelivers it, and the budget check above eventually
                // routes persistent failures to the dead-letter queue
                error!(
                    message_id = delivery.msg_id,
                    read_ct = delivery.read_ct,
                    error = %e,
                    "Message processing failed; awaiting redelivery"
                );
            }
        }
    }
}

/// True when a message has been delivered more times than the budget allows
fn exceeded_delivery_budget(read_ct: i32, max_read_count: u32) -> bool {
    read_ct > max_read_count as i32
}
