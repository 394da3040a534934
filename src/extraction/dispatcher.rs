//! # Dispatcher
//!
//! Entry point tying the state machine together: classifies an invocation,
//! starts new jobs from scheduled ticks, and routes delivered work messages
//! to the fan-out scheduler or the page extractor by operation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::extraction::extractor::PageExtractor;
use crate::extraction::scheduler::FanOutScheduler;
use crate::extraction::trigger::{classify, log_date_for_lookback, Trigger};
use crate::extraction::HandlerOutcome;
use crate::messaging::{Operation, WorkMessage, WorkQueue};

/// Routes classified triggers through the extraction state machine
#[derive(Clone)]
pub struct Dispatcher {
    queues: Arc<dyn WorkQueue>,
    scheduler: FanOutScheduler,
    extractor: PageExtractor,
    lookback_days: u32,
}

impl Dispatcher {
    pub fn new(
        queues: Arc<dyn WorkQueue>,
        scheduler: FanOutScheduler,
        extractor: PageExtractor,
        lookback_days: u32,
    ) -> Self {
        Self {
            queues,
            scheduler,
            extractor,
            lookback_days,
        }
    }

    /// Handle a raw invocation payload
    pub async fn handle(&self, payload: &Value) -> Result<HandlerOutcome> {
        match classify(payload) {
            Trigger::Scheduled => self.start_job().await,
            Trigger::QueueDelivery(body) => self.handle_delivery(&body).await,
            Trigger::Unrecognized => {
                debug!("Unrecognized invocation payload; ignoring");
                Ok(HandlerOutcome::Ignored)
            }
        }
    }

    /// Start a new extraction job for the configured lookback date.
    ///
    /// This is the only place a `log_date` is created; every descendant
    /// message inherits it unchanged.
    pub async fn start_job(&self) -> Result<HandlerOutcome> {
        let log_date = log_date_for_lookback(self.lookback_days);
        info!(log_date = %log_date, "Scheduled tick; starting new extraction job");

        self.queues.send(&WorkMessage::init(log_date)).await?;
        Ok(HandlerOutcome::InitialMessageSent)
    }

    /// Process one delivered message body.
    ///
    /// A body that does not parse is a fatal error for this delivery; the
    /// queue's retry-then-dead-letter path owns recovery.
    pub async fn handle_delivery(&self, body: &str) -> Result<HandlerOutcome> {
        let message = WorkMessage::from_json_str(body)?;
        debug!(
            operation = message.operation.as_str(),
            log_date = %message.log_date,
            page = message.page,
            total_pages = message.total_pages,
            "Dispatching work message"
        );

        match message.operation {
            Operation::ExtractInit | Operation::ExtractContinue => {
                self.scheduler.schedule(&message).await
            }
            Operation::Extract => {
                self.extractor
                    .extract(&message.log_date, message.page)
                    .await
            }
        }
    }
}
