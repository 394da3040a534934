//! # Fan-Out Scheduler
//!
//! The core scheduling algorithm. One invocation emits at most nine per-page
//! `extract` messages plus, when pages remain beyond them, exactly one
//! `extract_continue` message that resumes fan-out later. Nine, not ten: the
//! queue's batch send accepts ten entries, and one slot is reserved for the
//! continuation. Chaining continuations lets a job with an arbitrarily large
//! page count make bounded, steady progress with no external scheduler:
//! the queue itself is the scheduler.
//!
//! Continuation pages strictly increase, so a chain for `total_pages = T`
//! terminates after exactly `ceil(T / 9)` scheduling steps.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::extraction::HandlerOutcome;
use crate::messaging::{BatchEntry, Operation, WorkMessage, WorkQueue};
use crate::upstream::AuditApiClient;

/// Per-page messages emitted per scheduling step
pub const DISPATCH_WIDTH: u32 = 9;

/// Pure description of one fan-out step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutPlan {
    /// Pages to dispatch as `extract` messages, in order
    pub pages: Vec<u32>,
    /// Starting page of the continuation message, when one is needed
    pub continuation: Option<u32>,
}

impl FanOutPlan {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.continuation.is_none()
    }
}

/// Plan one fan-out step starting at `page` for a job of `total_pages`.
///
/// Emits pages `page ..= min(page + 8, total_pages)` and a continuation at
/// `page + 9` when that run still leaves pages uncovered. A `page` beyond
/// `total_pages` yields an empty plan: a prior step already covered
/// everything.
pub fn plan_fan_out(page: u32, total_pages: u32) -> FanOutPlan {
    let pages: Vec<u32> = (page..page.saturating_add(DISPATCH_WIDTH))
        .filter(|candidate| *candidate <= total_pages)
        .collect();

    let continuation = if page.saturating_add(DISPATCH_WIDTH) <= total_pages {
        Some(page + DISPATCH_WIDTH)
    } else {
        None
    };

    FanOutPlan {
        pages,
        continuation,
    }
}

/// Build the outbound batch for a plan. Entry ids are loop indices; they
/// only need to be unique within this one batch send.
pub fn build_entries(plan: &FanOutPlan, log_date: &str, total_pages: u32) -> Vec<BatchEntry> {
    let entries: Vec<BatchEntry> = plan
        .pages
        .iter()
        .map(|page| WorkMessage::extract(log_date, *page, total_pages))
        .chain(
            plan.continuation
                .map(|next| WorkMessage::continuation(log_date, next, total_pages)),
        )
        .enumerate()
        .map(|(index, body)| BatchEntry {
            id: index.to_string(),
            body,
        })
        .collect();

    entries
}

/// Schedules per-page extraction work over the main queue
#[derive(Clone)]
pub struct FanOutScheduler {
    queues: Arc<dyn WorkQueue>,
    upstream: Arc<AuditApiClient>,
}

impl FanOutScheduler {
    pub fn new(queues: Arc<dyn WorkQueue>, upstream: Arc<AuditApiClient>) -> Self {
        Self { queues, upstream }
    }

    /// Process an `extract_init` or `extract_continue` message.
    ///
    /// On `extract_init` the pagination probe runs once for the job; its
    /// result overwrites the placeholder `total_pages`. A failed probe keeps
    /// the placeholder, so the step degenerates to a single-page fan-out;
    /// the probe already logged the failure, and the invocation itself
    /// still succeeds.
    pub async fn schedule(&self, message: &WorkMessage) -> Result<HandlerOutcome> {
        let mut total_pages = message.total_pages;

        if message.operation == Operation::ExtractInit {
            info!(log_date = %message.log_date, "Starting extraction job");
            match self.upstream.probe_total_pages(&message.log_date).await {
                Some(discovered) => total_pages = discovered,
                None => {
                    warn!(
                        log_date = %message.log_date,
                        placeholder = total_pages,
                        "Page count unavailable; proceeding with placeholder"
                    );
                }
            }
        }

        let plan = plan_fan_out(message.page, total_pages);
        if plan.is_empty() {
            info!(
                log_date = %message.log_date,
                page = message.page,
                total_pages,
                "Nothing to continue"
            );
            return Ok(HandlerOutcome::NothingToContinue);
        }

        let entries = build_entries(&plan, &message.log_date, total_pages);
        self.queues.send_batch(&entries).await?;

        info!(
            log_date = %message.log_date,
            first_page = plan.pages.first().copied().unwrap_or(message.page),
            pages = plan.pages.len(),
            continuation = ?plan.continuation,
            total_pages,
            "Fan-out batch scheduled"
        );
        Ok(HandlerOutcome::BatchSent)
    }
}
