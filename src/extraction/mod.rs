//! # Extraction State Machine
//!
//! The core of the pipeline: one logical "extract all pages for a date" job
//! is decomposed into many queue-dispatched units of work that collectively
//! cover every page, with bounded fan-out per invocation and a dead-letter
//! replay path for poisoned work.
//!
//! Control flow: trigger classification → (job start) pagination probe →
//! fan-out scheduling → queue → per-page extraction and/or further
//! continuation scheduling → storage. Independently: main queue →
//! dead-letter queue → replayer → main queue.

pub mod dispatcher;
pub mod extractor;
pub mod replay;
pub mod scheduler;
pub mod trigger;

use std::fmt;

pub use dispatcher::Dispatcher;
pub use extractor::PageExtractor;
pub use replay::{DeadLetterReplayer, ReplaySummary};
pub use scheduler::{plan_fan_out, FanOutPlan, FanOutScheduler, DISPATCH_WIDTH};
pub use trigger::{classify, log_date_for_lookback, Trigger, SCHEDULE_SOURCE};

/// Status an invocation reports after processing one trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A scheduled tick started a new job
    InitialMessageSent,
    /// A fan-out step dispatched a batch of work messages
    BatchSent,
    /// Fan-out was asked to resume past the last page; nothing left to send
    NothingToContinue,
    /// A page was fetched and written to storage
    Stored,
    /// A page was fetched but carried no records; no write happened
    NothingToStore,
    /// The invocation payload was not recognized; deliberately a no-op
    Ignored,
}

impl fmt::Display for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HandlerOutcome::InitialMessageSent => "Initial message sent",
            HandlerOutcome::BatchSent => "Batch messages sent",
            HandlerOutcome::NothingToContinue => "Nothing to continue",
            HandlerOutcome::Stored => "File stored",
            HandlerOutcome::NothingToStore => "Nothing to store",
            HandlerOutcome::Ignored => "Ignored",
        };
        write!(f, "{label}")
    }
}
