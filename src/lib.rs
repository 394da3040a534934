#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Auditflow Core
//!
//! Queue-driven extraction of paginated audit-log data from an upstream API
//! into durable storage, without ever processing more pages per invocation
//! than one worker step can safely handle.
//!
//! ## Overview
//!
//! One logical job ("extract every page of audit data for one date") is
//! never materialized as a record anywhere. It exists only as the set of
//! messages sharing a `log_date`, flowing through a PGMQ-backed work queue:
//!
//! 1. A scheduled tick sends an `extract_init` message for the target date.
//! 2. The fan-out scheduler probes the upstream once for the total page
//!    count, then emits up to nine per-page `extract` messages plus at most
//!    one `extract_continue` message that resumes fan-out further along.
//! 3. Page extractors run in parallel, each fetching one page and writing
//!    it to storage under a deterministic key (idempotent overwrite).
//! 4. Messages that exhaust their delivery budget land on a dead-letter
//!    queue; the replayer resets their retry count and reinjects them onto
//!    the main queue after a fixed cooldown.
//!
//! Correctness depends entirely on the queue, not on in-process
//! coordination: delivery is at-least-once, pages are disjoint units of
//! work, and per-page extraction is idempotent.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Work message wire format and the PGMQ queue client
//! - [`extraction`] - Trigger classification, fan-out scheduling, page
//!   extraction, and dead-letter replay
//! - [`upstream`] - Audit API client (pagination probe + page fetch)
//! - [`storage`] - Durable page storage behind the `AuditStore` seam
//! - [`worker`] - The main-queue poll loop
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing setup

pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod messaging;
pub mod storage;
pub mod upstream;
pub mod worker;

#[cfg(test)]
mod test_utils;

pub use config::AuditflowConfig;
pub use error::{AuditflowError, Result};
pub use extraction::{
    DeadLetterReplayer, Dispatcher, FanOutScheduler, HandlerOutcome, PageExtractor,
};
pub use messaging::{ExtractionQueues, Operation, WorkMessage, WorkQueue};
pub use storage::{AuditStore, FileStore};
pub use upstream::AuditApiClient;
pub use worker::ExtractionWorker;
