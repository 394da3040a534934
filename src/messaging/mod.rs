//! # Messaging Module
//!
//! PostgreSQL message queue (pgmq) based messaging for the extraction state
//! machine. The queue is the only coordination mechanism in the system:
//! job progress lives in message payloads, never in a database record.

pub mod message;
pub mod queue_client;
pub mod work_queue;

pub use message::{BatchEntry, Operation, WorkMessage};
pub use queue_client::{ExtractionQueues, QUEUE_BATCH_LIMIT};
pub use work_queue::WorkQueue;
