//! # Test Utilities
//!
//! Shared test doubles for the unit-test suite.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pgmq::types::Message;
use serde_json::Value;

use crate::error::Result;
use crate::messaging::{BatchEntry, WorkMessage, WorkQueue};

/// In-memory [`WorkQueue`] that records every outbound operation and serves
/// dead letters from a preloaded buffer.
#[derive(Default)]
pub struct RecordingQueue {
    next_id: AtomicI64,
    sent: Mutex<Vec<WorkMessage>>,
    batches: Mutex<Vec<Vec<BatchEntry>>>,
    replays: Mutex<Vec<(Value, u64)>>,
    dead_letters: Mutex<VecDeque<Message<Value>>>,
    deleted_dead_letters: Mutex<Vec<i64>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue whose dead-letter buffer holds one message per body, with
    /// message ids assigned in order starting from 1.
    pub fn with_dead_letters(bodies: Vec<Value>) -> Self {
        let queue = Self::default();
        {
            let mut dead_letters = queue.dead_letters.lock().unwrap();
            for (index, body) in bodies.into_iter().enumerate() {
                dead_letters.push_back(Message {
                    msg_id: index as i64 + 1,
                    vt: Utc::now(),
                    read_ct: 4,
                    enqueued_at: Utc::now(),
                    message: body,
                });
            }
        }
        queue
    }

    pub fn sent(&self) -> Vec<WorkMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<BatchEntry>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn replays(&self) -> Vec<(Value, u64)> {
        self.replays.lock().unwrap().clone()
    }

    pub fn deleted_dead_letters(&self) -> Vec<i64> {
        self.deleted_dead_letters.lock().unwrap().clone()
    }

    fn next_message_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl WorkQueue for RecordingQueue {
    async fn send(&self, message: &WorkMessage) -> Result<i64> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(self.next_message_id())
    }

    async fn send_batch(&self, entries: &[BatchEntry]) -> Result<Vec<i64>> {
        self.batches.lock().unwrap().push(entries.to_vec());
        Ok(entries.iter().map(|_| self.next_message_id()).collect())
    }

    async fn send_replay(&self, body: &Value, delay_seconds: u64) -> Result<i64> {
        self.replays.lock().unwrap().push((body.clone(), delay_seconds));
        Ok(self.next_message_id())
    }

    async fn read_dead_letters(
        &self,
        _visibility_timeout: i32,
        limit: i32,
    ) -> Result<Vec<Message<Value>>> {
        let mut dead_letters = self.dead_letters.lock().unwrap();
        let take = usize::try_from(limit).unwrap_or(0).min(dead_letters.len());
        Ok(dead_letters.drain(..take).collect())
    }

    async fn delete_dead_letter(&self, message_id: i64) -> Result<()> {
        self.deleted_dead_letters.lock().unwrap().push(message_id);
        Ok(())
    }
}
