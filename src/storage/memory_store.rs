//! In-memory store used by tests and dry runs. Same overwrite-by-key
//! semantics as the real backends, no durability.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::storage::{object_key, AuditStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<Value>>>,
    prefix: String,
}

impl MemoryStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            prefix: prefix.into(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<Value>> {
        self.objects.lock().expect("store lock").get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("store lock")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn put_page(&self, log_date: &str, page: u32, records: &[Value]) -> Result<String> {
        let key = object_key(&self.prefix, log_date, page, false);
        self.objects
            .lock()
            .expect("store lock")
            .insert(key.clone(), records.to_vec());
        Ok(key)
    }
}
