//! # Filesystem Store
//!
//! Object storage over a mounted filesystem root. Payloads are JSON arrays
//! of records, gzip-compressed when configured. Writes replace whatever is
//! already at the key.

use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{AuditflowError, Result};
use crate::storage::{object_key, AuditStore};

/// Audit page store rooted at a local directory (typically a bucket mount)
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    prefix: String,
    compress: bool,
}

impl FileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root_dir),
            prefix: config.prefix.clone(),
            compress: config.compress,
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn encode(&self, key: &str, records: &[Value]) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(records)?;
        if !self.compress {
            return Ok(json);
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|e| AuditflowError::storage(key, format!("gzip encoding failed: {e}")))?;
        encoder
            .finish()
            .map_err(|e| AuditflowError::storage(key, format!("gzip encoding failed: {e}")))
    }
}

#[async_trait]
impl AuditStore for FileStore {
    async fn put_page(&self, log_date: &str, page: u32, records: &[Value]) -> Result<String> {
        let key = object_key(&self.prefix, log_date, page, self.compress);
        let path = self.path_for(&key);

        debug!(key = %key, records = records.len(), "Writing audit page");

        let payload = self.encode(&key, records)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuditflowError::storage(&key, e.to_string()))?;
        }
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| AuditflowError::storage(&key, e.to_string()))?;

        info!(key = %key, log_date, page, "Stored audit page");
        Ok(key)
    }
}
