//! # Storage Module
//!
//! Durable page storage behind the [`AuditStore`] seam. Object keys are a
//! deterministic function of `log_date` and `page` with overwrite-on-collision
//! semantics; re-delivery of a page rewrites the same object instead of
//! duplicating it, which is what makes per-page extraction idempotent under
//! at-least-once delivery.

pub mod file_store;
pub mod memory_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Destination for extracted audit pages
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Write the records of one page under its deterministic key,
    /// overwriting any previous object at that key.
    async fn put_page(&self, log_date: &str, page: u32, records: &[Value]) -> Result<String>;
}

/// Deterministic object key for one extracted page.
///
/// Layout: `<prefix>/<YYYYMMDD>/<log_date>-page-<page>.json[.gz]`, grouping
/// a whole job under one date directory.
pub fn object_key(prefix: &str, log_date: &str, page: u32, compressed: bool) -> String {
    let date_compact = log_date.replace('-', "");
    let extension = if compressed { "json.gz" } else { "json" };
    format!("{prefix}/{date_compact}/{log_date}-page-{page:05}.{extension}")
}
