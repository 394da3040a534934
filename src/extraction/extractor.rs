//! # Page Extractor
//!
//! Processes one `extract` message: fetch the page, write its records to
//! storage under the deterministic key. Empty pages are a normal outcome,
//! not an error; fetch and write failures propagate so the queue's
//! redelivery mechanism retries the page. Because the key is deterministic
//! and writes overwrite, re-processing a page is harmless.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::extraction::HandlerOutcome;
use crate::storage::AuditStore;
use crate::upstream::AuditApiClient;

/// Fetches one audit page and persists it
#[derive(Clone)]
pub struct PageExtractor {
    upstream: Arc<AuditApiClient>,
    store: Arc<dyn AuditStore>,
}

impl PageExtractor {
    pub fn new(upstream: Arc<AuditApiClient>, store: Arc<dyn AuditStore>) -> Self {
        Self { upstream, store }
    }

    /// Extract one page for `log_date`.
    ///
    /// Pages legitimately come back empty: the upstream may report a page
    /// count larger than its actual content, and placeholder fan-out after a
    /// failed probe lands here for dates with no events at all.
    pub async fn extract(&self, log_date: &str, page: u32) -> Result<HandlerOutcome> {
        info!(log_date, page, "Extracting audit page");

        let records = self.upstream.fetch_page(log_date, page).await?;
        if records.is_empty() {
            info!(log_date, page, "Page carried no records; nothing to store");
            return Ok(HandlerOutcome::NothingToStore);
        }

        let key = self.store.put_page(log_date, page, &records).await?;
        info!(log_date, page, key = %key, records = records.len(), "Page stored");
        Ok(HandlerOutcome::Stored)
    }
}
