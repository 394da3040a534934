//! # Upstream Audit API Client
//!
//! Thin client for the paginated audit-log endpoint. Two calls exist:
//! a discovery call (`since` only) that reads the pagination metadata, and
//! a per-page extraction call (`since` plus `page[number]`).
//!
//! Failure handling differs by call on purpose. Discovery degrades to "no
//! page count available this cycle" so a flaky upstream halts fan-out
//! without failing the invocation; extraction failures propagate so the
//! queue's redelivery mechanism retries the page.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::UpstreamConfig;
use crate::error::{AuditflowError, Result};

/// Response body of the audit endpoint. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AuditLogPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

/// Pagination metadata returned by the discovery call
#[derive(Debug, Deserialize)]
pub struct PaginationMeta {
    pub total_pages: u32,
}

/// Client for the upstream audit API
#[derive(Debug, Clone)]
pub struct AuditApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AuditApiClient {
    /// Build a client with the configured base URL, token, and timeout
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AuditflowError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Discovery call: learn how many pages exist for `log_date`.
    ///
    /// Returns `None` on any failure (timeout, non-2xx, malformed or missing
    /// pagination metadata). The caller treats `None` as "perform no fan-out
    /// this cycle", not as an error.
    pub async fn probe_total_pages(&self, log_date: &str) -> Option<u32> {
        debug!(log_date, "Probing pagination metadata");

        let page = match self.get_page(&[("since", log_date)]).await {
            Ok(page) => page,
            Err(e) => {
                error!(log_date, error = %e, "Pagination probe failed");
                return None;
            }
        };

        match page.pagination {
            Some(meta) => {
                debug!(log_date, total_pages = meta.total_pages, "Probe succeeded");
                Some(meta.total_pages)
            }
            None => {
                warn!(log_date, "Probe response carried no pagination metadata");
                None
            }
        }
    }

    /// Extraction call: fetch the records of one page.
    ///
    /// Any failure is an error for the message being processed; the queue's
    /// retry mechanism takes it from there.
    pub async fn fetch_page(&self, log_date: &str, page: u32) -> Result<Vec<Value>> {
        debug!(log_date, page, "Fetching audit page");

        let page_number = page.to_string();
        let body = self
            .get_page(&[("since", log_date), ("page[number]", page_number.as_str())])
            .await?;
        Ok(body.data)
    }

    async fn get_page(&self, query: &[(&str, &str)]) -> Result<AuditLogPage> {
        let response = self
            .http
            .get(&self.base_url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<AuditLogPage>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AuditApiClient {
        AuditApiClient::new(&UpstreamConfig {
            api_url: server.uri(),
            token: "t0ken".to_string(),
            request_timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn probe_reads_total_pages_from_pagination_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("since", "2026-08-26"))
            .and(bearer_token("t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "evt-1"}],
                "pagination": {"current_page": 1, "total_pages": 25, "total_count": 2471}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.probe_total_pages("2026-08-26").await, Some(25));
    }

    #[tokio::test]
    async fn probe_degrades_to_none_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.probe_total_pages("2026-08-26").await, None);
    }

    #[tokio::test]
    async fn probe_degrades_to_none_when_metadata_is_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.probe_total_pages("2026-08-26").await, None);
    }

    #[tokio::test]
    async fn fetch_page_returns_records_and_passes_the_page_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("since", "2026-08-26"))
            .and(query_param("page[number]", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": "evt-9"}, {"id": "evt-10"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let records = client.fetch_page("2026-08-26", 3).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn fetch_page_propagates_upstream_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.fetch_page("2026-08-26", 1).await.unwrap_err();
        assert!(matches!(err, AuditflowError::Upstream { .. }));
    }
}
