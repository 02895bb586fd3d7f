//! HTTP client for the SAR tracker backend

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sartrack_core::date_range::DateRange;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Cases are fetched in pages of this size until a short page comes back
const PAGE_SIZE: usize = 100;
/// Paging stops with an error past this many cases
const MAX_CASES: usize = 100_000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin client over the backend's read endpoints.
///
/// Rows come back as raw JSON; turning them into typed records is the job of
/// `sartrack_core::ingest`.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error bodies: FastAPI-style `detail`, or a plain `error` field
#[derive(Deserialize)]
struct ErrorResponse {
    detail: Option<Value>,
    error: Option<String>,
}

impl Client {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// GET `path`, returning `None` when the endpoint does not exist.
    async fn get_rows(&self, path: &str, query: &[(&str, String)]) -> Result<Option<Vec<Value>>> {
        let mut request = self.http.get(format!("{}{}", self.base_url, path)).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to {}", self.base_url))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "Endpoint not available");
            return Ok(None);
        }

        if !status.is_success() {
            let message = match resp.json::<ErrorResponse>().await {
                Ok(ErrorResponse { detail: Some(Value::String(s)), .. }) => s,
                Ok(ErrorResponse { detail: Some(other), .. }) => other.to_string(),
                Ok(ErrorResponse { error: Some(e), .. }) => e,
                _ => status.to_string(),
            };
            anyhow::bail!("{} {}: {}", path, status.as_u16(), message);
        }

        match resp.json::<Value>().await.context("Invalid JSON from server")? {
            Value::Array(rows) => Ok(Some(rows)),
            _ => anyhow::bail!("Unexpected response from {}: expected a JSON array", path),
        }
    }

    /// GET /sar/ (all pages)
    pub async fn list_cases(&self) -> Result<Vec<Value>> {
        let mut cases: Vec<Value> = Vec::new();

        loop {
            let query = [("skip", cases.len().to_string()), ("limit", PAGE_SIZE.to_string())];
            let page = self
                .get_rows("/sar/", &query)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Server has no /sar/ endpoint"))?;

            // Anything but a full page is the last one, including a server
            // that ignores `limit` and answers with everything at once
            let last_page = page.len() != PAGE_SIZE;
            cases.extend(page);
            if last_page {
                break;
            }

            if cases.len() >= MAX_CASES {
                anyhow::bail!("Server returned more than {} cases; giving up paging", MAX_CASES);
            }
        }

        debug!(count = cases.len(), "Fetched cases");
        Ok(cases)
    }

    /// GET /dashboard/deadlines
    pub async fn deadline_rows(&self, days: i64) -> Result<Option<Vec<Value>>> {
        self.get_rows("/dashboard/deadlines", &[("days", days.to_string())])
            .await
    }

    /// GET /calendar/events
    pub async fn calendar_rows(&self, range: DateRange) -> Result<Option<Vec<Value>>> {
        let query = [
            ("start_date", range.from.format("%Y-%m-%d").to_string()),
            ("end_date", range.to.format("%Y-%m-%d").to_string()),
        ];
        self.get_rows("/calendar/events", &query).await
    }
}
