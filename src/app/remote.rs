//! Remote Adapter
//!
//! Fetches the remote collection and maps foreign records into quotes, and
//! pushes local quotes back best-effort. The adapter never touches the local
//! store; only the sync service applies what it returns.
//!
//! The HTTP endpoint is a generic create/list resource:
//! - `GET  <endpoint>` returns `[{id, title, body, updatedAt?}, ...]`
//! - `POST <endpoint>` accepts `{title, body, updatedAt}`

use crate::shared::quote::coerce_id;
use crate::shared::{now_timestamp, AppConfig, QuoteError, QuoteRecord, Result};
use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A source of remote quotes
pub trait RemoteSource: Send + Sync + 'static {
    /// Fetch and map the remote collection
    ///
    /// Fails with `QuoteError::Network` on transport errors or non-success
    /// status codes.
    fn fetch_remote(&self) -> impl Future<Output = Result<Vec<QuoteRecord>>> + Send;

    /// Send each record independently; one failure never stops the others
    fn push_remote(&self, records: &[QuoteRecord]) -> impl Future<Output = PushReport> + Send;
}

/// Aggregate outcome of a push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl PushReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Record shape served by the remote endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ForeignRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Body sent when pushing a quote
#[derive(Debug, Clone, Serialize)]
struct PushBody<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(rename = "updatedAt")]
    updated_at: &'a str,
}

impl ForeignRecord {
    /// Map into the local record shape
    ///
    /// `title` becomes the text (truncated to `max_text_len` characters,
    /// "Untitled" when missing), the first word of `body` becomes the category
    /// ("misc" when missing). Records without an id are skipped.
    pub fn into_quote(self, max_text_len: usize) -> Option<QuoteRecord> {
        let id = coerce_id(&self.id)?;
        let text = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.chars().take(max_text_len).collect(),
            _ => "Untitled".to_string(),
        };
        let category = self
            .body
            .as_deref()
            .and_then(|body| body.split_whitespace().next())
            .unwrap_or("misc")
            .to_string();
        let updated_at = self
            .updated_at
            .filter(|s| !s.is_empty())
            .unwrap_or_else(now_timestamp);
        Some(QuoteRecord::with_id(id, text, category, updated_at))
    }
}

/// Map the first `limit` entries of a fetched collection
///
/// Entries past the limit are never inspected. Entries inside it that do not
/// have the foreign record shape are skipped.
pub fn map_foreign(entries: Vec<Value>, limit: usize, max_text_len: usize) -> Vec<QuoteRecord> {
    entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| match serde_json::from_value::<ForeignRecord>(entry) {
            Ok(record) => record.into_quote(max_text_len),
            Err(e) => {
                tracing::warn!("Skipping malformed remote record: {}", e);
                None
            }
        })
        .collect()
}

/// HTTP implementation of [`RemoteSource`]
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    endpoint: String,
    remote_limit: usize,
    max_text_len: usize,
}

impl HttpRemote {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            remote_limit: config.remote_limit,
            max_text_len: config.max_text_len,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn push_one(&self, record: &QuoteRecord) -> Result<()> {
        let body = PushBody {
            title: &record.text,
            body: &record.category,
            updated_at: &record.updated_at,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(QuoteError::network(format!(
                "Server push failed: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl RemoteSource for HttpRemote {
    async fn fetch_remote(&self) -> Result<Vec<QuoteRecord>> {
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(QuoteError::network(format!(
                "Server fetch failed: {}",
                response.status()
            )));
        }
        let entries: Vec<Value> = response.json().await?;
        let mapped = map_foreign(entries, self.remote_limit, self.max_text_len);
        tracing::debug!("Fetched {} remote quotes from {}", mapped.len(), self.endpoint);
        Ok(mapped)
    }

    async fn push_remote(&self, records: &[QuoteRecord]) -> PushReport {
        let results = join_all(records.iter().map(|record| self.push_one(record))).await;
        let mut report = PushReport::default();
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!("Push of quote {} failed: {}", record.id, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}

/// In-process remote that keeps what is pushed to it
///
/// Used for offline runs and tests. Pushed quotes are recorded but do not
/// change what `fetch_remote` returns.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    records: Mutex<Vec<QuoteRecord>>,
    pushed: Mutex<Vec<QuoteRecord>>,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
}

impl MemoryRemote {
    pub fn new(records: Vec<QuoteRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn set_records(&self, records: Vec<QuoteRecord>) {
        if let Ok(mut current) = self.records.lock() {
            *current = records;
        }
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Everything successfully pushed so far
    pub fn pushed(&self) -> Vec<QuoteRecord> {
        self.pushed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl RemoteSource for MemoryRemote {
    async fn fetch_remote(&self) -> Result<Vec<QuoteRecord>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(QuoteError::network("Server fetch failed: 503 Service Unavailable"));
        }
        self.records
            .lock()
            .map(|r| r.clone())
            .map_err(|_| QuoteError::network("remote unavailable"))
    }

    async fn push_remote(&self, records: &[QuoteRecord]) -> PushReport {
        if self.fail_push.load(Ordering::SeqCst) {
            return PushReport {
                succeeded: 0,
                failed: records.len(),
            };
        }
        match self.pushed.lock() {
            Ok(mut pushed) => {
                pushed.extend_from_slice(records);
                PushReport {
                    succeeded: records.len(),
                    failed: 0,
                }
            }
            Err(_) => PushReport {
                succeeded: 0,
                failed: records.len(),
            },
        }
    }
}
