//! PostgREST-style telemetry store (the sorting line's `logs` table)
//!
//! Rows look like `{"created_at": "...+00:00", "prediction": "Fresh", "confidence": 97.3}`.
//! Pages are requested with `limit`/`offset` ordered by `created_at`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use qc_core::TelemetryEvent;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::store::{EventStream, StoreError, TelemetryStore};
use crate::vocabulary::LabelVocabulary;

#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    pub api_key: String,
    pub table: String,
    pub page_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RestStoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            table: "logs".to_string(),
            page_size: 1000,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogRow {
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

pub struct RestTelemetryStore {
    client: reqwest::Client,
    config: RestStoreConfig,
    vocabulary: LabelVocabulary,
}

impl RestTelemetryStore {
    pub fn new(config: RestStoreConfig, vocabulary: LabelVocabulary) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: RestStoreConfig {
                page_size: config.page_size.max(1),
                ..config
            },
            vocabulary,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    async fn get_rows(&self, query: &[(&str, String)]) -> Result<Vec<Value>, StoreError> {
        let resp = self
            .client
            .get(self.endpoint())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Schema(format!("response is not a row array: {e}")))
    }

    async fn fetch_page(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        offset: usize,
    ) -> Result<Vec<TelemetryEvent>, StoreError> {
        let query = [
            ("select", "created_at,prediction,confidence".to_string()),
            ("created_at", format!("gte.{}", stamp(start))),
            ("created_at", format!("lt.{}", stamp(end))),
            ("order", "created_at.asc".to_string()),
            ("limit", self.config.page_size.to_string()),
            ("offset", offset.to_string()),
        ];
        let rows = self.get_rows(&query).await?;
        tracing::debug!(offset, rows = rows.len(), "telemetry page fetched");

        rows.into_iter()
            .map(|row| decode_row(row, &self.vocabulary))
            .collect()
    }
}

#[async_trait]
impl TelemetryStore for RestTelemetryStore {
    fn query_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> EventStream<'_> {
        if start >= end {
            return stream::empty().boxed();
        }

        let page_size = self.config.page_size;
        let pages = stream::try_unfold(Some(0usize), move |offset| async move {
            let Some(offset) = offset else {
                return Ok::<_, StoreError>(None);
            };
            let page = self.fetch_page(start, end, offset).await?;
            let next = if page.len() < page_size {
                None
            } else {
                Some(offset + page.len())
            };
            Ok(Some((page, next)))
        });

        pages
            .map_ok(|page| stream::iter(page.into_iter().map(Ok::<TelemetryEvent, StoreError>)))
            .try_flatten()
            .boxed()
    }

    async fn earliest_event(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let query = [
            ("select", "created_at".to_string()),
            ("order", "created_at.asc".to_string()),
            ("limit", "1".to_string()),
        ];
        let rows = self.get_rows(&query).await?;
        match rows.into_iter().next() {
            None => Ok(None),
            Some(row) => {
                let raw = row
                    .get("created_at")
                    .and_then(Value::as_str)
                    .ok_or_else(|| StoreError::Schema("row missing created_at".to_string()))?;
                parse_timestamp(raw).map(Some)
            }
        }
    }
}

fn stamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Unavailable(format!("request timed out: {e}"))
    } else {
        StoreError::Unavailable(format!("HTTP error: {e}"))
    }
}

/// 400 means the filter or columns don't match the table: a contract problem,
/// not an outage.
pub(crate) fn status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::BAD_REQUEST => StoreError::Schema(format!("HTTP {status}: {body}")),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Unavailable(format!("credentials rejected (HTTP {status})"))
        }
        _ => StoreError::Unavailable(format!("HTTP {status}: {body}")),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Schema(format!("bad created_at '{raw}': {e}")))
}

/// Row → canonical event. Confidence recorded as a percentage is scaled
/// into [0, 1].
pub(crate) fn decode_row(row: Value, vocabulary: &LabelVocabulary) -> Result<TelemetryEvent, StoreError> {
    let row: LogRow =
        serde_json::from_value(row).map_err(|e| StoreError::Schema(format!("undecodable row: {e}")))?;

    let created_at = row
        .created_at
        .ok_or_else(|| StoreError::Schema("row missing created_at".to_string()))?;
    let prediction = row
        .prediction
        .ok_or_else(|| StoreError::Schema("row missing prediction".to_string()))?;

    let timestamp = parse_timestamp(&created_at)?;
    let label = vocabulary.translate(&prediction)?;

    let confidence = match row.confidence {
        None => None,
        Some(c) if (0.0..=1.0).contains(&c) => Some(c),
        Some(c) if c > 1.0 && c <= 100.0 => Some(c / 100.0),
        Some(c) => {
            return Err(StoreError::Schema(format!("confidence {c} out of range")));
        }
    };

    Ok(TelemetryEvent {
        timestamp,
        label,
        confidence,
    })
}
