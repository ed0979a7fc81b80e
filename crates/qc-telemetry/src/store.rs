use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use qc_core::{QcError, TelemetryEvent};
use thiserror::Error;

pub type EventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<TelemetryEvent, StoreError>> + Send + 'a>>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Transport failure, timeout, or the store refused to serve
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Records that break the event contract (missing fields, unknown labels)
    #[error("schema violation: {0}")]
    Schema(String),
}

impl From<StoreError> for QcError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => QcError::StoreUnavailable(msg),
            StoreError::Schema(msg) => QcError::StoreSchema(msg),
        }
    }
}

/// Read-only query surface over recorded telemetry.
///
/// Implementations must be safe to share across concurrent builds and must
/// return an empty stream when `start == end`.
#[async_trait]
pub trait TelemetryStore: Send + Sync {
    /// Events with `start <= timestamp < end`, fetched lazily page by page.
    fn query_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> EventStream<'_>;

    /// Timestamp of the oldest recorded event, `None` for an empty store.
    async fn earliest_event(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}
