//! In-process telemetry store, paginated the same way as the REST store
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use qc_core::TelemetryEvent;

use crate::store::{EventStream, StoreError, TelemetryStore};

pub const DEFAULT_PAGE_SIZE: usize = 1000;

pub struct InMemoryTelemetryStore {
    /// Kept sorted by timestamp
    events: RwLock<Vec<TelemetryEvent>>,
    page_size: usize,
}

impl InMemoryTelemetryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            page_size: page_size.max(1),
        }
    }

    pub fn from_events(events: impl IntoIterator<Item = TelemetryEvent>) -> Self {
        let store = Self::new();
        store.extend(events);
        store
    }

    /// Append events. Committed events are never removed.
    pub fn extend(&self, events: impl IntoIterator<Item = TelemetryEvent>) {
        let mut guard = match self.events.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.extend(events);
        guard.sort_by_key(|e| e.timestamp);
    }

    pub fn push(&self, event: TelemetryEvent) {
        self.extend(std::iter::once(event));
    }

    pub fn len(&self) -> usize {
        self.read(|events| events.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&[TelemetryEvent]) -> T) -> T {
        match self.events.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn page(&self, start: DateTime<Utc>, end: DateTime<Utc>, offset: usize) -> Vec<TelemetryEvent> {
        self.read(|events| {
            events
                .iter()
                .filter(|e| e.timestamp >= start && e.timestamp < end)
                .skip(offset)
                .take(self.page_size)
                .cloned()
                .collect()
        })
    }
}

impl Default for InMemoryTelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TelemetryStore for InMemoryTelemetryStore {
    fn query_events(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> EventStream<'_> {
        let pages = stream::try_unfold(Some(0usize), move |offset| async move {
            let Some(offset) = offset else {
                return Ok::<_, StoreError>(None);
            };
            let page = self.page(start, end, offset);
            let next = if page.len() < self.page_size {
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
        Ok(self.read(|events| events.first().map(|e| e.timestamp)))
    }
}
