//! Window resolution and event → counter reduction
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use qc_core::{BuildContext, Label, QcError, QualityCounters, TimeWindow, WindowSpec};

use crate::store::{StoreError, TelemetryStore};

pub struct TelemetryAggregator {
    store: Arc<dyn TelemetryStore>,
    /// Bound on one whole aggregation (all pages)
    timeout: Duration,
}

impl TelemetryAggregator {
    pub fn new(store: Arc<dyn TelemetryStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Resolve against the build's snapshot. Only `all-time` touches the
    /// store, to read its lower bound.
    pub async fn resolve_window(
        &self,
        spec: &WindowSpec,
        ctx: &BuildContext,
    ) -> Result<TimeWindow, QcError> {
        let earliest = if spec.is_all_time() {
            tokio::time::timeout(self.timeout, self.store.earliest_event())
                .await
                .map_err(|_| timed_out(self.timeout))??
        } else {
            None
        };
        spec.resolve(ctx.now, earliest)
    }

    /// Count every event in `window`. Either all pages are read or the
    /// call fails; a partial count is never returned.
    pub async fn aggregate(&self, window: &TimeWindow) -> Result<QualityCounters, QcError> {
        let counters = tokio::time::timeout(self.timeout, self.count(window))
            .await
            .map_err(|_| timed_out(self.timeout))??;

        tracing::debug!(
            window = %window.label,
            total = counters.total(),
            rejected = counters.rejected(),
            "telemetry aggregated"
        );
        Ok(counters)
    }

    async fn count(&self, window: &TimeWindow) -> Result<QualityCounters, StoreError> {
        let mut accepted = 0u64;
        let mut rejected = 0u64;

        let mut events = self.store.query_events(window.start, window.end);
        while let Some(event) = events.next().await {
            let event = event?;
            if !window.contains(&event.timestamp) {
                return Err(StoreError::Schema(format!(
                    "store returned event at {} outside [{}, {})",
                    event.timestamp.to_rfc3339(),
                    window.start.to_rfc3339(),
                    window.end.to_rfc3339()
                )));
            }
            match event.label {
                Label::Accepted => accepted += 1,
                Label::Rejected => rejected += 1,
            }
        }

        Ok(QualityCounters::new(accepted, rejected))
    }
}

fn timed_out(timeout: Duration) -> QcError {
    QcError::StoreUnavailable(format!("store query timed out after {:?}", timeout))
}
