//! Report Orchestrator: aggregate → classify → narrate → render
//!
//! One "now" snapshot per build, taken before anything else runs and reused
//! for window resolution and `generated_at`. Collaborators are shared and
//! read-only; every build owns its counters, report and artifact.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use qc_core::{
    BuildContext, BuildError, Clock, DocumentArtifact, DocumentFormat, GenerationErrorKind,
    PipelineStage, QcError, Report, SystemClock, WindowSpec,
};
use qc_narrative::{GenerationService, ReportPromptBuilder};
use qc_out::DocumentRenderer;
use qc_quality::StatusClassifier;
use qc_telemetry::{TelemetryAggregator, TelemetryStore};
use tracing::{info, warn};

use crate::retry::RetryPolicy;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ReportOrchestrator {
    aggregator: TelemetryAggregator,
    classifier: StatusClassifier,
    narrator: ReportPromptBuilder,
    renderer: DocumentRenderer,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl ReportOrchestrator {
    pub fn new(
        aggregator: TelemetryAggregator,
        classifier: StatusClassifier,
        narrator: ReportPromptBuilder,
        renderer: DocumentRenderer,
    ) -> Self {
        Self {
            aggregator,
            classifier,
            narrator,
            renderer,
            clock: Arc::new(SystemClock),
            retry: RetryPolicy::default(),
        }
    }

    /// Default stages around an injected store and generation service
    pub fn from_collaborators(
        store: Arc<dyn TelemetryStore>,
        generator: Arc<dyn GenerationService>,
        renderer: DocumentRenderer,
    ) -> Result<Self, QcError> {
        let classifier = StatusClassifier::default();
        let narrator = ReportPromptBuilder::new(generator, classifier.clone())?;
        Ok(Self::new(
            TelemetryAggregator::new(store, DEFAULT_STORE_TIMEOUT),
            classifier,
            narrator,
            renderer,
        ))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Build the report for one window. A failed build never yields a Report.
    pub async fn build(&self, spec: &WindowSpec) -> Result<Report, BuildError> {
        let ctx = BuildContext::from_clock(self.clock.as_ref());
        self.build_with(spec, &ctx).await
    }

    /// Build and publish the document in `format`
    pub async fn produce(
        &self,
        spec: &WindowSpec,
        format: DocumentFormat,
    ) -> Result<(Report, DocumentArtifact), BuildError> {
        let ctx = BuildContext::from_clock(self.clock.as_ref());
        let report = self.build_with(spec, &ctx).await?;

        let artifact = self
            .renderer
            .render(&report, format)
            .map_err(|e| fail(PipelineStage::Render, &report.window.label, e, &ctx))?;

        Ok((report, artifact))
    }

    async fn build_with(&self, spec: &WindowSpec, ctx: &BuildContext) -> Result<Report, BuildError> {
        info!(trace_id = %ctx.trace_id, window = %spec, now = %ctx.now, "building report");

        let requested = spec.to_string();
        let window = self
            .with_store_retry(ctx, || self.aggregator.resolve_window(spec, ctx))
            .await
            .map_err(|e| fail(PipelineStage::Aggregate, &requested, e, ctx))?;

        let counters = self
            .with_store_retry(ctx, || self.aggregator.aggregate(&window))
            .await
            .map_err(|e| fail(PipelineStage::Aggregate, &window.label, e, ctx))?;

        let status = self.classifier.classify(&counters);
        info!(
            trace_id = %ctx.trace_id,
            total = counters.total(),
            rejected = counters.rejected(),
            status = %status,
            "counters classified"
        );

        let report = self
            .with_generation_retry(ctx, || {
                self.narrator.build_report(&counters, status, &window, ctx)
            })
            .await
            .map_err(|e| fail(PipelineStage::Narrate, &window.label, e, ctx))?;

        info!(
            trace_id = %ctx.trace_id,
            status = %report.status,
            sections = report.narrative_sections.len(),
            hash = %report.content_hash(),
            "report built"
        );
        Ok(report)
    }

    async fn with_store_retry<T, F, Fut>(&self, ctx: &BuildContext, mut op: F) -> Result<T, QcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QcError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(QcError::StoreUnavailable(msg)) if attempt < self.retry.store_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        trace_id = %ctx.trace_id,
                        attempt,
                        max = self.retry.store_attempts,
                        ?delay,
                        error = %msg,
                        "store unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn with_generation_retry<T, F, Fut>(
        &self,
        ctx: &BuildContext,
        mut op: F,
    ) -> Result<T, QcError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QcError>>,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Err(QcError::GenerationService {
                    kind: GenerationErrorKind::Timeout,
                    message,
                }) if retries < self.retry.generation_timeout_retries => {
                    retries += 1;
                    warn!(trace_id = %ctx.trace_id, retries, error = %message, "generation timed out, retrying");
                }
                other => return other,
            }
        }
    }
}

fn fail(stage: PipelineStage, window: &str, source: QcError, ctx: &BuildContext) -> BuildError {
    warn!(trace_id = %ctx.trace_id, %stage, window, kind = source.kind(), error = %source, "build failed");
    BuildError::new(stage, window, source)
}
