//! QC API /v1: on-demand report builds over HTTP
//!
//! - `POST /v1/reports` builds and publishes one report
//! - `GET /v1/health`
//! - `GET /v1/metrics` (Prometheus text format)
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use qc_narrative::{GeminiClient, ReportPromptBuilder};
use qc_out::DocumentRenderer;
use qc_pipeline::{ReportOrchestrator, DEFAULT_STORE_TIMEOUT};
use qc_quality::StatusClassifier;
use qc_telemetry::{LabelVocabulary, RestStoreConfig, RestTelemetryStore, TelemetryAggregator};
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, QcConfig};
pub use metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ReportOrchestrator>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(orchestrator: ReportOrchestrator) -> Result<Self, prometheus::Error> {
        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            metrics: Arc::new(ApiMetrics::new()?),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/reports", post(handlers::create_report))
        .route("/v1/health", get(handlers::health))
        .route("/v1/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

/// Wire the production collaborators: REST telemetry store, Gemini, file renderer
pub fn build_state(config: &QcConfig) -> anyhow::Result<AppState> {
    let url = config.store.url.clone().ok_or(ConfigError::Missing("DB_API"))?;
    let key = config
        .store
        .key
        .clone()
        .ok_or(ConfigError::Missing("DB_SERVICE_ROLE_KEY"))?;
    let api_key = config
        .generation
        .api_key
        .clone()
        .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

    let mut store_config = RestStoreConfig::new(url, key);
    store_config.table = config.store.table.clone();
    store_config.page_size = config.store.page_size;
    store_config.timeout = std::time::Duration::from_millis(config.store.timeout_ms);
    let store = RestTelemetryStore::new(store_config, LabelVocabulary::default())
        .context("telemetry store client")?;

    let generator = GeminiClient::with_endpoint(
        api_key,
        config.generation.base_url.clone(),
        config.generation.model.clone(),
    );

    let classifier = StatusClassifier::new(config.thresholds.clone());
    let narrator = ReportPromptBuilder::new(Arc::new(generator), classifier.clone())
        .context("prompt template")?
        .with_sampling(config.generation.sampling())
        .with_timeout(config.generation.timeout());
    let renderer = DocumentRenderer::new(config.reports_dir.clone()).context("document templates")?;

    let orchestrator = ReportOrchestrator::new(
        TelemetryAggregator::new(Arc::new(store), DEFAULT_STORE_TIMEOUT),
        classifier,
        narrator,
        renderer,
    )
    .with_retry(config.retry.clone());

    Ok(AppState::new(orchestrator)?)
}

pub async fn run(config: QcConfig) -> anyhow::Result<()> {
    let app = create_app(build_state(&config)?);
    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;

    tracing::info!(
        addr = %config.addr,
        reports_dir = %config.reports_dir.display(),
        model = %config.generation.model,
        "QC API listening"
    );
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
