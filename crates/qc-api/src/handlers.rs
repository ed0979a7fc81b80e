//! API Handlers
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use qc_core::{BuildError, DocumentFormat, GenerationErrorKind, QcError, WindowSpec, QC_VERSION};
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

#[derive(Debug)]
pub struct ReportRequest {
    /// Alias string or `{ "start": ..., "end": ... }`
    pub window: WindowSpec,
    /// `html` unless given
    pub format: DocumentFormat,
}

impl ReportRequest {
    /// Field-by-field so a bad window and a bad format are reported apart
    pub fn from_json(payload: Value) -> Result<Self, ApiError> {
        let Value::Object(mut fields) = payload else {
            return Err(ApiError::InvalidRequest("request body must be a JSON object".into()));
        };
        let window = fields
            .remove("window")
            .ok_or_else(|| ApiError::InvalidRequest("missing field `window`".into()))?;
        let window: WindowSpec =
            serde_json::from_value(window).map_err(|e| ApiError::InvalidWindow(e.to_string()))?;
        let format = match fields.remove("format") {
            None | Some(Value::Null) => DocumentFormat::Html,
            Some(format) => serde_json::from_value(format)
                .map_err(|e| ApiError::InvalidRequest(format!("format: {}", e)))?,
        };
        Ok(Self { window, format })
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The requested window is unparseable or empty
    InvalidWindow(String),
    /// Any other unusable request field
    InvalidRequest(String),
    Build(BuildError),
    Internal(String),
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}

fn status_for(err: &QcError) -> StatusCode {
    match err {
        QcError::InvalidWindow(_) => StatusCode::BAD_REQUEST,
        QcError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        QcError::StoreSchema(_) => StatusCode::BAD_GATEWAY,
        QcError::GenerationService {
            kind: GenerationErrorKind::Timeout,
            ..
        } => StatusCode::GATEWAY_TIMEOUT,
        QcError::GenerationService { .. } | QcError::MalformedGeneration(_) => StatusCode::BAD_GATEWAY,
        QcError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidWindow(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "kind": "invalid_window", "stage": null, "window": null, "message": message }),
            ),
            ApiError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "kind": "invalid_request", "stage": null, "window": null, "message": message }),
            ),
            ApiError::Build(err) => (
                status_for(&err.source),
                json!({
                    "kind": err.source.kind(),
                    "stage": err.stage.id(),
                    "window": err.window,
                    "message": err.source.to_string(),
                }),
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "kind": "internal", "stage": null, "window": null, "message": message }),
            ),
        };
        (status, Json(json!({ "error": body }))).into_response()
    }
}

/// `POST /v1/reports`
pub async fn create_report(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let request = ReportRequest::from_json(payload)?;

    match state.orchestrator.produce(&request.window, request.format).await {
        Ok((report, artifact)) => {
            state.metrics.record_report(report.status);
            Ok(Json(json!({
                "report": report,
                "report_hash": report.content_hash(),
                "no_data": report.is_no_data(),
                "artifact": artifact,
            })))
        }
        Err(err) => {
            warn!(stage = %err.stage, window = %err.window, kind = err.source.kind(), "report request failed");
            state.metrics.record_failure(err.stage);
            Err(err.into())
        }
    }
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": QC_VERSION })))
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
