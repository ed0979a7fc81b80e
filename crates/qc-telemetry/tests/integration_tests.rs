//! Integration tests for the REST store against a local PostgREST stand-in.
//!
//! The stand-in serves a `logs` table with limit/offset paging so the
//! store's page walking, label translation and error mapping are exercised
//! over real HTTP.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use qc_core::{BuildContext, QcError, QualityCounters, WindowSpec};
use qc_telemetry::{LabelVocabulary, RestStoreConfig, RestTelemetryStore, TelemetryAggregator};
use serde_json::{json, Value};

fn rows() -> Vec<Value> {
    (0..25)
        .map(|i| {
            json!({
                "created_at": format!("2026-10-18T10:{:02}:00.000000+00:00", i),
                "prediction": if i % 5 == 0 { "Dry" } else { "Fresh" },
                "confidence": 91.0
            })
        })
        .collect()
}

async fn logs(Query(params): Query<HashMap<String, String>>) -> Json<Vec<Value>> {
    let limit: usize = params.get("limit").and_then(|v| v.parse().ok()).unwrap_or(1000);
    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    Json(rows().into_iter().skip(offset).take(limit).collect())
}

async fn broken_rows() -> Json<Vec<Value>> {
    Json(vec![json!({ "created_at": "2026-10-18T10:00:00Z", "prediction": "Fresh" }), json!({ "prediction": "Dry" })])
}

async fn down() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn serve() -> String {
    let app = Router::new()
        .route("/rest/v1/logs", get(logs))
        .route("/rest/v1/broken", get(broken_rows))
        .route("/rest/v1/down", get(down));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn aggregator(base_url: &str, table: &str) -> TelemetryAggregator {
    let mut config = RestStoreConfig::new(base_url, "service-role-key");
    config.table = table.to_string();
    config.page_size = 4;
    config.timeout = Duration::from_secs(5);
    let store = RestTelemetryStore::new(config, LabelVocabulary::default()).unwrap();
    TelemetryAggregator::new(Arc::new(store), Duration::from_secs(10))
}

fn ctx() -> BuildContext {
    BuildContext::new(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
}

#[tokio::test]
async fn test_rest_store_walks_every_page() {
    let base = serve().await;
    let agg = aggregator(&base, "logs");

    let window = agg.resolve_window(&WindowSpec::LastHours(24), &ctx()).await.unwrap();
    let counters = agg.aggregate(&window).await.unwrap();

    // i % 5 == 0 → Dry: 0, 5, 10, 15, 20
    assert_eq!(counters, QualityCounters::new(20, 5));
}

#[tokio::test]
async fn test_rest_store_all_time_reads_floor() {
    let base = serve().await;
    let agg = aggregator(&base, "logs");

    let window = agg.resolve_window(&WindowSpec::AllTime, &ctx()).await.unwrap();
    assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap());
}

#[tokio::test]
async fn test_rest_store_schema_violation() {
    let base = serve().await;
    let agg = aggregator(&base, "broken");

    let window = agg.resolve_window(&WindowSpec::LastHours(24), &ctx()).await.unwrap();
    let err = agg.aggregate(&window).await.unwrap_err();
    assert!(matches!(err, QcError::StoreSchema(_)), "got {err:?}");
}

#[tokio::test]
async fn test_rest_store_unavailable() {
    let base = serve().await;
    let agg = aggregator(&base, "down");

    let window = agg.resolve_window(&WindowSpec::LastHours(24), &ctx()).await.unwrap();
    let err = agg.aggregate(&window).await.unwrap_err();
    assert!(matches!(err, QcError::StoreUnavailable(_)), "got {err:?}");
}
