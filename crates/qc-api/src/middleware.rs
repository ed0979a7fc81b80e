//! Cross-cutting layers for the router.
use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Dashboards call from other origins; only the report surface is exposed
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
