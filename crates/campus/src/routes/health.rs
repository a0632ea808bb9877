//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::routing::CacheStats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub base_domain: String,
    pub domain_cache: CacheStats,
    pub lookups_in_flight: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        base_domain: state.resolver.base_domain().to_string(),
        domain_cache: state.resolver.cache().stats(),
        lookups_in_flight: state.resolver.remote().in_flight_count(),
    })
}

/// Liveness probe (just returns 200 if the server is running)
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
