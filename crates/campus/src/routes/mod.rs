//! Campus routes

pub mod health;
pub mod storefront;
pub mod tenant;

use axum::{middleware, routing::get, Router};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    middleware::{require_campus, resolve_tenant},
    security::security_headers_middleware,
    state::AppState,
};

/// Create all campus routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    // Campus-only routes
    let campus_routes = Router::new()
        .route("/api/campus", get(tenant::campus_scope))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_campus));

    // Everything tenant-aware sits behind a single resolution
    let tenant_routes = Router::new()
        .route("/", get(storefront::index))
        .route("/api/tenant", get(tenant::current_tenant))
        .merge(campus_routes)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_tenant));

    // Static assets never wait on tenant resolution
    let assets = ServeDir::new(&state.config.assets_dir);

    Router::new()
        .merge(health_routes)
        .merge(tenant_routes)
        .nest_service("/assets", assets)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
