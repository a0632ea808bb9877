//! Tenant context endpoints for data-fetching layers

use axum::{extract::State, Json};
use serde::Serialize;

use learnbase_shared::TenantContext;

use crate::{
    error::{CampusError, CampusResult},
    middleware::CurrentTenant,
    state::AppState,
};

/// Context for this request, exactly as the middleware resolved it
pub async fn current_tenant(CurrentTenant(context): CurrentTenant) -> Json<TenantContext> {
    Json(context)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampusScope {
    pub slug: String,
    pub is_custom_domain: bool,
    /// Prefix for tenant-scoped backend calls
    pub api_base: String,
}

/// Tenant scope for API calls. Behind `require_campus`.
pub async fn campus_scope(
    State(state): State<AppState>,
    CurrentTenant(context): CurrentTenant,
) -> CampusResult<Json<CampusScope>> {
    let slug = context.slug().ok_or(CampusError::TenantNotFound)?;

    Ok(Json(CampusScope {
        slug: slug.to_string(),
        is_custom_domain: context.is_custom_domain(),
        api_base: format!("{}/api/v1/campuses/{}", state.config.tenant_api_url, slug),
    }))
}
