//! Campus resolution routes
//!
//! `GET /campus/resolve?hostname=<host>` maps a hostname to the campus that
//! owns it. Custom domains are looked up in `tenant_domains`; platform
//! subdomains (`acme.uselearnbase.com`) are looked up by slug.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use learnbase_shared::{
    classify, hostname::is_valid_hostname, normalize_host, HostClass, ResolveTenantResponse,
    ResolvedTenant, TenantId,
};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Lifecycle of a custom domain (stored as TEXT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainStatus {
    #[default]
    Pending,
    Verifying,
    Active,
    Failed,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Pending => "pending",
            DomainStatus::Verifying => "verifying",
            DomainStatus::Active => "active",
            DomainStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub hostname: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    slug: String,
    name: String,
}

impl From<TenantRow> for ResolvedTenant {
    fn from(row: TenantRow) -> Self {
        ResolvedTenant {
            id: Some(TenantId(row.id)),
            slug: row.slug,
            name: Some(row.name),
        }
    }
}

/// Resolve a hostname to its campus
pub async fn resolve_campus(
    State(state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> ApiResult<Json<ResolveTenantResponse>> {
    let raw = query
        .hostname
        .ok_or_else(|| ApiError::BadRequest("hostname query parameter is required".to_string()))?;

    let hostname = normalize_host(&raw);
    if !is_valid_hostname(&hostname) {
        return Err(ApiError::Validation(format!("invalid hostname: {}", raw)));
    }

    let tenant = match classify(&hostname, &state.config.base_domain) {
        HostClass::Subdomain(slug) => find_tenant_by_slug(&state.pool, &slug).await?,
        HostClass::CustomDomain(domain) => find_tenant_by_domain(&state.pool, &domain).await?,
        HostClass::Platform | HostClass::Loopback => None,
    };

    match tenant {
        Some(tenant) => {
            tracing::debug!(hostname = %hostname, slug = %tenant.slug, "Campus resolved");
            Ok(Json(ResolveTenantResponse { tenant }))
        }
        None => {
            tracing::debug!(hostname = %hostname, "No campus for hostname");
            Err(ApiError::TenantNotFound)
        }
    }
}

/// Active tenant owning an active custom domain
async fn find_tenant_by_domain(pool: &PgPool, domain: &str) -> ApiResult<Option<ResolvedTenant>> {
    let row: Option<TenantRow> = sqlx::query_as(
        r#"
        SELECT t.id, t.slug, t.name
        FROM tenant_domains d
        JOIN tenants t ON t.id = d.tenant_id
        WHERE d.hostname = $1
          AND d.verification_status = $2
          AND t.status = 'active'
        "#,
    )
    .bind(domain)
    .bind(DomainStatus::Active.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ResolvedTenant::from))
}

async fn find_tenant_by_slug(pool: &PgPool, slug: &str) -> ApiResult<Option<ResolvedTenant>> {
    let row: Option<TenantRow> =
        sqlx::query_as("SELECT id, slug, name FROM tenants WHERE slug = $1 AND status = 'active'")
            .bind(slug)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(ResolvedTenant::from))
}
