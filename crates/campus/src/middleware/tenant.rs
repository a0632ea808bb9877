//! Tenant context propagation
//!
//! `resolve_tenant` runs once per request, ahead of every tenant-aware route,
//! and stores the resulting `TenantContext` in the request extensions.
//! Handlers read it with the `CurrentTenant` extractor and never resolve again.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use learnbase_shared::{classify, normalize_host, HostClass, TenantContext};

use crate::{error::CampusError, routing::DevSelection, state::AppState};

const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Normalized host the request was resolved from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHost(pub String);

/// Tenant context resolved by [`resolve_tenant`] for this request
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub TenantContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = CampusError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .map(CurrentTenant)
            .ok_or(CampusError::ContextMissing)
    }
}

/// Host the client asked for.
///
/// `X-Forwarded-Host` is only honoured behind a trusted proxy; otherwise the
/// `Host` header, then the URI authority.
pub fn inbound_host(headers: &HeaderMap, uri: &Uri, trust_forwarded_host: bool) -> Option<String> {
    let forwarded = trust_forwarded_host
        .then(|| headers.get(X_FORWARDED_HOST))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| headers.get(header::HOST).and_then(|v| v.to_str().ok()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .map(normalize_host)
        .filter(|h| !h.is_empty())
}

/// Middleware that resolves the request's campus once and attaches it
pub async fn resolve_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Already resolved further out in the stack
    if request.extensions().get::<TenantContext>().is_some() {
        return next.run(request).await;
    }

    let host = inbound_host(
        request.headers(),
        request.uri(),
        state.config.trust_forwarded_host,
    )
    .unwrap_or_default();

    // The override (and its cookie) only exists on loopback hosts
    let selection = if classify(&host, state.resolver.base_domain()) == HostClass::Loopback {
        state
            .resolver
            .dev_override()
            .selection(request.uri(), request.headers())
    } else {
        DevSelection::default()
    };
    let context = state.resolver.resolve(&host, &selection).await;

    tracing::debug!(
        host = %host,
        slug = ?context.slug(),
        is_campus = context.is_campus(),
        is_custom_domain = context.is_custom_domain(),
        "Tenant resolved"
    );

    request.extensions_mut().insert(RequestHost(host));
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    selection.write_cookie(response.headers_mut());
    response
}

/// Route guard for campus-only routes.
///
/// Marketing-domain requests are redirected to the marketing site; custom
/// domains that failed to resolve get `TENANT_NOT_FOUND`.
pub async fn require_campus(
    State(state): State<AppState>,
    CurrentTenant(context): CurrentTenant,
    request: Request,
    next: Next,
) -> Response {
    if !context.is_campus() {
        return Redirect::temporary(&state.config.marketing_url).into_response();
    }
    if context.is_tenant_not_found() {
        return CampusError::TenantNotFound.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_inbound_host_prefers_host_header() {
        let h = headers(&[("host", "Acme.UseLearnbase.com:443")]);
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(
            inbound_host(&h, &uri, false).as_deref(),
            Some("acme.uselearnbase.com")
        );
    }

    #[test]
    fn test_forwarded_host_needs_trust() {
        let h = headers(&[
            ("host", "campus-internal:3001"),
            ("x-forwarded-host", "learn.acme.com, proxy.internal"),
        ]);
        let uri: Uri = "/".parse().unwrap();

        assert_eq!(inbound_host(&h, &uri, false).as_deref(), Some("campus-internal"));
        assert_eq!(inbound_host(&h, &uri, true).as_deref(), Some("learn.acme.com"));
    }

    #[test]
    fn test_uri_authority_fallback() {
        let uri: Uri = "http://learn.acme.com/courses".parse().unwrap();
        assert_eq!(
            inbound_host(&HeaderMap::new(), &uri, false).as_deref(),
            Some("learn.acme.com")
        );
        assert_eq!(inbound_host(&HeaderMap::new(), &"/".parse().unwrap(), false), None);
    }
}
