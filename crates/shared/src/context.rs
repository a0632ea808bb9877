//! Tenant Resolution Context
//!
//! `TenantContext` is the read-only answer to "which campus does this request
//! belong to?". `ResolutionState` tracks how a request or page gets there.

use serde::{Deserialize, Serialize};

use crate::error::ContextError;
use crate::hostname::{is_valid_slug, HostClass};

/// Resolved tenant identity for one request or render cycle.
///
/// Fields are private so the invariants below hold for every value:
/// - `is_custom_domain` implies `is_campus`
/// - a slug is only ever present on a campus-scoped context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTenantContext")]
pub struct TenantContext {
    slug: Option<String>,
    is_campus: bool,
    is_custom_domain: bool,
}

impl TenantContext {
    /// Base/marketing domain, reserved subdomain, or unscoped loopback
    pub fn none() -> Self {
        Self {
            slug: None,
            is_campus: false,
            is_custom_domain: false,
        }
    }

    /// `<slug>.<baseDomain>`
    pub fn subdomain(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            is_campus: true,
            is_custom_domain: false,
        }
    }

    /// Custom domain; `slug` is `None` when the lookup failed.
    /// Still campus-scoped either way.
    pub fn custom_domain(slug: Option<String>) -> Self {
        Self {
            slug,
            is_campus: true,
            is_custom_domain: true,
        }
    }

    /// Local development override
    pub fn dev_override(slug: impl Into<String>) -> Self {
        Self::subdomain(slug)
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    pub fn is_campus(&self) -> bool {
        self.is_campus
    }

    pub fn is_custom_domain(&self) -> bool {
        self.is_custom_domain
    }

    /// Campus-scoped but no tenant could be found (custom domain lookup failed)
    pub fn is_tenant_not_found(&self) -> bool {
        self.is_campus && self.slug.is_none()
    }
}

impl Default for TenantContext {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTenantContext {
    #[serde(default)]
    slug: Option<String>,
    is_campus: bool,
    is_custom_domain: bool,
}

impl TryFrom<RawTenantContext> for TenantContext {
    type Error = ContextError;

    fn try_from(raw: RawTenantContext) -> Result<Self, Self::Error> {
        if raw.is_custom_domain && !raw.is_campus {
            return Err(ContextError::CustomDomainOutsideCampus);
        }
        if raw.slug.is_some() && !raw.is_campus {
            return Err(ContextError::SlugOutsideCampus);
        }
        if let Some(slug) = &raw.slug {
            if !is_valid_slug(slug) {
                return Err(ContextError::InvalidSlug(slug.clone()));
            }
        }

        Ok(Self {
            slug: raw.slug,
            is_campus: raw.is_campus,
            is_custom_domain: raw.is_custom_domain,
        })
    }
}

/// Resolution progress for one request/page lifecycle.
///
/// ```text
/// Unresolved -> ResolvedNone | ResolvedSubdomain | PendingRemote
/// PendingRemote -> ResolvedCustom
/// ```
/// Every `Resolved*` state is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    ResolvedNone,
    ResolvedSubdomain(String),
    /// Waiting on the backend for this (normalized) hostname
    PendingRemote(String),
    ResolvedCustom(Option<String>),
}

impl ResolutionState {
    /// Apply the hostname parser's verdict. Only moves out of `Unresolved`.
    pub fn parsed(self, class: HostClass) -> Self {
        match self {
            ResolutionState::Unresolved => match class {
                HostClass::Platform | HostClass::Loopback => ResolutionState::ResolvedNone,
                HostClass::Subdomain(slug) => ResolutionState::ResolvedSubdomain(slug),
                HostClass::CustomDomain(host) => ResolutionState::PendingRemote(host),
            },
            other => other,
        }
    }

    /// Apply the remote lookup outcome. Only moves out of `PendingRemote`.
    pub fn settled(self, slug: Option<String>) -> Self {
        match self {
            ResolutionState::PendingRemote(_) => ResolutionState::ResolvedCustom(slug),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::ResolvedNone
                | ResolutionState::ResolvedSubdomain(_)
                | ResolutionState::ResolvedCustom(_)
        )
    }

    /// Hostname awaiting a remote lookup, if any
    pub fn pending_hostname(&self) -> Option<&str> {
        match self {
            ResolutionState::PendingRemote(host) => Some(host),
            _ => None,
        }
    }

    /// The context for a terminal state; `None` while unresolved or pending
    pub fn context(&self) -> Option<TenantContext> {
        match self {
            ResolutionState::ResolvedNone => Some(TenantContext::none()),
            ResolutionState::ResolvedSubdomain(slug) => Some(TenantContext::subdomain(slug.clone())),
            ResolutionState::ResolvedCustom(slug) => Some(TenantContext::custom_domain(slug.clone())),
            ResolutionState::Unresolved | ResolutionState::PendingRemote(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hostname::classify;

    #[test]
    fn test_constructors_hold_invariants() {
        let none = TenantContext::none();
        assert_eq!(none.slug(), None);
        assert!(!none.is_campus());
        assert!(!none.is_custom_domain());

        let sub = TenantContext::subdomain("acme");
        assert_eq!(sub.slug(), Some("acme"));
        assert!(sub.is_campus());
        assert!(!sub.is_custom_domain());

        let failed = TenantContext::custom_domain(None);
        assert!(failed.is_campus());
        assert!(failed.is_custom_domain());
        assert!(failed.is_tenant_not_found());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(TenantContext::custom_domain(Some("acme".into()))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"slug": "acme", "isCampus": true, "isCustomDomain": true})
        );
    }

    #[test]
    fn test_deserialize_rejects_broken_invariants() {
        let custom_outside_campus =
            r#"{"slug":null,"isCampus":false,"isCustomDomain":true}"#;
        assert!(serde_json::from_str::<TenantContext>(custom_outside_campus).is_err());

        let slug_outside_campus = r#"{"slug":"acme","isCampus":false,"isCustomDomain":false}"#;
        assert!(serde_json::from_str::<TenantContext>(slug_outside_campus).is_err());

        let reserved_slug = r#"{"slug":"www","isCampus":true,"isCustomDomain":false}"#;
        assert!(serde_json::from_str::<TenantContext>(reserved_slug).is_err());

        let ok = r#"{"isCampus":true,"isCustomDomain":true}"#;
        assert_eq!(
            serde_json::from_str::<TenantContext>(ok).unwrap(),
            TenantContext::custom_domain(None)
        );
    }

    #[test]
    fn test_state_machine_subdomain() {
        let state = ResolutionState::Unresolved
            .parsed(classify("acme.uselearnbase.com", "uselearnbase.com"));
        assert!(state.is_terminal());
        assert_eq!(state.context(), Some(TenantContext::subdomain("acme")));
    }

    #[test]
    fn test_state_machine_custom_domain() {
        let state =
            ResolutionState::Unresolved.parsed(classify("learn.acme.com", "uselearnbase.com"));
        assert!(!state.is_terminal());
        assert_eq!(state.pending_hostname(), Some("learn.acme.com"));
        assert_eq!(state.context(), None);

        let state = state.settled(None);
        assert_eq!(state, ResolutionState::ResolvedCustom(None));
        assert_eq!(state.context(), Some(TenantContext::custom_domain(None)));
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let resolved = ResolutionState::ResolvedSubdomain("acme".into());
        assert_eq!(
            resolved.clone().settled(Some("other".into())),
            resolved
        );
        assert_eq!(
            resolved.clone().parsed(HostClass::CustomDomain("x.com".into())),
            resolved
        );

        let custom = ResolutionState::ResolvedCustom(None);
        assert_eq!(custom.clone().settled(Some("acme".into())), custom);
    }
}
