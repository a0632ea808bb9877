//! Host-to-Campus Resolution
//!
//! Resolves incoming Host headers to a `TenantContext`:
//! - Platform hosts: uselearnbase.com, www.uselearnbase.com -> no campus
//! - Campus subdomains: acme.uselearnbase.com -> slug from the hostname
//! - Custom domains: learn.acme.com -> backend lookup (cached)
//! - Loopback: localhost -> dev override, if enabled

use std::sync::Arc;

use learnbase_shared::{classify, normalize_host, HostClass, ResolutionState, TenantContext};

use super::dev_override::{DevOverride, DevSelection};
use super::remote::RemoteResolver;
use super::DomainCache;

/// Host resolver with caching
#[derive(Clone)]
pub struct HostResolver {
    base_domain: String,
    remote: RemoteResolver,
    cache: Arc<DomainCache>,
    dev_override: DevOverride,
}

impl HostResolver {
    pub fn new(base_domain: impl Into<String>, remote: RemoteResolver) -> Self {
        Self::with_cache(base_domain, remote, Arc::new(DomainCache::new()))
    }

    pub fn with_cache(
        base_domain: impl Into<String>,
        remote: RemoteResolver,
        cache: Arc<DomainCache>,
    ) -> Self {
        Self {
            base_domain: normalize_host(&base_domain.into()),
            remote,
            cache,
            dev_override: DevOverride::disabled(),
        }
    }

    /// Enable the loopback override (decided once at startup)
    pub fn with_dev_override(mut self, dev_override: DevOverride) -> Self {
        self.dev_override = dev_override;
        self
    }

    /// Resolve a host header to a tenant context.
    ///
    /// Never fails: unparsable hosts are "no campus", failed custom-domain
    /// lookups are campus-scoped with no slug.
    pub async fn resolve(&self, host: &str, dev: &DevSelection) -> TenantContext {
        let class = classify(host, &self.base_domain);

        if class == HostClass::Loopback {
            if let Some(context) = self.dev_override.apply(dev) {
                tracing::debug!(host = %host, slug = ?context.slug(), "Dev campus override applied");
                return context;
            }
        }

        let state = ResolutionState::Unresolved.parsed(class);
        let state = match state.pending_hostname().map(str::to_owned) {
            Some(hostname) => {
                let slug = self.resolve_custom_domain(&hostname).await;
                state.settled(slug)
            }
            None => state,
        };

        state.context().unwrap_or_default()
    }

    /// Slug for a custom domain, consulting the cache first
    async fn resolve_custom_domain(&self, hostname: &str) -> Option<String> {
        if let Some(cached) = self.cache.get(hostname) {
            tracing::debug!(hostname = %hostname, slug = ?cached, "Custom domain cache hit");
            return cached;
        }

        let lookup = self.remote.lookup(hostname).await;
        if lookup.is_definitive() {
            self.cache.set(hostname, lookup.slug());
        }
        lookup.slug()
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn dev_override(&self) -> DevOverride {
        self.dev_override
    }

    /// Invalidate cache for a specific host
    pub fn invalidate_host(&self, host: &str) {
        self.cache.invalidate(&normalize_host(host));
    }

    /// Get the domain cache for statistics/management
    pub fn cache(&self) -> &DomainCache {
        &self.cache
    }

    pub fn remote(&self) -> &RemoteResolver {
        &self.remote
    }
}
