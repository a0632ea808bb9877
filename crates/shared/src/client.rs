//! Client-side tenant cache
//!
//! Browser builds resolve the tenant from `window.location.hostname` once per
//! page. The cache is owned by the page and keyed by hostname: a new hostname
//! overwrites the entry. Server-rendered pages ship a [`HydrationSeed`] so the
//! client starts resolved and never repeats a custom-domain lookup.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::context::{ResolutionState, TenantContext};
use crate::error::HydrationError;
use crate::hostname::{classify, is_loopback, is_valid_hostname, normalize_host};

/// Server-resolved context embedded in the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationSeed {
    pub hostname: String,
    pub context: TenantContext,
}

impl HydrationSeed {
    pub fn new(hostname: &str, context: TenantContext) -> Self {
        Self {
            hostname: normalize_host(hostname),
            context,
        }
    }

    /// Serialize for embedding inside a `<script type="application/json">` tag.
    ///
    /// `<`, `>` and `&` are escaped so the payload cannot close the tag.
    pub fn to_script_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(json
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
            .replace('&', "\\u0026"))
    }

    pub fn from_json(json: &str) -> Result<Self, HydrationError> {
        let seed: HydrationSeed = serde_json::from_str(json)?;
        let hostname = normalize_host(&seed.hostname);
        if !is_loopback(&hostname) && !is_valid_hostname(&hostname) {
            return Err(HydrationError::InvalidHostname(seed.hostname));
        }
        Ok(Self {
            hostname,
            context: seed.context,
        })
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    hostname: String,
    context: TenantContext,
}

/// Page-scoped tenant cache, invalidated by hostname
#[derive(Debug, Clone)]
pub struct ClientTenantCache {
    base_domain: String,
    entry: Option<CacheEntry>,
}

impl ClientTenantCache {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            base_domain: base_domain.into(),
            entry: None,
        }
    }

    /// Start from the server's resolution of this page
    pub fn from_seed(base_domain: impl Into<String>, seed: HydrationSeed) -> Self {
        let mut cache = Self::new(base_domain);
        cache.seed(seed);
        cache
    }

    pub fn seed(&mut self, seed: HydrationSeed) {
        self.entry = Some(CacheEntry {
            hostname: normalize_host(&seed.hostname),
            context: seed.context,
        });
    }

    /// Cached context for `hostname`, without resolving
    pub fn peek(&self, hostname: &str) -> Option<&TenantContext> {
        let hostname = normalize_host(hostname);
        self.entry
            .as_ref()
            .filter(|entry| entry.hostname == hostname)
            .map(|entry| &entry.context)
    }

    /// Cached context for `hostname`, resolving it on first access.
    ///
    /// `lookup` is only called for custom domains that are not already cached,
    /// and at most once per call.
    pub async fn get_or_resolve<F, Fut>(&mut self, hostname: &str, lookup: F) -> TenantContext
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Option<String>>,
    {
        let hostname = normalize_host(hostname);
        if let Some(entry) = &self.entry {
            if entry.hostname == hostname {
                return entry.context.clone();
            }
        }

        let state = ResolutionState::Unresolved.parsed(classify(&hostname, &self.base_domain));
        let state = match state.pending_hostname().map(str::to_owned) {
            Some(pending) => {
                let slug = lookup(pending).await;
                state.settled(slug)
            }
            None => state,
        };
        let context = state.context().unwrap_or_default();

        tracing::debug!(hostname = %hostname, slug = ?context.slug(), "Client tenant cache filled");
        self.entry = Some(CacheEntry {
            hostname,
            context: context.clone(),
        });
        context
    }
}
