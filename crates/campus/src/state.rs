//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::routing::{DevOverride, DomainCache, HostResolver, RemoteResolver, RemoteResolverConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: HostResolver,
}

impl AppState {
    pub fn new(config: Config, resolver: HostResolver) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    /// Wire the resolver stack from configuration
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let remote = RemoteResolver::new(RemoteResolverConfig {
            api_base_url: config.tenant_api_url.clone(),
            timeout: config.resolve_timeout(),
            max_retries: config.resolve_max_retries,
            retry_base_delay: Duration::from_millis(config.resolve_retry_base_ms),
        })?;

        let cache = Arc::new(DomainCache::with_ttl(
            config.cache_ttl(),
            config.negative_cache_ttl(),
        ));

        let resolver = HostResolver::with_cache(config.base_domain.clone(), remote, cache)
            .with_dev_override(DevOverride::new(config.dev_tenant_override));

        Ok(Self::new(config, resolver))
    }
}
