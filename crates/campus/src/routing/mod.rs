//! Host-based campus routing
//!
//! This module resolves incoming Host headers to campuses (tenants):
//! - Campus subdomains: acme.uselearnbase.com
//! - Custom domains: learn.acme.com
//! - Local development: localhost?campus=acme

mod cache;
pub mod dev_override;
mod host_resolver;
pub mod remote;

pub use cache::{CacheStats, DomainCache};
pub use dev_override::{CookieAction, DevOverride, DevSelection};
pub use host_resolver::HostResolver;
pub use remote::{RemoteLookup, RemoteResolveError, RemoteResolver, RemoteResolverConfig};
