//! Learnbase Shared Types and Utilities
//!
//! Tenant identity types, the hostname parser, and the client-side tenant
//! cache shared by the API server, the campus server and browser builds.

pub mod client;
pub mod context;
pub mod error;
pub mod hostname;
pub mod types;

pub use client::{ClientTenantCache, HydrationSeed};
pub use context::{ResolutionState, TenantContext};
pub use error::*;
pub use hostname::{classify, is_reserved_subdomain, is_valid_slug, normalize_host, HostClass};
pub use types::*;
