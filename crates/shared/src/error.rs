//! Error types for Learnbase

use thiserror::Error;

/// Rejections raised when a `TenantContext` is rebuilt from untrusted input
/// (hydration seeds, backend payloads).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("custom-domain context must be campus-scoped")]
    CustomDomainOutsideCampus,

    #[error("slug present on a context that is not campus-scoped")]
    SlugOutsideCampus,

    #[error("invalid tenant slug: {0}")]
    InvalidSlug(String),
}

#[derive(Debug, Error)]
pub enum HydrationError {
    #[error("malformed hydration seed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("hydration seed hostname {0:?} is not a valid hostname")]
    InvalidHostname(String),
}
