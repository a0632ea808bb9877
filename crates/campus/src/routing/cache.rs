//! In-memory domain cache with TTL
//!
//! Caches custom-domain lookups so repeat visitors to `learn.acme.com` don't
//! cost a backend round trip. Only definitive answers are stored: a slug, or
//! "no campus owns this domain" (kept for a shorter TTL).

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default TTL for resolved domains (5 minutes)
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default TTL for domains the backend doesn't know (30 seconds)
const DEFAULT_NEGATIVE_TTL: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct CacheEntry {
    slug: Option<String>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Thread-safe in-memory domain cache
pub struct DomainCache {
    /// Maps normalized hostname -> slug (None means no campus owns it)
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    negative_ttl: Duration,
}

impl Default for DomainCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL, DEFAULT_NEGATIVE_TTL)
    }

    pub fn with_ttl(ttl: Duration, negative_ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
            negative_ttl,
        }
    }

    /// Get cached slug for a hostname
    /// Returns Some(Some(slug)) if found and valid
    /// Returns Some(None) if the hostname was cached as not resolving
    /// Returns None if not in cache or expired
    pub fn get(&self, hostname: &str) -> Option<Option<String>> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(hostname)?;

        if entry.is_expired() {
            None
        } else {
            Some(entry.slug.clone())
        }
    }

    /// Cache a hostname -> slug mapping
    pub fn set(&self, hostname: &str, slug: Option<String>) {
        let ttl = if slug.is_some() {
            self.ttl
        } else {
            self.negative_ttl
        };

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(
                hostname.to_string(),
                CacheEntry {
                    slug,
                    expires_at: Instant::now() + ttl,
                },
            );
        }
    }

    pub fn invalidate(&self, hostname: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.remove(hostname);
        }
    }

    /// Invalidate every hostname mapped to a campus (e.g. after its domains change)
    pub fn invalidate_slug(&self, slug: &str) {
        if let Ok(mut cache) = self.cache.write() {
            cache.retain(|_, entry| entry.slug.as_deref() != Some(slug));
        }
    }

    /// Clear expired entries (call periodically for memory management)
    pub fn cleanup(&self) -> usize {
        if let Ok(mut cache) = self.cache.write() {
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_expired());
            before - cache.len()
        } else {
            0
        }
    }

    pub fn stats(&self) -> CacheStats {
        if let Ok(cache) = self.cache.read() {
            let total = cache.len();
            let expired = cache.values().filter(|e| e.is_expired()).count();
            let negative = cache
                .values()
                .filter(|e| !e.is_expired() && e.slug.is_none())
                .count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
                negative_entries: negative,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Default, Debug, Clone, serde::Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    pub negative_entries: usize,
}
