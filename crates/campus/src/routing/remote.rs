//! Remote tenant resolution
//!
//! Custom domains can't be parsed into a slug, so they are looked up on the
//! backend: `GET {api}/campus/resolve?hostname=<host>`. The resolver never
//! surfaces an error to callers; every failure becomes "no slug".

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::{Client, StatusCode};

use learnbase_shared::{is_valid_slug, ResolveTenantResponse};

/// Default timeout for one resolve request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Maximum backoff between retries
const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum RemoteResolveError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resolve endpoint returned {0}")]
    Status(StatusCode),

    #[error("No campus owns this hostname")]
    NotFound,

    #[error("Malformed resolve payload: {0}")]
    MalformedPayload(String),

    #[error("Resolve endpoint returned an invalid slug: {0:?}")]
    InvalidSlug(String),
}

impl RemoteResolveError {
    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteResolveError::Http(e) => !e.is_decode() && !e.is_builder(),
            RemoteResolveError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            RemoteResolveError::NotFound => false,
            RemoteResolveError::MalformedPayload(_) => false,
            RemoteResolveError::InvalidSlug(_) => false,
        }
    }
}

/// Outcome of one remote lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLookup {
    /// A campus owns the hostname
    Found(String),
    /// The backend answered definitively: nobody owns it
    NotFound,
    /// Network error, 5xx after retries, or an unusable payload
    Failed,
}

impl RemoteLookup {
    pub fn slug(&self) -> Option<String> {
        match self {
            RemoteLookup::Found(slug) => Some(slug.clone()),
            RemoteLookup::NotFound | RemoteLookup::Failed => None,
        }
    }

    /// Whether the outcome is safe to remember across requests
    pub fn is_definitive(&self) -> bool {
        !matches!(self, RemoteLookup::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct RemoteResolverConfig {
    /// Backend base URL, e.g. `https://api.uselearnbase.com`
    pub api_base_url: String,
    pub timeout: Duration,
    /// Extra attempts after the first; 0 means a single attempt
    pub max_retries: usize,
    pub retry_base_delay: Duration,
}

impl RemoteResolverConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: 2,
            retry_base_delay: Duration::from_millis(100),
        }
    }
}

type SharedLookup = Shared<BoxFuture<'static, RemoteLookup>>;

/// Backend resolver with in-flight request deduplication
#[derive(Clone)]
pub struct RemoteResolver {
    inner: Arc<Inner>,
}

struct Inner {
    http_client: Client,
    resolve_url: String,
    max_retries: usize,
    retry_base_delay: Duration,
    /// Lookups currently on the wire, keyed by hostname
    in_flight: Mutex<HashMap<String, SharedLookup>>,
}

/// Clears a hostname's in-flight entry when its fetch task finishes
struct InFlightGuard {
    inner: Arc<Inner>,
    hostname: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.hostname);
    }
}

impl RemoteResolver {
    pub fn new(config: RemoteResolverConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http_client,
                resolve_url: format!(
                    "{}/campus/resolve",
                    config.api_base_url.trim_end_matches('/')
                ),
                max_retries: config.max_retries,
                retry_base_delay: config.retry_base_delay,
                in_flight: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// Slug for a custom domain, or `None` on any failure
    pub async fn resolve(&self, hostname: &str) -> Option<String> {
        self.lookup(hostname).await.slug()
    }

    /// Look up a hostname, joining an identical lookup already in flight.
    ///
    /// The fetch runs on its own task, so a caller that goes away does not
    /// stall or poison the lookup for the callers still waiting on it.
    pub async fn lookup(&self, hostname: &str) -> RemoteLookup {
        let lookup = {
            let mut in_flight = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            match in_flight.get(hostname) {
                Some(existing) => {
                    tracing::debug!(hostname = %hostname, "Joining in-flight tenant lookup");
                    existing.clone()
                }
                None => {
                    let lookup = self.spawn_lookup(hostname.to_string());
                    in_flight.insert(hostname.to_string(), lookup.clone());
                    lookup
                }
            }
        };

        lookup.await
    }

    /// Start the fetch task. Its entry leaves the in-flight map when the task
    /// ends, however it ends.
    fn spawn_lookup(&self, hostname: String) -> SharedLookup {
        let resolver = self.clone();

        // Guard is built on the task; the caller still holds the map lock here
        let task = tokio::spawn(async move {
            let _guard = InFlightGuard {
                inner: Arc::clone(&resolver.inner),
                hostname: hostname.clone(),
            };
            resolver.fetch_with_retry(&hostname).await
        });

        task.map(|joined| {
            joined.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Tenant lookup task failed");
                RemoteLookup::Failed
            })
        })
        .boxed()
        .shared()
    }

    /// Number of hostnames with a lookup on the wire
    pub fn in_flight_count(&self) -> usize {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fetch with exponential backoff; only transient errors are retried
    async fn fetch_with_retry(&self, hostname: &str) -> RemoteLookup {
        use tokio_retry::strategy::{jitter, ExponentialBackoff};
        use tokio_retry::Retry;

        // 2^n * base: base, 2*base, 4*base ...
        let retry_strategy = ExponentialBackoff::from_millis(2)
            .factor((self.inner.retry_base_delay.as_millis() as u64 / 2).max(1))
            .max_delay(RETRY_MAX_DELAY)
            .map(jitter)
            .take(self.inner.max_retries);

        let outcome = Retry::spawn(retry_strategy, move || async move {
            let result = self.fetch_once(hostname).await;

            match &result {
                Ok(_) => Ok(result),
                Err(e) if e.is_transient() => {
                    tracing::debug!(hostname = %hostname, error = %e, "Transient resolve error - will retry");
                    Err(result)
                }
                Err(_) => Ok(result),
            }
        })
        .await
        .unwrap_or_else(|e| e);

        match outcome {
            Ok(slug) => RemoteLookup::Found(slug),
            Err(RemoteResolveError::NotFound) => {
                tracing::info!(hostname = %hostname, "No campus owns custom domain");
                RemoteLookup::NotFound
            }
            Err(e) => {
                tracing::warn!(hostname = %hostname, error = %e, "Custom domain resolution failed");
                RemoteLookup::Failed
            }
        }
    }

    async fn fetch_once(&self, hostname: &str) -> Result<String, RemoteResolveError> {
        let response = self
            .inner
            .http_client
            .get(&self.inner.resolve_url)
            .query(&[("hostname", hostname)])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteResolveError::NotFound);
        }
        if !status.is_success() {
            return Err(RemoteResolveError::Status(status));
        }

        let body = response.text().await?;
        let payload: ResolveTenantResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteResolveError::MalformedPayload(e.to_string()))?;

        let slug = payload.tenant.slug;
        if !is_valid_slug(&slug) {
            return Err(RemoteResolveError::InvalidSlug(slug));
        }

        Ok(slug)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;

    fn resolver(url: &str, max_retries: usize) -> RemoteResolver {
        RemoteResolver::new(RemoteResolverConfig {
            api_base_url: url.to_string(),
            timeout: Duration::from_secs(2),
            max_retries,
            retry_base_delay: Duration::from_millis(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolves_slug() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::UrlEncoded(
                "hostname".into(),
                "learn.acme.com".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"tenant":{"slug":"acme"}}"#)
            .expect(1)
            .create_async()
            .await;

        let resolver = resolver(&server.url(), 0);
        assert_eq!(resolver.resolve("learn.acme.com").await, Some("acme".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_definitive_and_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let lookup = resolver(&server.url(), 3).lookup("learn.nobody.com").await;
        assert_eq!(lookup, RemoteLookup::NotFound);
        assert!(lookup.is_definitive());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_single_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let lookup = resolver(&server.url(), 0).lookup("learn.acme.com").await;
        assert_eq!(lookup, RemoteLookup::Failed);
        assert!(!lookup.is_definitive());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_retried_with_bound() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        assert_eq!(resolver(&server.url(), 2).resolve("learn.acme.com").await, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_payloads_fail() {
        let bodies = [
            "not json",
            r#"{"slug":"acme"}"#,
            r#"{"tenant":{"slug":"www"}}"#,
            r#"{"tenant":{"slug":"Has Spaces"}}"#,
        ];

        for body in bodies {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("GET", "/campus/resolve")
                .match_query(Matcher::Any)
                .with_status(200)
                .with_body(body)
                .expect(1)
                .create_async()
                .await;

            let lookup = resolver(&server.url(), 2).lookup("learn.acme.com").await;
            assert_eq!(lookup, RemoteLookup::Failed, "{}", body);
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_network_error_fails() {
        // Nothing listens on port 1
        let lookup = resolver("http://127.0.0.1:1", 0).lookup("learn.acme.com").await;
        assert_eq!(lookup, RemoteLookup::Failed);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"tenant":{"slug":"acme"}}"#)
            .expect(1)
            .create_async()
            .await;

        let resolver = resolver(&server.url(), 0);
        let (a, b, c) = tokio::join!(
            resolver.resolve("learn.acme.com"),
            resolver.resolve("learn.acme.com"),
            resolver.resolve("learn.acme.com"),
        );

        assert_eq!(a.as_deref(), Some("acme"));
        assert_eq!(b, a);
        assert_eq!(c, a);
        assert_eq!(resolver.in_flight_count(), 0);
        mock.assert_async().await;
    }

    /// Resolve endpoint that answers after `delay`
    async fn slow_backend(
        server: &mut mockito::ServerGuard,
        delay: Duration,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("GET", "/campus/resolve")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_chunked_body(move |w| {
                std::thread::sleep(delay);
                w.write_all(br#"{"tenant":{"slug":"acme"}}"#)
            })
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_abandoned_lookup_leaves_no_stale_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = slow_backend(&mut server, Duration::from_millis(150), 2).await;
        let resolver = resolver(&server.url(), 0);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            resolver.lookup("learn.acme.com"),
        )
        .await;
        assert!(abandoned.is_err());

        // The detached fetch finishes on its own and clears its entry
        for _ in 0..100 {
            if resolver.in_flight_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(resolver.in_flight_count(), 0);

        assert_eq!(
            resolver.lookup("learn.acme.com").await,
            RemoteLookup::Found("acme".to_string())
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remaining_waiter_completes_when_another_leaves() {
        let mut server = mockito::Server::new_async().await;
        let mock = slow_backend(&mut server, Duration::from_millis(100), 1).await;
        let resolver = resolver(&server.url(), 0);

        let (abandoned, completed) = tokio::join!(
            tokio::time::timeout(Duration::from_millis(20), resolver.lookup("learn.acme.com")),
            resolver.lookup("learn.acme.com"),
        );

        assert!(abandoned.is_err());
        assert_eq!(completed, RemoteLookup::Found("acme".to_string()));
        assert_eq!(resolver.in_flight_count(), 0);
        mock.assert_async().await;
    }

    #[test]
    fn test_transient_classification() {
        assert!(RemoteResolveError::Status(StatusCode::BAD_GATEWAY).is_transient());
        assert!(RemoteResolveError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(!RemoteResolveError::Status(StatusCode::FORBIDDEN).is_transient());
        assert!(!RemoteResolveError::NotFound.is_transient());
        assert!(!RemoteResolveError::MalformedPayload("x".into()).is_transient());
    }
}
