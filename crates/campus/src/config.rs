//! Application configuration

use std::env;
use std::time::Duration;

/// Deployment environment, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,
    pub base_domain: String, // e.g., "uselearnbase.com" for *.uselearnbase.com campuses
    pub marketing_url: String,
    pub environment: Environment,
    pub trust_forwarded_host: bool,
    pub assets_dir: String,

    // Tenant resolution
    pub tenant_api_url: String,
    pub resolve_timeout_ms: u64,
    pub resolve_max_retries: usize,
    pub resolve_retry_base_ms: u64,
    pub cache_ttl_secs: u64,
    pub negative_cache_ttl_secs: u64,
    pub cache_cleanup_secs: u64,

    // Local development
    /// Never true when `environment` is production
    pub dev_tenant_override: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment =
            Environment::from_env_value(&env::var("APP_ENV").unwrap_or_default());

        let base_domain = env::var("BASE_DOMAIN")
            .unwrap_or_else(|_| "uselearnbase.com".to_string())
            .trim()
            .to_lowercase();
        if base_domain.is_empty() {
            return Err(ConfigError::Invalid("BASE_DOMAIN must not be empty"));
        }

        let tenant_api_url = env::var("TENANT_API_URL")
            .map_err(|_| ConfigError::Missing("TENANT_API_URL"))?
            .trim_end_matches('/')
            .to_string();
        if !(tenant_api_url.starts_with("http://") || tenant_api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "TENANT_API_URL must be an http:// or https:// URL",
            ));
        }

        let dev_tenant_override = {
            let requested = parse_bool("ENABLE_DEV_TENANT_OVERRIDE", false);
            if requested && environment == Environment::Production {
                tracing::warn!(
                    "ENABLE_DEV_TENANT_OVERRIDE ignored: APP_ENV is production"
                );
                false
            } else {
                requested
            }
        };

        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
            marketing_url: env::var("MARKETING_URL")
                .unwrap_or_else(|_| format!("https://{}", base_domain)),
            base_domain,
            environment,
            trust_forwarded_host: parse_bool("TRUST_FORWARDED_HOST", false),
            assets_dir: env::var("ASSETS_DIR").unwrap_or_else(|_| "./public".to_string()),

            // Tenant resolution
            tenant_api_url,
            resolve_timeout_ms: parse_number("TENANT_RESOLVE_TIMEOUT_MS", 3000),
            resolve_max_retries: parse_number("TENANT_RESOLVE_MAX_RETRIES", 2),
            resolve_retry_base_ms: parse_number("TENANT_RESOLVE_RETRY_BASE_MS", 100),
            cache_ttl_secs: parse_number("TENANT_CACHE_TTL_SECS", 300),
            negative_cache_ttl_secs: parse_number("TENANT_NEGATIVE_CACHE_TTL_SECS", 30),
            cache_cleanup_secs: parse_number("TENANT_CACHE_CLEANUP_SECS", 60),

            dev_tenant_override,
        })
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn negative_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.negative_cache_ttl_secs)
    }
}

/// `LOG_FORMAT=json`; read before `Config::from_env` so its warnings are captured
pub fn log_json_from_env() -> bool {
    env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn parse_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_number<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}
