//! Hostname Parsing
//!
//! Single source of truth for turning a `Host` header value into a tenant
//! candidate. Used by the campus server middleware, the client-side cache and
//! the API's input validation:
//! - Platform hosts: uselearnbase.com, www.uselearnbase.com -> no tenant
//! - Tenant subdomains: acme.uselearnbase.com -> slug "acme"
//! - Custom domains: learn.acme.com -> remote lookup
//! - Loopback: localhost, 127.0.0.1, ::1 -> no tenant (dev override may apply)

/// Subdomain labels reserved for platform infrastructure
pub const RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "admin", "app"];

/// Hostnames treated as the local machine
pub const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1"];

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// How a hostname relates to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostClass {
    /// Base domain, reserved subdomain, or unparsable input
    Platform,
    /// Local machine; only a dev override can scope it to a tenant
    Loopback,
    /// `<slug>.<baseDomain>` with a non-reserved slug
    Subdomain(String),
    /// Not under the base domain; carries the normalized hostname
    CustomDomain(String),
}

/// Classify a host header value against the configured base domain.
///
/// Never fails: anything that cannot be parsed is `Platform`.
pub fn classify(host: &str, base_domain: &str) -> HostClass {
    let host = normalize_host(host);
    let base_domain = normalize_host(base_domain);

    if is_loopback(&host) {
        return HostClass::Loopback;
    }

    if !is_valid_hostname(&host) || host == base_domain {
        return HostClass::Platform;
    }

    let base_suffix = format!(".{}", base_domain);
    if host.ends_with(&base_suffix) {
        // Only <slug>.<base> and deeper qualify; a bare two-label host never does
        if host.split('.').count() < 3 {
            return HostClass::Platform;
        }

        let candidate = host.split('.').next().unwrap_or_default();
        if is_reserved_subdomain(candidate) {
            return HostClass::Platform;
        }

        return HostClass::Subdomain(candidate.to_string());
    }

    HostClass::CustomDomain(host)
}

/// Normalize a host header value: strip port, lowercase, drop a trailing dot
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();

    let host = if let Some(rest) = host.strip_prefix('[') {
        // [::1]:3000
        rest.split(']').next().unwrap_or(rest)
    } else if host.matches(':').count() == 1 {
        host.split(':').next().unwrap_or(host)
    } else {
        host
    };

    let host = host.strip_suffix('.').unwrap_or(host);
    host.to_lowercase()
}

pub fn is_loopback(host: &str) -> bool {
    LOOPBACK_HOSTS.contains(&host)
}

pub fn is_reserved_subdomain(label: &str) -> bool {
    RESERVED_SUBDOMAINS.contains(&label)
}

/// Whether `slug` is usable as a tenant identifier (one DNS label, not reserved)
pub fn is_valid_slug(slug: &str) -> bool {
    is_valid_label(slug) && !is_reserved_subdomain(slug)
}

/// Whether an already-normalized hostname is syntactically acceptable
pub fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty() && host.len() <= MAX_HOSTNAME_LEN && host.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BASE: &str = "uselearnbase.com";

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("Acme.UseLearnbase.COM"), "acme.uselearnbase.com");
        assert_eq!(normalize_host("acme.uselearnbase.com:8080"), "acme.uselearnbase.com");
        assert_eq!(normalize_host("learn.acme.com."), "learn.acme.com");
        assert_eq!(normalize_host("  localhost:3000 "), "localhost");
        assert_eq!(normalize_host("[::1]:3000"), "::1");
        assert_eq!(normalize_host("::1"), "::1");
    }

    #[test]
    fn test_base_domain_is_platform() {
        assert_eq!(classify("uselearnbase.com", BASE), HostClass::Platform);
        assert_eq!(classify("USELEARNBASE.COM:443", BASE), HostClass::Platform);
    }

    #[test]
    fn test_loopback_hosts() {
        assert_eq!(classify("localhost", BASE), HostClass::Loopback);
        assert_eq!(classify("localhost:3000", BASE), HostClass::Loopback);
        assert_eq!(classify("127.0.0.1:3001", BASE), HostClass::Loopback);
        assert_eq!(classify("[::1]:3001", BASE), HostClass::Loopback);
    }

    #[test]
    fn test_reserved_subdomains_are_platform() {
        for reserved in RESERVED_SUBDOMAINS {
            let host = format!("{}.{}", reserved, BASE);
            assert_eq!(classify(&host, BASE), HostClass::Platform, "{}", host);
        }
    }

    #[test]
    fn test_tenant_subdomain() {
        assert_eq!(
            classify("acme.uselearnbase.com", BASE),
            HostClass::Subdomain("acme".to_string())
        );
        assert_eq!(
            classify("Big-School.uselearnbase.com:443", BASE),
            HostClass::Subdomain("big-school".to_string())
        );
        // Deeper hosts take the first label
        assert_eq!(
            classify("acme.eu.uselearnbase.com", BASE),
            HostClass::Subdomain("acme".to_string())
        );
    }

    #[test]
    fn test_two_label_host_under_single_label_base() {
        assert_eq!(classify("acme.internal", "internal"), HostClass::Platform);
        assert_eq!(
            classify("acme.campus.internal", "internal"),
            HostClass::Subdomain("acme".to_string())
        );
    }

    #[test]
    fn test_custom_domains() {
        assert_eq!(
            classify("learn.acme.com", BASE),
            HostClass::CustomDomain("learn.acme.com".to_string())
        );
        assert_eq!(
            classify("ACME.COM", BASE),
            HostClass::CustomDomain("acme.com".to_string())
        );
        // Suffix match must fall on a label boundary
        assert_eq!(
            classify("notuselearnbase.com", BASE),
            HostClass::CustomDomain("notuselearnbase.com".to_string())
        );
        assert_eq!(
            classify("uselearnbase.com.evil.io", BASE),
            HostClass::CustomDomain("uselearnbase.com.evil.io".to_string())
        );
    }

    #[test]
    fn test_malformed_hosts_are_platform() {
        assert_eq!(classify("", BASE), HostClass::Platform);
        assert_eq!(classify("   ", BASE), HostClass::Platform);
        assert_eq!(classify(".uselearnbase.com", BASE), HostClass::Platform);
        assert_eq!(classify("acme..com", BASE), HostClass::Platform);
        assert_eq!(classify("ac me.com", BASE), HostClass::Platform);
        assert_eq!(classify("-acme.uselearnbase.com", BASE), HostClass::Platform);
        assert_eq!(classify("acme_school.uselearnbase.com", BASE), HostClass::Platform);

        let long_label = "a".repeat(64);
        assert_eq!(
            classify(&format!("{}.uselearnbase.com", long_label), BASE),
            HostClass::Platform
        );
    }

    #[test]
    fn test_parser_never_returns_reserved_slug() {
        let hosts = [
            "www.uselearnbase.com",
            "API.uselearnbase.com",
            "admin.uselearnbase.com:8443",
            "app.uselearnbase.com.",
        ];
        for host in hosts {
            assert!(!matches!(classify(host, BASE), HostClass::Subdomain(_)), "{}", host);
        }
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("big-school-42"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("www"));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug("acme.com"));
        assert!(!is_valid_slug("-acme"));
    }
}
