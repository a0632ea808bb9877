//! Local development tenant override
//!
//! On `localhost` there is no subdomain to parse, so developers pick a campus
//! with `?campus=<slug>`. The choice is remembered in a cookie until cleared
//! with an empty `?campus=`. Whether any of this is active is decided once at
//! startup from configuration; production builds pass `DevOverride::disabled()`.

use axum::extract::Query;
use axum::http::{header, HeaderMap, HeaderValue, Uri};
use serde::Deserialize;

use learnbase_shared::{is_valid_slug, TenantContext};

/// Query parameter selecting a campus on loopback hosts
pub const OVERRIDE_QUERY_PARAM: &str = "campus";

/// Cookie remembering the selected campus
pub const OVERRIDE_COOKIE: &str = "learnbase_dev_campus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevOverride {
    enabled: bool,
}

/// What the request asked for, and what the response should remember
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DevSelection {
    pub slug: Option<String>,
    pub cookie: CookieAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CookieAction {
    #[default]
    Keep,
    Set(String),
    Clear,
}

#[derive(Deserialize)]
struct OverrideQuery {
    campus: Option<String>,
}

impl DevOverride {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read the override request from the query string and cookies.
    ///
    /// Always empty when the override is disabled.
    pub fn selection(&self, uri: &Uri, headers: &HeaderMap) -> DevSelection {
        if !self.enabled {
            return DevSelection::default();
        }

        let from_query = Query::<OverrideQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.campus)
            .map(|v| v.trim().to_lowercase());

        match from_query {
            Some(value) if value.is_empty() => DevSelection {
                slug: None,
                cookie: CookieAction::Clear,
            },
            Some(value) if is_valid_slug(&value) => DevSelection {
                slug: Some(value.clone()),
                cookie: CookieAction::Set(value),
            },
            Some(value) => {
                tracing::debug!(campus = %value, "Ignoring invalid dev campus override");
                DevSelection::default()
            }
            None => DevSelection {
                slug: cookie_value(headers, OVERRIDE_COOKIE).filter(|v| is_valid_slug(v)),
                cookie: CookieAction::Keep,
            },
        }
    }

    /// Context for a loopback request, if the override selects a campus
    pub fn apply(&self, selection: &DevSelection) -> Option<TenantContext> {
        if !self.enabled {
            return None;
        }
        selection.slug.clone().map(TenantContext::dev_override)
    }
}

impl DevSelection {
    /// Persist (or clear) the selection on the response
    pub fn write_cookie(&self, headers: &mut HeaderMap) {
        let cookie = match &self.cookie {
            CookieAction::Keep => return,
            CookieAction::Set(slug) => format!(
                "{}={}; Path=/; SameSite=Lax; HttpOnly",
                OVERRIDE_COOKIE, slug
            ),
            CookieAction::Clear => format!(
                "{}=; Path=/; Max-Age=0; SameSite=Lax; HttpOnly",
                OVERRIDE_COOKIE
            ),
        };

        // Slugs are validated to [a-z0-9-], so this cannot fail in practice
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(header::SET_COOKIE, value);
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
