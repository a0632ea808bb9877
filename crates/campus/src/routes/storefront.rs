//! Storefront shell
//!
//! Renders the page frame for the marketing site, a campus, or the
//! campus-not-found state, and embeds the resolved context as a hydration
//! seed so the browser starts from the server's answer.

use axum::{http::StatusCode, response::Html, Extension};

use learnbase_shared::{HydrationSeed, TenantContext};

use crate::{
    error::{CampusError, CampusResult},
    middleware::{CurrentTenant, RequestHost},
};

/// Element id the client reads the seed from
pub const HYDRATION_SCRIPT_ID: &str = "__LEARNBASE_TENANT__";

pub async fn index(
    CurrentTenant(context): CurrentTenant,
    Extension(RequestHost(host)): Extension<RequestHost>,
) -> CampusResult<(StatusCode, Html<String>)> {
    let seed = HydrationSeed::new(&host, context.clone())
        .to_script_json()
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize hydration seed");
            CampusError::Internal
        })?;

    let (status, title, heading) = page_for(&context);
    Ok((status, Html(render(&title, &heading, &seed))))
}

fn page_for(context: &TenantContext) -> (StatusCode, String, String) {
    match context.slug() {
        Some(slug) => (
            StatusCode::OK,
            format!("{} | Learnbase", slug),
            slug.to_string(),
        ),
        None if context.is_campus() => (
            StatusCode::NOT_FOUND,
            "Campus not found | Learnbase".to_string(),
            "This campus doesn't exist or is no longer available".to_string(),
        ),
        None => (
            StatusCode::OK,
            "Learnbase".to_string(),
            "Learnbase".to_string(),
        ),
    }
}

fn render(title: &str, heading: &str, seed_json: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script id="{id}" type="application/json">{seed_json}</script>
<script type="module" src="/assets/app.js"></script>
</head>
<body>
<div id="root"><h1>{heading}</h1></div>
</body>
</html>
"#,
        title = title,
        heading = heading,
        id = HYDRATION_SCRIPT_ID,
        seed_json = seed_json,
    )
}
