//! Learnbase campus storefront server

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use learnbase_campus::{
    config::{self, Config},
    routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(config::log_json_from_env());

    let config = Config::from_env().context("Failed to load configuration")?;
    let bind_address = config.bind_address.clone();
    let cleanup_every = Duration::from_secs(config.cache_cleanup_secs.max(1));

    tracing::info!(
        bind_address = %bind_address,
        base_domain = %config.base_domain,
        tenant_api_url = %config.tenant_api_url,
        environment = ?config.environment,
        "Starting Learnbase campus server"
    );

    let state = AppState::from_config(config).context("Failed to build HTTP client")?;
    if state.resolver.dev_override().is_enabled() {
        tracing::warn!("Dev campus override is enabled; loopback hosts accept ?campus=<slug>");
    }
    spawn_cache_cleanup(state.clone(), cleanup_every);

    let app = create_router(state);
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Learnbase campus server stopped");
    Ok(())
}

/// Periodically drop expired domain cache entries
fn spawn_cache_cleanup(state: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = state.resolver.cache().cleanup();
            if removed > 0 {
                tracing::debug!(removed, "Expired domain cache entries removed");
            }
        }
    });
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("learnbase_campus=info,tower_http=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
