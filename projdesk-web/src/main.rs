//! projdesk-web - project records front end
//!
//! Lists, creates, updates, archives and links "project" custom objects stored
//! in HubSpot CRM, together with their associated contacts.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use projdesk_common::config::load_optional_config;
use projdesk_common::logging::init_tracing;
use tokio::signal;
use tracing::info;

use projdesk_web::config::{AppConfig, Args};
use projdesk_web::crm::HubSpotClient;
use projdesk_web::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = load_optional_config(args.config.as_deref())
        .context("Failed to load config file")?;

    init_tracing(&toml.logging.level);

    info!(
        "Starting projdesk-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = AppConfig::resolve(args, toml).context("Invalid configuration")?;
    info!("Configuration: {:?}", config);

    let gateway = HubSpotClient::new(&config.hubspot_base_url, config.hubspot_api_key.clone())
        .context("Failed to create HubSpot client")?;
    info!(
        "CRM: {} (object type {}, batch policy {})",
        config.hubspot_base_url, config.crm.project_object_type, config.crm.batch_policy
    );

    let state = AppState::new(Arc::new(gateway), config.crm.clone());
    let app = build_router(state, &config.static_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
