mod api;
mod config;
mod devices;
mod discovery;
mod error;
mod hap;
mod mdns;
mod orchestrator;
mod refresh_manager;
mod registry;
#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use mdns_sd::ServiceDaemon;
use anyhow::{Context, Result};
use crate::config::Config;
use crate::devices::TypeRegistry;
use crate::hap::{HapClient, InstanceTable};
use crate::orchestrator::Orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hap_intentd=info"))
        )
        .init();

    tracing::info!("Starting hap-intentd");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/hap-intent/intentd.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    let agent_user_id = match &config.api.agent_user_id {
        Some(id) => id.clone(),
        None => {
            let hostname = hostname::get()
                .context("Failed to get system hostname")?
                .to_string_lossy()
                .to_string();
            format!("hap-intent-{}", hostname)
        }
    };

    // Create mDNS daemon, optionally bound to one interface
    let mdns_daemon = ServiceDaemon::new()
        .context("Failed to create mDNS daemon")?;
    if let Some(interface) = &config.hap.interface {
        mdns_daemon
            .disable_interface(mdns_sd::IfKind::All)
            .context("Failed to disable default interfaces")?;
        mdns_daemon
            .enable_interface(interface.as_str())
            .with_context(|| format!("Failed to enable interface {}", interface))?;
    }

    let instances = InstanceTable::new();
    let client = HapClient::new(
        &config.hap.pin,
        Duration::from_secs(config.hap.request_timeout_secs),
        instances.clone(),
    )?;
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(client),
        Arc::new(TypeRegistry::with_defaults()),
    ));

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Spawn mDNS browser task
    let (browser_tx, browser_rx) = mpsc::channel(256);
    let browser_cancel = cancel.clone();
    let browser_daemon = mdns_daemon.clone();
    let browser_handle = tokio::spawn(async move {
        if let Err(e) = mdns::browser::run_browser(browser_daemon, browser_tx, browser_cancel).await {
            tracing::error!("mDNS browser error: {}", e);
        }
    });

    // Spawn refresh manager task
    let mgr_cancel = cancel.clone();
    let mgr_config = config.discovery.clone();
    let mgr_orchestrator = orchestrator.clone();
    let mgr_handle = tokio::spawn(async move {
        if let Err(e) = refresh_manager::run(mgr_orchestrator, instances, browser_rx, mgr_config, mgr_cancel).await {
            tracing::error!("Refresh manager error: {}", e);
        }
    });

    // Build API router
    let app_state = api::routes::AppState {
        orchestrator,
        agent_user_id: Arc::from(agent_user_id),
    };
    let app = api::routes::router(app_state);

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Run server with graceful shutdown
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();

    let _ = tokio::join!(browser_handle, mgr_handle, server_handle);

    // Shutdown mDNS daemon
    if let Err(e) = mdns_daemon.shutdown() {
        tracing::error!("Failed to shutdown mDNS daemon: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
