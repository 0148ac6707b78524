use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use crate::config::DiscoveryConfig;
use crate::hap::InstanceTable;
use crate::mdns::browser::BrowserEvent;
use crate::orchestrator::Orchestrator;

/// Apply a browser event to the instance table. Returns true if routing changed.
pub async fn apply_event(instances: &InstanceTable, event: BrowserEvent) -> bool {
    match event {
        BrowserEvent::Resolved(instance) => {
            let name = instance.instance_name.clone();
            let changed = instances.upsert(instance).await;
            if changed {
                tracing::info!("Bridge available: {} ({} known)", name, instances.len().await);
            }
            changed
        }
        BrowserEvent::Removed(instance_name) => {
            let removed = instances.remove(&instance_name).await;
            if removed {
                tracing::info!("Bridge gone: {}", instance_name);
            }
            removed
        }
    }
}

async fn refresh(orchestrator: &Orchestrator, reason: &str) {
    let outcome = orchestrator.refresh().await;
    tracing::info!("Refresh ({}) registered {} services", reason, outcome.services);
    if outcome.changed {
        tracing::info!("Device set changed, fingerprint {}", outcome.fingerprint);
    }
}

/// Refresh manager event loop - bridges browser events to registry refreshes
pub async fn run(
    orchestrator: Arc<Orchestrator>,
    instances: InstanceTable,
    mut rx: mpsc::Receiver<BrowserEvent>,
    config: DiscoveryConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let settle = Duration::from_secs(config.settle_secs);
    let mut refresh_interval = tokio::time::interval(Duration::from_secs(config.refresh_interval_secs));
    // The first tick completes immediately; startup waits for bridges to settle instead
    refresh_interval.tick().await;

    let mut pending: Option<Instant> = None;

    loop {
        let deadline = pending.unwrap_or_else(Instant::now);
        tokio::select! {
            Some(event) = rx.recv() => {
                if apply_event(&instances, event).await {
                    pending = Some(Instant::now() + settle);
                }
            }
            _ = sleep_until(deadline), if pending.is_some() => {
                pending = None;
                refresh(&orchestrator, "bridges changed").await;
            }
            _ = refresh_interval.tick() => {
                refresh(&orchestrator, "periodic").await;
            }
            _ = cancel.cancelled() => {
                tracing::info!("Refresh manager shutting down");
                break;
            }
        }
    }

    Ok(())
}
