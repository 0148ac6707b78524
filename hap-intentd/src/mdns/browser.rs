use std::net::IpAddr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use anyhow::{Context, Result};
use chrono::Utc;
use shared::protocol::{HAP_SERVICE_TYPE, TXT_ID, TXT_MODEL};
use shared::types::BridgeInstance;

pub enum BrowserEvent {
    Resolved(BridgeInstance),
    Removed(String),
}

pub async fn run_browser(
    daemon: ServiceDaemon,
    tx: mpsc::Sender<BrowserEvent>,
    cancel: CancellationToken,
) -> Result<()> {
    tracing::info!("Browsing for {}", HAP_SERVICE_TYPE);

    let receiver = daemon
        .browse(HAP_SERVICE_TYPE)
        .context("Failed to start HAP browse")?;

    loop {
        tokio::select! {
            event = receiver.recv_async() => {
                let event = match event {
                    Ok(ServiceEvent::ServiceResolved(info)) => match convert_service_info(&info) {
                        Some(instance) => {
                            tracing::debug!("Resolved bridge: {}", instance.instance_name);
                            BrowserEvent::Resolved(instance)
                        }
                        None => continue,
                    },
                    Ok(ServiceEvent::ServiceRemoved(_typ, fullname)) => {
                        tracing::debug!("Bridge removed: {}", fullname);
                        BrowserEvent::Removed(fullname)
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("HAP browse receiver disconnected: {}", e);
                        break;
                    }
                };

                if let Err(e) = tx.send(event).await {
                    tracing::error!("Failed to send browser event: {}", e);
                }
            }

            _ = cancel.cancelled() => {
                tracing::info!("mDNS browser shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Convert an mdns-sd ServiceInfo to a BridgeInstance.
/// Needs a routable address and an `id` TXT record.
fn convert_service_info(info: &ServiceInfo) -> Option<BridgeInstance> {
    // Link-local IPv6 would need a scope id; prefer IPv4, then the lowest address
    let address = info
        .get_addresses()
        .iter()
        .copied()
        .filter(|addr| !is_ipv6_link_local(addr))
        .min_by_key(|addr| (addr.is_ipv6(), *addr));

    let Some(address) = address else {
        tracing::debug!("Skipping bridge {} - no usable address", info.get_fullname());
        return None;
    };

    let Some(username) = info.get_property_val_str(TXT_ID).filter(|id| !id.is_empty()) else {
        tracing::debug!("Skipping bridge {} - no id record", info.get_fullname());
        return None;
    };

    Some(BridgeInstance {
        instance_name: info.get_fullname().to_string(),
        hostname: info.get_hostname().to_string(),
        address,
        port: info.get_port(),
        username: username.to_string(),
        model: info.get_property_val_str(TXT_MODEL).map(str::to_string),
        last_seen: Utc::now(),
    })
}

fn is_ipv6_link_local(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
        IpAddr::V4(_) => false,
    }
}
