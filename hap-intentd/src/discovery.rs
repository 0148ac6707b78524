//! Turns accessory databases fetched from bridges into registry services.

use std::collections::BTreeMap;
use serde_json::Value;
use shared::protocol::{characteristic, normalize_type, service};
use shared::types::{Accessory, BridgeAccessories, HapCharacteristic, HapService};
use crate::devices::{ServiceCategory, TypeRegistry};
use crate::registry::identity::service_identity;
use crate::registry::service::{Characteristic, Routing, Service};

/// Extract every controllable service with a registered adapter, in discovery order.
pub fn discover(bridges: &[BridgeAccessories], types: &TypeRegistry) -> Vec<Service> {
    let mut services = Vec::new();

    for bridge in bridges {
        let routing = Routing {
            address: bridge.instance.address,
            port: bridge.instance.port,
            username: bridge.instance.username.clone(),
        };

        for accessory in &bridge.accessories {
            let metadata = accessory_information(accessory);

            for hap_service in &accessory.services {
                let service_type = normalize_type(&hap_service.service_type);
                if service_type == service::ACCESSORY_INFORMATION {
                    continue;
                }

                let Some(category) = ServiceCategory::from_hap_type(&service_type) else {
                    tracing::debug!(
                        "Skipping unsupported service type {} on {}.{}",
                        service_type,
                        accessory.aid,
                        hap_service.iid
                    );
                    continue;
                };
                if !types.contains(category) {
                    tracing::debug!("No adapter registered for {}", category);
                    continue;
                }

                services.push(build_service(
                    hap_service,
                    service_type,
                    category,
                    accessory.aid,
                    &routing,
                    &metadata,
                ));
            }
        }

        tracing::debug!(
            "Parsed {} accessories from {}",
            bridge.accessories.len(),
            bridge.instance.instance_name
        );
    }

    services
}

fn build_service(
    hap_service: &HapService,
    service_type: String,
    category: ServiceCategory,
    aid: u64,
    routing: &Routing,
    metadata: &BTreeMap<String, String>,
) -> Service {
    let characteristics: Vec<Characteristic> = hap_service
        .characteristics
        .iter()
        .map(|c| Characteristic {
            iid: c.iid,
            characteristic_type: normalize_type(&c.characteristic_type),
            value: c.value.clone(),
        })
        .collect();

    let display_name = characteristics
        .iter()
        .filter(|c| {
            c.characteristic_type == characteristic::NAME
                || c.characteristic_type == characteristic::CONFIGURED_NAME
        })
        .find_map(|c| c.value.as_ref().and_then(value_text))
        .or_else(|| metadata.get("Name").cloned())
        .unwrap_or_else(|| category.name().to_string());

    Service {
        identity: service_identity(&routing.username, aid, hap_service.iid, &service_type),
        service_type,
        category,
        aid,
        iid: hap_service.iid,
        display_name,
        characteristics,
        routing: routing.clone(),
        accessory_metadata: metadata.clone(),
    }
}

/// Collect the accessory-information service into label → value pairs.
/// Empty values are left out.
fn accessory_information(accessory: &Accessory) -> BTreeMap<String, String> {
    accessory
        .services
        .iter()
        .filter(|s| normalize_type(&s.service_type) == service::ACCESSORY_INFORMATION)
        .flat_map(|s| s.characteristics.iter())
        .filter_map(|c| Some((info_label(c)?, value_text(c.value.as_ref()?)?)))
        .collect()
}

fn info_label(c: &HapCharacteristic) -> Option<String> {
    c.description
        .clone()
        .filter(|d| !d.is_empty())
        .or_else(|| characteristic::info_label(&normalize_type(&c.characteristic_type)).map(String::from))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
