use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use serde_json::Value;
use shared::types::CharacteristicValue;
use crate::devices::ServiceCategory;

/// Where reads and writes for a service must be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    pub address: IpAddr,
    pub port: u16,
    /// Owning bridge credential (HAP username)
    pub username: String,
}

impl Routing {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Characteristic {
    pub iid: u64,
    /// Full upper-case HAP type UUID
    pub characteristic_type: String,
    /// Unknown until a status read succeeds, apart from discovery-time values
    pub value: Option<Value>,
}

/// One controllable service as held by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub identity: String,
    /// Full upper-case HAP service type UUID
    pub service_type: String,
    pub category: ServiceCategory,
    pub aid: u64,
    pub iid: u64,
    pub display_name: String,
    pub characteristics: Vec<Characteristic>,
    pub routing: Routing,
    /// Accessory-information values keyed by label, e.g. "Manufacturer"
    pub accessory_metadata: BTreeMap<String, String>,
}

impl Service {
    pub fn characteristic(&self, characteristic_type: &str) -> Option<&Characteristic> {
        self.characteristics
            .iter()
            .find(|c| c.characteristic_type == characteristic_type)
    }

    pub fn has(&self, characteristic_type: &str) -> bool {
        self.characteristic(characteristic_type).is_some()
    }

    pub fn value(&self, characteristic_type: &str) -> Option<&Value> {
        self.characteristic(characteristic_type)?.value.as_ref()
    }

    /// Boolean view of a value; HAP bridges report booleans as either `true` or `1`
    pub fn value_bool(&self, characteristic_type: &str) -> Option<bool> {
        match self.value(characteristic_type)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            _ => None,
        }
    }

    pub fn value_f64(&self, characteristic_type: &str) -> Option<f64> {
        match self.value(characteristic_type)? {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.accessory_metadata.get(key).map(String::as_str)
    }

    /// Query string addressing every characteristic, e.g. `1.10,1.11`
    pub fn status_ids(&self) -> String {
        self.characteristics
            .iter()
            .map(|c| format!("{}.{}", self.aid, c.iid))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Apply values returned by a status read. Entries for other accessories,
    /// unknown iids, or without a value are ignored.
    pub fn apply_values(&mut self, values: &[CharacteristicValue]) -> usize {
        let mut updated = 0;
        for v in values.iter().filter(|v| v.aid == self.aid && !v.value.is_null()) {
            if let Some(c) = self.characteristics.iter_mut().find(|c| c.iid == v.iid) {
                c.value = Some(v.value.clone());
                updated += 1;
            }
        }
        updated
    }
}
