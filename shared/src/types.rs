use std::net::IpAddr;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// A HAP bridge resolved on the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeInstance {
    /// Full DNS-SD instance name, e.g. "Homebridge 1A2B._hap._tcp.local."
    pub instance_name: String,

    /// Hostname, e.g. "pi.local."
    pub hostname: String,

    /// Address used for HAP requests
    pub address: IpAddr,

    /// HAP port
    pub port: u16,

    /// Bridge "username" from the `id` TXT record, e.g. "0E:3C:22:AA:10:5F"
    pub username: String,

    /// Model from the `md` TXT record
    pub model: Option<String>,

    /// Last time this bridge was resolved
    pub last_seen: DateTime<Utc>,
}

/// Body of `GET /accessories`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessoryDatabase {
    pub accessories: Vec<Accessory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accessory {
    pub aid: u64,
    pub services: Vec<HapService>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapService {
    pub iid: u64,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub characteristics: Vec<HapCharacteristic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapCharacteristic {
    pub iid: u64,
    #[serde(rename = "type")]
    pub characteristic_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub perms: Vec<String>,
}

/// An accessory database fetched from one bridge
#[derive(Debug, Clone)]
pub struct BridgeAccessories {
    pub instance: BridgeInstance,
    pub accessories: Vec<Accessory>,
}

/// One `{aid, iid, value}` entry as read from or written to `/characteristics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicValue {
    pub aid: u64,
    pub iid: u64,
    #[serde(default)]
    pub value: Value,
}

/// Body of `GET /characteristics` responses and `PUT /characteristics` requests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacteristicBatch {
    pub characteristics: Vec<CharacteristicValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accessory_database() {
        let json = r#"{"accessories":[{"aid":1,"services":[
            {"iid":1,"type":"3E","characteristics":[
                {"iid":2,"type":"23","perms":["pr"],"format":"string","value":"Bridge","description":"Name"}
            ]},
            {"iid":8,"type":"49","characteristics":[
                {"iid":9,"type":"25","perms":["pr","pw","ev"],"format":"bool","value":false}
            ]}
        ]}]}"#;

        let db: AccessoryDatabase = serde_json::from_str(json).unwrap();
        assert_eq!(db.accessories.len(), 1);
        let switch = &db.accessories[0].services[1];
        assert_eq!(switch.service_type, "49");
        assert_eq!(switch.characteristics[0].value, Some(Value::Bool(false)));
        assert!(switch.characteristics[0].description.is_none());
    }

    #[test]
    fn test_write_batch_shape() {
        let batch = CharacteristicBatch {
            characteristics: vec![CharacteristicValue { aid: 2, iid: 10, value: Value::Bool(true) }],
        };
        assert_eq!(
            serde_json::to_string(&batch).unwrap(),
            r#"{"characteristics":[{"aid":2,"iid":10,"value":true}]}"#
        );
    }
}
