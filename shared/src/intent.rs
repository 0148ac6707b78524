//! Request and response shapes of the smart-home intent protocol.
//!
//! Field names follow the protocol's camelCase wire format.

use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};

pub const INTENT_SYNC: &str = "action.devices.SYNC";
pub const INTENT_QUERY: &str = "action.devices.QUERY";
pub const INTENT_EXECUTE: &str = "action.devices.EXECUTE";
pub const INTENT_DISCONNECT: &str = "action.devices.DISCONNECT";

/// Device type tags
pub mod device_type {
    pub const BLINDS: &str = "action.devices.types.BLINDS";
    pub const DOOR: &str = "action.devices.types.DOOR";
    pub const FAN: &str = "action.devices.types.FAN";
    pub const GARAGE: &str = "action.devices.types.GARAGE";
    pub const LIGHT: &str = "action.devices.types.LIGHT";
    pub const LOCK: &str = "action.devices.types.LOCK";
    pub const OUTLET: &str = "action.devices.types.OUTLET";
    pub const SWITCH: &str = "action.devices.types.SWITCH";
    pub const THERMOSTAT: &str = "action.devices.types.THERMOSTAT";
    pub const WINDOW: &str = "action.devices.types.WINDOW";
}

/// Trait tags
pub mod traits {
    pub const BRIGHTNESS: &str = "action.devices.traits.Brightness";
    pub const COLOR_SETTING: &str = "action.devices.traits.ColorSetting";
    pub const FAN_SPEED: &str = "action.devices.traits.FanSpeed";
    pub const LOCK_UNLOCK: &str = "action.devices.traits.LockUnlock";
    pub const ON_OFF: &str = "action.devices.traits.OnOff";
    pub const OPEN_CLOSE: &str = "action.devices.traits.OpenClose";
    pub const TEMPERATURE_SETTING: &str = "action.devices.traits.TemperatureSetting";
}

/// Command tags
pub mod commands {
    pub const BRIGHTNESS_ABSOLUTE: &str = "action.devices.commands.BrightnessAbsolute";
    pub const COLOR_ABSOLUTE: &str = "action.devices.commands.ColorAbsolute";
    pub const LOCK_UNLOCK: &str = "action.devices.commands.LockUnlock";
    pub const ON_OFF: &str = "action.devices.commands.OnOff";
    pub const OPEN_CLOSE: &str = "action.devices.commands.OpenClose";
    pub const SET_FAN_SPEED: &str = "action.devices.commands.SetFanSpeed";
    pub const THERMOSTAT_SET_MODE: &str = "action.devices.commands.ThermostatSetMode";
    pub const THERMOSTAT_TEMPERATURE_SETPOINT: &str =
        "action.devices.commands.ThermostatTemperatureSetpoint";
}

/// Trait-state snapshot returned for one device by QUERY
pub type QueryState = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDevice {
    pub id: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub traits: Vec<String>,
    pub name: DeviceName,
    pub will_report_state: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    pub device_info: DeviceInfo,
    pub custom_data: CustomData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceName {
    pub default_names: Vec<String>,
    pub name: String,
    pub nicknames: Vec<String>,
}

impl DeviceName {
    pub fn new(name: &str) -> Self {
        Self {
            default_names: vec![name.to_string()],
            name: name.to_string(),
            nicknames: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_version: Option<String>,
}

/// Routing hints echoed back by the intent platform on QUERY/EXECUTE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    pub aid: u64,
    pub iid: u64,
    pub instance_username: String,
    pub instance_ip_address: String,
    pub instance_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Value>,
}

impl DeviceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), custom_data: None }
    }
}

/// One command step, e.g. `OnOff` with `{"on": true}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub command: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteCommand {
    pub devices: Vec<DeviceRef>,
    pub execution: Vec<Execution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub ids: Vec<String>,
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryPayload {
    pub devices: Vec<DeviceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutePayload {
    pub commands: Vec<ExecuteCommand>,
}

/// Fulfillment envelope as posted by the intent platform
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub request_id: String,
    pub inputs: Vec<IntentInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntentInput {
    pub intent: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub request_id: String,
    pub payload: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_execute_request() {
        let json = r#"{
            "requestId": "ff36a3cc",
            "inputs": [{
                "intent": "action.devices.EXECUTE",
                "payload": {"commands": [{
                    "devices": [{"id": "abc", "customData": {"aid": 2}}],
                    "execution": [{"command": "action.devices.commands.OnOff", "params": {"on": true}}]
                }]}
            }]
        }"#;

        let request: FulfillmentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.request_id, "ff36a3cc");

        let payload: ExecutePayload =
            serde_json::from_value(request.inputs[0].payload.clone()).unwrap();
        assert_eq!(payload.commands[0].devices[0].id, "abc");
        assert_eq!(payload.commands[0].execution[0].params["on"], Value::Bool(true));
    }

    #[test]
    fn test_command_result_wire_format() {
        let result = CommandResult {
            ids: vec!["abc".into()],
            status: CommandStatus::Success,
            error_code: None,
        };
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"ids":["abc"],"status":"SUCCESS"}"#
        );
    }
}
