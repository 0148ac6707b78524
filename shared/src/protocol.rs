/// mDNS service type advertised by HAP bridges
pub const HAP_SERVICE_TYPE: &str = "_hap._tcp.local.";

/// TXT record keys used in HAP advertisements
pub const TXT_ID: &str = "id";
pub const TXT_MODEL: &str = "md";

/// API path prefix
pub const API_PREFIX: &str = "/v1";

/// Suffix shared by every Apple-defined HAP type UUID
pub const HAP_BASE_UUID_SUFFIX: &str = "-0000-1000-8000-0026BB765291";

/// Expand a HAP type to its full upper-case UUID form.
///
/// Bridges may report either the short form (`"43"`) or the full form
/// (`"00000043-0000-1000-8000-0026BB765291"`); both normalize to the latter.
pub fn normalize_type(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains('-') {
        return raw.to_ascii_uppercase();
    }
    format!("{:0>8}{}", raw.to_ascii_uppercase(), HAP_BASE_UUID_SUFFIX)
}

/// HAP service type UUIDs
pub mod service {
    pub const ACCESSORY_INFORMATION: &str = "0000003E-0000-1000-8000-0026BB765291";
    pub const DOOR: &str = "00000081-0000-1000-8000-0026BB765291";
    pub const FAN: &str = "00000040-0000-1000-8000-0026BB765291";
    pub const FAN_V2: &str = "000000B7-0000-1000-8000-0026BB765291";
    pub const GARAGE_DOOR_OPENER: &str = "00000041-0000-1000-8000-0026BB765291";
    pub const LIGHTBULB: &str = "00000043-0000-1000-8000-0026BB765291";
    pub const LOCK_MECHANISM: &str = "00000045-0000-1000-8000-0026BB765291";
    pub const OUTLET: &str = "00000047-0000-1000-8000-0026BB765291";
    pub const SWITCH: &str = "00000049-0000-1000-8000-0026BB765291";
    pub const THERMOSTAT: &str = "0000004A-0000-1000-8000-0026BB765291";
    pub const WINDOW: &str = "0000008B-0000-1000-8000-0026BB765291";
    pub const WINDOW_COVERING: &str = "0000008C-0000-1000-8000-0026BB765291";
}

/// HAP characteristic type UUIDs
pub mod characteristic {
    pub const ACTIVE: &str = "000000B0-0000-1000-8000-0026BB765291";
    pub const BRIGHTNESS: &str = "00000008-0000-1000-8000-0026BB765291";
    pub const CONFIGURED_NAME: &str = "000000E3-0000-1000-8000-0026BB765291";
    pub const CURRENT_DOOR_STATE: &str = "0000000E-0000-1000-8000-0026BB765291";
    pub const CURRENT_HEATING_COOLING_STATE: &str = "0000000F-0000-1000-8000-0026BB765291";
    pub const CURRENT_POSITION: &str = "0000006D-0000-1000-8000-0026BB765291";
    pub const CURRENT_RELATIVE_HUMIDITY: &str = "00000010-0000-1000-8000-0026BB765291";
    pub const CURRENT_TEMPERATURE: &str = "00000011-0000-1000-8000-0026BB765291";
    pub const FIRMWARE_REVISION: &str = "00000052-0000-1000-8000-0026BB765291";
    pub const HARDWARE_REVISION: &str = "00000053-0000-1000-8000-0026BB765291";
    pub const HUE: &str = "00000013-0000-1000-8000-0026BB765291";
    pub const LOCK_CURRENT_STATE: &str = "0000001D-0000-1000-8000-0026BB765291";
    pub const LOCK_TARGET_STATE: &str = "0000001E-0000-1000-8000-0026BB765291";
    pub const MANUFACTURER: &str = "00000020-0000-1000-8000-0026BB765291";
    pub const MODEL: &str = "00000021-0000-1000-8000-0026BB765291";
    pub const NAME: &str = "00000023-0000-1000-8000-0026BB765291";
    pub const ON: &str = "00000025-0000-1000-8000-0026BB765291";
    pub const ROTATION_SPEED: &str = "00000029-0000-1000-8000-0026BB765291";
    pub const SATURATION: &str = "0000002F-0000-1000-8000-0026BB765291";
    pub const SERIAL_NUMBER: &str = "00000030-0000-1000-8000-0026BB765291";
    pub const TARGET_DOOR_STATE: &str = "00000032-0000-1000-8000-0026BB765291";
    pub const TARGET_HEATING_COOLING_STATE: &str = "00000033-0000-1000-8000-0026BB765291";
    pub const TARGET_POSITION: &str = "0000007C-0000-1000-8000-0026BB765291";
    pub const TARGET_TEMPERATURE: &str = "00000035-0000-1000-8000-0026BB765291";
    pub const TEMPERATURE_DISPLAY_UNITS: &str = "00000036-0000-1000-8000-0026BB765291";

    /// Accessory-information metadata keys, used when a bridge omits `description`
    pub fn info_label(type_uuid: &str) -> Option<&'static str> {
        match type_uuid {
            NAME => Some("Name"),
            MANUFACTURER => Some("Manufacturer"),
            MODEL => Some("Model"),
            SERIAL_NUMBER => Some("Serial Number"),
            FIRMWARE_REVISION => Some("Firmware Revision"),
            HARDWARE_REVISION => Some("Hardware Revision"),
            _ => None,
        }
    }
}
