//! Per-category translation between HAP services and intent-protocol devices.
//!
//! Every category gets one [`TypeAdapter`]; the [`TypeRegistry`] maps category
//! tags to adapters and is the only place the orchestrator dispatches on type.

mod covering;
mod fan;
mod garage_door_opener;
mod lightbulb;
mod lock_mechanism;
mod switch;
mod thermostat;

pub use covering::Covering;
pub use fan::Fan;
pub use garage_door_opener::GarageDoorOpener;
pub use lightbulb::Lightbulb;
pub use lock_mechanism::LockMechanism;
pub use switch::Switch;
pub use thermostat::Thermostat;

use std::collections::HashMap;
use std::fmt;
use serde_json::{Map, Value};
use shared::intent::{device_type, CustomData, DeviceInfo, DeviceName, Execution, QueryState, SyncDevice};
use shared::protocol::{normalize_type, service};
use shared::types::{CharacteristicBatch, CharacteristicValue};
use crate::error::CommandError;
use crate::registry::service::Service;

/// Device categories a HAP service type can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceCategory {
    Door,
    Fan,
    GarageDoorOpener,
    Lightbulb,
    LockMechanism,
    Outlet,
    Switch,
    Thermostat,
    Window,
    WindowCovering,
}

impl ServiceCategory {
    /// Resolve a HAP service type (short or full form)
    pub fn from_hap_type(service_type: &str) -> Option<Self> {
        let category = match normalize_type(service_type).as_str() {
            service::DOOR => ServiceCategory::Door,
            service::FAN | service::FAN_V2 => ServiceCategory::Fan,
            service::GARAGE_DOOR_OPENER => ServiceCategory::GarageDoorOpener,
            service::LIGHTBULB => ServiceCategory::Lightbulb,
            service::LOCK_MECHANISM => ServiceCategory::LockMechanism,
            service::OUTLET => ServiceCategory::Outlet,
            service::SWITCH => ServiceCategory::Switch,
            service::THERMOSTAT => ServiceCategory::Thermostat,
            service::WINDOW => ServiceCategory::Window,
            service::WINDOW_COVERING => ServiceCategory::WindowCovering,
            _ => return None,
        };
        Some(category)
    }

    pub fn name(self) -> &'static str {
        match self {
            ServiceCategory::Door => "Door",
            ServiceCategory::Fan => "Fan",
            ServiceCategory::GarageDoorOpener => "GarageDoorOpener",
            ServiceCategory::Lightbulb => "Lightbulb",
            ServiceCategory::LockMechanism => "LockMechanism",
            ServiceCategory::Outlet => "Outlet",
            ServiceCategory::Switch => "Switch",
            ServiceCategory::Thermostat => "Thermostat",
            ServiceCategory::Window => "Window",
            ServiceCategory::WindowCovering => "WindowCovering",
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Translation between one device category and the intent protocol.
///
/// All three operations are pure: `query` assumes the caller has already
/// refreshed the characteristic values.
pub trait TypeAdapter: Send + Sync {
    fn sync(&self, service: &Service) -> SyncDevice;

    fn query(&self, service: &Service) -> QueryState;

    /// Translate one execution step into characteristic writes for the owning bridge.
    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError>;
}

/// Category tag to adapter mapping
pub struct TypeRegistry {
    adapters: HashMap<ServiceCategory, Box<dyn TypeAdapter>>,
}

impl TypeRegistry {
    /// An empty registry; discovery will accept nothing until adapters are registered
    pub fn empty() -> Self {
        Self { adapters: HashMap::new() }
    }

    /// A registry with an adapter for every known category
    pub fn with_defaults() -> Self {
        let mut types = Self::empty();
        types.register(ServiceCategory::Door, Covering::new(device_type::DOOR));
        types.register(ServiceCategory::Fan, Fan);
        types.register(ServiceCategory::GarageDoorOpener, GarageDoorOpener);
        types.register(ServiceCategory::Lightbulb, Lightbulb);
        types.register(ServiceCategory::LockMechanism, LockMechanism);
        types.register(ServiceCategory::Outlet, Switch::new(device_type::OUTLET));
        types.register(ServiceCategory::Switch, Switch::new(device_type::SWITCH));
        types.register(ServiceCategory::Thermostat, Thermostat);
        types.register(ServiceCategory::Window, Covering::new(device_type::WINDOW));
        types.register(ServiceCategory::WindowCovering, Covering::new(device_type::BLINDS));
        types
    }

    /// Register or replace the adapter for a category
    pub fn register(&mut self, category: ServiceCategory, adapter: impl TypeAdapter + 'static) {
        self.adapters.insert(category, Box::new(adapter));
    }

    pub fn get(&self, category: ServiceCategory) -> Option<&dyn TypeAdapter> {
        self.adapters.get(&category).map(|a| a.as_ref())
    }

    pub fn contains(&self, category: ServiceCategory) -> bool {
        self.adapters.contains_key(&category)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// SYNC descriptor fields common to every category
pub(crate) fn base_sync(
    service: &Service,
    device_type: &str,
    traits: &[&str],
    attributes: Option<Map<String, Value>>,
) -> SyncDevice {
    let meta = |key: &str| service.metadata(key).map(str::to_string);

    SyncDevice {
        id: service.identity.clone(),
        device_type: device_type.to_string(),
        traits: traits.iter().map(|t| t.to_string()).collect(),
        name: DeviceName::new(&service.display_name),
        will_report_state: false,
        attributes,
        device_info: DeviceInfo {
            manufacturer: meta("Manufacturer"),
            model: meta("Model"),
            hw_version: meta("Hardware Revision"),
            sw_version: meta("Firmware Revision"),
        },
        custom_data: CustomData {
            aid: service.aid,
            iid: service.iid,
            instance_username: service.routing.username.clone(),
            instance_ip_address: service.routing.address.to_string(),
            instance_port: service.routing.port,
        },
    }
}

/// Start a query state with `online: true`
pub(crate) fn online_state() -> QueryState {
    let mut state = QueryState::new();
    state.insert("online".into(), Value::Bool(true));
    state
}

/// Single characteristic write, failing if the service lacks the characteristic
pub(crate) fn write(
    service: &Service,
    characteristic_type: &str,
    value: Value,
) -> Result<CharacteristicValue, CommandError> {
    let c = service
        .characteristic(characteristic_type)
        .ok_or_else(|| CommandError::MissingCharacteristic {
            identity: service.identity.clone(),
            characteristic: characteristic_type.to_string(),
        })?;

    Ok(CharacteristicValue { aid: service.aid, iid: c.iid, value })
}

pub(crate) fn batch(characteristics: Vec<CharacteristicValue>) -> CharacteristicBatch {
    CharacteristicBatch { characteristics }
}

pub(crate) fn unsupported(service: &Service, execution: &Execution) -> CommandError {
    CommandError::Unsupported {
        category: service.category,
        command: execution.command.clone(),
    }
}

pub(crate) fn bool_param(execution: &Execution, param: &'static str) -> Result<bool, CommandError> {
    execution
        .params
        .get(param)
        .and_then(Value::as_bool)
        .ok_or_else(|| CommandError::MissingParameter {
            command: execution.command.clone(),
            param,
        })
}

pub(crate) fn number_param(execution: &Execution, param: &'static str) -> Result<f64, CommandError> {
    execution
        .params
        .get(param)
        .and_then(Value::as_f64)
        .ok_or_else(|| CommandError::MissingParameter {
            command: execution.command.clone(),
            param,
        })
}

/// Round and clamp a percentage for an integer characteristic
pub(crate) fn percent(value: f64) -> Value {
    Value::from(value.round().clamp(0.0, 100.0) as i64)
}
