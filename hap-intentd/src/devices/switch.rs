use serde_json::Value;
use shared::intent::{commands, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, bool_param, online_state, unsupported, write, TypeAdapter};

/// On/off devices; the same mapping serves switches and outlets
pub struct Switch {
    device_type: &'static str,
}

impl Switch {
    pub fn new(device_type: &'static str) -> Self {
        Self { device_type }
    }
}

impl TypeAdapter for Switch {
    fn sync(&self, service: &Service) -> SyncDevice {
        base_sync(service, self.device_type, &[traits::ON_OFF], None)
    }

    fn query(&self, service: &Service) -> QueryState {
        let mut state = online_state();
        state.insert(
            "on".into(),
            Value::Bool(service.value_bool(characteristic::ON).unwrap_or(false)),
        );
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::ON_OFF => {
                let on = bool_param(execution, "on")?;
                Ok(batch(vec![write(service, characteristic::ON, Value::Bool(on))?]))
            }
            _ => Err(unsupported(service, execution)),
        }
    }
}
