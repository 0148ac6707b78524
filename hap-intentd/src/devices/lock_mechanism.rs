use serde_json::Value;
use shared::intent::{commands, device_type, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, bool_param, online_state, unsupported, write, TypeAdapter};

// LockCurrentState: 0 unsecured, 1 secured, 2 jammed, 3 unknown
const SECURED: f64 = 1.0;
const JAMMED: f64 = 2.0;

pub struct LockMechanism;

impl TypeAdapter for LockMechanism {
    fn sync(&self, service: &Service) -> SyncDevice {
        base_sync(service, device_type::LOCK, &[traits::LOCK_UNLOCK], None)
    }

    fn query(&self, service: &Service) -> QueryState {
        let current = service.value_f64(characteristic::LOCK_CURRENT_STATE);
        let mut state = online_state();
        state.insert("isLocked".into(), Value::Bool(current == Some(SECURED)));
        state.insert("isJammed".into(), Value::Bool(current == Some(JAMMED)));
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::LOCK_UNLOCK => {
                let lock = bool_param(execution, "lock")?;
                let target = Value::from(if lock { 1 } else { 0 });
                Ok(batch(vec![write(service, characteristic::LOCK_TARGET_STATE, target)?]))
            }
            _ => Err(unsupported(service, execution)),
        }
    }
}
