use shared::intent::{commands, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, number_param, online_state, percent, unsupported, write, TypeAdapter};

/// Position-driven openings: doors, windows and window coverings
pub struct Covering {
    device_type: &'static str,
}

impl Covering {
    pub fn new(device_type: &'static str) -> Self {
        Self { device_type }
    }
}

impl TypeAdapter for Covering {
    fn sync(&self, service: &Service) -> SyncDevice {
        base_sync(service, self.device_type, &[traits::OPEN_CLOSE], None)
    }

    fn query(&self, service: &Service) -> QueryState {
        let position = service.value_f64(characteristic::CURRENT_POSITION).unwrap_or(0.0);
        let mut state = online_state();
        state.insert("openPercent".into(), percent(position));
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::OPEN_CLOSE => {
                let open_percent = number_param(execution, "openPercent")?;
                Ok(batch(vec![write(service, characteristic::TARGET_POSITION, percent(open_percent))?]))
            }
            _ => Err(unsupported(service, execution)),
        }
    }
}
