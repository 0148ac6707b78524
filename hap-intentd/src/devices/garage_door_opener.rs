use serde_json::{Map, Value};
use shared::intent::{commands, device_type, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, number_param, online_state, unsupported, write, TypeAdapter};

// CurrentDoorState/TargetDoorState: 0 open, 1 closed
const DOOR_OPEN: i64 = 0;
const DOOR_CLOSED: i64 = 1;

pub struct GarageDoorOpener;

impl TypeAdapter for GarageDoorOpener {
    fn sync(&self, service: &Service) -> SyncDevice {
        let mut attributes = Map::new();
        attributes.insert("discreteOnlyOpenClose".into(), Value::Bool(true));
        base_sync(service, device_type::GARAGE, &[traits::OPEN_CLOSE], Some(attributes))
    }

    fn query(&self, service: &Service) -> QueryState {
        let open = service.value_f64(characteristic::CURRENT_DOOR_STATE) == Some(DOOR_OPEN as f64);
        let mut state = online_state();
        state.insert("openPercent".into(), Value::from(if open { 100 } else { 0 }));
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::OPEN_CLOSE => {
                let open_percent = number_param(execution, "openPercent")?;
                let target = if open_percent > 0.0 { DOOR_OPEN } else { DOOR_CLOSED };
                Ok(batch(vec![write(service, characteristic::TARGET_DOOR_STATE, Value::from(target))?]))
            }
            _ => Err(unsupported(service, execution)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::devices::tests::execution;
    use crate::devices::ServiceCategory;
    use crate::registry::service::tests::switch_service;
    use crate::registry::service::Characteristic;

    fn garage(current: i64) -> Service {
        let mut service = switch_service();
        service.category = ServiceCategory::GarageDoorOpener;
        service.characteristics = vec![
            Characteristic {
                iid: 10,
                characteristic_type: characteristic::CURRENT_DOOR_STATE.into(),
                value: Some(json!(current)),
            },
            Characteristic {
                iid: 11,
                characteristic_type: characteristic::TARGET_DOOR_STATE.into(),
                value: Some(json!(current)),
            },
        ];
        service
    }

    #[test]
    fn test_query_open_and_closed() {
        assert_eq!(GarageDoorOpener.query(&garage(0))["openPercent"], json!(100));
        assert_eq!(GarageDoorOpener.query(&garage(1))["openPercent"], json!(0));
        // closing
        assert_eq!(GarageDoorOpener.query(&garage(3))["openPercent"], json!(0));
    }

    #[test]
    fn test_execute_open_close() {
        let open = GarageDoorOpener
            .execute(&garage(1), &execution(commands::OPEN_CLOSE, json!({"openPercent": 100})))
            .unwrap();
        assert_eq!(open.characteristics[0].iid, 11);
        assert_eq!(open.characteristics[0].value, json!(0));

        let close = GarageDoorOpener
            .execute(&garage(0), &execution(commands::OPEN_CLOSE, json!({"openPercent": 0})))
            .unwrap();
        assert_eq!(close.characteristics[0].value, json!(1));
    }
}
