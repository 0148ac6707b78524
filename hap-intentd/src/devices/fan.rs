use serde_json::{Map, Value};
use shared::intent::{commands, device_type, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::{CharacteristicBatch, CharacteristicValue};
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, bool_param, number_param, online_state, percent, unsupported, write, TypeAdapter};

/// Fans; Fan services switch with `On`, Fanv2 services with `Active`
pub struct Fan;

impl Fan {
    fn power(service: &Service, on: bool) -> Result<CharacteristicValue, CommandError> {
        if service.has(characteristic::ON) {
            write(service, characteristic::ON, Value::Bool(on))
        } else {
            write(service, characteristic::ACTIVE, Value::from(if on { 1 } else { 0 }))
        }
    }

    fn is_on(service: &Service) -> bool {
        service
            .value_bool(characteristic::ON)
            .or_else(|| service.value_bool(characteristic::ACTIVE))
            .unwrap_or(false)
    }
}

impl TypeAdapter for Fan {
    fn sync(&self, service: &Service) -> SyncDevice {
        if service.has(characteristic::ROTATION_SPEED) {
            let mut attributes = Map::new();
            attributes.insert("supportsFanSpeedPercent".into(), Value::Bool(true));
            attributes.insert("reversible".into(), Value::Bool(false));
            base_sync(
                service,
                device_type::FAN,
                &[traits::ON_OFF, traits::FAN_SPEED],
                Some(attributes),
            )
        } else {
            base_sync(service, device_type::FAN, &[traits::ON_OFF], None)
        }
    }

    fn query(&self, service: &Service) -> QueryState {
        let mut state = online_state();
        state.insert("on".into(), Value::Bool(Self::is_on(service)));
        if service.has(characteristic::ROTATION_SPEED) {
            let speed = service.value_f64(characteristic::ROTATION_SPEED).unwrap_or(0.0);
            state.insert("currentFanSpeedPercent".into(), percent(speed));
        }
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::ON_OFF => {
                let on = bool_param(execution, "on")?;
                Ok(batch(vec![Self::power(service, on)?]))
            }
            commands::SET_FAN_SPEED => {
                let speed = number_param(execution, "fanSpeedPercent")?;
                Ok(batch(vec![write(service, characteristic::ROTATION_SPEED, percent(speed))?]))
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

    fn fan_v2() -> Service {
        let mut service = switch_service();
        service.category = ServiceCategory::Fan;
        service.characteristics = vec![
            Characteristic {
                iid: 10,
                characteristic_type: characteristic::ACTIVE.into(),
                value: Some(json!(1)),
            },
            Characteristic {
                iid: 11,
                characteristic_type: characteristic::ROTATION_SPEED.into(),
                value: Some(json!(35)),
            },
        ];
        service
    }

    #[test]
    fn test_sync_with_speed() {
        let device = Fan.sync(&fan_v2());
        assert_eq!(device.traits, vec![traits::ON_OFF, traits::FAN_SPEED]);
        assert_eq!(device.attributes.unwrap()["supportsFanSpeedPercent"], json!(true));
    }

    #[test]
    fn test_query_active_fan() {
        let state = Fan.query(&fan_v2());
        assert_eq!(state["on"], json!(true));
        assert_eq!(state["currentFanSpeedPercent"], json!(35));
    }

    #[test]
    fn test_execute_off_writes_active() {
        let payload = Fan
            .execute(&fan_v2(), &execution(commands::ON_OFF, json!({"on": false})))
            .unwrap();
        assert_eq!(payload.characteristics[0].iid, 10);
        assert_eq!(payload.characteristics[0].value, json!(0));
    }

    #[test]
    fn test_execute_on_writes_on_for_v1() {
        let mut service = fan_v2();
        service.characteristics[0].characteristic_type = characteristic::ON.into();
        let payload = Fan
            .execute(&service, &execution(commands::ON_OFF, json!({"on": true})))
            .unwrap();
        assert_eq!(payload.characteristics[0].value, json!(true));
    }

    #[test]
    fn test_execute_speed() {
        let payload = Fan
            .execute(&fan_v2(), &execution(commands::SET_FAN_SPEED, json!({"fanSpeedPercent": 80})))
            .unwrap();
        assert_eq!(payload.characteristics[0].iid, 11);
        assert_eq!(payload.characteristics[0].value, json!(80));
    }
}
