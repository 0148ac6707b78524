use serde_json::{Map, Value};
use shared::intent::{commands, device_type, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, number_param, online_state, unsupported, write, TypeAdapter};

/// HeatingCoolingState values in index order
const MODES: [&str; 4] = ["off", "heat", "cool", "heatcool"];

pub struct Thermostat;

fn mode_name(state: f64) -> &'static str {
    MODES.get(state as usize).copied().unwrap_or("off")
}

fn mode_value(mode: &str) -> Option<i64> {
    match mode {
        "auto" => Some(3),
        _ => MODES.iter().position(|m| *m == mode).map(|i| i as i64),
    }
}

impl TypeAdapter for Thermostat {
    fn sync(&self, service: &Service) -> SyncDevice {
        // TemperatureDisplayUnits: 0 celsius, 1 fahrenheit
        let unit = match service.value_f64(characteristic::TEMPERATURE_DISPLAY_UNITS) {
            Some(u) if u == 1.0 => "F",
            _ => "C",
        };

        let mut attributes = Map::new();
        attributes.insert(
            "availableThermostatModes".into(),
            Value::from(MODES.iter().map(|m| Value::from(*m)).collect::<Vec<_>>()),
        );
        attributes.insert("thermostatTemperatureUnit".into(), Value::from(unit));

        base_sync(service, device_type::THERMOSTAT, &[traits::TEMPERATURE_SETTING], Some(attributes))
    }

    fn query(&self, service: &Service) -> QueryState {
        let mut state = online_state();
        let mode = service
            .value_f64(characteristic::TARGET_HEATING_COOLING_STATE)
            .or_else(|| service.value_f64(characteristic::CURRENT_HEATING_COOLING_STATE))
            .unwrap_or(0.0);
        state.insert("thermostatMode".into(), Value::from(mode_name(mode)));

        let temperatures = [
            ("thermostatTemperatureSetpoint", characteristic::TARGET_TEMPERATURE),
            ("thermostatTemperatureAmbient", characteristic::CURRENT_TEMPERATURE),
            ("thermostatHumidityAmbient", characteristic::CURRENT_RELATIVE_HUMIDITY),
        ];
        for (key, characteristic_type) in temperatures {
            if let Some(v) = service.value_f64(characteristic_type) {
                state.insert(key.into(), Value::from(v));
            }
        }
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::THERMOSTAT_TEMPERATURE_SETPOINT => {
                let setpoint = number_param(execution, "thermostatTemperatureSetpoint")?;
                Ok(batch(vec![write(service, characteristic::TARGET_TEMPERATURE, Value::from(setpoint))?]))
            }
            commands::THERMOSTAT_SET_MODE => {
                let requested = execution
                    .params
                    .get("thermostatMode")
                    .and_then(Value::as_str)
                    .ok_or_else(|| CommandError::MissingParameter {
                        command: execution.command.clone(),
                        param: "thermostatMode",
                    })?;
                let mode = mode_value(requested).ok_or_else(|| CommandError::InvalidParameter {
                    command: execution.command.clone(),
                    param: "thermostatMode",
                    reason: format!("unsupported mode {}", requested),
                })?;
                Ok(batch(vec![write(
                    service,
                    characteristic::TARGET_HEATING_COOLING_STATE,
                    Value::from(mode),
                )?]))
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

    fn thermostat() -> Service {
        let mut service = switch_service();
        service.category = ServiceCategory::Thermostat;
        service.characteristics = [
            (10, characteristic::CURRENT_HEATING_COOLING_STATE, json!(1)),
            (11, characteristic::TARGET_HEATING_COOLING_STATE, json!(1)),
            (12, characteristic::CURRENT_TEMPERATURE, json!(19.5)),
            (13, characteristic::TARGET_TEMPERATURE, json!(21)),
            (14, characteristic::TEMPERATURE_DISPLAY_UNITS, json!(0)),
        ]
        .into_iter()
        .map(|(iid, ty, value)| Characteristic {
            iid,
            characteristic_type: ty.into(),
            value: Some(value),
        })
        .collect();
        service
    }

    #[test]
    fn test_sync_attributes() {
        let device = Thermostat.sync(&thermostat());
        let attributes = device.attributes.unwrap();
        assert_eq!(attributes["thermostatTemperatureUnit"], json!("C"));
        assert_eq!(
            attributes["availableThermostatModes"],
            json!(["off", "heat", "cool", "heatcool"])
        );
    }

    #[test]
    fn test_query() {
        let state = Thermostat.query(&thermostat());
        assert_eq!(state["thermostatMode"], json!("heat"));
        assert_eq!(state["thermostatTemperatureSetpoint"], json!(21.0));
        assert_eq!(state["thermostatTemperatureAmbient"], json!(19.5));
        assert!(!state.contains_key("thermostatHumidityAmbient"));
    }

    #[test]
    fn test_execute_setpoint() {
        let payload = Thermostat
            .execute(
                &thermostat(),
                &execution(commands::THERMOSTAT_TEMPERATURE_SETPOINT, json!({"thermostatTemperatureSetpoint": 22.5})),
            )
            .unwrap();
        assert_eq!(payload.characteristics[0].iid, 13);
        assert_eq!(payload.characteristics[0].value, json!(22.5));
    }

    #[test]
    fn test_execute_mode() {
        let payload = Thermostat
            .execute(&thermostat(), &execution(commands::THERMOSTAT_SET_MODE, json!({"thermostatMode": "cool"})))
            .unwrap();
        assert_eq!(payload.characteristics[0].iid, 11);
        assert_eq!(payload.characteristics[0].value, json!(2));

        let err = Thermostat
            .execute(&thermostat(), &execution(commands::THERMOSTAT_SET_MODE, json!({"thermostatMode": "eco"})))
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidParameter { .. }));
    }
}
