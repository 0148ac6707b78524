use serde_json::{json, Map, Value};
use shared::intent::{commands, device_type, traits, Execution, QueryState, SyncDevice};
use shared::protocol::characteristic;
use shared::types::CharacteristicBatch;
use crate::error::CommandError;
use crate::registry::service::Service;
use super::{base_sync, batch, bool_param, number_param, online_state, percent, unsupported, write, TypeAdapter};

/// Lights; brightness and colour traits follow the characteristics present
pub struct Lightbulb;

impl Lightbulb {
    fn has_color(service: &Service) -> bool {
        service.has(characteristic::HUE) && service.has(characteristic::SATURATION)
    }
}

impl TypeAdapter for Lightbulb {
    fn sync(&self, service: &Service) -> SyncDevice {
        let mut supported = vec![traits::ON_OFF];
        if service.has(characteristic::BRIGHTNESS) {
            supported.push(traits::BRIGHTNESS);
        }

        let attributes = if Self::has_color(service) {
            supported.push(traits::COLOR_SETTING);
            let mut attributes = Map::new();
            attributes.insert("colorModel".into(), Value::from("hsv"));
            Some(attributes)
        } else {
            None
        };

        base_sync(service, device_type::LIGHT, &supported, attributes)
    }

    fn query(&self, service: &Service) -> QueryState {
        let mut state = online_state();
        state.insert(
            "on".into(),
            Value::Bool(service.value_bool(characteristic::ON).unwrap_or(false)),
        );

        let brightness = service.value_f64(characteristic::BRIGHTNESS);
        if service.has(characteristic::BRIGHTNESS) {
            state.insert("brightness".into(), percent(brightness.unwrap_or(0.0)));
        }

        if Self::has_color(service) {
            let hue = service.value_f64(characteristic::HUE).unwrap_or(0.0);
            let saturation = service.value_f64(characteristic::SATURATION).unwrap_or(0.0);
            state.insert(
                "color".into(),
                json!({
                    "spectrumHsv": {
                        "hue": hue,
                        "saturation": saturation / 100.0,
                        "value": brightness.unwrap_or(100.0) / 100.0,
                    }
                }),
            );
        }
        state
    }

    fn execute(&self, service: &Service, execution: &Execution) -> Result<CharacteristicBatch, CommandError> {
        match execution.command.as_str() {
            commands::ON_OFF => {
                let on = bool_param(execution, "on")?;
                Ok(batch(vec![write(service, characteristic::ON, Value::Bool(on))?]))
            }
            commands::BRIGHTNESS_ABSOLUTE => {
                let brightness = number_param(execution, "brightness")?;
                Ok(batch(vec![write(service, characteristic::BRIGHTNESS, percent(brightness))?]))
            }
            commands::COLOR_ABSOLUTE => {
                let hsv = execution
                    .params
                    .get("color")
                    .and_then(|c| c.get("spectrumHSV"))
                    .ok_or_else(|| CommandError::MissingParameter {
                        command: execution.command.clone(),
                        param: "color.spectrumHSV",
                    })?;
                let component = |name: &'static str| {
                    hsv.get(name).and_then(Value::as_f64).ok_or_else(|| CommandError::MissingParameter {
                        command: execution.command.clone(),
                        param: name,
                    })
                };

                let hue = component("hue")?;
                let saturation = component("saturation")?;
                Ok(batch(vec![
                    write(service, characteristic::HUE, Value::from(hue.round().clamp(0.0, 360.0) as i64))?,
                    write(service, characteristic::SATURATION, percent(saturation * 100.0))?,
                ]))
            }
            _ => Err(unsupported(service, execution)),
        }
    }
}
