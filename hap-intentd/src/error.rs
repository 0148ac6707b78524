//! Typed faults raised at the bridge and adapter seams.
//!
//! Neither kind is fatal: the orchestrator converts both into a per-device
//! ERROR slot in the batch response.

use thiserror::Error;
use crate::devices::ServiceCategory;

/// A failed round trip to a HAP bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("invalid response from {endpoint}: {reason}")]
    Protocol { endpoint: String, reason: String },
}

/// A command a type adapter cannot translate into a characteristic write
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{category} does not support {command}")]
    Unsupported {
        category: ServiceCategory,
        command: String,
    },

    #[error("{command} is missing parameter {param}")]
    MissingParameter { command: String, param: &'static str },

    #[error("{command} has invalid {param}: {reason}")]
    InvalidParameter {
        command: String,
        param: &'static str,
        reason: String,
    },

    #[error("service {identity} has no characteristic {characteristic}")]
    MissingCharacteristic {
        identity: String,
        characteristic: String,
    },

    #[error("command contains no executions")]
    Empty,
}

impl CommandError {
    /// Error code reported to the intent platform
    pub fn error_code(&self) -> &'static str {
        match self {
            CommandError::Unsupported { .. } | CommandError::MissingCharacteristic { .. } => {
                "functionNotSupported"
            }
            CommandError::MissingParameter { .. }
            | CommandError::InvalidParameter { .. }
            | CommandError::Empty => "protocolError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let unsupported = CommandError::Unsupported {
            category: ServiceCategory::Switch,
            command: "action.devices.commands.LockUnlock".into(),
        };
        assert_eq!(unsupported.error_code(), "functionNotSupported");
        assert_eq!(
            unsupported.to_string(),
            "Switch does not support action.devices.commands.LockUnlock"
        );
        assert_eq!(CommandError::Empty.error_code(), "protocolError");
    }
}
