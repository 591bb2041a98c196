//! Request message types

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::command::DoorCommand;

/// Broadcast hold applied when a trigger request omits one.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(500);

/// Request messages from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", content = "params")]
#[serde(rename_all = "snake_case")]
pub enum Request {
    /// Broadcast a command for a short hold
    Trigger(TriggerParams),

    /// Get the gate status
    GetStatus,
}

/// Parameters for trigger request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerParams {
    /// Command to broadcast
    pub command: DoorCommand,

    /// Broadcast hold in milliseconds (500 when omitted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_ms: Option<u64>,
}

impl TriggerParams {
    pub fn new(command: DoorCommand) -> Self {
        Self {
            command,
            hold_ms: None,
        }
    }

    /// The effective broadcast hold
    pub fn hold(&self) -> Duration {
        self.hold_ms.map_or(DEFAULT_HOLD, Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_trigger_serialization() {
        let request = Request::Trigger(TriggerParams::new(DoorCommand::Open));
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"method":"trigger","params":{"command":"open"}}"#);

        let deserialized: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, request);
    }

    #[test]
    fn test_request_trigger_with_hold() {
        let request = Request::Trigger(TriggerParams {
            command: DoorCommand::OpenAndClose,
            hold_ms: Some(750),
        });

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""command":"open_and_close""#));
        assert!(json.contains(r#""hold_ms":750"#));

        let deserialized: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, request);
    }

    #[test]
    fn test_request_get_status() {
        let request = Request::GetStatus;
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"method":"get_status"}"#);
    }

    #[test]
    fn test_trigger_params_default_hold() {
        let params = TriggerParams::new(DoorCommand::Stop);
        assert_eq!(params.hold(), Duration::from_millis(500));

        let params = TriggerParams {
            command: DoorCommand::Stop,
            hold_ms: Some(200),
        };
        assert_eq!(params.hold(), Duration::from_millis(200));
    }

    #[test]
    fn test_trigger_parses_without_hold() {
        let json = r#"{"method":"trigger","params":{"command":"close"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();

        match request {
            Request::Trigger(params) => {
                assert_eq!(params.command, DoorCommand::Close);
                assert_eq!(params.hold_ms, None);
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }
}
