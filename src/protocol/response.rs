//! Response message types

use serde::{Deserialize, Serialize};

use crate::core::command::DoorCommand;
use crate::core::types::AdvertiserStatus;

/// Response messages from server to client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    /// Trigger response
    Triggered(TriggeredResponse),

    /// Status response
    Status(StatusResponse),
}

/// Response for trigger request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggeredResponse {
    pub status: String,
    pub command: DoorCommand,
    pub held_ms: u64,
}

/// Response for get_status request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    #[serde(flatten)]
    pub advertiser: AdvertiserStatus,
}

impl TriggeredResponse {
    pub fn ok(command: DoorCommand, held_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            command,
            held_ms,
        }
    }
}

impl StatusResponse {
    pub fn ok(advertiser: AdvertiserStatus) -> Self {
        Self {
            status: "ok".to_string(),
            advertiser,
        }
    }
}
