//! Fixed command catalog of the door receiver

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bluetooth company identifier the receiver filters manufacturer data on.
pub const COMPANY_ID: u16 = 0xFFF0;

/// Length of every command payload.
pub const PAYLOAD_LEN: usize = 16;

// The receiver matches whole payloads. The first 13 bytes are a family
// prefix shared by all commands, the last 3 select the action.
const OPEN: [u8; PAYLOAD_LEN] = [
    0x6d, 0xb6, 0x43, 0x4f, 0x9e, 0x0f, 0x87, 0x91, 0x23, 0x6f, 0xcb, 0xcf, 0x65, 0xda, 0x51, 0x3b,
];
const CLOSE: [u8; PAYLOAD_LEN] = [
    0x6d, 0xb6, 0x43, 0x4f, 0x9e, 0x0f, 0x87, 0x91, 0x23, 0x6f, 0xcb, 0xcf, 0x65, 0x7a, 0x5b, 0x9e,
];
const STOP: [u8; PAYLOAD_LEN] = [
    0x6d, 0xb6, 0x43, 0x4f, 0x9e, 0x0f, 0x87, 0x91, 0x23, 0x6f, 0xcb, 0xcf, 0x65, 0xba, 0x57, 0x58,
];
const OPEN_AND_CLOSE: [u8; PAYLOAD_LEN] = [
    0x6d, 0xb6, 0x43, 0x4f, 0x9e, 0x0f, 0x87, 0x91, 0x23, 0x6f, 0xcb, 0xcf, 0x65, 0x87, 0x5e, 0xa4,
];

/// A command the door receiver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorCommand {
    Open,
    Close,
    Stop,
    OpenAndClose,
}

impl DoorCommand {
    /// Every command, in catalog order.
    pub const ALL: [DoorCommand; 4] = [
        DoorCommand::Open,
        DoorCommand::Close,
        DoorCommand::Stop,
        DoorCommand::OpenAndClose,
    ];

    /// The fixed manufacturer data payload broadcast for this command.
    pub const fn payload(self) -> &'static [u8; PAYLOAD_LEN] {
        match self {
            DoorCommand::Open => &OPEN,
            DoorCommand::Close => &CLOSE,
            DoorCommand::Stop => &STOP,
            DoorCommand::OpenAndClose => &OPEN_AND_CLOSE,
        }
    }

    /// The complete frame handed to the radio.
    pub fn frame(self) -> CommandFrame {
        CommandFrame {
            company_id: COMPANY_ID,
            payload: *self.payload(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DoorCommand::Open => "open",
            DoorCommand::Close => "close",
            DoorCommand::Stop => "stop",
            DoorCommand::OpenAndClose => "open-and-close",
        }
    }
}

impl fmt::Display for DoorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Manufacturer data frame broadcast while a command is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub company_id: u16,
    pub payload: [u8; PAYLOAD_LEN],
}
