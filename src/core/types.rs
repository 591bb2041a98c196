//! Domain types for the door remote

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of the advertising gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvertiserState {
    /// Nothing probed yet
    Unchecked,
    /// No Bluetooth adapter on this host
    NoAdapter,
    /// Advertising access is missing
    NoPermission,
    /// An access request is in flight
    PermissionRequested,
    /// Adapter present but powered off
    AdapterDisabled,
    /// A power-on request is in flight
    EnableRequested,
    /// Ready to broadcast
    Ready,
}

/// Gate snapshot published to all surfaces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvertiserStatus {
    /// Current gate state
    pub state: AdvertiserState,
    /// Advertising access has been confirmed
    pub permission_granted: bool,
    /// Adapter reported powered on
    pub adapter_enabled: bool,
}

impl AdvertiserStatus {
    pub fn is_ready(&self) -> bool {
        self.state == AdvertiserState::Ready
    }

    /// The advisory a surface should show when commands are refused.
    pub fn blocking_notice(&self) -> Option<Notice> {
        match self.state {
            AdvertiserState::Unchecked | AdvertiserState::Ready => None,
            AdvertiserState::NoAdapter => Some(Notice::NoAdapter),
            AdvertiserState::NoPermission | AdvertiserState::PermissionRequested => {
                Some(Notice::PermissionDenied)
            }
            AdvertiserState::AdapterDisabled | AdvertiserState::EnableRequested => {
                Some(Notice::AdapterDisabled)
            }
        }
    }
}

impl Default for AdvertiserStatus {
    fn default() -> Self {
        Self {
            state: AdvertiserState::Unchecked,
            permission_granted: false,
            adapter_enabled: false,
        }
    }
}

/// User-facing advisory raised by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoAdapter,
    PermissionDenied,
    AdapterDisabled,
    AdvertiseFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Notice::NoAdapter => "Bluetooth is not available",
            Notice::PermissionDenied => "Bluetooth advertising permission is missing",
            Notice::AdapterDisabled => "Bluetooth is turned off",
            Notice::AdvertiseFailed => "Broadcast could not be started",
        };
        f.write_str(text)
    }
}

/// Session identifier for transport connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_status_is_unchecked() {
        let status = AdvertiserStatus::default();

        assert_eq!(status.state, AdvertiserState::Unchecked);
        assert!(!status.permission_granted);
        assert!(!status.adapter_enabled);
        assert!(!status.is_ready());
    }

    #[test]
    fn test_blocking_notice_names_the_failed_gate() {
        let mut status = AdvertiserStatus::default();

        assert_eq!(status.blocking_notice(), None);

        status.state = AdvertiserState::NoAdapter;
        assert_eq!(status.blocking_notice(), Some(Notice::NoAdapter));

        status.state = AdvertiserState::NoPermission;
        assert_eq!(status.blocking_notice(), Some(Notice::PermissionDenied));

        status.state = AdvertiserState::PermissionRequested;
        assert_eq!(status.blocking_notice(), Some(Notice::PermissionDenied));

        status.state = AdvertiserState::AdapterDisabled;
        assert_eq!(status.blocking_notice(), Some(Notice::AdapterDisabled));

        status.state = AdvertiserState::EnableRequested;
        assert_eq!(status.blocking_notice(), Some(Notice::AdapterDisabled));

        status.state = AdvertiserState::Ready;
        assert_eq!(status.blocking_notice(), None);
        assert!(status.is_ready());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&AdvertiserState::AdapterDisabled).unwrap();
        assert_eq!(json, "\"adapter_disabled\"");

        let json = serde_json::to_string(&Notice::PermissionDenied).unwrap();
        assert_eq!(json, "\"permission_denied\"");
    }

    #[test]
    fn test_notice_text_is_user_readable() {
        assert_eq!(Notice::AdapterDisabled.to_string(), "Bluetooth is turned off");
    }
}
