//! Panel interaction state

use crate::core::{
    command::DoorCommand,
    types::{AdvertiserStatus, Notice},
};

/// Interaction state of the panel
///
/// Tracks the gate snapshot, the button currently held and the notice
/// on display. At most one button is held at a time, and only while
/// the gate is ready.
#[derive(Debug, Default)]
pub struct PanelState {
    status: AdvertiserStatus,
    pressed: Option<DoorCommand>,
    notice: Option<Notice>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last gate snapshot
    pub fn status(&self) -> AdvertiserStatus {
        self.status
    }

    /// The button currently held, if any
    pub fn pressed(&self) -> Option<DoorCommand> {
        self.pressed
    }

    /// The notice currently on display
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    /// Whether a button accepts input right now
    pub fn is_enabled(&self, command: DoorCommand) -> bool {
        match self.pressed {
            Some(held) => held == command,
            None => self.status.is_ready(),
        }
    }

    /// Record a press
    ///
    /// Refused when the gate is closed or another button is already
    /// down.
    pub fn press(&mut self, command: DoorCommand) -> bool {
        if self.pressed.is_some() || !self.status.is_ready() {
            return false;
        }
        self.pressed = Some(command);
        true
    }

    /// Release the held button
    pub fn release(&mut self) -> Option<DoorCommand> {
        self.pressed.take()
    }

    /// Apply a fresh gate snapshot
    ///
    /// Returns the button that was held if the gate closed underneath
    /// it, so the caller can stop the matching broadcast.
    pub fn set_status(&mut self, status: AdvertiserStatus) -> Option<DoorCommand> {
        self.status = status;
        if status.is_ready() {
            None
        } else {
            self.pressed.take()
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AdvertiserState;

    fn ready() -> AdvertiserStatus {
        AdvertiserStatus {
            state: AdvertiserState::Ready,
            permission_granted: true,
            adapter_enabled: true,
        }
    }

    fn disabled() -> AdvertiserStatus {
        AdvertiserStatus {
            state: AdvertiserState::AdapterDisabled,
            permission_granted: true,
            adapter_enabled: false,
        }
    }

    #[test]
    fn test_press_requires_ready_gate() {
        let mut state = PanelState::new();
        assert!(!state.press(DoorCommand::Open));

        state.set_status(ready());
        assert!(state.press(DoorCommand::Open));
        assert_eq!(state.pressed(), Some(DoorCommand::Open));
    }

    #[test]
    fn test_only_one_button_held() {
        let mut state = PanelState::new();
        state.set_status(ready());

        assert!(state.press(DoorCommand::Open));
        assert!(!state.press(DoorCommand::Close));

        // The held button stays responsive, the others do not.
        assert!(state.is_enabled(DoorCommand::Open));
        assert!(!state.is_enabled(DoorCommand::Close));
        assert!(!state.is_enabled(DoorCommand::Stop));
    }

    #[test]
    fn test_release_returns_held_button() {
        let mut state = PanelState::new();
        state.set_status(ready());
        state.press(DoorCommand::Stop);

        assert_eq!(state.release(), Some(DoorCommand::Stop));
        assert_eq!(state.release(), None);
        assert!(state.is_enabled(DoorCommand::Open));
    }

    #[test]
    fn test_gate_closing_releases_held_button() {
        let mut state = PanelState::new();
        state.set_status(ready());
        state.press(DoorCommand::OpenAndClose);

        let released = state.set_status(disabled());
        assert_eq!(released, Some(DoorCommand::OpenAndClose));
        assert_eq!(state.pressed(), None);
        assert!(!state.is_enabled(DoorCommand::OpenAndClose));
    }

    #[test]
    fn test_status_refresh_keeps_held_button() {
        let mut state = PanelState::new();
        state.set_status(ready());
        state.press(DoorCommand::Close);

        assert_eq!(state.set_status(ready()), None);
        assert_eq!(state.pressed(), Some(DoorCommand::Close));
    }

    #[test]
    fn test_notice_set_and_clear() {
        let mut state = PanelState::new();
        assert_eq!(state.notice(), None);

        state.set_notice(Notice::AdapterDisabled);
        assert_eq!(state.notice(), Some(Notice::AdapterDisabled));

        state.clear_notice();
        assert_eq!(state.notice(), None);
    }
}
