//! Interactive full-screen panel
//!
//! One button per door command. A button is held while its key is
//! held, which keeps the matching broadcast on the air, and released
//! when the key is. Terminals that do not report key releases fall
//! back to a press-again-to-stop toggle.

pub mod state;
pub mod view;

use std::{io::stdout, sync::Arc, time::Duration};

use crossterm::{
    cursor,
    event::{
        Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use futures::StreamExt;
use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, warn};

use crate::{
    backend::RadioBackend,
    core::{command::DoorCommand, service::DoorRemote},
    panel::state::PanelState,
};

/// How long a notice stays on screen
const NOTICE_TTL: Duration = Duration::from_secs(3);

/// How key presses map to button holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldMode {
    /// The terminal reports key releases, so a held key is a held button
    Literal,
    /// Releases are invisible, pressing the same key again releases
    Toggle,
}

/// Interactive panel bound to a remote
pub struct Panel<R: RadioBackend> {
    remote: Arc<DoorRemote<R>>,
    state: PanelState,
    hold_mode: HoldMode,
}

impl<R: RadioBackend> Panel<R> {
    pub fn new(remote: Arc<DoorRemote<R>>) -> Self {
        Self {
            remote,
            state: PanelState::new(),
            hold_mode: HoldMode::Toggle,
        }
    }

    /// Run the panel until the user quits
    pub async fn run(mut self) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;

        self.hold_mode = match terminal::supports_keyboard_enhancement() {
            Ok(true) => HoldMode::Literal,
            Ok(false) => HoldMode::Toggle,
            Err(e) => {
                debug!("Keyboard enhancement probe failed: {}", e);
                HoldMode::Toggle
            }
        };

        let mut out = stdout();
        execute!(out, terminal::EnterAlternateScreen, cursor::Hide)?;
        if self.hold_mode == HoldMode::Literal {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }

        let result = self.event_loop(&mut out).await;

        // Stop whatever is still on the air before giving the
        // terminal back.
        self.remote.release().await;
        if self.hold_mode == HoldMode::Literal {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    async fn event_loop(&mut self, out: &mut std::io::Stdout) -> std::io::Result<()> {
        // First gate pass, prompting for whatever is missing.
        if let Err(e) = self.remote.setup().await {
            debug!("Initial gate pass failed: {}", e);
        }

        let mut events = EventStream::new();
        let mut status_rx = self.remote.subscribe_status();
        let mut notice_rx = self.remote.subscribe_notices();
        let mut notice_deadline: Option<Instant> = None;

        self.state.set_status(self.remote.status().await);
        view::draw(out, &self.state, self.hold_mode)?;

        loop {
            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if self.handle_key(key).await {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("Terminal event error: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = *status_rx.borrow_and_update();
                    if self.state.set_status(status).is_some() {
                        self.remote.release().await;
                    }
                }
                notice = notice_rx.recv() => {
                    match notice {
                        Ok(notice) => {
                            self.state.set_notice(notice);
                            notice_deadline = Some(Instant::now() + NOTICE_TTL);
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = async move {
                    match notice_deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    notice_deadline = None;
                    self.state.clear_notice();
                }
            }

            view::draw(out, &self.state, self.hold_mode)?;
        }

        Ok(())
    }

    /// Apply one key event, returning true when the user quits
    async fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Press {
            match (key.code, key.modifiers) {
                (KeyCode::Char('c'), KeyModifiers::CONTROL) => return true,
                (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => return true,
                (KeyCode::Char('r'), _) => {
                    if let Err(e) = self.remote.retry().await {
                        debug!("Retry failed: {}", e);
                    }
                }
                _ => {
                    if let Some(command) = key_command(key.code) {
                        self.press_or_toggle(command).await;
                    }
                }
            }
        } else if key.kind == KeyEventKind::Release {
            if let Some(command) = key_command(key.code) {
                self.release_if_held(command).await;
            }
        }

        false
    }

    async fn press_or_toggle(&mut self, command: DoorCommand) {
        // In toggle mode, pressing the held button again releases it.
        if self.hold_mode == HoldMode::Toggle && self.state.pressed() == Some(command) {
            self.state.release();
            self.remote.release().await;
            return;
        }

        if !self.state.status().is_ready() {
            // The gate is closed. Treat the press as asking again,
            // which may prompt.
            if let Err(e) = self.remote.retry().await {
                debug!("Retry failed: {}", e);
            }
            return;
        }

        if !self.state.press(command) {
            return;
        }
        if let Err(e) = self.remote.press(command).await {
            debug!("Press refused: {}", e);
            self.state.release();
        }
    }

    async fn release_if_held(&mut self, command: DoorCommand) {
        if self.state.pressed() == Some(command) {
            self.state.release();
            self.remote.release().await;
        }
    }
}

fn key_command(code: KeyCode) -> Option<DoorCommand> {
    match code {
        KeyCode::Char('o') => Some(DoorCommand::Open),
        KeyCode::Char('c') => Some(DoorCommand::Close),
        KeyCode::Char('s') => Some(DoorCommand::Stop),
        KeyCode::Char(' ') => Some(DoorCommand::OpenAndClose),
        _ => None,
    }
}
