//! Feedback sink implementations

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Destination for feedback pulses
pub trait FeedbackSink: Send + Sync + 'static {
    /// Emit one pulse
    fn pulse(&self);
}

/// Rings the terminal bell for every pulse
#[derive(Debug, Default)]
pub struct TerminalBell;

impl FeedbackSink for TerminalBell {
    fn pulse(&self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

/// Swallows every pulse
#[derive(Debug, Default)]
pub struct SilentSink;

impl FeedbackSink for SilentSink {
    fn pulse(&self) {}
}

/// Bell when stdout is a terminal, silent otherwise
pub fn default_sink() -> Arc<dyn FeedbackSink> {
    if io::stdout().is_terminal() {
        Arc::new(TerminalBell)
    } else {
        Arc::new(SilentSink)
    }
}
