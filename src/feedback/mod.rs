//! Press feedback engine
//!
//! Plays phone-vibrator style patterns (alternating wait and pulse
//! durations, optional repeat index) against a [`FeedbackSink`].

pub mod sink;

pub use sink::{default_sink, FeedbackSink, SilentSink, TerminalBell};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Pattern played while a panel button is held: an immediate 50 ms pulse,
/// then 250 ms of quiet, looped from the start.
pub const PRESS_PATTERN: [Duration; 3] = [
    Duration::ZERO,
    Duration::from_millis(50),
    Duration::from_millis(250),
];

/// Pulse schedule over a pattern
///
/// Even pattern indices are waits, odd ones are pulses. With a repeat
/// index the schedule restarts there after the last entry; an out-of-range
/// repeat plays the pattern once.
#[derive(Debug, Clone)]
struct PulseSchedule {
    pattern: Vec<Duration>,
    repeat: Option<usize>,
    index: usize,
}

impl PulseSchedule {
    fn new(pattern: &[Duration], repeat: Option<usize>) -> Self {
        Self {
            pattern: pattern.to_vec(),
            repeat,
            index: 0,
        }
    }
}

impl Iterator for PulseSchedule {
    type Item = (bool, Duration);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.pattern.len() {
            match self.repeat {
                Some(restart) if restart < self.pattern.len() => self.index = restart,
                _ => return None,
            }
        }
        let item = (self.index % 2 == 1, self.pattern[self.index]);
        self.index += 1;
        Some(item)
    }
}

/// Driver for press feedback
///
/// One effect is active at a time; starting a new one cancels the last.
#[derive(Clone)]
pub struct Feedback {
    sink: Arc<dyn FeedbackSink>,
    enabled: bool,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Feedback {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self {
            sink,
            enabled: true,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Feedback that never pulses
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(SilentSink),
            enabled: false,
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Play a pattern, cancelling whatever is playing
    pub async fn pulse(&self, pattern: &[Duration], repeat: Option<usize>) {
        self.cancel().await;
        if !self.enabled || pattern.is_empty() {
            return;
        }

        let sink = self.sink.clone();
        let schedule = PulseSchedule::new(pattern, repeat);
        let handle = tokio::spawn(async move {
            for (active, duration) in schedule {
                if active {
                    sink.pulse();
                }
                if !duration.is_zero() {
                    sleep(duration).await;
                }
            }
        });
        self.task.lock().await.replace(handle);
    }

    /// Emit one immediate pulse, cancelling whatever is playing
    pub async fn pulse_once(&self) {
        self.cancel().await;
        if self.enabled {
            self.sink.pulse();
        }
    }

    /// Stop the active effect, if any
    pub async fn cancel(&self) {
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }

    /// Whether an effect is currently playing
    pub async fn is_active(&self) -> bool {
        match self.task.lock().await.as_ref() {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }
}
