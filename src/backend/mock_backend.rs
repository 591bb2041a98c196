//! Mock radio backend for testing

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, Mutex};

use crate::backend::RadioBackend;
use crate::core::command::CommandFrame;
use crate::core::error::{RadioError, RadioResult};

/// Internal state for the mock radio
#[derive(Debug, Clone)]
struct MockState {
    adapter_present: bool,
    advertise_allowed: bool,
    grant_on_request: bool,
    powered: bool,
    power_on_accepted: bool,
    fail_start: bool,
    active: Option<CommandFrame>,
    started: Vec<CommandFrame>,
    access_requests: usize,
    power_requests: usize,
    power_subscribers: Vec<mpsc::UnboundedSender<bool>>,
}

/// Mock radio backend for testing
///
/// Allows configuring gate outcomes for tests without requiring actual
/// hardware. Starts with an adapter present, access granted and power on.
#[derive(Debug, Clone)]
pub struct MockRadio {
    inner: Arc<Mutex<MockState>>,
}

impl MockRadio {
    /// Create a mock with everything granted and powered on
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                adapter_present: true,
                advertise_allowed: true,
                grant_on_request: true,
                powered: true,
                power_on_accepted: true,
                fail_start: false,
                active: None,
                started: vec![],
                access_requests: 0,
                power_requests: 0,
                power_subscribers: vec![],
            })),
        }
    }

    pub async fn set_adapter_present(&self, present: bool) {
        self.inner.lock().await.adapter_present = present;
    }

    pub async fn set_advertise_allowed(&self, allowed: bool) {
        self.inner.lock().await.advertise_allowed = allowed;
    }

    /// Configure whether an access request ends in a grant
    pub async fn set_grant_on_request(&self, grant: bool) {
        self.inner.lock().await.grant_on_request = grant;
    }

    /// Flip adapter power and notify power event subscribers
    ///
    /// Powering off also kills the active advertisement, as the real
    /// adapter would.
    pub async fn set_powered(&self, powered: bool) {
        let mut state = self.inner.lock().await;
        state.powered = powered;
        if !powered {
            state.active = None;
        }
        state.power_subscribers.retain(|tx| tx.send(powered).is_ok());
    }

    /// Configure whether a power-on request is honored
    pub async fn set_power_on_accepted(&self, accepted: bool) {
        self.inner.lock().await.power_on_accepted = accepted;
    }

    /// Configure mock to fail `start_advertising`
    pub async fn set_start_failure(&self, should_fail: bool) {
        self.inner.lock().await.fail_start = should_fail;
    }

    /// Frames passed to `start_advertising`, oldest first
    pub async fn started(&self) -> Vec<CommandFrame> {
        self.inner.lock().await.started.clone()
    }

    /// The frame currently on air, if any
    pub async fn active(&self) -> Option<CommandFrame> {
        self.inner.lock().await.active
    }

    pub async fn access_requests(&self) -> usize {
        self.inner.lock().await.access_requests
    }

    pub async fn power_requests(&self) -> usize {
        self.inner.lock().await.power_requests
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl RadioBackend for MockRadio {
    async fn adapter_present(&self) -> bool {
        self.inner.lock().await.adapter_present
    }

    async fn advertise_allowed(&self) -> RadioResult<bool> {
        let state = self.inner.lock().await;
        if !state.adapter_present {
            return Err(RadioError::NoAdapter);
        }
        Ok(state.advertise_allowed)
    }

    async fn request_advertise_access(&self) -> RadioResult<bool> {
        let mut state = self.inner.lock().await;
        if !state.adapter_present {
            return Err(RadioError::NoAdapter);
        }
        state.access_requests += 1;
        if state.grant_on_request {
            state.advertise_allowed = true;
        }
        Ok(state.advertise_allowed)
    }

    async fn adapter_powered(&self) -> RadioResult<bool> {
        let state = self.inner.lock().await;
        if !state.adapter_present {
            return Err(RadioError::NoAdapter);
        }
        Ok(state.powered)
    }

    async fn request_power_on(&self) -> RadioResult<bool> {
        let mut state = self.inner.lock().await;
        if !state.adapter_present {
            return Err(RadioError::NoAdapter);
        }
        state.power_requests += 1;
        if state.power_on_accepted && !state.powered {
            state.powered = true;
            state.power_subscribers.retain(|tx| tx.send(true).is_ok());
        }
        Ok(state.powered)
    }

    async fn power_events(&self) -> RadioResult<BoxStream<'static, bool>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().await.power_subscribers.push(tx);

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|powered| (powered, rx))
        });
        Ok(stream.boxed())
    }

    async fn start_advertising(&self, frame: CommandFrame) -> RadioResult<()> {
        let mut state = self.inner.lock().await;
        if !state.adapter_present {
            return Err(RadioError::NoAdapter);
        }
        if !state.powered {
            return Err(RadioError::PoweredOff);
        }
        if state.fail_start {
            return Err(RadioError::AdvertiseFailed("Mock start failure".into()));
        }
        state.started.push(frame);
        state.active = Some(frame);
        Ok(())
    }

    async fn stop_advertising(&self) -> RadioResult<()> {
        self.inner.lock().await.active = None;
        Ok(())
    }

    async fn is_advertising(&self) -> bool {
        self.inner.lock().await.active.is_some()
    }
}
