//! Command advertising service with gate state machine

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    backend::RadioBackend,
    core::{
        command::DoorCommand,
        error::{ServiceError, ServiceResult},
        types::{AdvertiserState, AdvertiserStatus, Notice},
    },
};

/// Capacity of the advisory broadcast channel
const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Gate state machine
///
/// Tracks adapter presence, advertising access and adapter power, plus the
/// latches that keep a refused request from being prompted again.
#[derive(Debug)]
struct GateStateMachine {
    state: AdvertiserState,
    permission_granted: bool,
    adapter_enabled: bool,
    access_denied: bool,
    enable_refused: bool,
}

impl GateStateMachine {
    fn new() -> Self {
        Self {
            state: AdvertiserState::Unchecked,
            permission_granted: false,
            adapter_enabled: false,
            access_denied: false,
            enable_refused: false,
        }
    }

    /// No adapter on the host; every grant is void
    fn no_adapter(&mut self) {
        self.state = AdvertiserState::NoAdapter;
        self.permission_granted = false;
        self.adapter_enabled = false;
    }

    /// An access request has been issued and is in flight
    fn begin_access_request(&mut self) {
        self.state = AdvertiserState::PermissionRequested;
    }

    fn access_granted(&mut self) {
        self.permission_granted = true;
    }

    /// Access found missing by a probe, without a denial latch
    fn access_missing(&mut self) {
        self.permission_granted = false;
        self.state = AdvertiserState::NoPermission;
    }

    /// An access request was denied; further prompts are held back
    fn deny_access(&mut self) {
        self.access_denied = true;
        self.access_missing();
    }

    /// A power-on request has been issued and is in flight
    fn begin_enable_request(&mut self) {
        self.state = AdvertiserState::EnableRequested;
    }

    fn adapter_on(&mut self) {
        self.adapter_enabled = true;
    }

    fn adapter_off(&mut self) {
        self.adapter_enabled = false;
        if self.permission_granted {
            self.state = AdvertiserState::AdapterDisabled;
        }
    }

    /// A power-on request was refused; further prompts are held back
    fn refuse_enable(&mut self) {
        self.enable_refused = true;
        self.adapter_off();
    }

    fn ready(&mut self) {
        self.state = AdvertiserState::Ready;
    }

    /// Forget earlier denials so the next setup may prompt again
    fn clear_denials(&mut self) {
        self.access_denied = false;
        self.enable_refused = false;
    }

    fn access_denied(&self) -> bool {
        self.access_denied
    }

    fn enable_refused(&self) -> bool {
        self.enable_refused
    }

    fn status(&self) -> AdvertiserStatus {
        AdvertiserStatus {
            state: self.state,
            permission_granted: self.permission_granted,
            adapter_enabled: self.adapter_enabled,
        }
    }
}

/// Command advertising service
///
/// Walks the gate (adapter present, access granted, adapter powered) before
/// any broadcast, publishes gate snapshots on a watch channel and advisory
/// notices on a broadcast channel.
pub struct AdvertiserService<R: RadioBackend> {
    radio: Arc<R>,
    machine: RwLock<GateStateMachine>,
    status_tx: watch::Sender<AdvertiserStatus>,
    notice_tx: broadcast::Sender<Notice>,
}

impl<R: RadioBackend> AdvertiserService<R> {
    /// Create a new advertising service with the given radio backend
    pub fn new(radio: Arc<R>) -> Self {
        let (status_tx, _) = watch::channel(AdvertiserStatus::default());
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        Self {
            radio,
            machine: RwLock::new(GateStateMachine::new()),
            status_tx,
            notice_tx,
        }
    }

    /// Walk the gate, prompting for whatever is missing
    ///
    /// A denial latches: a later `setup` will not prompt again until
    /// [`retry`](Self::retry) clears the latch.
    pub async fn setup(&self) -> ServiceResult<()> {
        self.evaluate(true).await
    }

    /// Refresh the gate snapshot without prompting for anything
    pub async fn probe(&self) -> AdvertiserStatus {
        if let Err(err) = self.evaluate(false).await {
            debug!("Gate probe: {}", err);
        }
        self.status().await
    }

    /// Forget earlier denials, then walk the gate again with prompts
    pub async fn retry(&self) -> ServiceResult<()> {
        self.machine.write().await.clear_denials();
        self.setup().await
    }

    async fn evaluate(&self, prompt: bool) -> ServiceResult<()> {
        if !self.radio.adapter_present().await {
            self.machine.write().await.no_adapter();
            self.publish().await;
            self.notify(Notice::NoAdapter);
            return Err(ServiceError::NoAdapter);
        }

        let mut allowed = self.radio.advertise_allowed().await?;
        if !allowed && prompt && !self.machine.read().await.access_denied() {
            self.machine.write().await.begin_access_request();
            self.publish().await;

            allowed = self.radio.request_advertise_access().await?;
            if !allowed {
                self.machine.write().await.deny_access();
                self.publish().await;
                self.notify(Notice::PermissionDenied);
                return Err(ServiceError::PermissionDenied);
            }
        }
        if !allowed {
            self.machine.write().await.access_missing();
            self.publish().await;
            self.notify(Notice::PermissionDenied);
            return Err(ServiceError::PermissionDenied);
        }
        self.machine.write().await.access_granted();

        let mut powered = self.radio.adapter_powered().await?;
        if !powered && prompt && !self.machine.read().await.enable_refused() {
            self.machine.write().await.begin_enable_request();
            self.publish().await;

            powered = self.radio.request_power_on().await?;
            if !powered {
                self.machine.write().await.refuse_enable();
                self.publish().await;
                self.notify(Notice::AdapterDisabled);
                return Err(ServiceError::AdapterDisabled);
            }
        }
        if !powered {
            self.machine.write().await.adapter_off();
            self.publish().await;
            self.notify(Notice::AdapterDisabled);
            return Err(ServiceError::AdapterDisabled);
        }

        {
            let mut machine = self.machine.write().await;
            machine.adapter_on();
            machine.ready();
        }
        self.publish().await;
        Ok(())
    }

    /// Start broadcasting a command
    ///
    /// The gate is re-checked live; a command never reaches the radio when
    /// the adapter is gone, powered off or access is missing. Starting a new
    /// command replaces the active broadcast.
    pub async fn advertise(&self, command: DoorCommand) -> ServiceResult<()> {
        if !self.radio.adapter_present().await {
            self.machine.write().await.no_adapter();
            self.publish().await;
            self.notify(Notice::NoAdapter);
            return Err(ServiceError::NoAdapter);
        }
        if !self.radio.adapter_powered().await? {
            self.machine.write().await.adapter_off();
            self.publish().await;
            self.notify(Notice::AdapterDisabled);
            return Err(ServiceError::AdapterDisabled);
        }
        if !self.radio.advertise_allowed().await? {
            self.machine.write().await.access_missing();
            self.publish().await;
            self.notify(Notice::PermissionDenied);
            return Err(ServiceError::PermissionDenied);
        }

        debug!("Broadcasting command: {}", command);
        if let Err(err) = self.radio.start_advertising(command.frame()).await {
            warn!("Failed to start advertising: {}", err);
            self.notify(Notice::AdvertiseFailed);
            return Err(err.into());
        }
        Ok(())
    }

    /// Broadcast a command for a fixed hold, then stop
    pub async fn advertise_for(&self, command: DoorCommand, hold: Duration) -> ServiceResult<()> {
        self.advertise(command).await?;
        sleep(hold).await;
        self.cancel().await;
        Ok(())
    }

    /// Stop the active broadcast; a no-op when nothing is on air
    pub async fn cancel(&self) {
        if let Err(err) = self.radio.stop_advertising().await {
            debug!("Failed to stop advertising: {}", err);
        }
    }

    /// Current gate snapshot
    pub async fn status(&self) -> AdvertiserStatus {
        self.machine.read().await.status()
    }

    /// Watch channel carrying every distinct gate snapshot
    pub fn subscribe_status(&self) -> watch::Receiver<AdvertiserStatus> {
        self.status_tx.subscribe()
    }

    /// Broadcast channel carrying user-facing advisories
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Follow adapter power changes until the event stream ends
    ///
    /// Power loss kills the active broadcast and downgrades the gate; power
    /// return re-walks the gate (without re-prompting past denials).
    pub async fn run_monitor(&self) -> ServiceResult<()> {
        let mut events = self
            .radio
            .power_events()
            .await
            .map_err(ServiceError::Radio)?;
        info!("Adapter power monitor running");

        while let Some(powered) = events.next().await {
            if powered {
                debug!("Adapter powered on");
                if let Err(err) = self.setup().await {
                    debug!("Gate re-check after power on: {}", err);
                }
            } else {
                debug!("Adapter powered off");
                self.cancel().await;
                self.machine.write().await.adapter_off();
                self.publish().await;
                self.notify(Notice::AdapterDisabled);
            }
        }
        Ok(())
    }

    async fn publish(&self) {
        let status = self.machine.read().await.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn notify(&self, notice: Notice) {
        debug!("Notice: {}", notice);
        // Send fails when no surface is subscribed; one-shot runs have none.
        let _ = self.notice_tx.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockRadio;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_gate_machine_happy_path() {
        let mut machine = GateStateMachine::new();
        assert_eq!(machine.status().state, AdvertiserState::Unchecked);

        machine.begin_access_request();
        assert_eq!(machine.status().state, AdvertiserState::PermissionRequested);

        machine.access_granted();
        machine.begin_enable_request();
        assert_eq!(machine.status().state, AdvertiserState::EnableRequested);

        machine.adapter_on();
        machine.ready();

        let status = machine.status();
        assert!(status.is_ready());
        assert!(status.permission_granted);
        assert!(status.adapter_enabled);
    }

    #[tokio::test]
    async fn test_gate_machine_denial_latches() {
        let mut machine = GateStateMachine::new();

        machine.begin_access_request();
        machine.deny_access();
        assert_eq!(machine.status().state, AdvertiserState::NoPermission);
        assert!(machine.access_denied());

        machine.clear_denials();
        assert!(!machine.access_denied());
        // Clearing the latch does not move the state; a new walk does.
        assert_eq!(machine.status().state, AdvertiserState::NoPermission);
    }

    #[tokio::test]
    async fn test_gate_machine_power_loss_keeps_grant() {
        let mut machine = GateStateMachine::new();
        machine.access_granted();
        machine.adapter_on();
        machine.ready();

        machine.adapter_off();

        let status = machine.status();
        assert_eq!(status.state, AdvertiserState::AdapterDisabled);
        assert!(status.permission_granted);
        assert!(!status.adapter_enabled);
    }

    #[tokio::test]
    async fn test_setup_all_granted() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio);

        tokio_test::assert_ok!(service.setup().await);

        let status = service.status().await;
        assert!(status.is_ready());
        assert!(status.permission_granted);
        assert!(status.adapter_enabled);
    }

    #[tokio::test]
    async fn test_setup_without_adapter() {
        let radio = Arc::new(MockRadio::new());
        radio.set_adapter_present(false).await;
        let service = AdvertiserService::new(radio);
        let mut notices = service.subscribe_notices();

        let result = service.setup().await;

        assert!(matches!(result, Err(ServiceError::NoAdapter)));
        assert_eq!(service.status().await.state, AdvertiserState::NoAdapter);
        assert_eq!(notices.recv().await.unwrap(), Notice::NoAdapter);
    }

    #[tokio::test]
    async fn test_setup_requests_missing_access() {
        let radio = Arc::new(MockRadio::new());
        radio.set_advertise_allowed(false).await;
        let service = AdvertiserService::new(radio.clone());

        tokio_test::assert_ok!(service.setup().await);

        assert_eq!(radio.access_requests().await, 1);
        assert!(service.status().await.is_ready());
    }

    #[tokio::test]
    async fn test_denied_access_is_not_prompted_again() {
        let radio = Arc::new(MockRadio::new());
        radio.set_advertise_allowed(false).await;
        radio.set_grant_on_request(false).await;
        let service = AdvertiserService::new(radio.clone());

        let result = service.setup().await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));
        assert_eq!(radio.access_requests().await, 1);

        // The latch holds the prompt back on the next walk.
        let result = service.setup().await;
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));
        assert_eq!(radio.access_requests().await, 1);

        // An explicit retry prompts again.
        radio.set_grant_on_request(true).await;
        tokio_test::assert_ok!(service.retry().await);
        assert_eq!(radio.access_requests().await, 2);
        assert!(service.status().await.is_ready());
    }

    #[tokio::test]
    async fn test_setup_powers_the_adapter_on() {
        let radio = Arc::new(MockRadio::new());
        radio.set_powered(false).await;
        let service = AdvertiserService::new(radio.clone());

        tokio_test::assert_ok!(service.setup().await);

        assert_eq!(radio.power_requests().await, 1);
        assert!(service.status().await.is_ready());
    }

    #[tokio::test]
    async fn test_refused_power_on_is_not_prompted_again() {
        let radio = Arc::new(MockRadio::new());
        radio.set_powered(false).await;
        radio.set_power_on_accepted(false).await;
        let service = AdvertiserService::new(radio.clone());

        let result = service.setup().await;
        assert!(matches!(result, Err(ServiceError::AdapterDisabled)));
        assert_eq!(radio.power_requests().await, 1);
        assert_eq!(
            service.status().await.state,
            AdvertiserState::AdapterDisabled
        );

        let result = service.setup().await;
        assert!(matches!(result, Err(ServiceError::AdapterDisabled)));
        assert_eq!(radio.power_requests().await, 1);

        radio.set_power_on_accepted(true).await;
        tokio_test::assert_ok!(service.retry().await);
        assert_eq!(radio.power_requests().await, 2);
        assert!(service.status().await.is_ready());
    }

    #[tokio::test]
    async fn test_advertise_starts_and_cancel_stops() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio.clone());
        service.setup().await.unwrap();

        service.advertise(DoorCommand::Open).await.unwrap();
        assert_eq!(radio.active().await, Some(DoorCommand::Open.frame()));

        // A second command replaces the first.
        service.advertise(DoorCommand::Stop).await.unwrap();
        assert_eq!(radio.active().await, Some(DoorCommand::Stop.frame()));
        assert_eq!(radio.started().await.len(), 2);

        service.cancel().await;
        assert_eq!(radio.active().await, None);

        // Cancelling again with nothing on air stays quiet.
        service.cancel().await;
        assert_eq!(radio.active().await, None);
    }

    #[tokio::test]
    async fn test_advertise_refused_without_permission() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio.clone());
        service.setup().await.unwrap();

        radio.set_advertise_allowed(false).await;
        let mut notices = service.subscribe_notices();

        let result = service.advertise(DoorCommand::Open).await;

        // The command must never reach the radio.
        assert!(matches!(result, Err(ServiceError::PermissionDenied)));
        assert!(radio.started().await.is_empty());
        assert_eq!(notices.recv().await.unwrap(), Notice::PermissionDenied);
    }

    #[tokio::test]
    async fn test_advertise_refused_when_powered_off() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio.clone());
        service.setup().await.unwrap();

        radio.set_powered(false).await;
        let mut notices = service.subscribe_notices();

        let result = service.advertise(DoorCommand::Close).await;

        assert!(matches!(result, Err(ServiceError::AdapterDisabled)));
        assert!(radio.started().await.is_empty());
        assert_eq!(
            service.status().await.state,
            AdvertiserState::AdapterDisabled
        );
        assert_eq!(notices.recv().await.unwrap(), Notice::AdapterDisabled);
    }

    #[tokio::test]
    async fn test_advertise_failure_raises_notice() {
        let radio = Arc::new(MockRadio::new());
        radio.set_start_failure(true).await;
        let service = AdvertiserService::new(radio);
        service.setup().await.unwrap();
        let mut notices = service.subscribe_notices();

        let result = service.advertise(DoorCommand::Open).await;

        assert!(matches!(result, Err(ServiceError::Radio(_))));
        assert_eq!(notices.recv().await.unwrap(), Notice::AdvertiseFailed);
    }

    #[tokio::test]
    async fn test_advertise_for_holds_then_stops() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio.clone());
        service.setup().await.unwrap();

        service
            .advertise_for(DoorCommand::OpenAndClose, Duration::from_millis(20))
            .await
            .unwrap();

        assert_eq!(radio.started().await.len(), 1);
        assert_eq!(radio.active().await, None);
    }

    #[tokio::test]
    async fn test_status_watch_publishes_transitions() {
        let radio = Arc::new(MockRadio::new());
        let service = AdvertiserService::new(radio);
        let mut status_rx = service.subscribe_status();

        service.setup().await.unwrap();

        status_rx.changed().await.unwrap();
        assert!(status_rx.borrow_and_update().is_ready());
    }

    #[tokio::test]
    async fn test_power_monitor_follows_adapter() {
        let radio = Arc::new(MockRadio::new());
        let service = Arc::new(AdvertiserService::new(radio.clone()));
        service.setup().await.unwrap();

        let monitor = {
            let service = service.clone();
            tokio::spawn(async move { service.run_monitor().await })
        };
        // Let the monitor subscribe before flipping power.
        tokio::time::sleep(Duration::from_millis(10)).await;

        radio.set_powered(false).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(
            service.status().await.state,
            AdvertiserState::AdapterDisabled
        );

        radio.set_powered(true).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(service.status().await.is_ready());

        monitor.abort();
    }
}
