//! Main door remote service facade

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use crate::{
    backend::RadioBackend,
    core::{
        advertiser::AdvertiserService,
        command::DoorCommand,
        error::ServiceResult,
        types::{AdvertiserStatus, Notice},
    },
    feedback::{Feedback, PRESS_PATTERN},
};

/// Main door remote service facade
///
/// Ties the advertising gate to press feedback. Panel buttons use
/// `press`/`release`, widget-style invocations use `tap`.
pub struct DoorRemote<R: RadioBackend> {
    pub advertiser: Arc<AdvertiserService<R>>,
    feedback: Feedback,
}

impl<R: RadioBackend> DoorRemote<R> {
    /// Create a new door remote
    pub fn new(radio: Arc<R>, feedback: Feedback) -> Self {
        Self {
            advertiser: Arc::new(AdvertiserService::new(radio)),
            feedback,
        }
    }

    /// Walk the gate, prompting for whatever is missing
    pub async fn setup(&self) -> ServiceResult<()> {
        self.advertiser.setup().await
    }

    /// Forget earlier denials and walk the gate again
    pub async fn retry(&self) -> ServiceResult<()> {
        self.advertiser.retry().await
    }

    /// Refresh the gate snapshot without prompting
    pub async fn probe(&self) -> AdvertiserStatus {
        self.advertiser.probe().await
    }

    /// Hold a command: broadcast it and start press feedback
    ///
    /// Feedback starts only once the gate has accepted the command, so a
    /// refused press stays silent.
    pub async fn press(&self, command: DoorCommand) -> ServiceResult<()> {
        self.advertiser.advertise(command).await?;
        self.feedback.pulse(&PRESS_PATTERN, Some(0)).await;
        Ok(())
    }

    /// Release the held command: stop broadcast and feedback
    pub async fn release(&self) {
        self.advertiser.cancel().await;
        self.feedback.cancel().await;
    }

    /// Tap a command: broadcast for the hold duration, then stop
    pub async fn tap(&self, command: DoorCommand, hold: Duration) -> ServiceResult<()> {
        self.advertiser.advertise_for(command, hold).await
    }

    /// Current gate snapshot
    pub async fn status(&self) -> AdvertiserStatus {
        self.advertiser.status().await
    }

    pub fn subscribe_status(&self) -> watch::Receiver<AdvertiserStatus> {
        self.advertiser.subscribe_status()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.advertiser.subscribe_notices()
    }

    /// Follow adapter power changes until the event stream ends
    pub async fn run_monitor(&self) -> ServiceResult<()> {
        self.advertiser.run_monitor().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockRadio;
    use crate::core::error::ServiceError;
    use crate::feedback::SilentSink;

    fn remote_with_feedback(radio: Arc<MockRadio>) -> (DoorRemote<MockRadio>, Feedback) {
        let feedback = Feedback::new(Arc::new(SilentSink));
        let remote = DoorRemote::new(radio, feedback.clone());
        (remote, feedback)
    }

    #[tokio::test]
    async fn test_press_starts_broadcast_and_feedback() {
        let radio = Arc::new(MockRadio::new());
        let (remote, feedback) = remote_with_feedback(radio.clone());
        remote.setup().await.unwrap();

        remote.press(DoorCommand::Open).await.unwrap();

        assert_eq!(radio.active().await, Some(DoorCommand::Open.frame()));
        assert!(feedback.is_active().await);

        remote.release().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(radio.active().await, None);
        assert!(!feedback.is_active().await);
    }

    #[tokio::test]
    async fn test_refused_press_stays_silent() {
        let radio = Arc::new(MockRadio::new());
        let (remote, feedback) = remote_with_feedback(radio.clone());
        remote.setup().await.unwrap();
        radio.set_advertise_allowed(false).await;

        let result = remote.press(DoorCommand::Close).await;

        assert!(matches!(result, Err(ServiceError::PermissionDenied)));
        assert!(radio.started().await.is_empty());
        assert!(!feedback.is_active().await);
    }

    #[tokio::test]
    async fn test_tap_runs_the_full_hold() {
        let radio = Arc::new(MockRadio::new());
        let (remote, feedback) = remote_with_feedback(radio.clone());
        remote.setup().await.unwrap();

        remote
            .tap(DoorCommand::OpenAndClose, Duration::from_millis(10))
            .await
            .unwrap();

        assert_eq!(radio.started().await.len(), 1);
        assert_eq!(radio.active().await, None);
        // Taps never pulse.
        assert!(!feedback.is_active().await);
    }

    #[tokio::test]
    async fn test_probe_reports_missing_adapter() {
        let radio = Arc::new(MockRadio::new());
        radio.set_adapter_present(false).await;
        let (remote, _feedback) = remote_with_feedback(radio);

        let status = remote.probe().await;

        assert!(!status.is_ready());
    }
}
