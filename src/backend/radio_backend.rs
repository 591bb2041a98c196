//! Radio backend trait definition

use futures::stream::BoxStream;
use trait_variant::make;

use crate::core::command::CommandFrame;
use crate::core::error::RadioResult;

/// Abstraction over the Bluetooth advertising interface (typically BlueZ)
///
/// This trait enables testing by allowing mock implementations
/// while providing a standard interface for radio operations.
#[make(Send)]
pub trait RadioBackend: Sync + 'static {
    /// Whether a usable Bluetooth adapter is present on this host
    async fn adapter_present(&self) -> bool;

    /// Probe whether this process may register advertisements
    async fn advertise_allowed(&self) -> RadioResult<bool>;

    /// Ask for advertising access and report the outcome
    ///
    /// On BlueZ the grant itself happens out of band (group membership,
    /// polkit rules), so an implementation may only be able to re-probe.
    async fn request_advertise_access(&self) -> RadioResult<bool>;

    /// Whether the adapter is powered on
    async fn adapter_powered(&self) -> RadioResult<bool>;

    /// Ask to power the adapter on, reporting whether it ended up powered
    ///
    /// A refusal (rfkill, daemon policy) is reported as `Ok(false)`.
    async fn request_power_on(&self) -> RadioResult<bool>;

    /// Stream of adapter power changes, `true` for powered on
    async fn power_events(&self) -> RadioResult<BoxStream<'static, bool>>;

    /// Start broadcasting the frame, replacing any active advertisement
    async fn start_advertising(&self, frame: CommandFrame) -> RadioResult<()>;

    /// Stop broadcasting; a no-op when nothing is active
    async fn stop_advertising(&self) -> RadioResult<()>;

    /// Whether an advertisement is currently registered
    async fn is_advertising(&self) -> bool;
}
