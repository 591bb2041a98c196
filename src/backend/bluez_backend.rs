//! BlueZ radio backend implementation

use std::collections::BTreeMap;
use std::time::Duration;

use bluer::adv::{Advertisement, AdvertisementHandle, Type};
use bluer::{Adapter, AdapterEvent, AdapterProperty, ErrorKind, Session};
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::backend::RadioBackend;
use crate::core::command::CommandFrame;
use crate::core::error::{RadioError, RadioResult};

/// Advertising interval matching the receiver's scan window.
const ADVERTISE_MIN_INTERVAL: Duration = Duration::from_millis(100);
const ADVERTISE_MAX_INTERVAL: Duration = Duration::from_millis(150);

/// Transmit power in dBm requested for command broadcasts.
const ADVERTISE_TX_POWER: i16 = 20;

/// Real BlueZ backend implementation
pub struct BluezRadio {
    session: Session,
    adapter_name: Option<String>,
    handle: Mutex<Option<AdvertisementHandle>>,
}

impl BluezRadio {
    /// Connect to the BlueZ daemon
    ///
    /// With `adapter_name` unset the default adapter is used.
    pub async fn new(adapter_name: Option<String>) -> RadioResult<Self> {
        let session = Session::new().await?;
        Ok(Self {
            session,
            adapter_name,
            handle: Mutex::new(None),
        })
    }

    async fn adapter(&self) -> RadioResult<Adapter> {
        match &self.adapter_name {
            Some(name) => Ok(self.session.adapter(name)?),
            None => Ok(self.session.default_adapter().await?),
        }
    }

    /// Build the advertisement broadcast for a command frame
    ///
    /// Broadcast-only, short interval, high transmit power. No timeout is
    /// requested: the advertisement runs until its handle is dropped.
    fn advertisement(frame: CommandFrame) -> Advertisement {
        let mut manufacturer_data = BTreeMap::new();
        manufacturer_data.insert(frame.company_id, frame.payload.to_vec());

        Advertisement {
            advertisement_type: Type::Broadcast,
            manufacturer_data,
            min_interval: Some(ADVERTISE_MIN_INTERVAL),
            max_interval: Some(ADVERTISE_MAX_INTERVAL),
            tx_power: Some(ADVERTISE_TX_POWER),
            ..Default::default()
        }
    }

    fn access_denied(err: &bluer::Error) -> bool {
        matches!(err.kind, ErrorKind::NotAuthorized | ErrorKind::NotPermitted)
    }
}

impl RadioBackend for BluezRadio {
    async fn adapter_present(&self) -> bool {
        match self.session.adapter_names().await {
            Ok(names) => match &self.adapter_name {
                Some(name) => names.iter().any(|n| n == name),
                None => !names.is_empty(),
            },
            Err(err) => {
                warn!("Failed to list adapters: {}", err);
                false
            }
        }
    }

    async fn advertise_allowed(&self) -> RadioResult<bool> {
        let adapter = self.adapter().await?;

        // Reading the advertising manager fails with an access error when
        // bluetoothd does not let this caller register advertisements.
        match adapter.supported_advertising_instances().await {
            Ok(_) => Ok(true),
            Err(err) if Self::access_denied(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn request_advertise_access(&self) -> RadioResult<bool> {
        // The grant happens out of band on Linux, so a request is a fresh
        // probe rather than a dialog.
        let allowed = self.advertise_allowed().await?;
        debug!("Advertising access probe: allowed={}", allowed);
        Ok(allowed)
    }

    async fn adapter_powered(&self) -> RadioResult<bool> {
        let adapter = self.adapter().await?;
        Ok(adapter.is_powered().await?)
    }

    async fn request_power_on(&self) -> RadioResult<bool> {
        let adapter = self.adapter().await?;
        match adapter.set_powered(true).await {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!("Power-on request refused: {}", err);
                Ok(false)
            }
        }
    }

    async fn power_events(&self) -> RadioResult<BoxStream<'static, bool>> {
        let adapter = self.adapter().await?;
        let events = adapter.events().await?;

        let stream = events.filter_map(|event| async move {
            match event {
                AdapterEvent::PropertyChanged(AdapterProperty::Powered(powered)) => Some(powered),
                _ => None,
            }
        });

        Ok(stream.boxed())
    }

    async fn start_advertising(&self, frame: CommandFrame) -> RadioResult<()> {
        let adapter = self.adapter().await?;
        debug!(
            "Registering advertisement: company=0x{:04x} payload={}",
            frame.company_id,
            hex::encode(frame.payload)
        );

        let handle = adapter
            .advertise(Self::advertisement(frame))
            .await
            .map_err(|err| match RadioError::from(err) {
                RadioError::Bluetooth(message) => RadioError::AdvertiseFailed(message),
                other => other,
            })?;

        // Dropping the previous handle unregisters its advertisement.
        self.handle.lock().await.replace(handle);
        Ok(())
    }

    async fn stop_advertising(&self) -> RadioResult<()> {
        let handle = self.handle.lock().await.take();
        if handle.is_some() {
            debug!("Unregistering advertisement");
        }
        drop(handle);
        Ok(())
    }

    async fn is_advertising(&self) -> bool {
        self.handle.lock().await.is_some()
    }
}

impl From<bluer::Error> for RadioError {
    fn from(err: bluer::Error) -> Self {
        match err.kind {
            ErrorKind::NotFound | ErrorKind::DoesNotExist => RadioError::NoAdapter,
            ErrorKind::NotAuthorized | ErrorKind::NotPermitted => {
                RadioError::AccessDenied(err.message)
            }
            ErrorKind::NotReady => RadioError::PoweredOff,
            _ => RadioError::Bluetooth(err.message),
        }
    }
}
