//! Error types for the door remote

use thiserror::Error;

/// Result type for radio backend operations
pub type RadioResult<T> = Result<T, RadioError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors related to radio backend operations
#[derive(Error, Debug, Clone)]
pub enum RadioError {
    #[error("No Bluetooth adapter available")]
    NoAdapter,

    #[error("Advertising access denied: {0}")]
    AccessDenied(String),

    #[error("Adapter is powered off")]
    PoweredOff,

    #[error("Advertising failed: {0}")]
    AdvertiseFailed(String),

    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
}

/// Errors related to core service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("No Bluetooth adapter available")]
    NoAdapter,

    #[error("Advertising permission not granted")]
    PermissionDenied,

    #[error("Bluetooth adapter is disabled")]
    AdapterDisabled,

    #[error("Radio error: {0}")]
    Radio(#[from] RadioError),
}

/// Errors related to transport layer
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
