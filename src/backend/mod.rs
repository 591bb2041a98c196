//! Radio backend abstraction layer

pub mod bluez_backend;
pub mod mock_backend;
pub mod radio_backend;

pub use bluez_backend::BluezRadio;
pub use radio_backend::RadioBackend;

#[cfg(test)]
pub use mock_backend::MockRadio;
