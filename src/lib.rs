//! Door remote
//!
//! Broadcasts the fixed BLE manufacturer data frames that garage door
//! drives listen for. Three surfaces share one advertiser and its gate:
//! - an interactive terminal panel
//! - one-shot commands for scripting
//! - Unix Domain Sockets (JSON-RPC 2.0)

pub mod backend;
pub mod config;
pub mod core;
pub mod feedback;
pub mod panel;
pub mod protocol;
pub mod transport;

pub use crate::core::{
    command::{COMPANY_ID, CommandFrame, DoorCommand},
    error::{RadioError, ServiceError, TransportError},
    types::{AdvertiserState, AdvertiserStatus, Notice},
};
