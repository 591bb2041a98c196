//! Core business logic module

pub mod advertiser;
pub mod command;
pub mod error;
pub mod service;
pub mod types;
