//! Transport layer implementations

pub mod unix_socket;
