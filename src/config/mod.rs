//! Configuration module

pub mod cli;
pub mod settings;

pub use cli::{CliArgs, Cmd, ServeArgs};
pub use settings::{Settings, SocketSettings};
