//! Runtime settings

use std::time::Duration;

use crate::config::{CliArgs, ServeArgs};

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub adapter: Option<String>,
    pub hold: Duration,
    pub feedback: bool,
}

impl From<&CliArgs> for Settings {
    fn from(args: &CliArgs) -> Self {
        Settings {
            adapter: args.adapter.clone(),
            hold: Duration::from_millis(args.hold_ms),
            feedback: !args.no_feedback,
        }
    }
}

/// Socket settings for the serve subcommand
#[derive(Debug, Clone)]
pub struct SocketSettings {
    pub path: String,
    pub mode: u32,
}

impl From<&ServeArgs> for SocketSettings {
    fn from(args: &ServeArgs) -> Self {
        // Parse octal socket mode
        let mode = u32::from_str_radix(&args.socket_mode, 8).unwrap_or(0o660);

        SocketSettings {
            path: args.socket_path.clone(),
            mode,
        }
    }
}
