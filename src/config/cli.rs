//! Command-line argument parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[clap(name = "door-remote", version, author)]
#[clap(about = "BLE remote control for garage door drives")]
pub struct CliArgs {
    /// Bluetooth adapter name (the default adapter when omitted)
    #[clap(short, long)]
    pub adapter: Option<String>,

    /// How long a one-shot command stays on the air, in milliseconds
    #[clap(long, default_value = "500")]
    pub hold_ms: u64,

    /// Disable the audible press feedback
    #[clap(long)]
    pub no_feedback: bool,

    #[clap(subcommand)]
    pub command: Option<Cmd>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Broadcast the open command once
    Open,

    /// Broadcast the close command once
    Close,

    /// Broadcast the stop command once
    Stop,

    /// Broadcast the open-and-close command once
    #[clap(visible_alias = "toggle")]
    OpenAndClose,

    /// Show the interactive panel (the default)
    Panel,

    /// Print the gate status as JSON
    Status,

    /// List the known commands and their payloads
    Commands,

    /// Serve the JSON-RPC interface on a Unix socket
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Path for Unix socket
    #[clap(long, default_value = "/run/door-remote.sock")]
    pub socket_path: String,

    /// Socket file permissions (octal, e.g., 660)
    #[clap(long, default_value = "660")]
    pub socket_mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_open_the_panel() {
        let args = CliArgs::try_parse_from(["door-remote"]).unwrap();

        assert!(args.command.is_none());
        assert_eq!(args.adapter, None);
        assert_eq!(args.hold_ms, 500);
        assert!(!args.no_feedback);
    }

    #[test]
    fn test_subcommands_parse() {
        let args = CliArgs::try_parse_from(["door-remote", "open-and-close"]).unwrap();
        assert!(matches!(args.command, Some(Cmd::OpenAndClose)));

        // "toggle" is an alias for the same command.
        let args = CliArgs::try_parse_from(["door-remote", "toggle"]).unwrap();
        assert!(matches!(args.command, Some(Cmd::OpenAndClose)));

        let args =
            CliArgs::try_parse_from(["door-remote", "serve", "--socket-mode", "600"]).unwrap();
        match args.command {
            Some(Cmd::Serve(serve)) => {
                assert_eq!(serve.socket_path, "/run/door-remote.sock");
                assert_eq!(serve.socket_mode, "600");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
