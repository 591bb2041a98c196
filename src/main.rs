//! Door remote entry point

use std::sync::Arc;

use clap::Parser;
use door_remote::{
    backend::BluezRadio,
    config::{CliArgs, Cmd, Settings, SocketSettings},
    core::{
        command::{COMPANY_ID, DoorCommand},
        service::DoorRemote,
    },
    feedback::{Feedback, default_sink},
    panel::Panel,
    transport::unix_socket::UnixSocketServer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // The panel owns the terminal, so logging there is opt-in via
    // RUST_LOG. Logs go to stderr either way, the panel and status
    // output own stdout.
    let default_filter = match args.command {
        None | Some(Cmd::Panel) => "off",
        _ => "info,door_remote=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(?args, "Starting door remote");

    let settings = Settings::from(&args);

    let radio = match BluezRadio::new(settings.adapter.clone()).await {
        Ok(radio) => Arc::new(radio),
        Err(e) => {
            error!("Bluetooth session failed: {}", e);
            return Err(e.into());
        }
    };

    match args.command {
        None | Some(Cmd::Panel) => run_panel(radio, &settings).await,
        Some(Cmd::Open) => run_tap(radio, &settings, DoorCommand::Open).await,
        Some(Cmd::Close) => run_tap(radio, &settings, DoorCommand::Close).await,
        Some(Cmd::Stop) => run_tap(radio, &settings, DoorCommand::Stop).await,
        Some(Cmd::OpenAndClose) => run_tap(radio, &settings, DoorCommand::OpenAndClose).await,
        Some(Cmd::Status) => run_status(radio).await,
        Some(Cmd::Commands) => {
            print_commands();
            Ok(())
        }
        Some(Cmd::Serve(serve)) => run_serve(radio, SocketSettings::from(&serve)).await,
    }
}

/// Run the interactive panel until the user quits
async fn run_panel(
    radio: Arc<BluezRadio>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let feedback = if settings.feedback {
        Feedback::new(default_sink())
    } else {
        Feedback::disabled()
    };
    let remote = Arc::new(DoorRemote::new(radio, feedback));

    // Keep the gate in step with the adapter while the panel is open.
    let monitor = {
        let remote = remote.clone();
        tokio::spawn(async move {
            if let Err(e) = remote.run_monitor().await {
                error!("Adapter monitor failed: {}", e);
            }
        })
    };

    let result = Panel::new(remote).run().await;

    monitor.abort();
    result.map_err(Into::into)
}

/// Broadcast a single command for the configured hold
async fn run_tap(
    radio: Arc<BluezRadio>,
    settings: &Settings,
    command: DoorCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let remote = DoorRemote::new(radio, Feedback::disabled());

    if let Err(e) = remote.setup().await {
        if let Some(notice) = remote.status().await.blocking_notice() {
            error!("{}", notice);
        }
        return Err(e.into());
    }

    remote.tap(command, settings.hold).await?;
    info!("Broadcast {} for {} ms", command, settings.hold.as_millis());
    Ok(())
}

/// Print the gate status as JSON
async fn run_status(radio: Arc<BluezRadio>) -> Result<(), Box<dyn std::error::Error>> {
    let remote = DoorRemote::new(radio, Feedback::disabled());
    let status = remote.probe().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// List the known commands and their advertisement payloads
fn print_commands() {
    println!("company id 0x{COMPANY_ID:04X}");
    for command in DoorCommand::ALL {
        println!("{command:<15} {}", hex::encode(command.payload()));
    }
}

/// Serve the JSON-RPC interface on a Unix socket
async fn run_serve(
    radio: Arc<BluezRadio>,
    socket: SocketSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let remote = Arc::new(DoorRemote::new(radio, Feedback::disabled()));

    if let Err(e) = remote.setup().await {
        // Keep serving, clients see the gate state and its notices.
        info!("Gate not ready yet: {}", e);
    }

    let monitor = {
        let remote = remote.clone();
        tokio::spawn(async move {
            if let Err(e) = remote.run_monitor().await {
                error!("Adapter monitor failed: {}", e);
            }
        })
    };

    info!("Starting Unix socket transport on {}", socket.path);
    let server = UnixSocketServer::new(socket.path, socket.mode, remote.clone());
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.start().await {
            error!("Unix socket server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully");
        }
        _ = shutdown_signal() => {
            info!("Received SIGTERM, shutting down gracefully");
        }
        _ = server_task => {
            info!("Server task completed");
        }
    }

    monitor.abort();
    remote.release().await;
    info!("Shutting down...");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");

    sigterm.recv().await;
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    // On non-Unix platforms, just wait forever
    std::future::pending::<()>().await
}
