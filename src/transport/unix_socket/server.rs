//! Unix socket server implementation

use std::{os::unix::fs::PermissionsExt, path::Path, sync::Arc};

use listenfd::ListenFd;
use tokio::{
    fs,
    net::{UnixListener, UnixStream},
    sync::{broadcast, watch},
};
use tracing::{error, info, warn};

use crate::{
    backend::RadioBackend,
    core::{
        error::TransportResult,
        service::DoorRemote,
        types::{AdvertiserStatus, Notice},
    },
    protocol::{
        JsonRpcNotification, JsonRpcRequest, Notification, NoticeParams, StatusChangedParams,
    },
    transport::unix_socket::{
        handler::RequestHandler,
        session::{SessionReader, UnixSocketSession},
    },
};

/// Unix socket server
pub struct UnixSocketServer<R: RadioBackend> {
    socket_path: String,
    socket_mode: u32,
    remote: Arc<DoorRemote<R>>,
    handler: Arc<RequestHandler<R>>,
}

impl<R: RadioBackend> UnixSocketServer<R> {
    /// Create a new Unix socket server
    pub fn new(socket_path: String, socket_mode: u32, remote: Arc<DoorRemote<R>>) -> Self {
        let handler = Arc::new(RequestHandler::new(remote.clone()));

        Self {
            socket_path,
            socket_mode,
            remote,
            handler,
        }
    }

    /// Start the server
    pub async fn start(&self) -> std::io::Result<()> {
        let listener = self.bind().await?;
        info!("Unix socket server listening on {}", self.socket_path);

        #[cfg(feature = "systemd")]
        if let Err(e) = sd_notify::notify(false, &[sd_notify::NotifyState::Ready]) {
            warn!("Failed to signal readiness: {}", e);
        }

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let handler = self.handler.clone();
                    let status_rx = self.remote.subscribe_status();
                    let notice_rx = self.remote.subscribe_notices();
                    tokio::spawn(async move {
                        if let Err(e) =
                            Self::handle_client(stream, handler, status_rx, notice_rx).await
                        {
                            error!("Error handling client: {}", e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Error accepting connection: {}", e);
                }
            }
        }
    }

    /// Obtain the listener, preferring a socket handed down by systemd
    async fn bind(&self) -> std::io::Result<UnixListener> {
        if let Some(listener) = ListenFd::from_env().take_unix_listener(0)? {
            info!("Using listener from socket activation");
            listener.set_nonblocking(true)?;
            return UnixListener::from_std(listener);
        }

        // Remove existing socket file if it exists
        if Path::new(&self.socket_path).exists() {
            fs::remove_file(&self.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        fs::set_permissions(
            &self.socket_path,
            std::fs::Permissions::from_mode(self.socket_mode),
        )
        .await?;

        Ok(listener)
    }

    async fn handle_client(
        stream: UnixStream,
        handler: Arc<RequestHandler<R>>,
        mut status_rx: watch::Receiver<AdvertiserStatus>,
        mut notice_rx: broadcast::Receiver<Notice>,
    ) -> TransportResult<()> {
        let (read_half, write_half) = stream.into_split();
        let session = UnixSocketSession::new(write_half);
        let mut reader = SessionReader::new(read_half);

        info!("New client connected: {}", session.id());

        loop {
            tokio::select! {
                line = reader.read_line() => match line? {
                    Some(line) => {
                        if line.is_empty() {
                            continue;
                        }

                        let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                            Ok(request) => handler.handle_request(request).await,
                            Err(e) => {
                                warn!("Invalid JSON-RPC request: {}", e);
                                RequestHandler::<R>::parse_failure_response(&line, &e)
                            }
                        };
                        if let Err(e) = session.send_response(&response).await {
                            error!("Error sending response: {}", e);
                            break;
                        }
                    }
                    None => {
                        // Client disconnected
                        info!("Client disconnected: {}", session.id());
                        break;
                    }
                },
                changed = status_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = *status_rx.borrow_and_update();
                    let notification = JsonRpcNotification::new(Notification::StatusChanged(
                        StatusChangedParams::new(status),
                    ));
                    if let Err(e) = session.send_notification(&notification).await {
                        error!("Error sending notification: {}", e);
                        break;
                    }
                }
                notice = notice_rx.recv() => match notice {
                    Ok(notice) => {
                        let notification = JsonRpcNotification::new(Notification::Notice(
                            NoticeParams::new(notice),
                        ));
                        if let Err(e) = session.send_notification(&notification).await {
                            error!("Error sending notification: {}", e);
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Client {} missed {} notices", session.id(), missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        Ok(())
    }
}
