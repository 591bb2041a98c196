//! Per-client session halves for the control socket

use std::sync::Arc;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::unix::{OwnedReadHalf, OwnedWriteHalf},
    sync::Mutex,
};

use crate::{
    core::{error::TransportResult, types::SessionId},
    protocol::{JsonRpcNotification, JsonRpcResponse},
};

/// Write half of one client connection, shared by the reply and push paths
#[derive(Debug)]
pub struct UnixSocketSession {
    id: SessionId,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl UnixSocketSession {
    /// Wrap a connection's write half, minting a fresh session id
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            id: SessionId::new(),
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Stable id for log correlation
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Serialize and write one reply line
    pub async fn send_response(&self, response: &JsonRpcResponse) -> TransportResult<()> {
        let json = serde_json::to_string(response)?;
        self.send_line(&json).await
    }

    /// Serialize and write one push line
    pub async fn send_notification(
        &self,
        notification: &JsonRpcNotification,
    ) -> TransportResult<()> {
        let json = serde_json::to_string(notification)?;
        self.send_line(&json).await
    }

    async fn send_line(&self, json: &str) -> TransportResult<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Line-oriented view of a connection's read half
///
/// Backed by [`Lines`]; `read_line` is cancellation safe, so it can sit in
/// a `select!` next to the status and notice channels.
pub struct SessionReader {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl SessionReader {
    pub fn new(reader: OwnedReadHalf) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Read the next line from the socket, `None` on EOF
    pub async fn read_line(&mut self) -> TransportResult<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}
