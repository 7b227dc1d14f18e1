//! IPC client for talking to the daemon.
//!
//! Two shapes of client: [`send_message`] for one-shot control commands
//! (ping, status, shutdown), and [`SessionClient`] for long-lived frame
//! streams where replies arrive asynchronously.

use crate::error::{GestoError, Result};
use crate::ipc::protocol::{ClientMessage, ServerMessage};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

/// Write one message as a JSON line.
pub async fn write_message<W>(writer: &mut W, message: &ClientMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = message.to_json().map_err(|e| GestoError::IpcProtocol {
        message: format!("Failed to serialize message: {}", e),
    })?;

    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| GestoError::IpcConnection {
            message: format!("Failed to write message: {}", e),
        })?;

    writer
        .write_all(b"\n")
        .await
        .map_err(|e| GestoError::IpcConnection {
            message: format!("Failed to write newline: {}", e),
        })?;

    writer
        .flush()
        .await
        .map_err(|e| GestoError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    Ok(())
}

/// Read one message line. `Ok(None)` means the daemon closed the
/// connection.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<ServerMessage>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|e| GestoError::IpcConnection {
                message: format!("Failed to read reply: {}", e),
            })?;
        if bytes == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let message =
            ServerMessage::from_json(trimmed).map_err(|e| GestoError::IpcProtocol {
                message: format!("Failed to deserialize reply: {}", e),
            })?;
        return Ok(Some(message));
    }
}

/// Send one message to the daemon and wait for a single reply.
///
/// # Errors
/// Returns `GestoError::IpcConnection` if connection fails
/// Returns `GestoError::IpcProtocol` if serialization/deserialization fails
pub async fn send_message(socket_path: &Path, message: ClientMessage) -> Result<ServerMessage> {
    let mut client = SessionClient::connect(socket_path).await?;
    client.send(&message).await?;
    match client.recv().await? {
        Some(reply) => Ok(reply),
        None => Err(GestoError::IpcConnection {
            message: "Daemon closed the connection without replying".to_string(),
        }),
    }
}

/// A persistent connection carrying one recognition session.
pub struct SessionClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl SessionClient {
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let stream =
            UnixStream::connect(socket_path)
                .await
                .map_err(|e| GestoError::IpcConnection {
                    message: format!("Failed to connect to daemon: {}", e),
                })?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        write_message(&mut self.writer, message).await
    }

    pub async fn recv(&mut self) -> Result<Option<ServerMessage>> {
        read_message(&mut self.reader).await
    }

    /// Split into independent read and write halves, for callers that
    /// stream frames while draining events concurrently.
    pub fn into_split(self) -> (BufReader<OwnedReadHalf>, OwnedWriteHalf) {
        (self.reader, self.writer)
    }
}
