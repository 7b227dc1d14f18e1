//! Async Unix socket IPC server hosting recognition sessions.
//!
//! One connection is one session. The server accepts connections, gives
//! each a fresh [`RecognitionSession`], and loops on its messages until the
//! client disconnects. All recognition logic lives behind the
//! [`SessionHandler`] trait.

use crate::error::{GestoError, Result};
use crate::ipc::protocol::{ClientMessage, ServerMessage};
use crate::session::RecognitionSession;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

/// Handler trait for driving one client session.
#[async_trait::async_trait]
pub trait SessionHandler: Send + Sync {
    /// Build the state for a newly connected client.
    async fn open_session(&self) -> RecognitionSession;

    /// Handle one message. `None` means no reply is sent; frames that
    /// confirm nothing stay silent.
    async fn handle(
        &self,
        session: &mut RecognitionSession,
        message: ClientMessage,
    ) -> Option<ServerMessage>;

    /// Called once when the connection ends, error or not.
    async fn close_session(&self);
}

/// State for managing server shutdown.
#[derive(Debug, Clone)]
struct ServerState {
    shutdown: Arc<Mutex<bool>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            shutdown: Arc::new(Mutex::new(false)),
        }
    }

    async fn is_shutdown(&self) -> bool {
        *self.shutdown.lock().await
    }

    async fn set_shutdown(&self) {
        *self.shutdown.lock().await = true;
    }
}

/// IPC server accepting recognition sessions on a Unix socket.
pub struct IpcServer {
    socket_path: PathBuf,
    state: ServerState,
}

impl IpcServer {
    /// Create a new IPC server bound to the specified socket path.
    pub fn new(socket_path: PathBuf) -> Result<Self> {
        Ok(Self {
            socket_path,
            state: ServerState::new(),
        })
    }

    /// Get the socket path this server is using.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Get the default socket path based on XDG_RUNTIME_DIR or fallback.
    pub fn default_socket_path() -> PathBuf {
        if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
            PathBuf::from(xdg_runtime).join("gesto.sock")
        } else {
            let uid = unsafe { libc::getuid() };
            PathBuf::from(format!("/tmp/gesto-{}.sock", uid))
        }
    }

    /// Start the IPC server and handle incoming connections.
    pub async fn start<H>(&self, handler: H) -> Result<()>
    where
        H: SessionHandler + 'static,
    {
        // Clean up any existing socket file
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| GestoError::IpcSocket {
                message: format!("Failed to remove existing socket: {}", e),
            })?;
        }

        let listener = UnixListener::bind(&self.socket_path).map_err(|e| GestoError::IpcSocket {
            message: format!("Failed to bind to socket: {}", e),
        })?;

        let handler = Arc::new(handler);

        loop {
            if self.state.is_shutdown().await {
                break;
            }

            // Accept with timeout so the shutdown flag is rechecked
            let accept_result =
                tokio::time::timeout(tokio::time::Duration::from_millis(100), listener.accept())
                    .await;

            match accept_result {
                Ok(Ok((stream, _))) => {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, handler).await {
                            eprintln!("Error handling client: {}", e);
                        }
                    });
                }
                Ok(Err(e)) => {
                    return Err(GestoError::IpcConnection {
                        message: format!("Failed to accept connection: {}", e),
                    });
                }
                Err(_) => {
                    continue;
                }
            }
        }

        Ok(())
    }

    /// Stop the IPC server and clean up the socket file.
    pub async fn stop(&self) -> Result<()> {
        self.state.set_shutdown().await;

        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path).map_err(|e| GestoError::IpcSocket {
                message: format!("Failed to remove socket file: {}", e),
            })?;
        }

        Ok(())
    }
}

/// Drive one client connection from open to disconnect.
async fn handle_client<H>(stream: UnixStream, handler: Arc<H>) -> Result<()>
where
    H: SessionHandler,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut session = handler.open_session().await;

    let result = session_loop(&mut reader, &mut writer, handler.as_ref(), &mut session).await;
    handler.close_session().await;
    result
}

async fn session_loop<H>(
    reader: &mut BufReader<OwnedReadHalf>,
    writer: &mut OwnedWriteHalf,
    handler: &H,
    session: &mut RecognitionSession,
) -> Result<()>
where
    H: SessionHandler,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|e| GestoError::IpcConnection {
                message: format!("Failed to read from client: {}", e),
            })?;
        if bytes == 0 {
            // Client disconnected
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // A malformed message gets an error reply, not a dropped
        // connection; the session keeps going.
        let reply = match ClientMessage::from_json(trimmed) {
            Ok(message) => handler.handle(session, message).await,
            Err(e) => Some(ServerMessage::Error {
                message: format!("Malformed message: {}", e),
            }),
        };

        let Some(reply) = reply else {
            continue;
        };

        let reply_json = reply.to_json().map_err(|e| GestoError::IpcProtocol {
            message: format!("Failed to serialize reply: {}", e),
        })?;

        writer
            .write_all(reply_json.as_bytes())
            .await
            .map_err(|e| GestoError::IpcConnection {
                message: format!("Failed to write to client: {}", e),
            })?;

        writer
            .write_all(b"\n")
            .await
            .map_err(|e| GestoError::IpcConnection {
                message: format!("Failed to write newline to client: {}", e),
            })?;

        writer
            .flush()
            .await
            .map_err(|e| GestoError::IpcConnection {
                message: format!("Failed to flush writer: {}", e),
            })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stabilizer::StabilizerConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    // Mock handler with observable open/close counters
    struct MockSessionHandler {
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
    }

    impl MockSessionHandler {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let opened = Arc::new(AtomicUsize::new(0));
            let closed = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    opened: opened.clone(),
                    closed: closed.clone(),
                },
                opened,
                closed,
            )
        }
    }

    #[async_trait::async_trait]
    impl SessionHandler for MockSessionHandler {
        async fn open_session(&self) -> RecognitionSession {
            self.opened.fetch_add(1, Ordering::SeqCst);
            RecognitionSession::new(StabilizerConfig::default(), "javascript")
        }

        async fn handle(
            &self,
            session: &mut RecognitionSession,
            message: ClientMessage,
        ) -> Option<ServerMessage> {
            match message {
                ClientMessage::Ping => Some(ServerMessage::Pong),
                ClientMessage::StartRecognition => {
                    session.start();
                    Some(ServerMessage::Started)
                }
                ClientMessage::StopRecognition => {
                    session.stop();
                    Some(ServerMessage::Stopped)
                }
                // The mock swallows frames; recognition logic is tested
                // against the real daemon handler.
                ClientMessage::Frame { .. } => None,
                ClientMessage::Status => Some(ServerMessage::Status {
                    recognizing: session.is_recognizing(),
                    active_sessions: self.opened.load(Ordering::SeqCst)
                        - self.closed.load(Ordering::SeqCst),
                    classifier: "mock".to_string(),
                    daemon_version: "test".to_string(),
                }),
                ClientMessage::Shutdown => Some(ServerMessage::ShuttingDown),
            }
        }

        async fn close_session(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn start_test_server(socket_path: PathBuf) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let (handler, opened, closed) = MockSessionHandler::new();
        tokio::spawn(async move {
            let server = IpcServer::new(socket_path).unwrap();
            server.start(handler).await
        });
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        (opened, closed)
    }

    async fn send_line(writer: &mut OwnedWriteHalf, message: &ClientMessage) {
        let json = format!("{}\n", message.to_json().unwrap());
        writer.write_all(json.as_bytes()).await.unwrap();
        writer.flush().await.unwrap();
    }

    async fn read_reply(reader: &mut BufReader<OwnedReadHalf>) -> ServerMessage {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        ServerMessage::from_json(line.trim()).unwrap()
    }

    #[test]
    fn test_default_socket_path_returns_valid_path() {
        let path = IpcServer::default_socket_path();
        let path_str = path.to_string_lossy();
        if std::env::var("XDG_RUNTIME_DIR").is_ok() {
            assert!(
                path_str.ends_with("gesto.sock"),
                "With XDG_RUNTIME_DIR, expected path ending with gesto.sock, got: {:?}",
                path
            );
        } else {
            let uid = unsafe { libc::getuid() };
            let expected = format!("/tmp/gesto-{}.sock", uid);
            assert_eq!(
                path_str, expected,
                "Without XDG_RUNTIME_DIR, expected fallback path"
            );
        }
    }

    #[tokio::test]
    async fn test_server_creation() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");

        let server = IpcServer::new(socket_path.clone()).unwrap();
        assert_eq!(server.socket_path(), socket_path.as_path());
    }

    #[tokio::test]
    async fn test_server_binds_to_socket() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");

        start_test_server(socket_path.clone()).await;
        assert!(socket_path.exists());
    }

    #[tokio::test]
    async fn test_persistent_connection_handles_many_messages() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_test_server(socket_path.clone()).await;

        let stream = UnixStream::connect(&socket_path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        send_line(&mut writer, &ClientMessage::Ping).await;
        assert_eq!(read_reply(&mut reader).await, ServerMessage::Pong);

        send_line(&mut writer, &ClientMessage::StartRecognition).await;
        assert_eq!(read_reply(&mut reader).await, ServerMessage::Started);

        send_line(&mut writer, &ClientMessage::StopRecognition).await;
        assert_eq!(read_reply(&mut reader).await, ServerMessage::Stopped);
    }

    #[tokio::test]
    async fn test_frames_produce_no_reply() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_test_server(socket_path.clone()).await;

        let stream = UnixStream::connect(&socket_path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        // A swallowed frame then a ping: the first reply must be the pong.
        send_line(
            &mut writer,
            &ClientMessage::Frame {
                payload: crate::gesture::FramePayload::Luma { pixels: vec![1] },
                language: None,
            },
        )
        .await;
        send_line(&mut writer, &ClientMessage::Ping).await;
        assert_eq!(read_reply(&mut reader).await, ServerMessage::Pong);
    }

    #[tokio::test]
    async fn test_malformed_message_keeps_connection_alive() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_test_server(socket_path.clone()).await;

        let stream = UnixStream::connect(&socket_path).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        writer.write_all(b"this is not json\n").await.unwrap();
        writer.flush().await.unwrap();
        match read_reply(&mut reader).await {
            ServerMessage::Error { message } => {
                assert!(message.starts_with("Malformed message:"));
            }
            other => panic!("expected Error, got {:?}", other),
        }

        // Still usable afterwards.
        send_line(&mut writer, &ClientMessage::Ping).await;
        assert_eq!(read_reply(&mut reader).await, ServerMessage::Pong);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated_per_connection() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        start_test_server(socket_path.clone()).await;

        let stream_a = UnixStream::connect(&socket_path).await.unwrap();
        let (reader_a, mut writer_a) = stream_a.into_split();
        let mut reader_a = BufReader::new(reader_a);

        let stream_b = UnixStream::connect(&socket_path).await.unwrap();
        let (reader_b, mut writer_b) = stream_b.into_split();
        let mut reader_b = BufReader::new(reader_b);

        send_line(&mut writer_a, &ClientMessage::StartRecognition).await;
        assert_eq!(read_reply(&mut reader_a).await, ServerMessage::Started);

        // B never started; its status must not see A's state.
        send_line(&mut writer_b, &ClientMessage::Status).await;
        match read_reply(&mut reader_b).await {
            ServerMessage::Status { recognizing, .. } => assert!(!recognizing),
            other => panic!("expected Status, got {:?}", other),
        }

        send_line(&mut writer_a, &ClientMessage::Status).await;
        match read_reply(&mut reader_a).await {
            ServerMessage::Status { recognizing, .. } => assert!(recognizing),
            other => panic!("expected Status, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sessions_are_opened_and_closed() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        let (opened, closed) = start_test_server(socket_path.clone()).await;

        {
            let stream = UnixStream::connect(&socket_path).await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            send_line(&mut writer, &ClientMessage::Ping).await;
            read_reply(&mut reader).await;
        }
        // Dropped stream disconnects; give the server a moment to notice.
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_stop_removes_socket() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");

        let server = Arc::new(IpcServer::new(socket_path.clone()).unwrap());
        let server_clone = Arc::clone(&server);
        let (handler, _opened, _closed) = MockSessionHandler::new();
        let handle = tokio::spawn(async move { server_clone.start(handler).await });

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        assert!(socket_path.exists());

        server.stop().await.unwrap();
        handle.await.unwrap().unwrap();
        assert!(!socket_path.exists());
    }
}
