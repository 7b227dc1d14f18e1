//! Daemon mode for gesto - holds the classifier and hosts the IPC server.

pub mod handler;

use crate::classifier::{FrameClassifier, create_classifier};
use crate::config::Config;
use crate::error::{GestoError, Result};
use crate::ipc::server::IpcServer;
use crate::stabilizer::StabilizerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, Notify};

/// Daemon state shared by all client sessions.
pub struct DaemonState {
    /// Configuration
    pub config: Arc<Mutex<Config>>,
    /// Frame classifier (shared, stateless across sessions)
    pub classifier: Arc<dyn FrameClassifier>,
    /// Shutdown signal raised by a client's shutdown message
    pub shutdown: Notify,
    /// Number of currently connected clients
    active_sessions: AtomicUsize,
}

impl DaemonState {
    /// Creates a new daemon state around a loaded classifier.
    ///
    /// # Arguments
    /// * `config` - Configuration
    /// * `classifier` - Classifier shared by every session
    pub fn new(config: Config, classifier: Arc<dyn FrameClassifier>) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            classifier,
            shutdown: Notify::new(),
            active_sessions: AtomicUsize::new(0),
        }
    }

    /// Records a newly connected client.
    pub fn session_opened(&self) {
        self.active_sessions.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a disconnected client. Calls are paired with
    /// [`session_opened`](Self::session_opened) by the server loop.
    pub fn session_closed(&self) {
        let _ = self
            .active_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_sub(1))
            });
    }

    /// Returns the number of currently connected clients.
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }

    /// Requests daemon shutdown. Wakes the daemon's main select loop.
    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Returns the stabilizer settings for new sessions.
    pub async fn stabilizer_config(&self) -> StabilizerConfig {
        self.config.lock().await.stabilizer
    }

    /// Returns the target language used when a frame names none.
    pub async fn default_language(&self) -> String {
        self.config.lock().await.daemon.default_language.clone()
    }
}

/// Run the daemon: build the classifier, start the IPC server, wait for
/// shutdown.
///
/// # Arguments
/// * `config` - Configuration
/// * `socket_path` - Path to Unix socket for IPC
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level
///
/// # Returns
/// Ok(()) on graceful shutdown, error otherwise
pub async fn run_daemon(
    config: Config,
    socket_path: Option<PathBuf>,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    config.validate()?;

    let classifier = create_classifier(&config.classifier);

    if !quiet {
        eprintln!("Classifier '{}' ready.", classifier.name());
    }

    // Create daemon state
    let state = Arc::new(DaemonState::new(config, classifier));

    // Determine socket path
    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);

    // Create IPC server
    let server = Arc::new(IpcServer::new(socket_path)?);

    if !quiet {
        eprintln!(
            "IPC server listening at: {}",
            server.socket_path().display()
        );
        eprintln!("Daemon ready.");
    }

    // Create session handler
    let handler = handler::DaemonSessionHandler::new(Arc::clone(&state), quiet, verbosity);

    // Start IPC server in background task
    let server_clone = Arc::clone(&server);
    let server_handle = tokio::spawn(async move { server_clone.start(handler).await });

    // Wait for SIGINT, SIGTERM, or a shutdown message from a client
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("\nReceived SIGINT, shutting down...");
            }
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                eprintln!("Error setting up signal handler: {}", e);
            }
            if !quiet {
                eprintln!("\nReceived SIGTERM, shutting down...");
            }
        }
        _ = state.shutdown.notified() => {
            if !quiet {
                eprintln!("Shutdown requested over IPC, shutting down...");
            }
        }
    }

    // Stop IPC server
    server.stop().await?;

    // Wait for server task to finish
    if let Err(e) = server_handle.await {
        eprintln!("gesto: daemon server task failed: {e}");
    }

    if !quiet {
        eprintln!("Daemon stopped.");
    }

    Ok(())
}

/// Wait for SIGTERM signal (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| GestoError::Other(format!("Failed to register SIGTERM handler: {}", e)))?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C will still work)
    std::future::pending::<()>().await
}
