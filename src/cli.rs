//! Command-line interface for gesto
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Turn hand gestures into code snippets
#[derive(Parser, Debug)]
#[command(name = "gesto", version, about = "Turn hand gestures into code snippets")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: session events, -vv: per-frame classifications)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a frame interval string into milliseconds.
///
/// Supports any duration format accepted by `humantime`: bare numbers
/// (milliseconds), single-unit (`200ms`, `1s`), and compound (`1s500ms`).
fn parse_interval_ms(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daemon (foreground process for systemd)
    Daemon {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/gesto.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Check that the daemon is alive via IPC
    Ping {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/gesto.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Get daemon status via IPC
    Status {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/gesto.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Ask the daemon to shut down via IPC
    Shutdown {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/gesto.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Feed classifications from stdin to a live recognition session
    ///
    /// Reads `LABEL CONFIDENCE` lines and sends them as classification
    /// frames. The daemon must run a passthrough classifier for these
    /// frames to be accepted.
    Feed {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/gesto.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,

        /// Target language for snippets (default: daemon config)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Delay between frames in milliseconds. Examples: 100, 500ms, 1s
        #[arg(long, short = 'i', value_name = "DURATION", default_value_t = defaults::FRAME_INTERVAL_MS, value_parser = parse_interval_ms)]
        interval: u64,
    },

    /// Replay a frame trace from stdin through the offline pipeline
    ///
    /// Reads newline-delimited frame JSON and writes gesture events to
    /// stdout, one JSON object per line. No daemon is required.
    Pipe {
        /// Target language for snippets (default: config)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// Inspect the built-in snippet templates
    Templates {
        /// Action to perform
        #[command(subcommand)]
        action: TemplatesAction,
    },

    /// View and manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Template inspection actions
#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List all templates for every language
    List,
    /// Show the snippet for one gesture
    Show {
        /// Gesture label (e.g., LOOP, FUNCTION)
        label: String,
        /// Target language (default: config)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Show the effective configuration as TOML
    Show,
    /// Write a default configuration file
    Init,
}
