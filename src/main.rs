use anyhow::Result;
use clap::{CommandFactory, Parser};
use gesto::classifier::create_classifier;
use gesto::cli::{Cli, Commands, ConfigAction, TemplatesAction};
use gesto::config::Config;
use gesto::daemon::run_daemon;
use gesto::error::GestoError;
use gesto::gesture::{FramePayload, GestureLabel};
use gesto::ipc::client::{SessionClient, read_message, send_message, write_message};
use gesto::ipc::protocol::{ClientMessage, ServerMessage};
use gesto::ipc::server::IpcServer;
use gesto::pipeline::{ErrorReporter, LogReporter, run_replay};
use gesto::templates::{LANGUAGES, Language, get_template, templates_for};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon { socket } => {
            let config = load_config(cli.config.as_deref())?;
            let socket = socket.or_else(|| config.daemon.socket.clone());
            run_daemon(config, socket, cli.quiet, cli.verbose).await?;
        }
        Commands::Ping { socket } => {
            let config = load_config(cli.config.as_deref())?;
            let socket_path = resolve_socket(socket, &config);
            handle_control(&socket_path, ClientMessage::Ping).await?;
        }
        Commands::Status { socket } => {
            let config = load_config(cli.config.as_deref())?;
            let socket_path = resolve_socket(socket, &config);
            handle_control(&socket_path, ClientMessage::Status).await?;
        }
        Commands::Shutdown { socket } => {
            let config = load_config(cli.config.as_deref())?;
            let socket_path = resolve_socket(socket, &config);
            handle_control(&socket_path, ClientMessage::Shutdown).await?;
        }
        Commands::Feed {
            socket,
            language,
            interval,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let socket_path = resolve_socket(socket, &config);
            run_feed(&socket_path, language, interval, cli.quiet).await?;
        }
        Commands::Pipe { language } => {
            let config = load_config(cli.config.as_deref())?;
            run_pipe(config, language, cli.quiet)?;
        }
        Commands::Templates { action } => {
            let config = load_config(cli.config.as_deref())?;
            handle_templates_command(action, &config)?;
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "gesto",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/gesto/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        // Load from custom path
        Config::load(path)?
    } else {
        // Try default path, fall back to defaults
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    // Apply environment variable overrides
    Ok(config.with_env_overrides())
}

/// Resolve the socket path: CLI flag, then config, then XDG default.
fn resolve_socket(cli_socket: Option<PathBuf>, config: &Config) -> PathBuf {
    cli_socket
        .or_else(|| config.daemon.socket.clone())
        .unwrap_or_else(IpcServer::default_socket_path)
}

/// Send one control message to the daemon and render the reply.
async fn handle_control(socket_path: &Path, message: ClientMessage) -> Result<()> {
    match send_message(socket_path, message).await {
        Ok(reply) => match reply {
            ServerMessage::Pong => {
                println!("{}", "Daemon is alive.".green());
            }
            ServerMessage::Status {
                recognizing,
                active_sessions,
                classifier,
                daemon_version,
            } => {
                let client_version = gesto::version_string();

                println!("Status:");
                // Version info
                println!("  {}      {}", "Client:".dimmed(), client_version);
                print!("  {}      {}", "Daemon:".dimmed(), daemon_version);
                if client_version != daemon_version {
                    print!(" {}", "(version mismatch!)".yellow());
                }
                println!();
                println!("  {}  {}", "Classifier:".dimmed(), classifier);
                println!("  {}    {}", "Sessions:".dimmed(), active_sessions);
                println!(
                    "  {} {}",
                    "Recognizing:".dimmed(),
                    if recognizing { "yes" } else { "no" }
                );
            }
            ServerMessage::ShuttingDown => {
                println!("{}", "Daemon is shutting down.".green());
            }
            ServerMessage::Error { message } => {
                eprintln!("{}", format!("Error: {}", message).red());
                std::process::exit(1);
            }
            other => {
                eprintln!("{}", format!("Unexpected reply: {:?}", other).red());
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!(
                "{}",
                format!("Failed to communicate with daemon: {}", e).red()
            );
            eprintln!("Is the daemon running? Start it with: gesto daemon");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Parse a `LABEL CONFIDENCE` feed line into a classification frame.
///
/// The confidence is optional and defaults to 1.0. Label validity is the
/// daemon's business; unknown labels come back as NO_GESTURE.
fn parse_feed_line(line: &str) -> Option<FramePayload> {
    let mut parts = line.split_whitespace();
    let label = parts.next()?.to_string();
    let confidence = match parts.next() {
        Some(raw) => raw.parse::<f32>().ok()?,
        None => 1.0,
    };

    Some(FramePayload::Classification { label, confidence })
}

/// Render one session event from the daemon.
fn print_session_event(message: &ServerMessage) {
    match message {
        ServerMessage::Started => {
            eprintln!("{}", "Recognition started.".green());
        }
        ServerMessage::Stopped => {
            eprintln!("{}", "Recognition stopped.".green());
        }
        ServerMessage::Gesture {
            label,
            confidence,
            command,
            description,
            gesture_sequence,
        } => {
            println!("{} {} ({:.2})", "gesture:".green(), label, confidence);
            println!("  {}", description.dimmed());
            for line in command.lines() {
                println!("  {}", line);
            }
            println!(
                "  {} {}",
                "sequence:".dimmed(),
                gesture_sequence.join(" ")
            );
        }
        ServerMessage::Error { message } => {
            eprintln!("{}", format!("Error: {}", message).red());
        }
        _ => {}
    }
}

/// Drive a live recognition session from stdin.
///
/// Sends one classification frame per input line, paced by `interval_ms`,
/// while a background task prints gesture events as the daemon confirms
/// them.
async fn run_feed(
    socket_path: &Path,
    language: Option<String>,
    interval_ms: u64,
    quiet: bool,
) -> Result<()> {
    let client = match SessionClient::connect(socket_path).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!(
                "{}",
                format!("Failed to communicate with daemon: {}", e).red()
            );
            eprintln!("Is the daemon running? Start it with: gesto daemon");
            std::process::exit(1);
        }
    };

    let (mut reader, mut writer) = client.into_split();

    write_message(&mut writer, &ClientMessage::StartRecognition).await?;

    // Replies arrive out of band, so print them from their own task.
    let printer = tokio::spawn(async move {
        loop {
            match read_message(&mut reader).await {
                Ok(Some(message)) => print_session_event(&message),
                Ok(None) => break,
                Err(e) => {
                    eprintln!("{}", format!("Connection lost: {}", e).red());
                    break;
                }
            }
        }
    });

    if !quiet {
        eprintln!("Reading LABEL CONFIDENCE lines from stdin (Ctrl+D to stop)...");
    }

    let stdin = tokio::io::stdin();
    let mut lines = tokio::io::BufReader::new(stdin).lines();
    let interval = std::time::Duration::from_millis(interval_ms);

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(payload) = parse_feed_line(line) else {
            eprintln!("Skipping malformed line: {}", line);
            continue;
        };

        write_message(
            &mut writer,
            &ClientMessage::Frame {
                payload,
                language: language.clone(),
            },
        )
        .await?;

        tokio::time::sleep(interval).await;
    }

    write_message(&mut writer, &ClientMessage::StopRecognition).await?;

    // Closing the write half lets the daemon finish the session; the
    // printer drains the remaining replies and exits on EOF.
    drop(writer);
    printer.await?;

    Ok(())
}

/// Replay a frame trace from stdin through the offline pipeline.
fn run_pipe(config: Config, language: Option<String>, quiet: bool) -> Result<()> {
    config.validate()?;

    let language = language.unwrap_or_else(|| config.daemon.default_language.clone());
    let classifier = create_classifier(&config.classifier);
    let reporter: Arc<dyn ErrorReporter> = Arc::new(LogReporter);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    let outcome = run_replay(
        stdin.lock(),
        &mut stdout,
        classifier,
        config.stabilizer,
        &language,
        reporter,
    )?;

    if !quiet {
        eprintln!(
            "Processed {} frames ({} skipped), {} gesture events.",
            outcome.frames, outcome.skipped, outcome.events
        );
    }

    Ok(())
}

/// Handle template inspection commands.
fn handle_templates_command(action: TemplatesAction, config: &Config) -> Result<()> {
    match action {
        TemplatesAction::List => {
            for language in LANGUAGES {
                println!("{}:", language);
                for template in templates_for(*language) {
                    println!(
                        "  {:10} {}",
                        template.label.as_str(),
                        template.description.dimmed()
                    );
                }
                println!();
            }
        }
        TemplatesAction::Show { label, language } => {
            let label: GestureLabel = label.parse()?;
            let language: Language = language
                .as_deref()
                .unwrap_or(&config.daemon.default_language)
                .parse()?;

            match get_template(label, language) {
                Some(template) => {
                    println!("{}", template.description.dimmed());
                    println!("{}", template.snippet);
                }
                None => {
                    let err = GestoError::MissingTemplate {
                        label: label.to_string(),
                        language: language.to_string(),
                    };
                    eprintln!("{}", format!("Error: {}", err).red());
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Show => {
            let config = Config::load_or_default(&config_path).with_env_overrides();
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            if config_path.exists() {
                eprintln!("Config file already exists: {}", config_path.display());
                std::process::exit(1);
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, toml::to_string_pretty(&Config::default())?)?;
            println!("Wrote {}", config_path.display());
        }
    }
    Ok(())
}
