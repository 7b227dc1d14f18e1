//! Error types for gesto.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GestoError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Recognition errors
    #[error("Unsupported target language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("No {language} template for gesture {label}")]
    MissingTemplate { label: String, language: String },

    #[error("Invalid classification: {message}")]
    InvalidClassification { message: String },

    #[error("Classifier error: {message}")]
    Classifier { message: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl GestoError {
    /// Recoverable errors leave the session usable; the caller reports them
    /// and keeps going. Everything else tears the operation down.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GestoError::UnsupportedLanguage { .. }
                | GestoError::MissingTemplate { .. }
                | GestoError::InvalidClassification { .. }
                | GestoError::Classifier { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, GestoError>;
