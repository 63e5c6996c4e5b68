//! Error types and Result aliases for menuterm

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for menuterm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for menuterm
#[derive(Debug, Error)]
pub enum Error {
    // === Menu errors ===
    /// Menu path does not satisfy the `/lower/case/` shape
    #[error("Invalid menu path '{path}': {reason}")]
    InvalidMenuPath { path: String, reason: String },

    /// A command or submenu was registered twice on the same node
    #[error("Command '{command}' is already registered on {path}")]
    DuplicateCommand { path: String, command: String },

    // === Routine errors ===
    /// Routine file does not exist
    #[error("Routine file '{}' not found", path.display())]
    RoutineNotFound { path: PathBuf },

    /// Routine file is empty after filtering comments
    #[error("Routine file '{}' contains no commands", path.display())]
    EmptyRoutine { path: PathBuf },

    // === Recording errors ===
    /// Routine hub rejected or failed an upload
    #[error("Routine upload failed: {0}")]
    Hub(String),

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Configuration file not found
    #[error("Configuration file not found")]
    ConfigNotFound,

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    /// Failed to serialize configuration
    #[error("Failed to serialize config as {format}: {reason}")]
    ConfigSerializationFailed { format: String, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    // === I/O and serialization errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Regex compilation errors
    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// HTTP transport errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors
    #[error("Line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    #[error("Error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}

/// Recoverable outcomes of dispatching one input line.
///
/// None of these are fatal: the engine prints a message and treats the
/// line as a no-op for this turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The leading token is not a choice of the current menu
    #[error("command '{command}' not found")]
    NotFound { command: String },

    /// `-h/--help` was requested and usage has been printed
    #[error("help requested")]
    HelpRequested,

    /// Flags could not be parsed; usage or the reason has been printed
    #[error("failed to parse arguments: {reason}")]
    ParseFailed { reason: String },
}
