//! Error types for linwisp
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the linwisp application
#[derive(Error, Debug)]
pub enum LinwispError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API key is required. Set it using --apikey.")]
    MissingCredential,

    #[error("Model is required. Set it using --model or edit config.toml.")]
    MissingModel,

    #[error("Secret store error: {0}")]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Audio capture error: {0}")]
    Audio(#[from] AudioError),

    #[error("Transcription error: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("Presentation error: {0}")]
    Present(#[from] PresentError),
}

/// Errors related to the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Cannot determine the user configuration directory. Pass --config explicitly.")]
    NoConfigDir,
}

/// Errors related to API key storage
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Failed to access key file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
}

/// Transport-level or non-success failure from the completion endpoint
///
/// The diagnostic carries whatever the transport reported: the status code
/// and response body, or the network error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Request failed: {diagnostic}")]
pub struct RequestError {
    pub diagnostic: String,
}

impl RequestError {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        Self {
            diagnostic: diagnostic.into(),
        }
    }
}

/// Errors related to audio capture
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio connection failed: {0}")]
    Connection(String),

    #[error("Audio device not found: '{0}'. List devices with: pactl list sources short")]
    DeviceNotFound(String),

    #[error("Audio device '{requested}' not found.\n{available}")]
    DeviceNotFoundWithList { requested: String, available: String },

    #[error("No audio was captured. Check your microphone.")]
    EmptyRecording,

    #[error("Audio stream error: {0}")]
    StreamError(String),
}

/// Errors related to speech-to-text transcription
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Whisper initialization failed: {0}")]
    InitFailed(String),

    #[error("Transcription failed: {0}")]
    InferenceFailed(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),
}

/// Errors related to dialogs and speech output
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("{0} not found in PATH. Install it via your package manager.")]
    CommandNotFound(String),

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Console I/O failed: {0}")]
    Console(#[from] std::io::Error),
}

/// Result type alias using LinwispError
pub type Result<T> = std::result::Result<T, LinwispError>;

impl From<keyring::Error> for SecretError {
    fn from(e: keyring::Error) -> Self {
        SecretError::Keyring(e.to_string())
    }
}
