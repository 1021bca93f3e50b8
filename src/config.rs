//! Configuration loading and types for linwisp
//!
//! Configuration is layered:
//! 1. Built-in defaults (written to disk on first use)
//! 2. Config file (~/.config/linwisp/config.toml)
//! 3. CLI arguments (`--model`, `--gui`), persisted back to the file

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Base URL of the completion provider
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Provider model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Present prompts and answers through dialogs instead of the console
    #[serde(default)]
    pub gui: bool,

    /// Completion endpoint settings
    #[serde(default)]
    pub request: RequestConfig,

    /// Spoken prompt capture and transcription
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Spoken answers
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RequestConfig {
    /// Base URL; the model path and query are appended to it
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Voice capture and speech-to-text configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VoiceConfig {
    /// Input device name, or "default"
    #[serde(default = "default_device")]
    pub device: String,

    /// Sample rate in Hz (whisper expects 16000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Length of one classified frame (10, 20 or 30 ms)
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,

    /// Speech classifier aggressiveness, 0 (lenient) to 3 (strict)
    #[serde(default = "default_aggressiveness")]
    pub aggressiveness: u8,

    /// Trailing silence that ends a recording
    #[serde(default = "default_silence_timeout")]
    pub silence_timeout_secs: f32,

    /// Safety limit for a single recording
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,

    /// Whisper model name (tiny, base, small, ...) or path to a .bin file
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,

    /// Transcription language, "auto" to detect
    #[serde(default = "default_language")]
    pub language: String,

    /// Number of threads for inference (None = auto-detect)
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Speech synthesizer configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SpeechConfig {
    /// Synthesizer binary
    #[serde(default = "default_speech_command")]
    pub command: String,

    /// Words per minute
    #[serde(default = "default_speech_rate")]
    pub rate: u32,

    /// Voice name
    #[serde(default = "default_speech_voice")]
    pub voice: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_frame_ms() -> u32 {
    30
}

fn default_aggressiveness() -> u8 {
    2
}

fn default_silence_timeout() -> f32 {
    1.0
}

fn default_max_duration() -> u32 {
    60
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_speech_command() -> String {
    "espeak".to_string()
}

fn default_speech_rate() -> u32 {
    150
}

fn default_speech_voice() -> String {
    "en-us".to_string()
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            frame_ms: default_frame_ms(),
            aggressiveness: default_aggressiveness(),
            silence_timeout_secs: default_silence_timeout(),
            max_duration_secs: default_max_duration(),
            whisper_model: default_whisper_model(),
            language: default_language(),
            threads: None,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: default_speech_command(),
            rate: default_speech_rate(),
            voice: default_speech_voice(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            gui: false,
            request: RequestConfig::default(),
            voice: VoiceConfig::default(),
            speech: SpeechConfig::default(),
        }
    }
}

impl Config {
    /// Reject values the capture pipeline cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let voice = &self.voice;
        if voice.aggressiveness > 3 {
            return Err(ConfigError::Invalid {
                key: "voice.aggressiveness",
                message: format!("expected 0-3, got {}", voice.aggressiveness),
            });
        }
        if ![10, 20, 30].contains(&voice.frame_ms) {
            return Err(ConfigError::Invalid {
                key: "voice.frame_ms",
                message: format!("expected 10, 20 or 30, got {}", voice.frame_ms),
            });
        }
        if voice.sample_rate == 0 {
            return Err(ConfigError::Invalid {
                key: "voice.sample_rate",
                message: "must be greater than zero".to_string(),
            });
        }
        if !voice.silence_timeout_secs.is_finite() || voice.silence_timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "voice.silence_timeout_secs",
                message: format!("must be positive, got {}", voice.silence_timeout_secs),
            });
        }
        Ok(())
    }
}

/// Per-user locations, resolved once at startup and passed to the stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// config.toml
    pub config_file: PathBuf,
    /// Plain-text API key used when no platform secret manager is available
    pub key_file: PathBuf,
    /// Whisper models
    pub models_dir: PathBuf,
    /// Ephemeral files (tray lock)
    pub runtime_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the standard per-user directories
    ///
    /// An explicit config path moves the key file next to it, so one
    /// `--config` keeps a whole profile together.
    pub fn discover(config_override: Option<&Path>) -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from("", "", "linwisp");

        let config_dir = match config_override {
            Some(path) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            None => dirs
                .as_ref()
                .map(|d| d.config_dir().to_path_buf())
                .ok_or(ConfigError::NoConfigDir)?,
        };

        let config_file = config_override
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let models_dir = dirs
            .as_ref()
            .map(|d| d.data_dir().join("models"))
            .unwrap_or_else(|| PathBuf::from("models"));

        Ok(Self {
            key_file: config_dir.join("api_key"),
            config_file,
            models_dir,
            runtime_dir: runtime_dir(),
        })
    }

    /// Keep everything under one directory (tests, portable installs)
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join("config.toml"),
            key_file: dir.join("api_key"),
            models_dir: dir.join("models"),
            runtime_dir: dir.join("run"),
        }
    }
}

/// Get the runtime directory for ephemeral files
fn runtime_dir() -> PathBuf {
    // Use XDG_RUNTIME_DIR if available, otherwise fall back to the temp dir
    std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir())
        .join("linwisp")
}

/// Reads and writes config.toml
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(paths: &AppPaths) -> Self {
        Self::at_path(&paths.config_file)
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration, writing the defaults first on a fresh install
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            tracing::info!("No config at {:?}, writing defaults", self.path);
            self.save(&Config::default())?;
        }

        tracing::debug!("Loading config from {:?}", self.path);
        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.display().to_string(),
            source,
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save the full configuration, replacing the file in one rename
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!("Saved config to {:?}", self.path);
        Ok(())
    }
}
