//! Text-to-speech output

use crate::config::SpeechConfig;
use crate::error::PresentError;
use std::process::{Command, Stdio};

/// Trait for speech synthesizers
pub trait Speaker: Send + Sync {
    /// Speak `text`, blocking until done
    fn speak(&self, text: &str) -> Result<(), PresentError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// espeak (or a compatible binary taking `-s <rate> -v <voice> <text>`)
#[derive(Debug, Clone)]
pub struct Espeak {
    command: String,
    rate: u32,
    voice: String,
}

impl Espeak {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            command: config.command.clone(),
            rate: config.rate,
            voice: config.voice.clone(),
        }
    }

    fn args(&self, text: &str) -> Vec<String> {
        vec![
            "-s".to_string(),
            self.rate.to_string(),
            "-v".to_string(),
            self.voice.clone(),
            text.to_string(),
        ]
    }
}

impl Speaker for Espeak {
    fn speak(&self, text: &str) -> Result<(), PresentError> {
        let program = which::which(&self.command)
            .map_err(|_| PresentError::CommandNotFound(self.command.clone()))?;

        let output = Command::new(program)
            .args(self.args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PresentError::CommandFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PresentError::CommandFailed {
                command: self.command.clone(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        tracing::debug!("Spoke {} chars", text.chars().count());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "espeak"
    }
}
