//! Spoken prompts: record until silence, then transcribe

use crate::audio::{self, SilenceCutoff};
use crate::config::VoiceConfig;
use crate::error::LinwispError;
use crate::transcribe::{self, Transcriber};
use crate::vad;
use std::path::PathBuf;

/// Trait for spoken prompt sources
pub trait VoiceInput {
    /// Get ready to listen, e.g. load a model. Called before any notice
    /// that recording has started.
    fn prepare(&mut self) -> Result<(), LinwispError> {
        Ok(())
    }

    /// Record one utterance and return its text
    fn listen(&mut self) -> Result<String, LinwispError>;

    /// Pick up voice settings reloaded from the config file
    fn reconfigure(&mut self, _config: &VoiceConfig) {}
}

/// Microphone plus local Whisper transcription
///
/// The model is loaded on first use and kept for the life of the value.
pub struct VoicePrompt {
    config: VoiceConfig,
    models_dir: PathBuf,
    transcriber: Option<Box<dyn Transcriber>>,
}

impl VoicePrompt {
    pub fn new(config: VoiceConfig, models_dir: PathBuf) -> Self {
        Self {
            config,
            models_dir,
            transcriber: None,
        }
    }

    fn transcriber(&mut self) -> Result<&dyn Transcriber, LinwispError> {
        let loaded = match self.transcriber.take() {
            Some(t) => t,
            None => transcribe::create_transcriber(&self.config, &self.models_dir)?,
        };
        Ok(&**self.transcriber.insert(loaded))
    }
}

impl VoiceInput for VoicePrompt {
    fn prepare(&mut self) -> Result<(), LinwispError> {
        self.transcriber()?;
        Ok(())
    }

    fn listen(&mut self) -> Result<String, LinwispError> {
        let classifier = vad::create_classifier(&self.config);
        let cutoff = SilenceCutoff::from_config(&self.config);

        let samples = {
            let mut capture = audio::create_capture(&self.config)?;
            audio::record_until_silence(capture.as_mut(), classifier.as_ref(), cutoff)?
        };
        tracing::info!(
            "Recorded {:.2}s of audio",
            samples.len() as f32 / self.config.sample_rate as f32
        );

        let text = self.transcriber()?.transcribe(&samples)?;
        Ok(text)
    }

    /// Replace the voice settings, dropping a loaded model if they affect it
    fn reconfigure(&mut self, config: &VoiceConfig) {
        if self.config == *config {
            return;
        }
        if self.config.whisper_model != config.whisper_model
            || self.config.language != config.language
            || self.config.threads != config.threads
            || self.config.sample_rate != config.sample_rate
        {
            tracing::debug!("Voice settings changed, whisper model will be reloaded");
            self.transcriber = None;
        }
        self.config = config.clone();
    }
}
