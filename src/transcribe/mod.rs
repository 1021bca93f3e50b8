//! Speech-to-text transcription module
//!
//! Provides transcription via local whisper.cpp inference (whisper-rs crate).

pub mod whisper;

use crate::config::VoiceConfig;
use crate::error::TranscribeError;
use std::path::Path;

/// Trait for speech-to-text implementations
pub trait Transcriber: Send + Sync {
    /// Transcribe audio samples to text
    /// Input: f32 samples, mono, 16kHz
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscribeError>;
}

/// Factory function to load the configured whisper model
pub fn create_transcriber(
    config: &VoiceConfig,
    models_dir: &Path,
) -> Result<Box<dyn Transcriber>, TranscribeError> {
    tracing::info!(
        "Creating transcriber: model={}, language={}",
        config.whisper_model,
        config.language
    );
    Ok(Box::new(whisper::WhisperTranscriber::new(config, models_dir)?))
}
