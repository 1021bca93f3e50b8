//! Whisper-based speech-to-text transcription
//!
//! Uses whisper.cpp via the whisper-rs crate for fast, local transcription.

use super::Transcriber;
use crate::config::VoiceConfig;
use crate::error::TranscribeError;
use std::path::{Path, PathBuf};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper-based transcriber
pub struct WhisperTranscriber {
    /// Whisper context (holds the model)
    ctx: WhisperContext,
    /// Language for transcription, `None` to auto-detect
    language: Option<String>,
    /// Sample rate of the audio handed to `transcribe`
    sample_rate: u32,
    /// Number of threads to use
    threads: usize,
}

impl WhisperTranscriber {
    /// Create a new whisper transcriber
    pub fn new(config: &VoiceConfig, models_dir: &Path) -> Result<Self, TranscribeError> {
        if config.sample_rate != WHISPER_SAMPLE_RATE {
            return Err(TranscribeError::AudioFormat(format!(
                "Whisper needs {} Hz audio, voice.sample_rate is {}",
                WHISPER_SAMPLE_RATE, config.sample_rate
            )));
        }

        let model_path = resolve_model_path(&config.whisper_model, models_dir)?;

        tracing::info!("Loading whisper model from {:?}", model_path);
        let start = std::time::Instant::now();

        let ctx = WhisperContext::new_with_params(
            model_path
                .to_str()
                .ok_or_else(|| TranscribeError::ModelNotFound("Invalid path".to_string()))?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| TranscribeError::InitFailed(e.to_string()))?;

        tracing::info!("Model loaded in {:.2}s", start.elapsed().as_secs_f32());

        let threads = config
            .threads
            .unwrap_or_else(|| num_cpus::get().min(4));

        Ok(Self {
            ctx,
            language: normalize_language(&config.language),
            sample_rate: config.sample_rate,
            threads,
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, samples: &[f32]) -> Result<String, TranscribeError> {
        if samples.is_empty() {
            return Err(TranscribeError::AudioFormat("Empty audio buffer".to_string()));
        }

        let duration_secs = samples.len() as f32 / self.sample_rate as f32;
        tracing::debug!(
            "Transcribing {:.2}s of audio ({} samples)",
            duration_secs,
            samples.len()
        );

        let start = std::time::Instant::now();

        // Create state for this transcription
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscribeError::InferenceFailed(e.to_string()))?;

        // Configure parameters
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        params.set_language(self.language.as_deref());
        params.set_n_threads(self.threads as i32);

        // Disable output we don't need
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        // Improve transcription quality
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);

        // For short recordings, use single segment mode
        if duration_secs < 30.0 {
            params.set_single_segment(true);
        }

        // Optimize context window for short clips
        if let Some(audio_ctx) = calculate_audio_ctx(duration_secs) {
            params.set_audio_ctx(audio_ctx);
            tracing::debug!("Using audio_ctx={} for {:.2}s clip", audio_ctx, duration_secs);
        }

        // Run inference
        state
            .full(params, samples)
            .map_err(|e| TranscribeError::InferenceFailed(e.to_string()))?;

        // Collect all segments using iterator API
        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(
                segment
                    .to_str()
                    .map_err(|e| TranscribeError::InferenceFailed(e.to_string()))?,
            );
        }

        let result = text.trim().to_string();

        tracing::info!(
            "Transcription completed in {:.2}s: {:?}",
            start.elapsed().as_secs_f32(),
            if result.chars().count() > 50 {
                format!("{}...", result.chars().take(50).collect::<String>())
            } else {
                result.clone()
            }
        );

        Ok(result)
    }
}

/// Whisper models are trained on 16 kHz audio
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// "auto" or an empty language means auto-detection
fn normalize_language(language: &str) -> Option<String> {
    let language = language.trim();
    if language.is_empty() || language.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(language.to_string())
    }
}

/// Resolve model name to file path
pub fn resolve_model_path(model: &str, models_dir: &Path) -> Result<PathBuf, TranscribeError> {
    // If it's already an absolute path, use it directly
    let path = PathBuf::from(model);
    if path.is_absolute() && path.exists() {
        return Ok(path);
    }

    // Map model names to file names
    let filename = match model_filename(model) {
        Some(name) => name,
        None => {
            return Err(TranscribeError::ModelNotFound(format!(
                "Unknown model: '{}'. Valid models: tiny, base, small, medium, large-v3, large-v3-turbo",
                model
            )));
        }
    };

    // Look in the data directory
    let model_path = models_dir.join(filename);

    if model_path.exists() {
        return Ok(model_path);
    }

    // Also check current directory
    let cwd_path = PathBuf::from(filename);
    if cwd_path.exists() {
        return Ok(cwd_path);
    }

    // Also check ./models/
    let local_models_path = PathBuf::from("models").join(filename);
    if local_models_path.exists() {
        return Ok(local_models_path);
    }

    Err(TranscribeError::ModelNotFound(format!(
        "Model '{}' not found. Looked in:\n  - {}\n  - {}\n  - {}\n\nDownload from: {}",
        model,
        model_path.display(),
        cwd_path.display(),
        local_models_path.display(),
        get_model_url(model)
    )))
}

/// Calculate audio_ctx parameter for short clips (≤22.5s).
/// Formula: duration_seconds * 50 + 64
fn calculate_audio_ctx(duration_secs: f32) -> Option<i32> {
    if duration_secs <= 22.5 {
        Some((duration_secs * 50.0) as i32 + 64)
    } else {
        None
    }
}

/// Map a model name to its ggml file name
///
/// Names already ending in `.bin` are used as-is.
fn model_filename(model: &str) -> Option<&str> {
    let name = match model {
        "tiny" => "ggml-tiny.bin",
        "tiny.en" => "ggml-tiny.en.bin",
        "base" => "ggml-base.bin",
        "base.en" => "ggml-base.en.bin",
        "small" => "ggml-small.bin",
        "small.en" => "ggml-small.en.bin",
        "medium" => "ggml-medium.bin",
        "medium.en" => "ggml-medium.en.bin",
        "large" | "large-v1" => "ggml-large-v1.bin",
        "large-v2" => "ggml-large-v2.bin",
        "large-v3" => "ggml-large-v3.bin",
        "large-v3-turbo" => "ggml-large-v3-turbo.bin",
        other if other.ends_with(".bin") => other,
        _ => return None,
    };
    Some(name)
}

/// Get the download URL for a model
pub fn get_model_url(model: &str) -> String {
    let filename = model_filename(model).unwrap_or(model);

    format!(
        "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
        filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_url() {
        let url = get_model_url("base.en");
        assert!(url.contains("ggml-base.en.bin"));
        assert!(url.contains("huggingface.co"));
    }

    #[test]
    fn test_model_filename() {
        assert_eq!(model_filename("base"), Some("ggml-base.bin"));
        assert_eq!(model_filename("large"), Some("ggml-large-v1.bin"));
        assert_eq!(model_filename("custom.bin"), Some("custom.bin"));
        assert_eq!(model_filename("huge"), None);
    }

    #[test]
    fn test_resolve_model_in_models_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-base.bin");
        std::fs::write(&path, b"not really a model").unwrap();
        assert_eq!(resolve_model_path("base", dir.path()).unwrap(), path);
    }

    #[test]
    fn test_resolve_missing_model_names_download_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_model_path("tiny.en", dir.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ggml-tiny.en.bin"));
        assert!(message.contains("huggingface.co"));
    }

    #[test]
    fn test_resolve_unknown_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_model_path("enormous", dir.path()).unwrap_err();
        assert!(err.to_string().contains("Unknown model"));
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("auto"), None);
        assert_eq!(normalize_language(" "), None);
        assert_eq!(normalize_language("en"), Some("en".to_string()));
    }

    #[test]
    fn test_audio_ctx_only_for_short_clips() {
        assert_eq!(calculate_audio_ctx(2.0), Some(164));
        assert_eq!(calculate_audio_ctx(30.0), None);
    }

    #[test]
    fn test_rejects_non_16khz_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = VoiceConfig {
            sample_rate: 8000,
            ..Default::default()
        };
        let err = WhisperTranscriber::new(&config, dir.path()).err().unwrap();
        assert!(matches!(err, TranscribeError::AudioFormat(_)));
    }
}
