//! Audio capture module
//!
//! Provides microphone recording using cpal, which works with PipeWire,
//! PulseAudio, and ALSA backends, and the silence-terminated recorder
//! that turns a stream of frames into a finished utterance.

pub mod cpal_capture;
mod recorder;

pub use cpal_capture::CpalCapture;
pub use recorder::{record_until_silence, SilenceCutoff};

use crate::config::VoiceConfig;
use crate::error::AudioError;

/// Trait for sources of fixed-size mono audio frames
pub trait FrameSource {
    /// Read the next frame of 16-bit samples
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    fn read_frame(&mut self) -> Result<Option<Vec<i16>>, AudioError>;
}

/// Number of samples in one frame for the configured rate and duration
pub fn frame_len(config: &VoiceConfig) -> usize {
    (config.sample_rate as usize * config.frame_ms as usize) / 1000
}

/// Factory function to open the configured microphone
pub fn create_capture(config: &VoiceConfig) -> Result<Box<dyn FrameSource>, AudioError> {
    Ok(Box::new(CpalCapture::open(config)?))
}
