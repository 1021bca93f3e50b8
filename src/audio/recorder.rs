//! Silence-terminated recording
//!
//! Pulls frames from a [`FrameSource`], keeps a rolling window of recent
//! speech decisions, and stops once the window is full and none of its
//! frames held speech.

use super::FrameSource;
use crate::config::VoiceConfig;
use crate::error::AudioError;
use crate::vad::FrameClassifier;
use std::collections::VecDeque;

/// When to stop listening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SilenceCutoff {
    /// Frames in the rolling silence window
    pub window: usize,
    /// Hard cap on the recording length, in frames
    pub max_frames: usize,
}

impl SilenceCutoff {
    pub fn from_config(config: &VoiceConfig) -> Self {
        let frame_ms = config.frame_ms.max(1) as f32;
        let window = ((config.silence_timeout_secs * 1000.0) / frame_ms) as usize;
        let max_frames = (config.max_duration_secs as usize * 1000) / frame_ms as usize;
        Self {
            window: window.max(1),
            max_frames: max_frames.max(1),
        }
    }
}

/// Record until the speaker goes quiet
///
/// Returns every captured sample normalized to -1.0..1.0. Silence that
/// precedes any speech also ends the recording once the window fills.
pub fn record_until_silence(
    source: &mut dyn FrameSource,
    classifier: &dyn FrameClassifier,
    cutoff: SilenceCutoff,
) -> Result<Vec<f32>, AudioError> {
    let mut window: VecDeque<bool> = VecDeque::with_capacity(cutoff.window);
    let mut samples: Vec<f32> = Vec::new();
    let mut frames = 0usize;

    while let Some(frame) = source.read_frame()? {
        samples.extend(frame.iter().map(|&s| s as f32 / 32768.0));
        frames += 1;

        if window.len() == cutoff.window {
            window.pop_front();
        }
        window.push_back(classifier.is_speech(&frame));

        if window.len() == cutoff.window && !window.iter().any(|&speech| speech) {
            tracing::debug!("Silence detected after {} frames", frames);
            break;
        }
        if frames >= cutoff.max_frames {
            tracing::info!("Maximum recording length reached, stopping");
            break;
        }
    }

    if samples.is_empty() {
        return Err(AudioError::EmptyRecording);
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of frames
    struct Scripted {
        frames: VecDeque<Vec<i16>>,
        reads: usize,
    }

    impl Scripted {
        fn new(pattern: &[bool]) -> Self {
            let frames = pattern
                .iter()
                .map(|&loud| vec![if loud { 1000 } else { 0 }; 4])
                .collect();
            Self { frames, reads: 0 }
        }
    }

    impl FrameSource for Scripted {
        fn read_frame(&mut self) -> Result<Option<Vec<i16>>, AudioError> {
            self.reads += 1;
            Ok(self.frames.pop_front())
        }
    }

    struct NonZero;

    impl FrameClassifier for NonZero {
        fn is_speech(&self, frame: &[i16]) -> bool {
            frame.iter().any(|&s| s != 0)
        }
    }

    fn cutoff(window: usize) -> SilenceCutoff {
        SilenceCutoff {
            window,
            max_frames: 1000,
        }
    }

    #[test]
    fn test_stops_after_full_silent_window() {
        let mut src = Scripted::new(&[true, true, false, false, false, true, true]);
        let samples = record_until_silence(&mut src, &NonZero, cutoff(3)).unwrap();
        assert_eq!(samples.len(), 5 * 4);
        assert_eq!(src.reads, 5);
    }

    #[test]
    fn test_short_pause_does_not_stop() {
        let mut src = Scripted::new(&[true, false, false, true, false, false, false]);
        let samples = record_until_silence(&mut src, &NonZero, cutoff(3)).unwrap();
        assert_eq!(samples.len(), 7 * 4);
    }

    #[test]
    fn test_leading_silence_ends_once_window_fills() {
        let mut src = Scripted::new(&[false; 10]);
        let samples = record_until_silence(&mut src, &NonZero, cutoff(4)).unwrap();
        assert_eq!(samples.len(), 4 * 4);
    }

    #[test]
    fn test_max_frames_caps_recording() {
        let mut src = Scripted::new(&[true; 50]);
        let limit = SilenceCutoff {
            window: 3,
            max_frames: 10,
        };
        let samples = record_until_silence(&mut src, &NonZero, limit).unwrap();
        assert_eq!(samples.len(), 10 * 4);
    }

    #[test]
    fn test_exhausted_source_returns_what_was_read() {
        let mut src = Scripted::new(&[true, true]);
        let samples = record_until_silence(&mut src, &NonZero, cutoff(3)).unwrap();
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn test_empty_source_is_an_error() {
        let mut src = Scripted::new(&[]);
        let err = record_until_silence(&mut src, &NonZero, cutoff(3)).unwrap_err();
        assert!(matches!(err, AudioError::EmptyRecording));
    }

    #[test]
    fn test_samples_are_normalized() {
        let mut src = Scripted::new(&[true]);
        let samples = record_until_silence(&mut src, &NonZero, cutoff(1)).unwrap();
        assert!((samples[0] - 1000.0 / 32768.0).abs() < 1e-6);
    }

    #[test]
    fn test_cutoff_from_default_config() {
        let cutoff = SilenceCutoff::from_config(&VoiceConfig::default());
        // 1.0 s of 30 ms frames
        assert_eq!(cutoff.window, 33);
        assert_eq!(cutoff.max_frames, 2000);
    }

    #[test]
    fn test_cutoff_window_never_zero() {
        let config = VoiceConfig {
            silence_timeout_secs: 0.001,
            ..Default::default()
        };
        assert_eq!(SilenceCutoff::from_config(&config).window, 1);
    }
}
