//! Voice Activity Detection (VAD) module
//!
//! Labels short audio frames as speech or silence. The recorder uses these
//! per-frame decisions to decide when the speaker has stopped talking.

mod energy;

pub use energy::EnergyClassifier;

use crate::config::VoiceConfig;

/// Trait for per-frame voice activity classifiers
pub trait FrameClassifier {
    /// Whether a frame of 16-bit mono samples contains speech
    fn is_speech(&self, frame: &[i16]) -> bool;
}

/// Create the frame classifier for the configured aggressiveness
pub fn create_classifier(config: &VoiceConfig) -> Box<dyn FrameClassifier> {
    Box::new(EnergyClassifier::new(config.aggressiveness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_classifier_from_default_config() {
        let classifier = create_classifier(&VoiceConfig::default());
        assert!(!classifier.is_speech(&[0i16; 480]));
        assert!(classifier.is_speech(&[12_000i16; 480]));
    }
}
