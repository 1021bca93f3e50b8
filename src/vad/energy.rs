//! Energy-based Voice Activity Detection
//!
//! A simple but effective classifier that uses RMS energy to label each
//! frame. Works without external model downloads.

use super::FrameClassifier;

/// Energy-based frame classifier using RMS amplitude analysis
///
/// Frames whose RMS energy (normalized to 0.0 - 1.0) reaches the threshold
/// are considered speech.
#[derive(Debug, Clone)]
pub struct EnergyClassifier {
    threshold: f32,
}

impl EnergyClassifier {
    /// Create a classifier for an aggressiveness level of 0 to 3
    pub fn new(aggressiveness: u8) -> Self {
        Self {
            threshold: map_aggressiveness_to_energy(aggressiveness),
        }
    }

    /// Calculate normalized RMS energy of a sample slice
    fn calculate_rms(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_squares: f32 = samples
            .iter()
            .map(|&s| {
                let v = s as f32 / 32768.0;
                v * v
            })
            .sum();
        (sum_squares / samples.len() as f32).sqrt()
    }
}

/// Map aggressiveness (0-3) to an energy threshold
///
/// - 0 = very sensitive (~0.001, picks up whispers and room noise)
/// - 2 = balanced (~0.01, filters silence, allows quiet speech)
/// - 3 = strict (~0.03, requires clear speech)
fn map_aggressiveness_to_energy(aggressiveness: u8) -> f32 {
    // Exponential mapping onto 0.001 - 0.1
    let t = (aggressiveness.min(3) as f32 / 4.0).clamp(0.0, 1.0);
    0.001 * (100.0_f32).powf(t)
}

impl FrameClassifier for EnergyClassifier {
    fn is_speech(&self, frame: &[i16]) -> bool {
        let rms = Self::calculate_rms(frame);
        tracing::trace!("frame rms={:.4} threshold={:.4}", rms, self.threshold);
        rms >= self.threshold && rms > 0.0
    }
}
