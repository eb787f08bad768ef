//! Spectrum analyser configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ReactorError, Result};

/// Byte-spectrum analyser configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size (power of 2, 32..=32768); bin count is half of this
    pub fft_size: usize,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,

    /// Temporal smoothing between analyses, in [0, 1]
    pub smoothing_time_constant: f32,

    /// Video frame rate used to step file playback (frames per second)
    pub frame_rate: u32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing_time_constant: 0.8,
            frame_rate: 60,
        }
    }
}

impl AnalyserConfig {
    /// Number of frequency bins produced per analysis
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ReactorError::Config(format!(
                "FFT size must be a power of 2 in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ReactorError::Config(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ReactorError::Config(format!(
                "smoothing_time_constant must be in [0, 1], got {}",
                self.smoothing_time_constant
            )));
        }
        if self.frame_rate == 0 {
            return Err(ReactorError::Config("frame rate must be > 0".to_string()));
        }
        Ok(())
    }
}
