//! Deterministic WAV file playback, one video frame per poll.

use std::path::Path;

use tracing::debug;

use super::{SpectrumAnalyser, SpectrumSample, SpectrumSource};
use crate::error::Result;
use crate::params::AnalyserConfig;

/// Spectrum source that steps through a decoded WAV file
///
/// Each poll advances `sample_rate / frame_rate` samples and analyses the
/// window ending at the play cursor. Unavailable before the first full
/// window and once the cursor passes the end of the file.
pub struct WavSource {
    samples: Vec<f32>,
    sample_rate: u32,
    hop: usize,
    cursor: usize,
    analyser: SpectrumAnalyser,
}

impl WavSource {
    /// Decode `path` to mono and prepare playback
    pub fn open(path: impl AsRef<Path>, config: AnalyserConfig) -> Result<Self> {
        let reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        debug!(
            path = ?path.as_ref(),
            sample_rate = spec.sample_rate,
            frames = samples.len(),
            "decoded WAV"
        );

        Self::from_samples(samples, spec.sample_rate, config)
    }

    /// Play back already-decoded mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, config: AnalyserConfig) -> Result<Self> {
        let analyser = SpectrumAnalyser::new(config)?;
        let hop = (sample_rate / config.frame_rate).max(1) as usize;
        Ok(Self {
            samples,
            sample_rate,
            hop,
            cursor: 0,
            analyser,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples advanced per poll
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Whether the play cursor has passed the end of the file
    pub fn is_finished(&self) -> bool {
        self.cursor > self.samples.len()
    }
}

impl SpectrumSource for WavSource {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn frequency_data(&mut self) -> Option<SpectrumSample<'_>> {
        self.cursor += self.hop;
        let window = self.analyser.config().fft_size;
        if self.cursor < window || self.cursor > self.samples.len() {
            return None;
        }
        let bytes = self
            .analyser
            .analyse(&self.samples[self.cursor - window..self.cursor]);
        Some(SpectrumSample::new(bytes))
    }

    fn is_exhausted(&self) -> bool {
        self.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_until_full_window() {
        let config = AnalyserConfig::default();
        // 44100 / 60 = 735 samples per frame, window 1024 needs two frames
        let mut source = WavSource::from_samples(vec![0.0; 44100], 44100, config).unwrap();
        assert_eq!(source.hop(), 735);
        assert!(source.frequency_data().is_none());
        assert!(source.frequency_data().is_some());
    }

    #[test]
    fn test_finishes_at_end_of_file() {
        let config = AnalyserConfig::default();
        let mut source = WavSource::from_samples(vec![0.0; 2000], 44100, config).unwrap();
        let available: usize = (0..10)
            .filter(|_| source.frequency_data().is_some())
            .count();
        assert_eq!(available, 1);
        assert!(source.is_finished());
    }
}
