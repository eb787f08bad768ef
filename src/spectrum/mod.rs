//! Frequency spectrum snapshots and the sources that produce them.
//!
//! The engine consumes spectra through [`SpectrumSource`], a synchronous
//! poll: each frame takes whatever sample is currently available and never
//! waits for the audio pipeline.

mod analyser;
mod capture;
mod wav;

pub use analyser::{blackman_window, SpectrumAnalyser};
pub use capture::MicrophoneSource;
pub use wav::WavSource;

/// Immutable snapshot of byte-normalised frequency magnitudes for one frame
#[derive(Debug, Clone, Copy)]
pub struct SpectrumSample<'a> {
    bins: &'a [u8],
}

impl<'a> SpectrumSample<'a> {
    pub fn new(bins: &'a [u8]) -> Self {
        Self { bins }
    }

    /// Number of bins (fixed per audio session)
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn bins(&self) -> &'a [u8] {
        self.bins
    }

    /// Magnitude of `bin` re-sampled to [0, 1]
    ///
    /// The index is clamped to the last bin; an empty sample reads as 0.
    pub fn magnitude(&self, bin: usize) -> f32 {
        match self.bins.len() {
            0 => 0.0,
            len => self.bins[bin.min(len - 1)] as f32 / 255.0,
        }
    }
}

/// Producer of per-frame spectra (microphone, file playback, test fixtures)
pub trait SpectrumSource {
    /// Bin count of every sample this source yields
    fn frequency_bin_count(&self) -> usize;

    /// Latest sample, or `None` while no sample is available
    fn frequency_data(&mut self) -> Option<SpectrumSample<'_>>;

    /// Whether the source will never produce another sample
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Source that replays one fixed spectrum every frame
#[derive(Debug, Clone)]
pub struct ConstantSpectrum {
    bins: Vec<u8>,
}

impl ConstantSpectrum {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    /// `bin_count` bins all at `level`
    pub fn filled(bin_count: usize, level: u8) -> Self {
        Self::new(vec![level; bin_count])
    }

    pub fn bins_mut(&mut self) -> &mut [u8] {
        &mut self.bins
    }
}

impl SpectrumSource for ConstantSpectrum {
    fn frequency_bin_count(&self) -> usize {
        self.bins.len()
    }

    fn frequency_data(&mut self) -> Option<SpectrumSample<'_>> {
        Some(SpectrumSample::new(&self.bins))
    }
}

/// Source that never has a sample (audio not started yet)
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSource {
    pub bin_count: usize,
}

impl SpectrumSource for SilentSource {
    fn frequency_bin_count(&self) -> usize {
        self.bin_count
    }

    fn frequency_data(&mut self) -> Option<SpectrumSample<'_>> {
        None
    }
}
