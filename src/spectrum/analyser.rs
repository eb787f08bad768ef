//! Byte-spectrum analysis of a sample window.
//!
//! Produces the same shape of data an audio analyser node hands out: one
//! byte per bin, linear in decibels between the configured floor and
//! ceiling, with temporal smoothing across successive analyses.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::Result;
use crate::params::AnalyserConfig;

/// FFT analyser producing `fft_size / 2` byte magnitudes
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    config: AnalyserConfig,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes carried between analyses
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
}

impl SpectrumAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;

        let size = config.fft_size;
        let fft = FftPlanner::new().plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            window: (0..size).map(|i| blackman_window(i, size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            smoothed: vec![0.0; config.bin_count()],
            bytes: vec![0; config.bin_count()],
            fft,
            config,
        })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    pub fn bin_count(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes from the most recent analysis
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
    }

    /// Analyse the newest `fft_size` samples of `samples`
    ///
    /// Shorter input is zero-padded at the front (older side).
    pub fn analyse(&mut self, samples: &[f32]) -> &[u8] {
        let size = self.config.fft_size;
        let take = samples.len().min(size);
        let pad = size - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let min_db = self.config.min_decibels;
        let range_db = self.config.max_decibels - min_db;
        let norm = 1.0 / size as f32;

        for (bin, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .enumerate()
        {
            let magnitude = self.buffer[bin].norm() * norm;
            let mut next = tau * *smoothed + (1.0 - tau) * magnitude;
            if !next.is_finite() {
                next = 0.0;
            }
            *smoothed = next;
            *byte = decibels_to_byte(linear_to_decibels(next), min_db, range_db);
        }

        &self.bytes
    }
}

/// Blackman window coefficient (alpha = 0.16) at `index` of a `size`-point window
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let phase = 2.0 * PI * index as f32 / size as f32;
    0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
}

fn linear_to_decibels(value: f32) -> f32 {
    if value <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * value.log10()
    }
}

fn decibels_to_byte(db: f32, min_db: f32, range_db: f32) -> u8 {
    let scaled = (255.0 / range_db) * (db - min_db);
    if scaled.is_nan() {
        return 0;
    }
    scaled.floor().clamp(0.0, 255.0) as u8
}
