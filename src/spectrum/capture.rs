//! Microphone capture feeding the byte-spectrum analyser.

use std::collections::VecDeque;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use parking_lot::Mutex;
use tracing::{error, info};

use super::{SpectrumAnalyser, SpectrumSample, SpectrumSource};
use crate::error::{ReactorError, Result};
use crate::params::AnalyserConfig;

/// Bounded mono sample history written by the audio callback
#[derive(Debug)]
pub struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy the newest `out.len()` samples into `out`; false if not enough yet
    pub fn copy_latest(&self, out: &mut [f32]) -> bool {
        if self.samples.len() < out.len() {
            return false;
        }
        let start = self.samples.len() - out.len();
        for (slot, sample) in out.iter_mut().zip(self.samples.range(start..)) {
            *slot = *sample;
        }
        true
    }
}

/// Default input device captured into a [`SampleRing`]
///
/// Polling is non-blocking: until one full analysis window has arrived,
/// [`SpectrumSource::frequency_data`] reports no sample.
pub struct MicrophoneSource {
    ring: Arc<Mutex<SampleRing>>,
    analyser: SpectrumAnalyser,
    window: Vec<f32>,

    /// Input stream (kept alive)
    _stream: cpal::Stream,
}

impl MicrophoneSource {
    /// Open the default input device and start capturing
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        let analyser = SpectrumAnalyser::new(config)?;
        let ring = Arc::new(Mutex::new(SampleRing::new(config.fft_size * 4)));

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| ReactorError::Audio("no audio input device found".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| ReactorError::Audio(format!("failed to get input config: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = supported.sample_rate().0,
            channels = supported.channels(),
            "opening microphone"
        );

        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &ring)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &ring)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &ring)?,
            other => {
                return Err(ReactorError::Audio(format!(
                    "unsupported input sample format {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| ReactorError::Audio(format!("failed to start input stream: {}", e)))?;

        Ok(Self {
            ring,
            window: vec![0.0; config.fft_size],
            analyser,
            _stream: stream,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ring: &Arc<Mutex<SampleRing>>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let ring = Arc::clone(ring);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut ring = ring.lock();
                // Downmix interleaved frames to mono
                for frame in data.chunks(channels) {
                    let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
                    ring.push(sum / frame.len() as f32);
                }
            },
            |err| error!("audio input stream error: {}", err),
            None,
        )
        .map_err(|e| ReactorError::Audio(format!("failed to build input stream: {}", e)))
}

impl SpectrumSource for MicrophoneSource {
    fn frequency_bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn frequency_data(&mut self) -> Option<SpectrumSample<'_>> {
        if !self.ring.lock().copy_latest(&mut self.window) {
            return None;
        }
        Some(SpectrumSample::new(self.analyser.analyse(&self.window)))
    }
}
