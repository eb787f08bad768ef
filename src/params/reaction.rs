//! Reaction parameters shared by every target, plus the live control handle.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ReactorError, Result};

/// Amplitude slider range offered to external controls
pub const AMPLITUDE_RANGE: (f32, f32) = (0.0, 20.0);

/// Peak decay slider range offered to external controls
pub const DECAY_RANGE: (f32, f32) = (0.8, 0.999);

/// View scale range (mouse-wheel zoom)
pub const SCALE_RANGE: (f32, f32) = (0.1, 5.0);

/// How a smoothed spectral value moves a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionMode {
    /// Move along the original surface normal
    #[default]
    Displacement,
    /// Scale radially from the mesh-local origin
    Deformation,
}

impl std::str::FromStr for ReactionMode {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "displacement" => Ok(Self::Displacement),
            "deformation" => Ok(Self::Deformation),
            other => Err(ReactorError::Config(format!(
                "unknown reaction mode '{}', expected displacement or deformation",
                other
            ))),
        }
    }
}

/// Per-frame reaction parameters
///
/// Read once at the start of a frame and passed by reference into every
/// target update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Visual gain applied to the smoothed value (world units per unit energy)
    pub amplitude: f32,

    /// Per-frame peak decay factor, in (0, 1); higher falls off slower
    pub decay: f32,

    /// Displacement or deformation
    pub reaction_mode: ReactionMode,

    /// Fraction of the spectrum treated as valid (drops the noisy top octave)
    pub bin_usage_fraction: f32,

    /// Uniform view scale for the renderer's model matrix (not vertex math)
    pub scale: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            amplitude: 5.0,
            decay: 0.95,
            reaction_mode: ReactionMode::Displacement,
            bin_usage_fraction: 0.8,
            scale: 1.0,
        }
    }
}

impl Parameters {
    /// Validate ranges
    pub fn validate(&self) -> Result<()> {
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(ReactorError::Config(format!(
                "amplitude must be finite and >= 0, got {}",
                self.amplitude
            )));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ReactorError::Config(format!(
                "decay must be in (0, 1), got {}",
                self.decay
            )));
        }
        if !(self.bin_usage_fraction > 0.0 && self.bin_usage_fraction <= 1.0) {
            return Err(ReactorError::Config(format!(
                "bin_usage_fraction must be in (0, 1], got {}",
                self.bin_usage_fraction
            )));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(ReactorError::Config(format!(
                "scale must be finite and > 0, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Shared, mutable view of [`Parameters`] for external controls
///
/// Setters clamp to the control ranges. Individual fields may tear across
/// a frame boundary; the reactor only ever reads a whole [`snapshot`].
///
/// [`snapshot`]: ParameterHandle::snapshot
#[derive(Debug, Clone, Default)]
pub struct ParameterHandle {
    inner: Arc<RwLock<Parameters>>,
}

impl ParameterHandle {
    pub fn new(params: Parameters) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// Copy of the current parameters
    pub fn snapshot(&self) -> Parameters {
        *self.inner.read()
    }

    /// Non-finite input is ignored
    pub fn set_amplitude(&self, amplitude: f32) {
        if amplitude.is_finite() {
            self.inner.write().amplitude = amplitude.clamp(AMPLITUDE_RANGE.0, AMPLITUDE_RANGE.1);
        }
    }

    /// Non-finite input is ignored
    pub fn set_decay(&self, decay: f32) {
        if decay.is_finite() {
            self.inner.write().decay = decay.clamp(DECAY_RANGE.0, DECAY_RANGE.1);
        }
    }

    pub fn set_reaction_mode(&self, mode: ReactionMode) {
        self.inner.write().reaction_mode = mode;
    }

    /// Apply a zoom step, clamped to [`SCALE_RANGE`]. Returns the new scale.
    ///
    /// A non-finite step leaves the scale unchanged.
    pub fn nudge_scale(&self, delta: f32) -> f32 {
        let mut params = self.inner.write();
        if !delta.is_finite() {
            return params.scale;
        }
        params.scale = (params.scale + delta).clamp(SCALE_RANGE.0, SCALE_RANGE.1);
        params.scale
    }
}
