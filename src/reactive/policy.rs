//! Strategies turning a smoothed value into a vertex position.

use glam::Vec3;

use crate::params::ReactionMode;

/// World units of displacement per unit of smoothed energy per unit amplitude
pub const DISPLACEMENT_SCALE: f32 = 1.0;

/// Radial scale per unit of smoothed energy per unit amplitude.
/// Tuned so a 10-unit grid moves about as far in either mode.
pub const DEFORMATION_FACTOR: f32 = 0.1;

/// Pure position function over the unmodified base geometry
///
/// Both variants compute from the original position (and normal) every
/// frame; the previous frame's output is never an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeformationPolicy {
    /// `original + normal * (smoothed * amplitude)`
    Displacement,
    /// `original * (1 + smoothed * amplitude * DEFORMATION_FACTOR)`
    Deformation,
}

impl From<ReactionMode> for DeformationPolicy {
    fn from(mode: ReactionMode) -> Self {
        match mode {
            ReactionMode::Displacement => Self::Displacement,
            ReactionMode::Deformation => Self::Deformation,
        }
    }
}

impl DeformationPolicy {
    pub fn requires_normals(&self) -> bool {
        matches!(self, Self::Displacement)
    }

    #[inline]
    pub fn apply(&self, original: Vec3, normal: Vec3, smoothed: f32, amplitude: f32) -> Vec3 {
        match self {
            Self::Displacement => original + normal * (smoothed * amplitude * DISPLACEMENT_SCALE),
            Self::Deformation => original * (1.0 + smoothed * amplitude * DEFORMATION_FACTOR),
        }
    }
}
