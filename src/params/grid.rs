//! Procedural grid definition.

use serde::{Deserialize, Serialize};

use crate::error::{ReactorError, Result};

/// Static definition of the procedural grid target
///
/// Kept by the target set for the whole session so the grid can be rebuilt
/// after a model is unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridShape {
    /// Side length of the square plane in world units
    pub size: f32,

    /// Segments per side (vertices per side = subdivisions + 1)
    pub subdivisions: usize,
}

impl Default for GridShape {
    fn default() -> Self {
        Self {
            size: 10.0,
            subdivisions: 10,
        }
    }
}

impl GridShape {
    /// Vertices per row
    pub fn points_per_row(&self) -> usize {
        self.subdivisions + 1
    }

    /// Total vertex count: (subdivisions + 1)^2
    pub fn vertex_count(&self) -> usize {
        self.points_per_row() * self.points_per_row()
    }

    pub fn validate(&self) -> Result<()> {
        if self.subdivisions == 0 {
            return Err(ReactorError::Config(
                "grid subdivisions must be >= 1".to_string(),
            ));
        }
        if !(self.size > 0.0 && self.size.is_finite()) {
            return Err(ReactorError::Config(format!(
                "grid size must be finite and > 0, got {}",
                self.size
            )));
        }
        Ok(())
    }
}
