//! Mapping from vertex topology to frequency-bin index.

use crate::error::{ReactorError, Result};

/// Maps vertex indices onto the valid part of the spectrum
///
/// `valid_bins = floor(bin_count * bin_usage_fraction)`. Construction fails
/// with [`ReactorError::DegenerateBinRange`] when that evaluates to zero;
/// callers then treat every vertex's target value as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinMapper {
    valid_bins: usize,
}

impl BinMapper {
    pub fn new(bin_count: usize, bin_usage_fraction: f32) -> Result<Self> {
        let valid_bins = (bin_count as f32 * bin_usage_fraction).floor() as usize;
        // Never read past the spectrum, whatever the fraction says
        let valid_bins = valid_bins.min(bin_count);
        if valid_bins == 0 {
            return Err(ReactorError::DegenerateBinRange {
                bin_count,
                fraction: bin_usage_fraction,
            });
        }
        Ok(Self { valid_bins })
    }

    pub fn valid_bins(&self) -> usize {
        self.valid_bins
    }

    /// Grid layout: one row per spectral band along the depth axis
    ///
    /// `row = vertex / (divisions + 1)`,
    /// `bin = clamp(floor(row / max(1, divisions) * valid_bins), 0, valid_bins - 1)`
    pub fn grid_bin(&self, vertex: usize, divisions: usize) -> usize {
        let row = vertex / (divisions + 1);
        let bands = divisions.max(1);
        let bin = (row as f64 / bands as f64 * self.valid_bins as f64).floor() as usize;
        bin.min(self.valid_bins - 1)
    }

    /// Arbitrary mesh layout: linear index wrapped over the valid bins
    pub fn linear_bin(&self, vertex: usize) -> usize {
        vertex % self.valid_bins
    }
}
