//! Error taxonomy for the deformation engine and its adapters.

use std::path::PathBuf;

/// Result type for reactor operations
pub type Result<T> = std::result::Result<T, ReactorError>;

/// Errors produced by the engine, the spectrum sources and the mesh sources.
///
/// The first three variants are recoverable per-frame or per-load conditions:
/// the reactor falls back to a well-defined last-good state instead of
/// propagating them.
#[derive(Debug, thiserror::Error)]
pub enum ReactorError {
    /// Imported asset contained no mesh with renderable geometry
    #[error("no renderable mesh found in {asset}")]
    NoRenderableMesh { asset: String },

    /// No spectrum sample is available for this frame yet
    #[error("spectrum sample unavailable")]
    SpectrumUnavailable,

    /// `floor(bin_count * bin_usage_fraction)` evaluated to zero
    #[error("degenerate bin range: {bin_count} bins at usage fraction {fraction}")]
    DegenerateBinRange { bin_count: usize, fraction: f32 },

    /// Asset parsing failed in the external mesh source
    #[error("failed to import {path:?}: {message}")]
    Import { path: PathBuf, message: String },

    /// Audio device or stream setup failed
    #[error("audio error: {0}")]
    Audio(String),

    /// WAV decoding failed
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unparsable configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ReactorError {
    /// Whether the reactor handles this error by deterministic fallback
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoRenderableMesh { .. }
                | Self::SpectrumUnavailable
                | Self::DegenerateBinRange { .. }
        )
    }
}

impl From<toml::de::Error> for ReactorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
