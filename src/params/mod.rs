//! Parameter definitions with units and documented semantics.
//!
//! All tuning values live here with:
//! - Units (world units, frames, dBFS)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the frame loop

mod audio;
mod config;
mod grid;
mod reaction;

// Re-export all types
pub use audio::AnalyserConfig;
pub use config::ReactorConfig;
pub use grid::GridShape;
pub use reaction::{
    ParameterHandle, Parameters, ReactionMode, AMPLITUDE_RANGE, DECAY_RANGE, SCALE_RANGE,
};
