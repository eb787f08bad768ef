//! Meshpulse library - audio-reactive geometry deformation

pub mod cli;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod params;
pub mod reactive;
pub mod spectrum;

pub use engine::{FrameOutcome, FrameReport, ModelEvent, Reactor};
pub use error::{ReactorError, Result};
