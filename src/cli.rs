//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Result;
use crate::params::{ReactionMode, ReactorConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "meshpulse")]
#[command(about = "Audio-reactive mesh deformation engine (headless driver)", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Play a WAV file instead of capturing the microphone
    #[arg(long, value_name = "FILE")]
    pub wav: Option<PathBuf>,

    /// OBJ model to load in the background after startup
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Number of frames to run (0 = until the source ends)
    #[arg(long, value_name = "COUNT", default_value = "600")]
    pub frames: u64,

    /// Frame rate (frames per second)
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Visual gain
    #[arg(long)]
    pub amplitude: Option<f32>,

    /// Peak decay factor per frame
    #[arg(long)]
    pub decay: Option<f32>,

    /// Reaction mode: displacement or deformation
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ReactionMode>,

    /// Grid subdivisions per side
    #[arg(long, value_name = "COUNT")]
    pub subdivisions: Option<usize>,

    /// Default log directive (RUST_LOG overrides)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Args {
    /// Configuration file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<ReactorConfig> {
        let mut config = match &self.config {
            Some(path) => ReactorConfig::load(path)?,
            None => ReactorConfig::default(),
        };

        if let Some(fps) = self.fps {
            config.analyser.frame_rate = fps;
        }
        if let Some(amplitude) = self.amplitude {
            config.reaction.amplitude = amplitude;
        }
        if let Some(decay) = self.decay {
            config.reaction.decay = decay;
        }
        if let Some(mode) = self.mode {
            config.reaction.reaction_mode = mode;
        }
        if let Some(subdivisions) = self.subdivisions {
            config.grid.subdivisions = subdivisions;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }
}
