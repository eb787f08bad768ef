//! Meshpulse - audio-reactive mesh deformation
//!
//! Headless driver: runs the reactor against the microphone or a WAV file
//! at a fixed frame rate and drains the vertex buffers the way a renderer
//! would.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use meshpulse::cli::Args;
use meshpulse::logging;
use meshpulse::model::{ModelLoader, ObjSource};
use meshpulse::spectrum::{MicrophoneSource, SpectrumSource, WavSource};
use meshpulse::{FrameOutcome, ModelEvent, Reactor};

/// Counters accumulated over a run
#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    deformed: u64,
    degenerate: u64,
    unavailable: u64,
    uploaded_bytes: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args
        .resolve_config()
        .context("Failed to resolve configuration")?;
    logging::init(&config.log_level).context("Failed to initialise logging")?;

    info!("Meshpulse - audio-reactive mesh deformation");

    let mut source: Box<dyn SpectrumSource> = match &args.wav {
        Some(path) => Box::new(
            WavSource::open(path, config.analyser)
                .with_context(|| format!("Failed to open WAV file {:?}", path))?,
        ),
        None => Box::new(
            MicrophoneSource::new(config.analyser).context("Failed to open microphone")?,
        ),
    };

    let loader = ModelLoader::new(Arc::new(ObjSource));
    let mut reactor = Reactor::from_config(&config).with_loader(loader);

    if let Some(model) = &args.model {
        reactor
            .request_model(model)
            .with_context(|| format!("Failed to start loading {:?}", model))?;
    }

    let fps = config.analyser.frame_rate;
    let stats = run(&mut reactor, source.as_mut(), args.frames, fps);

    println!(
        "frames: {} (deformed {}, degenerate {}, no spectrum {})",
        stats.frames, stats.deformed, stats.degenerate, stats.unavailable
    );
    println!("uploaded: {} bytes", stats.uploaded_bytes);
    println!(
        "targets: {} ({} vertices), checksum {:016x}",
        reactor.targets().targets().len(),
        reactor.targets().vertex_count(),
        reactor.targets().position_checksum()
    );

    Ok(())
}

/// Fixed-rate frame loop; `frame_limit == 0` runs until the source ends
fn run(
    reactor: &mut Reactor,
    source: &mut dyn SpectrumSource,
    frame_limit: u64,
    fps: u32,
) -> RunStats {
    let frame_duration = Duration::from_secs_f64(1.0 / fps.max(1) as f64);
    let mut stats = RunStats::default();

    while frame_limit == 0 || stats.frames < frame_limit {
        if source.is_exhausted() {
            info!(frame = stats.frames, "spectrum source finished");
            break;
        }
        let frame_start = Instant::now();

        let report = reactor.tick(source);
        stats.frames += 1;
        match report.outcome {
            FrameOutcome::Deformed(_) => stats.deformed += 1,
            FrameOutcome::Degenerate { .. } => stats.degenerate += 1,
            FrameOutcome::SpectrumUnavailable => stats.unavailable += 1,
        }

        match report.model_event {
            Some(ModelEvent::Loaded {
                path,
                sub_meshes,
                vertices,
            }) => info!(path = ?path, sub_meshes, vertices, "model active"),
            Some(ModelEvent::Rejected {
                path,
                reason,
                state,
            }) => warn!(path = ?path, state = ?state, "model rejected: {}", reason),
            None => {}
        }

        // Stand-in for the renderer's once-per-frame buffer poll
        for target in reactor.targets_mut().targets_mut() {
            if target.live_mut().take_dirty() {
                stats.uploaded_bytes += target.live().as_bytes().len();
            }
        }

        if report.frame % fps.max(1) as u64 == 0 {
            let peak = reactor
                .targets()
                .targets()
                .iter()
                .map(|t| t.decay().peak())
                .fold(0.0, f32::max);
            info!(
                frame = report.frame,
                state = ?reactor.targets().state(),
                peak,
                "frame summary"
            );
        }

        if let Some(remaining) = frame_duration.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    stats
}
