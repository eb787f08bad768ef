//! Frame orchestration: loads, parameters, spectrum, targets.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::{ReactorError, Result};
use crate::model::{ImportedAsset, LoadOutcome, LoadTicket, ModelLoader};
use crate::params::{GridShape, ParameterHandle, Parameters, ReactorConfig};
use crate::reactive::{BinCoverage, TargetSet, TargetState, UpdateSummary};
use crate::spectrum::SpectrumSource;

/// What the deformation step did this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Every active vertex was updated from the spectrum
    Deformed(UpdateSummary),
    /// Vertices were updated with zero contribution (no valid bins)
    Degenerate {
        summary: UpdateSummary,
        bin_count: usize,
        fraction: f32,
    },
    /// No sample yet; geometry left at its last state
    SpectrumUnavailable,
}

impl FrameOutcome {
    /// The recoverable condition behind a fallback outcome, if any
    pub fn recoverable_error(&self) -> Option<ReactorError> {
        match *self {
            Self::Deformed(_) => None,
            Self::Degenerate {
                bin_count,
                fraction,
                ..
            } => Some(ReactorError::DegenerateBinRange {
                bin_count,
                fraction,
            }),
            Self::SpectrumUnavailable => Some(ReactorError::SpectrumUnavailable),
        }
    }

    pub fn vertices_updated(&self) -> usize {
        match self {
            Self::Deformed(summary) | Self::Degenerate { summary, .. } => summary.vertices,
            Self::SpectrumUnavailable => 0,
        }
    }
}

/// Target-set change applied at the start of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    Loaded {
        path: PathBuf,
        sub_meshes: usize,
        vertices: usize,
    },
    /// Load failed; the reported state is the one still active
    Rejected {
        path: PathBuf,
        reason: String,
        state: TargetState,
    },
}

/// Per-frame report
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub outcome: FrameOutcome,
    pub model_event: Option<ModelEvent>,
}

/// Drives one [`TargetSet`] from a spectrum source, one tick per frame
///
/// A tick runs strictly in order: publish a finished model load, snapshot
/// parameters, poll the spectrum, deform. Target-set swaps only happen
/// between updates.
pub struct Reactor {
    targets: TargetSet,
    params: ParameterHandle,
    loader: Option<ModelLoader>,
    frame: u64,
    /// Last logged per-frame condition, for transition-only logging
    last_condition: Option<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Nominal,
    WaitingForSpectrum,
    DegenerateBins,
}

impl Reactor {
    pub fn new(grid: GridShape, params: ParameterHandle) -> Self {
        Self {
            targets: TargetSet::new(grid),
            params,
            loader: None,
            frame: 0,
            last_condition: None,
        }
    }

    pub fn from_config(config: &ReactorConfig) -> Self {
        Self::new(config.grid, ParameterHandle::new(config.reaction))
    }

    /// Enable asynchronous model loading
    pub fn with_loader(mut self, loader: ModelLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn params(&self) -> &ParameterHandle {
        &self.params
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Mutable access for the renderer to drain dirty buffers
    pub fn targets_mut(&mut self) -> &mut TargetSet {
        &mut self.targets
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Queue a background load; supersedes any load still in flight
    pub fn request_model(&mut self, path: impl Into<PathBuf>) -> Result<LoadTicket> {
        match self.loader.as_mut() {
            Some(loader) => loader.request(path),
            None => Err(ReactorError::Config(
                "model loading is not enabled for this reactor".to_string(),
            )),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loader.as_ref().is_some_and(ModelLoader::is_pending)
    }

    /// Synchronous load from an already-imported asset
    pub fn load_model_now(&mut self, asset: &ImportedAsset) -> Result<()> {
        if let Some(loader) = self.loader.as_mut() {
            loader.cancel();
        }
        match TargetSet::build_model_targets(asset) {
            Ok(targets) => {
                self.targets.install_model(targets);
                Ok(())
            }
            Err(err) => {
                self.reject_load(&err);
                Err(err)
            }
        }
    }

    /// Drop the model (and any pending load) and return to the grid
    pub fn unload_model(&mut self) {
        if let Some(loader) = self.loader.as_mut() {
            loader.cancel();
        }
        if self.targets.state() == TargetState::ModelActive {
            self.targets.restore_grid();
        }
    }

    /// Advance one frame
    pub fn tick(&mut self, source: &mut dyn SpectrumSource) -> FrameReport {
        self.frame += 1;
        let model_event = self.publish_finished_load();
        let params = self.params.snapshot();

        let outcome = match source.frequency_data() {
            Some(sample) => {
                let summary = self.targets.per_frame_update(&sample, &params);
                match summary.coverage {
                    BinCoverage::Valid(_) => FrameOutcome::Deformed(summary),
                    BinCoverage::Degenerate => FrameOutcome::Degenerate {
                        summary,
                        bin_count: sample.bin_count(),
                        fraction: params.bin_usage_fraction,
                    },
                }
            }
            None => FrameOutcome::SpectrumUnavailable,
        };

        self.log_condition(&outcome, &params);

        FrameReport {
            frame: self.frame,
            outcome,
            model_event,
        }
    }

    fn publish_finished_load(&mut self) -> Option<ModelEvent> {
        let LoadOutcome { path, result, .. } = self.loader.as_mut()?.poll()?;
        match result {
            Ok(targets) => {
                let sub_meshes = targets.len();
                let vertices = targets.iter().map(|t| t.vertex_count()).sum();
                self.targets.install_model(targets);
                Some(ModelEvent::Loaded {
                    path,
                    sub_meshes,
                    vertices,
                })
            }
            Err(err) => {
                self.reject_load(&err);
                Some(ModelEvent::Rejected {
                    path,
                    reason: err.to_string(),
                    state: self.targets.state(),
                })
            }
        }
    }

    /// Failed loads never replace the active set, grid or model
    fn reject_load(&self, err: &ReactorError) {
        warn!(
            state = ?self.targets.state(),
            "{}; keeping current targets", err
        );
    }

    fn log_condition(&mut self, outcome: &FrameOutcome, params: &Parameters) {
        let condition = match outcome {
            FrameOutcome::Deformed(_) => Condition::Nominal,
            FrameOutcome::Degenerate { .. } => Condition::DegenerateBins,
            FrameOutcome::SpectrumUnavailable => Condition::WaitingForSpectrum,
        };
        if self.last_condition == Some(condition) {
            return;
        }
        self.last_condition = Some(condition);

        match condition {
            Condition::Nominal => info!(
                frame = self.frame,
                mode = ?params.reaction_mode,
                vertices = outcome.vertices_updated(),
                "spectrum flowing"
            ),
            Condition::WaitingForSpectrum => {
                debug!(frame = self.frame, "no spectrum sample; geometry held")
            }
            Condition::DegenerateBins => {
                if let Some(err) = outcome.recoverable_error() {
                    warn!(frame = self.frame, "{}; contribution forced to zero", err);
                }
            }
        }
    }
}
