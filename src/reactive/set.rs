//! The active collection of reactive targets and grid/model switching.

use glam::Mat4;
use tracing::{debug, info};

use crate::error::{ReactorError, Result};
use crate::model::ImportedAsset;
use crate::params::{GridShape, Parameters};
use crate::spectrum::SpectrumSample;

use super::{BinMapper, ReactiveTarget};

/// Lifecycle state of a [`TargetSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    GridActive,
    ModelActive,
}

/// Exactly one grid, or the sub-meshes of one loaded model
#[derive(Debug, Clone)]
enum ActiveTargets {
    Grid(ReactiveTarget),
    Model(Vec<ReactiveTarget>),
}

/// Spectral coverage achieved by one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinCoverage {
    Valid(usize),
    /// No valid bins; every target value was forced to 0
    Degenerate,
}

/// Result of one [`TargetSet::per_frame_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSummary {
    pub targets: usize,
    pub vertices: usize,
    pub coverage: BinCoverage,
}

/// Active targets plus the static grid definition used for restoration
///
/// Switching is a full replace. Replacement sets are built completely
/// before the single assignment that publishes them, so an update always
/// sees either the old set or the new one.
#[derive(Debug, Clone)]
pub struct TargetSet {
    grid_shape: GridShape,
    active: ActiveTargets,
}

impl TargetSet {
    /// Start in grid mode
    pub fn new(grid_shape: GridShape) -> Self {
        Self {
            active: ActiveTargets::Grid(ReactiveTarget::grid(&grid_shape)),
            grid_shape,
        }
    }

    pub fn state(&self) -> TargetState {
        match self.active {
            ActiveTargets::Grid(_) => TargetState::GridActive,
            ActiveTargets::Model(_) => TargetState::ModelActive,
        }
    }

    pub fn grid_shape(&self) -> &GridShape {
        &self.grid_shape
    }

    pub fn targets(&self) -> &[ReactiveTarget] {
        match &self.active {
            ActiveTargets::Grid(grid) => std::slice::from_ref(grid),
            ActiveTargets::Model(targets) => targets,
        }
    }

    pub fn targets_mut(&mut self) -> &mut [ReactiveTarget] {
        match &mut self.active {
            ActiveTargets::Grid(grid) => std::slice::from_mut(grid),
            ActiveTargets::Model(targets) => targets,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.targets().iter().map(ReactiveTarget::vertex_count).sum()
    }

    /// Combined checksum of every live position buffer
    pub fn position_checksum(&self) -> u64 {
        self.targets()
            .iter()
            .fold(0u64, |acc, t| acc.rotate_left(7) ^ t.live().position_checksum())
    }

    /// Renderer transform for the current view scale
    pub fn model_matrix(scale: f32) -> Mat4 {
        Mat4::from_scale(glam::Vec3::splat(scale))
    }

    /// Build one target per mesh-bearing node of `asset`
    ///
    /// Ignorable nodes (lights, empty groups, meshes without positions) are
    /// skipped. Fails with [`ReactorError::NoRenderableMesh`] when nothing
    /// remains.
    pub fn build_model_targets(asset: &ImportedAsset) -> Result<Vec<ReactiveTarget>> {
        let targets: Vec<ReactiveTarget> = asset
            .renderable_meshes()
            .map(|mesh| ReactiveTarget::sub_mesh(mesh.name.clone(), mesh.to_base_geometry()))
            .collect();

        if targets.is_empty() {
            return Err(ReactorError::NoRenderableMesh {
                asset: asset.name.clone(),
            });
        }
        Ok(targets)
    }

    /// Switch to model mode with targets built from `asset`
    ///
    /// On failure the current set is left untouched.
    pub fn load_model(&mut self, asset: &ImportedAsset) -> Result<()> {
        let targets = Self::build_model_targets(asset)?;
        self.install_model(targets);
        Ok(())
    }

    /// Publish already-built model targets, discarding the current set
    ///
    /// An empty list is ignored rather than leaving the set without targets.
    pub fn install_model(&mut self, targets: Vec<ReactiveTarget>) {
        if targets.is_empty() {
            debug!("ignoring empty model target list");
            return;
        }
        let vertices: usize = targets.iter().map(ReactiveTarget::vertex_count).sum();
        info!(
            sub_meshes = targets.len(),
            vertices, "switching to model targets"
        );
        self.active = ActiveTargets::Model(targets);
    }

    /// Return to grid mode with a fresh grid built from the static definition
    pub fn restore_grid(&mut self) {
        info!(
            subdivisions = self.grid_shape.subdivisions,
            "restoring procedural grid"
        );
        self.active = ActiveTargets::Grid(ReactiveTarget::grid(&self.grid_shape));
    }

    /// Deform every active target from one spectrum sample
    pub fn per_frame_update(
        &mut self,
        spectrum: &SpectrumSample<'_>,
        params: &Parameters,
    ) -> UpdateSummary {
        let mapper = BinMapper::new(spectrum.bin_count(), params.bin_usage_fraction).ok();
        let coverage = match &mapper {
            Some(mapper) => BinCoverage::Valid(mapper.valid_bins()),
            None => BinCoverage::Degenerate,
        };

        let mut vertices = 0;
        let targets = self.targets_mut();
        for target in targets.iter_mut() {
            target.apply(spectrum, mapper.as_ref(), params);
            vertices += target.vertex_count();
        }

        UpdateSummary {
            targets: targets.len(),
            vertices,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssetNode, MeshData};
    use glam::Vec3;

    fn triangle(name: &str) -> AssetNode {
        AssetNode::Mesh(MeshData {
            name: name.to_string(),
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: None,
            indices: vec![0, 1, 2],
        })
    }

    #[test]
    fn test_starts_in_grid_mode() {
        let set = TargetSet::new(GridShape::default());
        assert_eq!(set.state(), TargetState::GridActive);
        assert_eq!(set.targets().len(), 1);
        assert_eq!(set.vertex_count(), 121);
    }

    #[test]
    fn test_load_model_replaces_grid() {
        let mut set = TargetSet::new(GridShape::default());
        let asset = ImportedAsset {
            name: "pair".to_string(),
            nodes: vec![
                triangle("a"),
                AssetNode::Light {
                    name: "sun".to_string(),
                },
                triangle("b"),
            ],
        };

        set.load_model(&asset).unwrap();
        assert_eq!(set.state(), TargetState::ModelActive);
        assert_eq!(set.targets().len(), 2);
        assert_eq!(set.vertex_count(), 6);
        assert!(set.targets().iter().all(|t| t.decay().peak() == 0.0));
    }

    #[test]
    fn test_update_deforms_every_sub_mesh() {
        let mut set = TargetSet::new(GridShape::default());
        let asset = ImportedAsset {
            name: "pair".to_string(),
            nodes: vec![
                triangle("a"),
                AssetNode::Light {
                    name: "sun".to_string(),
                },
                triangle("b"),
            ],
        };
        set.load_model(&asset).unwrap();

        let bins = vec![255u8; 512];
        let summary = set.per_frame_update(&SpectrumSample::new(&bins), &Parameters::default());
        assert_eq!(summary.targets, 2);
        assert_eq!(summary.vertices, 6);

        for target in set.targets() {
            assert_eq!(target.decay().len(), 3);
            assert!(target.live().needs_upload());
            for (vertex, original) in target.base().positions().iter().enumerate() {
                // Estimated normal of a CCW triangle in the XY plane is +Z
                let offset = target.live().position(vertex) - *original;
                assert!((offset - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
                assert_eq!(target.decay().get(vertex), 1.0);
            }
        }
    }

    #[test]
    fn test_failed_load_keeps_grid_state() {
        let mut set = TargetSet::new(GridShape::default());
        let bins = vec![255u8; 512];
        set.per_frame_update(&SpectrumSample::new(&bins), &Parameters::default());
        let checksum = set.position_checksum();
        let decay = set.targets()[0].decay().clone();

        let lights_only = ImportedAsset {
            name: "lights".to_string(),
            nodes: vec![AssetNode::Light {
                name: "key".to_string(),
            }],
        };
        let err = set.load_model(&lights_only).unwrap_err();

        assert!(matches!(err, ReactorError::NoRenderableMesh { .. }));
        assert_eq!(set.state(), TargetState::GridActive);
        assert_eq!(set.position_checksum(), checksum);
        assert_eq!(set.targets()[0].decay(), &decay);
    }

    #[test]
    fn test_restore_grid_resets_decay() {
        let mut set = TargetSet::new(GridShape::default());
        let asset = ImportedAsset {
            name: "one".to_string(),
            nodes: vec![triangle("a")],
        };
        set.load_model(&asset).unwrap();
        set.restore_grid();

        assert_eq!(set.state(), TargetState::GridActive);
        assert_eq!(set.vertex_count(), 121);
        assert_eq!(set.targets()[0].decay().len(), 121);
        assert_eq!(set.targets()[0].decay().peak(), 0.0);
    }

    #[test]
    fn test_degenerate_coverage_reported() {
        let mut set = TargetSet::new(GridShape::default());
        let bins = [255u8];
        let summary = set.per_frame_update(&SpectrumSample::new(&bins), &Parameters::default());
        assert_eq!(summary.coverage, BinCoverage::Degenerate);
        assert_eq!(summary.vertices, 121);
        assert_eq!(set.targets()[0].decay().peak(), 0.0);
    }

    #[test]
    fn test_model_matrix_scales_uniformly() {
        let m = TargetSet::model_matrix(2.0);
        assert_eq!(m.transform_point3(Vec3::ONE), Vec3::splat(2.0));
    }
}
