//! One deformable mesh unit: the procedural grid or one imported sub-mesh.

use crate::params::{GridShape, Parameters};
use crate::spectrum::SpectrumSample;

use super::{BaseGeometry, BinMapper, DecayState, DeformationPolicy, LiveBuffer};

/// Which layout a target's vertices follow when picking bins
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Row-major procedural grid with `divisions + 1` points per row
    Grid { divisions: usize },
    /// Imported mesh; bins wrap over the linear vertex index
    SubMesh { name: String },
}

impl TargetKind {
    #[inline]
    pub fn bin_for(&self, vertex: usize, mapper: &BinMapper) -> usize {
        match self {
            Self::Grid { divisions } => mapper.grid_bin(vertex, *divisions),
            Self::SubMesh { .. } => mapper.linear_bin(vertex),
        }
    }
}

/// Deformable mesh with its own baseline geometry and smoothing state
///
/// All buffers are sized at construction; [`ReactiveTarget::apply`] does not
/// allocate.
#[derive(Debug, Clone)]
pub struct ReactiveTarget {
    kind: TargetKind,
    base: BaseGeometry,
    decay: DecayState,
    live: LiveBuffer,
}

impl ReactiveTarget {
    /// Build the procedural grid target
    pub fn grid(shape: &GridShape) -> Self {
        Self::new(
            TargetKind::Grid {
                divisions: shape.subdivisions.max(1),
            },
            BaseGeometry::grid(shape),
        )
    }

    /// Build a target for one imported sub-mesh
    pub fn sub_mesh(name: impl Into<String>, base: BaseGeometry) -> Self {
        Self::new(TargetKind::SubMesh { name: name.into() }, base)
    }

    fn new(kind: TargetKind, base: BaseGeometry) -> Self {
        let decay = DecayState::new(base.vertex_count());
        let live = LiveBuffer::from_base(&base);
        Self {
            kind,
            base,
            decay,
            live,
        }
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn vertex_count(&self) -> usize {
        self.base.vertex_count()
    }

    pub fn base(&self) -> &BaseGeometry {
        &self.base
    }

    pub fn decay(&self) -> &DecayState {
        &self.decay
    }

    pub fn live(&self) -> &LiveBuffer {
        &self.live
    }

    pub fn live_mut(&mut self) -> &mut LiveBuffer {
        &mut self.live
    }

    /// Deform every vertex for one frame
    ///
    /// `mapper` is `None` when the bin range is degenerate, in which case
    /// every vertex's target value is 0 and only the decay advances.
    pub fn apply(
        &mut self,
        spectrum: &SpectrumSample<'_>,
        mapper: Option<&BinMapper>,
        params: &Parameters,
    ) {
        let policy = DeformationPolicy::from(params.reaction_mode);
        let positions = self.base.positions();
        let normals = self.base.normals();

        for vertex in 0..positions.len() {
            let target = match mapper {
                Some(mapper) => spectrum.magnitude(self.kind.bin_for(vertex, mapper)),
                None => 0.0,
            };
            let smoothed = self.decay.update(vertex, target, params.decay);
            let position = policy.apply(
                positions[vertex],
                normals[vertex],
                smoothed,
                params.amplitude,
            );
            self.live.write_position(vertex, position);
        }

        self.live.mark_dirty();
    }

    /// Write the original positions back into the live buffer
    pub fn restore(&mut self) {
        for (vertex, position) in self.base.positions().iter().enumerate() {
            self.live.write_position(vertex, *position);
        }
        self.live.mark_dirty();
    }
}
