//! Base geometry snapshots and the render-facing vertex buffer.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::params::GridShape;

/// Vertex data uploaded to the renderer (position + normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Immutable geometry captured when a target is built
///
/// Positions and normals here are the computation base for every frame and
/// are never written after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseGeometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl BaseGeometry {
    /// Flat XZ plane centred on the origin, rows ordered along +Z
    pub fn grid(shape: &GridShape) -> Self {
        let divisions = shape.subdivisions.max(1);
        let spacing = shape.size / divisions as f32;
        let half_size = shape.size / 2.0;

        let mut positions = Vec::with_capacity(shape.vertex_count());
        let mut indices = Vec::with_capacity(divisions * divisions * 6);

        // Row-major: z is the row, x the column
        for z in 0..=divisions {
            for x in 0..=divisions {
                positions.push(Vec3::new(
                    x as f32 * spacing - half_size,
                    0.0,
                    z as f32 * spacing - half_size,
                ));
            }
        }

        // Generate triangle indices (counter-clockwise seen from +Y)
        for z in 0..divisions {
            for x in 0..divisions {
                let top_left = (z * (divisions + 1) + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * (divisions + 1) + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        let normals = vec![Vec3::Y; positions.len()];
        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Snapshot an imported mesh, estimating normals when none are supplied
    ///
    /// Supplied normals are used only when there is one per position. Empty
    /// `indices` means a plain triangle list over the positions.
    pub fn from_mesh(positions: Vec<Vec3>, normals: Option<Vec<Vec3>>, indices: Vec<u32>) -> Self {
        let normals = match normals {
            Some(normals) if normals.len() == positions.len() => normals
                .into_iter()
                .map(Vec3::normalize_or_zero)
                .collect(),
            _ => estimate_normals(&positions, &indices),
        };
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// Smooth vertex normals from area-weighted face normals
///
/// Vertices that belong to no valid triangle fall back to the direction
/// from the local origin.
pub fn estimate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    let mut accumulate = |a: usize, b: usize, c: usize| {
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            return;
        }
        // Cross product length is twice the triangle area
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    };

    if indices.is_empty() {
        for tri in 0..positions.len() / 3 {
            accumulate(tri * 3, tri * 3 + 1, tri * 3 + 2);
        }
    } else {
        for tri in indices.chunks_exact(3) {
            accumulate(tri[0] as usize, tri[1] as usize, tri[2] as usize);
        }
    }

    accumulated
        .into_iter()
        .zip(positions)
        .map(|(normal, position)| match normal.try_normalize() {
            Some(n) => n,
            None => position.normalize_or_zero(),
        })
        .collect()
}

/// Render-facing vertex buffer with a re-upload flag
#[derive(Debug, Clone)]
pub struct LiveBuffer {
    vertices: Vec<Vertex>,
    needs_upload: bool,
}

impl LiveBuffer {
    /// Buffer initialised to the base geometry, flagged for first upload
    pub fn from_base(base: &BaseGeometry) -> Self {
        let vertices = base
            .positions()
            .iter()
            .zip(base.normals())
            .map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect();
        Self {
            vertices,
            needs_upload: true,
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn position(&self, vertex: usize) -> Vec3 {
        Vec3::from_array(self.vertices[vertex].position)
    }

    #[inline]
    pub fn write_position(&mut self, vertex: usize, position: Vec3) {
        self.vertices[vertex].position = position.to_array();
    }

    pub fn mark_dirty(&mut self) {
        self.needs_upload = true;
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Renderer poll: returns the flag and clears it
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.needs_upload)
    }

    /// Raw bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Order-sensitive FNV-1a hash over position bits
    pub fn position_checksum(&self) -> u64 {
        self.vertices
            .iter()
            .flat_map(|v| v.position)
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, component| {
                (hash ^ component.to_bits() as u64).wrapping_mul(0x0000_0100_0000_01b3)
            })
    }
}
