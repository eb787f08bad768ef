//! Imported assets, node classification and mesh sources.
//!
//! An imported asset is never mutated here. Classification produces a
//! read-only view; target construction consumes only the mesh-bearing part.

mod loader;
mod obj;

use std::path::Path;

use glam::Vec3;

use crate::error::Result;
use crate::reactive::BaseGeometry;

pub use loader::{LoadOutcome, LoadTicket, ModelLoader};
pub use obj::ObjSource;

/// Vertex buffers of one mesh-bearing node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, if the asset carries them
    pub normals: Option<Vec<Vec3>>,
    /// Triangle list indices; empty for non-indexed geometry
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_renderable(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Baseline snapshot, with normals estimated when absent
    pub fn to_base_geometry(&self) -> BaseGeometry {
        BaseGeometry::from_mesh(
            self.positions.clone(),
            self.normals.clone(),
            self.indices.clone(),
        )
    }
}

/// One node of an imported scene
#[derive(Debug, Clone, PartialEq)]
pub enum AssetNode {
    Mesh(MeshData),
    Light { name: String },
    Group { name: String },
}

/// Classification of a node for the deformation engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeClass<'a> {
    MeshBearing(&'a MeshData),
    Ignorable,
}

impl AssetNode {
    pub fn classify(&self) -> NodeClass<'_> {
        match self {
            Self::Mesh(mesh) if mesh.is_renderable() => NodeClass::MeshBearing(mesh),
            _ => NodeClass::Ignorable,
        }
    }
}

/// Flattened result of an asset import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedAsset {
    pub name: String,
    pub nodes: Vec<AssetNode>,
}

impl ImportedAsset {
    pub fn classify(&self) -> Vec<NodeClass<'_>> {
        self.nodes.iter().map(AssetNode::classify).collect()
    }

    /// Mesh-bearing nodes in traversal order
    pub fn renderable_meshes(&self) -> impl Iterator<Item = &MeshData> {
        self.nodes.iter().filter_map(|node| match node.classify() {
            NodeClass::MeshBearing(mesh) => Some(mesh),
            NodeClass::Ignorable => None,
        })
    }
}

/// External asset parser
pub trait MeshSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<ImportedAsset>;
}
