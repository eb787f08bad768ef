//! Wavefront OBJ adapter over `tobj`.

use std::io::BufRead;
use std::path::Path;

use glam::Vec3;
use tracing::debug;

use super::{AssetNode, ImportedAsset, MeshData, MeshSource};
use crate::error::{ReactorError, Result};

/// Mesh source backed by the `tobj` parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjSource;

impl ObjSource {
    /// Parse OBJ text already in memory; material libraries are not read
    pub fn parse(name: &str, reader: &mut impl BufRead) -> Result<ImportedAsset> {
        let (models, _materials) =
            tobj::load_obj_buf(reader, &tobj::GPU_LOAD_OPTIONS, |_| Ok(Default::default()))
                .map_err(|e| ReactorError::Import {
                    path: name.into(),
                    message: e.to_string(),
                })?;
        Ok(Self::into_asset(name, models))
    }

    fn into_asset(name: &str, models: Vec<tobj::Model>) -> ImportedAsset {
        let nodes = models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                let positions: Vec<Vec3> = mesh
                    .positions
                    .chunks_exact(3)
                    .map(Vec3::from_slice)
                    .collect();
                let normals = (!mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len())
                    .then(|| mesh.normals.chunks_exact(3).map(Vec3::from_slice).collect());

                if positions.is_empty() {
                    AssetNode::Group { name: model.name }
                } else {
                    AssetNode::Mesh(MeshData {
                        name: model.name,
                        positions,
                        normals,
                        indices: mesh.indices,
                    })
                }
            })
            .collect();

        ImportedAsset {
            name: name.to_string(),
            nodes,
        }
    }
}

impl MeshSource for ObjSource {
    fn load(&self, path: &Path) -> Result<ImportedAsset> {
        let (models, materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|e| ReactorError::Import {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if let Err(e) = materials {
            debug!(path = ?path, "ignoring material library: {}", e);
        }
        Ok(Self::into_asset(&path.display().to_string(), models))
    }
}
