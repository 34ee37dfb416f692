/**
 * This module contains all logic for loading meshes from external files and for
 * building the procedural ones.
 */
pub mod shapes;

use std::io::{BufReader, Cursor};

use crate::data_structures::model::{MeshData, Model, ModelVertex};

/// Why a model could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("could not read asset {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("could not parse asset {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("asset {path} contains no triangle meshes")]
    Empty { path: String },
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(path).await?
    };

    Ok(data)
}

/// Loads every triangle primitive of a glTF file into CPU meshes.
///
/// Buffers referenced by URI are resolved relative to the model's directory.
pub async fn load_mesh_data(file_name: &str) -> Result<Vec<MeshData>, AssetError> {
    let io_err = |e: anyhow::Error| AssetError::Io {
        path: file_name.to_string(),
        reason: e.to_string(),
    };
    let parse_err = |reason: String| AssetError::Parse {
        path: file_name.to_string(),
        reason,
    };

    let bytes = load_binary(file_name).await.map_err(io_err)?;
    let gltf = gltf::Gltf::from_reader(BufReader::new(Cursor::new(bytes)))
        .map_err(|e| parse_err(e.to_string()))?;

    let dir = file_name
        .rsplit_once('/')
        .map(|(dir, _)| format!("{dir}/"))
        .unwrap_or_default();
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.into()),
                None => return Err(parse_err("missing binary chunk".to_string())),
            },
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(&format!("{dir}{uri}")).await.map_err(io_err)?;
                buffer_data.push(bin);
            }
        }
    }

    let mut meshes = Vec::new();
    for mesh in gltf.meshes() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive in {file_name}");
                continue;
            }
            let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let mut vertices: Vec<ModelVertex> = positions
                .map(|position| ModelVertex {
                    position,
                    normal: [0.0, 1.0, 0.0],
                })
                .collect();
            if let Some(normals) = reader.read_normals() {
                vertices
                    .iter_mut()
                    .zip(normals)
                    .for_each(|(vertex, normal)| vertex.normal = normal);
            }
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            meshes.push(MeshData { vertices, indices });
        }
    }

    if meshes.is_empty() {
        return Err(AssetError::Empty {
            path: file_name.to_string(),
        });
    }
    Ok(meshes)
}

/// Uploads loaded meshes into one model.
pub fn upload_model(device: &wgpu::Device, name: &str, meshes: &[MeshData]) -> Model {
    Model {
        meshes: meshes
            .iter()
            .enumerate()
            .map(|(idx, mesh)| mesh.upload(device, &format!("{name}#{idx}")))
            .collect(),
    }
}
