//! Procedural geometry: the ball sphere and the label slab.

use std::f32::consts::PI;

use crate::data_structures::model::{MeshData, ModelVertex};

/// UV sphere centred on the origin.
///
/// `width_segments` and `height_segments` are clamped to the smallest values
/// that still enclose a volume (3 and 2).
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let theta = v * PI;
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let phi = u * 2.0 * PI;
            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            vertices.push(ModelVertex {
                position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
            });
        }
    }

    let row = ws + 1;
    let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            // The poles collapse one triangle of each quad.
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Unit cube spanning `[0, 1]` on every axis, so an instance's translation is
/// its lower-left-front corner and its scale is its size.
pub fn unit_slab() -> MeshData {
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        ),
        (
            [0.0, 0.0, -1.0],
            [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        ),
        (
            [1.0, 0.0, 0.0],
            [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
        ),
        (
            [-1.0, 0.0, 0.0],
            [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
        ),
        (
            [0.0, 1.0, 0.0],
            [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        ),
        (
            [0.0, -1.0, 0.0],
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
        ),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in FACES {
        let base = vertices.len() as u32;
        vertices.extend(corners.iter().map(|&position| ModelVertex { position, normal }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData { vertices, indices }
}
