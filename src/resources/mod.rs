use crate::{
    data_structures::{material::MaterialParams, model},
    resources::{primitives::Shape, texture::material_layout},
};

/**
 * This module contains all logic for turning synthesized geometry and
 * textures into GPU resources. Nothing is loaded from disk.
 */
pub mod primitives;
pub mod texture;

/// Builds a single-mesh model from a primitive shape and its material.
pub fn load_model(
    name: &str,
    shape: &Shape,
    params: &MaterialParams,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> model::Model {
    let layout = material_layout(device);
    let data = shape.mesh_data();
    if data.indices.is_empty() {
        log::warn!("Mesh {name} has no triangles and will not be visible.");
    }
    let material = texture::load_material(name, params, device, queue, &layout);
    let mesh = model::Mesh::from_data(device, name, &data, 0);
    model::Model {
        meshes: vec![mesh],
        materials: vec![material],
    }
}
