//! Asset loading: OBJ models, MTL materials and texture files.

pub mod mesh;
pub mod texture;

use crate::data_structures::model::Model;

/// Load an OBJ file from the assets directory together with its materials.
pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Model> {
    let (materials, models) = texture::load_textures(file_name, queue, device, layout).await?;
    let meshes = mesh::load_meshes(models, device, file_name);
    Ok(Model { meshes, materials })
}
