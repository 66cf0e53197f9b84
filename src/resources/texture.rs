//! Texture file loading and the texture bind group layout.

use std::io::{BufReader, Cursor};

use crate::data_structures::{model::Material, texture::Texture};

/// Bind group layout for a diffuse plus specular map pair, shared by the
/// cube and model pipelines.
pub fn diffuse_specular_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("diffuse_specular_bind_group_layout"),
    })
}

/// Neutral stand-in colours for textures that could not be loaded or were
/// never named: white leaves the lighting visible, black disables highlights.
pub const FALLBACK_DIFFUSE: [u8; 4] = [255, 255, 255, 255];
pub const FALLBACK_SPECULAR: [u8; 4] = [0, 0, 0, 255];

pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    let path = std::path::Path::new("./").join("assets").join(file_name);
    let txt = std::fs::read_to_string(path)?;
    Ok(txt)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = std::path::Path::new("./").join("assets").join(file_name);
    let data = std::fs::read(path)?;
    Ok(data)
}

/// Load a texture file, falling back to a solid colour when the file is
/// missing or undecodable. Each failed call logs one path-specific warning
/// and rendering continues with the stand-in bound.
pub async fn load_texture(
    file_name: &str,
    is_srgb: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Texture {
    let loaded = match load_binary(file_name).await {
        Ok(data) => Texture::from_bytes(device, queue, &data, file_name, is_srgb),
        Err(e) => Err(e),
    };
    match loaded {
        Ok(texture) => texture,
        Err(e) => {
            log::warn!("Texture failed to load at path {}: {}", file_name, e);
            let fallback = if is_srgb {
                FALLBACK_DIFFUSE
            } else {
                FALLBACK_SPECULAR
            };
            Texture::create_solid(fallback, device, queue, file_name)
        }
    }
}

/// Parse an OBJ file and build the materials its MTL references.
///
/// Guaranteed to return at least one material so mesh material indices
/// always resolve.
pub async fn load_textures(
    file_name: &str,
    queue: &wgpu::Queue,
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<(Vec<Material>, Vec<tobj::Model>)> {
    let obj_text: String = load_string(file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| async move {
            match load_string(&p).await {
                Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                Err(_) => Err(tobj::LoadError::OpenFileFailed),
            }
        },
    )
    .await?;

    let mut materials = Vec::new();
    for m in obj_materials? {
        let diffuse_texture = match &m.diffuse_texture {
            Some(name) => load_texture(name, true, device, queue).await,
            None => {
                log::warn!("material {} in {} names no diffuse texture", m.name, file_name);
                Texture::create_solid(FALLBACK_DIFFUSE, device, queue, &m.name)
            }
        };
        let specular_texture = match &m.specular_texture {
            Some(name) => load_texture(name, false, device, queue).await,
            None => Texture::create_solid(FALLBACK_SPECULAR, device, queue, &m.name),
        };
        materials.push(Material::new(
            device,
            &m.name,
            diffuse_texture,
            specular_texture,
            layout,
        ));
    }

    if materials.is_empty() {
        log::warn!("{} references no materials, using the fallback", file_name);
        materials.push(Material::new(
            device,
            file_name,
            Texture::create_solid(FALLBACK_DIFFUSE, device, queue, file_name),
            Texture::create_solid(FALLBACK_SPECULAR, device, queue, file_name),
            layout,
        ));
    }

    Ok((materials, models))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_file_is_an_error() {
        let result = futures::executor::block_on(load_binary("does_not_exist.png"));
        assert!(result.is_err());
    }
}
