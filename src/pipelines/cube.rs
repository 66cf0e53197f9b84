//! The Phong pipeline for the instanced textured cubes.

use crate::{
    data_structures::{
        cube::CubeVertex,
        instance::InstanceRaw,
        model::Vertex,
        texture::Texture,
    },
    pipelines::basic::mk_render_pipeline,
    resources::texture::diffuse_specular_layout,
};

pub fn mk_cube_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Cube Pipeline Layout"),
        bind_group_layouts: &[
            &diffuse_specular_layout(device),
            camera_bind_group_layout,
            light_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Cube Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("cube_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        None,
        &[CubeVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
