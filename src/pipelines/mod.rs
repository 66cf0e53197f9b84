//! Render pipeline definitions and the pipeline registry.
//!
//! Each draw names its pipeline through a [`PipelineId`] into the registry
//! instead of holding a reference to a shader object, so nothing can dangle
//! when the registry is the only owner.

pub mod basic;
pub mod cube;
pub mod lamp;

/// Stable identifier for one of the scene's pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineId {
    /// Instanced textured cubes with Phong lighting.
    Cube,
    /// Loaded OBJ models with Phong lighting.
    Model,
    /// The flat-coloured lamp cube.
    Lamp,
}

/// All pipelines of the demo, constructed once with the context.
#[derive(Debug)]
pub struct Pipelines {
    pub cube: wgpu::RenderPipeline,
    pub model: wgpu::RenderPipeline,
    pub lamp: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            cube: cube::mk_cube_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            model: basic::mk_model_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
            lamp: lamp::mk_lamp_pipeline(
                device,
                config,
                camera_bind_group_layout,
                light_bind_group_layout,
            ),
        }
    }

    pub fn get(&self, id: PipelineId) -> &wgpu::RenderPipeline {
        match id {
            PipelineId::Cube => &self.cube,
            PipelineId::Model => &self.model,
            PipelineId::Lamp => &self.lamp,
        }
    }
}
