//! Mesh, material and model types for loaded OBJ geometry.
//!
//! A [`Model`] is a collection of [`Mesh`]es with their [`Material`]s, created
//! by the loaders in [`crate::resources`]. [`ModelSet`] pairs a model with an
//! insertion-ordered list of instances for instanced drawing; instances are
//! appended over the scene's lifetime and never individually removed.
//! [`DrawModel`] extends `wgpu::RenderPass` with the model draw calls.

use std::ops::Range;

use crate::data_structures::{
    instance::{Instance, InstanceBuffer},
    texture,
};

/// Anything with a GPU vertex buffer layout.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Diffuse and specular map bound as one group for the Phong shaders.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub diffuse_texture: texture::Texture,
    pub specular_texture: texture::Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        diffuse_texture: texture::Texture,
        specular_texture: texture::Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse_texture.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular_texture.sampler),
                },
            ],
            label: Some(name),
        });
        Self {
            name: name.to_string(),
            diffuse_texture,
            specular_texture,
            bind_group,
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
}

#[derive(Debug)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

/// A model plus the instances it is drawn at.
#[derive(Debug)]
pub struct ModelSet {
    pub model: Model,
    pub instances: Vec<Instance>,
    instance_buffer: InstanceBuffer,
}

impl ModelSet {
    /// An empty set is valid: it uploads nothing and its draws are skipped
    /// until the first instance is pushed.
    pub fn new(device: &wgpu::Device, model: Model, instances: Vec<Instance>) -> Self {
        let instance_buffer = InstanceBuffer::new(device, &instances);
        Self {
            model,
            instances,
            instance_buffer,
        }
    }

    pub fn push(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Upload the current instance transforms for this frame's draw.
    pub fn write_to_buffer(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.instance_buffer.write(device, queue, &self.instances);
    }

    pub fn instance_buffer_slice(&self) -> wgpu::BufferSlice<'_> {
        self.instance_buffer.slice()
    }
}

/// Render-pass extension methods for drawing models.
pub trait DrawModel {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
    fn draw_model_instanced(
        &mut self,
        model: &Model,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
    /// Bind a set's instance buffer at slot 1 and draw it; no-op when empty.
    fn draw_model_set(
        &mut self,
        set: &ModelSet,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Mesh,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_model_instanced(
        &mut self,
        model: &Model,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        for mesh in &model.meshes {
            let material = &model.materials[mesh.material];
            self.draw_mesh_instanced(
                mesh,
                material,
                instances.clone(),
                camera_bind_group,
                light_bind_group,
            );
        }
    }

    fn draw_model_set(
        &mut self,
        set: &ModelSet,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        if set.instances.is_empty() {
            return;
        }
        self.set_vertex_buffer(1, set.instance_buffer_slice());
        self.draw_model_instanced(
            &set.model,
            0..set.instances.len() as u32,
            camera_bind_group,
            light_bind_group,
        );
    }
}
