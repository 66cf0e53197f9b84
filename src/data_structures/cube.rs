//! The shared unit-cube primitive and cube instance collections.
//!
//! All cubes in the scene (the textured ones and the lamp) share a single
//! 36-vertex GPU buffer, the [`CubeGeometry`]. It is constructed exactly once,
//! owned by the [`crate::context::Context`] for the lifetime of the graphics
//! device, and passed by reference to every draw, so there is no hidden
//! initialization order to get wrong.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::{Instance, InstanceBuffer},
    model::{Material, Vertex},
};

/// One cube vertex: position, texture coordinate, normal. Stride 8 floats.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for CubeVertex {
    /// Position at shader location 0, texture coordinates at 2, normal at 3.
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<CubeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

const fn v(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> CubeVertex {
    CubeVertex {
        position,
        tex_coords,
        normal,
    }
}

/// The fixed unit-cube dataset: 6 faces as 2 triangles each, 36 vertices.
pub const fn cube_vertices() -> [CubeVertex; 36] {
    [
        // back face (-Z)
        v([-0.5, -0.5, -0.5], [0.0, 0.0], [0.0, 0.0, -1.0]),
        v([0.5, -0.5, -0.5], [1.0, 0.0], [0.0, 0.0, -1.0]),
        v([0.5, 0.5, -0.5], [1.0, 1.0], [0.0, 0.0, -1.0]),
        v([0.5, 0.5, -0.5], [1.0, 1.0], [0.0, 0.0, -1.0]),
        v([-0.5, 0.5, -0.5], [0.0, 1.0], [0.0, 0.0, -1.0]),
        v([-0.5, -0.5, -0.5], [0.0, 0.0], [0.0, 0.0, -1.0]),
        // front face (+Z)
        v([-0.5, -0.5, 0.5], [0.0, 0.0], [0.0, 0.0, 1.0]),
        v([0.5, -0.5, 0.5], [1.0, 0.0], [0.0, 0.0, 1.0]),
        v([0.5, 0.5, 0.5], [1.0, 1.0], [0.0, 0.0, 1.0]),
        v([0.5, 0.5, 0.5], [1.0, 1.0], [0.0, 0.0, 1.0]),
        v([-0.5, 0.5, 0.5], [0.0, 1.0], [0.0, 0.0, 1.0]),
        v([-0.5, -0.5, 0.5], [0.0, 0.0], [0.0, 0.0, 1.0]),
        // left face (-X)
        v([-0.5, 0.5, 0.5], [1.0, 0.0], [-1.0, 0.0, 0.0]),
        v([-0.5, 0.5, -0.5], [1.0, 1.0], [-1.0, 0.0, 0.0]),
        v([-0.5, -0.5, -0.5], [0.0, 1.0], [-1.0, 0.0, 0.0]),
        v([-0.5, -0.5, -0.5], [0.0, 1.0], [-1.0, 0.0, 0.0]),
        v([-0.5, -0.5, 0.5], [0.0, 0.0], [-1.0, 0.0, 0.0]),
        v([-0.5, 0.5, 0.5], [1.0, 0.0], [-1.0, 0.0, 0.0]),
        // right face (+X)
        v([0.5, 0.5, 0.5], [1.0, 0.0], [1.0, 0.0, 0.0]),
        v([0.5, 0.5, -0.5], [1.0, 1.0], [1.0, 0.0, 0.0]),
        v([0.5, -0.5, -0.5], [0.0, 1.0], [1.0, 0.0, 0.0]),
        v([0.5, -0.5, -0.5], [0.0, 1.0], [1.0, 0.0, 0.0]),
        v([0.5, -0.5, 0.5], [0.0, 0.0], [1.0, 0.0, 0.0]),
        v([0.5, 0.5, 0.5], [1.0, 0.0], [1.0, 0.0, 0.0]),
        // bottom face (-Y)
        v([-0.5, -0.5, -0.5], [0.0, 1.0], [0.0, -1.0, 0.0]),
        v([0.5, -0.5, -0.5], [1.0, 1.0], [0.0, -1.0, 0.0]),
        v([0.5, -0.5, 0.5], [1.0, 0.0], [0.0, -1.0, 0.0]),
        v([0.5, -0.5, 0.5], [1.0, 0.0], [0.0, -1.0, 0.0]),
        v([-0.5, -0.5, 0.5], [0.0, 0.0], [0.0, -1.0, 0.0]),
        v([-0.5, -0.5, -0.5], [0.0, 1.0], [0.0, -1.0, 0.0]),
        // top face (+Y)
        v([-0.5, 0.5, -0.5], [0.0, 1.0], [0.0, 1.0, 0.0]),
        v([0.5, 0.5, -0.5], [1.0, 1.0], [0.0, 1.0, 0.0]),
        v([0.5, 0.5, 0.5], [1.0, 0.0], [0.0, 1.0, 0.0]),
        v([0.5, 0.5, 0.5], [1.0, 0.0], [0.0, 1.0, 0.0]),
        v([-0.5, 0.5, 0.5], [0.0, 0.0], [0.0, 1.0, 0.0]),
        v([-0.5, 0.5, -0.5], [0.0, 1.0], [0.0, 1.0, 0.0]),
    ]
}

/// The one shared vertex buffer for all cube draws in the process.
#[derive(Debug)]
pub struct CubeGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
}

impl CubeGeometry {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertices = cube_vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            num_vertices: vertices.len() as u32,
        }
    }
}

/// The textured cubes of the scene: insertion-ordered instances plus the
/// material (diffuse + specular map) they all share.
///
/// Instances are appended at setup and at runtime spawns, never removed; they
/// live as long as the set itself.
#[derive(Debug)]
pub struct CubeSet {
    pub instances: Vec<Instance>,
    pub material: Material,
    instance_buffer: InstanceBuffer,
}

impl CubeSet {
    pub fn new(device: &wgpu::Device, material: Material, instances: Vec<Instance>) -> Self {
        let instance_buffer = InstanceBuffer::new(device, &instances);
        Self {
            instances,
            material,
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

/// Render-pass extension methods for cube draws.
pub trait DrawCubes {
    /// Draw the shared cube geometry for a range of instances.
    fn draw_cubes_instanced(
        &mut self,
        geometry: &CubeGeometry,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
    /// Draw a whole cube set; no-op when it is empty.
    fn draw_cube_set(
        &mut self,
        geometry: &CubeGeometry,
        set: &CubeSet,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
    /// Draw the lamp cube. Its position and colour come from the light
    /// uniform, so no instance buffer or material is involved.
    fn draw_lamp_cube(
        &mut self,
        geometry: &CubeGeometry,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    );
}

impl DrawCubes for wgpu::RenderPass<'_> {
    fn draw_cubes_instanced(
        &mut self,
        geometry: &CubeGeometry,
        material: &Material,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw(0..geometry.num_vertices, instances);
    }

    fn draw_cube_set(
        &mut self,
        geometry: &CubeGeometry,
        set: &CubeSet,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        if set.instances.is_empty() {
            log::warn!("attempted to draw a cube set with zero instances");
            return;
        }
        self.set_vertex_buffer(1, set.instance_buffer_slice());
        self.draw_cubes_instanced(
            geometry,
            &set.material,
            0..set.instances.len() as u32,
            camera_bind_group,
            light_bind_group,
        );
    }

    fn draw_lamp_cube(
        &mut self,
        geometry: &CubeGeometry,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_bind_group(0, camera_bind_group, &[]);
        self.set_bind_group(1, light_bind_group, &[]);
        self.draw(0..geometry.num_vertices, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_has_36_vertices_in_unit_extents() {
        let vertices = cube_vertices();
        assert_eq!(vertices.len(), 36);
        for vertex in &vertices {
            for axis in vertex.position {
                assert!(axis == 0.5 || axis == -0.5);
            }
            for coord in vertex.tex_coords {
                assert!((0.0..=1.0).contains(&coord));
            }
        }
    }

    #[test]
    fn normals_are_unit_and_axis_aligned() {
        for vertex in &cube_vertices() {
            let [x, y, z] = vertex.normal;
            let length_sq = x * x + y * y + z * z;
            assert!((length_sq - 1.0).abs() < 1e-6);
            let zeroes = [x, y, z].iter().filter(|c| **c == 0.0).count();
            assert_eq!(zeroes, 2, "normal must point along a single axis");
        }
    }

    #[test]
    fn each_face_has_six_vertices_sharing_a_normal() {
        let vertices = cube_vertices();
        for face in vertices.chunks(6) {
            let normal = face[0].normal;
            assert!(face.iter().all(|vertex| vertex.normal == normal));
        }
    }

    #[test]
    fn vertex_layout_matches_8_float_stride() {
        let desc = CubeVertex::desc();
        assert_eq!(desc.array_stride, 8 * std::mem::size_of::<f32>() as u64);
        let locations: Vec<u32> = desc.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 2, 3]);
        assert_eq!(desc.attributes[1].offset, 3 * std::mem::size_of::<f32>() as u64);
        assert_eq!(desc.attributes[2].offset, 5 * std::mem::size_of::<f32>() as u64);
    }
}
