//! First-person camera: view/projection math, input controller and the GPU
//! uniform.
//!
//! The camera orientation is derived from yaw and pitch. The controller
//! accumulates WASD movement amounts and mouse deltas from events and applies
//! them in [`CameraController::update`], scaled by the frame's elapsed time
//! for movement and by the mouse sensitivity for rotation.

use cgmath::{Angle, Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

/// wgpu clip space covers z in [0, 1] where OpenGL used [-1, 1]; this matrix
/// maps between the two so the standard perspective math carries over.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_FOVY: Deg<f32> = Deg(1.0);
const MAX_FOVY: Deg<f32> = Deg(45.0);

// Just shy of straight up/down so the view matrix never degenerates.
const PITCH_LIMIT: Rad<f32> = Rad(std::f32::consts::FRAC_PI_2 - 0.0001);

#[derive(Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, Y: Into<Rad<f32>>, R: Into<Rad<f32>>>(
        position: P,
        yaw: Y,
        pitch: R,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// The unit vector the camera looks along.
    pub fn front(&self) -> Vector3<f32> {
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.front(), Vector3::unit_y())
    }
}

#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    /// Scroll-wheel zoom: positive delta narrows the field of view.
    /// Clamped so the projection stays usable.
    pub fn zoom(&mut self, delta: f32) {
        self.fovy.0 = (self.fovy.0 - delta).clamp(MIN_FOVY.0, MAX_FOVY.0);
    }

    pub fn fovy(&self) -> Deg<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Accumulates input between frames and applies it to a [`Camera`].
#[derive(Debug)]
pub struct CameraController {
    amount_left: f32,
    amount_right: f32,
    amount_forward: f32,
    amount_backward: f32,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    speed: f32,
    sensitivity: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            amount_left: 0.0,
            amount_right: 0.0,
            amount_forward: 0.0,
            amount_backward: 0.0,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            speed,
            sensitivity,
        }
    }

    /// Route keyboard window events into movement amounts. Returns whether
    /// the event was consumed.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.process_keyboard(*key, *state),
            _ => false,
        }
    }

    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state == ElementState::Pressed {
            1.0
        } else {
            0.0
        };
        match key {
            KeyCode::KeyW => {
                self.amount_forward = amount;
                true
            }
            KeyCode::KeyS => {
                self.amount_backward = amount;
                true
            }
            KeyCode::KeyA => {
                self.amount_left = amount;
                true
            }
            KeyCode::KeyD => {
                self.amount_right = amount;
                true
            }
            _ => false,
        }
    }

    /// Accumulate a raw mouse motion delta for the next update.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.rotate_horizontal += dx as f32;
        self.rotate_vertical += dy as f32;
    }

    /// One scroll notch maps to one unit of field-of-view change.
    pub fn scroll_delta(delta: &MouseScrollDelta) -> f32 {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
        }
    }

    /// Apply accumulated movement (scaled by `dt`) and rotation (scaled by
    /// the sensitivity) to the camera, then reset the mouse deltas.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        let front = camera.front();
        let right = front.cross(Vector3::unit_y()).normalize();
        camera.position += front * (self.amount_forward - self.amount_backward) * self.speed * dt;
        camera.position += right * (self.amount_right - self.amount_left) * self.speed * dt;

        camera.yaw += Deg(self.rotate_horizontal * self.sensitivity).into();
        // Screen y grows downwards, pitch grows upwards.
        camera.pitch += Deg(-self.rotate_vertical * self.sensitivity).into();
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;

        if camera.pitch < -PITCH_LIMIT {
            camera.pitch = -PITCH_LIMIT;
        } else if camera.pitch > PITCH_LIMIT {
            camera.pitch = PITCH_LIMIT;
        }
    }
}

/// Host-side copy of the camera data every shader reads.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state plus its GPU resources, owned by the context.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera, projection: &Projection) -> Self {
        let controller = CameraController::new(2.5, 0.1);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new((0.0, 0.0, 3.0), Deg(-90.0), Deg(0.0));
        let front = camera.front();
        assert!(front.x.abs() < 1e-6);
        assert!(front.y.abs() < 1e-6);
        assert!((front.z + 1.0).abs() < 1e-6);

        // The world origin sits 3 units ahead of the camera.
        let view = camera.calc_matrix();
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.z + 3.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
        let mut controller = CameraController::new(2.5, 0.1);
        controller.handle_mouse(0.0, -100_000.0);
        controller.update(&mut camera, Duration::from_millis(16));
        assert!(camera.pitch <= PITCH_LIMIT);
        controller.handle_mouse(0.0, 100_000.0);
        controller.update(&mut camera, Duration::from_millis(16));
        assert!(camera.pitch >= -PITCH_LIMIT);
    }

    #[test]
    fn zoom_clamps_to_fov_range() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
        projection.zoom(100.0);
        assert_eq!(projection.fovy(), Deg(1.0));
        projection.zoom(-100.0);
        assert_eq!(projection.fovy(), Deg(45.0));
    }

    #[test]
    fn forward_movement_scales_with_dt() {
        let mut camera = Camera::new((0.0, 0.0, 3.0), Deg(-90.0), Deg(0.0));
        let mut controller = CameraController::new(2.5, 0.1);
        controller.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        controller.update(&mut camera, Duration::from_secs(1));
        assert!((camera.position.z - 0.5).abs() < 1e-5);

        // Zero elapsed time moves nothing even with the key held.
        controller.update(&mut camera, Duration::from_secs(0));
        assert!((camera.position.z - 0.5).abs() < 1e-5);
    }
}
