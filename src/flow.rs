//! Application event loop.
//!
//! [`run`] builds the winit event loop and drives [`App`], which owns the
//! graphics [`Context`], the loaded [`Scene`] and the per-frame simulation
//! state. Each redraw advances the simulation by the elapsed wall time,
//! uploads the camera and light uniforms and records one render pass.

use std::sync::Arc;

use anyhow::anyhow;
use instant::{Duration, Instant};
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use crate::{
    context::Context,
    data_structures::texture::Texture,
    scene::Scene,
    sim::SceneState,
};

const WINDOW_TITLE: &str = "Final Project";
const WINDOW_SIZE: (u32, u32) = (800, 600);

/// Samples frame timing over a window and produces the title-bar text.
#[derive(Debug)]
struct FrameSampler {
    window_start: Instant,
    frame_count: u32,
}

/// How long each sampling window lasts.
const SAMPLE_WINDOW: Duration = Duration::from_millis(250);

impl FrameSampler {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frame_count: 0,
        }
    }

    /// Count one frame. When the sampling window has elapsed, returns the
    /// averaged frames per second and per-frame milliseconds and starts the
    /// next window.
    fn sample(&mut self) -> Option<(f64, f64)> {
        let elapsed = self.window_start.elapsed();
        let result = if elapsed > SAMPLE_WINDOW {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            let ms_per_frame = 1000.0 / fps;
            self.window_start = Instant::now();
            self.frame_count = 0;
            Some((fps, ms_per_frame))
        } else {
            None
        };
        self.frame_count += 1;
        result
    }
}

fn title_text(fps: f64, ms_per_frame: f64, position: cgmath::Point3<f32>) -> String {
    format!(
        "FPS: {:.3} Frame Time: {:.3}(ms)   Camera x:{:.3} y:{:.3} z:{:.3}",
        fps, ms_per_frame, position.x, position.y, position.z
    )
}

/// Everything alive once the window exists.
struct AppState {
    ctx: Context,
    scene: Scene,
    sim: SceneState,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let scene = Scene::load(&ctx).await?;
        let sim = SceneState::new(instant::now() as u32);
        Ok(Self {
            ctx,
            scene,
            sim,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Advance the simulation and the camera, then upload the uniforms.
    fn update(&mut self, dt: Duration) {
        let changes = self.sim.update(dt.as_secs_f32());
        self.scene.apply(&self.ctx, &self.sim, changes);

        self.ctx
            .camera
            .controller
            .update(&mut self.ctx.camera.camera, dt);
        self.ctx
            .camera
            .uniform
            .update_view_proj(&self.ctx.camera.camera, &self.ctx.projection);
        self.ctx.queue.write_buffer(
            &self.ctx.camera.buffer,
            0,
            bytemuck::cast_slice(&[self.ctx.camera.uniform]),
        );

        self.ctx.light.uniform.set_position(self.sim.lamp_position());
        self.ctx.light.uniform.set_color(self.sim.light_color.0);
        self.ctx.light.write(&self.ctx.queue);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.scene.draw(&mut render_pass, &self.ctx);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// The winit application. The state is built when the window appears.
pub struct App {
    state: Option<AppState>,
    async_runtime: Runtime,
    last_time: Instant,
    sampler: FrameSampler,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new() -> anyhow::Result<Self> {
        Ok(Self {
            state: None,
            async_runtime: Runtime::new()?,
            last_time: Instant::now(),
            sampler: FrameSampler::new(),
            init_error: None,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.init_error = Some(anyhow!("failed to create the window: {}", e));
                event_loop.exit();
                return;
            }
        };

        // Hide the cursor and keep it captured for mouse look. Locked is not
        // available on every platform, Confined is the fallback.
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            log::warn!("could not grab the cursor: {}", e);
        }
        window.set_cursor_visible(false);

        match self.async_runtime.block_on(AppState::new(window)) {
            Ok(state) => {
                self.last_time = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                match key {
                    KeyCode::Escape => event_loop.exit(),
                    KeyCode::ArrowUp => state.sim.keys.brighten = pressed,
                    KeyCode::ArrowDown => state.sim.keys.dim = pressed,
                    KeyCode::KeyC => state.sim.keys.spawn_cube = pressed,
                    KeyCode::KeyV => state.sim.keys.spawn_model = pressed,
                    _ => (),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                state
                    .ctx
                    .projection
                    .zoom(crate::camera::CameraController::scroll_delta(&delta));
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.update(dt);

                match state.render() {
                    Ok(_) => {
                        if let Some((fps, ms_per_frame)) = self.sampler.sample() {
                            state.ctx.window.set_title(&title_text(
                                fps,
                                ms_per_frame,
                                state.ctx.camera.camera.position,
                            ));
                        }
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new()?;
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.init_error {
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_reports_after_the_window_elapses() {
        let mut sampler = FrameSampler::new();
        assert!(sampler.sample().is_none());
        sampler.window_start = Instant::now() - Duration::from_millis(500);
        sampler.frame_count = 30;
        let (fps, ms_per_frame) = sampler.sample().expect("window elapsed");
        assert!(fps > 0.0);
        assert!((ms_per_frame - 1000.0 / fps).abs() < 1e-9);
        // A fresh window starts counting from this frame.
        assert_eq!(sampler.frame_count, 1);
    }

    #[test]
    fn title_shows_three_decimals() {
        let text = title_text(60.0, 16.6667, cgmath::Point3::new(0.0, 0.0, 3.0));
        assert_eq!(
            text,
            "FPS: 60.000 Frame Time: 16.667(ms)   Camera x:0.000 y:0.000 z:3.000"
        );
    }
}
