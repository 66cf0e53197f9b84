//! The demo scene: cube field, oscillating lamp, loaded models.
//!
//! [`Scene`] owns the GPU-side object sets. Per-frame animation state lives in
//! [`crate::sim::SceneState`]; each frame [`Scene::apply`] copies that state
//! into the instance transforms before the draw.

use cgmath::{InnerSpace, One, Quaternion, Rad, Rotation3, Vector3};

use crate::{
    context::Context,
    data_structures::{
        cube::{CubeSet, DrawCubes},
        instance::Instance,
        model::{DrawModel, Material, ModelSet},
    },
    pipelines::PipelineId,
    resources::{self, texture::diffuse_specular_layout},
    sim::{FrameChanges, SceneState},
};

/// Starting positions of the textured cube field.
const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

const ROBOT_SCALE: f32 = 0.2;
const NANOSUIT_SCALE: f32 = 0.1;

/// All drawable object sets, in the order they are rendered.
#[derive(Debug)]
pub struct Scene {
    /// Container-textured cubes, the 10 initial ones plus spawned ones.
    pub cubes: CubeSet,
    /// The robot that wanders along X.
    pub robot: ModelSet,
    /// Robots spawned at random positions. Starts empty.
    pub spawned: ModelSet,
    /// The nanosuit standing still at (2, 0, 0).
    pub nanosuit: ModelSet,
}

impl Scene {
    pub async fn load(ctx: &Context) -> anyhow::Result<Self> {
        let layout = diffuse_specular_layout(&ctx.device);

        let diffuse =
            resources::texture::load_texture("container2.png", true, &ctx.device, &ctx.queue)
                .await;
        let specular = resources::texture::load_texture(
            "container2_specular.png",
            false,
            &ctx.device,
            &ctx.queue,
        )
        .await;
        let cube_material = Material::new(&ctx.device, "container", diffuse, specular, &layout);

        let cube_instances = CUBE_POSITIONS
            .iter()
            .map(|p| Instance::from(Vector3::from(*p)))
            .collect::<Vec<_>>();
        let cubes = CubeSet::new(&ctx.device, cube_material, cube_instances);

        let robot_model =
            resources::load_model_obj("robot.obj", &ctx.device, &ctx.queue, &layout).await?;
        let robot = ModelSet::new(
            &ctx.device,
            robot_model,
            vec![Instance {
                position: Vector3::new(0.0, 1.0, 0.0),
                rotation: Quaternion::one(),
                scale: Vector3::new(ROBOT_SCALE, ROBOT_SCALE, ROBOT_SCALE),
            }],
        );

        // Spawned robots share the mesh but live in their own set so the
        // wandering robot's transform stays a single instance.
        let spawned_model =
            resources::load_model_obj("robot.obj", &ctx.device, &ctx.queue, &layout).await?;
        let spawned = ModelSet::new(&ctx.device, spawned_model, vec![]);

        let nanosuit_model =
            resources::load_model_obj("nanosuit.obj", &ctx.device, &ctx.queue, &layout).await?;
        let nanosuit = ModelSet::new(
            &ctx.device,
            nanosuit_model,
            vec![Instance {
                position: Vector3::new(2.0, 0.0, 0.0),
                rotation: Quaternion::one(),
                scale: Vector3::new(NANOSUIT_SCALE, NANOSUIT_SCALE, NANOSUIT_SCALE),
            }],
        );

        Ok(Self {
            cubes,
            robot,
            spawned,
            nanosuit,
        })
    }

    /// Copy this frame's animation state into the instance transforms and
    /// upload them. Spawn requests append new instances first.
    pub fn apply(&mut self, ctx: &Context, state: &SceneState, changes: FrameChanges) {
        if let Some(position) = changes.spawned_cube {
            log::info!("spawning cube at {:?}", position);
            self.cubes.push(Instance::from(position));
        }
        if let Some(position) = changes.spawned_model {
            log::info!("spawning model at {:?}", position);
            self.spawned.push(Instance {
                position,
                rotation: Quaternion::one(),
                scale: Vector3::new(ROBOT_SCALE, ROBOT_SCALE, ROBOT_SCALE),
            });
        }

        // Every cube spins in place about the same diagonal axis.
        let spin = Quaternion::from_axis_angle(
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Rad(state.spin),
        );
        for instance in self.cubes.instances.iter_mut() {
            instance.rotation = spin;
        }
        self.robot.instances[0].position = state.model_position();

        self.cubes.write_to_buffer(&ctx.device, &ctx.queue);
        self.robot.write_to_buffer(&ctx.device, &ctx.queue);
        self.spawned.write_to_buffer(&ctx.device, &ctx.queue);
        // The nanosuit never moves but shares the per-frame upload path.
        self.nanosuit.write_to_buffer(&ctx.device, &ctx.queue);
    }

    /// Record all draws in a fixed order: lamp, robot, spawned models,
    /// nanosuit, then the cube field.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, ctx: &Context) {
        pass.set_pipeline(ctx.pipelines.get(PipelineId::Lamp));
        pass.draw_lamp_cube(
            &ctx.cube_geometry,
            &ctx.camera.bind_group,
            &ctx.light.bind_group,
        );

        pass.set_pipeline(ctx.pipelines.get(PipelineId::Model));
        pass.draw_model_set(&self.robot, &ctx.camera.bind_group, &ctx.light.bind_group);
        pass.draw_model_set(&self.spawned, &ctx.camera.bind_group, &ctx.light.bind_group);
        pass.draw_model_set(&self.nanosuit, &ctx.camera.bind_group, &ctx.light.bind_group);

        pass.set_pipeline(ctx.pipelines.get(PipelineId::Cube));
        pass.draw_cube_set(
            &ctx.cube_geometry,
            &self.cubes,
            &ctx.camera.bind_group,
            &ctx.light.bind_group,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    #[test]
    fn cube_field_matches_layout() {
        assert_eq!(CUBE_POSITIONS.len(), 10);
        assert_eq!(CUBE_POSITIONS[1], [2.0, 5.0, -15.0]);
        assert_eq!(CUBE_POSITIONS[9], [-1.3, 1.0, -1.5]);
    }

    #[test]
    fn spin_axis_is_normalised() {
        let axis = Vector3::new(1.0f32, 1.0, 1.0).normalize();
        assert!((axis.magnitude() - 1.0).abs() < 1e-6);
        let _ = Quaternion::from_axis_angle(axis, Deg(90.0));
    }
}
