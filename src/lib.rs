//! cubelight
//!
//! A first-person demo scene rendered with wgpu: a field of spinning textured
//! cubes lit by a wandering lamp cube, plus OBJ models loaded from disk. The
//! camera flies freely with keyboard and mouse, and new cubes and models can
//! be spawned at random positions at runtime.
//!
//! High-level modules
//! - `camera`: camera types, controller and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, instances, textures and the cube primitive
//! - `flow`: the application event loop and frame timing
//! - `pipelines`: the cube, model and lamp render pipelines
//! - `resources`: helpers to load textures and OBJ models
//! - `scene`: the drawable object sets and their per-frame transforms
//! - `sim`: plain-data simulation state, testable without a GPU
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod sim;

// Re-exports commonly used types for convenience in downstream code.
pub use crate::context::Context;
pub use crate::scene::Scene;
pub use crate::sim::SceneState;
