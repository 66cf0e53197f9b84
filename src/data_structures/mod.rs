//! Scene data structures: the cube primitive, loaded models, textures and
//! per-instance transforms.
//!
//! - `cube` holds the shared unit-cube geometry and cube instance sets
//! - `model` contains mesh and material definitions for loaded OBJ models
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data and GPU buffers

pub mod cube;
pub mod instance;
pub mod model;
pub mod texture;
