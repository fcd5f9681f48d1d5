//! per-nefer
//!
//! A cinematic render of the Per-nefer embalming workshop, native and in the
//! browser. Every texture and mesh is synthesized at startup; a handful of
//! props animate by torchlight inside a fogged, tone mapped chamber.
//!
//! High-level modules
//! - `camera`: camera types and uniforms for view/projection
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, materials, scene graph)
//! - `flow`: high level flow control (scenes / update loops)
//! - `page`: the window or canvas hosting the scene
//! - `pipelines`: the lit scene shader, its pipeline variants and the light uniform
//! - `procedural`: texture generators (hieroglyphs, stone grain, smoke)
//! - `props`: static and animated props of the chamber
//! - `resources`: primitive meshes and their GPU resources
//! - `render`: render composition for efficient pipeline reuse
//! - `scene`: composition of the chamber and its flow
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod page;
pub mod pipelines;
pub mod procedural;
pub mod props;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use wgpu;
