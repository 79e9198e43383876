#![warn(missing_docs)]
//! Procedural mesh generation on Bevy.
//!
//! Two builders turn compact descriptions into render and collision meshes:
//!
//! - [`curve::TubeMeshBuilder`] extrudes a ring along a centripetal
//!   Catmull-Rom spline with minimal twist, used by the [`branch`] trees.
//! - [`terrain::HexTerrainMeshBuilder`] turns a grid of byte cell codes into
//!   capped, inset and inflated hexagonal prisms with noise displacement.
//!
//! Both write plain [`mesh::MeshData`] and never touch the ECS. The
//! [`terrain::TerrainPlugin`] and [`branch::BranchPlugin`] regenerate dirty
//! components through the [`generator::MeshGenerator`] contract and upload
//! the result as Bevy meshes.

pub mod branch;
pub mod curve;
pub mod generator;
pub mod hex;
pub mod math;
pub mod mesh;
pub mod terrain;
