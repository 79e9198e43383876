//! Engine-agnostic mesh buffers produced by the builders.
//!
//! Builders write into [`MeshData`] (plain vectors of glam types) and the ECS
//! layer converts the finished data into a Bevy [`Mesh`](bevy::prelude::Mesh)
//! only when uploading.

mod mesh_data;
mod modifier;
mod weld_buffer;

pub use mesh_data::{Bounds, MeshData};
pub use modifier::MeshModifier;
pub use weld_buffer::{DEFAULT_WELD_PRECISION, VertexWeldBuffer};

/// Output of a single generation pass: a render mesh plus an optional
/// simplified collision mesh.
#[derive(Clone, Debug, Default)]
pub struct GeneratedMeshes {
    /// Renderable mesh with normals, colors, UVs and tangents.
    pub main: MeshData,
    /// Position-only mesh for physics, when enabled.
    pub collision: Option<MeshData>,
}
