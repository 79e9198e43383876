//! Standalone mesh post-processing. No plugin drives it: callers
//! apply a [`MeshModifier`] to any [`MeshData`] they already hold, e.g. the
//! `main` mesh of a generation pass, before uploading it.

use bevy::prelude::*;

use super::MeshData;

/// Derives a new mesh from a reference mesh by remapping its UVs and
/// optionally replacing its normals.
#[derive(Clone, Debug, Reflect)]
pub struct MeshModifier {
    /// Multiplier applied to the reference UVs.
    pub uv_scale: Vec2,
    /// Offset added after scaling.
    pub uv_offset: Vec2,
    /// Keep the untouched reference UVs in the secondary UV set.
    pub copy_original_uv: bool,
    /// Replace normals with the direction from `normal_origin` to each vertex.
    pub edit_normals: bool,
    /// Origin of the radial normals.
    pub normal_origin: Vec3,
}

impl Default for MeshModifier {
    fn default() -> Self {
        Self {
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            copy_original_uv: true,
            edit_normals: false,
            normal_origin: Vec3::ZERO,
        }
    }
}

impl MeshModifier {
    /// Builds the modified copy of `reference`. Bounds are carried over and
    /// tangents recomputed.
    pub fn apply(&self, reference: &MeshData) -> MeshData {
        let uvs = reference
            .uvs
            .iter()
            .map(|&uv| uv * self.uv_scale + self.uv_offset)
            .collect();
        let uvs_1 = if self.copy_original_uv {
            reference.uvs.clone()
        } else {
            Vec::new()
        };
        let normals = if self.edit_normals {
            reference
                .positions
                .iter()
                .map(|&p| (p - self.normal_origin).normalize_or_zero())
                .collect()
        } else {
            reference.normals.clone()
        };

        let mut data = MeshData {
            positions: reference.positions.clone(),
            normals,
            colors: reference.colors.clone(),
            uvs,
            uvs_1,
            tangents: Vec::new(),
            indices: reference.indices.clone(),
            bounds: reference.bounds,
        };
        data.recalculate_tangents();
        data
    }
}
