//! Hex cell terrain: a grid of byte codes turned into inset, inflated
//! hexagonal prisms.

pub mod builder;
pub mod cell_buffer;
mod entities;
mod systems;

pub use builder::HexTerrainMeshBuilder;
pub use cell_buffer::CellGridBuffer;
pub use entities::CellTerrain;

use bevy::prelude::*;

use crate::generator::MeshStats;

/// Shape, texturing, noise and collider parameters of a terrain mesh.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct TerrainSettings {
    /// Cell apothem in world units.
    pub radius: f32,
    /// Wall height below the caps.
    pub depth: f32,
    /// Scale applied to free cap corners, pulling them towards the center.
    pub edge_verts_inset: f32,
    /// Peak sideways bulge of the walls, relative to `radius`.
    pub edge_inflate: f32,
    /// Horizontal subdivisions of each wall. Zero leaves the caps without walls.
    pub lateral_loops: u32,
    /// UV multiplier.
    pub uv_scale: Vec2,
    /// How far wall UVs slide towards the neighbour at full depth.
    pub uv_back_offset: f32,
    /// Planar noise frequency. Noise does not vary with depth.
    pub noise_scale: Vec2,
    /// Per-axis displacement amplitude.
    pub displacement: Vec3,
    /// Noise seed.
    pub noise_seed: u32,
    /// Also emit a simplified collision mesh.
    pub generate_collider: bool,
    /// Depth fraction at which the collider walls sample the inflated profile.
    pub collider_midpoint: f32,
    /// Skip caps of cells whose whole second ring is occupied.
    pub cull_inside_caps: bool,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            radius: 0.5,
            depth: 0.5,
            edge_verts_inset: 0.5,
            edge_inflate: 0.25,
            lateral_loops: 1,
            uv_scale: Vec2::ONE,
            uv_back_offset: 1.0,
            noise_scale: Vec2::ONE,
            displacement: Vec3::ZERO,
            noise_seed: 0,
            generate_collider: false,
            collider_midpoint: 0.5,
            cull_inside_caps: false,
        }
    }
}

/// Live-editable terrain configuration, pushed into every [`CellTerrain`]
/// when the resource changes.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Grid side length. Changing it clears the grids.
    pub size: usize,
    /// Mesh settings.
    pub settings: TerrainSettings,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: cell_buffer::DEFAULT_GRID_SIZE,
            settings: TerrainSettings::default(),
        }
    }
}

/// Terrain plugin: regenerates dirty [`CellTerrain`] meshes every frame.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainConfig>()
            .register_type::<MeshStats>()
            .insert_resource(self.0.clone())
            .add_systems(
                Update,
                (
                    systems::apply_terrain_config.run_if(
                        resource_changed::<TerrainConfig>
                            .and(not(resource_added::<TerrainConfig>)),
                    ),
                    systems::regenerate_terrain,
                )
                    .chain(),
            );
    }
}
