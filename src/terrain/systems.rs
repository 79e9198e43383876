use bevy::prelude::*;

use super::{CellTerrain, TerrainConfig};
use crate::generator::{self, MeshGenerator};

/// Rebuilds and uploads every dirty [`CellTerrain`].
pub fn regenerate_terrain(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut terrain_q: Query<(Entity, &mut CellTerrain)>,
) {
    for (entity, mut terrain) in &mut terrain_q {
        if !terrain.is_dirty() {
            continue;
        }
        let Some(generated) = terrain.regenerate(false) else {
            continue;
        };
        let has_collider = generated.collision.is_some();
        let stats = generator::upload_generated(&mut commands, &mut meshes, entity, generated);
        debug!(
            "terrain {entity}: {} vertices, {} triangles, collider {has_collider}",
            stats.vertices, stats.triangles
        );
    }
}

/// Pushes [`TerrainConfig`] into every terrain. A size change clears the grid.
pub fn apply_terrain_config(config: Res<TerrainConfig>, mut terrain_q: Query<&mut CellTerrain>) {
    for mut terrain in &mut terrain_q {
        if terrain.buffer().size() != config.size {
            warn!(
                "terrain grid resized {} -> {}, cells cleared",
                terrain.buffer().size(),
                config.size
            );
            terrain.resize(config.size);
        }
        terrain.set_settings(config.settings.clone());
    }
}
