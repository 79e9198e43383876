use bevy::prelude::*;

use super::{Branch, BranchConfig};
use crate::generator::{self, MeshGenerator};

/// Rebuilds and uploads every dirty [`Branch`].
pub fn regenerate_branches(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut branch_q: Query<(Entity, &mut Branch)>,
) {
    for (entity, mut branch) in &mut branch_q {
        if !branch.tree.is_dirty() {
            continue;
        }
        let Some(generated) = branch.tree.regenerate(false) else {
            continue;
        };
        let stats = generator::upload_generated(&mut commands, &mut meshes, entity, generated);
        debug!(
            "branch {entity}: {} vertices, {} triangles",
            stats.vertices, stats.triangles
        );
    }
}

/// Pushes [`BranchConfig`] into every segment, marking them dirty.
pub fn apply_branch_config(config: Res<BranchConfig>, mut branch_q: Query<&mut Branch>) {
    for mut branch in &mut branch_q {
        let ids: Vec<_> = branch.tree.segment_ids().collect();
        for id in ids {
            branch.tree.set_settings(id, config.curve.clone());
            branch.tree.set_radius_range(id, config.radius_range);
            branch.tree.set_collider(id, config.collider);
        }
    }
    info!("branch config changed, rebuilding");
}
