//! Branching tubes: a tree of spline segments where children grow out of
//! their parent's points.

mod entities;
mod systems;
pub mod tree;

pub use entities::Branch;
pub use tree::{BranchPoint, BranchSegment, BranchTree, ParentLink, SegmentId};

use bevy::prelude::*;

use crate::curve::CurveSettings;
use crate::generator::MeshStats;

/// Live-editable defaults pushed into every segment of every [`Branch`] when
/// the resource changes.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct BranchConfig {
    /// Tube shape and texturing.
    pub curve: CurveSettings,
    /// Radius at the first and last point of each segment.
    pub radius_range: Vec2,
    /// Emit every segment into the collision mesh.
    pub collider: bool,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            curve: CurveSettings::default(),
            radius_range: Vec2::new(1.0, 0.1),
            collider: false,
        }
    }
}

/// Branch plugin: regenerates dirty [`Branch`] meshes every frame.
pub struct BranchPlugin(pub BranchConfig);

impl Plugin for BranchPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BranchConfig>()
            .register_type::<MeshStats>()
            .insert_resource(self.0.clone())
            .add_systems(
                Update,
                (
                    systems::apply_branch_config.run_if(
                        resource_changed::<BranchConfig>.and(not(resource_added::<BranchConfig>)),
                    ),
                    systems::regenerate_branches,
                )
                    .chain(),
            );
    }
}
