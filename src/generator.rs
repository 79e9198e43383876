//! Dirty-flag regeneration contract shared by terrain and branch components,
//! plus the components their meshes are uploaded into.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;

use crate::mesh::GeneratedMeshes;

/// Handle to the collision mesh of a generator entity. Removed again when
/// the collider is switched off.
#[derive(Component, Clone, Debug)]
pub struct CollisionMesh(pub Handle<Mesh>);

/// Size of the last uploaded main mesh.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub struct MeshStats {
    /// Vertex count.
    pub vertices: usize,
    /// Triangle count.
    pub triangles: usize,
}

/// Uploads `generated` for `entity`: swaps its [`Mesh3d`], inserts or removes
/// [`CollisionMesh`], and records [`MeshStats`].
///
/// An empty main mesh removes the `Mesh3d` instead of uploading nothing.
pub fn upload_generated(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    entity: Entity,
    generated: GeneratedMeshes,
) -> MeshStats {
    let stats = MeshStats {
        vertices: generated.main.vertex_count(),
        triangles: generated.main.triangle_count(),
    };
    let mut ec = commands.entity(entity);
    ec.insert(stats);

    if generated.main.is_empty() {
        ec.remove::<Mesh3d>();
    } else {
        let handle = meshes.add(generated.main.into_mesh(RenderAssetUsages::default()));
        ec.insert(Mesh3d(handle));
    }

    match generated.collision {
        Some(collision) if !collision.is_empty() => {
            // Never rendered; physics reads it on the CPU side.
            let handle = meshes.add(collision.into_mesh(RenderAssetUsages::MAIN_WORLD));
            ec.insert(CollisionMesh(handle));
        }
        _ => {
            ec.remove::<CollisionMesh>();
        }
    }
    stats
}

/// A component that owns its inputs and rebuilds meshes from them on demand.
///
/// Mutators mark the generator dirty. [`regenerate`](Self::regenerate)
/// rebuilds when dirty (or forced) and clears the flag.
pub trait MeshGenerator {
    /// Whether inputs changed since the last rebuild.
    fn is_dirty(&self) -> bool;

    /// Sets or clears the dirty flag.
    fn set_dirty(&mut self, dirty: bool);

    /// Rebuilds the meshes from the current inputs. Does not touch the flag.
    fn generate(&mut self) -> GeneratedMeshes;

    /// Flags the generator for a rebuild.
    fn mark_dirty(&mut self) {
        self.set_dirty(true);
    }

    /// Rebuilds when dirty or `force` is set, clearing the flag. Returns
    /// `None` when nothing needed doing.
    fn regenerate(&mut self, force: bool) -> Option<GeneratedMeshes> {
        if !force && !self.is_dirty() {
            return None;
        }
        self.set_dirty(false);
        Some(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        dirty: bool,
        runs: u32,
    }

    impl MeshGenerator for Counter {
        fn is_dirty(&self) -> bool {
            self.dirty
        }

        fn set_dirty(&mut self, dirty: bool) {
            self.dirty = dirty;
        }

        fn generate(&mut self) -> GeneratedMeshes {
            self.runs += 1;
            GeneratedMeshes::default()
        }
    }

    #[test]
    fn clean_generator_skips() {
        let mut g = Counter::default();
        assert!(g.regenerate(false).is_none());
        assert_eq!(g.runs, 0);
    }

    #[test]
    fn dirty_generator_runs_once() {
        let mut g = Counter::default();
        g.mark_dirty();
        assert!(g.regenerate(false).is_some());
        assert!(!g.is_dirty());
        assert!(g.regenerate(false).is_none());
        assert_eq!(g.runs, 1);
    }

    #[test]
    fn force_runs_when_clean() {
        let mut g = Counter::default();
        assert!(g.regenerate(true).is_some());
        assert_eq!(g.runs, 1);
    }
}
