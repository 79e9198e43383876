use bevy::prelude::*;

use super::TerrainSettings;
use super::builder::HexTerrainMeshBuilder;
use super::cell_buffer::CellGridBuffer;
use crate::generator::MeshGenerator;
use crate::hex::Hex;
use crate::mesh::{Bounds, GeneratedMeshes};

/// A cell grid rendered as one terrain mesh on this entity.
///
/// Every mutator marks the terrain dirty; the plugin rebuilds it on the next
/// frame.
#[derive(Component, Clone, Debug)]
pub struct CellTerrain {
    buffer: CellGridBuffer,
    settings: TerrainSettings,
    builder: HexTerrainMeshBuilder,
    dirty: bool,
}

impl Default for CellTerrain {
    fn default() -> Self {
        Self::new(CellGridBuffer::default(), TerrainSettings::default())
    }
}

impl CellTerrain {
    /// Terrain over `buffer`, dirty so the first frame builds it.
    pub fn new(buffer: CellGridBuffer, settings: TerrainSettings) -> Self {
        Self {
            builder: HexTerrainMeshBuilder::new(settings.noise_seed),
            buffer,
            settings,
            dirty: true,
        }
    }

    /// The cell codes.
    pub fn buffer(&self) -> &CellGridBuffer {
        &self.buffer
    }

    /// Current settings.
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Mutable settings. Marks the terrain dirty.
    pub fn settings_mut(&mut self) -> &mut TerrainSettings {
        self.dirty = true;
        &mut self.settings
    }

    /// Replaces the settings, marking dirty only when they differ.
    pub fn set_settings(&mut self, settings: TerrainSettings) {
        if self.settings != settings {
            self.settings = settings;
            self.dirty = true;
        }
    }

    /// Writes `code` at `hex`, clamping its offset coordinate into the grid.
    pub fn add_cell(&mut self, hex: Hex, code: u8) {
        if self.buffer.size() == 0 {
            return;
        }
        let max = IVec2::splat(self.buffer.size() as i32 - 1);
        let offset = hex.to_offset().clamp(IVec2::ZERO, max);
        self.buffer.set(offset.x, offset.y, code);
        self.dirty = true;
    }

    /// Empties the cell at `hex`, clamped like [`add_cell`](Self::add_cell).
    pub fn remove_cell(&mut self, hex: Hex) {
        self.add_cell(hex, 0);
    }

    /// Code at `hex`, 0 outside the grid.
    pub fn cell(&self, hex: Hex) -> u8 {
        let offset = hex.to_offset();
        self.buffer.get(offset.x, offset.y)
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.dirty = true;
    }

    /// Reinitializes the grid at a new side length, all empty. An unchanged
    /// size keeps the cells.
    pub fn resize(&mut self, size: usize) {
        self.buffer.resize(size);
        self.dirty = true;
    }

    /// Box from the origin to the farthest cell center at full depth.
    pub fn bounds(&self) -> Bounds {
        let last = self.buffer.size().saturating_sub(1) as i32;
        let max = Hex::from_offset(last, last).to_planar(self.settings.radius);
        Bounds {
            min: Vec3::ZERO,
            max: max.extend(self.settings.depth),
        }
    }
}

impl MeshGenerator for CellTerrain {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    fn generate(&mut self) -> GeneratedMeshes {
        let meshes = self.builder.build(&self.buffer, &self.settings);
        if meshes.main.is_empty() {
            debug!("terrain: no occupied cells, empty mesh");
        }
        meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Cell mutation ──────────────────────────────────────────────

    #[test]
    fn add_cell_writes_at_offset() {
        let mut t = CellTerrain::default();
        t.set_dirty(false);
        let hex = Hex::from_offset(4, 7);
        t.add_cell(hex, 2);
        assert_eq!(t.buffer().get(4, 7), 2);
        assert_eq!(t.cell(hex), 2);
        assert!(t.is_dirty());
    }

    #[test]
    fn add_cell_clamps_into_grid() {
        let mut t = CellTerrain::new(CellGridBuffer::new(8), TerrainSettings::default());
        t.add_cell(Hex::from_offset(-3, 20), 1);
        assert_eq!(t.buffer().get(0, 7), 1);
        t.add_cell(Hex::from_offset(100, -1), 3);
        assert_eq!(t.buffer().get(7, 0), 3);
        assert_eq!(t.buffer().occupied_count(), 2);
    }

    #[test]
    fn zero_sized_grid_ignores_cells() {
        let mut t = CellTerrain::new(CellGridBuffer::new(0), TerrainSettings::default());
        t.add_cell(Hex::ZERO, 1);
        assert_eq!(t.buffer().occupied_count(), 0);
        assert!(t.regenerate(false).unwrap().main.is_empty());
    }

    #[test]
    fn clear_and_resize_mark_dirty() {
        let mut t = CellTerrain::default();
        t.add_cell(Hex::ZERO, 1);
        t.set_dirty(false);
        t.clear();
        assert!(t.is_dirty());
        assert_eq!(t.buffer().occupied_count(), 0);

        t.set_dirty(false);
        t.resize(4);
        assert!(t.is_dirty());
        assert_eq!(t.buffer().size(), 4);
    }

    #[test]
    fn settings_edits_mark_dirty() {
        let mut t = CellTerrain::default();
        t.set_dirty(false);
        t.set_settings(TerrainSettings::default());
        assert!(!t.is_dirty(), "identical settings are not an edit");
        t.settings_mut().depth = 1.0;
        assert!(t.is_dirty());
    }

    // ── Regeneration ───────────────────────────────────────────────

    #[test]
    fn regenerates_once_per_edit() {
        let mut t = CellTerrain::default();
        t.add_cell(Hex::from_offset(2, 2), 1);
        let first = t.regenerate(false).unwrap();
        assert_eq!(first.main.triangle_count(), 18);
        assert!(t.regenerate(false).is_none());
        t.add_cell(Hex::from_offset(3, 2), 2);
        assert!(t.regenerate(false).is_some());
    }

    #[test]
    fn collider_follows_setting() {
        let mut t = CellTerrain::default();
        t.add_cell(Hex::from_offset(2, 2), 1);
        assert!(t.regenerate(false).unwrap().collision.is_none());
        t.settings_mut().generate_collider = true;
        assert!(t.regenerate(false).unwrap().collision.is_some());
    }

    #[test]
    fn bounds_reach_last_cell() {
        let t = CellTerrain::new(CellGridBuffer::new(4), TerrainSettings::default());
        let b = t.bounds();
        let expected = Hex::from_offset(3, 3).to_planar(0.5);
        assert_eq!(b.min, Vec3::ZERO);
        assert_eq!(b.max, expected.extend(0.5));
    }
}
