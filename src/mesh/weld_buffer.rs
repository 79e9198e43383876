use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::MeshData;
use crate::math;

/// Default welding tolerance in world units.
pub const DEFAULT_WELD_PRECISION: f32 = 0.001;

/// Position rounded to multiples of the weld precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct WeldKey([i64; 3]);

impl WeldKey {
    fn new(pos: Vec3, precision: f32) -> Self {
        Self([
            math::round_to_precision(pos.x, precision),
            math::round_to_precision(pos.y, precision),
            math::round_to_precision(pos.z, precision),
        ])
    }
}

/// Accumulates vertices and triangles, merging vertices that round to the
/// same position.
///
/// Use either [`add_vertex`](Self::add_vertex) (position only, for collision
/// meshes) or [`add_vertex_with`](Self::add_vertex_with) on one buffer, never
/// both: the UV/color arrays only stay parallel to the positions when every
/// vertex carries them.
#[derive(Clone, Debug)]
pub struct VertexWeldBuffer {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    colors: Vec<LinearRgba>,
    indices: Vec<u32>,
    lookup: HashMap<WeldKey, u32>,
    precision: f32,
}

impl Default for VertexWeldBuffer {
    fn default() -> Self {
        Self::with_precision(DEFAULT_WELD_PRECISION)
    }
}

impl VertexWeldBuffer {
    /// Empty buffer welding at `precision` world units.
    pub fn with_precision(precision: f32) -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            lookup: HashMap::new(),
            precision,
        }
    }

    /// Number of unique vertices so far.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles so far.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Stored position of vertex `index`.
    pub fn position(&self, index: u32) -> Option<Vec3> {
        self.positions.get(index as usize).copied()
    }

    /// Stored UV of vertex `index`.
    pub fn uv(&self, index: u32) -> Option<Vec2> {
        self.uvs.get(index as usize).copied()
    }

    /// Stored color of vertex `index`.
    pub fn color(&self, index: u32) -> Option<LinearRgba> {
        self.colors.get(index as usize).copied()
    }

    /// Index of the vertex at `pos`, appending it if no welded vertex exists.
    pub fn add_vertex(&mut self, pos: Vec3) -> u32 {
        let key = WeldKey::new(pos, self.precision);
        if let Some(&idx) = self.lookup.get(&key) {
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(pos);
        self.lookup.insert(key, idx);
        idx
    }

    /// Like [`add_vertex`](Self::add_vertex), carrying a UV and color.
    ///
    /// On a weld, the stored UV and color become the mean of the stored value
    /// and the new one. Successive welds therefore weigh the latest value at
    /// one half, not `1 / n`.
    pub fn add_vertex_with(&mut self, pos: Vec3, uv: Vec2, color: LinearRgba) -> u32 {
        let key = WeldKey::new(pos, self.precision);
        if let Some(&idx) = self.lookup.get(&key) {
            let i = idx as usize;
            self.uvs[i] = (self.uvs[i] + uv) * 0.5;
            self.colors[i] = average(self.colors[i], color);
            return idx;
        }
        let idx = self.positions.len() as u32;
        self.positions.push(pos);
        self.uvs.push(uv);
        self.colors.push(color);
        self.lookup.insert(key, idx);
        idx
    }

    /// Appends one triangle in the given winding order.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend([a, b, c]);
    }

    /// Moves the accumulated geometry into a [`MeshData`] with fresh bounds.
    pub fn into_mesh_data(self) -> MeshData {
        let mut data = MeshData {
            positions: self.positions,
            uvs: self.uvs,
            colors: self.colors,
            indices: self.indices,
            ..default()
        };
        data.recalculate_bounds();
        data
    }
}

fn average(a: LinearRgba, b: LinearRgba) -> LinearRgba {
    LinearRgba::new(
        (a.red + b.red) * 0.5,
        (a.green + b.green) * 0.5,
        (a.blue + b.blue) * 0.5,
        (a.alpha + b.alpha) * 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Welding ────────────────────────────────────────────────────

    #[test]
    fn same_position_twice_is_one_vertex() {
        let mut buf = VertexWeldBuffer::default();
        let a = buf.add_vertex(Vec3::new(1.0, 2.0, 3.0));
        let b = buf.add_vertex(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a, b);
        assert_eq!(buf.vertex_count(), 1);
    }

    #[test]
    fn positions_within_tolerance_weld() {
        let mut buf = VertexWeldBuffer::default();
        let a = buf.add_vertex(Vec3::new(0.5, 0.5, 0.5));
        let b = buf.add_vertex(Vec3::new(0.500_2, 0.499_8, 0.5));
        assert_eq!(a, b);
        assert_eq!(buf.vertex_count(), 1);
        // The first position written wins.
        assert_eq!(buf.position(a), Some(Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn positions_rounding_apart_stay_separate() {
        let mut buf = VertexWeldBuffer::default();
        let a = buf.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        let b = buf.add_vertex(Vec3::new(0.002, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(buf.vertex_count(), 2);
    }

    #[test]
    fn coarser_precision_welds_more() {
        let mut buf = VertexWeldBuffer::with_precision(0.1);
        buf.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        buf.add_vertex(Vec3::new(0.04, 0.0, 0.0));
        assert_eq!(buf.vertex_count(), 1);
    }

    // ── Attribute averaging ────────────────────────────────────────

    #[test]
    fn second_weld_averages_uv_and_color() {
        let mut buf = VertexWeldBuffer::default();
        let idx = buf.add_vertex_with(Vec3::ZERO, Vec2::new(0.0, 0.0), LinearRgba::RED);
        buf.add_vertex_with(Vec3::ZERO, Vec2::new(1.0, 1.0), LinearRgba::BLUE);
        assert_eq!(buf.uv(idx), Some(Vec2::new(0.5, 0.5)));
        let c = buf.color(idx).unwrap();
        assert!((c.red - 0.5).abs() < 1e-6);
        assert!((c.blue - 0.5).abs() < 1e-6);
        assert!(c.green.abs() < 1e-6);
    }

    #[test]
    fn third_weld_is_pairwise_not_running_mean() {
        let mut buf = VertexWeldBuffer::default();
        let idx = buf.add_vertex_with(Vec3::ZERO, Vec2::new(0.0, 0.0), LinearRgba::BLACK);
        buf.add_vertex_with(Vec3::ZERO, Vec2::new(1.0, 0.0), LinearRgba::BLACK);
        buf.add_vertex_with(Vec3::ZERO, Vec2::new(1.0, 0.0), LinearRgba::BLACK);
        // (0 + 1) / 2 = 0.5, then (0.5 + 1) / 2 = 0.75 rather than 2/3.
        let uv = buf.uv(idx).unwrap();
        assert!((uv.x - 0.75).abs() < 1e-6, "got {uv:?}");
        assert_eq!(buf.vertex_count(), 1);
    }

    // ── Triangles / output ─────────────────────────────────────────

    #[test]
    fn triangles_keep_winding() {
        let mut buf = VertexWeldBuffer::default();
        let a = buf.add_vertex(Vec3::ZERO);
        let b = buf.add_vertex(Vec3::X);
        let c = buf.add_vertex(Vec3::Y);
        buf.add_triangle(a, c, b);
        let data = buf.into_mesh_data();
        assert_eq!(data.indices, vec![0, 2, 1]);
        assert_eq!(data.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(data.uvs.is_empty());
    }

    #[test]
    fn attributed_output_is_parallel() {
        let mut buf = VertexWeldBuffer::default();
        for x in 0..4 {
            let i = buf.add_vertex_with(Vec3::new(x as f32, 0.0, 0.0), Vec2::ZERO, LinearRgba::GREEN);
            buf.add_vertex_with(Vec3::new(x as f32, 0.0, 0.0), Vec2::ONE, LinearRgba::GREEN);
            assert_eq!(i as usize, x);
        }
        let data = buf.into_mesh_data();
        assert_eq!(data.positions.len(), 4);
        assert_eq!(data.uvs.len(), 4);
        assert_eq!(data.colors.len(), 4);
    }
}
