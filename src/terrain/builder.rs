//! Cell grid to prism mesh conversion.

use bevy::prelude::*;
use noise::{NoiseFn, Value};

use super::TerrainSettings;
use super::cell_buffer::{self, CellGridBuffer};
use crate::hex::{self, Hex};
use crate::math;
use crate::mesh::{GeneratedMeshes, VertexWeldBuffer};

const SQRT_3: f32 = hex::SQRT_3;

/// Unit hexagon corners, corner `i` sitting between edges `i` and `i + 1`,
/// followed by the center used as the fan apex.
const TILE_VERTICES: [Vec2; 7] = [
    Vec2::new(1.0, SQRT_3 / 3.0),
    Vec2::new(0.0, 2.0 * SQRT_3 / 3.0),
    Vec2::new(-1.0, SQRT_3 / 3.0),
    Vec2::new(-1.0, -SQRT_3 / 3.0),
    Vec2::new(0.0, -2.0 * SQRT_3 / 3.0),
    Vec2::new(1.0, -SQRT_3 / 3.0),
    Vec2::ZERO,
];

const CENTER: usize = 6;

const TILE_TRIS: [[usize; 3]; 6] = [
    [CENTER, 1, 0],
    [CENTER, 2, 1],
    [CENTER, 3, 2],
    [CENTER, 4, 3],
    [CENTER, 5, 4],
    [CENTER, 0, 5],
];

/// Planar step towards the neighbour across each edge.
const EDGE_UV_OFFSETS: [Vec2; 6] = [
    Vec2::new(2.0, 0.0),
    Vec2::new(1.0, SQRT_3),
    Vec2::new(-1.0, SQRT_3),
    Vec2::new(-2.0, 0.0),
    Vec2::new(-1.0, -SQRT_3),
    Vec2::new(1.0, -SQRT_3),
];

/// Noise lookups are shifted this far along each axis to decorrelate the
/// three displacement channels.
const NOISE_CHANNEL_OFFSET: f32 = 100.0;

/// Per-cell geometry inputs, computed on the fly.
#[derive(Clone, Debug)]
struct Tile {
    hex: Hex,
    color: LinearRgba,
    /// Cap corners in planar space (index 6 is the center).
    cap: [Vec2; 7],
    /// Edge `i` faces an empty neighbour.
    vacant: [bool; 6],
    /// Corner `i` sits between two vacant edges and is inset.
    free: [bool; 6],
}

impl Tile {
    fn vacant_dirs(&self) -> impl Iterator<Item = usize> + '_ {
        (0..6).filter(|&i| self.vacant[i])
    }
}

/// Flat color for the low bits of a cell code.
pub fn cell_color(code: u8) -> LinearRgba {
    match code & cell_buffer::OCCUPIED_MASK {
        1 => LinearRgba::RED,
        2 => LinearRgba::GREEN,
        3 => LinearRgba::BLUE,
        _ => LinearRgba::BLACK,
    }
}

/// Turns a [`CellGridBuffer`] into capped hexagonal prisms.
///
/// Prisms are laid out in the XY plane at z = 0 with walls extending to
/// z = `depth`. Caps face -Z.
#[derive(Clone, Debug)]
pub struct HexTerrainMeshBuilder {
    noise: Value,
    seed: u32,
}

impl Default for HexTerrainMeshBuilder {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HexTerrainMeshBuilder {
    /// Builder sampling value noise with `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Value::new(seed),
            seed,
        }
    }

    /// Builds the main mesh and, when enabled, the collision mesh.
    pub fn build(&mut self, buffer: &CellGridBuffer, settings: &TerrainSettings) -> GeneratedMeshes {
        if self.seed != settings.noise_seed {
            *self = Self::new(settings.noise_seed);
        }
        let loops = settings.lateral_loops;

        let mut main = VertexWeldBuffer::default();
        let mut collision = settings.generate_collider.then(VertexWeldBuffer::default);

        for (coord, code) in buffer.iter() {
            if !cell_buffer::is_occupied(code) {
                continue;
            }
            let tile = self.tile(buffer, coord, code, settings);
            self.draw_cap(&mut main, buffer, &tile, settings);
            for dir in tile.vacant_dirs() {
                self.draw_lateral(&mut main, &tile, dir, loops, settings);
                if let Some(collision) = collision.as_mut() {
                    self.draw_collider(collision, &tile, dir, settings);
                }
            }
        }

        let mut main = main.into_mesh_data();
        main.recalculate_normals();
        main.recalculate_tangents();
        GeneratedMeshes {
            main,
            collision: collision.map(VertexWeldBuffer::into_mesh_data),
        }
    }

    fn tile(
        &self,
        buffer: &CellGridBuffer,
        coord: IVec2,
        code: u8,
        settings: &TerrainSettings,
    ) -> Tile {
        let hex = Hex::from_offset(coord.x, coord.y);
        let center = hex.to_planar(settings.radius);
        let neighbours = hex.neighbours();
        let vacant = neighbours.map(|n| !contains_cell(buffer, n));
        let free: [bool; 6] = std::array::from_fn(|i| vacant[i] && vacant[(i + 1) % 6]);
        let cap = std::array::from_fn(|i| {
            let v = TILE_VERTICES[i];
            let v = if i < 6 && free[i] {
                v * settings.edge_verts_inset
            } else {
                v
            };
            v * settings.radius + center
        });
        Tile {
            hex,
            color: cell_color(code),
            cap,
            vacant,
            free,
        }
    }

    fn draw_cap(
        &self,
        buf: &mut VertexWeldBuffer,
        buffer: &CellGridBuffer,
        tile: &Tile,
        settings: &TerrainSettings,
    ) {
        if settings.cull_inside_caps
            && tile
                .hex
                .neighbours()
                .iter()
                .all(|n| n.neighbours().iter().all(|&nn| contains_cell(buffer, nn)))
        {
            return;
        }
        let verts = tile.cap.map(|v| self.displaced(v, 0.0, settings));
        let uvs = tile.cap.map(|v| v * settings.uv_scale);
        for [a, b, c] in TILE_TRIS {
            let a = buf.add_vertex_with(verts[a], uvs[a], tile.color);
            let b = buf.add_vertex_with(verts[b], uvs[b], tile.color);
            let c = buf.add_vertex_with(verts[c], uvs[c], tile.color);
            buf.add_triangle(a, b, c);
        }
    }

    fn draw_lateral(
        &self,
        buf: &mut VertexWeldBuffer,
        tile: &Tile,
        dir: usize,
        loops: u32,
        settings: &TerrainSettings,
    ) {
        let uv = |v: Vec3, t: f32| lateral_uv(v.truncate(), dir, t, settings);

        for i in 1..=loops {
            let t0 = (i - 1) as f32 / loops as f32;
            let t1 = i as f32 / loops as f32;
            let front_a = self.lateral_vertex(tile, dir, true, t0, settings);
            let front_b = self.lateral_vertex(tile, dir, false, t0, settings);
            let back_a = self.lateral_vertex(tile, dir, true, t1, settings);
            let back_b = self.lateral_vertex(tile, dir, false, t1, settings);

            let fa = buf.add_vertex_with(front_a, uv(front_a, t0), tile.color);
            let fb = buf.add_vertex_with(front_b, uv(front_b, t0), tile.color);
            let bb = buf.add_vertex_with(back_b, uv(back_b, t1), tile.color);
            buf.add_triangle(fa, fb, bb);

            let fa = buf.add_vertex_with(front_a, uv(front_a, t0), tile.color);
            let bb = buf.add_vertex_with(back_b, uv(back_b, t1), tile.color);
            let ba = buf.add_vertex_with(back_a, uv(back_a, t1), tile.color);
            buf.add_triangle(fa, bb, ba);
        }
    }

    fn draw_collider(
        &self,
        buf: &mut VertexWeldBuffer,
        tile: &Tile,
        dir: usize,
        settings: &TerrainSettings,
    ) {
        let mid = settings.collider_midpoint;
        let a = self.lateral_vertex(tile, dir, true, mid, settings);
        let b = self.lateral_vertex(tile, dir, false, mid, settings);
        let fa = buf.add_vertex(a.with_z(0.0));
        let fb = buf.add_vertex(b.with_z(0.0));
        let bb = buf.add_vertex(b.with_z(settings.depth));
        let ba = buf.add_vertex(a.with_z(settings.depth));
        buf.add_triangle(fa, fb, bb);
        buf.add_triangle(fa, bb, ba);
    }

    /// Wall corner of edge `dir` at depth fraction `t`. `is_before` picks the
    /// corner preceding the edge.
    ///
    /// Free corners bulge along their own direction. Shared corners bulge
    /// along the adjacent corner's direction so neighbouring tiles line up.
    fn lateral_vertex(
        &self,
        tile: &Tile,
        dir: usize,
        is_before: bool,
        t: f32,
        settings: &TerrainSettings,
    ) -> Vec3 {
        let index = if is_before { (dir + 5) % 6 } else { dir };
        let inflate_index = match (tile.free[index], is_before) {
            (true, _) => index,
            (false, true) => (index + 1) % 6,
            (false, false) => (index + 5) % 6,
        };
        let inflation = math::inflate_ratio(t) * settings.edge_inflate;
        let offset = TILE_VERTICES[inflate_index] * settings.radius * inflation;
        self.displaced(tile.cap[index] + offset, settings.depth * t, settings)
    }

    fn displaced(&self, xy: Vec2, depth: f32, settings: &TerrainSettings) -> Vec3 {
        let p = xy.extend(depth);
        if settings.displacement == Vec3::ZERO {
            return p;
        }
        let noise = self.sample_noise(p, settings) * 2.0 - Vec3::ONE;
        p + noise * settings.displacement
    }

    /// Three decorrelated noise channels in `[0, 1]`.
    fn sample_noise(&self, p: Vec3, settings: &TerrainSettings) -> Vec3 {
        let coords = p * settings.noise_scale.extend(0.0);
        Vec3::new(
            self.noise_3d(coords + Vec3::X * NOISE_CHANNEL_OFFSET),
            self.noise_3d(coords + Vec3::Y * NOISE_CHANNEL_OFFSET),
            self.noise_3d(coords + Vec3::Z * NOISE_CHANNEL_OFFSET),
        )
    }

    /// Mean of the xy, yz and zx planar lookups.
    fn noise_3d(&self, v: Vec3) -> f32 {
        (self.noise_2d(v.x, v.y) + self.noise_2d(v.y, v.z) + self.noise_2d(v.z, v.x)) / 3.0
    }

    fn noise_2d(&self, x: f32, y: f32) -> f32 {
        math::map_noise_to_range(self.noise.get([x as f64, y as f64]), 0.0, 1.0)
    }
}

/// Wall UV at planar `xy` and depth fraction `t`, sliding towards the
/// neighbour across edge `dir` with `t²`.
fn lateral_uv(xy: Vec2, dir: usize, t: f32, settings: &TerrainSettings) -> Vec2 {
    (xy + EDGE_UV_OFFSETS[dir] * settings.uv_back_offset * t * t) * settings.uv_scale
}

fn contains_cell(buffer: &CellGridBuffer, hex: Hex) -> bool {
    let offset = hex.to_offset();
    cell_buffer::is_occupied(buffer.get(offset.x, offset.y))
}

/// Convenience wrapper building with a fresh builder.
pub fn build_terrain(buffer: &CellGridBuffer, settings: &TerrainSettings) -> GeneratedMeshes {
    HexTerrainMeshBuilder::new(settings.noise_seed).build(buffer, settings)
}
