//! Tube extrusion along a sampled spline.

use bevy::color::Mix;
use bevy::prelude::*;

use super::{CatmullRomSpan, ControlPoint, CurvePoint, CurveSettings};
use crate::math;
use crate::mesh::MeshData;

/// Tangents shorter than this carry no direction.
const MIN_TANGENT_LENGTH_SQ: f32 = 1e-12;

/// Extrudes a ring along a Catmull-Rom curve.
///
/// Keeps the unit ring and the per-span samples between calls; both are
/// rebuilt only when `sides` or `segments` change and are fully rewritten
/// before every read.
#[derive(Clone, Debug, Default)]
pub struct TubeMeshBuilder {
    ring: Vec<Vec3>,
    segment: Vec<(Vec3, Vec3)>,
}

impl TubeMeshBuilder {
    /// Builder with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples the curve through `control` into `segments * (n - 3) + 1`
    /// points with minimal-twist frames. Fewer than four control points
    /// yield no samples.
    pub fn sample_points(
        &mut self,
        control: &[ControlPoint],
        settings: &CurveSettings,
    ) -> Vec<CurvePoint> {
        if control.len() < 4 {
            return Vec::new();
        }
        let settings = settings.clamped();
        let segments = settings.segments as usize;
        let spans = control.len() - 3;
        let size = segments * spans + 1;

        let mut out = Vec::with_capacity(size);
        let mut rot = settings.start_quat();
        let mut last_tangent = rot * Vec3::Z;
        let mut last_pos: Option<Vec3> = None;
        let mut length = 0.0;

        for (i, window) in control.windows(4).enumerate() {
            let (p1, p2) = (&window[1], &window[2]);
            let span = CatmullRomSpan::new(
                [
                    window[0].position,
                    p1.position,
                    p2.position,
                    window[3].position,
                ],
                settings.alpha,
            );
            self.fill_segment(&span, segments);

            // Span ends are shared with the next span, except the last one.
            let n = if i + 1 == spans { segments + 1 } else { segments };
            for j in 0..n {
                let (position, tangent) = self.segment[j];
                let index = i * segments + j;
                let frac = j as f32 / segments as f32;

                rot = propagate_frame(rot, last_tangent, tangent);
                if let Some(prev) = last_pos {
                    length += position.distance(prev);
                }

                out.push(CurvePoint {
                    position,
                    radius: p1.radius + (p2.radius - p1.radius) * frac,
                    color: p1.color.mix(&p2.color, frac),
                    tangent,
                    rotation: rot,
                    length,
                    t: index as f32 / (size - 1) as f32,
                });

                if tangent.length_squared() > MIN_TANGENT_LENGTH_SQ {
                    last_tangent = tangent;
                }
                last_pos = Some(position);
            }
        }
        out
    }

    /// Builds the tube mesh. Returns an empty mesh for fewer than four
    /// control points.
    pub fn build(&mut self, control: &[ControlPoint], settings: &CurveSettings) -> MeshData {
        let points = self.sample_points(control, settings);
        if points.is_empty() {
            return MeshData::default();
        }
        let settings = settings.clamped();
        let sides = settings.sides as usize;
        self.ensure_ring(sides);

        let n = sides + 1;
        let m = points.len();
        let mut data = MeshData {
            positions: Vec::with_capacity(n * m),
            normals: Vec::with_capacity(n * m),
            colors: Vec::with_capacity(n * m),
            uvs: Vec::with_capacity(n * m),
            indices: Vec::with_capacity(sides * 6 * (m - 1)),
            ..default()
        };

        for (j, p) in points.iter().enumerate() {
            let v = if settings.continuous_v {
                p.length
            } else {
                j as f32 / settings.segments as f32
            };
            for (i, &unit) in self.ring.iter().enumerate() {
                let vertex = p.position + p.rotation * (unit * p.radius);
                let u = i as f32 / sides as f32;
                data.positions.push(vertex);
                data.normals.push((vertex - p.position).normalize_or_zero());
                data.colors.push(p.color);
                data.uvs
                    .push((Vec2::new(u, v) + settings.uv_offset) * settings.uv_scale);
            }
        }

        for j in 0..m - 1 {
            for i in 0..sides {
                let v = (j * n + i) as u32;
                let n = n as u32;
                data.indices.extend([v, v + n + 1, v + n, v, v + 1, v + n + 1]);
            }
        }

        data.recalculate_bounds();
        data.recalculate_tangents();
        data
    }

    fn ensure_ring(&mut self, sides: usize) {
        if self.ring.len() == sides + 1 {
            return;
        }
        self.ring = (0..=sides)
            .map(|i| {
                let a = i as f32 * std::f32::consts::TAU / sides as f32;
                Vec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
    }

    fn fill_segment(&mut self, span: &CatmullRomSpan, segments: usize) {
        self.segment.resize(segments + 1, (Vec3::ZERO, Vec3::ZERO));
        for (i, slot) in self.segment.iter_mut().enumerate() {
            *slot = span.sample(i as f32 / segments as f32);
        }
    }
}

/// Rotates `rot` by the smallest rotation taking `prev` onto `next`.
fn propagate_frame(rot: Quat, prev: Vec3, next: Vec3) -> Quat {
    if next.length_squared() <= MIN_TANGENT_LENGTH_SQ
        || prev.length_squared() <= MIN_TANGENT_LENGTH_SQ
    {
        return rot;
    }
    let angle = prev.angle_between(next);
    if math::is_approx_zero_angle(angle) {
        return rot;
    }
    let axis = prev.cross(next).normalize_or_zero();
    let axis = if axis != Vec3::ZERO {
        axis
    } else if prev.dot(next) > 0.0 {
        return rot;
    } else {
        // Anti-parallel: any axis perpendicular to `prev` works.
        prev.normalize().any_orthonormal_vector()
    };
    (Quat::from_axis_angle(axis, angle) * rot).normalize()
}
