//! Spline-driven tube meshes.
//!
//! A sequence of [`ControlPoint`]s is interpolated with a generalized
//! Catmull-Rom spline ([`spline`]), sampled into [`CurvePoint`]s carrying a
//! minimal-twist frame, and extruded into a tube by [`tube_mesh`].

pub mod spline;
pub mod tube_mesh;

pub use spline::CatmullRomSpan;
pub use tube_mesh::TubeMeshBuilder;

use bevy::prelude::*;

/// Input point of a curve: where it passes, how thick, which color.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct ControlPoint {
    /// Position in the curve's local space.
    pub position: Vec3,
    /// Tube radius at this point.
    pub radius: f32,
    /// Vertex color at this point.
    pub color: LinearRgba,
}

impl ControlPoint {
    /// Control point at `position` with the given radius and color.
    pub fn new(position: Vec3, radius: f32, color: LinearRgba) -> Self {
        Self {
            position,
            radius,
            color,
        }
    }
}

/// A sampled point along the curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    /// Sampled position.
    pub position: Vec3,
    /// Interpolated radius.
    pub radius: f32,
    /// Interpolated color.
    pub color: LinearRgba,
    /// First derivative of the curve at this sample (not normalized).
    pub tangent: Vec3,
    /// Ring orientation propagated with minimal twist.
    pub rotation: Quat,
    /// Arc length from the first sample.
    pub length: f32,
    /// Normalized position of this sample along the whole curve.
    pub t: f32,
}

/// Shape and texturing parameters of a tube.
#[derive(Clone, Debug, Reflect)]
pub struct CurveSettings {
    /// Knot exponent: 0 uniform, 0.5 centripetal, 1 chordal. Range `[0, 2]`.
    pub alpha: f32,
    /// Samples per spline span. Range `[2, 128]`.
    pub segments: u32,
    /// Sides of the extruded cross-section. Range `[2, 128]`.
    pub sides: u32,
    /// Initial ring orientation as Euler angles in degrees (x, y, z), applied
    /// in Y-X-Z order. The ring's own normal is local +Z.
    pub start_rotation: Vec3,
    /// UV multiplier applied after the offset.
    pub uv_scale: Vec2,
    /// UV offset applied before scaling.
    pub uv_offset: Vec2,
    /// V follows arc length when set, otherwise the sample index over
    /// `segments`.
    pub continuous_v: bool,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            segments: 4,
            sides: 12,
            start_rotation: Vec3::new(-90.0, 0.0, 0.0),
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            continuous_v: true,
        }
    }
}

impl CurveSettings {
    /// Copy with every parameter clamped into its supported range.
    pub fn clamped(&self) -> Self {
        Self {
            alpha: self.alpha.clamp(0.0, 2.0),
            segments: self.segments.clamp(2, 128),
            sides: self.sides.clamp(2, 128),
            ..self.clone()
        }
    }

    /// The initial ring orientation as a quaternion.
    pub fn start_quat(&self) -> Quat {
        let r = self.start_rotation;
        Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_start_rotation_faces_up() {
        let q = CurveSettings::default().start_quat();
        assert!((q * Vec3::Z - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn clamped_limits_ranges() {
        let s = CurveSettings {
            alpha: 3.0,
            segments: 0,
            sides: 500,
            ..default()
        }
        .clamped();
        assert_eq!(s.alpha, 2.0);
        assert_eq!(s.segments, 2);
        assert_eq!(s.sides, 128);
    }
}
