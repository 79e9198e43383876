//! Generalized Catmull-Rom span evaluation.

use bevy::prelude::*;

/// Smallest knot spacing. Coincident control points would otherwise divide by
/// zero in the blends.
const MIN_KNOT_SPACING: f32 = 1e-6;

/// One span of a generalized Catmull-Rom spline, running from `p1` to `p2`
/// with `p0` and `p3` shaping the ends.
#[derive(Clone, Copy, Debug)]
pub struct CatmullRomSpan {
    points: [Vec3; 4],
    knots: [f32; 4],
}

impl CatmullRomSpan {
    /// Builds the span with knot spacing `|Pᵢ − Pᵢ₋₁|^alpha`.
    pub fn new(points: [Vec3; 4], alpha: f32) -> Self {
        let mut knots = [0.0; 4];
        for i in 1..4 {
            let dist = points[i].distance(points[i - 1]);
            knots[i] = knots[i - 1] + dist.powf(alpha).max(MIN_KNOT_SPACING);
        }
        Self { points, knots }
    }

    /// Knot parameters `t0..t3`.
    pub fn knots(&self) -> [f32; 4] {
        self.knots
    }

    /// Position and first derivative at local fraction `u` in `[0, 1]`,
    /// where 0 is `p1` and 1 is `p2`.
    pub fn sample(&self, u: f32) -> (Vec3, Vec3) {
        let [p0, p1, p2, p3] = self.points;
        let [t0, t1, t2, t3] = self.knots;
        let t = t1 + (t2 - t1) * u;

        let a1 = ((t1 - t) * p0 + (t - t0) * p1) / (t1 - t0);
        let a2 = ((t2 - t) * p1 + (t - t1) * p2) / (t2 - t1);
        let a3 = ((t3 - t) * p2 + (t - t2) * p3) / (t3 - t2);
        let b1 = ((t2 - t) * a1 + (t - t0) * a2) / (t2 - t0);
        let b2 = ((t3 - t) * a2 + (t - t1) * a3) / (t3 - t1);
        let c = ((t2 - t) * b1 + (t - t1) * b2) / (t2 - t1);

        let da1 = (p1 - p0) / (t1 - t0);
        let da2 = (p2 - p1) / (t2 - t1);
        let da3 = (p3 - p2) / (t3 - t2);
        let db1 = ((a2 - a1) + (t2 - t) * da1 + (t - t0) * da2) / (t2 - t0);
        let db2 = ((a3 - a2) + (t3 - t) * da2 + (t - t1) * da3) / (t3 - t1);
        let dc = ((b2 - b1) + (t2 - t) * db1 + (t - t1) * db2) / (t2 - t1);

        (c, dc)
    }

    /// Position at local fraction `u`.
    pub fn position(&self, u: f32) -> Vec3 {
        self.sample(u).0
    }

    /// First derivative at local fraction `u`.
    pub fn tangent(&self, u: f32) -> Vec3 {
        self.sample(u).1
    }
}
