//! Scalar and vector helpers used by the mesh builders.

use bevy::prelude::Vec3;

/// Rotation angles below this (in radians) are treated as no rotation at all.
pub const ANGLE_EPSILON: f32 = 0.01 * std::f32::consts::PI / 180.0;

/// Rescales a `[-1, 1]` noise sample linearly onto `[lo, hi]`.
///
/// ```
/// # use hexgrove::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 2.0, 6.0), 2.0);
/// assert_eq!(map_noise_to_range(0.0, 2.0, 6.0), 4.0);
/// assert_eq!(map_noise_to_range(1.0, -1.0, 1.0), 1.0);
/// ```
pub fn map_noise_to_range(sample: f64, lo: f32, hi: f32) -> f32 {
    let unit = (sample as f32 + 1.0) * 0.5;
    lo + (hi - lo) * unit
}

/// Unit normal of the counter-clockwise triangle `a`, `b`, `c`, or zero when
/// the corners are collinear.
pub fn compute_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Parabolic wall inflation profile `-4t² + 4t`.
///
/// Zero at both ends of the wall depth, peaking at `1.0` when `t = 0.5`.
///
/// # Examples
/// ```
/// # use hexgrove::math::inflate_ratio;
/// assert_eq!(inflate_ratio(0.0), 0.0);
/// assert_eq!(inflate_ratio(0.5), 1.0);
/// assert_eq!(inflate_ratio(1.0), 0.0);
/// ```
pub fn inflate_ratio(t: f32) -> f32 {
    -4.0 * t * t + 4.0 * t
}

/// Rounds `value` to the nearest multiple of `precision`, returned as that
/// multiple's integer index.
///
/// Two values share an index exactly when they round to the same multiple,
/// which makes the result usable as a hash key.
pub fn round_to_precision(value: f32, precision: f32) -> i64 {
    (value as f64 / precision as f64).round() as i64
}

/// Whether an angle (radians) is small enough to skip a frame rotation.
pub fn is_approx_zero_angle(angle: f32) -> bool {
    angle.abs() < ANGLE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Noise remap ────────────────────────────────────────────────

    #[test]
    fn noise_extremes_hit_range_ends() {
        assert_eq!(map_noise_to_range(-1.0, 3.0, 7.0), 3.0);
        assert_eq!(map_noise_to_range(1.0, 3.0, 7.0), 7.0);
    }

    #[test]
    fn noise_remap_is_linear() {
        for i in 0..=8 {
            let v = -1.0 + i as f64 * 0.25;
            let r = map_noise_to_range(v, 0.0, 1.0);
            assert!((r - (v as f32 + 1.0) / 2.0).abs() < 1e-6, "remap of {v} gave {r}");
        }
    }

    // ── Face normals ───────────────────────────────────────────────

    #[test]
    fn normal_follows_winding() {
        let up = compute_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        let down = compute_normal(Vec3::ZERO, Vec3::Y, Vec3::X);
        assert!(up.abs_diff_eq(Vec3::Z, 1e-6));
        assert!(down.abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn normal_is_unit_for_large_triangles() {
        let n = compute_normal(Vec3::new(1.0, 1.0, 1.0), Vec3::new(101.0, 1.0, 1.0), Vec3::new(1.0, 1.0, -50.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn collinear_corners_give_zero() {
        assert_eq!(compute_normal(Vec3::ZERO, Vec3::Y, Vec3::Y * 3.0), Vec3::ZERO);
        assert_eq!(compute_normal(Vec3::X, Vec3::X, Vec3::X), Vec3::ZERO);
    }

    // ── inflate_ratio ───────────────────────────────────────────────

    #[test]
    fn inflate_is_symmetric_around_midpoint() {
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!(
                (inflate_ratio(t) - inflate_ratio(1.0 - t)).abs() < 1e-6,
                "asymmetric at t={t}"
            );
        }
    }

    #[test]
    fn inflate_stays_within_unit_range() {
        for i in 0..=100 {
            let r = inflate_ratio(i as f32 / 100.0);
            assert!((0.0..=1.0).contains(&r), "ratio {r} out of range");
        }
    }

    // ── round_to_precision ──────────────────────────────────────────

    #[test]
    fn values_within_half_precision_share_index() {
        assert_eq!(
            round_to_precision(1.0001, 0.001),
            round_to_precision(0.9999, 0.001)
        );
    }

    #[test]
    fn values_a_full_step_apart_differ() {
        assert_ne!(
            round_to_precision(1.0, 0.001),
            round_to_precision(1.001, 0.001)
        );
    }

    #[test]
    fn negative_values_round_symmetrically() {
        assert_eq!(round_to_precision(-0.0024, 0.001), -2);
        assert_eq!(round_to_precision(0.0024, 0.001), 2);
    }

    // ── is_approx_zero_angle ────────────────────────────────────────

    #[test]
    fn tiny_angle_is_zero() {
        assert!(is_approx_zero_angle(1e-5));
    }

    #[test]
    fn one_degree_is_not_zero() {
        assert!(!is_approx_zero_angle(1f32.to_radians()));
    }
}
