//! Axial hexagonal coordinates on top of [`hexx`].
//!
//! Hexes are "pointy" in the planar projection: a step along `q` moves
//! `2 * radius` along x, a step along `r` moves `(radius, √3 * radius)`.
//! `radius` is therefore the apothem (center to edge midpoint) of a cell.
//!
//! Dense rectangular storage uses "odd-r" offset coordinates, see
//! [`Hex::to_offset`] / [`Hex::from_offset`].

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use bevy::prelude::{IVec2, Vec2};
use hexx::EdgeDirection;

/// `√3`, the ratio between a cell's row pitch and its radius.
pub const SQRT_3: f32 = 1.732_050_8;

/// Planar basis vector of the `q` axis (per unit radius).
pub const Q_BASIS: Vec2 = Vec2::new(2.0, 0.0);
/// Planar basis vector of the `r` axis (per unit radius).
pub const R_BASIS: Vec2 = Vec2::new(1.0, SQRT_3);
/// Inverse basis row recovering `q` from a planar point.
pub const Q_INV: Vec2 = Vec2::new(0.5, -SQRT_3 / 6.0);
/// Inverse basis row recovering `r` from a planar point.
pub const R_INV: Vec2 = Vec2::new(0.0, SQRT_3 / 3.0);

/// The 6 unit axial directions, counter-clockwise starting at +x. Same order
/// as [`hexx::Hex::NEIGHBORS_COORDS`].
///
/// The index of a direction is the edge number used throughout the terrain
/// builder: edge `i` lies between cap vertices `(i + 5) % 6` and `i`.
pub const AXIAL_DIRECTIONS: [Hex; 6] = [
    Hex::new(1, 0),
    Hex::new(0, 1),
    Hex::new(-1, 1),
    Hex::new(-1, 0),
    Hex::new(0, -1),
    Hex::new(1, -1),
];

/// Rings start on this side of their center.
const RING_START: EdgeDirection = EdgeDirection::NEG_Y;

/// Integer axial hex coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Hex(hexx::Hex);

impl Hex {
    /// The origin hex.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a hex from axial components.
    pub const fn new(q: i32, r: i32) -> Self {
        Self(hexx::Hex::new(q, r))
    }

    /// Column-like axis.
    pub const fn q(self) -> i32 {
        self.0.x
    }

    /// Row axis.
    pub const fn r(self) -> i32 {
        self.0.y
    }

    /// Derived third cube coordinate, `s = -q - r`.
    pub const fn s(self) -> i32 {
        self.0.z()
    }

    // ── Planar conversion ──────────────────────────────────────────

    /// Center of this hex in the plane for cells of the given `radius`.
    pub fn to_planar(self, radius: f32) -> Vec2 {
        (Q_BASIS * self.q() as f32 + R_BASIS * self.r() as f32) * radius
    }

    /// Hex whose center is nearest to `point`, component-wise rounded.
    ///
    /// Exact inverse of [`Hex::to_planar`] at cell centers. Ties round to even.
    pub fn from_planar(point: Vec2, radius: f32) -> Self {
        let q = point.dot(Q_INV) / radius;
        let r = point.dot(R_INV) / radius;
        Self::new(q.round_ties_even() as i32, r.round_ties_even() as i32)
    }

    // ── Offset conversion ──────────────────────────────────────────

    /// "Odd-r" offset coordinate `(col, row)` of this hex.
    pub fn to_offset(self) -> IVec2 {
        let (q, r) = (self.q(), self.r());
        IVec2::new(q + (r - (r & 1)) / 2, r)
    }

    /// Hex at "odd-r" offset coordinate `(col, row)`.
    pub fn from_offset(col: i32, row: i32) -> Self {
        Self::new(col - (row - (row & 1)) / 2, row)
    }

    // ── Neighbourhood ──────────────────────────────────────────────

    /// The 6 adjacent hexes, indexed like [`AXIAL_DIRECTIONS`].
    pub fn neighbours(self) -> [Hex; 6] {
        self.0.all_neighbors().map(Self)
    }

    /// Hex `steps` away along direction `dir` (taken modulo 6).
    pub fn neighbour(self, dir: usize, steps: i32) -> Hex {
        self + AXIAL_DIRECTIONS[dir % 6] * steps
    }

    /// Hex (cube) distance between two hexes.
    pub fn distance_to(self, other: Hex) -> u32 {
        self.0.unsigned_distance_to(other.0)
    }
}

impl Add for Hex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Hex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i32> for Hex {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Neg for Hex {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{})", self.q(), self.r())
    }
}

impl From<hexx::Hex> for Hex {
    fn from(hex: hexx::Hex) -> Self {
        Self(hex)
    }
}

impl From<Hex> for hexx::Hex {
    fn from(hex: Hex) -> Self {
        hex.0
    }
}

// ── Shapes ─────────────────────────────────────────────────────────

/// All hexes exactly `radius` steps from `center`, in rotational order.
///
/// Starts at `center + (0, -radius)` and walks each direction in turn.
/// A `radius` of zero yields nothing; callers wanting the center itself use
/// [`spiral`].
pub fn ring(center: Hex, radius: u32) -> impl Iterator<Item = Hex> {
    (radius > 0)
        .then(|| center.0.custom_ring(radius, RING_START, false))
        .into_iter()
        .flatten()
        .map(Hex)
}

/// `center` (when `min_radius == 0`) followed by every ring from
/// `max(min_radius, 1)` to `max_radius` inclusive.
pub fn spiral(center: Hex, min_radius: u32, max_radius: u32) -> impl Iterator<Item = Hex> {
    center
        .0
        .custom_spiral_range(min_radius..=max_radius, RING_START, false)
        .map(Hex)
}

/// Hexes along the straight line from `from` to `to`, both ends included.
pub fn line(from: Hex, to: Hex) -> HexLine {
    HexLine {
        a: from.to_planar(1.0),
        b: to.to_planar(1.0),
        from,
        steps: from.distance_to(to),
        next: 0,
    }
}

/// Lazy iterator produced by [`line`].
///
/// Cloning a fresh line restarts it; the sequence is always `distance + 1`
/// hexes long.
#[derive(Clone, Debug)]
pub struct HexLine {
    a: Vec2,
    b: Vec2,
    from: Hex,
    steps: u32,
    next: u32,
}

impl Iterator for HexLine {
    type Item = Hex;

    fn next(&mut self) -> Option<Hex> {
        if self.next > self.steps {
            return None;
        }
        let i = self.next;
        self.next += 1;
        if self.steps == 0 {
            return Some(self.from);
        }
        let t = i as f32 / self.steps as f32;
        Some(Hex::from_planar(self.a.lerp(self.b, t), 1.0))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps + 1).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for HexLine {}
