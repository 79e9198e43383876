//! Branch segment arena and control point inheritance.

use bevy::prelude::*;

use crate::curve::{ControlPoint, CurveSettings, TubeMeshBuilder};
use crate::generator::MeshGenerator;
use crate::mesh::{GeneratedMeshes, MeshData};

/// Index of a segment inside its [`BranchTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(usize);

impl SegmentId {
    /// Position of the segment in insertion order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point a branch passes through, relative to its segment's origin.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BranchPoint {
    /// Position in segment space.
    pub position: Vec3,
    /// Multiplier on the radius interpolated from the segment's range.
    pub radius: f32,
    /// Vertex color.
    pub color: LinearRgba,
}

impl BranchPoint {
    /// Point at `position` with unit radius multiplier.
    pub fn new(position: Vec3, color: LinearRgba) -> Self {
        Self {
            position,
            radius: 1.0,
            color,
        }
    }

    /// Same point with another radius multiplier.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }
}

/// Attachment of a child segment to one point of its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentLink {
    /// Parent segment.
    pub segment: SegmentId,
    /// Index into the parent's points. The child's origin sits on it.
    pub point: usize,
}

/// One tube of a branch tree.
#[derive(Clone, Debug)]
pub struct BranchSegment {
    points: Vec<BranchPoint>,
    radius_range: Vec2,
    settings: CurveSettings,
    collider: bool,
    parent: Option<ParentLink>,
    dirty: bool,
    builder: TubeMeshBuilder,
    mesh: MeshData,
}

impl Default for BranchSegment {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            radius_range: Vec2::new(1.0, 0.1),
            settings: CurveSettings::default(),
            collider: false,
            parent: None,
            dirty: true,
            builder: TubeMeshBuilder::new(),
            mesh: MeshData::default(),
        }
    }
}

impl BranchSegment {
    /// Segment through `points` with default radius range and curve settings.
    pub fn new(points: impl IntoIterator<Item = BranchPoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
            ..default()
        }
    }

    /// Radius at the first (`x`) and last (`y`) point.
    pub fn with_radius_range(mut self, range: Vec2) -> Self {
        self.radius_range = range;
        self
    }

    /// Replaces the curve settings.
    pub fn with_settings(mut self, settings: CurveSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Emits this segment into the collision mesh as well.
    pub fn with_collider(mut self, collider: bool) -> Self {
        self.collider = collider;
        self
    }

    /// Own points, in segment space.
    pub fn points(&self) -> &[BranchPoint] {
        &self.points
    }

    /// Radius range (start, end).
    pub fn radius_range(&self) -> Vec2 {
        self.radius_range
    }

    /// Curve settings.
    pub fn settings(&self) -> &CurveSettings {
        &self.settings
    }

    /// Whether the segment contributes to the collision mesh.
    pub fn collider(&self) -> bool {
        self.collider
    }

    /// Where the segment is attached, `None` for roots.
    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    /// Whether the cached tube is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Last built tube, in segment space.
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    fn to_control_point(&self, point: &BranchPoint, t: f32) -> ControlPoint {
        let (start, end) = (self.radius_range.x, self.radius_range.y);
        ControlPoint::new(
            point.position,
            (start + (end - start) * t) * point.radius,
            point.color,
        )
    }
}

/// Arena of branch segments where children grow out of parent points.
///
/// Each child is built in its own space with the origin on its parent point,
/// so moving a parent point only rebuilds the children that inherit from it.
#[derive(Clone, Debug, Default)]
pub struct BranchTree {
    segments: Vec<BranchSegment>,
    dirty: bool,
}

impl BranchTree {
    /// Empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the tree has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segment ids in insertion order.
    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        (0..self.segments.len()).map(SegmentId)
    }

    /// Segment `id`, if it exists.
    pub fn segment(&self, id: SegmentId) -> Option<&BranchSegment> {
        self.segments.get(id.0)
    }

    /// Adds a segment without parent.
    pub fn add_root(&mut self, segment: BranchSegment) -> SegmentId {
        self.push(segment, None)
    }

    /// Attaches `segment` to point `point` of `parent`. Returns `None` when
    /// either does not exist.
    pub fn add_child(
        &mut self,
        parent: SegmentId,
        point: usize,
        segment: BranchSegment,
    ) -> Option<SegmentId> {
        let p = self.segments.get(parent.0)?;
        if point >= p.points.len() {
            return None;
        }
        Some(self.push(
            segment,
            Some(ParentLink {
                segment: parent,
                point,
            }),
        ))
    }

    fn push(&mut self, mut segment: BranchSegment, parent: Option<ParentLink>) -> SegmentId {
        segment.parent = parent;
        segment.dirty = true;
        self.segments.push(segment);
        self.dirty = true;
        SegmentId(self.segments.len() - 1)
    }

    /// Children attached to any point of `id`.
    pub fn children(&self, id: SegmentId) -> impl Iterator<Item = SegmentId> + '_ {
        self.segment_ids()
            .filter(move |&c| self.segments[c.0].parent.is_some_and(|l| l.segment == id))
    }

    /// Appends a point to segment `id`.
    pub fn push_point(&mut self, id: SegmentId, point: BranchPoint) -> bool {
        let Some(seg) = self.segments.get_mut(id.0) else {
            return false;
        };
        seg.points.push(point);
        let index = seg.points.len() - 1;
        self.touch_point(id, index);
        true
    }

    /// Replaces point `index` of segment `id`.
    pub fn set_point(&mut self, id: SegmentId, index: usize, point: BranchPoint) -> bool {
        let Some(slot) = self
            .segments
            .get_mut(id.0)
            .and_then(|s| s.points.get_mut(index))
        else {
            return false;
        };
        *slot = point;
        self.touch_point(id, index);
        true
    }

    /// Replaces the curve settings of segment `id`.
    pub fn set_settings(&mut self, id: SegmentId, settings: CurveSettings) -> bool {
        self.edit(id, |s| s.settings = settings)
    }

    /// Replaces the radius range of segment `id`.
    pub fn set_radius_range(&mut self, id: SegmentId, range: Vec2) -> bool {
        self.edit(id, |s| s.radius_range = range)
    }

    /// Toggles the collider of segment `id`.
    pub fn set_collider(&mut self, id: SegmentId, collider: bool) -> bool {
        self.edit(id, |s| s.collider = collider)
    }

    fn edit(&mut self, id: SegmentId, f: impl FnOnce(&mut BranchSegment)) -> bool {
        let Some(seg) = self.segments.get_mut(id.0) else {
            return false;
        };
        f(seg);
        seg.dirty = true;
        self.dirty = true;
        true
    }

    /// Marks `id` dirty along with every child inheriting point `index`,
    /// either as its parent point or as the previous sibling.
    fn touch_point(&mut self, id: SegmentId, index: usize) {
        self.segments[id.0].dirty = true;
        for seg in &mut self.segments {
            if let Some(link) = seg.parent
                && link.segment == id
                && (link.point == index || link.point == index + 1)
            {
                seg.dirty = true;
            }
        }
        self.dirty = true;
    }

    /// Position of segment `id`'s origin in tree space.
    pub fn origin(&self, id: SegmentId) -> Vec3 {
        let mut origin = Vec3::ZERO;
        let mut current = self.segment(id).and_then(|s| s.parent);
        while let Some(link) = current {
            let Some(parent) = self.segment(link.segment) else {
                break;
            };
            origin += parent.points[link.point].position;
            current = parent.parent;
        }
        origin
    }

    /// Leading control points `id` inherits before its own points, in
    /// segment space.
    ///
    /// A root gets one synthetic point one unit below its origin. A child
    /// gets its parent point and, before it, the parent's previous point if
    /// there is one, else the synthetic point.
    pub fn inherited_lead_points(&self, id: SegmentId) -> Vec<ControlPoint> {
        let Some(seg) = self.segment(id) else {
            return Vec::new();
        };
        let link = seg.parent.and_then(|l| Some((l, self.segment(l.segment)?)));
        let lead_color = match link {
            Some((l, parent)) => parent.points[l.point].color,
            None => seg.points.first().map_or(LinearRgba::WHITE, |p| p.color),
        };
        let leading = ControlPoint::new(Vec3::NEG_Y, seg.radius_range.x, lead_color);

        let Some((link, parent)) = link else {
            return vec![leading];
        };
        let anchor = parent.points[link.point];
        let at_origin = BranchPoint {
            position: Vec3::ZERO,
            ..anchor
        };
        let anchor_cp = seg.to_control_point(&at_origin, 0.0);
        match link.point.checked_sub(1).map(|i| parent.points[i]) {
            Some(sibling) => {
                let local = BranchPoint {
                    position: sibling.position - anchor.position,
                    ..sibling
                };
                vec![seg.to_control_point(&local, 0.0), anchor_cp]
            }
            None => vec![leading, anchor_cp],
        }
    }

    /// Full control point sequence of segment `id`: inherited points, own
    /// points with radii along the range, and a trailing point one unit
    /// above the last. Empty for fewer than two own points.
    pub fn control_points(&self, id: SegmentId) -> Vec<ControlPoint> {
        let Some(seg) = self.segment(id) else {
            return Vec::new();
        };
        let n = seg.points.len();
        if n < 2 {
            return Vec::new();
        }
        let mut out = self.inherited_lead_points(id);
        out.extend(seg.points.iter().enumerate().map(|(i, p)| {
            let t = i as f32 / (n - 1) as f32;
            seg.to_control_point(p, t)
        }));
        if let Some(last) = out.last().copied() {
            out.push(ControlPoint::new(
                last.position + Vec3::Y,
                seg.radius_range.y,
                last.color,
            ));
        }
        out
    }

    /// Rebuilds every dirty segment's tube. Returns how many were rebuilt.
    fn rebuild_dirty(&mut self) -> usize {
        let dirty: Vec<SegmentId> = self
            .segment_ids()
            .filter(|id| self.segments[id.0].dirty)
            .collect();
        for &id in &dirty {
            let control = self.control_points(id);
            let seg = &mut self.segments[id.0];
            seg.mesh = seg.builder.build(&control, &seg.settings);
            if seg.mesh.is_empty() {
                debug!(
                    "branch segment {}: {} control points, empty tube",
                    id.0,
                    control.len()
                );
            }
            seg.dirty = false;
        }
        dirty.len()
    }

    /// Merges every cached segment tube into tree space.
    fn merge(&self) -> GeneratedMeshes {
        let mut main = MeshData::default();
        let mut collision: Option<MeshData> = None;
        for id in self.segment_ids() {
            let seg = &self.segments[id.0];
            if seg.mesh.is_empty() {
                continue;
            }
            let origin = self.origin(id);
            let mut placed = seg.mesh.clone();
            for p in &mut placed.positions {
                *p += origin;
            }
            if seg.collider {
                let shape = MeshData {
                    positions: placed.positions.clone(),
                    indices: placed.indices.clone(),
                    ..default()
                };
                collision.get_or_insert_default().append(&shape);
            }
            main.append(&placed);
        }
        GeneratedMeshes { main, collision }
    }
}

impl MeshGenerator for BranchTree {
    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            for seg in &mut self.segments {
                seg.dirty = true;
            }
        }
        self.dirty = dirty;
    }

    fn generate(&mut self) -> GeneratedMeshes {
        let rebuilt = self.rebuild_dirty();
        let meshes = self.merge();
        debug!(
            "branch tree: rebuilt {rebuilt}/{} segments, {} vertices, {} triangles",
            self.segments.len(),
            meshes.main.vertex_count(),
            meshes.main.triangle_count()
        );
        meshes
    }
}
