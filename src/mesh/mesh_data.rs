use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use crate::math;

/// Axis-aligned bounding box of a mesh. Zero-sized at the origin when empty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// Smallest box containing every point, or the default box for none.
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };
        points.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |b, &p| Self {
                min: b.min.min(p),
                max: b.max.max(p),
            },
        )
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether `point` lies inside or on the box.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Triangle-list mesh data with parallel per-vertex attribute arrays.
///
/// Every non-empty attribute array has exactly `positions.len()` entries.
/// `indices` holds counter-clockwise triangles, three indices each.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Unit vertex normals (empty until computed or assigned).
    pub normals: Vec<Vec3>,
    /// Linear vertex colors.
    pub colors: Vec<LinearRgba>,
    /// Primary texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Secondary texture coordinates.
    pub uvs_1: Vec<Vec2>,
    /// Tangents with handedness in `w`.
    pub tangents: Vec<Vec4>,
    /// Triangle indices.
    pub indices: Vec<u32>,
    /// Bounding box, refreshed by [`MeshData::recalculate_bounds`].
    pub bounds: Bounds,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Iterates triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Recomputes [`MeshData::bounds`] from the positions.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Bounds::from_points(&self.positions);
    }

    /// Recomputes smooth normals by averaging the unit normals of every face
    /// sharing a vertex.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for [a, b, c] in self.triangles() {
            let n = math::compute_normal(self.positions[a], self.positions[b], self.positions[c]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Recomputes tangents from position/UV gradients.
    ///
    /// Per-face tangents and bitangents are accumulated at shared vertices,
    /// then Gram-Schmidt orthogonalized against the normal with handedness in
    /// `w`. Requires UVs and normals; leaves tangents empty otherwise.
    pub fn recalculate_tangents(&mut self) {
        let count = self.positions.len();
        if count == 0 || self.uvs.len() != count || self.normals.len() != count {
            self.tangents.clear();
            return;
        }

        let mut tangents = vec![Vec3::ZERO; count];
        let mut bitangents = vec![Vec3::ZERO; count];

        for [i0, i1, i2] in self.triangles() {
            let dp1 = self.positions[i1] - self.positions[i0];
            let dp2 = self.positions[i2] - self.positions[i0];
            let duv1 = self.uvs[i1] - self.uvs[i0];
            let duv2 = self.uvs[i2] - self.uvs[i0];

            let det = duv1.x * duv2.y - duv1.y * duv2.x;
            if det.abs() < 1e-8 {
                continue;
            }
            let inv_det = 1.0 / det;
            let t = (dp1 * duv2.y - dp2 * duv1.y) * inv_det;
            let b = (dp2 * duv1.x - dp1 * duv2.x) * inv_det;

            for i in [i0, i1, i2] {
                tangents[i] += t;
                bitangents[i] += b;
            }
        }

        self.tangents = (0..count)
            .map(|i| {
                let n = self.normals[i];
                let t = tangents[i];
                let ortho = (t - n * n.dot(t)).normalize_or_zero();
                let ortho = if ortho == Vec3::ZERO {
                    fallback_tangent(n)
                } else {
                    ortho
                };
                let w = if n.cross(ortho).dot(bitangents[i]) < 0.0 {
                    -1.0
                } else {
                    1.0
                };
                ortho.extend(w)
            })
            .collect();
    }

    /// Appends `other`, offsetting its indices past this mesh's vertices.
    ///
    /// Attributes present on only one side are dropped from the result so the
    /// parallel-array invariant keeps holding.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        let was_empty = self.positions.is_empty();

        merge_attribute(&mut self.normals, &other.normals, was_empty, other.positions.is_empty());
        merge_attribute(&mut self.colors, &other.colors, was_empty, other.positions.is_empty());
        merge_attribute(&mut self.uvs, &other.uvs, was_empty, other.positions.is_empty());
        merge_attribute(&mut self.uvs_1, &other.uvs_1, was_empty, other.positions.is_empty());
        merge_attribute(&mut self.tangents, &other.tangents, was_empty, other.positions.is_empty());

        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        self.recalculate_bounds();
    }

    /// Converts into a Bevy triangle-list mesh, inserting only the non-empty
    /// attributes.
    pub fn into_mesh(self, usage: RenderAssetUsages) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, usage)
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_POSITION,
                self.positions.iter().map(|p| p.to_array()).collect::<Vec<_>>(),
            );
        if !self.normals.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_NORMAL,
                self.normals.iter().map(|n| n.to_array()).collect::<Vec<_>>(),
            );
        }
        if !self.uvs.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_UV_0,
                self.uvs.iter().map(|uv| uv.to_array()).collect::<Vec<_>>(),
            );
        }
        if !self.uvs_1.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_UV_1,
                self.uvs_1.iter().map(|uv| uv.to_array()).collect::<Vec<_>>(),
            );
        }
        if !self.colors.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_COLOR,
                self.colors
                    .iter()
                    .map(|c| [c.red, c.green, c.blue, c.alpha])
                    .collect::<Vec<_>>(),
            );
        }
        if !self.tangents.is_empty() {
            mesh.insert_attribute(
                Mesh::ATTRIBUTE_TANGENT,
                self.tangents.iter().map(|t| t.to_array()).collect::<Vec<_>>(),
            );
        }
        mesh.with_inserted_indices(Indices::U32(self.indices))
    }
}

/// Any unit vector perpendicular to `normal`.
fn fallback_tangent(normal: Vec3) -> Vec3 {
    let reference = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    (reference - normal * normal.dot(reference)).normalize_or_zero()
}

fn merge_attribute<T: Clone>(dst: &mut Vec<T>, src: &[T], dst_empty: bool, src_empty: bool) {
    if src_empty {
        return;
    }
    if dst_empty {
        dst.clear();
        dst.extend_from_slice(src);
    } else if dst.is_empty() || src.is_empty() {
        dst.clear();
    } else {
        dst.extend_from_slice(src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        let mut data = MeshData {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..default()
        };
        data.recalculate_bounds();
        data
    }

    // ── Bounds ─────────────────────────────────────────────────────

    #[test]
    fn bounds_of_empty_mesh_are_zero() {
        assert_eq!(Bounds::from_points(&[]), Bounds::default());
    }

    #[test]
    fn bounds_enclose_all_points() {
        let data = quad();
        assert_eq!(data.bounds.min, Vec3::ZERO);
        assert_eq!(data.bounds.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(data.positions.iter().all(|&p| data.bounds.contains(p)));
        assert_eq!(data.bounds.center(), Vec3::new(0.5, 0.5, 0.0));
    }

    // ── Normals / tangents ─────────────────────────────────────────

    #[test]
    fn flat_quad_normals_face_plus_z() {
        let mut data = quad();
        data.recalculate_normals();
        for n in &data.normals {
            assert!((*n - Vec3::Z).length() < 1e-5, "unexpected normal {n:?}");
        }
    }

    #[test]
    fn shared_vertex_normal_is_face_average() {
        // Two faces folded 90° along the x axis.
        let mut data = MeshData {
            positions: vec![
                Vec3::ZERO,
                Vec3::X,
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
            ],
            indices: vec![0, 1, 2, 0, 1, 3],
            ..default()
        };
        data.recalculate_normals();
        let expected = (Vec3::Z + Vec3::Y).normalize();
        assert!((data.normals[0] - expected).length() < 1e-5);
    }

    #[test]
    fn tangents_follow_u_direction() {
        let mut data = quad();
        data.recalculate_normals();
        data.recalculate_tangents();
        assert_eq!(data.tangents.len(), 4);
        for t in &data.tangents {
            assert!((t.truncate() - Vec3::X).length() < 1e-5, "tangent {t:?}");
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn tangents_need_uvs() {
        let mut data = quad();
        data.uvs.clear();
        data.recalculate_normals();
        data.recalculate_tangents();
        assert!(data.tangents.is_empty());
    }

    // ── Append ─────────────────────────────────────────────────────

    #[test]
    fn append_offsets_indices() {
        let mut a = quad();
        let mut b = quad();
        for p in &mut b.positions {
            *p += Vec3::Z;
        }
        a.append(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 4);
        assert_eq!(&a.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(a.uvs.len(), 8);
        assert_eq!(a.bounds.max.z, 1.0);
    }

    #[test]
    fn append_into_empty_copies_attributes() {
        let mut a = MeshData::default();
        a.append(&quad());
        assert_eq!(a.vertex_count(), 4);
        assert_eq!(a.uvs.len(), 4);
    }

    #[test]
    fn append_drops_one_sided_attributes() {
        let mut a = quad();
        let mut b = quad();
        b.uvs.clear();
        a.append(&b);
        assert!(a.uvs.is_empty());
    }

    // ── Bevy conversion ────────────────────────────────────────────

    #[test]
    fn into_mesh_keeps_counts() {
        let mut data = quad();
        data.recalculate_normals();
        let mesh = data.into_mesh(RenderAssetUsages::default());
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_none());
    }
}
