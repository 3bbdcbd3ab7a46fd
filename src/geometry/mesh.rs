use glam::{Affine3A, Vec3};

/// Axis-aligned bounds of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Bounds of `points`; `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |bounds, &p| Self {
                min: bounds.min.min(p),
                max: bounds.max.max(p),
            },
        ))
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let transformed = corners.map(|c| matrix.transform_point3(c));
        // `corners` is never empty.
        Self::from_points(&transformed).unwrap_or(*self)
    }
}

/// A flat float attribute with a per-vertex width (texcoords, colors).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexAttribute {
    pub item_size: usize,
    pub data: Vec<f32>,
}

impl VertexAttribute {
    #[must_use]
    pub fn new(item_size: usize) -> Self {
        Self {
            item_size,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.data.len() / self.item_size
        }
    }

    /// The values of vertex `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        let start = index * self.item_size;
        self.data.get(start..start + self.item_size)
    }
}

/// Bone influences of a skinned mesh, one entry per output vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinBuffers {
    pub joints: Vec<[u8; 4]>,
    pub weights: Vec<[f32; 4]>,
    /// Positions in bind pose.
    pub bind_positions: Vec<Vec3>,
    /// Normals in bind pose, when the mesh has normals.
    pub bind_normals: Option<Vec<Vec3>>,
}

/// De-indexed triangle buffers ready for upload.
///
/// Every buffer has one entry per output vertex; `indices` is the identity
/// `0..vertex_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec3>>,
    pub binormals: Option<Vec<Vec3>>,
    pub texcoords: Option<VertexAttribute>,
    pub colors: Option<VertexAttribute>,
    /// Position source index of every output vertex.
    pub original_indices: Vec<u32>,
    pub skin: Option<SkinBuffers>,
    pub bounds: BoundingBox,
}

impl MeshData {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    #[test]
    fn bounds_of_points() {
        let bounds = BoundingBox::from_points(&[
            Vec3::new(-1.0, 0.0, 2.0),
            Vec3::new(3.0, -2.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 0.0, 2.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, -1.0, 1.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn transformed_bounds_enclose_corners() {
        let bounds = BoundingBox {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        let turned = bounds.transform(&Affine3A::from_rotation_translation(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, 5.0),
        ));
        assert!((turned.min - Vec3::new(-1.0, 0.0, 5.0)).length() < 1e-5);
        assert!((turned.max - Vec3::new(0.0, 1.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn attribute_items() {
        let attribute = VertexAttribute {
            item_size: 2,
            data: vec![0.0, 1.0, 0.5, 0.25],
        };
        assert_eq!(attribute.count(), 2);
        assert_eq!(attribute.get(1), Some(&[0.5, 0.25][..]));
        assert_eq!(attribute.get(2), None);
    }
}
