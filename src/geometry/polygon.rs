use std::collections::BTreeMap;

use glam::Vec3;
use smallvec::SmallVec;

use crate::errors::{DaeError, Result};

/// Per-vertex attribute families carried by a polygon besides positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeKind {
    Normal,
    TexCoord,
    Tangent,
    Binormal,
    Color,
}

impl AttributeKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Normal => "NORMAL",
            AttributeKind::TexCoord => "TEXCOORD",
            AttributeKind::Tangent => "TANGENT",
            AttributeKind::Binormal => "BINORMAL",
            AttributeKind::Color => "COLOR",
        }
    }
}

/// A resolved polygon corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonVertex {
    pub position: Vec3,
    /// Index into the position source, used to look up skin influences.
    pub original_index: u32,
}

/// Attribute tuple of one corner; at most 4 floats in practice.
pub type AttributeValue = SmallVec<[f32; 4]>;

/// One polygon with every attribute set it was given.
///
/// Each set holds exactly `vertex_count` entries once the polygon is filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonData {
    vertex_count: usize,
    vertices: BTreeMap<u32, Vec<PolygonVertex>>,
    attributes: BTreeMap<(AttributeKind, u32), Vec<AttributeValue>>,
}

impl PolygonData {
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            vertices: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn push_vertex(&mut self, set: u32, vertex: PolygonVertex) -> Result<()> {
        let list = self.vertices.entry(set).or_default();
        if list.len() >= self.vertex_count {
            return Err(DaeError::DuplicateInput {
                semantic: "VERTEX".to_string(),
                set,
            });
        }
        list.push(vertex);
        Ok(())
    }

    pub fn push_attribute(&mut self, kind: AttributeKind, set: u32, value: AttributeValue) -> Result<()> {
        let list = self.attributes.entry((kind, set)).or_default();
        if list.len() >= self.vertex_count {
            return Err(DaeError::DuplicateInput {
                semantic: kind.as_str().to_string(),
                set,
            });
        }
        list.push(value);
        Ok(())
    }

    /// The lowest vertex set id present.
    #[must_use]
    pub fn first_vertex_set(&self) -> Option<u32> {
        self.vertices.keys().next().copied()
    }

    #[must_use]
    pub fn vertex_set(&self, set: u32) -> Option<&[PolygonVertex]> {
        self.vertices.get(&set).map(Vec::as_slice)
    }

    /// The lowest set id present for `kind`.
    #[must_use]
    pub fn first_attribute_set(&self, kind: AttributeKind) -> Option<u32> {
        self.attributes
            .range((kind, 0)..=(kind, u32::MAX))
            .next()
            .map(|((_, set), _)| *set)
    }

    #[must_use]
    pub fn attribute_set(&self, kind: AttributeKind, set: u32) -> Option<&[AttributeValue]> {
        self.attributes.get(&(kind, set)).map(Vec::as_slice)
    }

    /// Splits the polygon into `vertex_count - 2` triangles fanned around
    /// corner 0. Every vertex and attribute set is split the same way.
    ///
    /// The fan is only correct for convex polygons. Fewer than 3 corners
    /// yields nothing.
    #[must_use]
    pub fn triangulate(&self) -> Vec<PolygonData> {
        if self.vertex_count < 3 {
            return Vec::new();
        }
        (1..self.vertex_count - 1)
            .map(|k| self.pick([0, k, k + 1]))
            .collect()
    }

    fn pick(&self, corners: [usize; 3]) -> PolygonData {
        let vertices = self
            .vertices
            .iter()
            .map(|(set, list)| (*set, corners.iter().filter_map(|&c| list.get(c).copied()).collect()))
            .collect();
        let attributes = self
            .attributes
            .iter()
            .map(|(key, list)| (*key, corners.iter().filter_map(|&c| list.get(c).cloned()).collect()))
            .collect();
        PolygonData {
            vertex_count: 3,
            vertices,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn quad() -> PolygonData {
        let mut polygon = PolygonData::new(4);
        for i in 0..4u32 {
            let position = Vec3::new(i as f32, 0.0, 0.0);
            polygon
                .push_vertex(0, PolygonVertex { position, original_index: i })
                .unwrap();
            polygon
                .push_attribute(AttributeKind::TexCoord, 1, smallvec![i as f32, 0.5])
                .unwrap();
        }
        polygon
    }

    #[test]
    fn full_set_rejects_push() {
        let mut polygon = quad();
        let err = polygon
            .push_attribute(AttributeKind::TexCoord, 1, smallvec![0.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, DaeError::DuplicateInput { set: 1, .. }));
    }

    #[test]
    fn fan_replicates_sets() {
        let triangles = quad().triangulate();
        assert_eq!(triangles.len(), 2);

        let second = triangles[1].vertex_set(0).unwrap();
        let order: Vec<u32> = second.iter().map(|v| v.original_index).collect();
        assert_eq!(order, [0, 2, 3]);

        let uv = triangles[1].attribute_set(AttributeKind::TexCoord, 1).unwrap();
        assert_eq!(uv.len(), 3);
        assert_eq!(uv[2].as_slice(), &[3.0, 0.5]);
        assert_eq!(triangles[1].first_attribute_set(AttributeKind::TexCoord), Some(1));
        assert_eq!(triangles[1].first_attribute_set(AttributeKind::Normal), None);
    }

    #[test]
    fn degenerate_polygon_has_no_triangles() {
        assert!(PolygonData::new(2).triangulate().is_empty());
    }
}
