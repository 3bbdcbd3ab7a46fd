//! Shared-input declarations and the scatter step that turns one interleaved
//! index stream into per-polygon attribute lists.

use std::sync::Arc;

use glam::Vec3;
use smallvec::SmallVec;

use super::polygon::{AttributeKind, PolygonData, PolygonVertex};
use super::semantic::{SEMANTIC, Semantic};
use super::source::{SourceBuffer, SourceCache};
use crate::diagnostics;
use crate::document::Node;
use crate::errors::{DaeError, Result};
use crate::value::{INT, ValueTransform};

/// Where the values of an input end up in a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterTarget {
    Position,
    Attribute(AttributeKind),
}

impl ScatterTarget {
    /// `None` for semantics that carry no per-vertex geometry data.
    #[must_use]
    pub fn for_semantic(semantic: Semantic) -> Option<Self> {
        let kind = match semantic {
            Semantic::Vertex | Semantic::Position => return Some(ScatterTarget::Position),
            Semantic::Normal => AttributeKind::Normal,
            Semantic::TexCoord | Semantic::Uv => AttributeKind::TexCoord,
            Semantic::Tangent | Semantic::TexTangent => AttributeKind::Tangent,
            Semantic::Binormal | Semantic::TexBinormal => AttributeKind::Binormal,
            Semantic::Color => AttributeKind::Color,
            _ => return None,
        };
        Some(ScatterTarget::Attribute(kind))
    }

    fn width(self, source: &SourceBuffer) -> usize {
        match self {
            ScatterTarget::Position
            | ScatterTarget::Attribute(
                AttributeKind::Normal | AttributeKind::Tangent | AttributeKind::Binormal,
            ) => 3,
            ScatterTarget::Attribute(AttributeKind::TexCoord | AttributeKind::Color) => source.stride,
        }
    }
}

/// One `input` child of a primitive, with its source already decoded.
#[derive(Debug, Clone)]
pub struct InputShared {
    pub semantic: Semantic,
    pub offset: usize,
    pub set: u32,
    pub source: Arc<SourceBuffer>,
}

impl InputShared {
    #[inline]
    #[must_use]
    pub fn stride(&self) -> usize {
        self.source.stride
    }
}

/// All inputs of one primitive element plus the derived chunk size.
#[derive(Debug, Clone)]
pub struct InputLayout {
    pub inputs: Vec<InputShared>,
    /// Number of interleaved indices per vertex.
    pub chunk_size: usize,
}

impl InputLayout {
    /// Reads the `input` children of `primitive`.
    ///
    /// A VERTEX input is re-linked to the POSITION source of its `vertices`
    /// element; a NORMAL declared on `vertices` becomes an extra input at the
    /// same offset.
    pub fn parse(primitive: &Node<'_>, cache: &mut SourceCache) -> Result<Self> {
        let mut inputs = Vec::new();
        let mut max_offset = 0usize;

        for input in primitive.children(&["input"]) {
            let offset = input
                .attribute("offset", &INT)
                .map_or(0, |o| o.max(0) as usize);
            max_offset = max_offset.max(offset);

            let Some(raw) = input.attr("semantic") else {
                return Err(DaeError::missing_attribute("input", "semantic"));
            };
            let Some(semantic) = SEMANTIC.transform(raw) else {
                diagnostics::unsupported("input", format_args!("unknown semantic '{raw}'"));
                continue;
            };
            if ScatterTarget::for_semantic(semantic).is_none() {
                diagnostics::unsupported("input", format_args!("semantic {semantic} is not scattered"));
                continue;
            }
            let set = input.attribute("set", &INT).map_or(0, |s| s.max(0) as u32);

            let linked = input.linked_source();
            if !linked.is_defined() {
                return Err(DaeError::unresolved("input", input.attr("source").unwrap_or_default()));
            }

            if semantic == Semantic::Vertex {
                if !linked.has_name("vertices") {
                    return Err(DaeError::UnexpectedElement {
                        expected: "vertices".to_string(),
                        found: linked.name().to_string(),
                    });
                }
                let position = linked.child_with("input", "semantic", "POSITION");
                let position_source = position.linked_source();
                if !position_source.is_defined() {
                    return Err(DaeError::missing_element("vertices", "input[POSITION]"));
                }
                inputs.push(InputShared {
                    semantic,
                    offset,
                    set,
                    source: cache.get_or_parse(&position_source)?,
                });

                let normal_source = linked
                    .child_with("input", "semantic", "NORMAL")
                    .linked_source();
                if normal_source.is_defined() {
                    inputs.push(InputShared {
                        semantic: Semantic::Normal,
                        offset,
                        set,
                        source: cache.get_or_parse(&normal_source)?,
                    });
                }
            } else {
                inputs.push(InputShared {
                    semantic,
                    offset,
                    set,
                    source: cache.get_or_parse(&linked)?,
                });
            }
        }

        Ok(Self {
            inputs,
            chunk_size: max_offset + 1,
        })
    }

    /// Takes every `chunk_size`-th index starting at `offset`.
    pub fn slice(&self, indices: &[u32], offset: usize) -> Result<Vec<u32>> {
        if indices.len() % self.chunk_size != 0 {
            return Err(DaeError::invalid(
                "p",
                format!(
                    "{} indices do not split into chunks of {}",
                    indices.len(),
                    self.chunk_size
                ),
            ));
        }
        Ok(indices
            .iter()
            .skip(offset)
            .step_by(self.chunk_size)
            .copied()
            .collect())
    }

    /// Builds one polygon per entry of `vertex_counts` from the interleaved
    /// `indices`.
    pub fn scatter(&self, indices: &[u32], vertex_counts: &[usize]) -> Result<Vec<PolygonData>> {
        let total: usize = vertex_counts.iter().sum();
        if total * self.chunk_size != indices.len() {
            return Err(DaeError::length_mismatch(
                "primitive indices",
                total * self.chunk_size,
                indices.len(),
            ));
        }

        let mut polygons: Vec<PolygonData> =
            vertex_counts.iter().map(|&n| PolygonData::new(n)).collect();

        let mut scratch = Vec::with_capacity(4);
        for input in &self.inputs {
            let Some(target) = ScatterTarget::for_semantic(input.semantic) else {
                continue;
            };
            let width = target.width(&input.source);
            let column = self.slice(indices, input.offset)?;
            let mut cursor = column.iter();

            for polygon in &mut polygons {
                for _ in 0..polygon.vertex_count() {
                    let Some(&index) = cursor.next() else {
                        return Err(DaeError::length_mismatch("primitive indices", total, column.len()));
                    };
                    scratch.clear();
                    input.source.read_floats(index as usize, width, &mut scratch)?;
                    match target {
                        ScatterTarget::Position => polygon.push_vertex(
                            input.set,
                            PolygonVertex {
                                position: Vec3::new(scratch[0], scratch[1], scratch[2]),
                                original_index: index,
                            },
                        )?,
                        ScatterTarget::Attribute(kind) => {
                            polygon.push_attribute(kind, input.set, SmallVec::from_slice(&scratch))?;
                        }
                    }
                }
            }
        }

        Ok(polygons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const TRIANGLE: &str = r##"
        <mesh>
            <source id="pos">
                <float_array id="pos-a">0 0 0  1 0 0  0 1 0</float_array>
                <technique_common><accessor stride="3"/></technique_common>
            </source>
            <source id="uv">
                <float_array id="uv-a">0 0  1 0  0 1</float_array>
                <technique_common><accessor stride="2"/></technique_common>
            </source>
            <vertices id="verts"><input semantic="POSITION" source="#pos"/></vertices>
            <triangles count="1">
                <input semantic="VERTEX" source="#verts" offset="0"/>
                <input semantic="TEXCOORD" source="#uv" offset="2" set="1"/>
                <input semantic="WEIRD" source="#uv" offset="1"/>
                <p>0 9 2  1 9 1  2 9 0</p>
            </triangles>
        </mesh>"##;

    #[test]
    fn chunk_size_counts_skipped_inputs() {
        let doc = Document::parse_str(TRIANGLE).unwrap();
        let triangles = doc.root().child("triangles");
        let layout = InputLayout::parse(&triangles, &mut SourceCache::new()).unwrap();
        assert_eq!(layout.chunk_size, 3);
        assert_eq!(layout.inputs.len(), 2);
        assert_eq!(layout.inputs[0].stride(), 3);

        let indices = [0, 9, 2, 1, 9, 1, 2, 9, 0];
        assert_eq!(layout.slice(&indices, 2).unwrap(), [2, 1, 0]);
        assert!(layout.slice(&indices[..8], 0).is_err());
    }

    #[test]
    fn scatter_fills_sets() {
        let doc = Document::parse_str(TRIANGLE).unwrap();
        let triangles = doc.root().child("triangles");
        let layout = InputLayout::parse(&triangles, &mut SourceCache::new()).unwrap();
        let polygons = layout
            .scatter(&[0, 9, 2, 1, 9, 1, 2, 9, 0], &[3])
            .unwrap();
        assert_eq!(polygons.len(), 1);

        let corners = polygons[0].vertex_set(0).unwrap();
        assert_eq!(corners[1].position, Vec3::X);
        assert_eq!(corners[2].original_index, 2);

        let uv = polygons[0].attribute_set(AttributeKind::TexCoord, 1).unwrap();
        assert_eq!(uv[0].as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn index_outside_source_is_fatal() {
        let doc = Document::parse_str(TRIANGLE).unwrap();
        let triangles = doc.root().child("triangles");
        let layout = InputLayout::parse(&triangles, &mut SourceCache::new()).unwrap();
        let err = layout.scatter(&[0, 9, 2, 1, 9, 1, 7, 9, 0], &[3]).unwrap_err();
        assert!(matches!(err, DaeError::IndexOutOfRange { index: 7, .. }));
    }
}
