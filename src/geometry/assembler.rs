use glam::Vec3;

use super::input::InputLayout;
use super::mesh::{BoundingBox, MeshData, VertexAttribute};
use super::polygon::{AttributeKind, PolygonData};
use super::source::SourceCache;
use crate::diagnostics;
use crate::document::Node;
use crate::errors::{DaeError, Result};
use crate::value::{INT, UINT_LIST};

/// Polygons of one primitive element and the material symbol it names.
#[derive(Debug, Clone)]
pub struct PrimitiveGroup {
    pub material: Option<String>,
    pub polygons: Vec<PolygonData>,
}

/// Reads one primitive element into polygons.
///
/// Returns `Ok(None)` for primitive kinds that are recognized but not
/// compiled.
pub fn read_primitive(primitive: &Node<'_>, cache: &mut SourceCache) -> Result<Option<PrimitiveGroup>> {
    let polygons = match primitive.name() {
        "triangles" => read_triangles(primitive, cache)?,
        "polylist" => read_polylist(primitive, cache)?,
        "polygons" => read_polygons(primitive, cache)?,
        "lines" | "linestrips" | "trifans" | "tristrips" => {
            diagnostics::unsupported(primitive.name(), "primitive kind is not compiled");
            return Ok(None);
        }
        _ => return Ok(None),
    };
    Ok(Some(PrimitiveGroup {
        material: primitive.attr("material").map(str::to_string),
        polygons,
    }))
}

fn required_count(primitive: &Node<'_>) -> Result<usize> {
    primitive
        .attribute("count", &INT)
        .filter(|c| *c >= 0)
        .map(|c| c as usize)
        .ok_or_else(|| DaeError::missing_attribute(primitive.name(), "count"))
}

/// Concatenated content of every `p` child.
fn index_stream(primitive: &Node<'_>) -> Result<Vec<u32>> {
    let mut indices = Vec::new();
    for p in primitive.children(&["p"]) {
        let chunk = p
            .content(&UINT_LIST)
            .ok_or_else(|| DaeError::invalid("p", "indices must be non-negative integers"))?;
        indices.extend(chunk);
    }
    Ok(indices)
}

fn read_triangles(primitive: &Node<'_>, cache: &mut SourceCache) -> Result<Vec<PolygonData>> {
    let count = required_count(primitive)?;
    let layout = InputLayout::parse(primitive, cache)?;
    let indices = index_stream(primitive)?;
    let expected = count * 3 * layout.chunk_size;
    if indices.len() != expected {
        return Err(DaeError::length_mismatch("triangles/p", expected, indices.len()));
    }
    layout.scatter(&indices, &vec![3; count])
}

fn read_polylist(primitive: &Node<'_>, cache: &mut SourceCache) -> Result<Vec<PolygonData>> {
    let count = required_count(primitive)?;
    let layout = InputLayout::parse(primitive, cache)?;
    let vcount: Vec<usize> = primitive
        .child_value("vcount", &UINT_LIST)
        .unwrap_or_default()
        .into_iter()
        .map(|n| n as usize)
        .collect();
    if vcount.len() != count {
        return Err(DaeError::length_mismatch("polylist/vcount", count, vcount.len()));
    }
    let indices = index_stream(primitive)?;
    layout.scatter(&indices, &vcount)
}

fn read_polygons(primitive: &Node<'_>, cache: &mut SourceCache) -> Result<Vec<PolygonData>> {
    let layout = InputLayout::parse(primitive, cache)?;
    if primitive.child("ph").is_defined() {
        diagnostics::unsupported("ph", "polygons with holes are skipped");
    }

    let mut polygons = Vec::new();
    for p in primitive.children(&["p"]) {
        let indices = p
            .content(&UINT_LIST)
            .ok_or_else(|| DaeError::invalid("p", "indices must be non-negative integers"))?;
        if indices.len() % layout.chunk_size != 0 {
            return Err(DaeError::invalid(
                "p",
                format!("{} indices do not split into chunks of {}", indices.len(), layout.chunk_size),
            ));
        }
        let vertex_count = indices.len() / layout.chunk_size;
        polygons.extend(layout.scatter(&indices, &[vertex_count])?);
    }
    Ok(polygons)
}

/// Fan-triangulates every polygon unless all of them are already triangles.
/// Polygons with fewer than 3 corners are dropped.
#[must_use]
pub fn triangulate_all(polygons: Vec<PolygonData>) -> Vec<PolygonData> {
    if polygons.iter().all(|p| p.vertex_count() == 3) {
        return polygons;
    }
    polygons
        .iter()
        .flat_map(|polygon| {
            if polygon.vertex_count() < 3 {
                log::debug!("Dropping polygon with {} corners", polygon.vertex_count());
            }
            polygon.triangulate()
        })
        .collect()
}

/// De-indexes triangulated polygons into flat buffers.
///
/// Each buffer is read from the lowest set id present on the first polygon.
/// Returns `None` when there is nothing to draw.
#[must_use]
pub fn flatten(triangles: &[PolygonData]) -> Option<MeshData> {
    let first = triangles.first()?;
    let vertex_set = first.first_vertex_set()?;

    let mut positions = Vec::with_capacity(triangles.len() * 3);
    let mut original_indices = Vec::with_capacity(triangles.len() * 3);
    for triangle in triangles {
        for corner in triangle.vertex_set(vertex_set)? {
            positions.push(corner.position);
            original_indices.push(corner.original_index);
        }
    }
    if positions.is_empty() {
        return None;
    }

    let vec3_buffer = |kind: AttributeKind| -> Option<Vec<Vec3>> {
        let set = first.first_attribute_set(kind)?;
        let mut out = Vec::with_capacity(positions.len());
        for triangle in triangles {
            for value in triangle.attribute_set(kind, set)? {
                out.push(Vec3::new(value[0], value[1], value[2]));
            }
        }
        (out.len() == positions.len()).then_some(out)
    };

    let wide_buffer = |kind: AttributeKind| -> Option<VertexAttribute> {
        let set = first.first_attribute_set(kind)?;
        let item_size = first.attribute_set(kind, set)?.first()?.len();
        let mut out = VertexAttribute::new(item_size);
        for triangle in triangles {
            for value in triangle.attribute_set(kind, set)? {
                out.data.extend(value.iter().copied().chain(std::iter::repeat(0.0)).take(item_size));
            }
        }
        (out.count() == positions.len()).then_some(out)
    };

    let bounds = BoundingBox::from_points(&positions)?;
    Some(MeshData {
        indices: (0..positions.len() as u32).collect(),
        normals: vec3_buffer(AttributeKind::Normal),
        tangents: vec3_buffer(AttributeKind::Tangent),
        binormals: vec3_buffer(AttributeKind::Binormal),
        texcoords: wide_buffer(AttributeKind::TexCoord),
        colors: wide_buffer(AttributeKind::Color),
        original_indices,
        skin: None,
        bounds,
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    const QUAD: &str = r##"
        <mesh>
            <source id="p"><float_array>0 0 0  1 0 0  1 1 0  0 1 0  0 0 1</float_array>
                <technique_common><accessor stride="3"/></technique_common></source>
            <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
            <polygons count="2">
                <input semantic="VERTEX" source="#v" offset="0"/>
                <p>0 1 2 3</p>
                <p>0 1 4</p>
            </polygons>
        </mesh>"##;

    #[test]
    fn polygons_each_p_is_one_polygon() {
        let doc = Document::parse_str(QUAD).unwrap();
        let group = read_primitive(&doc.root().child("polygons"), &mut SourceCache::new())
            .unwrap()
            .unwrap();
        assert_eq!(group.polygons.len(), 2);
        assert_eq!(group.polygons[0].vertex_count(), 4);

        let triangles = triangulate_all(group.polygons);
        assert_eq!(triangles.len(), 3);

        let mesh = flatten(&triangles).unwrap();
        assert_eq!(mesh.positions.len(), 9);
        assert_eq!(mesh.original_indices, [0, 1, 2, 0, 2, 3, 0, 1, 4]);
        assert_eq!(mesh.bounds.max, Vec3::ONE);
    }

    #[test]
    fn triangles_require_count() {
        let doc = Document::parse_str(
            r##"<mesh>
                <source id="p"><float_array>0 0 0 1 0 0 0 1 0</float_array></source>
                <triangles><input semantic="POSITION" source="#p"/><p>0 1 2</p></triangles>
            </mesh>"##,
        )
        .unwrap();
        let err = read_primitive(&doc.root().child("triangles"), &mut SourceCache::new()).unwrap_err();
        assert!(matches!(err, DaeError::MissingAttribute { .. }));
    }

    #[test]
    fn lines_are_skipped() {
        let doc = Document::parse_str("<mesh><lines count=\"1\"/></mesh>").unwrap();
        let group = read_primitive(&doc.root().child("lines"), &mut SourceCache::new()).unwrap();
        assert!(group.is_none());
    }

    #[test]
    fn empty_input_has_no_mesh() {
        assert!(flatten(&[]).is_none());
        assert!(flatten(&[PolygonData::new(3)]).is_none());
    }
}
