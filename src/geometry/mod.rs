//! Geometry Assembly
//!
//! Turns a `geometry` element into flat, de-indexed triangle buffers.
//!
//! # Pipeline
//!
//! 1. [`InputLayout`] reads the `input` declarations of a primitive element
//!    and decodes their sources (shared through a [`SourceCache`]).
//! 2. The interleaved index stream is scattered into [`PolygonData`] values,
//!    one list per attribute set.
//! 3. Polygons are fan-triangulated and flattened into [`MeshData`]. Every
//!    output vertex remembers its original position index so that skin
//!    influences can be mapped onto it later.
//!
//! One [`GeometryPart`] is produced per primitive element, since each element
//! may bind a different material.

pub mod assembler;
pub mod input;
pub mod mesh;
pub mod polygon;
pub mod semantic;
pub mod source;
pub mod tangents;

pub use assembler::{PrimitiveGroup, flatten, read_primitive, triangulate_all};
pub use input::{InputLayout, InputShared, ScatterTarget};
pub use mesh::{BoundingBox, MeshData, SkinBuffers, VertexAttribute};
pub use polygon::{AttributeKind, PolygonData, PolygonVertex};
pub use semantic::{SEMANTIC, Semantic, SemanticDecoder};
pub use source::{SourceBuffer, SourceCache, SourceData};
pub use tangents::generate_tangents;

use crate::diagnostics;
use crate::document::Node;
use crate::errors::{DaeError, Result};

/// A compiled primitive group of one geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryPart {
    pub mesh: MeshData,
    /// The `material` symbol of the primitive element, bound later through
    /// `bind_material`.
    pub material_symbol: Option<String>,
}

/// Compiles a `geometry` element.
///
/// Exactly one of `convex_mesh`, `mesh` or `spline` must be present; only
/// `mesh` produces parts.
pub fn build_geometry(geometry: &Node<'_>, cache: &mut SourceCache, auto_bump: bool) -> Result<Vec<GeometryPart>> {
    let shapes = geometry.children(&["convex_mesh", "mesh", "spline"]);
    let [shape] = shapes.as_slice() else {
        return Err(DaeError::InvalidElementCount {
            element: "geometry".to_string(),
            detail: format!(
                "expected exactly one of convex_mesh, mesh or spline, found {}",
                shapes.len()
            ),
        });
    };
    if !shape.has_name("mesh") {
        diagnostics::unsupported(shape.name(), format_args!("in geometry {geometry}"));
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    for child in shape.iter_children() {
        match child.name() {
            "source" | "vertices" | "input" => {}
            "extra" => diagnostics::skipped(&child),
            _ => {
                let Some(group) = read_primitive(&child, cache)? else {
                    continue;
                };
                if group.polygons.is_empty() {
                    log::info!("Primitive {child} in {geometry} has no polygons");
                    continue;
                }
                let triangles = triangulate_all(group.polygons);
                let Some(mut mesh) = flatten(&triangles) else {
                    log::info!("Primitive {child} in {geometry} has no vertices");
                    continue;
                };
                if auto_bump {
                    generate_tangents(&mut mesh);
                }
                parts.push(GeometryPart {
                    mesh,
                    material_symbol: group.material,
                });
            }
        }
    }
    Ok(parts)
}
