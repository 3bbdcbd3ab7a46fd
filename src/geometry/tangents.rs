use glam::Vec2;

use super::mesh::MeshData;

/// Fills `tangents` and `binormals` from positions and the first two
/// texcoord components, one frame per triangle.
///
/// Does nothing when the mesh has no texcoords or already carries a frame.
pub fn generate_tangents(mesh: &mut MeshData) {
    if mesh.tangents.is_some() || mesh.binormals.is_some() {
        return;
    }
    let Some(texcoords) = mesh.texcoords.as_ref().filter(|t| t.item_size >= 2) else {
        return;
    };

    let count = mesh.positions.len();
    let mut tangents = Vec::with_capacity(count);
    let mut binormals = Vec::with_capacity(count);

    for (t, corners) in mesh.positions.chunks_exact(3).enumerate() {
        let uv = |i: usize| {
            texcoords
                .get(t * 3 + i)
                .map_or(Vec2::ZERO, |v| Vec2::new(v[0], v[1]))
        };
        let (uv0, uv1, uv2) = (uv(0), uv(1), uv(2));

        let edge1 = corners[1] - corners[0];
        let edge2 = corners[2] - corners[0];
        let duv1 = uv1 - uv0;
        let duv2 = uv2 - uv0;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        let (tangent, binormal) = if det.abs() < f32::EPSILON {
            let tangent = edge1.normalize_or_zero();
            let normal = edge1.cross(edge2).normalize_or_zero();
            (tangent, normal.cross(tangent))
        } else {
            let r = 1.0 / det;
            (
                ((edge1 * duv2.y - edge2 * duv1.y) * r).normalize_or_zero(),
                ((edge2 * duv1.x - edge1 * duv2.x) * r).normalize_or_zero(),
            )
        };

        for i in 0..3 {
            let index = t * 3 + i;
            match mesh.normals.as_ref().and_then(|n| n.get(index)) {
                Some(&normal) => {
                    // Gram-Schmidt against the vertex normal, keeping handedness.
                    let ortho = (tangent - normal * normal.dot(tangent)).normalize_or_zero();
                    let handedness = if normal.cross(ortho).dot(binormal) < 0.0 { -1.0 } else { 1.0 };
                    tangents.push(ortho);
                    binormals.push(normal.cross(ortho) * handedness);
                }
                None => {
                    tangents.push(tangent);
                    binormals.push(binormal);
                }
            }
        }
    }

    mesh.tangents = Some(tangents);
    mesh.binormals = Some(binormals);
}
