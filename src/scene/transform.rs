//! Node transforms.
//!
//! A `node` lists its transform elements in document order; each one is
//! post-multiplied onto the accumulated local matrix.

use glam::{Affine3A, Mat3, Quat, Vec3};

use crate::diagnostics;
use crate::document::Node;
use crate::value::{FLOAT_LIST, MATRIX, VEC3};

/// One transform element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformElement {
    LookAt { eye: Vec3, interest: Vec3, up: Vec3 },
    Matrix(Affine3A),
    /// Axis and angle in degrees.
    Rotate { axis: Vec3, degrees: f32 },
    Scale(Vec3),
    /// Already multiplied by the document unit.
    Translate(Vec3),
}

impl TransformElement {
    /// Reads a transform element; `None` for other tags and for malformed
    /// values.
    #[must_use]
    pub fn parse(node: &Node<'_>, unit: f32) -> Option<Self> {
        match node.name() {
            "lookat" => match node.content(&FLOAT_LIST)?.as_slice() {
                &[ex, ey, ez, ix, iy, iz, ux, uy, uz] => Some(TransformElement::LookAt {
                    eye: Vec3::new(ex, ey, ez),
                    interest: Vec3::new(ix, iy, iz),
                    up: Vec3::new(ux, uy, uz),
                }),
                _ => None,
            },
            "matrix" => node
                .content(&MATRIX)
                .map(|m| TransformElement::Matrix(Affine3A::from_mat4(m))),
            "rotate" => match node.content(&FLOAT_LIST)?.as_slice() {
                &[x, y, z, degrees] => Some(TransformElement::Rotate {
                    axis: Vec3::new(x, y, z),
                    degrees,
                }),
                _ => None,
            },
            "scale" => node.content(&VEC3).map(TransformElement::Scale),
            "translate" => node
                .content(&VEC3)
                .map(|t| TransformElement::Translate(t * unit)),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        match *self {
            TransformElement::LookAt { eye, interest, up } => look_at(eye, interest, up),
            TransformElement::Matrix(m) => m,
            TransformElement::Rotate { axis, degrees } => match axis.try_normalize() {
                Some(axis) => Affine3A::from_quat(Quat::from_axis_angle(axis, degrees.to_radians())),
                None => Affine3A::IDENTITY,
            },
            TransformElement::Scale(s) => Affine3A::from_scale(s),
            TransformElement::Translate(t) => Affine3A::from_translation(t),
        }
    }
}

/// Camera-style placement at `eye` with -Z facing `interest`.
fn look_at(eye: Vec3, interest: Vec3, up: Vec3) -> Affine3A {
    let forward = (interest - eye).normalize_or_zero();
    let right = forward.cross(up);
    if right.length_squared() < 1e-8 {
        return Affine3A::from_translation(eye);
    }
    let right = right.normalize();
    let new_up = right.cross(forward).normalize();
    let rotation = Mat3::from_cols(right, new_up, -forward);
    Affine3A::from_mat3_translation(rotation, eye)
}

/// Local transform of `node`, translations scaled by `unit`.
#[must_use]
pub fn local_transform(node: &Node<'_>, unit: f32) -> Affine3A {
    let mut matrix = Affine3A::IDENTITY;
    for child in node.iter_children() {
        match child.name() {
            "lookat" | "matrix" | "rotate" | "scale" | "translate" => {
                match TransformElement::parse(&child, unit) {
                    Some(element) => matrix *= element.to_affine(),
                    None => diagnostics::unresolved(child.name(), format_args!("malformed {child}")),
                }
            }
            "skew" => diagnostics::unsupported("skew", format_args!("ignored on {node}")),
            _ => {}
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn elements_are_post_multiplied() {
        let doc = Document::parse_str(
            r#"<node>
                <translate>1 0 0</translate>
                <rotate>0 0 1 90</rotate>
                <scale>2 2 2</scale>
            </node>"#,
        )
        .unwrap();
        let m = local_transform(&doc.root(), 1.0);
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn look_at_faces_interest() {
        let m = look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let forward = m.transform_vector3(-Vec3::Z);
        assert!((forward - -Vec3::Z).length() < 1e-5);
        assert!((Vec3::from(m.translation) - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }
}
