use glam::{Affine3A, Vec3};
use uuid::Uuid;

use crate::diagnostics;
use crate::document::Node;
use crate::errors::{DaeError, Result};
use crate::value::VEC3;

/// Range given to point lights, which carry no range of their own.
pub const POINT_LIGHT_RANGE: f32 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    /// World-space direction the light travels in.
    pub direction: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    Directional(DirectionalLight),
    Point(PointLight),
}

#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub name: String,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    fn with_kind(name: &str, color: Vec3, kind: LightKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            color,
            intensity: 1.0,
            kind,
        }
    }

    /// A light shining along the node's -Z axis.
    #[must_use]
    pub fn new_directional(name: &str, color: Vec3, world: &Affine3A) -> Self {
        let direction = world.transform_vector3(-Vec3::Z).normalize_or_zero();
        Self::with_kind(name, color, LightKind::Directional(DirectionalLight { direction }))
    }

    /// A light at the node's origin.
    #[must_use]
    pub fn new_point(name: &str, color: Vec3, world: &Affine3A) -> Self {
        let position = world.transform_point3(Vec3::ZERO);
        Self::with_kind(
            name,
            color,
            LightKind::Point(PointLight {
                position,
                range: POINT_LIGHT_RANGE,
            }),
        )
    }
}

/// Compiles a `light` placed by a node with world matrix `world`.
///
/// Ambient and spot lights are reported and yield `None`.
pub fn read_light(light: &Node<'_>, world: &Affine3A) -> Result<Option<Light>> {
    let technique = light.child("technique_common");
    if !technique.is_defined() {
        return Err(DaeError::missing_element("light", "technique_common"));
    }

    let shapes = technique.children(&["ambient", "directional", "point", "spot"]);
    let [shape] = shapes.as_slice() else {
        return Err(DaeError::InvalidElementCount {
            element: "technique_common".to_string(),
            detail: format!("expected one light type, found {}", shapes.len()),
        });
    };

    let name = light.attr("name").or(light.element_id()).unwrap_or_default();
    let color = shape.child_value("color", &VEC3).unwrap_or(Vec3::ONE);
    match shape.name() {
        "directional" => Ok(Some(Light::new_directional(name, color, world))),
        "point" => Ok(Some(Light::new_point(name, color, world))),
        other => {
            diagnostics::unsupported("light", format_args!("{other} light {light}"));
            Ok(None)
        }
    }
}
