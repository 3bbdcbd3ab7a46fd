use glam::Affine3A;

use super::{Light, NodeType, UpAxis};
use crate::animation::AnimationClip;
use crate::geometry::MeshData;
use crate::material::MaterialDescriptor;
use crate::skin::Skeleton;

/// Document-wide facts from `asset`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMetadata {
    pub up_axis: UpAxis,
    /// Meters per document unit.
    pub unit: f32,
    pub unit_name: Option<String>,
}

impl Default for SceneMetadata {
    fn default() -> Self {
        Self {
            up_axis: UpAxis::YUp,
            unit: 1.0,
            unit_name: None,
        }
    }
}

/// Everything known about a node when it is created.
#[derive(Debug, Clone, Copy)]
pub struct NodeInfo<'a> {
    pub name: &'a str,
    pub id: Option<&'a str>,
    pub kind: NodeType,
    /// Local transform relative to the parent.
    pub transform: Affine3A,
}

impl<'a> NodeInfo<'a> {
    #[must_use]
    pub fn named(name: &'a str) -> Self {
        Self {
            name,
            id: None,
            kind: NodeType::Node,
            transform: Affine3A::IDENTITY,
        }
    }
}

/// Receives the compiled scene.
///
/// The loader calls these in document order; a node is always created before
/// anything is attached to it.
pub trait SceneBuilder {
    /// Handle to a created node.
    type Node: Copy;
    /// Handle to a created material. One handle is shared by every mesh that
    /// binds the same document material.
    type Material: Clone;

    fn set_metadata(&mut self, metadata: SceneMetadata);

    /// Creates a node; `parent: None` makes a root.
    fn create_node(&mut self, parent: Option<Self::Node>, info: NodeInfo<'_>) -> Self::Node;

    fn create_material(&mut self, descriptor: MaterialDescriptor) -> Self::Material;

    fn create_mesh(
        &mut self,
        node: Self::Node,
        name: &str,
        mesh: MeshData,
        material: Option<Self::Material>,
    );

    fn add_light(&mut self, node: Self::Node, light: Light);

    fn attach_skeleton(&mut self, node: Self::Node, skeleton: Skeleton, clips: Vec<AnimationClip>);

    /// Gives `material` to every mesh created without one and returns how
    /// many were updated.
    fn apply_default_material(&mut self, material: Self::Material) -> usize;
}
