//! Scene graph emission
//!
//! Walks the instantiated `visual_scene` and hands nodes, meshes, materials,
//! lights and skeletons to a [`SceneBuilder`]:
//! - [`SceneBuilder`]: the renderer-facing collaborator interface
//! - [`SceneGraph`]: bundled in-memory implementation
//! - [`Light`]: resolved light sources
//! - [`transform`]: the node transform sub-language

pub mod builder;
pub(crate) mod emitter;
pub mod graph;
pub mod light;
pub mod transform;

pub use builder::{NodeInfo, SceneBuilder, SceneMetadata};
pub use graph::{Mesh, SceneGraph, SceneNode};
pub use light::{Light, LightKind};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeKey;
    pub struct MeshKey;
    pub struct MaterialKey;
    pub struct LightKey;
    pub struct SkeletonKey;
}

/// Axis pointing up in the document's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpAxis {
    XUp,
    #[default]
    YUp,
    ZUp,
}

impl UpAxis {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "X_UP" => Some(UpAxis::XUp),
            "Y_UP" => Some(UpAxis::YUp),
            "Z_UP" => Some(UpAxis::ZUp),
            _ => None,
        }
    }
}

/// The `type` attribute of a `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    #[default]
    Node,
    Joint,
}

impl NodeType {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NODE" => Some(NodeType::Node),
            "JOINT" => Some(NodeType::Joint),
            _ => None,
        }
    }
}
