use glam::Affine3A;
use slotmap::{SecondaryMap, SlotMap};

use super::builder::{NodeInfo, SceneBuilder, SceneMetadata};
use super::light::Light;
use super::{LightKey, MaterialKey, MeshKey, NodeKey, NodeType, SkeletonKey};
use crate::animation::AnimationClip;
use crate::geometry::{BoundingBox, MeshData};
use crate::material::MaterialDescriptor;
use crate::skin::Skeleton;

/// A node of the compiled scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub id: Option<String>,
    pub kind: NodeType,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    // === Spatial ===
    pub local_matrix: Affine3A,
    /// Parent world matrix times `local_matrix`, fixed at creation.
    pub world_matrix: Affine3A,

    // === Components ===
    pub meshes: Vec<MeshKey>,
    pub lights: Vec<LightKey>,
    pub skeleton: Option<SkeletonKey>,
}

impl SceneNode {
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub node: NodeKey,
    pub data: MeshData,
    pub material: Option<MaterialKey>,
}

/// In-memory [`SceneBuilder`].
///
/// Every component lives in a slot map; nodes refer to components by key.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub nodes: SlotMap<NodeKey, SceneNode>,
    pub root_nodes: Vec<NodeKey>,

    // === Components ===
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub materials: SlotMap<MaterialKey, MaterialDescriptor>,
    pub lights: SlotMap<LightKey, Light>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,
    pub animations: SecondaryMap<SkeletonKey, Vec<AnimationClip>>,

    pub metadata: SceneMetadata,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// First node with the given `name`, in creation order.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeKey> {
        self.iter_depth_first().find(|&key| self.nodes[key].name == name)
    }

    /// All node keys, parents before children, siblings in creation order.
    pub fn iter_depth_first(&self) -> impl Iterator<Item = NodeKey> + '_ {
        let mut stack: Vec<NodeKey> = self.root_nodes.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let key = stack.pop()?;
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.children.iter().rev().copied());
            }
            Some(key)
        })
    }

    /// Meshes attached to `node`.
    pub fn meshes_of(&self, node: NodeKey) -> impl Iterator<Item = &Mesh> + '_ {
        self.nodes
            .get(node)
            .map(|n| n.meshes.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&key| self.meshes.get(key))
    }

    /// The material bound to `mesh`, if any.
    #[must_use]
    pub fn material_of(&self, mesh: &Mesh) -> Option<&MaterialDescriptor> {
        mesh.material.and_then(|key| self.materials.get(key))
    }

    /// Clips attached with `skeleton`.
    #[must_use]
    pub fn clips(&self, skeleton: SkeletonKey) -> &[AnimationClip] {
        self.animations.get(skeleton).map(Vec::as_slice).unwrap_or_default()
    }

    /// World-space bounds of every mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.meshes
            .values()
            .filter_map(|mesh| {
                let world = self.nodes.get(mesh.node)?.world_matrix;
                Some(mesh.data.bounds.transform(&world))
            })
            .reduce(|a, b| a.union(&b))
    }
}

impl SceneBuilder for SceneGraph {
    type Node = NodeKey;
    type Material = MaterialKey;

    fn set_metadata(&mut self, metadata: SceneMetadata) {
        self.metadata = metadata;
    }

    fn create_node(&mut self, parent: Option<NodeKey>, info: NodeInfo<'_>) -> NodeKey {
        let parent_world = parent
            .and_then(|p| self.nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.world_matrix);

        let key = self.nodes.insert(SceneNode {
            name: info.name.to_string(),
            id: info.id.map(str::to_string),
            kind: info.kind,
            parent,
            children: Vec::new(),
            local_matrix: info.transform,
            world_matrix: parent_world * info.transform,
            meshes: Vec::new(),
            lights: Vec::new(),
            skeleton: None,
        });

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.children.push(key),
            None => self.root_nodes.push(key),
        }
        key
    }

    fn create_material(&mut self, descriptor: MaterialDescriptor) -> MaterialKey {
        self.materials.insert(descriptor)
    }

    fn create_mesh(&mut self, node: NodeKey, name: &str, mesh: MeshData, material: Option<MaterialKey>) {
        let key = self.meshes.insert(Mesh {
            name: name.to_string(),
            node,
            data: mesh,
            material,
        });
        if let Some(n) = self.nodes.get_mut(node) {
            n.meshes.push(key);
        }
    }

    fn add_light(&mut self, node: NodeKey, light: Light) {
        let key = self.lights.insert(light);
        if let Some(n) = self.nodes.get_mut(node) {
            n.lights.push(key);
        }
    }

    fn attach_skeleton(&mut self, node: NodeKey, skeleton: Skeleton, clips: Vec<AnimationClip>) {
        let key = self.skeletons.insert(skeleton);
        self.animations.insert(key, clips);
        if let Some(n) = self.nodes.get_mut(node) {
            n.skeleton = Some(key);
        }
    }

    fn apply_default_material(&mut self, material: MaterialKey) -> usize {
        let mut updated = 0;
        for mesh in self.meshes.values_mut().filter(|m| m.material.is_none()) {
            mesh.material = Some(material);
            updated += 1;
        }
        updated
    }
}
