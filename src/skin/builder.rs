use glam::Affine3A;
use smallvec::SmallVec;

use super::skeleton::{Bone, Skeleton};
use crate::document::Node;
use crate::errors::{DaeError, Result};
use crate::geometry::{MeshData, SkinBuffers, SourceCache};
use crate::value::{INT, INT_LIST, UINT_LIST, row_major};

/// Bone indices are stored as bytes.
pub const MAX_JOINTS: usize = 256;

/// Influences kept per output vertex.
pub const MAX_INFLUENCES: usize = 4;

/// One bone influence on one vertex of the source geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexSkinningData {
    /// Index into the geometry's position source.
    pub vertex_index: u32,
    pub bone_index: u8,
    pub weight: f32,
}

/// Influences grouped by original vertex index, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfluenceTable {
    per_vertex: Vec<SmallVec<[(u8, f32); MAX_INFLUENCES]>>,
}

impl InfluenceTable {
    #[must_use]
    pub fn from_records(records: &[VertexSkinningData]) -> Self {
        let mut table = Self::default();
        for record in records {
            let index = record.vertex_index as usize;
            if table.per_vertex.len() <= index {
                table.per_vertex.resize_with(index + 1, SmallVec::new);
            }
            table.per_vertex[index].push((record.bone_index, record.weight));
        }
        table
    }

    /// Influences of the source vertex `vertex_index`; empty when it has none.
    #[must_use]
    pub fn get(&self, vertex_index: u32) -> &[(u8, f32)] {
        self.per_vertex
            .get(vertex_index as usize)
            .map(|v| v.as_slice())
            .unwrap_or_default()
    }

    /// Packs the first four influences of a vertex, L2-normalized.
    #[must_use]
    pub fn packed(&self, vertex_index: u32) -> ([u8; 4], [f32; 4]) {
        let mut joints = [0u8; 4];
        let mut weights = [0f32; 4];
        for (slot, &(bone, weight)) in self.get(vertex_index).iter().take(MAX_INFLUENCES).enumerate() {
            joints[slot] = bone;
            weights[slot] = weight;
        }
        let norm = weights.iter().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for w in &mut weights {
                *w /= norm;
            }
        }
        (joints, weights)
    }
}

/// A compiled skin controller: the skeleton and the per-vertex influences of
/// its source geometry.
#[derive(Debug, Clone)]
pub struct Skin {
    pub skeleton: Skeleton,
    pub influences: InfluenceTable,
}

impl Skin {
    /// Writes joint and weight buffers plus bind-pose copies onto `mesh`.
    pub fn apply(&self, mesh: &mut MeshData) {
        let (joints, weights) = mesh
            .original_indices
            .iter()
            .map(|&index| self.influences.packed(index))
            .unzip();
        mesh.skin = Some(SkinBuffers {
            joints,
            weights,
            bind_positions: mesh.positions.clone(),
            bind_normals: mesh.normals.clone(),
        });
    }
}

/// Compiles `skin` elements against the instance that uses them.
pub struct SkinBuilder<'a, 'doc> {
    skin: Node<'doc>,
    instance: Node<'doc>,
    cache: &'a mut SourceCache,
}

impl<'a, 'doc> SkinBuilder<'a, 'doc> {
    /// `instance` is the `instance_controller`; joint symbols are resolved
    /// relative to it.
    pub fn new(skin: Node<'doc>, instance: Node<'doc>, cache: &'a mut SourceCache) -> Self {
        Self { skin, instance, cache }
    }

    pub fn build(mut self, name: &str) -> Result<Skin> {
        let joint_names = self.joint_names()?;
        if joint_names.len() > MAX_JOINTS {
            return Err(DaeError::TooManyJoints(joint_names.len()));
        }

        let matrices = self.inverse_bind_matrices()?;
        if matrices.len() != joint_names.len() {
            return Err(DaeError::length_mismatch(
                "skin joints/inverse bind matrices",
                joint_names.len(),
                matrices.len(),
            ));
        }

        let skeleton = self.skeleton(name, &joint_names, matrices)?;
        let records = self.influences(joint_names.len())?;
        log::debug!(
            "Skin '{name}': {} joints, {} influences",
            skeleton.len(),
            records.len()
        );

        Ok(Skin {
            skeleton,
            influences: InfluenceTable::from_records(&records),
        })
    }

    fn weights_node(&self) -> Result<Node<'doc>> {
        let weights = self.skin.child("vertex_weights");
        if weights.is_defined() {
            Ok(weights)
        } else {
            Err(DaeError::missing_element("skin", "vertex_weights"))
        }
    }

    fn input(&self, parent: &Node<'doc>, semantic: &str) -> Result<Node<'doc>> {
        let input = parent.child_with("input", "semantic", semantic);
        if input.is_defined() {
            Ok(input)
        } else {
            Err(DaeError::missing_element(parent.name(), &format!("input[{semantic}]")))
        }
    }

    fn joint_names(&mut self) -> Result<Vec<String>> {
        let weights = self.weights_node()?;
        let input = self.input(&weights, "JOINT")?;
        let source = input.linked_source();
        if !source.is_defined() {
            return Err(DaeError::unresolved("input", input.attr("source").unwrap_or_default()));
        }
        let buffer = self.cache.get_or_parse(&source)?;
        buffer
            .names()
            .map(<[String]>::to_vec)
            .ok_or_else(|| DaeError::missing_element(source.name(), "IDREF_array|Name_array"))
    }

    fn inverse_bind_matrices(&mut self) -> Result<Vec<Affine3A>> {
        let joints = self.skin.child("joints");
        if !joints.is_defined() {
            return Err(DaeError::missing_element("skin", "joints"));
        }
        let input = self.input(&joints, "INV_BIND_MATRIX")?;
        let source = input.linked_source();
        if !source.is_defined() {
            return Err(DaeError::unresolved("input", input.attr("source").unwrap_or_default()));
        }
        let buffer = self.cache.get_or_parse(&source)?;
        let floats = buffer
            .floats()
            .ok_or_else(|| DaeError::missing_element(source.name(), "float_array"))?;
        if floats.len() % 16 != 0 {
            return Err(DaeError::invalid(
                "float_array",
                format!("{} values do not form 4x4 matrices", floats.len()),
            ));
        }
        Ok(floats
            .chunks_exact(16)
            .filter_map(|chunk| <&[f32; 16]>::try_from(chunk).ok())
            .map(|m| Affine3A::from_mat4(row_major(m)))
            .collect())
    }

    /// Resolves a joint symbol to its scene node.
    ///
    /// Scoped resolution from the instance comes first; the `skeleton` roots
    /// of the instance are searched next.
    fn joint_node(&self, name: &str) -> Result<Node<'doc>> {
        let node = self.instance.resolve(name);
        if node.is_defined() {
            return Ok(node);
        }
        for root in self.instance.children(&["skeleton"]) {
            let Some(link) = root.text() else { continue };
            let hit = self.instance.resolve(link).find_sid(name);
            if hit.is_defined() {
                return Ok(hit);
            }
        }
        Err(DaeError::UnresolvedJoint(name.to_string()))
    }

    fn skeleton(&self, name: &str, joint_names: &[String], matrices: Vec<Affine3A>) -> Result<Skeleton> {
        let nodes = joint_names
            .iter()
            .map(|joint| self.joint_node(joint))
            .collect::<Result<Vec<_>>>()?;

        let mut bones: Vec<Bone> = joint_names
            .iter()
            .zip(&matrices)
            .map(|(joint, matrix)| Bone::from_inverse_bind(joint, matrix))
            .collect();

        for (index, node) in nodes.iter().enumerate() {
            bones[index].children = node
                .iter_children()
                .filter_map(|child| nodes.iter().position(|n| *n == child))
                .collect();
        }

        Ok(Skeleton::new(name, bones, matrices))
    }

    /// Reads `vcount`/`v` into influence records.
    fn influences(&mut self, joint_count: usize) -> Result<Vec<VertexSkinningData>> {
        let weights_node = self.weights_node()?;
        let joint_input = self.input(&weights_node, "JOINT")?;
        let weight_input = self.input(&weights_node, "WEIGHT")?;

        let chunk = weights_node
            .children(&["input"])
            .iter()
            .filter_map(|i| i.attribute("offset", &INT))
            .max()
            .map_or(1, |m| m.max(0) as usize + 1);
        let joint_offset = joint_input.attribute("offset", &INT).unwrap_or(0).max(0) as usize;
        let weight_offset = weight_input.attribute("offset", &INT).unwrap_or(0).max(0) as usize;

        let weight_source = weight_input.linked_source();
        if !weight_source.is_defined() {
            return Err(DaeError::unresolved("input", weight_input.attr("source").unwrap_or_default()));
        }
        let weight_buffer = self.cache.get_or_parse(&weight_source)?;
        let weight_values = weight_buffer
            .floats()
            .ok_or_else(|| DaeError::missing_element(weight_source.name(), "float_array"))?;

        let vcount = weights_node.child_value("vcount", &UINT_LIST).unwrap_or_default();
        let v = weights_node.child_value("v", &INT_LIST).unwrap_or_default();
        let needed: usize = vcount.iter().map(|&n| n as usize * chunk).sum();
        if needed != v.len() {
            return Err(DaeError::length_mismatch("vertex_weights/v", needed, v.len()));
        }

        let mut records = Vec::with_capacity(v.len() / chunk);
        let mut chunks = v.chunks_exact(chunk);
        for (vertex, &count) in vcount.iter().enumerate() {
            for influence in chunks.by_ref().take(count as usize) {
                let joint = influence[joint_offset];
                let weight_index = influence[weight_offset];
                if joint == -1 {
                    continue;
                }
                if joint < 0 || joint as usize >= joint_count {
                    return Err(DaeError::IndexOutOfRange {
                        what: "skin joints".to_string(),
                        index: i64::from(joint),
                        len: joint_count,
                    });
                }
                let weight = usize::try_from(weight_index)
                    .ok()
                    .and_then(|i| weight_values.get(i))
                    .copied()
                    .ok_or_else(|| DaeError::IndexOutOfRange {
                        what: "skin weights".to_string(),
                        index: i64::from(weight_index),
                        len: weight_values.len(),
                    })?;
                records.push(VertexSkinningData {
                    vertex_index: vertex as u32,
                    bone_index: joint as u8,
                    weight,
                });
            }
        }
        Ok(records)
    }
}
