use glam::{Affine3A, Quat, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// One joint of a skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// The joint symbol as listed by the skin; animation channels target it.
    pub name: String,

    // === Bind pose ===
    // Decomposed from the joint's inverse bind matrix.
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    // === Hierarchy ===
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl Bone {
    /// A bone whose bind pose is read off `inverse_bind_matrix`.
    #[must_use]
    pub fn from_inverse_bind(name: &str, inverse_bind_matrix: &Affine3A) -> Self {
        let (scale, rotation, translation) = inverse_bind_matrix.to_scale_rotation_translation();
        Self {
            name: name.to_string(),
            translation,
            rotation,
            scale,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // === Core Data ===
    // bones[i] is joint i of the skin, which is also the index stored in the
    // mesh's joint buffer.
    pub bones: Vec<Bone>,

    // Transforms mesh space into the local space of each bone.
    pub inverse_bind_matrices: Vec<Affine3A>,

    /// Bones without a joint parent, in joint order.
    pub roots: Vec<usize>,
    /// Usually `roots[0]`.
    pub root_bone_index: usize,

    by_name: FxHashMap<String, usize>,
}

impl Skeleton {
    /// Builds the skeleton from bones whose `children` are already set.
    /// Parent links and roots are derived here.
    #[must_use]
    pub fn new(name: &str, mut bones: Vec<Bone>, inverse_bind_matrices: Vec<Affine3A>) -> Self {
        for parent in 0..bones.len() {
            for child in bones[parent].children.clone() {
                if let Some(bone) = bones.get_mut(child) {
                    bone.parent = Some(parent);
                }
            }
        }

        let roots: Vec<usize> = (0..bones.len()).filter(|&i| bones[i].is_root()).collect();
        let mut by_name = FxHashMap::default();
        for (index, bone) in bones.iter().enumerate() {
            by_name.entry(bone.name.clone()).or_insert(index);
        }

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            root_bone_index: roots.first().copied().unwrap_or(0),
            bones,
            inverse_bind_matrices,
            roots,
            by_name,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<&Bone> {
        self.bones.get(self.root_bone_index)
    }

    /// Mesh-to-bone transform of every joint in bind pose, as matrices
    /// ready for a joint palette.
    #[must_use]
    pub fn bind_pose_palette(&self) -> Vec<glam::Mat4> {
        self.inverse_bind_matrices
            .iter()
            .map(|m| glam::Mat4::from(*m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parents_follow_children() {
        let mut hip = Bone::from_inverse_bind("hip", &Affine3A::IDENTITY);
        hip.children = vec![1];
        let knee = Bone::from_inverse_bind(
            "knee",
            &Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        );
        let skeleton = Skeleton::new("legs", vec![hip, knee], vec![Affine3A::IDENTITY; 2]);

        assert_eq!(skeleton.roots, [0]);
        assert_eq!(skeleton.bones[1].parent, Some(0));
        assert_eq!(skeleton.bone_index("knee"), Some(1));
        assert_eq!(skeleton.bone("knee").unwrap().translation, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(skeleton.root_bone().unwrap().name, "hip");
    }
}
