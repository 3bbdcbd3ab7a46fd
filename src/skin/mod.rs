//! Skin controllers.
//!
//! A `skin` names its joints, their inverse bind matrices and a compressed
//! influence stream (`vcount`/`v`). [`SkinBuilder`] turns those into a
//! [`Skeleton`] whose bone tree mirrors the scene nodes of the joints, plus an
//! [`InfluenceTable`] that is later mapped onto every triangulated vertex
//! through its original position index.

mod builder;
mod skeleton;

pub use builder::{
    InfluenceTable, MAX_INFLUENCES, MAX_JOINTS, Skin, SkinBuilder, VertexSkinningData,
};
pub use skeleton::{Bone, Skeleton};
