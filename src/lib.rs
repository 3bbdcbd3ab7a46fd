#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! COLLADA 1.4 scene compiler.
//!
//! Turns a `.dae` document into a resolved scene graph: reference resolution
//! over global ids and scoped sids, multi-stream vertex assembly with fan
//! triangulation, skin weights, bone trees and keyframe tracks.
//!
//! ```rust,ignore
//! use myth_dae::{ColladaLoader, LoadOptions};
//!
//! let loader = ColladaLoader::new(LoadOptions::default().with_ignore_lights(true));
//! let scene = loader.load_file("models/character.dae")?;
//! for (_, mesh) in scene.meshes.iter() {
//!     println!("{} ({} triangles)", mesh.name, mesh.data.triangle_count());
//! }
//! ```

pub mod animation;
pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod options;
pub mod scene;
pub mod skin;
pub mod texture;
pub mod value;

pub use animation::{AnimationClip, BoneTrack, ChannelTarget, InterpolationMode, KeyframeTrack};
pub use document::{Document, Node, NodeId};
pub use errors::{DaeError, Result};
pub use geometry::{BoundingBox, MeshData, Semantic};
pub use loader::ColladaLoader;
pub use material::{MaterialDescriptor, MaterialParams, ShadingModel};
pub use options::LoadOptions;
pub use scene::{Light, LightKind, SceneBuilder, SceneGraph, UpAxis};
pub use skin::{Bone, Skeleton};
pub use texture::{FsTextureLoader, ImageSource, Texture, TextureLoader};
