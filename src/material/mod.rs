//! Materials
//!
//! Effects are read into a flat [`MaterialParams`] record, then one pure
//! function per [`ShadingModel`] maps the record to the
//! [`MaterialDescriptor`] handed to the scene builder.
//!
//! # Shading models
//!
//! | Technique  | Lit | Specular |
//! |------------|-----|----------|
//! | `phong`    | yes | yes      |
//! | `lambert`  | yes | no       |
//! | `blinn`    | yes | yes      |
//! | `constant` | no  | no       |

mod library;
mod params;
pub mod shading;

pub use library::{load_materials, read_material};
pub use params::{MaterialParams, ShadingModel};
pub use shading::{MaterialDescriptor, MaterialSettings, Side};
