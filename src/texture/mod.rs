//! Images and textures.
//!
//! `library_images` declares images as inline hex data, `data:` URIs or file
//! references. Each one is turned into an [`ImageSource`] and handed to a
//! [`TextureLoader`] together with the file candidates to try. The default
//! [`FsTextureLoader`] decodes everything to RGBA8 with the `image` crate.

mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;
use rustc_hash::FxHashMap;

pub use source::{ImageSource, path_candidates};

use crate::diagnostics;
use crate::document::{Node, NodeId};

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    /// The file the pixels were read from, for path sources.
    pub path: Option<PathBuf>,
    pub format: Option<ImageFormat>,
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<u8>>,
}

/// Turns image sources into textures.
pub trait TextureLoader {
    /// `candidates` lists the files to try, in order, for path sources and
    /// is empty otherwise. A miss returns `None`.
    fn load(&self, source: &ImageSource, candidates: &[PathBuf]) -> Option<Texture>;
}

/// Reads files from disk and decodes them with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTextureLoader;

impl FsTextureLoader {
    fn decode(bytes: &[u8], format: Option<ImageFormat>, label: &str) -> Option<Texture> {
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        };
        match decoded {
            Ok(img) => {
                let rgba = img.to_rgba8();
                Some(Texture {
                    name: label.to_string(),
                    path: None,
                    format,
                    width: rgba.width(),
                    height: rgba.height(),
                    data: Arc::new(rgba.into_raw()),
                })
            }
            Err(e) => {
                log::warn!("Failed to decode image {label}: {e}");
                None
            }
        }
    }
}

impl TextureLoader for FsTextureLoader {
    fn load(&self, source: &ImageSource, candidates: &[PathBuf]) -> Option<Texture> {
        match source {
            ImageSource::Inline { bytes, format } => {
                Self::decode(bytes, Some((*format)?), "inline image")
            }
            ImageSource::DataUri { bytes, .. } => Self::decode(bytes, source.format(), "data uri"),
            ImageSource::Path(path) => {
                let file = candidates.iter().find(|c| c.is_file())?;
                let bytes = match std::fs::read(file) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("Failed to read {}: {e}", file.display());
                        return None;
                    }
                };
                let format = ImageFormat::from_path(file).ok().or_else(|| image::guess_format(&bytes).ok());
                let mut texture = Self::decode(&bytes, format, path)?;
                texture.path = Some(file.clone());
                Some(texture)
            }
        }
    }
}

/// Loads every `image` of `library_images`, keyed by image node.
///
/// Images that cannot be loaded are reported and left out.
pub fn load_images(
    library: &Node<'_>,
    loader: &dyn TextureLoader,
    document_folder: Option<&Path>,
    texture_bases: &[PathBuf],
) -> FxHashMap<NodeId, Texture> {
    let mut textures = FxHashMap::default();
    for child in library.iter_children() {
        match child.name() {
            "image" => {}
            "asset" | "extra" => {
                diagnostics::skipped(&child);
                continue;
            }
            _ => continue,
        }
        let Some(id) = child.node_id() else { continue };
        let Some(source) = ImageSource::from_image(&child) else {
            diagnostics::unresolved("image", format_args!("{child} has no usable data"));
            continue;
        };
        let candidates = match &source {
            ImageSource::Path(path) => path_candidates(path, document_folder, texture_bases),
            _ => Vec::new(),
        };
        match loader.load(&source, &candidates) {
            Some(mut texture) => {
                if let Some(name) = child.element_id() {
                    texture.name = name.to_string();
                }
                log::debug!("Loaded image {child} ({}x{})", texture.width, texture.height);
                textures.insert(id, texture);
            }
            None => diagnostics::unresolved("image", format_args!("cannot load {child}")),
        }
    }
    textures
}
