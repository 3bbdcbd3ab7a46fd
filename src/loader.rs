//! COLLADA Loader
//!
//! The entry point of the crate. [`ColladaLoader`] parses a document, builds
//! the image and material libraries, walks the instantiated visual scene and
//! feeds the result to a [`SceneBuilder`].
//!
//! A load either succeeds completely or returns the first [`DaeError`]; the
//! convenience methods build into a fresh [`SceneGraph`] that is dropped on
//! failure.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::diagnostics;
use crate::document::{Document, Node, NodeId};
use crate::errors::{DaeError, Result};
use crate::geometry::{GeometryPart, SourceCache, build_geometry};
use crate::material::{MaterialDescriptor, load_materials};
use crate::options::LoadOptions;
use crate::scene::emitter::SceneEmitter;
use crate::scene::{SceneBuilder, SceneGraph, SceneMetadata, UpAxis};
use crate::texture::{FsTextureLoader, Texture, TextureLoader, load_images};
use crate::value::{FLOAT, TEXT};

/// Top-level elements the loader knows how to use.
const HANDLED_ELEMENTS: &[&str] = &[
    "asset",
    "scene",
    "library_images",
    "library_materials",
    "library_effects",
    "library_geometries",
    "library_controllers",
    "library_animations",
    "library_visual_scenes",
    "library_nodes",
    "library_lights",
];

/// Everything resolved while one document is compiled.
///
/// Results are keyed by the node they were compiled from, so an element
/// referenced from several places is compiled once.
pub(crate) struct LoadContext<'a> {
    pub doc: &'a Document,
    pub options: &'a LoadOptions,
    pub sources: SourceCache,
    pub textures: FxHashMap<NodeId, Texture>,
    pub materials: FxHashMap<NodeId, MaterialDescriptor>,
    pub geometries: FxHashMap<NodeId, Vec<GeometryPart>>,
    pub metadata: SceneMetadata,
}

impl<'a> LoadContext<'a> {
    fn new(doc: &'a Document, options: &'a LoadOptions) -> Self {
        Self {
            doc,
            options,
            sources: SourceCache::new(),
            textures: FxHashMap::default(),
            materials: FxHashMap::default(),
            geometries: FxHashMap::default(),
            metadata: SceneMetadata::default(),
        }
    }

    /// Compiled parts of a `geometry`, built on first use.
    pub fn geometry(&mut self, geometry: &Node<'_>) -> Result<Vec<GeometryPart>> {
        let Some(id) = geometry.node_id() else {
            return Ok(Vec::new());
        };
        if let Some(parts) = self.geometries.get(&id) {
            return Ok(parts.clone());
        }
        let parts = build_geometry(geometry, &mut self.sources, self.options.auto_bump)?;
        self.geometries.insert(id, parts.clone());
        Ok(parts)
    }
}

/// Compiles COLLADA documents.
pub struct ColladaLoader {
    options: LoadOptions,
    texture_loader: Box<dyn TextureLoader>,
}

impl Default for ColladaLoader {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl ColladaLoader {
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            texture_loader: Box::new(FsTextureLoader),
        }
    }

    /// Replaces the default file-system texture loader.
    #[must_use]
    pub fn with_texture_loader(mut self, loader: impl TextureLoader + 'static) -> Self {
        self.texture_loader = Box::new(loader);
        self
    }

    #[must_use]
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn load_str(&self, xml: &str) -> Result<SceneGraph> {
        let doc = Document::parse_str(xml)?;
        self.build_graph(&doc, None)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<SceneGraph> {
        let doc = Document::from_reader(reader)?;
        self.build_graph(&doc, None)
    }

    /// Loads a file; relative image paths are also looked up next to it.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<SceneGraph> {
        let path = path.as_ref();
        log::info!("Loading COLLADA document {}", path.display());
        let doc = Document::from_reader(BufReader::new(File::open(path)?))?;
        let folder = path.parent().map(PathBuf::from);
        self.build_graph(&doc, folder.as_deref())
    }

    fn build_graph(&self, doc: &Document, folder: Option<&Path>) -> Result<SceneGraph> {
        let mut graph = SceneGraph::new();
        self.load_into(doc, folder, &mut graph)?;
        log::info!(
            "Compiled {} nodes, {} meshes, {} materials, {} skeletons",
            graph.nodes.len(),
            graph.meshes.len(),
            graph.materials.len(),
            graph.skeletons.len()
        );
        Ok(graph)
    }

    /// Compiles `doc` into any [`SceneBuilder`].
    ///
    /// `folder` is the directory of the document, used to find images.
    pub fn load_into<B: SceneBuilder>(&self, doc: &Document, folder: Option<&Path>, builder: &mut B) -> Result<()> {
        let root = doc.root();
        if !root.has_name("COLLADA") {
            return Err(DaeError::NotCollada(root.name().to_string()));
        }

        let mut ctx = LoadContext::new(doc, &self.options);
        ctx.metadata = self.read_metadata(&root.child("asset"));
        builder.set_metadata(ctx.metadata.clone());

        for child in root.iter_children() {
            match child.name() {
                name if HANDLED_ELEMENTS.contains(&name) => {}
                "extra" => diagnostics::skipped(&child),
                other => diagnostics::unsupported(other, "top-level library"),
            }
        }

        for library in root.children(&["library_images"]) {
            let textures = load_images(
                &library,
                self.texture_loader.as_ref(),
                folder,
                &self.options.texture_bases,
            );
            ctx.textures.extend(textures);
        }

        for library in root.children(&["library_materials"]) {
            let materials = load_materials(&library, &ctx.textures, self.options.two_sided)?;
            ctx.materials.extend(materials);
        }

        let unbound = SceneEmitter::new(&mut ctx, builder).emit()?;
        if unbound > 0 {
            let material = builder.create_material(MaterialDescriptor::default_material());
            let updated = builder.apply_default_material(material);
            log::debug!("Default material given to {updated} meshes");
        }
        Ok(())
    }

    fn read_metadata(&self, asset: &Node<'_>) -> SceneMetadata {
        let unit = asset.child("unit");
        let meter = unit.attribute("meter", &FLOAT).filter(|m| *m > 0.0);

        let up_axis = match asset.child_value("up_axis", &TEXT) {
            Some(name) => UpAxis::from_name(&name).unwrap_or_else(|| {
                diagnostics::unsupported("up_axis", &name);
                UpAxis::default()
            }),
            None => UpAxis::default(),
        };

        SceneMetadata {
            up_axis,
            unit: if self.options.ignore_measuring_unit {
                1.0
            } else {
                meter.unwrap_or(1.0)
            },
            unit_name: unit.attr("name").map(str::to_string),
        }
    }
}
