use glam::Affine3A;
use rustc_hash::FxHashMap;

use super::builder::{NodeInfo, SceneBuilder};
use super::light::read_light;
use super::transform::local_transform;
use super::NodeType;
use crate::animation::AnimationBuilder;
use crate::diagnostics;
use crate::document::{Node, NodeId};
use crate::errors::{DaeError, Result};
use crate::geometry::GeometryPart;
use crate::loader::LoadContext;
use crate::skin::SkinBuilder;

/// Walks the instantiated visual scene depth-first.
pub(crate) struct SceneEmitter<'c, 'a, B: SceneBuilder> {
    ctx: &'c mut LoadContext<'a>,
    builder: &'c mut B,
    /// Builder handles of the materials created so far.
    material_handles: FxHashMap<NodeId, B::Material>,
    /// `node` elements currently being emitted, for `instance_node` cycles.
    active: Vec<NodeId>,
    unbound_meshes: usize,
}

impl<'c, 'a, B: SceneBuilder> SceneEmitter<'c, 'a, B> {
    pub fn new(ctx: &'c mut LoadContext<'a>, builder: &'c mut B) -> Self {
        Self {
            ctx,
            builder,
            material_handles: FxHashMap::default(),
            active: Vec::new(),
            unbound_meshes: 0,
        }
    }

    /// Emits the scene and returns how many meshes were created without a
    /// material.
    pub fn emit(mut self) -> Result<usize> {
        let doc = self.ctx.doc;
        let scene = doc.root().child("scene");
        if !scene.is_defined() {
            return Err(DaeError::missing_element("COLLADA", "scene"));
        }
        let instance = scene.child("instance_visual_scene");
        if !instance.is_defined() {
            return Err(DaeError::missing_element("scene", "instance_visual_scene"));
        }
        let url = instance
            .attr("url")
            .ok_or_else(|| DaeError::missing_attribute("instance_visual_scene", "url"))?;
        let visual_scene = instance.resolve(url);
        expect_element(&visual_scene, "visual_scene", "instance_visual_scene", url)?;

        for child in visual_scene.iter_children() {
            match child.name() {
                "node" => self.emit_node(&child, None, Affine3A::IDENTITY)?,
                "asset" | "extra" => diagnostics::skipped(&child),
                other => diagnostics::unsupported(other, format_args!("in {visual_scene}")),
            }
        }
        Ok(self.unbound_meshes)
    }

    fn emit_node(&mut self, node: &Node<'a>, parent: Option<B::Node>, parent_world: Affine3A) -> Result<()> {
        let Some(node_id) = node.node_id() else {
            return Ok(());
        };
        if self.active.contains(&node_id) {
            diagnostics::unsupported("instance_node", format_args!("cyclic instantiation of {node}"));
            return Ok(());
        }
        self.active.push(node_id);

        let kind = match node.attr("type") {
            None => NodeType::Node,
            Some(name) => NodeType::from_name(name).unwrap_or_else(|| {
                diagnostics::unsupported("node", format_args!("type '{name}' on {node}"));
                NodeType::Node
            }),
        };
        let transform = local_transform(node, self.ctx.metadata.unit);
        let world = parent_world * transform;
        let handle = self.builder.create_node(
            parent,
            NodeInfo {
                name: node.attr("name").unwrap_or_default(),
                id: node.element_id(),
                kind,
                transform,
            },
        );

        for instance in node.children(&["instance_geometry"]) {
            self.instance_geometry(&instance, handle)?;
        }
        if self.ctx.options.ignore_lights {
            if node.child("instance_light").is_defined() {
                log::debug!("Lights of {node} ignored");
            }
        } else {
            for instance in node.children(&["instance_light"]) {
                self.instance_light(&instance, handle, &world)?;
            }
        }
        for child in node.children(&["node"]) {
            self.emit_node(&child, Some(handle), world)?;
        }
        for camera in node.children(&["instance_camera"]) {
            diagnostics::unsupported("instance_camera", format_args!("{camera} in {node}"));
        }
        for instance in node.children(&["instance_controller"]) {
            self.instance_controller(&instance, handle)?;
        }
        for instance in node.children(&["instance_node"]) {
            let target = instance.linked_url();
            if target.has_name("node") {
                self.emit_node(&target, Some(handle), world)?;
            } else {
                let url = instance.attr("url").unwrap_or_default();
                diagnostics::unsupported("instance_node", format_args!("external or missing node '{url}'"));
            }
        }
        if let Some(layer) = node.attr("layer") {
            log::debug!("{node} belongs to layer '{layer}'");
        }
        for extra in node.children(&["asset", "extra"]) {
            diagnostics::skipped(&extra);
        }

        self.active.pop();
        Ok(())
    }

    fn instance_geometry(&mut self, instance: &Node<'a>, node: B::Node) -> Result<()> {
        let url = instance
            .attr("url")
            .ok_or_else(|| DaeError::missing_attribute("instance_geometry", "url"))?;
        let geometry = instance.resolve(url);
        expect_element(&geometry, "geometry", "instance_geometry", url)?;

        let parts = self.ctx.geometry(&geometry)?;
        let holder = self.builder.create_node(
            Some(node),
            NodeInfo::named(instance.attr("name").unwrap_or_default()),
        );
        self.emit_parts(instance, holder, url, parts, |_| {});
        Ok(())
    }

    fn instance_light(&mut self, instance: &Node<'a>, node: B::Node, world: &Affine3A) -> Result<()> {
        let light = instance.linked_url();
        if !light.has_name("light") {
            diagnostics::unresolved("instance_light", instance.attr("url").unwrap_or_default());
            return Ok(());
        }
        if let Some(light) = read_light(&light, world)? {
            self.builder.add_light(node, light);
        }
        Ok(())
    }

    /// Skinned geometry: one node holding the skinned meshes, the skeleton
    /// and its clips.
    fn instance_controller(&mut self, instance: &Node<'a>, node: B::Node) -> Result<()> {
        let url = instance
            .attr("url")
            .ok_or_else(|| DaeError::missing_attribute("instance_controller", "url"))?;
        let controller = instance.resolve(url);
        expect_element(&controller, "controller", "instance_controller", url)?;

        let skin = controller.child("skin");
        if !skin.is_defined() {
            diagnostics::unsupported("controller", format_args!("{controller} is not a skin"));
            return Ok(());
        }
        let source = skin
            .attr("source")
            .ok_or_else(|| DaeError::missing_attribute("skin", "source"))?;
        let geometry = skin.resolve(source);
        expect_element(&geometry, "geometry", "skin", source)?;

        let name = instance.parent().attr("name").unwrap_or_default();
        let compiled = SkinBuilder::new(skin, *instance, &mut self.ctx.sources).build(name)?;

        let library = self.ctx.doc.root().find_descendant("library_animations");
        let clips = AnimationBuilder::new(library, &mut self.ctx.sources).build(&compiled.skeleton)?;

        let parts = self.ctx.geometry(&geometry)?;
        let skinned = self.builder.create_node(Some(node), NodeInfo::named(name));
        self.emit_parts(instance, skinned, url, parts, |mesh| compiled.apply(mesh));
        log::debug!(
            "Skinned node '{name}': {} bones, {} clips",
            compiled.skeleton.len(),
            clips.len()
        );
        self.builder.attach_skeleton(skinned, compiled.skeleton, clips);
        Ok(())
    }

    fn emit_parts(
        &mut self,
        instance: &Node<'a>,
        node: B::Node,
        url: &str,
        parts: Vec<GeometryPart>,
        prepare: impl Fn(&mut crate::geometry::MeshData),
    ) {
        let base = url.trim_start_matches('#');
        for part in parts {
            let mut mesh = part.mesh;
            prepare(&mut mesh);
            let name = match &part.material_symbol {
                Some(symbol) => format!("{base}:{symbol}"),
                None => base.to_string(),
            };
            let material = part
                .material_symbol
                .as_deref()
                .and_then(|symbol| self.bind_material(instance, symbol));
            if material.is_none() {
                self.unbound_meshes += 1;
            }
            self.builder.create_mesh(node, &name, mesh, material);
        }
    }

    /// Finds the material bound to `symbol` by `bind_material`.
    ///
    /// An exact `symbol` match wins; otherwise the first entry whose symbol
    /// is a case-insensitive prefix of `symbol`, or the other way round, is
    /// taken.
    fn bind_material(&mut self, instance: &Node<'a>, symbol: &str) -> Option<B::Material> {
        let bindings = instance
            .child("bind_material")
            .child("technique_common")
            .children(&["instance_material"]);

        let binding = bindings
            .iter()
            .find(|b| b.attr("symbol") == Some(symbol))
            .or_else(|| {
                let wanted = symbol.to_lowercase();
                let guess = bindings.iter().find(|b| {
                    b.attr("symbol").is_some_and(|s| {
                        let s = s.to_lowercase();
                        !s.is_empty() && (wanted.starts_with(&s) || s.starts_with(&wanted))
                    })
                })?;
                log::info!(
                    "Material symbol '{symbol}' bound by guess to '{}'",
                    guess.attr("symbol").unwrap_or_default()
                );
                Some(guess)
            });
        let Some(binding) = binding else {
            diagnostics::unresolved("bind_material", format_args!("no binding for '{symbol}'"));
            return None;
        };

        let material = binding.linked("target");
        let id = material.node_id()?;
        if let Some(handle) = self.material_handles.get(&id) {
            return Some(handle.clone());
        }
        let Some(descriptor) = self.ctx.materials.get(&id) else {
            diagnostics::unresolved("instance_material", format_args!("{material} was not compiled"));
            return None;
        };
        let handle = self.builder.create_material(descriptor.clone());
        self.material_handles.insert(id, handle.clone());
        Some(handle)
    }
}

fn expect_element(node: &Node<'_>, expected: &str, element: &str, link: &str) -> Result<()> {
    if !node.is_defined() {
        return Err(DaeError::unresolved(element, link));
    }
    if !node.has_name(expected) {
        return Err(DaeError::UnexpectedElement {
            expected: expected.to_string(),
            found: node.name().to_string(),
        });
    }
    Ok(())
}
