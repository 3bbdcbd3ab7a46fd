use rustc_hash::FxHashMap;

use super::params::{MaterialParams, ShadingModel};
use super::shading::{self, MaterialDescriptor};
use crate::diagnostics;
use crate::document::{Node, NodeId};
use crate::errors::{DaeError, Result};
use crate::texture::Texture;
use crate::value::{COLOR, FLOAT, INT};

/// Compiles every `material` of `library_materials`, keyed by material node.
///
/// `two_sided` forces culling off for every material.
pub fn load_materials(
    library: &Node<'_>,
    textures: &FxHashMap<NodeId, Texture>,
    two_sided: bool,
) -> Result<FxHashMap<NodeId, MaterialDescriptor>> {
    let materials = library.children(&["material"]);
    if materials.is_empty() {
        return Err(DaeError::missing_element("library_materials", "material"));
    }

    let mut out = FxHashMap::default();
    for material in materials {
        let Some(id) = material.node_id() else { continue };
        let Some(mut params) = read_material(&material, textures)? else {
            continue;
        };
        params.double_sided |= two_sided;
        let descriptor = shading::shade(&params);
        log::debug!("Material {material} compiled as {}", descriptor.kind);
        out.insert(id, descriptor);
    }
    Ok(out)
}

/// Reads the parameters of one `material`; `None` when its effect cannot be
/// used.
pub fn read_material(
    material: &Node<'_>,
    textures: &FxHashMap<NodeId, Texture>,
) -> Result<Option<MaterialParams>> {
    let instance = material.child("instance_effect");
    if !instance.is_defined() {
        return Err(DaeError::missing_element("material", "instance_effect"));
    }
    let url = instance
        .attr("url")
        .ok_or_else(|| DaeError::missing_attribute("instance_effect", "url"))?;

    let effect = instance.resolve(url);
    if !effect.has_name("effect") {
        diagnostics::unresolved("instance_effect", format_args!("{url} is not an effect"));
        return Ok(None);
    }

    let profile = effect.child("profile_COMMON");
    if !profile.is_defined() {
        diagnostics::unsupported("effect", format_args!("{effect} has no profile_COMMON"));
        return Ok(None);
    }
    let technique = profile.child("technique");
    if !technique.is_defined() {
        return Err(DaeError::missing_element("profile_COMMON", "technique"));
    }

    let Some((model, shader)) = ShadingModel::PRECEDENCE
        .iter()
        .map(|&m| (m, technique.child(m.tag())))
        .find(|(_, node)| node.is_defined())
    else {
        let names: Vec<&str> = technique.iter_children().map(|c| c.name()).collect();
        diagnostics::unsupported("technique", format_args!("shading models {names:?}"));
        return Ok(None);
    };

    let mut params = MaterialParams::new(model);
    params.name = material.attr("name").map(str::to_string);

    params.emission = color(&shader, "emission");
    params.ambient = color(&shader, "ambient");
    params.diffuse = color(&shader, "diffuse");
    params.specular = color(&shader, "specular");
    params.reflective = color(&shader, "reflective");
    params.transparent = color(&shader, "transparent");

    params.shininess = scalar(&shader, "shininess");
    params.reflectivity = scalar(&shader, "reflectivity");
    params.transparency = scalar(&shader, "transparency");
    params.index_of_refraction = scalar(&shader, "index_of_refraction");

    params.emission_texture = texture(&shader, "emission", textures);
    params.ambient_texture = texture(&shader, "ambient", textures);
    params.diffuse_texture = texture(&shader, "diffuse", textures);
    params.specular_texture = texture(&shader, "specular", textures);
    params.reflective_texture = texture(&shader, "reflective", textures);
    params.transparent_texture = texture(&shader, "transparent", textures);

    params.double_sided = is_double_sided(&profile);
    Ok(Some(params))
}

fn color(shader: &Node<'_>, channel: &str) -> Option<glam::Vec4> {
    shader.child(channel).child_value("color", &COLOR)
}

fn scalar(shader: &Node<'_>, channel: &str) -> Option<f32> {
    shader.child(channel).child_value("float", &FLOAT)
}

fn texture(shader: &Node<'_>, channel: &str, textures: &FxHashMap<NodeId, Texture>) -> Option<Texture> {
    let sampler = shader.child(channel).child("texture");
    if !sampler.is_defined() {
        return None;
    }
    let image = texture_image(&sampler)?;
    let found = image.node_id().and_then(|id| textures.get(&id)).cloned();
    if found.is_none() {
        diagnostics::unresolved("texture", format_args!("{image} was not loaded"));
    }
    found
}

/// Follows `texture@texture` to the `image` it samples.
///
/// The link names either the image itself or a `sampler2D` parameter whose
/// `source` names a `surface` parameter initialized from the image.
fn texture_image<'doc>(sampler: &Node<'doc>) -> Option<Node<'doc>> {
    let link = sampler.attr("texture")?;
    let target = sampler.resolve(link);
    match target.name() {
        "image" => Some(target),
        "newparam" => {
            let surface = target
                .child("sampler2D")
                .child("source")
                .text()
                .map(|s| target.resolve(s))?;
            let image = surface
                .child("surface")
                .child("init_from")
                .text()
                .map(|s| surface.resolve(s))?;
            if image.has_name("image") {
                Some(image)
            } else {
                diagnostics::unresolved("texture", format_args!("{link} does not lead to an image"));
                None
            }
        }
        _ => {
            diagnostics::unresolved("texture", link);
            None
        }
    }
}

/// The GOOGLEEARTH `double_sided` extra.
fn is_double_sided(profile: &Node<'_>) -> bool {
    profile.child("extra").iter_children().any(|technique| {
        technique.has_name("technique")
            && technique.attr("profile").is_some_and(|p| p.contains("GOOGLEEARTH"))
            && technique.child_value("double_sided", &INT) == Some(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn sampler_chain_reaches_the_image() {
        let doc = Document::parse_str(
            r#"<COLLADA>
                <image id="wood"><init_from>wood.png</init_from></image>
                <effect id="fx"><profile_COMMON>
                    <newparam sid="surf"><surface type="2D"><init_from>wood</init_from></surface></newparam>
                    <newparam sid="samp"><sampler2D><source>surf</source></sampler2D></newparam>
                    <technique sid="common"><lambert><diffuse><texture texture="samp" texcoord="UV"/></diffuse></lambert></technique>
                </profile_COMMON></effect>
            </COLLADA>"#,
        )
        .unwrap();
        let sampler = doc.root().find_descendant("texture");
        let image = texture_image(&sampler).unwrap();
        assert_eq!(image, doc.lookup("wood"));
    }
}
