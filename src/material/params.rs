use std::fmt;

use glam::Vec4;

use crate::texture::Texture;

/// The `profile_COMMON` technique of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingModel {
    Phong,
    Lambert,
    Blinn,
    Constant,
}

impl ShadingModel {
    /// Tried in this order when a technique declares several models.
    pub const PRECEDENCE: [ShadingModel; 4] = [
        ShadingModel::Phong,
        ShadingModel::Lambert,
        ShadingModel::Blinn,
        ShadingModel::Constant,
    ];

    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ShadingModel::Phong => "phong",
            ShadingModel::Lambert => "lambert",
            ShadingModel::Blinn => "blinn",
            ShadingModel::Constant => "constant",
        }
    }

    /// Whether the model reacts to scene lights.
    #[must_use]
    pub fn is_lit(self) -> bool {
        !matches!(self, ShadingModel::Constant)
    }
}

impl fmt::Display for ShadingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Every parameter a `profile_COMMON` technique can declare.
///
/// Absent parameters stay `None`; the shading functions decide the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub name: Option<String>,
    pub model: ShadingModel,

    // === Colors ===
    pub emission: Option<Vec4>,
    pub ambient: Option<Vec4>,
    pub diffuse: Option<Vec4>,
    pub specular: Option<Vec4>,
    pub reflective: Option<Vec4>,
    pub transparent: Option<Vec4>,

    // === Scalars ===
    pub shininess: Option<f32>,
    pub reflectivity: Option<f32>,
    pub transparency: Option<f32>,
    pub index_of_refraction: Option<f32>,

    // === Textures ===
    pub emission_texture: Option<Texture>,
    pub ambient_texture: Option<Texture>,
    pub diffuse_texture: Option<Texture>,
    pub specular_texture: Option<Texture>,
    pub reflective_texture: Option<Texture>,
    pub transparent_texture: Option<Texture>,

    /// Disable back-face culling.
    pub double_sided: bool,
}

impl MaterialParams {
    #[must_use]
    pub fn new(model: ShadingModel) -> Self {
        Self {
            name: None,
            model,
            emission: None,
            ambient: None,
            diffuse: None,
            specular: None,
            reflective: None,
            transparent: None,
            shininess: None,
            reflectivity: None,
            transparency: None,
            index_of_refraction: None,
            emission_texture: None,
            ambient_texture: None,
            diffuse_texture: None,
            specular_texture: None,
            reflective_texture: None,
            transparent_texture: None,
            double_sided: false,
        }
    }

    /// Average of the `transparent` color channels scaled by
    /// `transparency`; 0 unless both are declared.
    #[must_use]
    pub fn transparency_level(&self) -> f32 {
        match (self.transparent, self.transparency) {
            (Some(color), Some(factor)) => (color.x + color.y + color.z) / 3.0 * factor,
            _ => 0.0,
        }
    }
}
