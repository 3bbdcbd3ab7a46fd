//! Pure mappings from effect parameters to renderer-facing descriptors.

use glam::Vec4;

use super::params::{MaterialParams, ShadingModel};
use crate::texture::Texture;

/// Which faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Pipeline state of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialSettings {
    /// Alpha blending on.
    pub transparent: bool,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDescriptor {
    pub name: String,
    pub kind: ShadingModel,

    pub ambient: Option<Vec4>,
    pub diffuse: Vec4,
    pub specular: Option<Vec4>,
    pub emission: Option<Vec4>,

    pub ambient_map: Option<Texture>,
    pub diffuse_map: Option<Texture>,
    pub specular_map: Option<Texture>,

    pub shininess: Option<f32>,
    /// Transparency level in `[0, 1]`, 0 for opaque.
    pub transparency: f32,

    pub settings: MaterialSettings,
}

impl MaterialDescriptor {
    fn base(params: &MaterialParams) -> Self {
        Self {
            name: params.name.clone().unwrap_or_default(),
            kind: params.model,
            ambient: None,
            diffuse: Vec4::ONE,
            specular: None,
            emission: params.emission,
            ambient_map: None,
            diffuse_map: None,
            specular_map: None,
            shininess: None,
            transparency: 0.0,
            settings: MaterialSettings {
                transparent: false,
                side: if params.double_sided { Side::Double } else { Side::Front },
            },
        }
    }

    /// Unlit material used for geometry that binds none.
    #[must_use]
    pub fn default_material() -> Self {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let mut params = MaterialParams::new(ShadingModel::Constant);
        params.name = Some("default".to_string());
        params.emission = Some(red);
        constant(&params)
    }

    #[inline]
    #[must_use]
    pub fn two_sided(&self) -> bool {
        self.settings.side == Side::Double
    }

    #[inline]
    #[must_use]
    pub fn blend(&self) -> bool {
        self.settings.transparent
    }

    /// Applies a transparency level: diffuse alpha becomes `1 - level`, the
    /// diffuse color is copied into ambient and blending is enabled.
    fn apply_transparency(&mut self, level: f32) {
        if level <= 0.0 {
            return;
        }
        self.transparency = level;
        self.diffuse.w = 1.0 - level;
        self.ambient = Some(self.diffuse);
        self.settings.transparent = true;
    }
}

fn lit(params: &MaterialParams, with_specular: bool) -> MaterialDescriptor {
    let mut out = MaterialDescriptor::base(params);
    out.ambient = params.ambient;
    if let Some(diffuse) = params.diffuse {
        out.diffuse = diffuse;
    }
    out.ambient_map = params.ambient_texture.clone();
    out.diffuse_map = params.diffuse_texture.clone();
    if with_specular {
        out.specular = params.specular;
        out.specular_map = params.specular_texture.clone();
        out.shininess = params.shininess;
    }
    out.apply_transparency(params.transparency_level());
    out
}

#[must_use]
pub fn phong(params: &MaterialParams) -> MaterialDescriptor {
    lit(params, true)
}

/// Diffuse only; specular parameters are ignored.
#[must_use]
pub fn lambert(params: &MaterialParams) -> MaterialDescriptor {
    lit(params, false)
}

#[must_use]
pub fn blinn(params: &MaterialParams) -> MaterialDescriptor {
    lit(params, true)
}

/// The emission color stands in for ambient, diffuse and specular.
#[must_use]
pub fn constant(params: &MaterialParams) -> MaterialDescriptor {
    let mut out = MaterialDescriptor::base(params);
    if let Some(emission) = params.emission {
        out.ambient = Some(emission);
        out.diffuse = emission;
        out.specular = Some(emission);
    }
    out.apply_transparency(params.transparency_level());
    out
}

/// Dispatches on `params.model`.
#[must_use]
pub fn shade(params: &MaterialParams) -> MaterialDescriptor {
    match params.model {
        ShadingModel::Phong => phong(params),
        ShadingModel::Lambert => lambert(params),
        ShadingModel::Blinn => blinn(params),
        ShadingModel::Constant => constant(params),
    }
}
