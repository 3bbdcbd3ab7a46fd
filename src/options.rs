//! Loader Options
//!
//! [`LoadOptions`] collects the switches that change how a document is
//! compiled. The defaults compile a document as written.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use myth_dae::{ColladaLoader, LoadOptions};
//!
//! // Builder style
//! let options = LoadOptions::default()
//!     .with_two_sided(true)
//!     .with_texture_base("assets/textures");
//!
//! // Or from a JSON config file
//! let options = LoadOptions::from_json(r#"{ "ignore_lights": true }"#)?;
//!
//! let scene = ColladaLoader::new(options).load_file("scene.dae")?;
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{DaeError, Result};

/// Compilation switches for a single load.
///
/// Every field has a default, so a config file only needs to name the
/// switches it changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    // === Geometry ===
    /// Generate tangent and binormal buffers for textured meshes that do not
    /// declare them.
    pub auto_bump: bool,

    // === Materials ===
    /// Disable back-face culling on every material.
    pub two_sided: bool,

    // === Scene ===
    /// Treat the document unit as 1 meter regardless of `asset/unit`.
    pub ignore_measuring_unit: bool,

    /// Skip `instance_light` elements.
    pub ignore_lights: bool,

    // === Textures ===
    /// Extra folders searched (in order) for images that cannot be found next
    /// to the document.
    pub texture_bases: Vec<PathBuf>,
}

impl LoadOptions {
    /// Parses options from a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DaeError::invalid("options", e.to_string()))
    }

    #[must_use]
    pub fn with_auto_bump(mut self, enabled: bool) -> Self {
        self.auto_bump = enabled;
        self
    }

    #[must_use]
    pub fn with_two_sided(mut self, enabled: bool) -> Self {
        self.two_sided = enabled;
        self
    }

    #[must_use]
    pub fn with_ignore_measuring_unit(mut self, enabled: bool) -> Self {
        self.ignore_measuring_unit = enabled;
        self
    }

    #[must_use]
    pub fn with_ignore_lights(mut self, enabled: bool) -> Self {
        self.ignore_lights = enabled;
        self
    }

    #[must_use]
    pub fn with_texture_base(mut self, base: impl AsRef<Path>) -> Self {
        self.texture_bases.push(base.as_ref().to_path_buf());
        self
    }
}
