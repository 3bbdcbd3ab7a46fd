use std::fmt;

use crate::value::ValueTransform;

/// Input semantics of COLLADA 1.4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Semantic {
    Binormal,
    Color,
    Continuity,
    Image,
    Input,
    InTangent,
    Interpolation,
    InvBindMatrix,
    Joint,
    LinearSteps,
    MorphTarget,
    MorphWeight,
    Normal,
    Output,
    OutTangent,
    Position,
    Tangent,
    TexBinormal,
    TexCoord,
    TexTangent,
    Uv,
    Vertex,
    Weight,
}

impl Semantic {
    pub const ALL: [Semantic; 23] = [
        Semantic::Binormal,
        Semantic::Color,
        Semantic::Continuity,
        Semantic::Image,
        Semantic::Input,
        Semantic::InTangent,
        Semantic::Interpolation,
        Semantic::InvBindMatrix,
        Semantic::Joint,
        Semantic::LinearSteps,
        Semantic::MorphTarget,
        Semantic::MorphWeight,
        Semantic::Normal,
        Semantic::Output,
        Semantic::OutTangent,
        Semantic::Position,
        Semantic::Tangent,
        Semantic::TexBinormal,
        Semantic::TexCoord,
        Semantic::TexTangent,
        Semantic::Uv,
        Semantic::Vertex,
        Semantic::Weight,
    ];

    /// The attribute value as written in documents.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Semantic::Binormal => "BINORMAL",
            Semantic::Color => "COLOR",
            Semantic::Continuity => "CONTINUITY",
            Semantic::Image => "IMAGE",
            Semantic::Input => "INPUT",
            Semantic::InTangent => "IN_TANGENT",
            Semantic::Interpolation => "INTERPOLATION",
            Semantic::InvBindMatrix => "INV_BIND_MATRIX",
            Semantic::Joint => "JOINT",
            Semantic::LinearSteps => "LINEAR_STEPS",
            Semantic::MorphTarget => "MORPH_TARGET",
            Semantic::MorphWeight => "MORPH_WEIGHT",
            Semantic::Normal => "NORMAL",
            Semantic::Output => "OUTPUT",
            Semantic::OutTangent => "OUT_TANGENT",
            Semantic::Position => "POSITION",
            Semantic::Tangent => "TANGENT",
            Semantic::TexBinormal => "TEXBINORMAL",
            Semantic::TexCoord => "TEXCOORD",
            Semantic::TexTangent => "TEXTANGENT",
            Semantic::Uv => "UV",
            Semantic::Vertex => "VERTEX",
            Semantic::Weight => "WEIGHT",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes the `semantic` attribute of an `input` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticDecoder;

impl ValueTransform<str, Semantic> for SemanticDecoder {
    fn transform(&self, input: &str) -> Option<Semantic> {
        Semantic::from_name(input.trim())
    }
}

pub const SEMANTIC: SemanticDecoder = SemanticDecoder;
