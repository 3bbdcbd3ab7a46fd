use std::fmt;

use glam::{Quat, Vec3};

use crate::errors::{DaeError, Result};

/// The animated property named by a channel target (the part after `/`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTarget {
    RotateXAngle,
    RotateYAngle,
    RotateZAngle,
    Translate,
}

/// Decoded sampler output of one channel, one entry per keyframe.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelKeys {
    Rotation(Vec<Quat>),
    Translation(Vec<Vec3>),
}

impl ChannelKeys {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ChannelKeys::Rotation(keys) => keys.len(),
            ChannelKeys::Translation(keys) => keys.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChannelTarget {
    /// Parses a full `node/property` target or a bare property name.
    pub fn from_target(target: &str) -> Result<Self> {
        let property = target.split_once('/').map_or(target, |(_, p)| p);
        match property {
            "rotateX.ANGLE" => Ok(ChannelTarget::RotateXAngle),
            "rotateY.ANGLE" => Ok(ChannelTarget::RotateYAngle),
            "rotateZ.ANGLE" => Ok(ChannelTarget::RotateZAngle),
            "translate" => Ok(ChannelTarget::Translate),
            _ => Err(DaeError::UnknownChannelTarget(target.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelTarget::RotateXAngle => "rotateX.ANGLE",
            ChannelTarget::RotateYAngle => "rotateY.ANGLE",
            ChannelTarget::RotateZAngle => "rotateZ.ANGLE",
            ChannelTarget::Translate => "translate",
        }
    }

    /// Number of output floats per keyframe.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            ChannelTarget::Translate => 3,
            _ => 1,
        }
    }

    /// Turns sampler output into one value per keyframe. Angles are in
    /// degrees.
    pub fn decode(self, output: &[f32]) -> Result<ChannelKeys> {
        if output.len() % self.arity() != 0 {
            return Err(DaeError::invalid(
                "sampler",
                format!(
                    "{} output values do not split into {} keys",
                    output.len(),
                    self.as_str()
                ),
            ));
        }
        let rotation = |axis: fn(f32) -> Quat| {
            ChannelKeys::Rotation(output.iter().map(|deg| axis(deg.to_radians())).collect())
        };
        let keys = match self {
            ChannelTarget::RotateXAngle => rotation(Quat::from_rotation_x),
            ChannelTarget::RotateYAngle => rotation(Quat::from_rotation_y),
            ChannelTarget::RotateZAngle => rotation(Quat::from_rotation_z),
            ChannelTarget::Translate => ChannelKeys::Translation(
                output
                    .chunks_exact(3)
                    .map(|c| Vec3::new(c[0], c[1], c[2]))
                    .collect(),
            ),
        };
        Ok(keys)
    }
}

impl fmt::Display for ChannelTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
