use glam::{Quat, Vec3};

use crate::animation::channel::ChannelTarget;
use crate::animation::tracks::KeyframeTrack;

/// Keyframes of one channel driving one bone.
///
/// A channel animates either the rotation or the translation of the bone,
/// so exactly one of the two tracks is set. Channels are never merged; a
/// bone animated by several channels gets several tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTrack {
    pub bone_index: usize,
    pub target: ChannelTarget,
    pub translation: Option<KeyframeTrack<Vec3>>,
    pub rotation: Option<KeyframeTrack<Quat>>,
}

impl BoneTrack {
    /// Number of keyframes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        match (&self.translation, &self.rotation) {
            (Some(track), _) => &track.times,
            (None, Some(track)) => &track.times,
            (None, None) => &[],
        }
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times().iter().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<BoneTrack>,
}

impl AnimationClip {
    /// The duration is the latest keyframe time over all tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<BoneTrack>) -> Self {
        let duration = tracks
            .iter()
            .map(BoneTrack::end_time)
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Tracks that drive `bone_index`.
    pub fn tracks_for(&self, bone_index: usize) -> impl Iterator<Item = &BoneTrack> {
        self.tracks.iter().filter(move |t| t.bone_index == bone_index)
    }
}
