use super::channel::{ChannelKeys, ChannelTarget};
use super::clip::{AnimationClip, BoneTrack};
use super::tracks::{InterpolationMode, KeyframeTrack};
use crate::document::Node;
use crate::errors::{DaeError, Result};
use crate::geometry::SourceCache;
use crate::skin::Skeleton;

/// Builds skeletal clips out of `library_animations`.
pub struct AnimationBuilder<'a, 'doc> {
    library: Node<'doc>,
    cache: &'a mut SourceCache,
}

impl<'a, 'doc> AnimationBuilder<'a, 'doc> {
    /// `library` may be undefined, in which case no clips are built.
    pub fn new(library: Node<'doc>, cache: &'a mut SourceCache) -> Self {
        Self { library, cache }
    }

    /// Every `animation` element, nested ones included, in document order.
    #[must_use]
    pub fn animations(&self) -> Vec<Node<'doc>> {
        let mut out = Vec::new();
        let mut stack: Vec<Node<'doc>> = self.library.children(&["animation"]);
        stack.reverse();
        while let Some(animation) = stack.pop() {
            out.push(animation);
            let mut nested = animation.children(&["animation"]);
            nested.reverse();
            stack.extend(nested);
        }
        out
    }

    /// One clip per animation element that drives at least one bone of
    /// `skeleton`.
    pub fn build(&mut self, skeleton: &Skeleton) -> Result<Vec<AnimationClip>> {
        let mut clips = Vec::new();
        for animation in self.animations() {
            let mut tracks = Vec::new();
            let mut first_target = None;

            for channel in animation.children(&["channel"]) {
                let Some(target) = channel.attr("target") else {
                    return Err(DaeError::missing_attribute("channel", "target"));
                };
                let Some((bone_name, _)) = target.split_once('/') else {
                    log::debug!("Channel target '{target}' names no bone, skipped");
                    continue;
                };
                let Some(bone_index) = skeleton.bone_index(bone_name) else {
                    continue;
                };
                first_target.get_or_insert(target);
                tracks.push(self.bone_track(&channel, target, bone_index)?);
            }

            if tracks.is_empty() {
                continue;
            }
            let name = animation
                .element_id()
                .or(first_target)
                .unwrap_or_default()
                .to_string();
            let clip = AnimationClip::new(name, tracks);
            log::debug!(
                "Animation '{}': {} tracks, {:.3}s",
                clip.name,
                clip.tracks.len(),
                clip.duration
            );
            clips.push(clip);
        }
        Ok(clips)
    }

    fn bone_track(&mut self, channel: &Node<'doc>, target: &str, bone_index: usize) -> Result<BoneTrack> {
        let sampler = channel.linked_source();
        if !sampler.is_defined() {
            return Err(DaeError::unresolved("channel", channel.attr("source").unwrap_or_default()));
        }
        if !sampler.has_name("sampler") {
            return Err(DaeError::UnexpectedElement {
                expected: "sampler".to_string(),
                found: sampler.name().to_string(),
            });
        }

        let channel_target = ChannelTarget::from_target(target)?;
        let times = self.sampler_floats(&sampler, "INPUT")?;
        let output = self.sampler_floats(&sampler, "OUTPUT")?;
        let interpolation = self.interpolation(&sampler)?;

        let keys = channel_target.decode(&output)?;
        if keys.len() != times.len() {
            return Err(DaeError::length_mismatch(
                format!("channel '{target}' keyframes"),
                times.len(),
                keys.len(),
            ));
        }

        let mut track = BoneTrack {
            bone_index,
            target: channel_target,
            translation: None,
            rotation: None,
        };
        match keys {
            ChannelKeys::Translation(values) => {
                track.translation = Some(KeyframeTrack::new(times, values, interpolation));
            }
            ChannelKeys::Rotation(values) => {
                track.rotation = Some(KeyframeTrack::new(times, values, interpolation));
            }
        }
        Ok(track)
    }

    fn sampler_floats(&mut self, sampler: &Node<'doc>, semantic: &str) -> Result<Vec<f32>> {
        let input = sampler.child_with("input", "semantic", semantic);
        if !input.is_defined() {
            return Err(DaeError::missing_element("sampler", &format!("input[{semantic}]")));
        }
        let source = input.linked_source();
        if !source.is_defined() {
            return Err(DaeError::unresolved("input", input.attr("source").unwrap_or_default()));
        }
        let buffer = self.cache.get_or_parse(&source)?;
        buffer
            .floats()
            .map(<[f32]>::to_vec)
            .ok_or_else(|| DaeError::missing_element(source.name(), "float_array"))
    }

    fn interpolation(&mut self, sampler: &Node<'doc>) -> Result<InterpolationMode> {
        let source = sampler
            .child_with("input", "semantic", "INTERPOLATION")
            .linked_source();
        if !source.is_defined() {
            return Ok(InterpolationMode::Linear);
        }
        let buffer = self.cache.get_or_parse(&source)?;
        Ok(buffer
            .names()
            .and_then(|names| names.first())
            .map_or(InterpolationMode::Linear, |name| InterpolationMode::from_name(name)))
    }
}
