//! Skeletal keyframe animation.
//!
//! Channels of `library_animations` are matched to bones by the leading
//! segment of their target (`bone/property`). Each matched channel becomes a
//! [`BoneTrack`]; the tracks of one `animation` element form an
//! [`AnimationClip`].

mod builder;
mod channel;
mod clip;
mod tracks;
mod values;

pub use builder::AnimationBuilder;
pub use channel::{ChannelKeys, ChannelTarget};
pub use clip::{AnimationClip, BoneTrack};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
