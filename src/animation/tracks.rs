use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
}

impl InterpolationMode {
    /// Maps a sampler `INTERPOLATION` name. Curves that are not supported
    /// fall back to linear.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "STEP" => InterpolationMode::Step,
            "LINEAR" => InterpolationMode::Linear,
            other => {
                log::debug!("Interpolation '{other}' sampled as LINEAR");
                InterpolationMode::Linear
            }
        }
    }
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval so that sequential playback can skip
/// the binary search.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Keys past the shorter of `times` and `values` are dropped.
    #[must_use]
    pub fn new(mut times: Vec<f32>, mut values: Vec<T>, interpolation: InterpolationMode) -> Self {
        if times.len() != values.len() {
            log::warn!(
                "Keyframe track has {} times and {} values, truncating",
                times.len(),
                values.len()
            );
            let len = times.len().min(values.len());
            times.truncate(len);
            values.truncate(len);
        }
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Number of usable keyframes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len().min(self.values.len())
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.iter().copied().fold(0.0, f32::max)
    }

    /// Value at `time`, clamped to the first and last keyframes. `None` for
    /// an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        // First index whose time is past `time`.
        let next_idx = self.times[..self.len()].partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Like [`sample`](Self::sample), scanning a few intervals around the
    /// cursor before falling back to a binary search.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        if len == 1 {
            return self.values.first().copied();
        }

        let i = cursor.last_index.min(len - 1);
        let found = if time >= self.times[i] {
            (i..len.min(i + MAX_SCAN_OFFSET + 1)).find(|&idx| idx == len - 1 || time < self.times[idx + 1])
        } else {
            (i.saturating_sub(MAX_SCAN_OFFSET)..i)
                .rev()
                .find(|&idx| time >= self.times[idx])
        };

        let index = found.unwrap_or_else(|| {
            self.times[..len]
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });
        cursor.last_index = index;
        Some(self.sample_at_frame(index, time))
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.len();
        if index + 1 >= len || time <= self.times[0] {
            let clamped = if time <= self.times[0] { 0 } else { len - 1 };
            return self.values[clamped];
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => T::interpolate_linear(self.values[index], self.values[next_idx], t),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn track(mode: InterpolationMode) -> KeyframeTrack<f32> {
        KeyframeTrack::new(vec![0.0, 1.0, 3.0], vec![0.0, 10.0, 30.0], mode)
    }

    #[test]
    fn linear_sampling_clamps() {
        let t = track(InterpolationMode::Linear);
        assert_eq!(t.sample(-1.0), Some(0.0));
        assert_eq!(t.sample(0.5), Some(5.0));
        assert_eq!(t.sample(2.0), Some(20.0));
        assert_eq!(t.sample(9.0), Some(30.0));
        assert_eq!(t.end_time(), 3.0);
    }

    #[test]
    fn step_holds_previous_key() {
        let t = track(InterpolationMode::Step);
        assert_eq!(t.sample(0.9), Some(0.0));
        assert_eq!(t.sample(1.5), Some(10.0));
    }

    #[test]
    fn cursor_agrees_with_search() {
        let t = track(InterpolationMode::Linear);
        let mut cursor = KeyframeCursor::default();
        for time in [0.0, 0.25, 1.5, 2.75, 3.5, 0.5, 2.0] {
            assert_eq!(t.sample_with_cursor(time, &mut cursor), t.sample(time));
        }
    }

    #[test]
    fn empty_track_has_no_value() {
        let t: KeyframeTrack<Vec3> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
        assert_eq!(t.sample(0.0), None);
        assert_eq!(InterpolationMode::from_name("BEZIER"), InterpolationMode::Linear);
        assert_eq!(InterpolationMode::from_name("STEP"), InterpolationMode::Step);
    }

    #[test]
    fn mismatched_keys_are_truncated() {
        let t = KeyframeTrack::new(vec![0.0, 1.0, 2.0], vec![5.0_f32], InterpolationMode::Linear);
        assert_eq!(t.len(), 1);
        assert_eq!(t.sample(1.5), Some(5.0));

        let t: KeyframeTrack<f32> = KeyframeTrack::new(vec![0.0, 1.0], vec![], InterpolationMode::Linear);
        assert!(t.is_empty());
        assert_eq!(t.sample(0.5), None);
    }

    #[test]
    fn hand_built_track_with_missing_values_samples_safely() {
        let t = KeyframeTrack {
            times: vec![0.0, 1.0, 2.0],
            values: vec![1.0_f32, 3.0],
            interpolation: InterpolationMode::Linear,
        };
        assert_eq!(t.sample(0.5), Some(2.0));
        assert_eq!(t.sample(5.0), Some(3.0));
        let mut cursor = KeyframeCursor::default();
        assert_eq!(t.sample_with_cursor(5.0, &mut cursor), Some(3.0));

        let empty = KeyframeTrack {
            times: vec![0.0, 1.0],
            values: Vec::<f32>::new(),
            interpolation: InterpolationMode::Linear,
        };
        assert_eq!(empty.sample(0.5), None);
    }
}
