//! Interpolation of gap values towards their new targets.

use super::GapValues;

/// Easing curve applied to a gap transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapEasing {
    /// Constant speed
    #[default]
    Linear,
    /// Cubic acceleration from rest
    EaseIn,
    /// Cubic deceleration into rest
    EaseOut,
    /// Cubic acceleration and deceleration
    EaseInOut,
}

impl GapEasing {
    /// Map linear progress in `[0, 1]` through this curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            GapEasing::Linear => t,
            GapEasing::EaseIn => t * t * t,
            GapEasing::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            GapEasing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// An in-flight transition of one output's six gap values.
///
/// A newer target replaces the record outright; transitions are never
/// queued.
#[derive(Debug, Clone)]
pub(super) struct GapAnimation {
    start_time: u32,
    duration: u32,
    start: [i32; 6],
    target: [i32; 6],
    easing: GapEasing,
}

impl GapAnimation {
    pub fn new(
        start: GapValues,
        target: GapValues,
        start_time: u32,
        duration: u32,
        easing: GapEasing,
    ) -> GapAnimation {
        GapAnimation {
            start_time,
            duration,
            start: start.to_array(),
            target: target.to_array(),
            easing,
        }
    }

    pub fn target(&self) -> GapValues {
        GapValues::from_array(self.target)
    }

    /// The interpolated values at `now`, and whether the transition is done
    pub fn sample(&self, now: u32) -> (GapValues, bool) {
        if self.duration == 0 {
            return (GapValues::from_array(self.target), true);
        }
        let elapsed = now.saturating_sub(self.start_time);
        let progress = (elapsed as f32 / self.duration as f32).clamp(0.0, 1.0);
        let eased = self.easing.apply(progress);

        let mut values = [0i32; 6];
        for (i, value) in values.iter_mut().enumerate() {
            let delta = (self.target[i] - self.start[i]) as f32;
            *value = self.start[i] + (delta * eased).round() as i32;
        }
        (GapValues::from_array(values), progress >= 1.0)
    }
}
