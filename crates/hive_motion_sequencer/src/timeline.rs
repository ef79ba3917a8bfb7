// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timelines.
//!
//! A [`Timeline`] describes how one value evolves over time. Evaluation is a
//! pure function of the definition and the elapsed time.

use crate::error::{MotionError, Result};
use crate::keyframe::{Easing, Keyframe, KeyframeValue};
use serde::{Deserialize, Serialize};

/// How many times a timeline plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Repeat {
    /// Play this many times, then hold the last value
    Count(u32),
    /// Loop forever
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(1)
    }
}

/// A keyframed value over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimelineDef")]
pub struct Timeline {
    /// Length of one iteration in seconds
    duration: f32,
    /// Keyframes ordered by offset
    keyframes: Vec<Keyframe>,
    /// Repeat mode
    repeat: Repeat,
    /// Hold time before the first iteration starts
    delay: f32,
}

/// Unchecked wire form; loading goes through [`Timeline::validate`]
#[derive(Deserialize)]
struct TimelineDef {
    duration: f32,
    keyframes: Vec<Keyframe>,
    #[serde(default)]
    repeat: Repeat,
    #[serde(default)]
    delay: f32,
}

impl TryFrom<TimelineDef> for Timeline {
    type Error = MotionError;

    fn try_from(def: TimelineDef) -> Result<Self> {
        let timeline = Self {
            duration: def.duration,
            keyframes: def.keyframes,
            repeat: def.repeat,
            delay: def.delay,
        };
        timeline.validate()?;
        Ok(timeline)
    }
}

impl Timeline {
    /// Create a timeline playing once with no delay
    pub fn new(duration: f32, keyframes: Vec<Keyframe>) -> Result<Self> {
        let timeline = Self {
            duration,
            keyframes,
            repeat: Repeat::default(),
            delay: 0.0,
        };
        timeline.validate()?;
        Ok(timeline)
    }

    /// Two-keyframe float tween
    pub fn tween(duration: f32, from: f32, to: f32, easing: Easing) -> Result<Self> {
        Self::from_values(duration, &[from, to], easing)
    }

    /// Evenly spaced float keyframes, like an animate-to array
    pub fn from_values(duration: f32, values: &[f32], easing: Easing) -> Result<Self> {
        let values: Vec<KeyframeValue> = values.iter().map(|v| KeyframeValue::Float(*v)).collect();
        let times = even_offsets(values.len());
        Self::from_times(duration, &values, &times, easing)
    }

    /// Keyframes at explicit offsets, all sharing one easing
    pub fn from_times(
        duration: f32,
        values: &[KeyframeValue],
        times: &[f32],
        easing: Easing,
    ) -> Result<Self> {
        if values.len() != times.len() {
            return Err(MotionError::InvalidTimeline(format!(
                "{} values but {} offsets",
                values.len(),
                times.len()
            )));
        }
        let keyframes = values
            .iter()
            .zip(times)
            .map(|(value, offset)| Keyframe::new(*offset, *value).with_easing(easing))
            .collect();
        Self::new(duration, keyframes)
    }

    /// Set the start delay
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Set the repeat mode
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Check the definition, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(MotionError::InvalidTimeline(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(MotionError::InvalidTimeline(format!(
                "delay must be non-negative, got {}",
                self.delay
            )));
        }
        if self.repeat == Repeat::Count(0) {
            return Err(MotionError::InvalidTimeline("repeat count must be at least 1".into()));
        }
        let Some(first) = self.keyframes.first() else {
            return Err(MotionError::InvalidTimeline("no keyframes".into()));
        };

        let kind = first.value.kind();
        let mut previous = 0.0_f32;
        for (index, keyframe) in self.keyframes.iter().enumerate() {
            if !(0.0..=1.0).contains(&keyframe.offset) {
                return Err(MotionError::InvalidTimeline(format!(
                    "keyframe {index} offset {} outside [0, 1]",
                    keyframe.offset
                )));
            }
            if keyframe.offset < previous {
                return Err(MotionError::InvalidTimeline(format!(
                    "keyframe {index} offset {} precedes {previous}",
                    keyframe.offset
                )));
            }
            if keyframe.value.kind() != kind {
                return Err(MotionError::InvalidTimeline(format!(
                    "keyframe {index} is {:?}, expected {kind:?}",
                    keyframe.value.kind()
                )));
            }
            previous = keyframe.offset;
        }
        Ok(())
    }

    /// Evaluate the timeline at `time` seconds after it was started
    pub fn value_at(&self, time: f32) -> KeyframeValue {
        let local = time - self.delay;
        if !(local > 0.0) {
            return self.first_value();
        }

        let phase = match self.repeat {
            Repeat::Count(count) => {
                if local >= self.duration * count as f32 {
                    return self.last_value();
                }
                local % self.duration
            }
            Repeat::Infinite => local % self.duration,
        };

        self.sample(phase / self.duration)
    }

    /// Evaluate one iteration at `progress` in `[0, 1]`
    fn sample(&self, progress: f32) -> KeyframeValue {
        // First keyframe strictly after progress; its predecessor is the
        // last declared keyframe at or before it.
        let next_idx = self.keyframes.iter().position(|k| k.offset > progress);

        match next_idx {
            None => self.last_value(),
            Some(0) => self.first_value(),
            Some(idx) => {
                let a = &self.keyframes[idx - 1];
                let b = &self.keyframes[idx];
                let t = (progress - a.offset) / (b.offset - a.offset);
                a.value.interpolate(&b.value, a.easing.apply(t))
            }
        }
    }

    /// Value held before the timeline starts
    pub fn first_value(&self) -> KeyframeValue {
        self.keyframes[0].value
    }

    /// Value held after the timeline ends
    pub fn last_value(&self) -> KeyframeValue {
        self.keyframes[self.keyframes.len() - 1].value
    }

    /// Time at which the last iteration ends, infinite for looping timelines
    pub fn end_time(&self) -> f32 {
        match self.repeat {
            Repeat::Count(count) => self.delay + self.duration * count as f32,
            Repeat::Infinite => f32::INFINITY,
        }
    }

    /// Whether the timeline has reached its final value at `time`
    pub fn is_finished(&self, time: f32) -> bool {
        time >= self.end_time()
    }

    /// Whether this timeline loops forever
    pub fn is_infinite(&self) -> bool {
        self.repeat == Repeat::Infinite
    }

    /// Stretch duration and delay by a positive time factor
    pub fn scaled(mut self, factor: f32) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(MotionError::InvalidTimeline(format!(
                "time factor must be positive, got {factor}"
            )));
        }
        self.duration *= factor;
        self.delay *= factor;
        self.validate()?;
        Ok(self)
    }

    /// Length of one iteration
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Start delay
    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Repeat mode
    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }
}

/// Offsets `0, 1/(n-1), ..., 1` for `n` values
pub fn even_offsets(count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n).map(|i| i as f32 / (n - 1) as f32).collect(),
    }
}
