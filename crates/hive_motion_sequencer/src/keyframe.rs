// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions and easing curves.

use serde::{Deserialize, Serialize};

/// Easing curve shaping the segment from one keyframe to the next
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Easing {
    /// Hold the segment's start value until the next keyframe
    Step,
    /// Constant speed
    Linear,
    /// Slow start (cubic-bezier 0.42, 0, 1, 1)
    EaseIn,
    /// Slow end (cubic-bezier 0, 0, 0.58, 1)
    EaseOut,
    /// Slow start and end (cubic-bezier 0.42, 0, 0.58, 1)
    #[default]
    EaseInOut,
    /// CSS-style cubic bezier with control points (x1, y1, x2, y2)
    CubicBezier([f32; 4]),
}

impl Easing {
    /// The site-wide standard curve, `cubic-bezier(0.4, 0, 0.2, 1)`
    pub const STANDARD: Easing = Easing::CubicBezier([0.4, 0.0, 0.2, 1.0]);

    /// Map a linear progress in `[0, 1]` onto the curve
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Step => 0.0,
            Easing::Linear => t,
            Easing::EaseIn => Interpolation::cubic_bezier_easing([0.42, 0.0, 1.0, 1.0], t),
            Easing::EaseOut => Interpolation::cubic_bezier_easing([0.0, 0.0, 0.58, 1.0], t),
            Easing::EaseInOut => Interpolation::cubic_bezier_easing([0.42, 0.0, 0.58, 1.0], t),
            Easing::CubicBezier(points) => Interpolation::cubic_bezier_easing(*points, t),
        }
    }
}

/// Kind of value a keyframe carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Single float
    Float,
    /// 2D vector
    Vec2,
    /// RGBA color
    Color,
}

/// Value stored in a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeyframeValue {
    /// Float value (scale, opacity, rotation in degrees, ...)
    Float(f32),
    /// 2D vector (position offsets)
    Vec2([f32; 2]),
    /// Color (RGBA, components in `[0, 1]`)
    Color([f32; 4]),
}

/// A keyframe in a timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position as a fraction of the timeline duration, in `[0, 1]`
    pub offset: f32,
    /// Value at this keyframe
    pub value: KeyframeValue,
    /// Easing toward the next keyframe
    pub easing: Easing,
}

impl Keyframe {
    /// Create a new keyframe with the default easing
    pub fn new(offset: f32, value: KeyframeValue) -> Self {
        Self {
            offset,
            value,
            easing: Easing::default(),
        }
    }

    /// Create a float keyframe
    pub fn float(offset: f32, value: f32) -> Self {
        Self::new(offset, KeyframeValue::Float(value))
    }

    /// Set easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Cubic bezier interpolation
    pub fn bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
    }

    /// Derivative of a cubic bezier with fixed endpoints 0 and 1
    fn bezier_slope(p1: f32, p2: f32, t: f32) -> f32 {
        let mt = 1.0 - t;
        3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Evaluate a CSS `cubic-bezier(x1, y1, x2, y2)` timing function at progress `x`
    pub fn cubic_bezier_easing(points: [f32; 4], x: f32) -> f32 {
        let [x1, y1, x2, y2] = points;
        if x <= 0.0 || x >= 1.0 {
            return x.clamp(0.0, 1.0);
        }

        // Newton-Raphson on the x curve, bisection if the slope flattens out
        let mut s = x;
        for _ in 0..8 {
            let error = Self::bezier(0.0, x1, x2, 1.0, s) - x;
            if error.abs() < 1e-6 {
                return Self::bezier(0.0, y1, y2, 1.0, s);
            }
            let slope = Self::bezier_slope(x1, x2, s);
            if slope.abs() < 1e-6 {
                break;
            }
            s = (s - error / slope).clamp(0.0, 1.0);
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        s = x;
        for _ in 0..32 {
            let current = Self::bezier(0.0, x1, x2, 1.0, s);
            if (current - x).abs() < 1e-6 {
                break;
            }
            if current < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) * 0.5;
        }
        Self::bezier(0.0, y1, y2, 1.0, s)
    }

    /// Interpolate Vec2
    pub fn lerp_vec2(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
        [Self::lerp(a[0], b[0], t), Self::lerp(a[1], b[1], t)]
    }

    /// Interpolate Vec4
    pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
        [
            Self::lerp(a[0], b[0], t),
            Self::lerp(a[1], b[1], t),
            Self::lerp(a[2], b[2], t),
            Self::lerp(a[3], b[3], t),
        ]
    }
}

impl KeyframeValue {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            KeyframeValue::Float(_) => ValueKind::Float,
            KeyframeValue::Vec2(_) => ValueKind::Vec2,
            KeyframeValue::Color(_) => ValueKind::Color,
        }
    }

    /// Interpolate toward `other` at an already eased position `t`.
    ///
    /// Mismatched kinds hold `self`; timelines reject them at construction.
    pub fn interpolate(&self, other: &KeyframeValue, t: f32) -> KeyframeValue {
        match (self, other) {
            (KeyframeValue::Float(a), KeyframeValue::Float(b)) => {
                KeyframeValue::Float(Interpolation::lerp(*a, *b, t))
            }
            (KeyframeValue::Vec2(a), KeyframeValue::Vec2(b)) => {
                KeyframeValue::Vec2(Interpolation::lerp_vec2(*a, *b, t))
            }
            (KeyframeValue::Color(a), KeyframeValue::Color(b)) => {
                KeyframeValue::Color(Interpolation::lerp_vec4(*a, *b, t))
            }
            _ => *self,
        }
    }

    /// Get as float if possible
    pub fn as_float(&self) -> Option<f32> {
        match self {
            KeyframeValue::Float(v) => Some(*v),
            _ => None,
        }
    }


}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_and_step() {
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
        assert_eq!(Easing::Step.apply(0.99), 0.0);
        assert_eq!(Easing::Linear.apply(1.5), 1.0);
    }

    #[test]
    fn test_standard_curve_endpoints_and_shape() {
        let ease = Easing::STANDARD;
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        // Fast out, slow in: ahead of linear at the midpoint
        assert!(ease.apply(0.5) > 0.5);
    }

    #[test]
    fn test_bezier_easing_is_monotonic() {
        for easing in [Easing::EaseIn, Easing::EaseOut, Easing::EaseInOut, Easing::STANDARD] {
            let mut last = 0.0;
            for i in 0..=100 {
                let v = easing.apply(i as f32 / 100.0);
                assert!(v + 1e-4 >= last, "{easing:?} not monotonic at {i}");
                last = v;
            }
        }
    }

    #[test]
    fn test_ease_in_out_symmetric_midpoint() {
        let mid = Easing::EaseInOut.apply(0.5);
        assert!((mid - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_value_interpolation() {
        let a = KeyframeValue::Color([0.0, 0.0, 0.0, 1.0]);
        let b = KeyframeValue::Color([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(a.interpolate(&b, 0.5), KeyframeValue::Color([0.5, 0.25, 0.0, 1.0]));

        let mismatched = KeyframeValue::Float(2.0).interpolate(&KeyframeValue::Vec2([1.0, 1.0]), 0.5);
        assert_eq!(mismatched, KeyframeValue::Float(2.0));
    }
}
