// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-tick render payload.

use crate::binding::{CellId, Property};
use crate::keyframe::KeyframeValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Interpolated visual state of one element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualAttributes {
    /// Uniform scale
    pub scale: f32,
    /// Opacity
    pub opacity: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Anchor plus animated offset
    pub position: [f32; 2],
    /// Drawn fraction of the outline
    pub path_length: f32,
    /// Outline stroke width
    pub stroke_width: f32,
    /// Fill color (RGBA)
    pub fill: [f32; 4],
    /// Inner glow opacity
    pub glow_opacity: f32,
    /// Node dot scale
    pub node_scale: f32,
    /// Node dot opacity
    pub node_opacity: f32,
    /// Brightness multiplier
    pub brightness: f32,
}

impl VisualAttributes {
    /// Resting attributes at `anchor`
    pub fn at(anchor: [f32; 2]) -> Self {
        Self {
            position: anchor,
            ..Self::default()
        }
    }

    /// Fold one sampled property value into the attributes
    pub fn apply(&mut self, anchor: [f32; 2], property: Property, value: KeyframeValue) {
        match (property, value) {
            (Property::Offset, KeyframeValue::Vec2([dx, dy])) => {
                self.position = [anchor[0] + dx, anchor[1] + dy];
            }
            (Property::Fill, KeyframeValue::Color(color)) => self.fill = color,
            (property, KeyframeValue::Float(v)) => match property {
                Property::Scale => self.scale = v,
                Property::Opacity => self.opacity = v,
                Property::Rotation => self.rotation = v,
                Property::PathLength => self.path_length = v,
                Property::StrokeWidth => self.stroke_width = v,
                Property::GlowOpacity => self.glow_opacity = v,
                Property::NodeScale => self.node_scale = v,
                Property::NodeOpacity => self.node_opacity = v,
                Property::Brightness => self.brightness = v,
                Property::Offset | Property::Fill => {}
            },
            // Kinds are checked when the sequence is built
            _ => {}
        }
    }
}

impl Default for VisualAttributes {
    fn default() -> Self {
        Self {
            scale: 1.0,
            opacity: 1.0,
            rotation: 0.0,
            position: [0.0, 0.0],
            path_length: 1.0,
            stroke_width: 1.0,
            fill: [0.0, 0.0, 0.0, 0.0],
            glow_opacity: 0.0,
            node_scale: 1.0,
            node_opacity: 1.0,
            brightness: 1.0,
        }
    }
}

/// Everything the host needs to draw one sequence for one tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the sequence started
    pub elapsed: f32,
    /// Cell attributes in z-order
    pub cells: IndexMap<CellId, VisualAttributes>,
    /// Ornament attributes in declaration order
    pub ornaments: IndexMap<String, VisualAttributes>,
    /// Phase markers crossed during this tick
    pub phases: Vec<String>,
}

impl Frame {
    /// Attributes of a cell
    pub fn cell(&self, id: CellId) -> Option<&VisualAttributes> {
        self.cells.get(&id)
    }

    /// Attributes of an ornament
    pub fn ornament(&self, name: &str) -> Option<&VisualAttributes> {
        self.ornaments.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_relative_to_anchor() {
        let anchor = [-60.0, 35.0];
        let mut attrs = VisualAttributes::at(anchor);
        attrs.apply(anchor, Property::Offset, KeyframeValue::Vec2([10.0, -5.0]));
        assert_eq!(attrs.position, [-50.0, 30.0]);
    }

    #[test]
    fn test_mismatched_kind_is_ignored() {
        let mut attrs = VisualAttributes::default();
        attrs.apply([0.0, 0.0], Property::Scale, KeyframeValue::Color([1.0; 4]));
        assert_eq!(attrs.scale, 1.0);
    }

    #[test]
    fn test_frame_serializes_to_json() {
        let mut frame = Frame::default();
        frame.cells.insert(CellId(3), VisualAttributes::default());
        frame.phases.push("flicker".into());
        let json = serde_json::to_string(&frame).unwrap();
        let back: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frame);
    }
}
