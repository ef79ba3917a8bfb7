// SPDX-License-Identifier: MIT OR Apache-2.0
//! Honeycomb geometry and timeline shorthands used by the presenters.

use hive_motion_sequencer::{
    even_offsets, Cell, Easing, Frame, KeyframeValue, Result, SequenceBuilder, Timeline,
    VisualAttributes,
};

/// Full-size honeycomb: center, four diagonals, top and bottom
pub const HONEYCOMB: [(u32, [f32; 2]); 7] = [
    (0, [0.0, 0.0]),
    (1, [-60.0, -35.0]),
    (2, [60.0, -35.0]),
    (3, [-60.0, 35.0]),
    (4, [60.0, 35.0]),
    (5, [0.0, -70.0]),
    (6, [0.0, 70.0]),
];

/// Position of a cell in the full-size honeycomb
pub fn honeycomb_position(id: u32) -> [f32; 2] {
    HONEYCOMB
        .iter()
        .find(|(cell, _)| *cell == id)
        .map_or([0.0, 0.0], |(_, position)| *position)
}

/// Cells and ornaments of one effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Cells in z-order
    pub cells: Vec<Cell>,
    /// Ornament names and anchors in declaration order
    pub ornaments: Vec<(String, [f32; 2])>,
}

impl Layout {
    /// Add a cell
    pub fn cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Add an ornament
    pub fn ornament(&mut self, name: impl Into<String>, anchor: [f32; 2]) {
        self.ornaments.push((name.into(), anchor));
    }

    /// Sequence builder seeded with every element
    pub fn builder(&self, name: &str) -> SequenceBuilder {
        let mut builder = SequenceBuilder::new(name).cells(self.cells.iter().copied());
        for (ornament, anchor) in &self.ornaments {
            builder = builder.ornament(ornament.clone(), *anchor);
        }
        builder
    }

    /// Every element at rest on its anchor
    pub fn resting_frame(&self) -> Frame {
        Frame {
            elapsed: 0.0,
            cells: self
                .cells
                .iter()
                .map(|c| (c.id, VisualAttributes::at(c.position)))
                .collect(),
            ornaments: self
                .ornaments
                .iter()
                .map(|(name, anchor)| (name.clone(), VisualAttributes::at(*anchor)))
                .collect(),
            phases: Vec::new(),
        }
    }
}

/// Float keyframes evenly spaced over `duration`
pub fn floats(duration: f32, values: &[f32], easing: Easing) -> Result<Timeline> {
    Timeline::from_values(duration, values, easing)
}

/// Float keyframes at explicit offsets
pub fn floats_at(duration: f32, values: &[f32], times: &[f32], easing: Easing) -> Result<Timeline> {
    let values: Vec<KeyframeValue> = values.iter().map(|v| KeyframeValue::Float(*v)).collect();
    Timeline::from_times(duration, &values, times, easing)
}

/// Offset keyframes evenly spaced over `duration`
pub fn offsets(duration: f32, points: &[[f32; 2]], easing: Easing) -> Result<Timeline> {
    let values: Vec<KeyframeValue> = points.iter().map(|p| KeyframeValue::Vec2(*p)).collect();
    Timeline::from_times(duration, &values, &even_offsets(values.len()), easing)
}

/// One color at varying alpha, evenly spaced over `duration`
pub fn tinted(duration: f32, color: [f32; 4], alphas: &[f32], easing: Easing) -> Result<Timeline> {
    let values: Vec<KeyframeValue> = alphas
        .iter()
        .map(|a| KeyframeValue::Color([color[0], color[1], color[2], *a]))
        .collect();
    Timeline::from_times(duration, &values, &even_offsets(values.len()), easing)
}
