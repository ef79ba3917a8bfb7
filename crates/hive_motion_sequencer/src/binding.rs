// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding of timelines to cells and ornaments.

use crate::keyframe::ValueKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell identifier, unique within a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell{}", self.0)
    }
}

/// Visual attribute driven by a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    /// Uniform scale
    Scale,
    /// Opacity in `[0, 1]`
    Opacity,
    /// Rotation in degrees
    Rotation,
    /// Translation from the anchor
    Offset,
    /// Drawn fraction of the outline stroke
    PathLength,
    /// Outline stroke width
    StrokeWidth,
    /// Fill color
    Fill,
    /// Opacity of the inner glow layer
    GlowOpacity,
    /// Scale of the connecting node dot
    NodeScale,
    /// Opacity of the connecting node dot
    NodeOpacity,
    /// Brightness multiplier (flicker)
    Brightness,
}

impl Property {
    /// Value kind this property accepts
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Offset => ValueKind::Vec2,
            Self::Fill => ValueKind::Color,
            _ => ValueKind::Float,
        }
    }
}

/// What a track animates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A honeycomb cell
    Cell(CellId),
    /// A named ornament (text, ring, particle, overlay)
    Ornament(String),
}

impl Target {
    /// Create an ornament target
    pub fn ornament(name: impl Into<String>) -> Self {
        Self::Ornament(name.into())
    }
}

impl From<CellId> for Target {
    fn from(id: CellId) -> Self {
        Self::Cell(id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell(id) => write!(f, "{id}"),
            Self::Ornament(name) => f.write_str(name),
        }
    }
}

/// Binding of a track to one property of one target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// Animated element
    pub target: Target,
    /// Animated attribute
    pub property: Property,
}

impl Binding {
    /// Bind to a cell property
    pub fn cell(id: CellId, property: Property) -> Self {
        Self {
            target: Target::Cell(id),
            property,
        }
    }

    /// Bind to an ornament property
    pub fn ornament(name: impl Into<String>, property: Property) -> Self {
        Self {
            target: Target::ornament(name),
            property,
        }
    }
}
