// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised while building or driving sequences.

use crate::director::{EffectKey, SequenceHandle};

/// Errors from the motion core
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    /// Keyframes or timing of a timeline are malformed
    #[error("Invalid timeline: {0}")]
    InvalidTimeline(String),

    /// Cells, ornaments or tracks of a sequence are malformed
    #[error("Invalid sequence config: {0}")]
    InvalidSequenceConfig(String),

    /// A completion signal was asked to fire a second time
    #[error("Completion fired twice for {0:?}")]
    DoubleCompletion(SequenceHandle),

    /// Handle was never issued by this director
    #[error("Unknown sequence handle: {0:?}")]
    UnknownHandle(SequenceHandle),

    /// No interaction presenter is attached under this key
    #[error("No interactive effect attached for {0}")]
    UnknownEffect(EffectKey),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
