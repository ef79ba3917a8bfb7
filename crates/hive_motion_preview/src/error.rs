// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview host errors.

use hive_motion_sequencer::MotionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the preview
#[derive(Debug, Error)]
pub enum PreviewError {
    /// Settings file could not be read or written
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Settings file is not valid RON
    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: ron::error::SpannedError,
    },

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// A frame could not be written
    #[error("Failed to write frame: {0}")]
    Output(#[from] std::io::Error),

    /// A frame could not be encoded
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// Motion core rejected an operation
    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),

    /// Settings or flags are out of range
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
