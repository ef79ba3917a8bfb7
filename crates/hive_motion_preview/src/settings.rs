// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview settings file.
//!
//! The settings file holds:
//! - The motion configuration handed to every presenter
//! - Playback options (effect, frame rate, seed, time limit, logo size)
//!
//! It is looked up as `motion.ron` in the working directory unless a path is
//! given explicitly; a missing default file falls back to built-in values.

use crate::error::PreviewError;
use hive_motion_effects::{EffectKind, LogoSize, MotionConfig, CONFIG_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Playback options of the preview host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Effect to play
    pub effect: EffectKind,
    /// Simulated frames per second
    pub fps: u32,
    /// Seed for randomized ornaments
    pub seed: u64,
    /// Stop after this many simulated seconds
    pub max_seconds: f32,
    /// Logo size preset
    #[serde(default)]
    pub logo_size: LogoSize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            effect: EffectKind::Loader,
            fps: 60,
            seed: 0,
            max_seconds: 10.0,
            logo_size: LogoSize::default(),
        }
    }
}

/// Complete settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSettings {
    /// Settings format version
    pub version: u32,
    /// Motion configuration
    #[serde(default)]
    pub motion: MotionConfig,
    /// Playback options
    #[serde(default)]
    pub playback: PlaybackSettings,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            motion: MotionConfig::default(),
            playback: PlaybackSettings::default(),
        }
    }
}

impl PreviewSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, PreviewError> {
        let content = std::fs::read_to_string(path).map_err(|source| PreviewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: PreviewSettings = ron::from_str(&content).map_err(|source| PreviewError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(PreviewError::InvalidSettings(format!(
                "settings version {} is newer than supported version {}",
                settings.version, SETTINGS_FORMAT_VERSION
            )));
        }

        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), PreviewError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content).map_err(|source| PreviewError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default settings file in `dir`
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE_NAME)
    }

    /// Load `explicit` if given, else the default file in `dir` if present, else defaults
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self, PreviewError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Self::default_path(dir);
        if fallback.is_file() {
            Self::load(&fallback)
        } else {
            tracing::debug!("No {CONFIG_FILE_NAME} in {:?}, using defaults", dir);
            Ok(Self::default())
        }
    }

    /// Check playback options
    pub fn validate(&self) -> Result<(), PreviewError> {
        let playback = &self.playback;
        if playback.fps == 0 || playback.fps > 1000 {
            return Err(PreviewError::InvalidSettings(format!(
                "fps must be in 1..=1000, got {}",
                playback.fps
            )));
        }
        if !(playback.max_seconds.is_finite() && playback.max_seconds > 0.0) {
            return Err(PreviewError::InvalidSettings(format!(
                "max_seconds must be positive, got {}",
                playback.max_seconds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = PreviewSettings::default_path(dir.path());
        let mut settings = PreviewSettings::default();
        settings.playback.effect = EffectKind::Outro;
        settings.playback.seed = 99;
        settings.motion.timing.outro = 2.8;
        settings.save(&path).unwrap();

        let loaded = PreviewSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let settings = PreviewSettings::resolve(None, dir.path()).unwrap();
        assert_eq!(settings, PreviewSettings::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let result = PreviewSettings::resolve(Some(&dir.path().join("nope.ron")), dir.path());
        assert!(matches!(result, Err(PreviewError::Io { .. })));
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.ron");
        std::fs::write(&path, "(version: 9)").unwrap();
        assert!(matches!(
            PreviewSettings::load(&path),
            Err(PreviewError::InvalidSettings(_))
        ));
        std::fs::write(&path, "(version: ").unwrap();
        assert!(matches!(PreviewSettings::load(&path), Err(PreviewError::Parse { .. })));
    }

    #[test]
    fn test_validate_playback() {
        let mut settings = PreviewSettings::default();
        assert!(settings.validate().is_ok());
        settings.playback.fps = 0;
        assert!(settings.validate().is_err());
    }
}
