// SPDX-License-Identifier: MIT OR Apache-2.0
//! Motion configuration shared by every presenter.
//!
//! This module holds the site-wide animation constants:
//! - Colors (primary glow, background gradient)
//! - Per-effect timing (loader, hover, outro, page loader)
//! - The standard easing curve
//!
//! Presenters author their timelines against the base timings and stretch
//! them by `configured / base`.

use hive_motion_sequencer::{EffectKey, Easing, MotionError, Result};
use serde::{Deserialize, Serialize};

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Config file name looked up by hosts
pub const CONFIG_FILE_NAME: &str = "motion.ron";

/// The site effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Page-load intro
    Loader,
    /// Hover logo
    Logo,
    /// Page-exit sequence
    Outro,
    /// App-wide loading overlay with progress bar
    PageLoader,
}

impl EffectKind {
    /// Get display name for this effect
    pub fn display_name(&self) -> &'static str {
        match self {
            EffectKind::Loader => "Loader",
            EffectKind::Logo => "Logo",
            EffectKind::Outro => "Outro",
            EffectKind::PageLoader => "Page loader",
        }
    }

    /// Director key the effect plays under
    pub fn key(&self) -> EffectKey {
        EffectKey::new(match self {
            EffectKind::Loader => "loader",
            EffectKind::Logo => "logo",
            EffectKind::Outro => "outro",
            EffectKind::PageLoader => "page-loader",
        })
    }

    /// Duration the effect is authored against, in seconds
    pub fn base_duration(&self) -> f32 {
        match self {
            EffectKind::Loader => 1.8,
            EffectKind::Logo => 0.5,
            EffectKind::Outro => 1.4,
            EffectKind::PageLoader => 2.0,
        }
    }

    /// Get all effects
    pub fn all() -> &'static [EffectKind] {
        &[
            EffectKind::Loader,
            EffectKind::Logo,
            EffectKind::Outro,
            EffectKind::PageLoader,
        ]
    }
}

/// Page background gradient stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundGradient {
    /// First stop
    pub from: String,
    /// Middle stop
    pub via: String,
    /// Last stop
    pub to: String,
}

impl Default for BackgroundGradient {
    fn default() -> Self {
        Self {
            from: "#0b0f1a".to_string(),
            via: "#111827".to_string(),
            to: "#0b0f1a".to_string(),
        }
    }
}

/// Color settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Orange glow used for fills, strokes and particles
    pub primary: String,
    /// Page background
    #[serde(default)]
    pub background: BackgroundGradient,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            primary: "#ff8c00".to_string(),
            background: BackgroundGradient::default(),
        }
    }
}

/// Effect durations in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Loader total
    pub loader: f32,
    /// Hover transition
    pub hover: f32,
    /// Outro total
    pub outro: f32,
    /// Page loader time until it hides
    #[serde(default = "default_page_loader")]
    pub page_loader: f32,
}

fn default_page_loader() -> f32 {
    EffectKind::PageLoader.base_duration()
}

impl TimingSettings {
    /// Configured duration of an effect
    pub fn duration(&self, effect: EffectKind) -> f32 {
        match effect {
            EffectKind::Loader => self.loader,
            EffectKind::Logo => self.hover,
            EffectKind::Outro => self.outro,
            EffectKind::PageLoader => self.page_loader,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            loader: EffectKind::Loader.base_duration(),
            hover: EffectKind::Logo.base_duration(),
            outro: EffectKind::Outro.base_duration(),
            page_loader: default_page_loader(),
        }
    }
}

/// Immutable animation configuration handed to presenters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Format version
    pub version: u32,
    /// Colors
    #[serde(default)]
    pub colors: ColorSettings,
    /// Durations
    #[serde(default)]
    pub timing: TimingSettings,
    /// Standard cubic-bezier control points
    #[serde(default = "default_easing")]
    pub easing: [f32; 4],
}

fn default_easing() -> [f32; 4] {
    [0.4, 0.0, 0.2, 1.0]
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            colors: ColorSettings::default(),
            timing: TimingSettings::default(),
            easing: default_easing(),
        }
    }
}

impl MotionConfig {
    /// Standard easing curve
    pub fn easing(&self) -> Easing {
        Easing::CubicBezier(self.easing)
    }

    /// Primary color as RGBA
    pub fn primary_color(&self) -> Result<[f32; 4]> {
        parse_hex_color(&self.colors.primary)
    }

    /// Factor that stretches an effect from its base duration to the configured one
    pub fn time_scale(&self, effect: EffectKind) -> Result<f32> {
        let duration = self.timing.duration(effect);
        if !(duration.is_finite() && duration > 0.0) {
            return Err(MotionError::InvalidSequenceConfig(format!(
                "{} duration must be positive, got {duration}",
                effect.display_name()
            )));
        }
        Ok(duration / effect.base_duration())
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.version > CONFIG_FORMAT_VERSION {
            return Err(MotionError::InvalidSequenceConfig(format!(
                "config version {} is newer than supported version {}",
                self.version, CONFIG_FORMAT_VERSION
            )));
        }
        for effect in EffectKind::all() {
            self.time_scale(*effect)?;
        }
        self.primary_color()?;
        let background = &self.colors.background;
        for stop in [&background.from, &background.via, &background.to] {
            parse_hex_color(stop)?;
        }
        let [x1, _, x2, _] = self.easing;
        if !((0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2)) {
            return Err(MotionError::InvalidSequenceConfig(format!(
                "easing x control points must lie in [0, 1], got {:?}",
                self.easing
            )));
        }
        Ok(())
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into RGBA in `[0, 1]`
pub fn parse_hex_color(text: &str) -> Result<[f32; 4]> {
    let invalid = || MotionError::InvalidSequenceConfig(format!("invalid color '{text}'"));
    let hex = text.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |digits: &str| u8::from_str_radix(digits, 16).map(|v| v as f32 / 255.0);
    let rgba = match hex.len() {
        3 => {
            let mut out = [1.0; 4];
            for (slot, digit) in out.iter_mut().zip(hex.chars()) {
                *slot = channel(&format!("{digit}{digit}")).map_err(|_| invalid())?;
            }
            out
        }
        6 | 8 => {
            let mut out = [1.0; 4];
            for (i, slot) in out.iter_mut().enumerate().take(hex.len() / 2) {
                *slot = channel(&hex[i * 2..i * 2 + 2]).map_err(|_| invalid())?;
            }
            out
        }
        _ => return Err(invalid()),
    };
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_constants() {
        let config = MotionConfig::default();
        assert_eq!(config.timing.loader, 1.8);
        assert_eq!(config.timing.hover, 0.5);
        assert_eq!(config.timing.outro, 1.4);
        assert_eq!(config.easing(), Easing::STANDARD);
        assert!(config.validate().is_ok());
        assert_eq!(config.time_scale(EffectKind::Outro).unwrap(), 1.0);
    }

    #[test]
    fn test_parse_hex_color() {
        let orange = parse_hex_color("#ff8c00").unwrap();
        assert_eq!(orange[0], 1.0);
        assert!((orange[1] - 140.0 / 255.0).abs() < 1e-6);
        assert_eq!(orange[2], 0.0);
        assert_eq!(orange[3], 1.0);

        assert_eq!(parse_hex_color("#fff").unwrap(), [1.0; 4]);
        assert_eq!(parse_hex_color("#00000000").unwrap(), [0.0; 4]);
        assert!(parse_hex_color("ff8c00").is_err());
        assert!(parse_hex_color("#ff8c0").is_err());
        assert!(parse_hex_color("#gg8c00").is_err());
    }

    #[test]
    fn test_time_scale_and_validation() {
        let mut config = MotionConfig::default();
        config.timing.loader = 3.6;
        assert!((config.time_scale(EffectKind::Loader).unwrap() - 2.0).abs() < 1e-6);

        config.timing.outro = 0.0;
        assert!(config.time_scale(EffectKind::Outro).is_err());
        assert!(config.validate().is_err());

        let mut config = MotionConfig::default();
        config.easing = [1.4, 0.0, 0.2, 1.0];
        assert!(config.validate().is_err());

        let mut config = MotionConfig::default();
        config.version = CONFIG_FORMAT_VERSION + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = MotionConfig::default();
        config.timing.hover = 0.25;
        config.colors.primary = "#ffa500".to_string();
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let back: MotionConfig = ron::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: MotionConfig = ron::from_str("(version: 1, timing: (loader: 2.0, hover: 0.5, outro: 1.4))").unwrap();
        assert_eq!(config.timing.loader, 2.0);
        assert_eq!(config.colors, ColorSettings::default());
        assert_eq!(config.easing, [0.4, 0.0, 0.2, 1.0]);
        assert_eq!(config.timing.page_loader, 2.0);
    }

    #[test]
    fn test_effect_keys_are_distinct() {
        let keys: std::collections::HashSet<_> = EffectKind::all().iter().map(EffectKind::key).collect();
        assert_eq!(keys.len(), EffectKind::all().len());
        assert_eq!(EffectKind::PageLoader.key().as_str(), "page-loader");
    }
}
