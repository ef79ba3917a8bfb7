// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line flags.

use crate::session::OutputFormat;
use crate::settings::PreviewSettings;
use clap::{Parser, ValueEnum};
use hive_motion_effects::{EffectKind, LogoSize};
use std::path::PathBuf;

/// Effect selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectArg {
    /// Page loader
    Loader,
    /// Hoverable logo
    Logo,
    /// Exit transition
    Outro,
    /// Boot overlay with progress bar
    PageLoader,
}

impl From<EffectArg> for EffectKind {
    fn from(arg: EffectArg) -> Self {
        match arg {
            EffectArg::Loader => EffectKind::Loader,
            EffectArg::Logo => EffectKind::Logo,
            EffectArg::Outro => EffectKind::Outro,
            EffectArg::PageLoader => EffectKind::PageLoader,
        }
    }
}

/// Logo size selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeArg {
    /// Navigation bar
    Small,
    /// Default
    Medium,
    /// Hero section
    Large,
}

impl From<SizeArg> for LogoSize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => LogoSize::Small,
            SizeArg::Medium => LogoSize::Medium,
            SizeArg::Large => LogoSize::Large,
        }
    }
}

/// Output format selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// One line per tick
    Text,
    /// JSON lines
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "hive-preview", about = "Play a honeycomb effect headlessly and print its frames", version)]
pub struct Args {
    /// Settings file (defaults to ./motion.ron when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Effect to play
    #[arg(short, long, value_enum)]
    pub effect: Option<EffectArg>,

    /// Simulated frames per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Seed for randomized ornaments
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many simulated seconds
    #[arg(long)]
    pub max_seconds: Option<f32>,

    /// Logo size preset
    #[arg(long, value_enum)]
    pub size: Option<SizeArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Write the resolved settings to this file and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,
}

impl Args {
    /// Apply flag overrides on top of loaded settings
    pub fn apply(&self, settings: &mut PreviewSettings) {
        let playback = &mut settings.playback;
        if let Some(effect) = self.effect {
            playback.effect = effect.into();
        }
        if let Some(fps) = self.fps {
            playback.fps = fps;
        }
        if let Some(seed) = self.seed {
            playback.seed = seed;
        }
        if let Some(max_seconds) = self.max_seconds {
            playback.max_seconds = max_seconds;
        }
        if let Some(size) = self.size {
            playback.logo_size = size.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from(["hive-preview", "--effect", "logo", "--fps", "30", "--size", "large"]);
        let mut settings = PreviewSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.playback.effect, EffectKind::Logo);
        assert_eq!(settings.playback.fps, 30);
        assert_eq!(settings.playback.logo_size, LogoSize::Large);
        assert_eq!(settings.playback.seed, 0);
        assert_eq!(args.format, FormatArg::Text);
    }

    #[test]
    fn test_page_loader_flag() {
        let args = Args::parse_from(["hive-preview", "--effect", "page-loader"]);
        let mut settings = PreviewSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.playback.effect, EffectKind::PageLoader);
    }

    #[test]
    fn test_unknown_effect_rejected() {
        assert!(Args::try_parse_from(["hive-preview", "--effect", "banner"]).is_err());
    }
}
