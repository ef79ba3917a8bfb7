// SPDX-License-Identifier: MIT OR Apache-2.0
//! TechyHive honeycomb effects.
//!
//! Concrete presenters built on `hive_motion_sequencer`:
//! - [`LoaderPresenter`]: page-load intro, dismissed after a grace period
//! - [`LogoPresenter`]: hover logo with an Active-only ring loop
//! - [`OutroPresenter`]: page-exit collapse, completion triggers navigation
//! - [`PageLoaderPresenter`]: boot overlay with progress bar and exit fade
//!
//! Every presenter takes an immutable [`MotionConfig`]; randomized
//! ornaments are scattered from an injected `rand::Rng`.

pub mod config;
pub mod layout;
pub mod loader;
pub mod logo;
pub mod outro;
pub mod page_loader;
pub mod particles;

pub use config::{
    parse_hex_color, BackgroundGradient, ColorSettings, EffectKind, MotionConfig, TimingSettings,
    CONFIG_FILE_NAME, CONFIG_FORMAT_VERSION,
};
pub use layout::{Layout, HONEYCOMB};
pub use loader::{LoaderPresenter, DISMISS_GRACE, TEXT_REVEAL};
pub use logo::{LogoPresenter, LogoSize, HOVER_DURATION, LOOP_PERIOD, RING_CELL};
pub use outro::{OutroPresenter, FLICKER, OUTRO_DURATION};
pub use page_loader::{progress_fill_time, PageLoaderPresenter, EXIT_FADE, HIDE_AFTER, PROGRESS_FULL};
pub use particles::{scatter, Particle, ScatterField};
