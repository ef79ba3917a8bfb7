// SPDX-License-Identifier: MIT OR Apache-2.0
//! App-wide loading overlay shown while the site boots.
//!
//! The overlay stays for [`HIDE_AFTER`] seconds: the logo badge springs in,
//! the brand text rises, and the progress bar fills to 100% by
//! [`PROGRESS_FULL`]. Completion marks the hide; hosts then play
//! [`PageLoaderPresenter::exit_sequence`] and unmount the overlay
//! [`EXIT_FADE`] seconds later. Orbiting dots, the floating badge and the
//! backdrop blobs loop without extending the total.

use crate::config::{EffectKind, MotionConfig};
use crate::layout::{floats, offsets, Layout};
use hive_motion_sequencer::{
    Cell, CellId, EffectKey, Easing, Frame, Presenter, Property, Repeat, Result, Sequence,
    SequenceBuilder, Timeline,
};

/// Time the overlay stays before hiding
pub const HIDE_AFTER: f32 = 2.0;

/// Length of the fade-out after hiding
pub const EXIT_FADE: f32 = 0.4;

/// Marker reached when the progress bar is full
pub const PROGRESS_FULL: &str = "progress-full";

/// Progress gained per step and the step interval, as in 2.5% every 20 ms
const PROGRESS_STEP: f32 = 2.5;
const PROGRESS_INTERVAL: f32 = 0.02;

const ORBIT_RADIUS: f32 = 60.0;
const ORBIT_PERIOD: f32 = 3.0;

/// Hexagon frame behind the badge
const HEX_CELL: CellId = CellId(0);

/// Time for the progress bar to reach 100%
pub fn progress_fill_time() -> f32 {
    100.0 / PROGRESS_STEP * PROGRESS_INTERVAL
}

/// Builds the overlay and its exit fade
#[derive(Debug, Clone)]
pub struct PageLoaderPresenter {
    config: MotionConfig,
}

impl PageLoaderPresenter {
    /// Create a page loader
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    fn layout() -> Layout {
        let mut layout = Layout::default();
        layout.cell(Cell::new(HEX_CELL.0, [0.0, -60.0], 0.0));
        layout.ornament("overlay", [0.0, 0.0]);
        layout.ornament("blob0", [-320.0, -200.0]);
        layout.ornament("blob1", [320.0, 200.0]);
        layout.ornament("blob2", [0.0, 0.0]);
        layout.ornament("logo-container", [0.0, -60.0]);
        layout.ornament("badge", [0.0, -60.0]);
        for i in 0..3 {
            layout.ornament(format!("orbit{i}"), [0.0, -60.0]);
        }
        layout.ornament("brand-text", [0.0, 40.0]);
        layout.ornament("tagline", [0.0, 70.0]);
        layout.ornament("progress", [0.0, 110.0]);
        layout.ornament("progress-bar", [0.0, 110.0]);
        layout.ornament("loading-label", [0.0, 130.0]);
        layout
    }

    fn build_with(&self, config: &MotionConfig) -> Result<Sequence> {
        config.validate()?;
        let ease = config.easing();
        let looping = |timeline: Timeline| timeline.with_repeat(Repeat::Infinite);
        let mut builder = Self::layout()
            .builder("page-loader")
            // Holds the overlay until it hides
            .ornament_track("overlay", Property::Opacity, floats(HIDE_AFTER, &[1.0, 1.0], Easing::Linear)?)
            .cell_track(
                HEX_CELL,
                Property::Rotation,
                looping(Timeline::tween(20.0, 0.0, 360.0, Easing::Linear)?),
            )
            .ornament_track("logo-container", Property::Scale, floats(0.6, &[0.0, 1.1, 1.0], ease)?)
            .ornament_track("logo-container", Property::Rotation, Timeline::tween(0.6, -180.0, 0.0, ease)?)
            .ornament_track(
                "badge",
                Property::Offset,
                looping(offsets(2.0, &[[0.0, 0.0], [0.0, -10.0], [0.0, 0.0]], Easing::EaseInOut)?),
            );

        builder = Self::backdrop(builder)?;
        for i in 0..3 {
            let start = (i as f32 * 120.0).to_radians();
            let path: Vec<[f32; 2]> = (0..=12)
                .map(|step| {
                    let angle = start + (step as f32 * 30.0).to_radians();
                    [angle.cos() * ORBIT_RADIUS, angle.sin() * ORBIT_RADIUS]
                })
                .collect();
            builder = builder.ornament_track(
                format!("orbit{i}"),
                Property::Offset,
                looping(offsets(ORBIT_PERIOD, &path, Easing::Linear)?.with_delay(i as f32 * 0.2)),
            );
        }

        let fill = progress_fill_time();
        let sequence = builder
            .ornament_track("brand-text", Property::Opacity, Timeline::tween(0.5, 0.0, 1.0, ease)?.with_delay(0.3))
            .ornament_track(
                "brand-text",
                Property::Offset,
                offsets(0.5, &[[0.0, 20.0], [0.0, 0.0]], ease)?.with_delay(0.3),
            )
            .ornament_track("tagline", Property::Opacity, Timeline::tween(0.5, 0.0, 1.0, ease)?.with_delay(0.3))
            .ornament_track("progress", Property::Opacity, Timeline::tween(0.3, 0.0, 1.0, ease)?.with_delay(0.5))
            .ornament_track("progress-bar", Property::PathLength, Timeline::tween(fill, 0.0, 1.0, Easing::Linear)?)
            .ornament_track(
                "loading-label",
                Property::Opacity,
                looping(floats(1.5, &[0.5, 1.0, 0.5], Easing::EaseInOut)?),
            )
            .marker(PROGRESS_FULL, fill)
            .build()?;

        let scale = config.time_scale(EffectKind::PageLoader)?;
        tracing::debug!("Built {} sequence: {} tracks, x{scale:.2}", sequence.name, sequence.tracks().len());
        if scale == 1.0 {
            Ok(sequence)
        } else {
            sequence.stretched(scale)
        }
    }

    fn backdrop(builder: SequenceBuilder) -> Result<SequenceBuilder> {
        let looping = |timeline: Timeline| timeline.with_repeat(Repeat::Infinite);
        let pulse = [0.3, 0.5, 0.3];
        Ok(builder
            .ornament_track("blob0", Property::Scale, looping(floats(3.0, &[1.0, 1.2, 1.0], Easing::EaseInOut)?))
            .ornament_track("blob0", Property::Opacity, looping(floats(3.0, &pulse, Easing::EaseInOut)?))
            .ornament_track(
                "blob1",
                Property::Scale,
                looping(floats(3.0, &[1.2, 1.0, 1.2], Easing::EaseInOut)?.with_delay(1.5)),
            )
            .ornament_track(
                "blob1",
                Property::Opacity,
                looping(floats(3.0, &pulse, Easing::EaseInOut)?.with_delay(1.5)),
            )
            .ornament_track("blob2", Property::Scale, looping(floats(8.0, &[1.0, 1.3, 1.0], Easing::Linear)?))
            .ornament_track("blob2", Property::Rotation, looping(floats(8.0, &[0.0, 180.0, 360.0], Easing::Linear)?)))
    }

    /// Fade-out played once the overlay hides
    pub fn exit_sequence(&self) -> Result<Sequence> {
        Self::layout()
            .builder("page-loader-exit")
            .ornament_track("overlay", Property::Opacity, Timeline::tween(EXIT_FADE, 1.0, 0.0, Easing::EaseOut)?)
            .build()
    }
}

impl Presenter for PageLoaderPresenter {
    fn key(&self) -> EffectKey {
        EffectKind::PageLoader.key()
    }

    fn build(&self) -> Result<Sequence> {
        self.build_with(&self.config)
    }

    fn settled_frame(&self) -> Frame {
        self.build_with(&MotionConfig::default())
            .map_or_else(|_| Self::layout().resting_frame(), |sequence| sequence.settled_frame())
    }
}
