// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page-load intro: the honeycomb assembles cell by cell, then the brand
//! text reveals.
//!
//! Phases, all measured from mount:
//! - Cells pop in with a staggered spin (0 to 0.35 start delays)
//! - Strokes draw, nodes pulse and glows settle per cell
//! - Graduation cap and outer ring arrive (0.6 to 1.8)
//! - Brand text reveals from 1.2 (`text-reveal` marker) and ends at 1.8
//!
//! Loading dots and background particles loop for as long as the overlay is
//! shown and do not extend the total. Hosts dismiss the overlay
//! [`DISMISS_GRACE`] seconds after completion.

use crate::config::{EffectKind, MotionConfig};
use crate::layout::{floats, honeycomb_position, offsets, Layout};
use crate::particles::{scatter, Particle, ScatterField};
use hive_motion_sequencer::{
    Cell, CellId, EffectKey, Easing, Frame, Presenter, Property, Repeat, Result, Sequence, Timeline,
};
use rand::Rng;

/// Delay between completion and dismissing the overlay
pub const DISMISS_GRACE: f32 = 0.5;

/// Marker reached when the brand text starts revealing
pub const TEXT_REVEAL: &str = "text-reveal";

/// Cell ids and start delays in reveal order
const REVEAL_ORDER: [(u32, f32); 7] = [
    (0, 0.0),
    (1, 0.1),
    (2, 0.15),
    (3, 0.2),
    (4, 0.25),
    (5, 0.3),
    (6, 0.35),
];

const PARTICLE_COUNT: usize = 20;

const PARTICLE_FIELD: ScatterField = ScatterField {
    half_extent: [320.0, 240.0],
    max_delay: 2.0,
    max_drift: 0.0,
};

const TEXT_ANCHOR: [f32; 2] = [0.0, 150.0];

/// Builds the loader sequence
#[derive(Debug, Clone)]
pub struct LoaderPresenter {
    config: MotionConfig,
    particles: Vec<Particle>,
}

impl LoaderPresenter {
    /// Create a loader, scattering its background particles from `rng`
    pub fn new(config: MotionConfig, rng: &mut impl Rng) -> Self {
        Self {
            config,
            particles: scatter(rng, PARTICLE_COUNT, PARTICLE_FIELD),
        }
    }

    /// Background particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn layout(&self) -> Layout {
        let mut layout = Layout::default();
        for (id, delay) in REVEAL_ORDER {
            layout.cell(Cell::new(id, honeycomb_position(id), delay));
        }
        layout.ornament("container", [0.0, 0.0]);
        layout.ornament("cap", [0.0, 0.0]);
        layout.ornament("outer-ring", [0.0, 0.0]);
        layout.ornament("brand-text", TEXT_ANCHOR);
        layout.ornament("brand-glow", TEXT_ANCHOR);
        layout.ornament("text-shine", TEXT_ANCHOR);
        layout.ornament("tagline", [0.0, 180.0]);
        layout.ornament("loading-dots", [0.0, 210.0]);
        for i in 0..3 {
            layout.ornament(format!("dot{i}"), [(i as f32 - 1.0) * 16.0, 210.0]);
        }
        for (i, particle) in self.particles.iter().enumerate() {
            layout.ornament(format!("particle{i}"), particle.anchor);
        }
        layout
    }

    fn build_with(&self, config: &MotionConfig) -> Result<Sequence> {
        config.validate()?;
        let ease = config.easing();
        let mut builder = self.layout().builder("loader");

        for (id, _) in REVEAL_ORDER {
            let cell = CellId(id);
            let glow: &[f32] = if id == 0 { &[0.0, 0.5, 0.3] } else { &[0.0, 0.2, 0.1] };
            builder = builder
                .cell_track(cell, Property::Scale, Timeline::tween(0.6, 0.0, 1.0, ease)?)
                .cell_track(cell, Property::Opacity, Timeline::tween(0.6, 0.0, 1.0, ease)?)
                .cell_track(cell, Property::Rotation, Timeline::tween(0.6, 180.0, 0.0, ease)?)
                .cell_track(
                    cell,
                    Property::PathLength,
                    Timeline::tween(0.8, 0.0, 1.0, Easing::EaseInOut)?.with_delay(0.2),
                )
                .cell_track(
                    cell,
                    Property::GlowOpacity,
                    floats(0.8, glow, Easing::EaseInOut)?.with_delay(0.4),
                )
                .cell_track(cell, Property::NodeScale, floats(0.6, &[0.0, 1.5, 1.0], ease)?.with_delay(0.3))
                .cell_track(cell, Property::NodeOpacity, floats(0.6, &[0.0, 1.0, 0.8], ease)?.with_delay(0.3));
        }

        builder = builder
            .ornament_track("container", Property::Scale, Timeline::tween(0.5, 0.8, 1.0, ease)?)
            .ornament_track("container", Property::Opacity, Timeline::tween(0.5, 0.0, 1.0, ease)?)
            .ornament_track("cap", Property::Scale, Timeline::tween(0.6, 0.0, 1.0, ease)?.with_delay(0.8))
            .ornament_track("cap", Property::Opacity, Timeline::tween(0.6, 0.0, 1.0, ease)?.with_delay(0.8))
            .ornament_track(
                "outer-ring",
                Property::Scale,
                floats(1.2, &[0.5, 1.1, 1.0], ease)?.with_delay(0.6),
            )
            .ornament_track(
                "outer-ring",
                Property::Opacity,
                floats(1.2, &[0.0, 0.5, 0.2], ease)?.with_delay(0.6),
            )
            .ornament_track("brand-text", Property::Opacity, Timeline::tween(0.6, 0.0, 1.0, ease)?.with_delay(1.2))
            .ornament_track("brand-text", Property::Scale, Timeline::tween(0.6, 0.9, 1.0, ease)?.with_delay(1.2))
            .ornament_track(
                "brand-text",
                Property::Offset,
                offsets(0.6, &[[0.0, 20.0], [0.0, 0.0]], ease)?.with_delay(1.2),
            )
            .ornament_track(
                "brand-glow",
                Property::GlowOpacity,
                floats(0.4, &[0.0, 0.5, 0.3], Easing::EaseInOut)?.with_delay(1.4),
            )
            .ornament_track(
                "text-shine",
                Property::Offset,
                offsets(0.3, &[[-120.0, 0.0], [240.0, 0.0]], Easing::EaseInOut)?.with_delay(1.5),
            )
            .ornament_track(
                "tagline",
                Property::Opacity,
                Timeline::tween(0.2, 0.0, 1.0, Easing::EaseOut)?.with_delay(1.6),
            )
            .ornament_track(
                "loading-dots",
                Property::Opacity,
                Timeline::tween(0.3, 0.0, 1.0, Easing::EaseOut)?.with_delay(1.3),
            );

        for i in 0..3 {
            let name = format!("dot{i}");
            let delay = i as f32 * 0.2 + 1.4;
            builder = builder
                .ornament_track(
                    name.clone(),
                    Property::Scale,
                    floats(1.0, &[1.0, 1.5, 1.0], Easing::EaseInOut)?
                        .with_delay(delay)
                        .with_repeat(Repeat::Infinite),
                )
                .ornament_track(
                    name,
                    Property::Opacity,
                    floats(1.0, &[0.5, 1.0, 0.5], Easing::EaseInOut)?
                        .with_delay(delay)
                        .with_repeat(Repeat::Infinite),
                );
        }

        for (i, particle) in self.particles.iter().enumerate() {
            let name = format!("particle{i}");
            builder = builder
                .ornament_track(
                    name.clone(),
                    Property::Opacity,
                    floats(2.0, &[0.0, 1.0, 0.0], Easing::EaseInOut)?
                        .with_delay(particle.delay)
                        .with_repeat(Repeat::Infinite),
                )
                .ornament_track(
                    name,
                    Property::Scale,
                    floats(2.0, &[0.0, 1.5, 0.0], Easing::EaseInOut)?
                        .with_delay(particle.delay)
                        .with_repeat(Repeat::Infinite),
                );
        }

        let sequence = builder.marker(TEXT_REVEAL, 1.2).build()?;
        let scale = config.time_scale(EffectKind::Loader)?;
        tracing::debug!(
            "Built {} sequence: {} tracks, {} ornaments, x{scale:.2}",
            sequence.name,
            sequence.tracks().len(),
            sequence.ornaments().count()
        );
        if scale == 1.0 {
            Ok(sequence)
        } else {
            sequence.stretched(scale)
        }
    }
}

impl Presenter for LoaderPresenter {
    fn key(&self) -> EffectKey {
        EffectKind::Loader.key()
    }

    fn build(&self) -> Result<Sequence> {
        self.build_with(&self.config)
    }

    fn settled_frame(&self) -> Frame {
        self.build_with(&MotionConfig::default())
            .map_or_else(|_| self.layout().resting_frame(), |sequence| sequence.settled_frame())
    }
}
