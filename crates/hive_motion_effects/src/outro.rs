// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page-exit sequence: the honeycomb collapses bottom-up, sparks disperse,
//! the screen flickers and fades to black.
//!
//! Completion is the host's cue to navigate. The `flicker` marker fires
//! 0.4 seconds before the end; during that window the brand text glitches
//! and digital scanlines sweep across it.

use crate::config::{EffectKind, MotionConfig};
use crate::layout::{floats, floats_at, honeycomb_position, offsets, tinted, Layout};
use crate::particles::{scatter, Particle, ScatterField};
use hive_motion_sequencer::{
    Cell, CellId, EffectKey, Easing, Frame, Presenter, Property, Repeat, Result, Sequence, Timeline,
    VisualAttributes,
};
use rand::Rng;
use std::f32::consts::PI;

/// Authored length of the outro
pub const OUTRO_DURATION: f32 = 1.4;

/// Marker reached when the screen starts flickering
pub const FLICKER: &str = "flicker";

/// Cell ids and start delays in collapse order: bottom first, center last
const COLLAPSE_ORDER: [(u32, f32); 7] = [
    (6, 0.0),
    (3, 0.08),
    (4, 0.08),
    (1, 0.16),
    (2, 0.16),
    (5, 0.24),
    (0, 0.32),
];

const SPARKS_PER_CELL: usize = 6;
const SPARK_DISTANCE: f32 = 50.0;

const PIXEL_COUNT: usize = 30;

/// Pixel dissolve starts here so the longest pixel ends with the outro
const PIXEL_START: f32 = 0.6;

const PIXEL_FIELD: ScatterField = ScatterField {
    half_extent: [320.0, 240.0],
    max_delay: 0.3,
    max_drift: 25.0,
};

const TEXT_ANCHOR: [f32; 2] = [0.0, 150.0];

/// Length of the flicker window at the end of the outro
const FLICKER_WINDOW: f32 = 0.4;

const SCANLINE_COUNT: usize = 5;

/// The scanline overlay blinks three times within the flicker window
const SCANLINE_BLINKS: u32 = 3;

/// Builds the outro sequence
#[derive(Debug, Clone)]
pub struct OutroPresenter {
    config: MotionConfig,
    pixels: Vec<Particle>,
}

impl OutroPresenter {
    /// Create an outro, scattering its dissolve pixels from `rng`
    pub fn new(config: MotionConfig, rng: &mut impl Rng) -> Self {
        Self {
            config,
            pixels: scatter(rng, PIXEL_COUNT, PIXEL_FIELD),
        }
    }

    /// Pixel-dissolve particles
    pub fn pixels(&self) -> &[Particle] {
        &self.pixels
    }

    fn spark_name(cell: u32, index: usize) -> String {
        format!("cell{cell}.spark{index}")
    }

    fn layout(&self) -> Layout {
        let mut layout = Layout::default();
        for (id, delay) in COLLAPSE_ORDER {
            layout.cell(Cell::new(id, honeycomb_position(id), delay));
        }
        for (id, _) in COLLAPSE_ORDER {
            for i in 0..SPARKS_PER_CELL {
                layout.ornament(Self::spark_name(id, i), honeycomb_position(id));
            }
        }
        layout.ornament("container", [0.0, 0.0]);
        layout.ornament("energy-pulse", [0.0, 0.0]);
        layout.ornament("cap", [0.0, 0.0]);
        layout.ornament("final-pulse", [0.0, 0.0]);
        layout.ornament("outer-ring", [0.0, 0.0]);
        layout.ornament("brand-text", TEXT_ANCHOR);
        layout.ornament("power-dots", [0.0, 210.0]);
        for i in 0..3 {
            layout.ornament(format!("dot{i}"), [(i as f32 - 1.0) * 16.0, 210.0]);
        }
        for (i, pixel) in self.pixels.iter().enumerate() {
            layout.ornament(format!("pixel{i}"), pixel.anchor);
        }
        layout.ornament("scanlines", TEXT_ANCHOR);
        for i in 0..SCANLINE_COUNT {
            layout.ornament(format!("scanline{i}"), [0.0, TEXT_ANCHOR[1] - 20.0 + i as f32 * 10.0]);
        }
        layout.ornament("flicker", [0.0, 0.0]);
        layout.ornament("screen-fade", [0.0, 0.0]);
        layout
    }

    fn build_with(&self, config: &MotionConfig) -> Result<Sequence> {
        config.validate()?;
        let ease = config.easing();
        let glow = config.primary_color()?;
        let mut builder = self.layout().builder("outro");

        for (id, start) in COLLAPSE_ORDER {
            let cell = CellId(id);
            builder = builder
                .cell_track(cell, Property::GlowOpacity, floats(0.5, &[0.3, 1.0, 0.0], ease)?)
                .cell_track(cell, Property::PathLength, floats(0.5, &[1.0, 1.0, 0.0], ease)?)
                .cell_track(cell, Property::Opacity, floats(0.5, &[1.0, 1.0, 0.0], ease)?)
                .cell_track(cell, Property::Scale, floats(0.6, &[1.0, 1.3, 0.3, 0.0], ease)?.with_delay(0.1))
                .cell_track(cell, Property::Fill, tinted(0.6, glow, &[0.5, 0.8, 0.3, 0.0], ease)?.with_delay(0.1))
                .cell_track(cell, Property::NodeScale, floats(0.5, &[1.0, 2.0, 0.0], ease)?)
                .cell_track(cell, Property::NodeOpacity, floats(0.5, &[0.8, 1.0, 0.0], ease)?);

            // Sparks are ornaments, so they carry the cell's delay themselves
            for i in 0..SPARKS_PER_CELL {
                let angle = i as f32 * PI / 3.0;
                let target = [angle.cos() * SPARK_DISTANCE, angle.sin() * SPARK_DISTANCE];
                let name = Self::spark_name(id, i);
                let delay = start + 0.2;
                builder = builder
                    .ornament_track(
                        name.clone(),
                        Property::Offset,
                        offsets(0.8, &[[0.0, 0.0], target], Easing::EaseOut)?.with_delay(delay),
                    )
                    .ornament_track(
                        name.clone(),
                        Property::Opacity,
                        floats(0.8, &[1.0, 0.5, 0.0], Easing::EaseOut)?.with_delay(delay),
                    )
                    .ornament_track(
                        name,
                        Property::Scale,
                        floats(0.8, &[1.0, 0.5, 0.0], Easing::EaseOut)?.with_delay(delay),
                    );
            }
        }

        let d = OUTRO_DURATION;
        builder = builder
            .ornament_track(
                "container",
                Property::Scale,
                floats_at(d, &[1.0, 1.05, 0.95, 0.9], &[0.0, 0.3, 0.7, 1.0], ease)?,
            )
            .ornament_track(
                "container",
                Property::Opacity,
                floats_at(d, &[1.0, 1.0, 0.8, 0.0], &[0.0, 0.3, 0.7, 1.0], ease)?,
            )
            .ornament_track("energy-pulse", Property::Scale, floats(0.8, &[1.0, 2.5, 3.0], Easing::EaseOut)?)
            .ornament_track("energy-pulse", Property::Opacity, floats(0.8, &[0.0, 0.6, 0.0], Easing::EaseOut)?)
            .ornament_track("cap", Property::Scale, floats(0.7, &[1.0, 1.2, 0.8, 0.0], ease)?.with_delay(0.5))
            .ornament_track("cap", Property::Opacity, floats(0.7, &[1.0, 1.0, 0.5, 0.0], ease)?.with_delay(0.5))
            .ornament_track(
                "cap",
                Property::Offset,
                offsets(0.7, &[[0.0, 0.0], [0.0, -5.0], [0.0, 5.0], [0.0, 0.0]], ease)?.with_delay(0.5),
            )
            .ornament_track(
                "final-pulse",
                Property::Scale,
                floats(0.8, &[1.0, 15.0, 20.0], Easing::EaseOut)?.with_delay(0.6),
            )
            .ornament_track(
                "final-pulse",
                Property::Opacity,
                floats(0.8, &[1.0, 0.3, 0.0], Easing::EaseOut)?.with_delay(0.6),
            )
            .ornament_track("outer-ring", Property::Scale, floats(0.8, &[1.0, 0.8, 0.3], ease)?)
            .ornament_track("outer-ring", Property::Opacity, floats(0.8, &[0.5, 0.8, 0.0], ease)?)
            .ornament_track("outer-ring", Property::StrokeWidth, floats(0.8, &[2.0, 4.0, 0.0], ease)?)
            .ornament_track(
                "brand-text",
                Property::Offset,
                offsets(d * 0.6, &[[0.0, 0.0], [0.0, 20.0], [0.0, 30.0]], ease)?.with_delay(0.3),
            )
            .ornament_track(
                "brand-text",
                Property::Opacity,
                floats(d * 0.6, &[1.0, 0.5, 0.0], ease)?.with_delay(0.3),
            )
            .ornament_track(
                "brand-text",
                Property::Scale,
                floats(d * 0.6, &[1.0, 0.95, 0.9], ease)?.with_delay(0.3),
            )
            .ornament_track("power-dots", Property::Opacity, floats(0.6, &[1.0, 1.0, 0.0], ease)?.with_delay(0.4));

        for i in 0..3 {
            let name = format!("dot{i}");
            let delay = 0.5 + i as f32 * 0.1;
            builder = builder
                .ornament_track(name.clone(), Property::Scale, floats(0.4, &[1.0, 0.5, 0.0], ease)?.with_delay(delay))
                .ornament_track(name, Property::Opacity, floats(0.4, &[1.0, 0.5, 0.0], ease)?.with_delay(delay));
        }

        let glitch = d - FLICKER_WINDOW;
        builder = builder
            .ornament_track(
                "brand-text",
                Property::Brightness,
                floats_at(0.3, &[1.0, 0.3, 1.0, 0.5, 0.0], &[0.0, 0.2, 0.4, 0.6, 1.0], Easing::Linear)?
                    .with_delay(glitch),
            )
            .ornament_track(
                "scanlines",
                Property::Opacity,
                floats(FLICKER_WINDOW / SCANLINE_BLINKS as f32, &[0.0, 1.0, 0.0], Easing::Linear)?
                    .with_delay(glitch)
                    .with_repeat(Repeat::Count(SCANLINE_BLINKS)),
            );
        for i in 0..SCANLINE_COUNT {
            let name = format!("scanline{i}");
            let delay = glitch + i as f32 * 0.03;
            builder = builder
                .ornament_track(name.clone(), Property::Scale, floats(0.15, &[0.0, 1.0, 0.0], ease)?.with_delay(delay))
                .ornament_track(name, Property::Opacity, floats(0.15, &[0.0, 0.8, 0.0], ease)?.with_delay(delay));
        }

        for (i, pixel) in self.pixels.iter().enumerate() {
            let name = format!("pixel{i}");
            let delay = PIXEL_START + pixel.delay;
            builder = builder
                .ornament_track(
                    name.clone(),
                    Property::Opacity,
                    floats(0.5, &[0.0, 1.0, 0.0], Easing::EaseOut)?.with_delay(delay),
                )
                .ornament_track(
                    name.clone(),
                    Property::Scale,
                    floats(0.5, &[1.0, 0.5, 0.0], Easing::EaseOut)?.with_delay(delay),
                )
                .ornament_track(
                    name,
                    Property::Offset,
                    offsets(0.5, &[[0.0, 0.0], pixel.drift], Easing::EaseOut)?.with_delay(delay),
                );
        }

        let sequence = builder
            .ornament_track(
                "flicker",
                Property::Opacity,
                floats_at(
                    0.4,
                    &[0.0, 0.5, 0.0, 0.7, 0.0, 0.3, 0.0],
                    &[0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 1.0],
                    Easing::Linear,
                )?
                .with_delay(glitch),
            )
            .ornament_track(
                "screen-fade",
                Property::Opacity,
                Timeline::tween(0.5, 0.0, 1.0, Easing::EaseIn)?.with_delay(d - 0.5),
            )
            .marker(FLICKER, glitch)
            .build()?;

        let scale = config.time_scale(EffectKind::Outro)?;
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

    /// Everything gone, screen black
    fn blackout(&self) -> Frame {
        let mut frame = self.layout().resting_frame();
        frame.elapsed = OUTRO_DURATION;
        let gone = |attrs: &mut VisualAttributes| {
            attrs.scale = 0.0;
            attrs.opacity = 0.0;
        };
        frame.cells.values_mut().for_each(gone);
        frame.ornaments.values_mut().for_each(gone);
        if let Some(fade) = frame.ornaments.get_mut("screen-fade") {
            fade.scale = 1.0;
            fade.opacity = 1.0;
        }
        frame
    }
}

impl Presenter for OutroPresenter {
    fn key(&self) -> EffectKey {
        EffectKind::Outro.key()
    }

    fn build(&self) -> Result<Sequence> {
        self.build_with(&self.config)
    }

    fn settled_frame(&self) -> Frame {
        self.blackout()
    }
}
