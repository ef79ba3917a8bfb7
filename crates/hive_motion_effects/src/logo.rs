// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hover logo: a half-scale honeycomb that brightens on pointer enter.
//!
//! Enter and leave are mirror-image bounded sequences. While Active, a
//! separate loop (pulsing ring and rotating shimmer) runs under the
//! effect's `loop` sub-key.

use crate::config::{EffectKind, MotionConfig};
use crate::layout::{floats, honeycomb_position, offsets, Layout};
use hive_motion_sequencer::{
    Cell, CellId, Easing, Frame, HoverState, InteractivePresenter, Property, Repeat, Result, Sequence,
    Timeline,
};
use serde::{Deserialize, Serialize};

/// Hover transition length the logo is authored against
pub const HOVER_DURATION: f32 = 0.5;

/// Period of the Active loop
pub const LOOP_PERIOD: f32 = 1.5;

/// Cell carrying the pulsing ring in the Active loop
pub const RING_CELL: CellId = CellId(7);

/// Display size preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LogoSize {
    /// Navigation bar
    Small,
    /// Default
    #[default]
    Medium,
    /// Hero section
    Large,
}

impl LogoSize {
    /// Multiplier applied to every position
    pub fn scale(&self) -> f32 {
        match self {
            LogoSize::Small => 0.6,
            LogoSize::Medium => 1.2,
            LogoSize::Large => 1.5,
        }
    }
}

/// Resting values of one hover state
struct Pose {
    cell_scale: f32,
    cell_opacity: f32,
    center_opacity: f32,
    center_glow: f32,
    node_scale: f32,
    node_opacity: f32,
    container_scale: f32,
    container_glow: f32,
    ring_scale: f32,
    ring_opacity: f32,
    cap_scale: f32,
    cap_lift: f32,
    text_glow: f32,
    underline: f32,
    underline_opacity: f32,
    backdrop_scale: f32,
    backdrop_opacity: f32,
}

const IDLE: Pose = Pose {
    cell_scale: 1.0,
    cell_opacity: 0.6,
    center_opacity: 0.3,
    center_glow: 0.2,
    node_scale: 1.0,
    node_opacity: 0.6,
    container_scale: 1.0,
    container_glow: 0.3,
    ring_scale: 1.0,
    ring_opacity: 0.2,
    cap_scale: 1.0,
    cap_lift: 0.0,
    text_glow: 0.0,
    underline: 0.0,
    underline_opacity: 0.0,
    backdrop_scale: 0.5,
    backdrop_opacity: 0.0,
};

const ACTIVE: Pose = Pose {
    cell_scale: 1.15,
    cell_opacity: 0.8,
    center_opacity: 0.6,
    center_glow: 0.5,
    node_scale: 1.2,
    node_opacity: 0.8,
    container_scale: 1.05,
    container_glow: 0.6,
    ring_scale: 1.1,
    ring_opacity: 0.4,
    cap_scale: 1.1,
    cap_lift: -2.0,
    text_glow: 0.4,
    underline: 1.0,
    underline_opacity: 0.8,
    backdrop_scale: 1.5,
    backdrop_opacity: 0.5,
};

/// Builds the hover sequences of the logo
#[derive(Debug, Clone)]
pub struct LogoPresenter {
    config: MotionConfig,
    size: LogoSize,
}

impl LogoPresenter {
    /// Create a logo presenter
    pub fn new(config: MotionConfig, size: LogoSize) -> Self {
        Self { config, size }
    }

    /// Size preset
    pub fn size(&self) -> LogoSize {
        self.size
    }

    fn layout(&self) -> Layout {
        let s = self.size.scale();
        let mut layout = Layout::default();
        for index in 0..7u32 {
            let [x, y] = honeycomb_position(index);
            layout.cell(Cell::new(index, [x * 0.5 * s, y * 0.5 * s], index as f32 * 0.03));
        }
        layout.ornament("container", [0.0, 0.0]);
        layout.ornament("ring", [0.0, 0.0]);
        layout.ornament("cap", [0.0, 0.0]);
        layout.ornament("brand-glow", [70.0 * s, 0.0]);
        layout.ornament("underline", [70.0 * s, 14.0 * s]);
        layout.ornament("backdrop", [0.0, 0.0]);
        layout
    }

    fn hover_sequence(&self, config: &MotionConfig, target: HoverState) -> Result<Sequence> {
        config.validate()?;
        let ease = config.easing();
        let (from, to, name) = match target {
            HoverState::Active => (&IDLE, &ACTIVE, "logo-enter"),
            HoverState::Idle => (&ACTIVE, &IDLE, "logo-leave"),
        };
        let d = HOVER_DURATION;
        let layout = self.layout();
        let mut builder = layout.builder(name);

        for cell in &layout.cells {
            let center = cell.id == CellId(0);
            let (opacity_from, opacity_to) = if center {
                (from.center_opacity, to.center_opacity)
            } else {
                (from.cell_opacity, to.cell_opacity)
            };
            // Nodes stagger by 0.04 per index, cells by 0.03
            let node_delay = cell.id.0 as f32 * 0.01;
            let (node_scale, node_opacity) = match target {
                HoverState::Active => (
                    floats(d, &[IDLE.node_scale, 1.5, ACTIVE.node_scale], ease)?,
                    floats(d, &[IDLE.node_opacity, 1.0, ACTIVE.node_opacity], ease)?,
                ),
                HoverState::Idle => (
                    Timeline::tween(d, ACTIVE.node_scale, IDLE.node_scale, ease)?,
                    Timeline::tween(d, ACTIVE.node_opacity, IDLE.node_opacity, ease)?,
                ),
            };
            builder = builder
                .cell_track(cell.id, Property::Scale, Timeline::tween(d, from.cell_scale, to.cell_scale, ease)?)
                .cell_track(cell.id, Property::Opacity, Timeline::tween(d, opacity_from, opacity_to, ease)?)
                .cell_track(cell.id, Property::NodeScale, node_scale.with_delay(node_delay))
                .cell_track(cell.id, Property::NodeOpacity, node_opacity.with_delay(node_delay));
            if center {
                builder = builder.cell_track(
                    cell.id,
                    Property::GlowOpacity,
                    Timeline::tween(0.8, from.center_glow, to.center_glow, Easing::EaseInOut)?,
                );
            }
        }

        let text_glow = match target {
            HoverState::Active => floats(0.8, &[0.3, 0.6, ACTIVE.text_glow], Easing::EaseInOut)?,
            HoverState::Idle => Timeline::tween(0.8, ACTIVE.text_glow, IDLE.text_glow, Easing::EaseInOut)?,
        };

        let sequence = builder
            .ornament_track(
                "container",
                Property::Scale,
                Timeline::tween(d, from.container_scale, to.container_scale, ease)?,
            )
            .ornament_track(
                "container",
                Property::GlowOpacity,
                Timeline::tween(d, from.container_glow, to.container_glow, ease)?,
            )
            .ornament_track("ring", Property::Scale, Timeline::tween(d, from.ring_scale, to.ring_scale, ease)?)
            .ornament_track(
                "ring",
                Property::Opacity,
                Timeline::tween(d, from.ring_opacity, to.ring_opacity, ease)?,
            )
            .ornament_track("cap", Property::Scale, Timeline::tween(d, from.cap_scale, to.cap_scale, ease)?)
            .ornament_track(
                "cap",
                Property::Offset,
                offsets(d, &[[0.0, from.cap_lift], [0.0, to.cap_lift]], ease)?,
            )
            .ornament_track("brand-glow", Property::GlowOpacity, text_glow)
            .ornament_track(
                "underline",
                Property::Scale,
                Timeline::tween(d, from.underline, to.underline, ease)?,
            )
            .ornament_track(
                "underline",
                Property::Opacity,
                Timeline::tween(d, from.underline_opacity, to.underline_opacity, ease)?,
            )
            .ornament_track(
                "backdrop",
                Property::Scale,
                Timeline::tween(d, from.backdrop_scale, to.backdrop_scale, ease)?,
            )
            .ornament_track(
                "backdrop",
                Property::Opacity,
                Timeline::tween(d, from.backdrop_opacity, to.backdrop_opacity, ease)?,
            )
            .build()?;

        let scale = config.time_scale(EffectKind::Logo)?;
        tracing::debug!("Built {} sequence for {:?} logo", sequence.name, self.size);
        if scale == 1.0 {
            Ok(sequence)
        } else {
            sequence.stretched(scale)
        }
    }

    fn ring_loop(&self, config: &MotionConfig) -> Result<Sequence> {
        config.validate()?;
        let looping = |timeline: Timeline| timeline.with_repeat(Repeat::Infinite);
        Sequence::builder("logo-ring")
            .cell(Cell::new(RING_CELL.0, [0.0, 0.0], 0.0))
            .ornament("shimmer", [0.0, 0.0])
            .cell_track(
                RING_CELL,
                Property::Scale,
                looping(floats(LOOP_PERIOD, &[0.9, 1.15, 0.9], Easing::EaseInOut)?),
            )
            .cell_track(
                RING_CELL,
                Property::Opacity,
                looping(floats(LOOP_PERIOD, &[0.8, 0.0, 0.8], Easing::EaseInOut)?),
            )
            .ornament_track(
                "shimmer",
                Property::Rotation,
                looping(Timeline::tween(LOOP_PERIOD, 0.0, 360.0, Easing::Linear)?),
            )
            .ornament_track(
                "shimmer",
                Property::PathLength,
                looping(Timeline::tween(LOOP_PERIOD, 0.0, 1.0, Easing::Linear)?),
            )
            .build()
    }

    /// Static frame of a hover state, shown when a transition cannot be built
    pub fn resting_frame(&self, state: HoverState) -> Frame {
        self.hover_sequence(&MotionConfig::default(), state)
            .map_or_else(|_| self.layout().resting_frame(), |sequence| sequence.settled_frame())
    }
}

impl InteractivePresenter for LogoPresenter {
    fn enter_sequence(&self) -> Result<Sequence> {
        self.hover_sequence(&self.config, HoverState::Active)
    }

    fn leave_sequence(&self) -> Result<Sequence> {
        self.hover_sequence(&self.config, HoverState::Idle)
    }

    fn active_loop(&self) -> Option<Result<Sequence>> {
        Some(self.ring_loop(&self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_motion_sequencer::{EffectKey, InteractionEvent, MotionDirector, PlaybackState};

    fn logo() -> LogoPresenter {
        LogoPresenter::new(MotionConfig::default(), LogoSize::Medium)
    }

    #[test]
    fn test_size_scales_positions() {
        let small = LogoPresenter::new(MotionConfig::default(), LogoSize::Small);
        let large = LogoPresenter::new(MotionConfig::default(), LogoSize::Large);
        let top = |p: &LogoPresenter| p.enter_sequence().unwrap().cell(CellId(5)).unwrap().position;
        assert!((top(&small)[1] + 21.0).abs() < 1e-4);
        assert!((top(&large)[1] + 52.5).abs() < 1e-4);
    }

    #[test]
    fn test_enter_and_leave_mirror() {
        let presenter = logo();
        let enter = presenter.enter_sequence().unwrap().settled_frame();
        let leave = presenter.leave_sequence().unwrap().settled_frame();

        let active = enter.cell(CellId(1)).unwrap();
        assert!((active.scale - 1.15).abs() < 1e-6);
        assert!((active.opacity - 0.8).abs() < 1e-6);
        assert!((enter.cell(CellId(0)).unwrap().opacity - 0.6).abs() < 1e-6);
        assert_eq!(enter.ornament("cap").unwrap().position, [0.0, -2.0]);

        let idle = leave.cell(CellId(1)).unwrap();
        assert_eq!(idle.scale, 1.0);
        assert!((idle.opacity - 0.6).abs() < 1e-6);
        assert_eq!(leave.ornament("underline").unwrap().scale, 0.0);
    }

    #[test]
    fn test_leave_snaps_from_active_values() {
        let leave = logo().leave_sequence().unwrap();
        let start = leave.sample(0.0);
        assert!((start.cell(CellId(3)).unwrap().scale - 1.15).abs() < 1e-6);
        assert!((start.ornament("ring").unwrap().opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_enter_total_and_stagger() {
        let enter = logo().enter_sequence().unwrap();
        assert!((enter.cell(CellId(6)).unwrap().start_delay - 0.18).abs() < 1e-6);
        // Center glow and text glow run 0.8
        assert!((enter.total_duration() - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_ring_loop_is_open_ended() {
        let ring = logo().active_loop().unwrap().unwrap();
        assert!(ring.is_open_ended());
        let peak = ring.sample(0.75);
        assert!((peak.cell(RING_CELL).unwrap().scale - 1.15).abs() < 1e-4);
    }

    #[test]
    fn test_hover_round_trip_through_director() {
        let key = EffectKey::new("logo");
        let mut director = MotionDirector::new();
        director.attach_interaction(key.clone(), logo());

        let enter = director.handle_interaction(&key, InteractionEvent::Enter, 0.0).unwrap().unwrap();
        director.tick(0.2);
        let leave = director.handle_interaction(&key, InteractionEvent::Leave, 0.25).unwrap().unwrap();
        assert_eq!(director.state(enter), Some(PlaybackState::Cancelled));
        let again = director.handle_interaction(&key, InteractionEvent::Enter, 0.3).unwrap().unwrap();
        assert_eq!(director.state(leave), Some(PlaybackState::Cancelled));

        let report = director.tick(2.0);
        assert_eq!(report.completed, vec![again]);
        assert_eq!(director.interaction_state(&key), Some(HoverState::Active));
        let settled = report.frame_for(&key).unwrap();
        assert!((settled.cell(CellId(2)).unwrap().scale - 1.15).abs() < 1e-5);
        assert!(report.frame_for(&key.child("loop")).is_some());
    }

    #[test]
    fn test_faster_hover_config() {
        let mut config = MotionConfig::default();
        config.timing.hover = 0.25;
        let enter = LogoPresenter::new(config, LogoSize::Medium).enter_sequence().unwrap();
        assert!((enter.total_duration() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_resting_frame_for_each_state() {
        let presenter = logo();
        let idle = presenter.resting_frame(HoverState::Idle);
        let active = presenter.resting_frame(HoverState::Active);
        assert!((idle.cell(CellId(0)).unwrap().opacity - 0.3).abs() < 1e-6);
        assert!((active.cell(CellId(0)).unwrap().opacity - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_bad_config_stops_ring_loop_too() {
        let mut config = MotionConfig::default();
        config.colors.primary = "orange".to_string();
        let key = EffectKey::new("logo");
        let mut director = MotionDirector::new();
        director.attach_interaction(key.clone(), LogoPresenter::new(config, LogoSize::Medium));

        assert!(director.handle_interaction(&key, InteractionEvent::Enter, 0.0).is_err());
        assert_eq!(director.interaction_state(&key), Some(HoverState::Active));
        assert!(director.live_handle(&key.child("loop")).is_none());
        assert!(director.tick(0.5).frames.is_empty());
    }
}
