// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequences of staggered cell timelines and their playback.

use crate::binding::{Binding, CellId, Property, Target};
use crate::error::{MotionError, Result};
use crate::frame::{Frame, VisualAttributes};
use crate::timeline::Timeline;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Times closer than this count as reached
pub const TIME_EPSILON: f32 = 1e-4;

/// One honeycomb element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Identifier, unique within the sequence
    pub id: CellId,
    /// Offset from the layout center
    pub position: [f32; 2],
    /// Delay applied to every track of this cell
    pub start_delay: f32,
}

impl Cell {
    /// Create a cell
    pub fn new(id: u32, position: [f32; 2], start_delay: f32) -> Self {
        Self {
            id: CellId(id),
            position,
            start_delay,
        }
    }
}

/// A non-cell element (text, ring, particle, overlay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ornament {
    /// Name, unique within the sequence
    pub name: String,
    /// Resting position
    pub anchor: [f32; 2],
}

/// A timeline bound to one property of one element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// What the timeline drives
    pub binding: Binding,
    /// How it changes
    pub timeline: Timeline,
}

/// Named sub-phase reported once playback reaches it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMarker {
    /// Phase name
    pub name: String,
    /// Seconds from sequence start
    pub time: f32,
}

/// One complete multi-cell animation definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SequenceDef")]
pub struct Sequence {
    /// Sequence name
    pub name: String,
    cells: IndexMap<CellId, Cell>,
    ornaments: IndexMap<String, Ornament>,
    tracks: Vec<Track>,
    markers: Vec<PhaseMarker>,
    total_duration: f32,
}

/// Unchecked wire form; loading rebuilds through [`SequenceBuilder`]
#[derive(Deserialize)]
struct SequenceDef {
    name: String,
    cells: IndexMap<CellId, Cell>,
    #[serde(default)]
    ornaments: IndexMap<String, Ornament>,
    #[serde(default)]
    tracks: Vec<Track>,
    #[serde(default)]
    markers: Vec<PhaseMarker>,
}

impl TryFrom<SequenceDef> for Sequence {
    type Error = MotionError;

    fn try_from(def: SequenceDef) -> Result<Self> {
        let mut builder = SequenceBuilder::new(def.name).cells(def.cells.into_values());
        for ornament in def.ornaments.into_values() {
            builder = builder.ornament(ornament.name, ornament.anchor);
        }
        for track in def.tracks {
            builder = builder.track(track.binding, track.timeline);
        }
        for marker in def.markers {
            builder = builder.marker(marker.name, marker.time);
        }
        builder.build()
    }
}

impl Sequence {
    /// Start building a sequence
    pub fn builder(name: impl Into<String>) -> SequenceBuilder {
        SequenceBuilder::new(name)
    }

    /// Latest end time over all finite tracks; infinite when every track loops
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Whether this sequence never completes on its own
    pub fn is_open_ended(&self) -> bool {
        self.total_duration.is_infinite()
    }

    /// Cells in z-order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Get a cell
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Ornaments in declaration order
    pub fn ornaments(&self) -> impl Iterator<Item = &Ornament> {
        self.ornaments.values()
    }

    /// All tracks
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Phase markers sorted by time
    pub fn markers(&self) -> &[PhaseMarker] {
        &self.markers
    }

    /// Get cell count
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Start delay contributed by the track's target
    fn target_delay(&self, target: &Target) -> f32 {
        match target {
            Target::Cell(id) => self.cells.get(id).map_or(0.0, |c| c.start_delay),
            Target::Ornament(_) => 0.0,
        }
    }

    fn anchor(&self, target: &Target) -> [f32; 2] {
        match target {
            Target::Cell(id) => self.cells.get(id).map_or([0.0, 0.0], |c| c.position),
            Target::Ornament(name) => self.ornaments.get(name).map_or([0.0, 0.0], |o| o.anchor),
        }
    }

    /// Resting attributes for every element, before any track is applied
    fn blank_frame(&self, elapsed: f32) -> Frame {
        Frame {
            elapsed,
            cells: self
                .cells
                .values()
                .map(|c| (c.id, VisualAttributes::at(c.position)))
                .collect(),
            ornaments: self
                .ornaments
                .values()
                .map(|o| (o.name.clone(), VisualAttributes::at(o.anchor)))
                .collect(),
            phases: Vec::new(),
        }
    }

    fn attributes_mut<'a>(frame: &'a mut Frame, target: &Target) -> Option<&'a mut VisualAttributes> {
        match target {
            Target::Cell(id) => frame.cells.get_mut(id),
            Target::Ornament(name) => frame.ornaments.get_mut(name),
        }
    }

    /// Evaluate every track `elapsed` seconds after the sequence started.
    ///
    /// Each track sees `max(elapsed - cell.start_delay, 0)`.
    pub fn sample(&self, elapsed: f32) -> Frame {
        let mut frame = self.blank_frame(elapsed);
        for track in &self.tracks {
            let target = &track.binding.target;
            let local = (elapsed - self.target_delay(target)).max(0.0);
            let value = track.timeline.value_at(local);
            let anchor = self.anchor(target);
            if let Some(attrs) = Self::attributes_mut(&mut frame, target) {
                attrs.apply(anchor, track.binding.property, value);
            }
        }
        frame
    }

    /// Terminal, static state: every track at its last keyframe
    pub fn settled_frame(&self) -> Frame {
        let elapsed = if self.is_open_ended() { 0.0 } else { self.total_duration };
        let mut frame = self.blank_frame(elapsed);
        for track in &self.tracks {
            let target = &track.binding.target;
            let anchor = self.anchor(target);
            if let Some(attrs) = Self::attributes_mut(&mut frame, target) {
                attrs.apply(anchor, track.binding.property, track.timeline.last_value());
            }
        }
        frame
    }

    /// Copy with every delay, duration and marker multiplied by `factor`
    pub fn stretched(&self, factor: f32) -> Result<Sequence> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(MotionError::InvalidSequenceConfig(format!(
                "{}: time factor must be positive, got {factor}",
                self.name
            )));
        }

        let mut builder = SequenceBuilder::new(self.name.clone()).cells(self.cells.values().map(|cell| Cell {
            start_delay: cell.start_delay * factor,
            ..*cell
        }));
        for ornament in self.ornaments.values() {
            builder = builder.ornament(ornament.name.clone(), ornament.anchor);
        }
        for track in &self.tracks {
            builder = builder.track(track.binding.clone(), track.timeline.clone().scaled(factor)?);
        }
        for marker in &self.markers {
            builder = builder.marker(marker.name.clone(), marker.time * factor);
        }
        builder.build()
    }
}

/// Builder validating a [`Sequence`] before any tick runs
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    name: String,
    cells: Vec<Cell>,
    ornaments: Vec<Ornament>,
    tracks: Vec<Track>,
    markers: Vec<PhaseMarker>,
}

impl SequenceBuilder {
    /// Create an empty builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            ornaments: Vec::new(),
            tracks: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Add a cell
    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Add several cells
    pub fn cells(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Add an ornament
    pub fn ornament(mut self, name: impl Into<String>, anchor: [f32; 2]) -> Self {
        self.ornaments.push(Ornament {
            name: name.into(),
            anchor,
        });
        self
    }

    /// Add a track
    pub fn track(mut self, binding: Binding, timeline: Timeline) -> Self {
        self.tracks.push(Track { binding, timeline });
        self
    }

    /// Add a track driving a cell property
    pub fn cell_track(self, id: CellId, property: Property, timeline: Timeline) -> Self {
        self.track(Binding::cell(id, property), timeline)
    }

    /// Add a track driving an ornament property
    pub fn ornament_track(self, name: impl Into<String>, property: Property, timeline: Timeline) -> Self {
        self.track(Binding::ornament(name, property), timeline)
    }

    /// Add a phase marker
    pub fn marker(mut self, name: impl Into<String>, time: f32) -> Self {
        self.markers.push(PhaseMarker {
            name: name.into(),
            time,
        });
        self
    }

    /// Validate and produce the sequence
    pub fn build(self) -> Result<Sequence> {
        let invalid = |msg: String| MotionError::InvalidSequenceConfig(format!("{}: {msg}", self.name));

        if self.cells.is_empty() {
            return Err(invalid("no cells".into()));
        }

        let mut cells = IndexMap::with_capacity(self.cells.len());
        for cell in &self.cells {
            if !(cell.start_delay.is_finite() && cell.start_delay >= 0.0) {
                return Err(invalid(format!("{} has start delay {}", cell.id, cell.start_delay)));
            }
            if cells.insert(cell.id, *cell).is_some() {
                return Err(invalid(format!("duplicate {}", cell.id)));
            }
        }

        let mut ornaments = IndexMap::with_capacity(self.ornaments.len());
        for ornament in &self.ornaments {
            if ornaments.insert(ornament.name.clone(), ornament.clone()).is_some() {
                return Err(invalid(format!("duplicate ornament {}", ornament.name)));
            }
        }

        let mut total_duration = 0.0_f32;
        let mut any_finite = self.tracks.is_empty();
        let mut seen = HashSet::new();
        for track in &self.tracks {
            let target = &track.binding.target;
            let start = match target {
                Target::Cell(id) => match cells.get(id) {
                    Some(cell) => cell.start_delay,
                    None => return Err(invalid(format!("track targets missing {id}"))),
                },
                Target::Ornament(name) => {
                    if !ornaments.contains_key(name) {
                        return Err(invalid(format!("track targets missing ornament {name}")));
                    }
                    0.0
                }
            };

            track.timeline.validate().map_err(|err| match err {
                MotionError::InvalidTimeline(msg) => MotionError::InvalidTimeline(format!(
                    "{} {target} {:?}: {msg}",
                    self.name, track.binding.property
                )),
                other => other,
            })?;

            let expected = track.binding.property.value_kind();
            let actual = track.timeline.first_value().kind();
            if expected != actual {
                return Err(invalid(format!(
                    "{target} {:?} expects {expected:?}, timeline has {actual:?}",
                    track.binding.property
                )));
            }

            if !seen.insert(&track.binding) {
                tracing::debug!(
                    "{}: {target} {:?} is driven twice, later track wins",
                    self.name,
                    track.binding.property
                );
            }

            if !track.timeline.is_infinite() {
                any_finite = true;
                total_duration = total_duration.max(start + track.timeline.end_time());
            }
        }
        if !any_finite {
            total_duration = f32::INFINITY;
        }

        let mut markers = self.markers.clone();
        for marker in &markers {
            if !(marker.time.is_finite() && marker.time >= 0.0) {
                return Err(invalid(format!("marker {} at {}", marker.name, marker.time)));
            }
        }
        markers.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Sequence {
            name: self.name,
            cells,
            ornaments,
            tracks: self.tracks,
            markers,
            total_duration,
        })
    }
}

/// Lifecycle of one playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Created, not started
    #[default]
    Idle,
    /// Sampling every tick
    Running,
    /// Reached its total duration
    Completed,
    /// Torn down before completing
    Cancelled,
}

impl PlaybackState {
    /// Check if playback has ended either way
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Completed | PlaybackState::Cancelled)
    }

    /// Check if currently running
    pub fn is_running(&self) -> bool {
        matches!(self, PlaybackState::Running)
    }
}

/// A running instance of a sequence
#[derive(Debug, Clone)]
pub struct Playback {
    sequence: Sequence,
    state: PlaybackState,
    start: f32,
    next_marker: usize,
}

impl Playback {
    /// Create an idle playback
    pub fn new(sequence: Sequence) -> Self {
        Self {
            sequence,
            state: PlaybackState::Idle,
            start: 0.0,
            next_marker: 0,
        }
    }

    /// Start the clock at `now`
    pub fn begin(&mut self, now: f32) {
        if self.state == PlaybackState::Idle {
            self.start = now;
            self.state = PlaybackState::Running;
        }
    }

    /// Seconds since start, never negative
    pub fn elapsed(&self, now: f32) -> f32 {
        (now - self.start).max(0.0)
    }

    /// Sample the frame for `now` and report newly reached phases
    pub fn sample(&mut self, now: f32) -> Frame {
        debug_assert!(self.state.is_running(), "sampling a {:?} playback", self.state);
        let elapsed = self.elapsed(now);
        let mut frame = self.sequence.sample(elapsed);

        let markers = self.sequence.markers();
        while let Some(marker) = markers.get(self.next_marker) {
            if marker.time > elapsed {
                break;
            }
            frame.phases.push(marker.name.clone());
            self.next_marker += 1;
        }
        frame
    }

    /// Whether the total duration has been reached at `now`
    pub fn is_due(&self, now: f32) -> bool {
        self.state.is_running() && self.elapsed(now) + TIME_EPSILON >= self.sequence.total_duration()
    }

    /// Mark as completed; false if it was not running
    pub fn complete(&mut self) -> bool {
        if self.state.is_running() {
            self.state = PlaybackState::Completed;
            true
        } else {
            false
        }
    }

    /// Mark as cancelled; false if it had already ended
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            false
        } else {
            self.state = PlaybackState::Cancelled;
            true
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Start time
    pub fn start(&self) -> f32 {
        self.start
    }

    /// The sequence being played
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{Easing, KeyframeValue};
    use crate::timeline::Repeat;

    fn fade_in(duration: f32) -> Timeline {
        Timeline::tween(duration, 0.0, 1.0, Easing::Linear).unwrap()
    }

    fn two_cells() -> SequenceBuilder {
        Sequence::builder("test")
            .cell(Cell::new(0, [0.0, 0.0], 0.0))
            .cell(Cell::new(1, [10.0, 0.0], 0.5))
    }

    #[test]
    fn test_empty_cells_rejected() {
        let err = Sequence::builder("empty").build().unwrap_err();
        assert!(matches!(err, MotionError::InvalidSequenceConfig(_)));
    }

    #[test]
    fn test_duplicate_cell_ids_rejected() {
        let err = Sequence::builder("dup")
            .cell(Cell::new(1, [0.0, 0.0], 0.0))
            .cell(Cell::new(1, [5.0, 0.0], 0.1))
            .build()
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidSequenceConfig(_)));
    }

    #[test]
    fn test_unknown_target_and_kind_mismatch_rejected() {
        let missing = two_cells()
            .cell_track(CellId(9), Property::Opacity, fade_in(1.0))
            .build();
        assert!(matches!(missing, Err(MotionError::InvalidSequenceConfig(_))));

        let mismatch = two_cells().cell_track(CellId(0), Property::Offset, fade_in(1.0)).build();
        assert!(matches!(mismatch, Err(MotionError::InvalidSequenceConfig(_))));
    }

    #[test]
    fn test_malformed_timeline_fails_at_build() {
        let err = two_cells()
            .cell_track(CellId(0), Property::Opacity, fade_in(1.0).with_delay(-1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidTimeline(_)));
    }

    #[test]
    fn test_total_duration_is_max_end_time() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Opacity, fade_in(1.0))
            .cell_track(CellId(1), Property::Opacity, fade_in(0.6).with_delay(0.2))
            .ornament("ring", [0.0, 0.0])
            .ornament_track(
                "ring",
                Property::Scale,
                fade_in(3.0).with_repeat(Repeat::Infinite),
            )
            .build()
            .unwrap();
        // cell 1: 0.5 start delay + 0.2 delay + 0.6
        assert!((sequence.total_duration() - 1.3).abs() < 1e-6);
        assert!(!sequence.is_open_ended());
    }

    #[test]
    fn test_loop_only_sequence_is_open_ended() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Scale, fade_in(1.0).with_repeat(Repeat::Infinite))
            .build()
            .unwrap();
        assert!(sequence.is_open_ended());
    }

    #[test]
    fn test_sample_applies_cell_start_delay() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Opacity, fade_in(1.0))
            .cell_track(CellId(1), Property::Opacity, fade_in(1.0))
            .cell_track(
                CellId(1),
                Property::Offset,
                Timeline::from_times(
                    1.0,
                    &[KeyframeValue::Vec2([0.0, 0.0]), KeyframeValue::Vec2([0.0, 20.0])],
                    &[0.0, 1.0],
                    Easing::Linear,
                )
                .unwrap(),
            )
            .build()
            .unwrap();

        let frame = sequence.sample(0.75);
        assert!((frame.cell(CellId(0)).unwrap().opacity - 0.75).abs() < 1e-5);
        let cell1 = frame.cell(CellId(1)).unwrap();
        assert!((cell1.opacity - 0.25).abs() < 1e-5);
        assert!((cell1.position[1] - 5.0).abs() < 1e-4);
        assert_eq!(cell1.position[0], 10.0);

        // z-order follows insertion order
        let order: Vec<CellId> = frame.cells.keys().copied().collect();
        assert_eq!(order, vec![CellId(0), CellId(1)]);
    }

    #[test]
    fn test_settled_frame_uses_last_values() {
        let sequence = two_cells()
            .cell_track(CellId(1), Property::Scale, Timeline::from_values(1.0, &[0.0, 1.5, 1.0], Easing::Linear).unwrap())
            .build()
            .unwrap();
        assert_eq!(sequence.settled_frame().cell(CellId(1)).unwrap().scale, 1.0);
    }

    #[test]
    fn test_playback_lifecycle_and_markers() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Opacity, fade_in(1.0))
            .marker("late", 0.8)
            .marker("early", 0.2)
            .build()
            .unwrap();
        let mut playback = Playback::new(sequence);
        assert_eq!(playback.state(), PlaybackState::Idle);

        playback.begin(10.0);
        assert!(playback.state().is_running());
        assert!(playback.sample(10.1).phases.is_empty());
        assert_eq!(playback.sample(10.5).phases, vec!["early".to_string()]);
        assert!(playback.sample(10.6).phases.is_empty());
        assert!(!playback.is_due(10.9));
        assert_eq!(playback.sample(11.0).phases, vec!["late".to_string()]);
        assert!(playback.is_due(11.0));

        assert!(playback.complete());
        assert!(!playback.cancel());
        assert_eq!(playback.state(), PlaybackState::Completed);
    }

    #[test]
    fn test_sequence_ron_roundtrip() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Rotation, Timeline::tween(0.6, 180.0, 0.0, Easing::STANDARD).unwrap())
            .marker("text-reveal", 0.4)
            .build()
            .unwrap();
        let text = ron::ser::to_string_pretty(&sequence, ron::ser::PrettyConfig::default()).unwrap();
        let back: Sequence = ron::from_str(&text).unwrap();
        assert_eq!(back, sequence);
    }

    #[test]
    fn test_malformed_sequence_fails_to_load() {
        let sequence = two_cells()
            .cell_track(CellId(0), Property::Opacity, fade_in(1.0))
            .build()
            .unwrap();
        let mut value = serde_json::to_value(&sequence).unwrap();
        value["tracks"][0]["timeline"]["keyframes"] = serde_json::json!([]);
        assert!(serde_json::from_str::<Sequence>(&value.to_string()).is_err());

        // A track aimed at a cell the sequence does not have
        let mut value = serde_json::to_value(&sequence).unwrap();
        value["tracks"][0]["binding"]["target"] = serde_json::json!({ "Cell": 42 });
        assert!(serde_json::from_str::<Sequence>(&value.to_string()).is_err());
    }

    #[test]
    fn test_stretched_scales_every_time() {
        let sequence = two_cells()
            .cell_track(CellId(1), Property::Opacity, fade_in(1.0).with_delay(0.5))
            .marker("half", 1.0)
            .build()
            .unwrap();
        assert!((sequence.total_duration() - 2.0).abs() < 1e-6);

        let slow = sequence.stretched(2.0).unwrap();
        assert!((slow.total_duration() - 4.0).abs() < 1e-5);
        assert_eq!(slow.cell(CellId(1)).unwrap().start_delay, 1.0);
        assert_eq!(slow.markers()[0].time, 2.0);

        assert!(matches!(sequence.stretched(0.0), Err(MotionError::InvalidSequenceConfig(_))));
    }
}
