// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host boundary: starts, ticks, cancels and completes playbacks.
//!
//! The director is driven by the host's frame scheduler. Every call to
//! [`MotionDirector::tick`] samples all running playbacks from one `now`
//! snapshot, then completes the ones that reached their total duration and
//! runs completion callbacks that are due. At most one playback is live per
//! [`EffectKey`]; starting another cancels the previous one first.

use crate::error::{MotionError, Result};
use crate::frame::Frame;
use crate::interaction::{HoverState, InteractionEvent, InteractionMachine, InteractivePresenter};
use crate::sequence::{Playback, PlaybackState, Sequence, TIME_EPSILON};
use crate::signal::{CompletionCallback, CompletionSignal, DueCallback};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Finished playbacks remembered for state queries and late listeners
const MAX_RETIRED: usize = 64;

/// Handle to one started sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceHandle(pub Uuid);

impl SequenceHandle {
    /// Create a new random handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical effect a sequence drives; one live sequence per key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectKey(String);

impl EffectKey {
    /// Create a key
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Key for a secondary element set of this effect
    pub fn child(&self, suffix: &str) -> Self {
        Self(format!("{}.{suffix}", self.0))
    }

    /// Key name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EffectKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for EffectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An effect that can be mounted as a one-shot sequence
pub trait Presenter {
    /// Key the sequence runs under
    fn key(&self) -> EffectKey;

    /// Build the animated sequence
    fn build(&self) -> Result<Sequence>;

    /// Static end state shown when the sequence cannot be built
    fn settled_frame(&self) -> Frame;
}

/// Result of mounting a presenter
#[derive(Debug, Clone, PartialEq)]
pub enum Mount {
    /// Sequence is running
    Animated(SequenceHandle),
    /// Construction failed; render this static frame instead
    Settled(Frame),
}

/// Result of a cancel request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A running playback was cancelled
    Cancelled,
    /// Already completed, cancelled or never started; nothing happened
    Stale,
}

/// Frame of one live effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectFrame {
    /// Effect the frame belongs to
    pub key: EffectKey,
    /// Sampled attributes
    pub frame: Frame,
}

/// Output of one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// The `now` snapshot every frame was sampled at
    pub now: f32,
    /// Frames of every playback that was running at the start of the tick
    pub frames: IndexMap<SequenceHandle, EffectFrame>,
    /// Playbacks that completed during this tick
    pub completed: Vec<SequenceHandle>,
}

impl TickReport {
    /// Frame of the effect running under `key`, if any
    pub fn frame_for(&self, key: &EffectKey) -> Option<&Frame> {
        self.frames.values().find(|f| &f.key == key).map(|f| &f.frame)
    }
}

struct Live {
    key: EffectKey,
    playback: Playback,
    signal: CompletionSignal,
}

struct Retired {
    state: PlaybackState,
    signal: CompletionSignal,
}

/// Owns every playback and interaction of the host page
pub struct MotionDirector {
    live: IndexMap<SequenceHandle, Live>,
    by_key: HashMap<EffectKey, SequenceHandle>,
    retired: IndexMap<SequenceHandle, Retired>,
    interactions: HashMap<EffectKey, InteractionMachine>,
    deferred: Vec<DueCallback>,
    now: f32,
}

impl MotionDirector {
    /// Create an empty director
    pub fn new() -> Self {
        Self {
            live: IndexMap::new(),
            by_key: HashMap::new(),
            retired: IndexMap::new(),
            interactions: HashMap::new(),
            deferred: Vec::new(),
            now: 0.0,
        }
    }

    /// Start `sequence` under `key` at `now`, cancelling whatever ran there
    pub fn start(&mut self, key: impl Into<EffectKey>, sequence: Sequence, now: f32) -> SequenceHandle {
        let key = key.into();
        if let Some(previous) = self.by_key.get(&key).copied() {
            tracing::debug!("{key}: superseding {previous:?}");
            self.cancel(previous);
        }

        let handle = SequenceHandle::new();
        let mut playback = Playback::new(sequence);
        playback.begin(now);
        tracing::info!(
            "{key}: started '{}' ({} cells, {:.2}s)",
            playback.sequence().name,
            playback.sequence().cell_count(),
            playback.sequence().total_duration()
        );

        self.live.insert(
            handle,
            Live {
                key: key.clone(),
                playback,
                signal: CompletionSignal::new(handle),
            },
        );
        self.by_key.insert(key, handle);
        handle
    }

    /// Build and start a presenter's sequence, degrading to its settled frame
    pub fn mount(&mut self, presenter: &dyn Presenter, now: f32) -> Mount {
        let key = presenter.key();
        match presenter.build() {
            Ok(sequence) => Mount::Animated(self.start(key, sequence, now)),
            Err(err) => {
                tracing::warn!("{key}: {err}; showing settled state");
                self.cancel_effect(&key);
                Mount::Settled(presenter.settled_frame())
            }
        }
    }

    /// Cancel a playback; completion will never fire for it
    pub fn cancel(&mut self, handle: SequenceHandle) -> CancelOutcome {
        let Some(mut live) = self.live.shift_remove(&handle) else {
            tracing::debug!("Stale cancel for {handle:?}");
            return CancelOutcome::Stale;
        };

        live.playback.cancel();
        live.signal.suppress();
        if self.by_key.get(&live.key) == Some(&handle) {
            self.by_key.remove(&live.key);
        }
        tracing::info!("{}: cancelled '{}'", live.key, live.playback.sequence().name);
        self.retire(handle, live.playback.state(), live.signal);
        CancelOutcome::Cancelled
    }

    /// Cancel whatever runs under `key`
    pub fn cancel_effect(&mut self, key: &EffectKey) -> CancelOutcome {
        match self.by_key.get(key).copied() {
            Some(handle) => self.cancel(handle),
            None => CancelOutcome::Stale,
        }
    }

    /// Run `callback` once when the playback completes
    pub fn on_complete(
        &mut self,
        handle: SequenceHandle,
        callback: impl FnOnce(SequenceHandle) + 'static,
    ) -> Result<()> {
        self.on_complete_after(handle, 0.0, callback)
    }

    /// Run `callback` once, `grace` seconds after the playback completes
    pub fn on_complete_after(
        &mut self,
        handle: SequenceHandle,
        grace: f32,
        callback: impl FnOnce(SequenceHandle) + 'static,
    ) -> Result<()> {
        let callback: CompletionCallback = Box::new(callback);
        let signal = if let Some(live) = self.live.get_mut(&handle) {
            &mut live.signal
        } else if let Some(retired) = self.retired.get_mut(&handle) {
            &mut retired.signal
        } else {
            return Err(MotionError::UnknownHandle(handle));
        };

        if let Some(due) = signal.listen(grace, callback) {
            if due.due <= self.now + TIME_EPSILON {
                (due.callback)(due.handle);
            } else {
                self.deferred.push(due);
            }
        }
        Ok(())
    }

    /// Register an interactive effect under `key`
    pub fn attach_interaction(&mut self, key: impl Into<EffectKey>, presenter: impl InteractivePresenter + 'static) {
        let key = key.into();
        tracing::debug!("{key}: interaction attached");
        self.interactions
            .insert(key, InteractionMachine::new(Box::new(presenter)));
    }

    /// Remove an interactive effect and stop its sequences
    pub fn detach_interaction(&mut self, key: &EffectKey) {
        if self.interactions.remove(key).is_some() {
            self.cancel_effect(key);
            self.cancel_effect(&key.child("loop"));
        }
    }

    /// Forward a pointer event
    pub fn handle_interaction(
        &mut self,
        key: &EffectKey,
        event: InteractionEvent,
        now: f32,
    ) -> Result<Option<SequenceHandle>> {
        self.set_interaction_state(key, event.target_state(), now)
    }

    /// Drive an interactive effect to `state`.
    ///
    /// Returns the handle of the enter/leave sequence, or `None` when the
    /// effect was already in `state`. The state changes even when the
    /// sequence fails to build; the error is returned so the host can render
    /// the static state.
    pub fn set_interaction_state(
        &mut self,
        key: &EffectKey,
        state: HoverState,
        now: f32,
    ) -> Result<Option<SequenceHandle>> {
        let machine = self
            .interactions
            .get_mut(key)
            .ok_or_else(|| MotionError::UnknownEffect(key.clone()))?;
        let Some(transition) = machine.transition(state) else {
            return Ok(None);
        };
        tracing::debug!("{key}: hover -> {:?}", transition.to);

        let loop_key = key.child("loop");
        match transition.active_loop {
            Some(Ok(sequence)) => {
                self.start(loop_key, sequence, now);
            }
            Some(Err(err)) => {
                tracing::warn!("{loop_key}: {err}; loop skipped");
                self.cancel_effect(&loop_key);
            }
            None => {
                self.cancel_effect(&loop_key);
            }
        }

        match transition.sequence {
            Ok(sequence) => Ok(Some(self.start(key.clone(), sequence, now))),
            Err(err) => {
                tracing::warn!("{key}: {err}; showing static {:?} state", transition.to);
                self.cancel_effect(key);
                Err(err)
            }
        }
    }

    /// Hover state of an interactive effect
    pub fn interaction_state(&self, key: &EffectKey) -> Option<HoverState> {
        self.interactions.get(key).map(InteractionMachine::state)
    }

    /// Sample every running playback at `now`, then complete and notify
    pub fn tick(&mut self, now: f32) -> TickReport {
        self.now = now;
        let mut report = TickReport {
            now,
            ..TickReport::default()
        };

        let mut due = Vec::new();
        for (handle, live) in self.live.iter_mut() {
            let frame = live.playback.sample(now);
            for phase in &frame.phases {
                tracing::debug!("{}: phase '{phase}'", live.key);
            }
            report.frames.insert(
                *handle,
                EffectFrame {
                    key: live.key.clone(),
                    frame,
                },
            );
            if live.playback.is_due(now) {
                due.push(*handle);
            }
        }

        for handle in due {
            if let Some(live) = self.live.shift_remove(&handle) {
                self.complete(handle, live, now);
                report.completed.push(handle);
            }
        }

        self.run_due(now);
        report
    }

    fn complete(&mut self, handle: SequenceHandle, mut live: Live, now: f32) {
        live.playback.complete();
        // Never later than the tick that observed it, so zero-grace listeners run now
        let completed_at = (live.playback.start() + live.playback.sequence().total_duration()).min(now);
        match live.signal.fire(completed_at) {
            Ok(callbacks) => self.deferred.extend(callbacks),
            Err(err) => {
                tracing::error!("{}: {err}", live.key);
                debug_assert!(false, "{err}");
            }
        }
        if self.by_key.get(&live.key) == Some(&handle) {
            self.by_key.remove(&live.key);
        }
        tracing::info!("{}: completed '{}'", live.key, live.playback.sequence().name);
        self.retire(handle, live.playback.state(), live.signal);
    }

    fn run_due(&mut self, now: f32) {
        if self.deferred.is_empty() {
            return;
        }
        let (mut ready, pending): (Vec<_>, Vec<_>) =
            self.deferred.drain(..).partition(|d| d.due <= now + TIME_EPSILON);
        self.deferred = pending;
        ready.sort_by(|a, b| a.due.total_cmp(&b.due));
        for item in ready {
            (item.callback)(item.handle);
        }
    }

    fn retire(&mut self, handle: SequenceHandle, state: PlaybackState, signal: CompletionSignal) {
        self.retired.insert(handle, Retired { state, signal });
        while self.retired.len() > MAX_RETIRED {
            self.retired.shift_remove_index(0);
        }
    }

    /// State of a playback, `None` if unknown or long forgotten
    pub fn state(&self, handle: SequenceHandle) -> Option<PlaybackState> {
        self.live
            .get(&handle)
            .map(|l| l.playback.state())
            .or_else(|| self.retired.get(&handle).map(|r| r.state))
    }

    /// Handle currently live under `key`
    pub fn live_handle(&self, key: &EffectKey) -> Option<SequenceHandle> {
        self.by_key.get(key).copied()
    }

    /// Number of running playbacks
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Whether any playback is running or any callback is pending
    pub fn is_idle(&self) -> bool {
        self.live.is_empty() && self.deferred.is_empty()
    }
}

impl Default for MotionDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MotionDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionDirector")
            .field("live", &self.live.len())
            .field("retired", &self.retired.len())
            .field("interactions", &self.interactions.len())
            .field("deferred", &self.deferred.len())
            .field("now", &self.now)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{CellId, Property};
    use crate::keyframe::Easing;
    use crate::sequence::Cell;
    use crate::timeline::{Repeat, Timeline};
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    fn fade(total: f32) -> Sequence {
        Sequence::builder("fade")
            .cell(Cell::new(0, [0.0, 0.0], 0.0))
            .cell_track(
                CellId(0),
                Property::Opacity,
                Timeline::tween(total, 0.0, 1.0, Easing::Linear).unwrap(),
            )
            .build()
            .unwrap()
    }

    fn counting(director: &mut MotionDirector, handle: SequenceHandle) -> Rc<Counter<u32>> {
        let count = Rc::new(Counter::new(0));
        let inner = count.clone();
        director
            .on_complete(handle, move |_| inner.set(inner.get() + 1))
            .unwrap();
        count
    }

    #[test]
    fn test_completes_exactly_once() {
        let mut director = MotionDirector::new();
        let handle = director.start("fade", fade(1.0), 0.0);
        let count = counting(&mut director, handle);

        let report = director.tick(0.5);
        assert_eq!(director.state(handle), Some(PlaybackState::Running));
        assert!(report.completed.is_empty());

        let report = director.tick(1.01);
        assert_eq!(report.completed, vec![handle]);
        assert_eq!(director.state(handle), Some(PlaybackState::Completed));
        assert_eq!(count.get(), 1);
        // The completing tick still carries the final frame
        let frame = report.frame_for(&"fade".into()).unwrap();
        assert_eq!(frame.cell(CellId(0)).unwrap().opacity, 1.0);

        director.tick(5.0);
        director.tick(50.0);
        assert_eq!(count.get(), 1);
        assert!(director.is_idle());
    }

    #[test]
    fn test_completion_within_tolerance_notifies_same_tick() {
        let mut director = MotionDirector::new();
        let handle = director.start("fade", fade(1.0), 0.0);
        let count = counting(&mut director, handle);

        let report = director.tick(0.99995);
        assert_eq!(report.completed, vec![handle]);
        assert_eq!(count.get(), 1);
        assert!(director.is_idle());

        // Grace counts from the observing tick
        let handle = director.start("fade", fade(1.0), 2.0);
        let fired = Rc::new(Counter::new(0));
        let inner = fired.clone();
        director
            .on_complete_after(handle, 0.5, move |_| inner.set(inner.get() + 1))
            .unwrap();
        director.tick(2.99995);
        assert_eq!(fired.get(), 0);
        director.tick(3.49995);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_cancelled_never_completes() {
        let mut director = MotionDirector::new();
        let handle = director.start("fade", fade(1.4), 0.0);
        let count = counting(&mut director, handle);
        director.tick(0.3);

        assert_eq!(director.cancel(handle), CancelOutcome::Cancelled);
        assert_eq!(director.state(handle), Some(PlaybackState::Cancelled));
        for step in 1..=40 {
            let report = director.tick(0.5 + step as f32 * 0.1);
            assert!(report.frames.is_empty());
        }
        assert_eq!(count.get(), 0);
        assert_eq!(director.cancel(handle), CancelOutcome::Stale);
    }

    #[test]
    fn test_restart_cancels_previous() {
        let mut director = MotionDirector::new();
        let first = director.start("outro", fade(1.0), 0.0);
        let first_count = counting(&mut director, first);
        director.tick(0.2);

        let second = director.start("outro", fade(1.0), 0.4);
        assert_eq!(director.state(first), Some(PlaybackState::Cancelled));
        assert_eq!(director.live_count(), 1);
        assert_eq!(director.live_handle(&"outro".into()), Some(second));

        let report = director.tick(0.5);
        assert_eq!(report.frames.len(), 1);
        assert!(report.frames.contains_key(&second));

        director.tick(2.0);
        assert_eq!(director.state(second), Some(PlaybackState::Completed));
        assert_eq!(first_count.get(), 0);
    }

    #[test]
    fn test_other_keys_run_side_by_side() {
        let mut director = MotionDirector::new();
        director.start("a", fade(1.0), 0.0);
        director.start("b", fade(1.0), 0.0);
        assert_eq!(director.live_count(), 2);
        assert_eq!(director.tick(0.1).frames.len(), 2);
    }

    #[test]
    fn test_grace_period_delays_callback() {
        let mut director = MotionDirector::new();
        let handle = director.start("loader", fade(1.8), 0.0);
        let fired = Rc::new(Counter::new(0));
        let inner = fired.clone();
        director
            .on_complete_after(handle, 0.5, move |_| inner.set(inner.get() + 1))
            .unwrap();

        director.tick(1.8);
        assert_eq!(director.state(handle), Some(PlaybackState::Completed));
        assert_eq!(fired.get(), 0);
        assert!(!director.is_idle());
        director.tick(2.2);
        assert_eq!(fired.get(), 0);
        director.tick(2.31);
        assert_eq!(fired.get(), 1);
        director.tick(3.0);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_late_listener_runs_immediately() {
        let mut director = MotionDirector::new();
        let handle = director.start("fade", fade(1.0), 0.0);
        director.tick(1.5);
        let count = counting(&mut director, handle);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let mut director = MotionDirector::new();
        let stranger = SequenceHandle::new();
        assert_eq!(
            director.on_complete(stranger, |_| {}).unwrap_err(),
            MotionError::UnknownHandle(stranger)
        );
        assert_eq!(director.cancel(stranger), CancelOutcome::Stale);
        assert_eq!(director.state(stranger), None);
    }

    #[test]
    fn test_open_ended_sequence_keeps_running() {
        let sequence = Sequence::builder("pulse")
            .cell(Cell::new(0, [0.0, 0.0], 0.0))
            .cell_track(
                CellId(0),
                Property::Scale,
                Timeline::tween(1.0, 0.9, 1.1, Easing::EaseInOut)
                    .unwrap()
                    .with_repeat(Repeat::Infinite),
            )
            .build()
            .unwrap();
        let mut director = MotionDirector::new();
        let handle = director.start("pulse", sequence, 0.0);
        director.tick(1_000.0);
        assert_eq!(director.state(handle), Some(PlaybackState::Running));
    }

    struct Broken;

    impl Presenter for Broken {
        fn key(&self) -> EffectKey {
            "broken".into()
        }

        fn build(&self) -> Result<Sequence> {
            Sequence::builder("broken").build()
        }

        fn settled_frame(&self) -> Frame {
            Frame::default()
        }
    }

    #[test]
    fn test_mount_degrades_to_settled_frame() {
        let mut director = MotionDirector::new();
        assert_eq!(director.mount(&Broken, 0.0), Mount::Settled(Frame::default()));
        assert_eq!(director.live_count(), 0);
    }

    struct Hover;

    impl InteractivePresenter for Hover {
        fn enter_sequence(&self) -> Result<Sequence> {
            Ok(fade(0.5))
        }

        fn leave_sequence(&self) -> Result<Sequence> {
            Ok(fade(0.5))
        }

        fn active_loop(&self) -> Option<Result<Sequence>> {
            let ring = Sequence::builder("ring")
                .cell(Cell::new(7, [0.0, 0.0], 0.0))
                .cell_track(
                    CellId(7),
                    Property::Scale,
                    Timeline::from_values(1.5, &[0.9, 1.15, 0.9], Easing::EaseInOut)
                        .ok()?
                        .with_repeat(Repeat::Infinite),
                )
                .build();
            Some(ring)
        }
    }

    #[test]
    fn test_rapid_toggle_keeps_one_live_sequence() {
        let mut director = MotionDirector::new();
        let key = EffectKey::new("logo");
        director.attach_interaction(key.clone(), Hover);

        let enter = director.handle_interaction(&key, InteractionEvent::Enter, 0.0).unwrap().unwrap();
        director.tick(0.1);
        let leave = director.handle_interaction(&key, InteractionEvent::Leave, 0.2).unwrap().unwrap();
        assert_eq!(director.state(enter), Some(PlaybackState::Cancelled));
        assert!(director.live_handle(&key.child("loop")).is_none());

        let again = director.handle_interaction(&key, InteractionEvent::Enter, 0.2).unwrap().unwrap();
        assert_eq!(director.state(leave), Some(PlaybackState::Cancelled));
        assert_eq!(director.interaction_state(&key), Some(HoverState::Active));
        assert_eq!(director.live_handle(&key), Some(again));
        assert!(director.live_handle(&key.child("loop")).is_some());
        assert_eq!(director.live_count(), 2);

        // Enter sequence settles, machine stays Active, loop keeps going
        director.tick(5.0);
        assert_eq!(director.state(again), Some(PlaybackState::Completed));
        assert_eq!(director.interaction_state(&key), Some(HoverState::Active));
        assert!(director.live_handle(&key.child("loop")).is_some());

        assert!(director.handle_interaction(&key, InteractionEvent::Enter, 5.1).unwrap().is_none());
    }

    #[test]
    fn test_unknown_interaction_rejected() {
        let mut director = MotionDirector::new();
        let key = EffectKey::new("nobody");
        assert_eq!(
            director.set_interaction_state(&key, HoverState::Active, 0.0).unwrap_err(),
            MotionError::UnknownEffect(key)
        );
    }
}
