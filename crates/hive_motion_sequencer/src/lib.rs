// SPDX-License-Identifier: MIT OR Apache-2.0
//! Honeycomb motion sequencing core.
//!
//! This crate turns declarative keyframe data into per-tick render payloads:
//! - Keyframed timelines with easing and repeat
//! - Multi-cell sequences with staggered start delays
//! - Phase markers for named sub-phases
//! - One-shot completion signals with grace periods
//! - Hover (Idle/Active) interaction machine
//!
//! ## Architecture
//!
//! The core is built on:
//! - Pure timeline evaluation (`value_at`)
//! - Validated sequences built once, sampled many times
//! - A [`MotionDirector`] driven by the host's tick, one `now` per tick
//! - Injected clocks, no hidden timers

pub mod binding;
pub mod clock;
pub mod director;
pub mod error;
pub mod frame;
pub mod interaction;
pub mod keyframe;
pub mod sequence;
pub mod signal;
pub mod timeline;

pub use binding::{Binding, CellId, Property, Target};
pub use clock::{Clock, ManualClock, SystemClock};
pub use director::{
    CancelOutcome, EffectFrame, EffectKey, Mount, MotionDirector, Presenter, SequenceHandle,
    TickReport,
};
pub use error::{MotionError, Result};
pub use frame::{Frame, VisualAttributes};
pub use interaction::{HoverState, InteractionEvent, InteractionMachine, InteractivePresenter, Transition};
pub use keyframe::{Easing, Interpolation, Keyframe, KeyframeValue, ValueKind};
pub use sequence::{
    Cell, Ornament, PhaseMarker, Playback, PlaybackState, Sequence, SequenceBuilder, Track, TIME_EPSILON,
};
pub use signal::{CompletionCallback, CompletionSignal, DueCallback, SignalState};
pub use timeline::{even_offsets, Repeat, Timeline};
