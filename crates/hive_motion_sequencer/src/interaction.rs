// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer-driven Idle/Active state machine.
//!
//! The machine only decides *what* to play. Starting and cancelling the
//! sequences is left to the [`MotionDirector`](crate::director::MotionDirector),
//! which applies the one-live-sequence-per-effect rule.
//!
//! A leave that interrupts an in-flight enter snaps: the leave sequence starts
//! from the Active resting values, not from the interrupted values.

use crate::error::Result;
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// Hover state of an interactive effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HoverState {
    /// Pointer outside
    #[default]
    Idle,
    /// Pointer inside
    Active,
}

/// Pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// Pointer entered
    Enter,
    /// Pointer left
    Leave,
}

impl InteractionEvent {
    /// State implied by this event
    pub fn target_state(&self) -> HoverState {
        match self {
            InteractionEvent::Enter => HoverState::Active,
            InteractionEvent::Leave => HoverState::Idle,
        }
    }
}

/// Supplies the sequences an interactive effect plays
pub trait InteractivePresenter {
    /// Idle to Active visual
    fn enter_sequence(&self) -> Result<Sequence>;

    /// Active to Idle visual
    fn leave_sequence(&self) -> Result<Sequence>;

    /// Decorative loop kept running only while Active
    fn active_loop(&self) -> Option<Result<Sequence>> {
        None
    }
}

/// What to play after a state change
#[derive(Debug)]
pub struct Transition {
    /// New state
    pub to: HoverState,
    /// Bounded enter or leave sequence
    pub sequence: Result<Sequence>,
    /// Loop to start when entering Active
    pub active_loop: Option<Result<Sequence>>,
}

/// Two-state hover machine
pub struct InteractionMachine {
    state: HoverState,
    presenter: Box<dyn InteractivePresenter>,
}

impl InteractionMachine {
    /// Create an idle machine
    pub fn new(presenter: Box<dyn InteractivePresenter>) -> Self {
        Self {
            state: HoverState::Idle,
            presenter,
        }
    }

    /// Apply an event
    pub fn handle(&mut self, event: InteractionEvent) -> Option<Transition> {
        self.transition(event.target_state())
    }

    /// Move to `target`; `None` when already there
    pub fn transition(&mut self, target: HoverState) -> Option<Transition> {
        if self.state == target {
            return None;
        }
        self.state = target;
        Some(match target {
            HoverState::Active => Transition {
                to: target,
                sequence: self.presenter.enter_sequence(),
                active_loop: self.presenter.active_loop(),
            },
            HoverState::Idle => Transition {
                to: target,
                sequence: self.presenter.leave_sequence(),
                active_loop: None,
            },
        })
    }

    /// Current state
    pub fn state(&self) -> HoverState {
        self.state
    }
}

impl std::fmt::Debug for InteractionMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionMachine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
