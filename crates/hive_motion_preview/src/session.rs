// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fixed-timestep playback of one effect.
//!
//! A session owns a [`MotionDirector`] and a [`ManualClock`] and advances
//! them by `1 / fps` per step, writing every tick report to its output. It
//! ends when the host-side completion action has run (loader dismissed,
//! outro navigated away, logo back at rest, page loader faded out) or when
//! the time limit is hit.

use crate::error::PreviewError;
use crate::settings::PreviewSettings;
use hive_motion_effects::{
    EffectKind, LoaderPresenter, LogoPresenter, OutroPresenter, PageLoaderPresenter, DISMISS_GRACE,
    EXIT_FADE,
};
use hive_motion_sequencer::{
    Clock, EffectFrame, EffectKey, Frame, InteractionEvent, ManualClock, MotionError, Mount,
    MotionDirector, Presenter, Sequence, SequenceHandle, TickReport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

/// Pointer events replayed against the logo, as (time, event)
pub const LOGO_SCRIPT: [(f32, InteractionEvent); 4] = [
    (0.0, InteractionEvent::Enter),
    (0.2, InteractionEvent::Leave),
    (0.25, InteractionEvent::Enter),
    (1.5, InteractionEvent::Leave),
];

/// How tick reports are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable line per tick
    #[default]
    Text,
    /// One JSON object per tick
    Json,
}

/// Outcome of a finished session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    /// Ticks run
    pub frames: u64,
    /// Simulated time at the end
    pub elapsed: f32,
    /// Whether the completion action ran before the time limit
    pub finished: bool,
    /// Whether the effect fell back to its static frame
    pub settled: bool,
}

/// Simulated playback of one effect
pub struct PreviewSession<W: Write> {
    director: MotionDirector,
    clock: ManualClock,
    timestep: f32,
    max_time: f32,
    frame_count: u64,
    format: OutputFormat,
    out: W,
    effect: EffectKind,
    key: EffectKey,
    script: Vec<(f32, InteractionEvent)>,
    logo: Option<LogoPresenter>,
    exit: Option<Sequence>,
    hidden: Rc<Cell<bool>>,
    done: Rc<Cell<bool>>,
    settled: bool,
}

impl<W: Write> PreviewSession<W> {
    /// Prepare a session for the effect named in `settings`
    pub fn new(settings: &PreviewSettings, format: OutputFormat, out: W) -> Result<Self, PreviewError> {
        settings.validate()?;
        let playback = &settings.playback;
        let effect = playback.effect;
        Ok(Self {
            director: MotionDirector::new(),
            clock: ManualClock::new(0.0),
            timestep: 1.0 / playback.fps as f32,
            max_time: playback.max_seconds,
            frame_count: 0,
            format,
            out,
            effect,
            key: effect.key(),
            script: Vec::new(),
            logo: None,
            exit: None,
            hidden: Rc::new(Cell::new(false)),
            done: Rc::new(Cell::new(false)),
            settled: false,
        })
    }

    /// Mount the effect and step until it finishes or the time limit is hit
    pub fn run(&mut self, settings: &PreviewSettings) -> Result<SessionSummary, PreviewError> {
        self.start(settings)?;
        while !self.is_finished() && self.clock.now() < self.max_time {
            self.step()?;
        }

        let summary = SessionSummary {
            frames: self.frame_count,
            elapsed: self.clock.now(),
            finished: self.is_finished(),
            settled: self.settled,
        };
        if summary.finished {
            tracing::info!(
                "{} finished after {} frames ({:.2}s)",
                self.key,
                summary.frames,
                summary.elapsed
            );
        } else {
            tracing::warn!("{} still running at the {:.2}s limit", self.key, self.max_time);
        }
        Ok(summary)
    }

    fn start(&mut self, settings: &PreviewSettings) -> Result<(), PreviewError> {
        let config = settings.motion.clone();
        let mut rng = StdRng::seed_from_u64(settings.playback.seed);
        let now = self.clock.now();

        match self.effect {
            EffectKind::Loader => {
                let presenter = LoaderPresenter::new(config, &mut rng);
                if let Some(handle) = self.mount(&presenter, now)? {
                    let done = Rc::clone(&self.done);
                    self.director.on_complete_after(handle, DISMISS_GRACE, move |_| {
                        tracing::info!("loader dismissed");
                        done.set(true);
                    })?;
                }
            }
            EffectKind::Outro => {
                let presenter = OutroPresenter::new(config, &mut rng);
                if let Some(handle) = self.mount(&presenter, now)? {
                    let done = Rc::clone(&self.done);
                    self.director.on_complete(handle, move |_| {
                        tracing::info!("outro finished, navigating away");
                        done.set(true);
                    })?;
                }
            }
            EffectKind::PageLoader => {
                let presenter = PageLoaderPresenter::new(config);
                if let Some(handle) = self.mount(&presenter, now)? {
                    self.exit = Some(presenter.exit_sequence()?);
                    let hidden = Rc::clone(&self.hidden);
                    self.director.on_complete(handle, move |_| hidden.set(true))?;
                    let done = Rc::clone(&self.done);
                    self.director.on_complete_after(handle, EXIT_FADE, move |_| {
                        tracing::info!("page loader unmounted");
                        done.set(true);
                    })?;
                }
            }
            EffectKind::Logo => {
                let presenter = LogoPresenter::new(config, settings.playback.logo_size);
                self.director.attach_interaction(self.key.clone(), presenter.clone());
                self.logo = Some(presenter);
                self.script = LOGO_SCRIPT.iter().rev().copied().collect();
            }
        }
        Ok(())
    }

    fn mount(&mut self, presenter: &dyn Presenter, now: f32) -> Result<Option<SequenceHandle>, PreviewError> {
        match self.director.mount(presenter, now) {
            Mount::Animated(handle) => Ok(Some(handle)),
            Mount::Settled(frame) => {
                self.settled = true;
                self.write_settled(frame)?;
                self.done.set(true);
                Ok(None)
            }
        }
    }

    /// Run one tick at the current time, then advance the clock
    pub fn step(&mut self) -> Result<(), PreviewError> {
        let now = self.clock.now();
        while self.script.last().is_some_and(|(at, _)| *at <= now) {
            if let Some((_, event)) = self.script.pop() {
                self.interact(event, now)?;
            }
        }

        let report = self.director.tick(now);
        self.write_report(&report)?;

        if self.hidden.replace(false) {
            if let Some(exit) = self.exit.take() {
                self.director.start(self.key.child("exit"), exit, now);
            }
        }

        if self.effect == EffectKind::Logo && self.script.is_empty() && self.director.is_idle() {
            self.done.set(true);
        }

        self.frame_count += 1;
        self.clock.advance(self.timestep);
        Ok(())
    }

    fn interact(&mut self, event: InteractionEvent, now: f32) -> Result<(), PreviewError> {
        match self.director.handle_interaction(&self.key, event, now) {
            Ok(_) => Ok(()),
            Err(err @ MotionError::UnknownEffect(_)) => Err(err.into()),
            Err(err) => {
                // The new state stands; show it without animation
                tracing::debug!("{}: {err}", self.key);
                let Some(logo) = &self.logo else {
                    return Err(err.into());
                };
                let frame = logo.resting_frame(event.target_state());
                self.settled = true;
                self.write_settled(frame)
            }
        }
    }

    /// Whether the completion action has run
    pub fn is_finished(&self) -> bool {
        self.done.get()
    }

    /// Number of ticks run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Consume the session and return its output
    pub fn into_output(self) -> W {
        self.out
    }

    fn write_report(&mut self, report: &TickReport) -> Result<(), PreviewError> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, report)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                write!(self.out, "{:>5} t={:.3}", self.frame_count, report.now)?;
                for effect in report.frames.values() {
                    write!(
                        self.out,
                        " | {}: {} cells, {} ornaments",
                        effect.key,
                        effect.frame.cells.len(),
                        effect.frame.ornaments.len()
                    )?;
                    for phase in &effect.frame.phases {
                        write!(self.out, " [{phase}]")?;
                    }
                }
                if !report.completed.is_empty() {
                    write!(self.out, " | completed {}", report.completed.len())?;
                }
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn write_settled(&mut self, frame: Frame) -> Result<(), PreviewError> {
        match self.format {
            OutputFormat::Json => {
                let settled = EffectFrame {
                    key: self.key.clone(),
                    frame,
                };
                serde_json::to_writer(&mut self.out, &settled)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => {
                writeln!(
                    self.out,
                    "settled {}: {} cells, {} ornaments",
                    self.key,
                    frame.cells.len(),
                    frame.ornaments.len()
                )?;
            }
        }
        Ok(())
    }
}
