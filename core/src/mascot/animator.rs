//! Mascot Animator
//!
//! Two independent idle loops drive the mascot:
//!
//! - **Blink**: wait a random interval, close the eyes briefly, reschedule.
//! - **Talk**: wait a random interval, then with some probability move the
//!   mouth a few times; reschedule either way.
//!
//! Both loops share one guard: while any animation plays, a new blink or talk
//! is dropped (never queued). A loop whose trigger was dropped simply waits
//! for its next interval.
//!
//! # Design Philosophy
//!
//! The animator is a plain state machine. It never sleeps and never spawns;
//! every delay goes through a [`TimerService`] and comes back as a
//! [`MascotTimer`] fed to [`MascotAnimator::on_timer`]. Tests drive it with
//! [`ManualTimers`](crate::timers::ManualTimers) and a seeded RNG, production
//! drives it with [`spawn_mascot`](super::spawn_mascot).

use std::ops::Range;
use std::time::Duration;

use rand::Rng;

use super::element::MascotElement;
use super::frames::{Frame, MascotFrames, MascotTiming, SkinMode, ROCKING_CLASS};
use crate::timers::{TimerId, TimerService};

/// Who asked for an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// An idle loop; the loop reschedules when the animation ends
    Loop,
    /// A click or an explicit call; nothing is rescheduled
    Manual,
}

/// Timer events the animator schedules for itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MascotTimer {
    /// Blink interval elapsed
    BlinkDue,
    /// Eyes should open again
    BlinkEnd {
        /// Who started the blink
        trigger: Trigger,
    },
    /// Talk interval elapsed
    TalkDue,
    /// Next frame swap of a talk
    TalkStep {
        /// Swaps done so far
        step: u16,
        /// Who started the talk
        trigger: Trigger,
    },
    /// Rocking should stop
    RockEnd {
        /// Who started the rock
        trigger: Trigger,
    },
}

/// What the mascot is doing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MascotPhase {
    /// Nothing playing
    #[default]
    Idle,
    /// Eyes closed
    Blinking,
    /// Frame-based talk in progress
    Talking {
        /// Swaps done so far
        step: u16,
    },
    /// Rocking class applied
    Rocking,
}

/// Outcome of asking for an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Animation {
    /// The animation is now playing
    Started,
    /// Another animation was playing; the request was dropped
    Dropped,
    /// The current skin has no such animation (blink with a non-default skin)
    Skipped,
    /// No element, paused or torn down
    Inactive,
}

/// Idle animation state machine for one mascot element
#[derive(Debug)]
pub struct MascotAnimator<E, R> {
    element: Option<E>,
    frames: MascotFrames,
    timing: MascotTiming,
    mode: SkinMode,
    phase: MascotPhase,
    rng: R,
    blink_timer: Option<TimerId>,
    talk_timer: Option<TimerId>,
    anim_timer: Option<TimerId>,
    paused: bool,
    torn_down: bool,
}

impl<E: MascotElement, R: Rng> MascotAnimator<E, R> {
    /// Create an animator. A `None` element yields an inert animator.
    pub fn new(element: Option<E>, frames: MascotFrames, timing: MascotTiming, rng: R) -> Self {
        if element.is_none() {
            tracing::debug!("Mascot element missing; animator inactive");
        }
        Self {
            element,
            frames,
            timing,
            mode: SkinMode::Frames,
            phase: MascotPhase::Idle,
            rng,
            blink_timer: None,
            talk_timer: None,
            anim_timer: None,
            paused: false,
            torn_down: false,
        }
    }

    /// Set the initial skin mode
    #[must_use]
    pub fn with_mode(mut self, mode: SkinMode) -> Self {
        self.mode = mode;
        self
    }

    /// Current phase
    pub fn phase(&self) -> MascotPhase {
        self.phase
    }

    /// Whether an animation is playing
    pub fn is_animating(&self) -> bool {
        self.phase != MascotPhase::Idle
    }

    /// Current skin mode
    pub fn mode(&self) -> SkinMode {
        self.mode
    }

    /// Change the skin mode. Takes effect from the next frame swap.
    pub fn set_skin_mode(&mut self, mode: SkinMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "Mascot skin mode changed");
        }
        self.mode = mode;
    }

    fn active(&self) -> bool {
        self.element.is_some() && !self.paused && !self.torn_down
    }

    /// Start both idle loops
    pub fn start(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        if !self.active() {
            return;
        }
        if self.blink_timer.is_none() {
            self.schedule_blink(timers);
        }
        if self.talk_timer.is_none() {
            self.schedule_talk(timers);
        }
    }

    /// Blink once, outside the idle loop
    pub fn blink(&mut self, timers: &mut impl TimerService<MascotTimer>) -> Animation {
        self.begin_blink(Trigger::Manual, timers)
    }

    /// Talk once, outside the idle loop
    pub fn talk(&mut self, timers: &mut impl TimerService<MascotTimer>) -> Animation {
        self.begin_talk(Trigger::Manual, timers)
    }

    /// The element was clicked
    pub fn click(&mut self, timers: &mut impl TimerService<MascotTimer>) -> Animation {
        self.talk(timers)
    }

    /// Handle a fired timer. Stale or post-teardown timers are ignored.
    pub fn on_timer(
        &mut self,
        id: TimerId,
        timer: MascotTimer,
        timers: &mut impl TimerService<MascotTimer>,
    ) {
        if !self.active() {
            return;
        }

        match timer {
            MascotTimer::BlinkDue => {
                if self.blink_timer != Some(id) {
                    return;
                }
                self.blink_timer = None;
                if self.begin_blink(Trigger::Loop, timers) != Animation::Started {
                    self.schedule_blink(timers);
                }
            }
            MascotTimer::TalkDue => {
                if self.talk_timer != Some(id) {
                    return;
                }
                self.talk_timer = None;
                let p = self.timing.talk_probability.clamp(0.0, 1.0);
                if !self.rng.gen_bool(p)
                    || self.begin_talk(Trigger::Loop, timers) != Animation::Started
                {
                    self.schedule_talk(timers);
                }
            }
            MascotTimer::BlinkEnd { trigger } => {
                if self.anim_timer != Some(id) {
                    return;
                }
                self.anim_timer = None;
                self.set_frame(Frame::Default);
                self.finish(trigger, timers);
            }
            MascotTimer::TalkStep { step, trigger } => {
                if self.anim_timer != Some(id) {
                    return;
                }
                self.anim_timer = None;
                self.talk_step(step, trigger, timers);
            }
            MascotTimer::RockEnd { trigger } => {
                if self.anim_timer != Some(id) {
                    return;
                }
                self.anim_timer = None;
                if let Some(element) = self.element.as_mut() {
                    element.remove_class(ROCKING_CLASS);
                }
                self.finish(trigger, timers);
            }
        }
    }

    /// Stop both loops and any animation, restoring the resting look.
    /// [`resume`](Self::resume) restarts the loops.
    pub fn pause(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        self.halt(timers);
        self.paused = true;
    }

    /// Restart the loops after [`pause`](Self::pause)
    pub fn resume(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.start(timers);
    }

    /// Cancel every pending timer for good. Later timers and calls are no-ops.
    pub fn teardown(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        self.halt(timers);
        self.torn_down = true;
        tracing::debug!("Mascot animator torn down");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn halt(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        for id in [
            self.blink_timer.take(),
            self.talk_timer.take(),
            self.anim_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            timers.cancel(id);
        }

        match self.phase {
            MascotPhase::Blinking | MascotPhase::Talking { .. } => self.set_frame(Frame::Default),
            MascotPhase::Rocking => {
                if let Some(element) = self.element.as_mut() {
                    element.remove_class(ROCKING_CLASS);
                }
            }
            MascotPhase::Idle => {}
        }
        self.phase = MascotPhase::Idle;
    }

    fn random_delay(&mut self, window: Range<u64>) -> Duration {
        let ms = if window.is_empty() {
            window.start
        } else {
            self.rng.gen_range(window)
        };
        Duration::from_millis(ms)
    }

    fn schedule_blink(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        let delay = self.random_delay(self.timing.blink_window());
        self.blink_timer = Some(timers.schedule(delay, MascotTimer::BlinkDue));
    }

    fn schedule_talk(&mut self, timers: &mut impl TimerService<MascotTimer>) {
        let delay = self.random_delay(self.timing.talk_window());
        self.talk_timer = Some(timers.schedule(delay, MascotTimer::TalkDue));
    }

    fn schedule_anim(
        &mut self,
        ms: u64,
        timer: MascotTimer,
        timers: &mut impl TimerService<MascotTimer>,
    ) {
        self.anim_timer = Some(timers.schedule(Duration::from_millis(ms), timer));
    }

    fn set_frame(&mut self, frame: Frame) {
        // Skin artwork is never overwritten by base-skin frames
        if self.mode == SkinMode::Rocking {
            return;
        }
        if let Some(element) = self.element.as_mut() {
            element.set_image(self.frames.path(frame));
        }
    }

    fn begin_blink(
        &mut self,
        trigger: Trigger,
        timers: &mut impl TimerService<MascotTimer>,
    ) -> Animation {
        if !self.active() {
            return Animation::Inactive;
        }
        if self.is_animating() {
            return Animation::Dropped;
        }
        if self.mode == SkinMode::Rocking {
            return Animation::Skipped;
        }

        self.phase = MascotPhase::Blinking;
        self.set_frame(Frame::Blinking);
        self.schedule_anim(self.timing.blink_ms, MascotTimer::BlinkEnd { trigger }, timers);
        Animation::Started
    }

    fn begin_talk(
        &mut self,
        trigger: Trigger,
        timers: &mut impl TimerService<MascotTimer>,
    ) -> Animation {
        if !self.active() {
            return Animation::Inactive;
        }
        if self.is_animating() {
            return Animation::Dropped;
        }

        match self.mode {
            SkinMode::Rocking => {
                self.phase = MascotPhase::Rocking;
                if let Some(element) = self.element.as_mut() {
                    element.add_class(ROCKING_CLASS);
                }
                self.schedule_anim(self.timing.rock_ms, MascotTimer::RockEnd { trigger }, timers);
            }
            SkinMode::Frames => {
                if self.timing.talk_repetitions == 0 {
                    return Animation::Skipped;
                }
                self.phase = MascotPhase::Talking { step: 0 };
                self.set_frame(Frame::Talking);
                self.schedule_anim(
                    self.timing.talk_frame_ms,
                    MascotTimer::TalkStep { step: 1, trigger },
                    timers,
                );
            }
        }
        Animation::Started
    }

    /// Odd steps close the mouth, even steps open it again or finish
    fn talk_step(
        &mut self,
        step: u16,
        trigger: Trigger,
        timers: &mut impl TimerService<MascotTimer>,
    ) {
        self.phase = MascotPhase::Talking { step };

        if step % 2 == 1 {
            self.set_frame(Frame::Default);
            self.schedule_anim(
                self.timing.talk_gap_ms,
                MascotTimer::TalkStep {
                    step: step + 1,
                    trigger,
                },
                timers,
            );
        } else if step / 2 < u16::from(self.timing.talk_repetitions) {
            self.set_frame(Frame::Talking);
            self.schedule_anim(
                self.timing.talk_frame_ms,
                MascotTimer::TalkStep {
                    step: step + 1,
                    trigger,
                },
                timers,
            );
        } else {
            self.finish(trigger, timers);
        }
    }

    fn finish(&mut self, trigger: Trigger, timers: &mut impl TimerService<MascotTimer>) {
        let was = self.phase;
        self.phase = MascotPhase::Idle;

        if trigger == Trigger::Loop {
            match was {
                MascotPhase::Blinking => self.schedule_blink(timers),
                MascotPhase::Talking { .. } | MascotPhase::Rocking => self.schedule_talk(timers),
                MascotPhase::Idle => {}
            }
        }
    }
}
