// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive rescan scheduling with exponential backoff and linear decay.
//!
//! The [`RescanScheduler`] turns a bursty stream of "something changed"
//! events into a rate-limited stream of rescans. Isolated events run the
//! caller's immediate task synchronously; events that arrive inside the
//! current pause window grow the window and defer a single task to the end
//! of it. Once a deferred task has fired, the window relaxes back toward the
//! minimum in fixed steps.
//!
//! Timers are provided by the host through [`TimerHost`], so the scheduler
//! runs unchanged against `setTimeout` in a browser or a virtual clock in
//! tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut scheduler = RescanScheduler::new(SchedulerConfig::standard(), host, |pause| {
//!     observer_throttle.set(pause);
//! });
//!
//! // Once per observed change batch:
//! scheduler.run(|| page_hidden(), || rescan(), move || rescan_later());
//!
//! // From the host's timer callback:
//! scheduler.timer_fired(handle);
//! ```

use alloc::boxed::Box;

use crate::time::{Duration, HostTime};
use crate::trace::{PauseChangedEvent, RescanEvent, RescanKind, TraceSink, Tracer};

/// Identifies a timer armed through [`TimerHost::set_timer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Clock and one-shot timers supplied by the host environment.
///
/// When a timer armed with [`set_timer`](Self::set_timer) elapses, the host
/// must call [`RescanScheduler::timer_fired`] with the returned handle (or,
/// for hosts that share the scheduler behind a `RefCell`, the split
/// [`take_deferred_task`](RescanScheduler::take_deferred_task) /
/// [`complete_deferred_task`](RescanScheduler::complete_deferred_task) pair).
/// A cleared timer must not be reported.
pub trait TimerHost {
    /// Returns the current host time.
    fn now(&self) -> HostTime;

    /// Arms a one-shot timer that elapses after `delay`.
    fn set_timer(&mut self, delay: Duration) -> TimerHandle;

    /// Cancels a timer that has not elapsed yet.
    fn clear_timer(&mut self, handle: TimerHandle);
}

/// Configuration for the [`RescanScheduler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Smallest (and initial) pause window.
    pub min_pause: Duration,
    /// Largest pause window.
    pub max_pause: Duration,
    /// Growth factor applied to the pause window when a burst is detected.
    pub multiplier: f64,
    /// Amount removed from the pause window on each decay step.
    pub decrement: Duration,
    /// Time between decay steps.
    pub decay_interval: Duration,
}

impl SchedulerConfig {
    /// Default configuration: 500 ms to 60 s, ×1.5 growth, −500 ms per second
    /// of quiet.
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(Duration(500), Duration(60_000), 1.5)
    }

    /// Builds a configuration from its bounds and growth factor.
    ///
    /// The decay step equals `min_pause` and decay runs every
    /// `2 × min_pause`.
    #[must_use]
    pub const fn new(min_pause: Duration, max_pause: Duration, multiplier: f64) -> Self {
        Self {
            min_pause,
            max_pause,
            multiplier,
            decrement: min_pause,
            decay_interval: Duration(min_pause.0 * 2),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// What a single [`RescanScheduler::run`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// `ignore_check` vetoed the event.
    Ignored,
    /// The immediate task ran synchronously.
    Immediate,
    /// The pause window grew and the deferred task was scheduled.
    Scheduled,
    /// A deferred task was already pending; nothing happened.
    Coalesced,
}

/// Mutable timing state. Only the scheduler's own handlers touch it.
#[derive(Clone, Copy, Debug)]
struct PauseState {
    pause: Duration,
    last_event: HostTime,
    decay_timer: Option<TimerHandle>,
    deferred_timer: Option<TimerHandle>,
    task_scheduled: bool,
}

type DeferredTask = Box<dyn FnOnce()>;
type PauseHook = Box<dyn FnMut(Duration)>;

/// Debounce/backoff state machine driving landmark rescans.
///
/// # Pause window
///
/// The pause window starts at [`SchedulerConfig::min_pause`]. An event that
/// arrives more than one window after the last immediately-processed event
/// takes the fast path. An event inside the window grows it by
/// [`SchedulerConfig::multiplier`] (bounded by
/// [`SchedulerConfig::max_pause`]) and schedules the deferred task for the
/// end of the new window. Further events are folded into that pending task.
///
/// # Decay
///
/// After each deferred task fires, the window shrinks by
/// [`SchedulerConfig::decrement`] every [`SchedulerConfig::decay_interval`]
/// until it is back at the minimum. A new burst cancels a running decay
/// before growing the window.
///
/// Every change of the window, and the initial value, is reported to the
/// `pause_changed` hook. The hook and the caller's tasks run while the
/// scheduler is mutably borrowed; they must not call back into it.
pub struct RescanScheduler<H: TimerHost> {
    config: SchedulerConfig,
    host: H,
    state: PauseState,
    deferred: Option<DeferredTask>,
    pause_changed: PauseHook,
    tracer: Tracer,
}

impl<H: TimerHost> core::fmt::Debug for RescanScheduler<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RescanScheduler")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("deferred", &self.deferred.is_some())
            .finish_non_exhaustive()
    }
}

impl<H: TimerHost> RescanScheduler<H> {
    /// Creates a scheduler and reports the initial pause window to
    /// `pause_changed`.
    ///
    /// # Panics
    ///
    /// Panics if `min_pause` is zero or exceeds `max_pause`, or if
    /// `multiplier` is below 1.
    pub fn new(
        config: SchedulerConfig,
        host: H,
        pause_changed: impl FnMut(Duration) + 'static,
    ) -> Self {
        assert!(config.min_pause > Duration::ZERO, "min_pause must be positive");
        assert!(
            config.min_pause <= config.max_pause,
            "min_pause must not exceed max_pause"
        );
        assert!(config.multiplier >= 1.0, "multiplier must be at least 1");

        let now = host.now();
        let mut scheduler = Self {
            config,
            host,
            state: PauseState {
                pause: config.min_pause,
                last_event: now,
                decay_timer: None,
                deferred_timer: None,
                task_scheduled: false,
            },
            deferred: None,
            pause_changed: Box::new(pause_changed),
            tracer: Tracer::none(),
        };
        (scheduler.pause_changed)(scheduler.state.pause);
        scheduler
    }

    /// Routes scheduler events to `sink` (requires the `trace` feature to
    /// have any effect).
    ///
    /// The current pause window is reported to the new sink right away, so
    /// its pause history starts at attachment time.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
        self.tracer.pause_changed(&PauseChangedEvent {
            pause: self.state.pause,
            at: self.host.now(),
        });
    }

    /// Processes one change event.
    ///
    /// Exactly one of the following happens: the event is ignored
    /// (`ignore_check` returned `true`), `immediate` runs synchronously, the
    /// window grows and `deferred` is scheduled, or the event is folded into
    /// an already pending deferred task. Tasks that are not used are dropped.
    pub fn run(
        &mut self,
        ignore_check: impl FnOnce() -> bool,
        immediate: impl FnOnce(),
        deferred: impl FnOnce() + 'static,
    ) -> RunOutcome {
        if ignore_check() {
            return RunOutcome::Ignored;
        }

        let now = self.host.now();
        let (outcome, kind) = if now > self.state.last_event.saturating_add(self.state.pause) {
            immediate();
            self.state.last_event = now;
            (RunOutcome::Immediate, RescanKind::Immediate)
        } else if !self.state.task_scheduled {
            self.stop_decay();
            self.grow_pause();
            self.deferred = Some(Box::new(deferred));
            self.state.deferred_timer = Some(self.host.set_timer(self.state.pause));
            self.state.task_scheduled = true;
            (RunOutcome::Scheduled, RescanKind::Scheduled)
        } else {
            (RunOutcome::Coalesced, RescanKind::Coalesced)
        };

        self.tracer.rescan(&RescanEvent {
            kind,
            pause: self.state.pause,
            at: now,
        });
        outcome
    }

    /// Handles an elapsed timer.
    ///
    /// For the deferred-task timer this runs the task, starts decay, and then
    /// allows a new task to be scheduled. For the decay timer it performs one
    /// decay step. Handles of timers the scheduler no longer tracks are
    /// ignored.
    pub fn timer_fired(&mut self, handle: TimerHandle) {
        if let Some(task) = self.take_deferred_task(handle) {
            task();
            self.complete_deferred_task();
        } else if self.state.decay_timer == Some(handle) {
            self.state.decay_timer = None;
            self.decay_step();
        }
    }

    /// First half of a deferred-timer firing, for hosts that must run the
    /// task without holding a borrow of the scheduler.
    ///
    /// Returns the pending task if `handle` is the deferred-task timer. The
    /// caller must run it and then call
    /// [`complete_deferred_task`](Self::complete_deferred_task).
    pub fn take_deferred_task(&mut self, handle: TimerHandle) -> Option<Box<dyn FnOnce()>> {
        if self.state.deferred_timer != Some(handle) {
            return None;
        }
        self.state.deferred_timer = None;
        let task = self.deferred.take();
        if task.is_some() {
            self.tracer.rescan(&RescanEvent {
                kind: RescanKind::Deferred,
                pause: self.state.pause,
                at: self.host.now(),
            });
        }
        task
    }

    /// Second half of a deferred-timer firing: starts decay and clears the
    /// pending-task flag.
    pub fn complete_deferred_task(&mut self) {
        if !self.state.task_scheduled || self.state.deferred_timer.is_some() {
            return;
        }
        self.start_decay();
        self.state.task_scheduled = false;
    }

    /// Returns the current pause window.
    #[must_use]
    pub fn pause_time(&self) -> Duration {
        self.state.pause
    }

    /// Returns whether a deferred task is pending.
    #[must_use]
    pub fn is_task_scheduled(&self) -> bool {
        self.state.task_scheduled
    }

    /// Returns whether the pause window is currently decaying.
    #[must_use]
    pub fn is_decaying(&self) -> bool {
        self.state.decay_timer.is_some()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns a reference to the timer host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns a mutable reference to the timer host.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn grow_pause(&mut self) {
        // Truncation of a positive product is the floor.
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the grown pause is clamped to max_pause right after"
        )]
        let grown = (self.state.pause.0 as f64 * self.config.multiplier) as u64;
        self.set_pause(Duration(grown).min(self.config.max_pause));
    }

    fn start_decay(&mut self) {
        self.stop_decay();
        self.state.decay_timer = Some(self.host.set_timer(self.config.decay_interval));
    }

    fn stop_decay(&mut self) {
        if let Some(handle) = self.state.decay_timer.take() {
            self.host.clear_timer(handle);
        }
    }

    fn decay_step(&mut self) {
        let reduced = self.state.pause.saturating_sub(self.config.decrement);
        if reduced <= self.config.min_pause {
            self.set_pause(self.config.min_pause);
        } else {
            self.set_pause(reduced);
            self.state.decay_timer = Some(self.host.set_timer(self.config.decay_interval));
        }
    }

    fn set_pause(&mut self, pause: Duration) {
        self.state.pause = pause;
        (self.pause_changed)(pause);
        self.tracer.pause_changed(&PauseChangedEvent {
            pause,
            at: self.host.now(),
        });
    }
}

impl<H: TimerHost> Drop for RescanScheduler<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.state.deferred_timer.take() {
            self.host.clear_timer(handle);
        }
        self.stop_decay();
    }
}
