// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the rescan loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! scheduler, the overlay renderer, and the coordinator call as they work.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] owns an optional boxed sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead) and the
//! sink is dropped at construction. When **on**, each method performs a
//! single `Option` branch before dispatching.
//!
//! Sinks are handed over by value. To inspect a sink after handing it over,
//! wrap it in `Rc<RefCell<_>>`; the shared handle implements [`TraceSink`]
//! too.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a single [`run`](crate::scheduler::RescanScheduler::run) call, or a
/// deferred timer firing, did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RescanKind {
    /// The quiet period had elapsed; the immediate task ran synchronously.
    Immediate,
    /// A burst was detected; the deferred task was scheduled.
    Scheduled,
    /// A deferred task was already pending; the event was folded into it.
    Coalesced,
    /// The pending deferred task fired.
    Deferred,
}

/// Which overlay write happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayChange {
    /// Border and label nodes were created for a target.
    Added,
    /// Border and label nodes were detached.
    Removed,
    /// Border and label were moved to the target's current layout box.
    Repositioned,
    /// Border and label were rebuilt with a new style.
    Restyled,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted whenever the scheduler's pause window changes, and once with the
/// current window when a sink is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PauseChangedEvent {
    /// New pause window.
    pub pause: Duration,
    /// Host time of the change.
    pub at: HostTime,
}

/// Emitted for every scheduler decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RescanEvent {
    /// What happened.
    pub kind: RescanKind,
    /// Pause window in effect after the decision.
    pub pause: Duration,
    /// Host time of the decision.
    pub at: HostTime,
}

/// Emitted for every overlay DOM write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayEvent {
    /// Which write.
    pub change: OverlayChange,
    /// Registry slot of the affected overlay.
    pub slot: usize,
    /// Whether the overlay belongs to a guessed landmark.
    pub guessed: bool,
}

/// Emitted once per observed mutation batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutationBatchEvent {
    /// Whether the batch was caused by the overlay renderer itself (and was
    /// therefore ignored).
    pub self_induced: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the rescan loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when the pause window changes.
    fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
        _ = e;
    }

    /// Called for every scheduler decision.
    fn on_rescan(&mut self, e: &RescanEvent) {
        _ = e;
    }

    /// Called for every overlay write.
    fn on_overlay(&mut self, e: &OverlayEvent) {
        _ = e;
    }

    /// Called once per observed mutation batch.
    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        _ = e;
    }
}

impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
    fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
        self.borrow_mut().on_pause_changed(e);
    }

    fn on_rescan(&mut self, e: &RescanEvent) {
        self.borrow_mut().on_rescan(e);
    }

    fn on_overlay(&mut self, e: &OverlayEvent) {
        self.borrow_mut().on_overlay(e);
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        self.borrow_mut().on_mutation_batch(e);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin owner of an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Emits a [`PauseChangedEvent`].
    #[inline]
    pub fn pause_changed(&mut self, e: &PauseChangedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_pause_changed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RescanEvent`].
    #[inline]
    pub fn rescan(&mut self, e: &RescanEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rescan(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OverlayEvent`].
    #[inline]
    pub fn overlay(&mut self, e: &OverlayEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_overlay(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MutationBatchEvent`].
    #[inline]
    pub fn mutation_batch(&mut self, e: &MutationBatchEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_mutation_batch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_pause_changed(&PauseChangedEvent {
            pause: Duration(500),
            at: HostTime(0),
        });
        sink.on_rescan(&RescanEvent {
            kind: RescanKind::Immediate,
            pause: Duration(500),
            at: HostTime(0),
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.overlay(&OverlayEvent {
            change: OverlayChange::Added,
            slot: 0,
            guessed: false,
        });
        tracer.mutation_batch(&MutationBatchEvent {
            self_induced: true,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_shared_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            pauses: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
                self.pauses.push(e.pause.as_millis());
            }
        }

        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let mut tracer = Tracer::new(Box::new(Rc::clone(&sink)));
        tracer.pause_changed(&PauseChangedEvent {
            pause: Duration(750),
            at: HostTime(10),
        });
        drop(tracer);
        assert_eq!(sink.borrow().pauses, &[750]);
    }
}
