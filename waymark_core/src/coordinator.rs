// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glue between page mutations, the rescan scheduler, landmark discovery,
//! and the overlay renderer.
//!
//! ```text
//! mutation batch ──► on_mutations ──► self-induced? ──yes──► dropped
//!                                         │ no
//!                                         ▼
//!                               RescanScheduler::run
//!                                  │             │
//!                          immediate task   deferred task (timer)
//!                                  │             │
//!                                  ▼             ▼
//!                        discover ─► OverlayRenderer::reconcile
//!                                         ─► OverlayRenderer::refresh_positions
//! ```
//!
//! The renderer and scheduler are shared (`Rc<RefCell<_>>`) because the
//! deferred task and host callbacks (timers, resize) need to reach them
//! outside of a coordinator call.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::contrast::{ContrastEvaluator, WcagContrast};
use crate::overlay::{OverlayDocument, OverlayRenderer, OverlayTarget};
use crate::scheduler::{RescanScheduler, RunOutcome, TimerHost};
use crate::settings::SettingsChange;
use crate::trace::{MutationBatchEvent, TraceSink, Tracer};

/// Landmark discovery: returns the current desired overlay set.
pub type Discovery<E> = Rc<dyn Fn() -> Vec<OverlayTarget<E>>>;

/// Runs landmark discovery in response to page changes and feeds the result
/// to an [`OverlayRenderer`], rate-limited by a [`RescanScheduler`].
pub struct RescanCoordinator<D, H, C = WcagContrast>
where
    D: OverlayDocument,
    H: TimerHost,
    C: ContrastEvaluator,
{
    renderer: Rc<RefCell<OverlayRenderer<D, C>>>,
    scheduler: Rc<RefCell<RescanScheduler<H>>>,
    discover: Discovery<D::Element>,
    tracer: Tracer,
}

impl<D, H, C> core::fmt::Debug for RescanCoordinator<D, H, C>
where
    D: OverlayDocument,
    H: TimerHost,
    C: ContrastEvaluator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RescanCoordinator")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl<D, H, C> RescanCoordinator<D, H, C>
where
    D: OverlayDocument + 'static,
    H: TimerHost,
    C: ContrastEvaluator + 'static,
{
    /// Creates a coordinator over a shared renderer and scheduler.
    pub fn new(
        renderer: Rc<RefCell<OverlayRenderer<D, C>>>,
        scheduler: Rc<RefCell<RescanScheduler<H>>>,
        discover: impl Fn() -> Vec<OverlayTarget<D::Element>> + 'static,
    ) -> Self {
        Self {
            renderer,
            scheduler,
            discover: Rc::new(discover),
            tracer: Tracer::none(),
        }
    }

    /// Routes mutation batch events to `sink` (requires the `trace` feature
    /// to have any effect).
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Reacts to one batch of observed page mutations.
    ///
    /// The renderer's self-mutation flag is consumed exactly once per call.
    /// If it was set, the batch was caused by overlay writes and is dropped
    /// without consulting the scheduler ([`RunOutcome::Ignored`]). Otherwise
    /// the scheduler decides between an immediate rescan and a deferred one.
    /// Both run discovery, reconcile, and then refresh the positions of the
    /// overlays that were kept.
    ///
    /// # Panics
    ///
    /// Panics if the renderer or scheduler is already borrowed.
    pub fn on_mutations(&mut self, ignore_check: impl FnOnce() -> bool) -> RunOutcome {
        let self_induced = self.renderer.borrow_mut().consume_self_mutation_flag();
        self.tracer
            .mutation_batch(&MutationBatchEvent { self_induced });
        if self_induced {
            return RunOutcome::Ignored;
        }

        let immediate = rescan_task(Rc::clone(&self.renderer), Rc::clone(&self.discover));
        let deferred = rescan_task(Rc::clone(&self.renderer), Rc::clone(&self.discover));
        self.scheduler
            .borrow_mut()
            .run(ignore_check, immediate, deferred)
    }

    /// Runs discovery and reconciliation now, bypassing the scheduler.
    pub fn rescan_now(&self) {
        let targets = (self.discover)();
        self.renderer.borrow_mut().reconcile(&targets);
    }

    /// Forwards a settings-change notification to the renderer.
    pub fn on_settings_change(&self, change: &SettingsChange) -> bool {
        self.renderer.borrow_mut().apply_settings_change(change)
    }

    /// The shared renderer.
    #[must_use]
    pub fn renderer(&self) -> &Rc<RefCell<OverlayRenderer<D, C>>> {
        &self.renderer
    }

    /// The shared scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Rc<RefCell<RescanScheduler<H>>> {
        &self.scheduler
    }
}

/// Discovery, reconciliation, and a position refresh for the kept overlays.
fn rescan_task<D, C>(
    renderer: Rc<RefCell<OverlayRenderer<D, C>>>,
    discover: Discovery<D::Element>,
) -> impl FnOnce() + 'static
where
    D: OverlayDocument + 'static,
    C: ContrastEvaluator + 'static,
{
    move || {
        let targets = discover();
        let mut renderer = renderer.borrow_mut();
        renderer.reconcile(&targets);
        renderer.refresh_positions();
    }
}
