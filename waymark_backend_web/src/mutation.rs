// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `MutationObserver` feeding a [`RescanCoordinator`].

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast as _;
use waymark_core::contrast::ContrastEvaluator;
use waymark_core::coordinator::RescanCoordinator;
use waymark_core::overlay::OverlayDocument;
use waymark_core::scheduler::TimerHost;
use web_sys::{MutationObserver, MutationObserverInit, Node};

/// Observes a subtree and reports each mutation batch to a coordinator until
/// dropped.
pub struct MutationWatcher {
    observer: MutationObserver,
    _closure: Closure<dyn FnMut()>,
}

impl core::fmt::Debug for MutationWatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MutationWatcher").finish_non_exhaustive()
    }
}

impl MutationWatcher {
    /// Watches child-list and attribute changes anywhere under `root`.
    ///
    /// `ignore_check` is consulted for every batch that was not caused by
    /// overlay writes; returning `true` drops the batch. Returns `None` if the
    /// browser refuses to create or start the observer.
    pub fn observe<D, H, C>(
        root: &Node,
        coordinator: &Rc<RefCell<RescanCoordinator<D, H, C>>>,
        ignore_check: impl Fn() -> bool + 'static,
    ) -> Option<Self>
    where
        D: OverlayDocument + 'static,
        H: TimerHost + 'static,
        C: ContrastEvaluator + 'static,
    {
        let coordinator = Rc::downgrade(coordinator);
        let closure = Closure::wrap(Box::new(move || {
            if let Some(coordinator) = coordinator.upgrade() {
                coordinator.borrow_mut().on_mutations(&ignore_check);
            }
        }) as Box<dyn FnMut()>);

        let observer = MutationObserver::new(closure.as_ref().unchecked_ref()).ok()?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        observer.observe_with_options(root, &init).ok()?;

        Some(Self {
            observer,
            _closure: closure,
        })
    }
}

impl Drop for MutationWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
