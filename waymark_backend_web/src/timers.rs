// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setTimeout` timers for the rescan scheduler.
//!
//! The scheduler owns its [`TimeoutHost`], and each timeout callback needs to
//! reach the scheduler again, so the host keeps a [`Weak`] reference to the
//! shared scheduler it lives in. Build both at once with
//! [`TimeoutHost::new_scheduler`].

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use waymark_core::scheduler::{RescanScheduler, SchedulerConfig, TimerHandle, TimerHost};
use waymark_core::time::{Duration, HostTime};

// Direct global bindings instead of `web_sys::Window` methods, so timers work
// without fetching the Window object on every call.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(handler: &JsValue, timeout: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

/// A rescan scheduler driven by browser timeouts, shared with its callbacks.
pub type WebScheduler = Rc<RefCell<RescanScheduler<TimeoutHost>>>;

type TimeoutClosure = Closure<dyn FnMut()>;

struct PendingTimeout {
    handle: TimerHandle,
    id: i32,
    /// Kept alive until the timeout fires or is cleared.
    _closure: TimeoutClosure,
}

/// [`TimerHost`] backed by `setTimeout`, `clearTimeout`, and
/// `performance.now()`.
pub struct TimeoutHost {
    scheduler: Weak<RefCell<RescanScheduler<Self>>>,
    pending: Vec<PendingTimeout>,
    next_handle: u64,
}

impl core::fmt::Debug for TimeoutHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TimeoutHost")
            .field("pending", &self.pending.len())
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

impl TimeoutHost {
    /// Creates a shared scheduler whose timers are browser timeouts.
    ///
    /// `pause_changed` is called once with the initial pause window and
    /// again on every change.
    pub fn new_scheduler(
        config: SchedulerConfig,
        pause_changed: impl FnMut(Duration) + 'static,
    ) -> WebScheduler {
        Rc::new_cyclic(|weak| {
            let host = Self {
                scheduler: weak.clone(),
                pending: Vec::new(),
                next_handle: 0,
            };
            RefCell::new(RescanScheduler::new(config, host, pause_changed))
        })
    }

    /// Number of timeouts that have neither fired nor been cleared.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn take(&mut self, handle: TimerHandle) -> Option<PendingTimeout> {
        let slot = self.pending.iter().position(|p| p.handle == handle)?;
        Some(self.pending.swap_remove(slot))
    }
}

impl TimerHost for TimeoutHost {
    fn now(&self) -> HostTime {
        crate::now()
    }

    fn set_timer(&mut self, delay: Duration) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let scheduler = self.scheduler.clone();
        let closure = Closure::wrap(Box::new(move || {
            if let Some(scheduler) = scheduler.upgrade() {
                fire(&scheduler, handle);
            }
        }) as Box<dyn FnMut()>);

        let id = set_timeout(closure.as_ref().unchecked_ref(), crate::timeout_ms(delay));
        self.pending.push(PendingTimeout {
            handle,
            id,
            _closure: closure,
        });
        handle
    }

    fn clear_timer(&mut self, handle: TimerHandle) {
        if let Some(timeout) = self.take(handle) {
            clear_timeout(timeout.id);
        }
    }
}

impl Drop for TimeoutHost {
    fn drop(&mut self) {
        for timeout in self.pending.drain(..) {
            clear_timeout(timeout.id);
        }
    }
}

/// Delivers an elapsed timeout to the scheduler.
///
/// A deferred task runs with no scheduler borrow held, so it may call back
/// into the scheduler.
fn fire(scheduler: &WebScheduler, handle: TimerHandle) {
    // Dropped at the end, after the callback that owns it has done its work.
    let (_timeout, task) = {
        let mut s = scheduler.borrow_mut();
        let timeout = s.host_mut().take(handle);
        if timeout.is_none() {
            // Cleared after the browser queued it.
            return;
        }
        (timeout, s.take_deferred_task(handle))
    };

    match task {
        Some(task) => {
            task();
            scheduler.borrow_mut().complete_deferred_task();
        }
        None => scheduler.borrow_mut().timer_fired(handle),
    }
}
