// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window `resize` subscription.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast as _;
use waymark_core::contrast::ContrastEvaluator;
use waymark_core::overlay::{OverlayDocument, OverlayRenderer};
use web_sys::Window;

/// Calls a handler on every window `resize` event until dropped.
pub struct ResizeListener {
    window: Window,
    closure: Closure<dyn FnMut()>,
}

impl core::fmt::Debug for ResizeListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResizeListener").finish_non_exhaustive()
    }
}

impl ResizeListener {
    /// Registers `handler` for `resize` events on `window`.
    pub fn new(window: Window, handler: impl FnMut() + 'static) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
        let _ = window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        Self { window, closure }
    }

    /// Repositions `renderer`'s overlays on every resize.
    ///
    /// Only a weak reference is kept, so the listener does not keep the
    /// renderer alive.
    pub fn for_renderer<D, C>(
        window: Window,
        renderer: &Rc<RefCell<OverlayRenderer<D, C>>>,
    ) -> Self
    where
        D: OverlayDocument + 'static,
        C: ContrastEvaluator + 'static,
    {
        let renderer = Rc::downgrade(renderer);
        Self::new(window, move || {
            if let Some(renderer) = renderer.upgrade() {
                renderer.borrow_mut().handle_viewport_change();
            }
        })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}
