// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace output to the browser console.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::JsValue;
use waymark_core::trace::{
    MutationBatchEvent, OverlayEvent, PauseChangedEvent, RescanEvent, TraceSink,
};

/// [`TraceSink`] that prints one `console.log` line per event, prefixed with
/// `[waymark]`.
///
/// Events only arrive when `waymark_core` is built with its `trace` feature.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    /// Also log overlay writes, which are frequent.
    pub overlays: bool,
}

impl ConsoleSink {
    /// A sink for scheduler and mutation events only.
    #[must_use]
    pub const fn new() -> Self {
        Self { overlays: false }
    }

    /// A sink that also logs every overlay write.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { overlays: true }
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

fn overlay_line(e: &OverlayEvent) -> String {
    let style = if e.guessed { " (guessed)" } else { "" };
    format!("[waymark] overlay {:?} slot={}{style}", e.change, e.slot)
}

impl TraceSink for ConsoleSink {
    fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
        log(&format!(
            "[waymark] pause={}ms at={}ms",
            e.pause.as_millis(),
            e.at.as_millis()
        ));
    }

    fn on_rescan(&mut self, e: &RescanEvent) {
        log(&format!(
            "[waymark] rescan {:?} pause={}ms at={}ms",
            e.kind,
            e.pause.as_millis(),
            e.at.as_millis()
        ));
    }

    fn on_overlay(&mut self, e: &OverlayEvent) {
        if self.overlays {
            log(&overlay_line(e));
        }
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        if e.self_induced {
            log("[waymark] mutations ignored (self-induced)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::trace::OverlayChange;

    #[test]
    fn overlay_lines_mark_guessed_landmarks() {
        let line = overlay_line(&OverlayEvent {
            change: OverlayChange::Restyled,
            slot: 3,
            guessed: true,
        });
        assert_eq!(line, "[waymark] overlay Restyled slot=3 (guessed)");
    }
}
