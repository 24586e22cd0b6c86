// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! and pause windows are printed in milliseconds.

use std::io::Write;

use waymark_core::trace::{
    MutationBatchEvent, OverlayChange, OverlayEvent, PauseChangedEvent, RescanEvent, RescanKind,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn rescan_name(kind: RescanKind) -> &'static str {
    match kind {
        RescanKind::Immediate => "immediate",
        RescanKind::Scheduled => "scheduled",
        RescanKind::Coalesced => "coalesced",
        RescanKind::Deferred => "deferred",
    }
}

fn change_name(change: OverlayChange) -> &'static str {
    match change {
        OverlayChange::Added => "add",
        OverlayChange::Removed => "remove",
        OverlayChange::Repositioned => "move",
        OverlayChange::Restyled => "restyle",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
        let _ = writeln!(
            self.writer,
            "[pause] {}ms at {}ms",
            e.pause.as_millis(),
            e.at.as_millis(),
        );
    }

    fn on_rescan(&mut self, e: &RescanEvent) {
        let _ = writeln!(
            self.writer,
            "[rescan:{}] pause={}ms at {}ms",
            rescan_name(e.kind),
            e.pause.as_millis(),
            e.at.as_millis(),
        );
    }

    fn on_overlay(&mut self, e: &OverlayEvent) {
        let guessed = if e.guessed { " guessed" } else { "" };
        let _ = writeln!(
            self.writer,
            "[overlay:{}] slot={}{guessed}",
            change_name(e.change),
            e.slot,
        );
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        let origin = if e.self_induced { "self" } else { "page" };
        let _ = writeln!(self.writer, "[mutations] origin={origin}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::time::{Duration, HostTime};

    #[test]
    fn pretty_print_rescan() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_rescan(&RescanEvent {
            kind: RescanKind::Scheduled,
            pause: Duration(750),
            at: HostTime(1_100),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output, "[rescan:scheduled] pause=750ms at 1100ms\n");
    }

    #[test]
    fn pretty_print_overlay_and_batch() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_overlay(&OverlayEvent {
            change: OverlayChange::Added,
            slot: 2,
            guessed: true,
        });
        sink.on_mutation_batch(&MutationBatchEvent { self_induced: true });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[overlay:add] slot=2 guessed"), "got: {output}");
        assert!(output.contains("[mutations] origin=self"), "got: {output}");
    }
}
