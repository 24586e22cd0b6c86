// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Pause changes become a `pause_ms` counter track and scheduler decisions
/// become instant events. Overlay writes and mutation batches carry no
/// timestamp of their own; they are placed at the most recent scheduler
/// timestamp.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::PauseChanged(e) => {
                last_ts = millis_to_us(e.at.as_millis());
                events.push(json!({
                    "ph": "C",
                    "name": "pause_ms",
                    "cat": "Scheduler",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "pause": e.pause.as_millis(),
                    }
                }));
            }
            RecordedEvent::Rescan(e) => {
                last_ts = millis_to_us(e.at.as_millis());
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Scheduler",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "pause_ms": e.pause.as_millis(),
                    }
                }));
            }
            RecordedEvent::Overlay(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.change),
                    "cat": "Overlay",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "slot": e.slot,
                        "guessed": e.guessed,
                    }
                }));
            }
            RecordedEvent::MutationBatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "MutationBatch",
                    "cat": "Observer",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 2,
                    "s": "t",
                    "args": {
                        "self_induced": e.self_induced,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn millis_to_us(ms: u64) -> f64 {
    ms as f64 * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use waymark_core::time::{Duration, HostTime};
    use waymark_core::trace::{
        OverlayChange, OverlayEvent, PauseChangedEvent, RescanEvent, RescanKind, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_rescan(&RescanEvent {
            kind: RescanKind::Scheduled,
            pause: Duration(750),
            at: HostTime(1_100),
        });
        rec.on_pause_changed(&PauseChangedEvent {
            pause: Duration(750),
            at: HostTime(1_100),
        });
        rec.on_overlay(&OverlayEvent {
            change: OverlayChange::Added,
            slot: 0,
            guessed: false,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Scheduled");
        assert_eq!(parsed[0]["ts"], 1_100_000.0);

        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[1]["args"]["pause"], 750);

        // Overlay writes inherit the last scheduler timestamp.
        assert_eq!(parsed[2]["name"], "Added");
        assert_eq!(parsed[2]["ts"], 1_100_000.0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
