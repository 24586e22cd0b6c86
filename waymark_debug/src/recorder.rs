// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use waymark_core::time::{Duration, HostTime};
use waymark_core::trace::{
    MutationBatchEvent, OverlayChange, OverlayEvent, PauseChangedEvent, RescanEvent, RescanKind,
    TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PAUSE_CHANGED: u8 = 1;
const TAG_RESCAN: u8 = 2;
const TAG_OVERLAY: u8 = 3;
const TAG_MUTATION_BATCH: u8 = 4;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_rescan_kind(&mut self, k: RescanKind) {
        self.write_u8(match k {
            RescanKind::Immediate => 0,
            RescanKind::Scheduled => 1,
            RescanKind::Coalesced => 2,
            RescanKind::Deferred => 3,
        });
    }

    fn write_change(&mut self, c: OverlayChange) {
        self.write_u8(match c {
            OverlayChange::Added => 0,
            OverlayChange::Removed => 1,
            OverlayChange::Repositioned => 2,
            OverlayChange::Restyled => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_pause_changed(&mut self, e: &PauseChangedEvent) {
        self.write_u8(TAG_PAUSE_CHANGED);
        self.write_u64(e.pause.as_millis());
        self.write_u64(e.at.as_millis());
    }

    fn on_rescan(&mut self, e: &RescanEvent) {
        self.write_u8(TAG_RESCAN);
        self.write_rescan_kind(e.kind);
        self.write_u64(e.pause.as_millis());
        self.write_u64(e.at.as_millis());
    }

    fn on_overlay(&mut self, e: &OverlayEvent) {
        self.write_u8(TAG_OVERLAY);
        self.write_change(e.change);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "registry slot capped at u32::MAX for recording"
        )]
        self.write_u32(e.slot.min(u32::MAX as usize) as u32);
        self.write_u8(u8::from(e.guessed));
    }

    fn on_mutation_batch(&mut self, e: &MutationBatchEvent) {
        self.write_u8(TAG_MUTATION_BATCH);
        self.write_u8(u8::from(e.self_induced));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`PauseChangedEvent`].
    PauseChanged(PauseChangedEvent),
    /// A [`RescanEvent`].
    Rescan(RescanEvent),
    /// An [`OverlayEvent`].
    Overlay(OverlayEvent),
    /// A [`MutationBatchEvent`].
    MutationBatch(MutationBatchEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_rescan_kind(&mut self) -> Option<RescanKind> {
        Some(match self.read_u8()? {
            0 => RescanKind::Immediate,
            1 => RescanKind::Scheduled,
            2 => RescanKind::Coalesced,
            _ => RescanKind::Deferred,
        })
    }

    fn read_change(&mut self) -> Option<OverlayChange> {
        Some(match self.read_u8()? {
            0 => OverlayChange::Added,
            1 => OverlayChange::Removed,
            2 => OverlayChange::Repositioned,
            _ => OverlayChange::Restyled,
        })
    }

    fn decode_pause_changed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PauseChanged(PauseChangedEvent {
            pause: Duration(self.read_u64()?),
            at: HostTime(self.read_u64()?),
        }))
    }

    fn decode_rescan(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Rescan(RescanEvent {
            kind: self.read_rescan_kind()?,
            pause: Duration(self.read_u64()?),
            at: HostTime(self.read_u64()?),
        }))
    }

    fn decode_overlay(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Overlay(OverlayEvent {
            change: self.read_change()?,
            slot: self.read_u32()? as usize,
            guessed: self.read_u8()? != 0,
        }))
    }

    fn decode_mutation_batch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::MutationBatch(MutationBatchEvent {
            self_induced: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_PAUSE_CHANGED => self.decode_pause_changed(),
            TAG_RESCAN => self.decode_rescan(),
            TAG_OVERLAY => self.decode_overlay(),
            TAG_MUTATION_BATCH => self.decode_mutation_batch(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
