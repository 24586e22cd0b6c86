// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Landmark overlays and adaptive rescan scheduling.
//!
//! `waymark_core` draws a visible border and a text label over each page
//! region ("landmark") that an external discovery pass designates, keeps
//! those overlays in sync as the page changes, and rate-limits how often
//! discovery is re-run while the page is busy. It is `no_std` compatible
//! (with `alloc`) and reaches the page only through host traits, so the same
//! logic runs against a browser DOM or an in-memory test double.
//!
//! # Architecture
//!
//! ```text
//!   page mutations
//!       │
//!       ▼
//!   RescanCoordinator ──► RescanScheduler::run() ──► immediate / deferred task
//!       ▲                                                   │
//!       │ self-mutation flag                                ▼
//!       │                                     discovery ──► target list
//!       │                                                   │
//!   OverlayRenderer ◄── reconcile() ◄───────────────────────┘
//!       │
//!       ▼
//!   OverlayDocument (host DOM)
//! ```
//!
//! **[`scheduler`]**: Debounce/backoff state machine. Isolated events run
//! immediately; bursts grow the pause window and defer one task to its end;
//! quiet periods decay the window back to the minimum.
//!
//! **[`overlay`]**: Registry of tracked targets, reconciliation against a
//! desired set, repositioning on viewport changes, restyling on settings
//! changes, and the one-shot self-mutation flag.
//!
//! **[`coordinator`]**: Wires mutation batches through the scheduler to
//! discovery and reconciliation, skipping batches caused by overlay writes.
//!
//! **[`contrast`]**: WCAG contrast ratios and the black/white label text
//! decision.
//!
//! **[`settings`]**: User border settings, partial change notifications, and
//! fixed overlay configuration.
//!
//! **[`time`]**: Millisecond host time and durations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod contrast;
pub mod coordinator;
pub mod overlay;
pub mod scheduler;
pub mod settings;
pub mod time;
pub mod trace;
