// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for waymark.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomDocument`]: overlay `<div>`s in the live DOM
//! - [`TimeoutHost`]: `setTimeout` timers for the rescan scheduler
//! - [`MutationWatcher`]: `MutationObserver` feeding a rescan coordinator
//! - [`ResizeListener`]: window `resize` subscription
//! - [`ConsoleSink`]: trace sink printing to the browser console

#![no_std]

extern crate alloc;

mod console;
mod document;
mod mutation;
mod resize;
mod timers;

pub use console::ConsoleSink;
pub use document::DomDocument;
pub use mutation::MutationWatcher;
pub use resize::ResizeListener;
pub use timers::{TimeoutHost, WebScheduler};

use waymark_core::time::{Duration, HostTime};

/// Returns the current host time from `performance.now()`, in whole
/// milliseconds.
#[must_use]
pub fn now() -> HostTime {
    HostTime(millis_from_f64(timers::performance_now()))
}

/// Converts a browser millisecond timestamp to whole milliseconds.
fn millis_from_f64(ms: f64) -> u64 {
    if !ms.is_finite() || ms <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "positive finite timestamp; whole milliseconds fit in u64"
    )]
    let whole = ms as u64;
    whole
}

/// Converts a scheduler delay to a `setTimeout` argument.
fn timeout_ms(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_truncate_to_milliseconds() {
        assert_eq!(millis_from_f64(1234.9), 1234);
        assert_eq!(millis_from_f64(-3.0), 0);
        assert_eq!(millis_from_f64(f64::NAN), 0);
    }

    #[test]
    fn long_delays_saturate() {
        assert_eq!(timeout_ms(Duration(750)), 750);
        assert_eq!(timeout_ms(Duration(u64::MAX)), i32::MAX);
    }
}
