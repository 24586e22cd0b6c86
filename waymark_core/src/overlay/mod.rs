// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Landmark overlays: a border around each target element and a label
//! pinned to its top-right corner.
//!
//! [`OverlayRenderer`] owns the registry of tracked targets and talks to the
//! page through the [`OverlayDocument`] trait, which a backend implements for
//! a real DOM.

mod document;
mod renderer;

pub use document::{BorderLine, BorderStyle, LabelAnchor, LabelStyle, OverlayDocument};
pub use renderer::{OverlayRecord, OverlayRenderer, OverlayTarget, StyleSnapshot};
