// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing border settings and fixed overlay configuration.
//!
//! [`BorderSettings`] is what the settings store supplies at startup;
//! [`SettingsChange`] is a partial update delivered by its change
//! notifications. [`OverlayConfig`] holds the values that are not user
//! configurable.

use alloc::string::String;

/// Default border (and label background) colour.
pub const DEFAULT_BORDER_COLOUR: &str = "#ff2f92";

/// Default label font size in CSS pixels.
pub const DEFAULT_FONT_SIZE_PX: f64 = 16.0;

/// User-configurable overlay appearance.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderSettings {
    /// Border and label background colour, as a CSS hex colour.
    pub border_colour: String,
    /// Label font size in CSS pixels.
    pub font_size_px: f64,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            border_colour: String::from(DEFAULT_BORDER_COLOUR),
            font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

impl BorderSettings {
    /// Returns these settings with `change` applied on top.
    #[must_use]
    pub fn merged(&self, change: &SettingsChange) -> Self {
        Self {
            border_colour: change
                .border_colour
                .clone()
                .unwrap_or_else(|| self.border_colour.clone()),
            font_size_px: change.font_size_px.unwrap_or(self.font_size_px),
        }
    }
}

/// A settings-change notification. Fields that did not change are `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsChange {
    /// New border colour, if it changed.
    pub border_colour: Option<String>,
    /// New label font size, if it changed.
    pub font_size_px: Option<f64>,
}

impl SettingsChange {
    /// Returns whether the notification carries any overlay-relevant value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.border_colour.is_none() && self.font_size_px.is_none()
    }
}

/// Fixed overlay presentation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayConfig {
    /// Border stroke width in CSS pixels.
    pub border_width_px: f64,
    /// Stacking order for border and label nodes; above ordinary content.
    pub z_index: i32,
    /// Label font family.
    pub font_family: &'static str,
}

impl OverlayConfig {
    /// Default configuration: 4 px borders, z-index 10 000 000, sans-serif
    /// labels.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            border_width_px: 4.0,
            z_index: 10_000_000,
            font_family: "sans-serif",
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_unchanged_fields() {
        let base = BorderSettings::default();
        let change = SettingsChange {
            font_size_px: Some(20.0),
            ..SettingsChange::default()
        };
        let merged = base.merged(&change);
        assert_eq!(merged.border_colour, DEFAULT_BORDER_COLOUR);
        assert_eq!(merged.font_size_px, 20.0);
        assert!(!change.is_empty());
        assert!(SettingsChange::default().is_empty());
    }
}
