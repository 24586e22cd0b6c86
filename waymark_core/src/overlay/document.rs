// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host document contract and overlay node styles.

use kurbo::{Rect, Vec2};

use crate::contrast::TextColour;

/// Stroke style of a border.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BorderLine {
    /// Landmark declared by markup.
    Solid,
    /// Landmark found by heuristics.
    Dashed,
}

impl BorderLine {
    /// Border line for an explicit (`false`) or guessed (`true`) landmark.
    #[must_use]
    pub const fn for_guessed(guessed: bool) -> Self {
        if guessed { Self::Dashed } else { Self::Solid }
    }

    /// CSS `border-style` keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
        }
    }
}

/// Appearance of a border node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderStyle<'a> {
    /// Stroke colour.
    pub colour: &'a str,
    /// Stroke width in CSS pixels.
    pub width_px: f64,
    /// Stroke style.
    pub line: BorderLine,
    /// Stacking order.
    pub z_index: i32,
}

/// Appearance of a label node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle<'a> {
    /// Background colour (the border colour).
    pub background: &'a str,
    /// Text colour.
    pub foreground: TextColour,
    /// Font size in CSS pixels. Labels are always bold.
    pub font_size_px: f64,
    /// Font family.
    pub font_family: &'a str,
    /// Stacking order.
    pub z_index: i32,
}

/// Where a label is pinned, in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LabelAnchor {
    /// The label's right edge sits `right` pixels from the right edge of the
    /// document's client area.
    Right {
        /// Top edge.
        top: f64,
        /// Distance from the client area's right edge.
        right: f64,
    },
    /// The label's left edge sits at `left`.
    Left {
        /// Top edge.
        top: f64,
        /// Left edge.
        left: f64,
    },
}

/// The live document the overlays are drawn into.
///
/// The renderer only ever reads target elements' layout and writes the
/// nodes it created through this trait; it never modifies target elements.
/// Overlay nodes must let pointer events pass through to the page.
pub trait OverlayDocument {
    /// Identity of a page element that can carry an overlay. Equality must
    /// be element identity.
    type Element: Clone + PartialEq;

    /// Handle to an overlay node created by this document.
    type Node;

    /// Whether `element` is still part of the document.
    fn is_attached(&self, element: &Self::Element) -> bool;

    /// Layout box of `element` relative to the viewport, or `None` if it
    /// cannot be measured.
    fn bounding_rect(&self, element: &Self::Element) -> Option<Rect>;

    /// Current scroll offset of the viewport.
    fn scroll_offset(&self) -> Vec2;

    /// Width of the document's client area.
    fn client_width(&self) -> f64;

    /// Creates and attaches an empty border node.
    fn create_border(&mut self, style: &BorderStyle<'_>) -> Self::Node;

    /// Creates and attaches a label node showing `text`.
    fn create_label(&mut self, text: &str, style: &LabelStyle<'_>) -> Self::Node;

    /// Sets a border's position and size in document coordinates.
    fn set_border_box(&mut self, border: &Self::Node, rect: Rect);

    /// Pins a label, clearing any previous anchor.
    fn anchor_label(&mut self, label: &Self::Node, anchor: LabelAnchor);

    /// Rendered box of an overlay node relative to the viewport.
    fn node_rect(&self, node: &Self::Node) -> Option<Rect>;

    /// Detaches a node from the document.
    fn remove_node(&mut self, node: Self::Node);
}
