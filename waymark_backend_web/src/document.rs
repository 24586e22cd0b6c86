// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay nodes in the live DOM.
//!
//! Borders and labels are absolutely positioned `<div>` elements appended to
//! `document.body`. Positions are in document coordinates, so overlays
//! scroll with the page.

use alloc::format;

use kurbo::{Rect, Vec2};
use wasm_bindgen::JsCast as _;
use waymark_core::overlay::{BorderStyle, LabelAnchor, LabelStyle, OverlayDocument};
use web_sys::{Document, Element, HtmlElement, Window};

/// [`OverlayDocument`] backed by a browser window's document.
pub struct DomDocument {
    window: Window,
    document: Document,
}

impl core::fmt::Debug for DomDocument {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomDocument")
            .field("document", &"Document")
            .finish_non_exhaustive()
    }
}

impl DomDocument {
    /// Creates a document for `window`, or `None` if it has no document.
    #[must_use]
    pub fn new(window: Window) -> Option<Self> {
        let document = window.document()?;
        Some(Self { window, document })
    }

    /// Creates a document for the global `window`.
    #[must_use]
    pub fn from_global() -> Option<Self> {
        Self::new(web_sys::window()?)
    }

    /// Returns the window.
    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Returns the document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Creates an unattached `<div>` with the styles shared by borders and
    /// labels.
    fn create_div(&self, z_index: i32) -> HtmlElement {
        let el: HtmlElement = self
            .document
            .create_element("div")
            .expect("create_element failed")
            .unchecked_into();
        let s = el.style();
        let _ = s.set_property("box-sizing", "border-box");
        let _ = s.set_property("margin", "0");
        let _ = s.set_property("pointer-events", "none");
        let _ = s.set_property("position", "absolute");
        let _ = s.set_property("z-index", &format!("{z_index}"));
        el
    }

    fn attach(&self, el: &HtmlElement) {
        if let Some(body) = self.document.body() {
            let _ = body.append_child(el);
        }
    }
}

impl OverlayDocument for DomDocument {
    type Element = Element;
    type Node = HtmlElement;

    fn is_attached(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn bounding_rect(&self, element: &Element) -> Option<Rect> {
        let r = element.get_bounding_client_rect();
        let rect = Rect::new(r.left(), r.top(), r.right(), r.bottom());
        rect.is_finite().then_some(rect)
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn client_width(&self) -> f64 {
        self.document
            .document_element()
            .map_or(0.0, |root| f64::from(root.client_width()))
    }

    /// # Panics
    ///
    /// Panics if the document refuses to create a `<div>`.
    fn create_border(&mut self, style: &BorderStyle<'_>) -> HtmlElement {
        let el = self.create_div(style.z_index);
        let s = el.style();
        let _ = s.set_property(
            "border",
            &format!(
                "{}px {} {}",
                style.width_px,
                style.line.as_str(),
                style.colour
            ),
        );
        let _ = s.set_property("padding", "0");
        self.attach(&el);
        el
    }

    /// # Panics
    ///
    /// Panics if the document refuses to create a `<div>`.
    fn create_label(&mut self, text: &str, style: &LabelStyle<'_>) -> HtmlElement {
        let el = self.create_div(style.z_index);
        let s = el.style();
        let _ = s.set_property("background-color", style.background);
        let _ = s.set_property("border", "none");
        let _ = s.set_property("color", style.foreground.as_str());
        let _ = s.set_property("display", "inline-block");
        let _ = s.set_property("font-family", style.font_family);
        let _ = s.set_property("font-size", &format!("{}px", style.font_size_px));
        let _ = s.set_property("font-weight", "bold");
        let _ = s.set_property("padding", "0.25em 0.75em");
        let _ = s.set_property("white-space", "nowrap");
        let content = self.document.create_text_node(text);
        let _ = el.append_child(&content);
        self.attach(&el);
        el
    }

    fn set_border_box(&mut self, border: &HtmlElement, rect: Rect) {
        let s = border.style();
        let _ = s.set_property("left", &format!("{}px", rect.x0));
        let _ = s.set_property("top", &format!("{}px", rect.y0));
        let _ = s.set_property("width", &format!("{}px", rect.width()));
        let _ = s.set_property("height", &format!("{}px", rect.height()));
    }

    fn anchor_label(&mut self, label: &HtmlElement, anchor: LabelAnchor) {
        let s = label.style();
        match anchor {
            LabelAnchor::Right { top, right } => {
                let _ = s.remove_property("left");
                let _ = s.set_property("top", &format!("{top}px"));
                let _ = s.set_property("right", &format!("{right}px"));
            }
            LabelAnchor::Left { top, left } => {
                let _ = s.remove_property("right");
                let _ = s.set_property("top", &format!("{top}px"));
                let _ = s.set_property("left", &format!("{left}px"));
            }
        }
    }

    fn node_rect(&self, node: &HtmlElement) -> Option<Rect> {
        self.bounding_rect(node)
    }

    fn remove_node(&mut self, node: HtmlElement) {
        node.remove();
    }
}
