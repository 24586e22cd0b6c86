// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay registry and its reconciliation against target lists.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Rect;

use super::document::{BorderLine, BorderStyle, LabelAnchor, LabelStyle, OverlayDocument};
use crate::contrast::{ContrastEvaluator, TextColour, WcagContrast};
use crate::settings::{BorderSettings, OverlayConfig, SettingsChange};
use crate::trace::{OverlayChange, OverlayEvent, TraceSink, Tracer};

/// One entry of a desired overlay set.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayTarget<E> {
    /// Element to highlight.
    pub element: E,
    /// Label text.
    pub label: String,
    /// Whether the landmark was found heuristically.
    pub guessed: bool,
}

impl<E> OverlayTarget<E> {
    /// Creates a target entry.
    pub fn new(element: E, label: impl Into<String>, guessed: bool) -> Self {
        Self {
            element,
            label: label.into(),
            guessed,
        }
    }
}

/// A tracked target with its border and label nodes.
pub struct OverlayRecord<D: OverlayDocument> {
    target: D::Element,
    border: D::Node,
    label: D::Node,
    text: String,
    guessed: bool,
}

impl<D: OverlayDocument> core::fmt::Debug for OverlayRecord<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayRecord")
            .field("text", &self.text)
            .field("guessed", &self.guessed)
            .finish_non_exhaustive()
    }
}

impl<D: OverlayDocument> OverlayRecord<D> {
    /// The highlighted element.
    #[must_use]
    pub fn target(&self) -> &D::Element {
        &self.target
    }

    /// The border node.
    #[must_use]
    pub fn border(&self) -> &D::Node {
        &self.border
    }

    /// The label node.
    #[must_use]
    pub fn label(&self) -> &D::Node {
        &self.label
    }

    /// The label text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the landmark was found heuristically.
    #[must_use]
    pub fn is_guessed(&self) -> bool {
        self.guessed
    }
}

/// Cached appearance shared by every overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleSnapshot {
    /// Border and label background colour.
    pub border_colour: String,
    /// Label font size in CSS pixels.
    pub font_size_px: f64,
    /// Label text colour derived from the two fields above.
    pub label_foreground: TextColour,
}

/// Keeps one border and label attached to each designated target element,
/// and nothing else.
///
/// The registry is the single source of truth for which overlays exist.
/// Operations on targets that are not tracked are no-ops. A target that is
/// detached from the document, or whose layout cannot be read, is treated as
/// absent: it is not added, and an existing overlay for it is removed the
/// next time overlays are repositioned or restyled.
///
/// Every DOM write raises a one-shot flag that the owner of the page's
/// mutation observer reads with
/// [`consume_self_mutation_flag`](Self::consume_self_mutation_flag), so it
/// can skip exactly one reaction per batch of overlay-induced mutations.
pub struct OverlayRenderer<D: OverlayDocument, C: ContrastEvaluator = WcagContrast> {
    document: D,
    contrast: C,
    config: OverlayConfig,
    style: StyleSnapshot,
    records: Vec<OverlayRecord<D>>,
    self_mutated: bool,
    tracer: Tracer,
}

impl<D: OverlayDocument, C: ContrastEvaluator> core::fmt::Debug for OverlayRenderer<D, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("config", &self.config)
            .field("style", &self.style)
            .field("records", &self.records)
            .field("self_mutated", &self.self_mutated)
            .finish_non_exhaustive()
    }
}

impl<D: OverlayDocument> OverlayRenderer<D> {
    /// Creates an empty renderer using WCAG label colours.
    #[must_use]
    pub fn new(document: D, settings: &BorderSettings, config: OverlayConfig) -> Self {
        Self::with_contrast(document, WcagContrast, settings, config)
    }
}

impl<D: OverlayDocument, C: ContrastEvaluator> OverlayRenderer<D, C> {
    /// Creates an empty renderer with a custom contrast evaluator.
    #[must_use]
    pub fn with_contrast(
        document: D,
        contrast: C,
        settings: &BorderSettings,
        config: OverlayConfig,
    ) -> Self {
        let label_foreground =
            contrast.foreground_text_colour(&settings.border_colour, settings.font_size_px, true);
        Self {
            document,
            contrast,
            config,
            style: StyleSnapshot {
                border_colour: settings.border_colour.clone(),
                font_size_px: settings.font_size_px,
                label_foreground,
            },
            records: Vec::new(),
            self_mutated: false,
            tracer: Tracer::none(),
        }
    }

    /// Routes overlay events to `sink` (requires the `trace` feature to have
    /// any effect).
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    // -- Registry API --

    /// Draws an overlay for `element` unless it already has one.
    ///
    /// An existing overlay keeps its label even if `label` differs; remove it
    /// first to relabel. Returns whether an overlay was created.
    pub fn add_overlay(&mut self, element: D::Element, label: &str, guessed: bool) -> bool {
        if self.is_tracked(&element) {
            return false;
        }
        let Some(bounds) = measure(&self.document, &element) else {
            return false;
        };

        let (border, label_node) = build_nodes(
            &mut self.document,
            &self.style,
            &self.config,
            label,
            guessed,
        );
        place(&mut self.document, &border, &label_node, bounds);
        self.records.push(OverlayRecord {
            target: element,
            border,
            label: label_node,
            text: String::from(label),
            guessed,
        });
        self.self_mutated = true;
        self.tracer.overlay(&OverlayEvent {
            change: OverlayChange::Added,
            slot: self.records.len() - 1,
            guessed,
        });
        true
    }

    /// Makes the tracked set equal to `targets`.
    ///
    /// Tracked elements missing from `targets` lose their overlays, new ones
    /// gain one, and elements present in both are left untouched. A tracked
    /// element that left the document loses its overlay even if it is still
    /// listed.
    pub fn reconcile(&mut self, targets: &[OverlayTarget<D::Element>]) {
        let mut slot = 0;
        while slot < self.records.len() {
            let target = &self.records[slot].target;
            let keep = targets.iter().any(|t| t.element == *target)
                && measure(&self.document, target).is_some();
            if keep {
                slot += 1;
            } else {
                self.remove_slot(slot);
            }
        }

        for target in targets {
            self.add_overlay(target.element.clone(), &target.label, target.guessed);
        }
    }

    /// Removes the overlay for `element`. Returns whether one existed.
    pub fn remove_overlay(&mut self, element: &D::Element) -> bool {
        match self.slot_of(element) {
            Some(slot) => {
                self.remove_slot(slot);
                true
            }
            None => false,
        }
    }

    /// Removes every overlay.
    pub fn remove_all_overlays(&mut self) {
        while !self.records.is_empty() {
            self.remove_slot(self.records.len() - 1);
        }
    }

    /// Moves every overlay to its target's current layout box.
    ///
    /// Call on viewport resize. Targets that left the document lose their
    /// overlays.
    pub fn handle_viewport_change(&mut self) {
        let mut slot = 0;
        while slot < self.records.len() {
            let record = &self.records[slot];
            match measure(&self.document, &record.target) {
                Some(bounds) => {
                    place(&mut self.document, &record.border, &record.label, bounds);
                    self.self_mutated = true;
                    self.tracer.overlay(&OverlayEvent {
                        change: OverlayChange::Repositioned,
                        slot,
                        guessed: record.guessed,
                    });
                    slot += 1;
                }
                None => self.remove_slot(slot),
            }
        }
    }

    /// Same as [`handle_viewport_change`](Self::handle_viewport_change), for
    /// callers that suspect layout drift without a resize.
    pub fn refresh_positions(&mut self) {
        self.handle_viewport_change();
    }

    // -- Style API --

    /// Switches every overlay to a new border colour and label size.
    ///
    /// When neither value differs from the current style this does nothing:
    /// no label colour recomputation, no rebuild, and no self-mutation flag.
    /// Otherwise the label colour is recomputed once and every overlay is
    /// rebuilt in place, keeping its label text and line style. Returns
    /// whether the style changed.
    pub fn apply_style_change(&mut self, border_colour: &str, font_size_px: f64) -> bool {
        if border_colour == self.style.border_colour && font_size_px == self.style.font_size_px {
            return false;
        }

        self.style.border_colour = String::from(border_colour);
        self.style.font_size_px = font_size_px;
        self.style.label_foreground =
            self.contrast
                .foreground_text_colour(border_colour, font_size_px, true);

        let mut slot = 0;
        while slot < self.records.len() {
            let Some(bounds) = measure(&self.document, &self.records[slot].target) else {
                self.remove_slot(slot);
                continue;
            };
            let record = &self.records[slot];
            let (border, label) = build_nodes(
                &mut self.document,
                &self.style,
                &self.config,
                &record.text,
                record.guessed,
            );
            place(&mut self.document, &border, &label, bounds);

            let record = &mut self.records[slot];
            let old_border = core::mem::replace(&mut record.border, border);
            let old_label = core::mem::replace(&mut record.label, label);
            let guessed = record.guessed;
            self.document.remove_node(old_border);
            self.document.remove_node(old_label);

            self.self_mutated = true;
            self.tracer.overlay(&OverlayEvent {
                change: OverlayChange::Restyled,
                slot,
                guessed,
            });
            slot += 1;
        }
        true
    }

    /// Applies a settings-change notification. Fields the notification does
    /// not carry keep their current values.
    pub fn apply_settings_change(&mut self, change: &SettingsChange) -> bool {
        if change.is_empty() {
            return false;
        }
        let current = BorderSettings {
            border_colour: self.style.border_colour.clone(),
            font_size_px: self.style.font_size_px,
        };
        let next = current.merged(change);
        self.apply_style_change(&next.border_colour, next.font_size_px)
    }

    // -- Self-mutation flag --

    /// Returns whether overlay DOM writes happened since the last call, and
    /// clears the flag.
    pub fn consume_self_mutation_flag(&mut self) -> bool {
        core::mem::take(&mut self.self_mutated)
    }

    // -- Queries --

    /// Whether `element` currently has an overlay.
    #[must_use]
    pub fn is_tracked(&self, element: &D::Element) -> bool {
        self.slot_of(element).is_some()
    }

    /// Number of tracked targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no target is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The tracked overlays, in no particular order.
    #[must_use]
    pub fn records(&self) -> &[OverlayRecord<D>] {
        &self.records
    }

    /// The cached style.
    #[must_use]
    pub fn style(&self) -> &StyleSnapshot {
        &self.style
    }

    /// The presentation configuration.
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// The contrast evaluator.
    #[must_use]
    pub fn contrast(&self) -> &C {
        &self.contrast
    }

    /// The host document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access to the host document.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    // -- Internals --

    fn slot_of(&self, element: &D::Element) -> Option<usize> {
        self.records.iter().position(|r| r.target == *element)
    }

    fn remove_slot(&mut self, slot: usize) {
        let record = self.records.swap_remove(slot);
        self.document.remove_node(record.border);
        self.document.remove_node(record.label);
        self.self_mutated = true;
        self.tracer.overlay(&OverlayEvent {
            change: OverlayChange::Removed,
            slot,
            guessed: record.guessed,
        });
    }
}

fn build_nodes<D: OverlayDocument>(
    document: &mut D,
    style: &StyleSnapshot,
    config: &OverlayConfig,
    text: &str,
    guessed: bool,
) -> (D::Node, D::Node) {
    let border = document.create_border(&BorderStyle {
        colour: &style.border_colour,
        width_px: config.border_width_px,
        line: BorderLine::for_guessed(guessed),
        z_index: config.z_index,
    });
    let label = document.create_label(
        text,
        &LabelStyle {
            background: &style.border_colour,
            foreground: style.label_foreground,
            font_size_px: style.font_size_px,
            font_family: config.font_family,
            z_index: config.z_index,
        },
    );
    (border, label)
}

/// Viewport-relative layout box of an attached, measurable element.
fn measure<D: OverlayDocument>(document: &D, element: &D::Element) -> Option<Rect> {
    if !document.is_attached(element) {
        return None;
    }
    document.bounding_rect(element)
}

/// Fits `border` to `bounds` and pins `label` to its top-right corner, or to
/// its top-left corner if the label would start off-screen.
fn place<D: OverlayDocument>(document: &mut D, border: &D::Node, label: &D::Node, bounds: Rect) {
    let doc_rect = bounds + document.scroll_offset();
    document.set_border_box(border, doc_rect);

    document.anchor_label(
        label,
        LabelAnchor::Right {
            top: doc_rect.y0,
            right: document.client_width() - doc_rect.x1,
        },
    );
    if let Some(label_rect) = document.node_rect(label)
        && label_rect.x0 < 0.0
    {
        document.anchor_label(
            label,
            LabelAnchor::Left {
                top: doc_rect.y0,
                left: doc_rect.x0,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::fake::{FakeDocument, NodeKind};
    use alloc::vec;
    use core::cell::Cell;
    use kurbo::Vec2;

    fn renderer() -> OverlayRenderer<FakeDocument> {
        OverlayRenderer::new(
            FakeDocument::new(1000.0),
            &BorderSettings::default(),
            OverlayConfig::standard(),
        )
    }

    fn targets(ids: &[u32]) -> Vec<OverlayTarget<u32>> {
        ids.iter()
            .map(|&id| OverlayTarget::new(id, alloc::format!("landmark {id}"), false))
            .collect()
    }

    fn tracked(r: &OverlayRenderer<FakeDocument>) -> Vec<u32> {
        let mut ids: Vec<u32> = r.records().iter().map(|rec| *rec.target()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn border_matches_target_box() {
        let mut r = renderer();
        r.document_mut()
            .place_element(1, Rect::new(10.0, 20.0, 110.0, 50.0));
        assert!(r.add_overlay(1, "main", false));

        let rec = &r.records()[0];
        let border = r.document().node(rec.border());
        assert_eq!(border.kind, NodeKind::Border);
        assert_eq!(border.rect, Some(Rect::new(10.0, 20.0, 110.0, 50.0)));
        let b = border.rect.unwrap();
        assert_eq!((b.x0, b.y0, b.width(), b.height()), (10.0, 20.0, 100.0, 30.0));
    }

    #[test]
    fn scroll_offset_converts_to_document_coordinates() {
        let mut r = renderer();
        r.document_mut().scroll = Vec2::new(5.0, 200.0);
        r.document_mut()
            .place_element(1, Rect::new(10.0, 20.0, 110.0, 50.0));
        r.add_overlay(1, "main", false);

        let rec = &r.records()[0];
        assert_eq!(
            r.document().node(rec.border()).rect,
            Some(Rect::new(15.0, 220.0, 115.0, 250.0))
        );
        assert_eq!(
            r.document().node(rec.label()).anchor,
            Some(LabelAnchor::Right {
                top: 220.0,
                right: 1000.0 - 115.0,
            })
        );
    }

    #[test]
    fn label_falls_back_to_left_alignment_when_off_screen() {
        let mut r = renderer();
        r.document_mut().label_width = 120.0;
        r.document_mut()
            .place_element(1, Rect::new(0.0, 40.0, 50.0, 90.0));
        r.add_overlay(1, "navigation", false);

        let rec = &r.records()[0];
        assert_eq!(
            r.document().node(rec.label()).anchor,
            Some(LabelAnchor::Left {
                top: 40.0,
                left: 0.0,
            })
        );
    }

    #[test]
    fn label_stays_right_aligned_when_it_fits() {
        let mut r = renderer();
        r.document_mut().label_width = 120.0;
        r.document_mut()
            .place_element(1, Rect::new(300.0, 0.0, 600.0, 90.0));
        r.add_overlay(1, "navigation", false);

        let rec = &r.records()[0];
        assert!(matches!(
            r.document().node(rec.label()).anchor,
            Some(LabelAnchor::Right { .. })
        ));
    }

    #[test]
    fn guessed_landmarks_get_dashed_borders() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.document_mut().place_element(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.add_overlay(1, "a", true);
        r.add_overlay(2, "b", false);

        let line = |id: u32| {
            let rec = r.records().iter().find(|rec| *rec.target() == id).unwrap();
            r.document().node(rec.border()).line
        };
        assert_eq!(line(1), Some(BorderLine::Dashed));
        assert_eq!(line(2), Some(BorderLine::Solid));
    }

    #[test]
    fn adding_tracked_element_keeps_existing_label() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(r.add_overlay(1, "banner", false));
        assert!(r.consume_self_mutation_flag());
        let writes = r.document().writes;

        assert!(!r.add_overlay(1, "something else", true));
        assert_eq!(r.records()[0].text(), "banner");
        assert!(!r.records()[0].is_guessed());
        assert_eq!(r.document().writes, writes, "no DOM writes for a tracked element");
        assert!(!r.consume_self_mutation_flag());
    }

    #[test]
    fn detached_targets_are_not_added() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.document_mut().detach(1);
        assert!(!r.add_overlay(1, "main", false));
        assert!(r.is_empty());
        assert!(!r.consume_self_mutation_flag());
    }

    #[test]
    fn reconcile_drops_tracked_targets_that_left_the_document() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.document_mut().place_element(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.reconcile(&targets(&[1, 2]));
        r.consume_self_mutation_flag();

        r.document_mut().detach(1);
        r.reconcile(&targets(&[1, 2]));
        assert_eq!(tracked(&r), vec![2]);
        assert_eq!(r.document().live_nodes(), 2);
        assert!(r.consume_self_mutation_flag());
    }

    #[test]
    fn reconcile_tracks_exactly_the_target_list() {
        let mut r = renderer();
        for id in 1..=5 {
            r.document_mut()
                .place_element(id, Rect::new(0.0, 0.0, 10.0, 10.0));
        }
        r.reconcile(&targets(&[1, 2, 3]));
        assert_eq!(tracked(&r), vec![1, 2, 3]);

        r.remove_overlay(&2);
        r.add_overlay(4, "extra", false);
        assert_eq!(tracked(&r), vec![1, 3, 4]);

        r.reconcile(&targets(&[3, 5, 5]));
        assert_eq!(tracked(&r), vec![3, 5]);
        assert_eq!(r.document().live_nodes(), 4, "two nodes per overlay");
    }

    #[test]
    fn reconcile_leaves_shared_members_untouched() {
        let mut r = renderer();
        for id in 1..=3 {
            r.document_mut()
                .place_element(id, Rect::new(0.0, 0.0, 10.0, 10.0));
        }
        r.reconcile(&targets(&[1, 2]));
        let border_of_1 = *r.records().iter().find(|rec| *rec.target() == 1).unwrap().border();
        let writes_before = r.document().node_writes(border_of_1);

        r.reconcile(&targets(&[1, 3]));
        let rec = r.records().iter().find(|rec| *rec.target() == 1).unwrap();
        assert_eq!(*rec.border(), border_of_1, "shared member keeps its nodes");
        assert_eq!(r.document().node_writes(border_of_1), writes_before);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut r = renderer();
        for id in 1..=3 {
            r.document_mut()
                .place_element(id, Rect::new(0.0, 0.0, 10.0, 10.0));
        }
        let list = targets(&[1, 2, 3]);
        r.reconcile(&list);
        assert!(r.consume_self_mutation_flag());
        let writes = r.document().writes;

        r.reconcile(&list);
        assert_eq!(r.document().writes, writes, "second reconcile must not write");
        assert!(!r.consume_self_mutation_flag());
        assert_eq!(tracked(&r), vec![1, 2, 3]);
    }

    #[test]
    fn removing_unknown_element_is_a_no_op() {
        let mut r = renderer();
        assert!(!r.remove_overlay(&42));
        assert!(!r.consume_self_mutation_flag());
    }

    #[test]
    fn flag_is_one_shot() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.add_overlay(1, "main", false);
        assert!(r.consume_self_mutation_flag());
        assert!(!r.consume_self_mutation_flag());
        r.remove_overlay(&1);
        assert!(r.consume_self_mutation_flag());
    }

    #[test]
    fn remove_all_detaches_every_node() {
        let mut r = renderer();
        for id in 1..=3 {
            r.document_mut()
                .place_element(id, Rect::new(0.0, 0.0, 10.0, 10.0));
        }
        r.reconcile(&targets(&[1, 2, 3]));
        r.remove_all_overlays();
        assert!(r.is_empty());
        assert_eq!(r.document().live_nodes(), 0);
    }

    #[test]
    fn viewport_change_repositions_and_drops_detached_targets() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.document_mut().place_element(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.reconcile(&targets(&[1, 2]));
        r.consume_self_mutation_flag();

        r.document_mut()
            .place_element(1, Rect::new(50.0, 60.0, 150.0, 160.0));
        r.document_mut().detach(2);
        r.handle_viewport_change();

        assert_eq!(tracked(&r), vec![1]);
        let rec = &r.records()[0];
        assert_eq!(
            r.document().node(rec.border()).rect,
            Some(Rect::new(50.0, 60.0, 150.0, 160.0))
        );
        assert_eq!(r.document().live_nodes(), 2);
        assert!(r.consume_self_mutation_flag());
    }

    #[test]
    fn refresh_positions_on_empty_registry_does_not_flag() {
        let mut r = renderer();
        r.refresh_positions();
        assert!(!r.consume_self_mutation_flag());
    }

    #[derive(Default)]
    struct CountingContrast {
        calls: Cell<u32>,
    }

    impl ContrastEvaluator for CountingContrast {
        fn foreground_text_colour(&self, bg: &str, size: f64, bold: bool) -> TextColour {
            self.calls.set(self.calls.get() + 1);
            WcagContrast.foreground_text_colour(bg, size, bold)
        }

        fn contrast_ratio(&self, a: &str, b: &str) -> Option<f64> {
            WcagContrast.contrast_ratio(a, b)
        }
    }

    fn counting_renderer() -> OverlayRenderer<FakeDocument, CountingContrast> {
        OverlayRenderer::with_contrast(
            FakeDocument::new(1000.0),
            CountingContrast::default(),
            &BorderSettings::default(),
            OverlayConfig::standard(),
        )
    }

    #[test]
    fn unchanged_style_is_a_no_op() {
        let mut r = counting_renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.add_overlay(1, "main", false);
        r.consume_self_mutation_flag();
        assert_eq!(r.contrast().calls.get(), 1, "computed once at startup");
        let writes = r.document().writes;

        let colour = r.style().border_colour.clone();
        let size = r.style().font_size_px;
        assert!(!r.apply_style_change(&colour, size));
        assert_eq!(r.contrast().calls.get(), 1, "no recomputation");
        assert_eq!(r.document().writes, writes, "no rebuild");
        assert!(!r.consume_self_mutation_flag());
    }

    #[test]
    fn style_change_rebuilds_in_place() {
        let mut r = counting_renderer();
        r.document_mut()
            .place_element(1, Rect::new(10.0, 20.0, 110.0, 50.0));
        r.document_mut().place_element(2, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.add_overlay(1, "main", true);
        r.add_overlay(2, "search", false);
        r.consume_self_mutation_flag();
        let old_border = *r.records()[0].border();

        assert!(r.apply_style_change("#ff9300", 20.0));
        assert_eq!(r.contrast().calls.get(), 2);
        assert_eq!(r.style().label_foreground, TextColour::Black);
        assert!(r.consume_self_mutation_flag());
        assert_eq!(r.document().live_nodes(), 4, "old nodes are detached");

        let rec = r.records().iter().find(|rec| *rec.target() == 1).unwrap();
        assert_ne!(*rec.border(), old_border);
        assert_eq!(rec.text(), "main");
        let border = r.document().node(rec.border());
        assert_eq!(border.colour.as_deref(), Some("#ff9300"));
        assert_eq!(border.line, Some(BorderLine::Dashed));
        assert_eq!(border.rect, Some(Rect::new(10.0, 20.0, 110.0, 50.0)));
        let label = r.document().node(rec.label());
        assert_eq!(label.text.as_deref(), Some("main"));
        assert_eq!(label.foreground, Some(TextColour::Black));
        assert_eq!(label.font_size_px, Some(20.0));
    }

    #[test]
    fn style_change_drops_detached_targets() {
        let mut r = renderer();
        r.document_mut().place_element(1, Rect::new(0.0, 0.0, 10.0, 10.0));
        r.add_overlay(1, "main", false);
        r.document_mut().detach(1);
        r.apply_style_change("#000000", 12.0);
        assert!(r.is_empty());
        assert_eq!(r.document().live_nodes(), 0);
    }

    #[test]
    fn settings_change_merges_partial_updates() {
        let mut r = renderer();
        let change = SettingsChange {
            font_size_px: Some(24.0),
            ..SettingsChange::default()
        };
        assert!(r.apply_settings_change(&change));
        assert_eq!(r.style().font_size_px, 24.0);
        assert_eq!(r.style().border_colour, "#ff2f92");
        assert!(!r.apply_settings_change(&SettingsChange::default()));
        assert!(!r.apply_settings_change(&change), "same value again is a no-op");
    }
}
