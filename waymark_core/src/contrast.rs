// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! WCAG 2 contrast ratios and label text colour selection.
//!
//! Landmark labels are drawn with the border colour as their background, so
//! the label text must be black or white depending on which is legible on
//! that colour. [`WcagContrast`] makes that decision from the WCAG relative
//! luminance formula and the large-text thresholds.

use core::fmt;

/// CSS pixels per typographic point, as assumed for label font sizes.
pub const PX_PER_PT: f64 = 1.33;

/// Minimum contrast ratio for normal text (WCAG AA).
const NORMAL_TEXT_RATIO: f64 = 4.5;

/// Minimum contrast ratio for large text (WCAG AA).
const LARGE_TEXT_RATIO: f64 = 3.0;

/// An sRGB colour with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Creates a colour from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb` (the leading `#` is optional, hex digits
    /// are case-insensitive).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => Some(Self::new(
                u8::from_str_radix(&digits[0..2], 16).ok()?,
                u8::from_str_radix(&digits[2..4], 16).ok()?,
                u8::from_str_radix(&digits[4..6], 16).ok()?,
            )),
            3 => {
                let short = |i: usize| u8::from_str_radix(&digits[i..=i], 16).map(|v| v * 17);
                Some(Self::new(short(0).ok()?, short(1).ok()?, short(2).ok()?))
            }
            _ => None,
        }
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    #[must_use]
    pub fn relative_luminance(self) -> f64 {
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn linearize(channel: u8) -> f64 {
    let s = f64::from(channel) / 255.0;
    if s <= 0.039_28 {
        s / 12.92
    } else {
        libm::pow((s + 0.055) / 1.055, 2.4)
    }
}

/// Contrast ratio between two colours, from 1 (identical luminance) to 21
/// (black on white). The order of the arguments does not matter.
#[must_use]
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Whether text of the given size and weight counts as "large" for WCAG:
/// at least 18 pt, or at least 14 pt when bold.
#[must_use]
pub fn is_large_text(font_size_px: f64, bold: bool) -> bool {
    font_size_px >= 18.0 * PX_PER_PT || (bold && font_size_px >= 14.0 * PX_PER_PT)
}

/// Label foreground colour decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextColour {
    /// Black text.
    Black,
    /// White text.
    White,
}

impl TextColour {
    /// CSS keyword for this colour.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

/// Decides label text colours from background colours.
pub trait ContrastEvaluator {
    /// Chooses a legible text colour for a label drawn on
    /// `background_hex` with the given font metrics.
    fn foreground_text_colour(
        &self,
        background_hex: &str,
        font_size_px: f64,
        bold: bool,
    ) -> TextColour;

    /// Contrast ratio between two hex colours, or `None` if either fails to
    /// parse.
    fn contrast_ratio(&self, a_hex: &str, b_hex: &str) -> Option<f64>;
}

/// [`ContrastEvaluator`] using WCAG AA thresholds.
///
/// White is preferred whenever it meets the threshold for the text size;
/// otherwise the label uses black. Unparsable backgrounds get black text.
#[derive(Clone, Copy, Debug, Default)]
pub struct WcagContrast;

impl ContrastEvaluator for WcagContrast {
    fn foreground_text_colour(
        &self,
        background_hex: &str,
        font_size_px: f64,
        bold: bool,
    ) -> TextColour {
        let Some(background) = Rgb::from_hex(background_hex) else {
            return TextColour::Black;
        };
        let threshold = if is_large_text(font_size_px, bold) {
            LARGE_TEXT_RATIO
        } else {
            NORMAL_TEXT_RATIO
        };
        if contrast_ratio(Rgb::WHITE, background) >= threshold {
            TextColour::White
        } else {
            TextColour::Black
        }
    }

    fn contrast_ratio(&self, a_hex: &str, b_hex: &str) -> Option<f64> {
        Some(contrast_ratio(Rgb::from_hex(a_hex)?, Rgb::from_hex(b_hex)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn ratio(a: &str, b: &str) -> f64 {
        WcagContrast.contrast_ratio(a, b).unwrap()
    }

    fn close(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 0.005
    }

    #[test]
    fn white_on_black_is_maximal() {
        assert!(close(ratio("#ffffff", "#000000"), 21.0), "21:1");
    }

    #[test]
    fn red_on_white() {
        let r = ratio("#ff0000", "#ffffff");
        assert!(close(r, 4.0), "expected 4.00:1, got {r}");
    }

    #[test]
    fn white_and_black_on_pink() {
        let white = ratio("#ffffff", "#ff2f92");
        let black = ratio("#000000", "#ff2f92");
        assert!(close(white, 3.46), "expected 3.46:1, got {white}");
        assert!(close(black, 6.07), "expected 6.07:1, got {black}");
    }

    #[test]
    fn ratio_is_symmetric() {
        assert_eq!(ratio("#ff2f92", "#ffffff"), ratio("#ffffff", "#ff2f92"));
    }

    #[test]
    fn label_colour_for_pink() {
        let c = WcagContrast;
        assert_eq!(
            c.foreground_text_colour("#ff2f92", 18.0 * PX_PER_PT, true),
            TextColour::White
        );
        assert_eq!(
            c.foreground_text_colour("#ff2f92", 14.0 * PX_PER_PT, true),
            TextColour::White,
            "14pt bold counts as large text"
        );
        assert_eq!(
            c.foreground_text_colour("#ff2f92", 14.0 * PX_PER_PT, false),
            TextColour::Black,
            "14pt regular needs 4.5:1"
        );
    }

    #[test]
    fn label_colour_for_orange() {
        assert_eq!(
            WcagContrast.foreground_text_colour("#ff9300", 18.0 * PX_PER_PT, true),
            TextColour::Black
        );
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgb::from_hex("#FF2F92"), Some(Rgb::new(0xff, 0x2f, 0x92)));
        assert_eq!(Rgb::from_hex("fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
        assert_eq!(Rgb::new(0xff, 0x2f, 0x92).to_string(), "#ff2f92");
    }

    #[test]
    fn unparsable_background_falls_back_to_black() {
        assert_eq!(
            WcagContrast.foreground_text_colour("rebeccapurple", 16.0, true),
            TextColour::Black
        );
        assert_eq!(WcagContrast.contrast_ratio("nope", "#000"), None);
    }
}
