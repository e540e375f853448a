//! Font measurement for snapshot layout.
//!
//! With the `embed_inter` feature the Inter variable font is embedded and
//! measured through `fontdue`; without it a per-character width table stands
//! in. Both paths are deterministic so layout does not depend on the host.

use std::fmt;

#[cfg(feature = "embed_inter")]
use fontdue::Font;
use once_cell::sync::Lazy;

/// Family name written into snapshot SVG text.
pub const FONT_FAMILY: &str = "Inter, Helvetica, Arial, sans-serif";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    SemiBold,
    Bold,
}

impl FontWeight {
    pub fn css_value(&self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontWeight::Regular => "Regular",
            FontWeight::SemiBold => "SemiBold",
            FontWeight::Bold => "Bold",
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TextMetrics {
    pub line_h: f64,
    /// Ascender above the baseline.
    pub asc: f64,
    /// Descender below the baseline (positive).
    pub desc: f64,
}

pub struct Fonts {
    #[cfg(feature = "embed_inter")]
    variable: Option<Font>,
}

#[cfg(feature = "embed_inter")]
const INTER_BYTES: &[u8] = include_bytes!("../../assets/Inter-Variable.ttf");

impl Fonts {
    /// Load the embedded font; a font that fails to parse falls back to the
    /// width table.
    pub fn load() -> Self {
        Fonts {
            #[cfg(feature = "embed_inter")]
            variable: Font::from_bytes(INTER_BYTES, Default::default()).ok(),
        }
    }

    /// Raw font bytes for the rasterizer's font database, when embedded.
    pub fn font_data() -> Option<&'static [u8]> {
        #[cfg(feature = "embed_inter")]
        {
            Some(INTER_BYTES)
        }

        #[cfg(not(feature = "embed_inter"))]
        {
            None
        }
    }

    #[cfg(feature = "embed_inter")]
    fn font(&self) -> Option<&Font> {
        self.variable.as_ref()
    }

    #[cfg(not(feature = "embed_inter"))]
    fn font(&self) -> Option<&Unmeasured> {
        None
    }

    pub fn metrics(&self, _weight: FontWeight, size_px: f64) -> TextMetrics {
        let line_h = match self.font() {
            Some(font) => glyph_height(font, size_px).max(size_px * 1.24).ceil(),
            None => (size_px * 1.28).round(),
        };
        let asc = match self.font() {
            Some(_) => (size_px * 0.90).round(),
            None => (size_px * 0.92).round(),
        };
        let desc = (line_h - asc).max(size_px * 0.08).round();
        TextMetrics { line_h, asc, desc }
    }

    pub fn advance_width(&self, ch: char, weight: FontWeight, size_px: f64) -> f64 {
        let base = match self.font() {
            Some(font) => glyph_advance(font, ch, size_px),
            None => char_em(ch) * size_px,
        };
        base * weight_stretch(weight)
    }

    pub fn text_width(&self, text: &str, weight: FontWeight, size_px: f64) -> f64 {
        text.chars()
            .map(|ch| self.advance_width(ch, weight, size_px))
            .sum()
    }
}

#[cfg(feature = "embed_inter")]
fn glyph_height(font: &Font, size_px: f64) -> f64 {
    font.metrics('M', size_px as f32).height as f64
}

#[cfg(feature = "embed_inter")]
fn glyph_advance(font: &Font, ch: char, size_px: f64) -> f64 {
    font.metrics(ch, size_px as f32).advance_width as f64
}

/// Stand-in when no font is embedded; never constructed.
#[cfg(not(feature = "embed_inter"))]
enum Unmeasured {}

#[cfg(not(feature = "embed_inter"))]
fn glyph_height(font: &Unmeasured, _size_px: f64) -> f64 {
    match *font {}
}

#[cfg(not(feature = "embed_inter"))]
fn glyph_advance(font: &Unmeasured, _ch: char, _size_px: f64) -> f64 {
    match *font {}
}

fn weight_stretch(weight: FontWeight) -> f64 {
    match weight {
        FontWeight::Regular => 1.0,
        FontWeight::SemiBold => 1.04,
        FontWeight::Bold => 1.07,
    }
}

/// Approximate advance widths in em for a humanist sans.
fn char_em(ch: char) -> f64 {
    match ch {
        ' ' => 0.28,
        'i' | 'l' | 'j' | '!' | '|' | '\'' | '.' | ',' | ':' | ';' => 0.26,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' => 0.86,
        '%' | '@' => 0.82,
        '0'..='9' | '+' | '$' => 0.58,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.54,
        '—' => 1.0,
        _ => 0.6,
    }
}

static FONTS: Lazy<Fonts> = Lazy::new(Fonts::load);

pub fn measure(weight: FontWeight, size_px: f64) -> TextMetrics {
    FONTS.metrics(weight, size_px)
}

pub fn text_width(text: &str, weight: FontWeight, size_px: f64) -> f64 {
    FONTS.text_width(text, weight, size_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_increase_with_size() {
        let small = measure(FontWeight::Regular, 12.0);
        let large = measure(FontWeight::Regular, 48.0);
        assert!(large.line_h > small.line_h);
        assert!(large.asc > small.asc);
    }

    #[test]
    fn baseline_ratio_stays_in_envelope() {
        let m = measure(FontWeight::SemiBold, 32.0);
        let ratio = m.asc / 32.0;
        assert!(ratio > 0.80 && ratio < 1.05);
    }

    #[test]
    fn bold_and_longer_text_measure_wider() {
        let regular = text_width("North Carolina", FontWeight::Regular, 14.0);
        let bold = text_width("North Carolina", FontWeight::Bold, 14.0);
        let short = text_width("UNC", FontWeight::Regular, 14.0);
        assert!(bold > regular);
        assert!(regular > short);
        assert_eq!(text_width("", FontWeight::Bold, 14.0), 0.0);
    }
}
