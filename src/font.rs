//! Fonts as the page builder sees them: a program that knows glyph metrics
//! and the single-byte encoding, plus the bookkeeping of registered fonts.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use lopdf::Object::{Array, Integer, Name};
use lopdf::{Dictionary as LoDictionary, ObjectId};
use serde_derive::{Deserialize, Serialize};

use crate::graphics::Rect;
use crate::matrix::TransformationMatrix;

/// Opaque handle of a font registered with a [`crate::PdfDocumentBuilder`].
/// Only valid for the document that issued it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontId {
    pub(crate) document: usize,
    pub(crate) index: usize,
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Resource name under which a font is referenced from content streams (`/F1`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontKey {
    pub name: String,
}

/// Metrics and encoding of a font, in glyph space.
///
/// Glyph space is mapped to text space by [`FontProgram::font_matrix`]
/// (usually a `1 / units_per_em` scale).
pub trait FontProgram: fmt::Debug {
    /// PostScript name, written as `/BaseFont`
    fn name(&self) -> &str;

    fn font_matrix(&self) -> TransformationMatrix;

    /// Bounding box of the glyph for `c`, `None` if the font has no such glyph
    fn bounding_box(&self, c: char) -> Option<Rect>;

    /// Horizontal advance of the glyph for `c`
    fn advance_width(&self, c: char) -> Option<f64>;

    /// Byte the character is encoded as in a `Tj` string
    fn encode_char(&self, c: char) -> Option<u8>;

    /// Font dictionary written into the document when the font is registered
    fn font_dictionary(&self) -> LoDictionary {
        LoDictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Name(self.name().as_bytes().to_vec())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// Metrics of one glyph of a [`MetricsFont`], in font units
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub code: u8,
    pub advance: f64,
    pub bbox: Rect,
}

/// A font described by a plain table of glyph metrics.
///
/// Useful for the standard fonts (whose programs are never embedded) and
/// for any font whose metrics were extracted elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFont {
    name: String,
    units_per_em: u16,
    glyphs: BTreeMap<char, GlyphMetrics>,
}

impl MetricsFont {
    pub fn new(name: &str, units_per_em: u16) -> Self {
        Self {
            name: name.to_string(),
            units_per_em: units_per_em.max(1),
            glyphs: BTreeMap::new(),
        }
    }

    pub fn with_glyph(mut self, c: char, code: u8, advance: f64, bbox: Rect) -> Self {
        self.set_glyph(c, GlyphMetrics { code, advance, bbox });
        self
    }

    pub fn set_glyph(&mut self, c: char, metrics: GlyphMetrics) {
        self.glyphs.insert(c, metrics);
    }

    /// Font covering printable ASCII (0x20 - 0x7E) where every glyph has the
    /// same advance and the box `[0 descent advance ascent]`
    pub fn monospace(name: &str, units_per_em: u16, advance: f64, ascent: f64, descent: f64) -> Self {
        let mut font = Self::new(name, units_per_em);
        for code in 0x20u8..=0x7E {
            font.set_glyph(
                code as char,
                GlyphMetrics {
                    code,
                    advance,
                    bbox: Rect::new(0.0, descent, advance, ascent),
                },
            );
        }
        font
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn glyph(&self, c: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&c)
    }
}

impl FontProgram for MetricsFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn font_matrix(&self) -> TransformationMatrix {
        let scale = 1.0 / self.units_per_em as f64;
        TransformationMatrix::scale(scale, scale)
    }

    fn bounding_box(&self, c: char) -> Option<Rect> {
        self.glyphs.get(&c).map(|g| g.bbox)
    }

    fn advance_width(&self, c: char) -> Option<f64> {
        self.glyphs.get(&c).map(|g| g.advance)
    }

    fn encode_char(&self, c: char) -> Option<u8> {
        self.glyphs.get(&c).map(|g| g.code)
    }

    /// Type1 dictionary with `/Widths` in thousandths of an em
    fn font_dictionary(&self) -> LoDictionary {
        let mut dict = LoDictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Name(self.name.as_bytes().to_vec())),
            ("Encoding", "WinAnsiEncoding".into()),
        ]);

        let by_code = self
            .glyphs
            .values()
            .map(|g| (g.code, g.advance))
            .collect::<BTreeMap<_, _>>();

        if let (Some(first), Some(last)) = (by_code.keys().next(), by_code.keys().next_back()) {
            let scale = 1000.0 / self.units_per_em as f64;
            let widths = (*first..=*last)
                .map(|code| {
                    let w = by_code.get(&code).copied().unwrap_or(0.0);
                    Integer((w * scale).round() as i64)
                })
                .collect::<Vec<_>>();
            dict.set("FirstChar", Integer(*first as i64));
            dict.set("LastChar", Integer(*last as i64));
            dict.set("Widths", Array(widths));
        }

        dict
    }
}

/// A font as stored in the document: the program, its resource key and the
/// object holding its font dictionary
#[derive(Debug, Clone)]
pub struct RegisteredFont {
    pub id: FontId,
    pub key: FontKey,
    pub program: Rc<dyn FontProgram>,
    pub reference: ObjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monospace_font_widths() {
        let font = MetricsFont::monospace("Courier", 1000, 600.0, 800.0, -200.0);
        assert_eq!(font.advance_width('A'), Some(600.0));
        assert_eq!(font.encode_char('A'), Some(b'A'));
        assert_eq!(font.encode_char('é'), None);

        let dict = font.font_dictionary();
        assert_eq!(dict.get(b"FirstChar").unwrap(), &Integer(0x20));
        assert_eq!(dict.get(b"LastChar").unwrap(), &Integer(0x7E));
        match dict.get(b"Widths").unwrap() {
            Array(w) => {
                assert_eq!(w.len(), 0x7E - 0x20 + 1);
                assert_eq!(w[0], Integer(600));
            }
            other => panic!("unexpected /Widths {other:?}"),
        }
    }

    #[test]
    fn font_matrix_scales_by_units_per_em() {
        let font = MetricsFont::new("Test", 2048);
        let m = font.font_matrix().as_array();
        assert_eq!(m[0], 1.0 / 2048.0);
        assert_eq!(m[3], 1.0 / 2048.0);
    }
}
