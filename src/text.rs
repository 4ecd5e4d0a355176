//! Text layout: places every character of a string with a font program and
//! produces the letters (with their geometry) and the operations that show
//! the string.

use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::{Error, Result};
use crate::font::{FontId, FontProgram};
use crate::graphics::{Point, Rect, RgbColor};
use crate::matrix::TransformationMatrix;
use crate::ops::Op;

/// A single placed character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    /// The character, as a string
    pub value: String,
    /// Glyph bounding box in page space
    pub glyph_rectangle: Rect,
    pub start_base_line: Point,
    pub end_base_line: Point,
    /// Advance of this letter in page space
    pub width: f64,
    /// Sum of the advances of all letters before this one in the same call
    pub advance_offset: f64,
    pub font_size: f64,
    pub font: FontId,
    pub fill_color: RgbColor,
    pub point_size: f64,
    /// Number of the measure / add call that produced the letter, strictly
    /// increasing per document
    pub text_sequence: u64,
}

/// Everything a layout depends on besides the string itself
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle<'a> {
    pub font: &'a dyn FontProgram,
    pub font_id: FontId,
    pub font_size: f64,
    pub position: Point,
    pub fill_color: RgbColor,
}

pub(crate) fn check_font_size(font_size: f64) -> Result<()> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "font size must be positive, got {font_size}"
        )));
    }
    Ok(())
}

/// Places the characters of `text`, starting at `style.position`. The
/// letters carry `text_sequence` 0 until [`stamp_sequence`] is called.
///
/// Fails with [`Error::GlyphNotFound`] on the first character the font has
/// no metrics for.
pub(crate) fn layout(text: &str, style: &TextStyle<'_>) -> Result<Vec<Letter>> {
    check_font_size(style.font_size)?;

    let font_matrix = style.font.font_matrix();
    let rendering = TransformationMatrix::scale(style.font_size, style.font_size);
    let mut text_matrix = TransformationMatrix::translate(style.position.x, style.position.y);
    let mut offset = 0.0;
    let mut letters = Vec::with_capacity(text.len());

    for c in text.chars() {
        let bbox = style.font.bounding_box(c).ok_or(Error::GlyphNotFound(c))?;
        let advance = style.font.advance_width(c).ok_or(Error::GlyphNotFound(c))?;

        let to_page = font_matrix.multiply(&rendering).multiply(&text_matrix);
        let glyph_rectangle = to_page.transform_rect(&bbox);
        let start_base_line = to_page.transform_point(Point::new(0.0, 0.0));
        let end_base_line = to_page.transform_point(Point::new(advance, 0.0));
        let width = start_base_line.distance_to(&end_base_line);

        letters.push(Letter {
            value: c.to_string(),
            glyph_rectangle,
            start_base_line,
            end_base_line,
            width,
            advance_offset: offset,
            font_size: style.font_size,
            font: style.font_id,
            fill_color: style.fill_color,
            point_size: style.font_size,
            text_sequence: 0,
        });

        offset += width;
        text_matrix = TransformationMatrix::translate(width, 0.0).multiply(&text_matrix);
    }

    Ok(letters)
}

pub(crate) fn stamp_sequence(letters: &mut [Letter], text_sequence: u64) {
    for letter in letters {
        letter.text_sequence = text_sequence;
    }
}

/// `BT /F size Tf x y Td (run) Tj ... ET`.
///
/// Whitespace is not written: it ends the current run and the next run is
/// moved to its laid out position with a relative `Td`.
pub(crate) fn show_text_ops(
    text: &str,
    letters: &[Letter],
    font: &dyn FontProgram,
    font_name: &str,
    font_size: f64,
    position: Point,
) -> Result<Vec<Op>> {
    // (offset of the first letter, encoded bytes)
    let mut runs: Vec<(f64, SmallVec<[u8; 32]>)> = Vec::new();
    let mut current: Option<(f64, SmallVec<[u8; 32]>)> = None;

    for (c, letter) in text.chars().zip(letters) {
        if c.is_whitespace() {
            runs.extend(current.take());
            continue;
        }
        let byte = font.encode_char(c).ok_or(Error::GlyphNotFound(c))?;
        current
            .get_or_insert_with(|| (letter.advance_offset, SmallVec::new()))
            .1
            .push(byte);
    }
    runs.extend(current);

    let mut ops = vec![
        Op::BeginText,
        Op::SetFontAndSize {
            font: font_name.to_string(),
            size: font_size,
        },
        Op::MoveTextPosition {
            tx: position.x,
            ty: position.y,
        },
    ];

    let mut line_start = 0.0;
    for (start, bytes) in runs {
        let tx = start - line_start;
        if tx != 0.0 {
            ops.push(Op::MoveTextPosition { tx, ty: 0.0 });
            line_start = start;
        }
        ops.push(Op::ShowText {
            bytes: bytes.into_vec(),
        });
    }
    ops.push(Op::EndText);

    Ok(ops)
}
