//! Pages and the builder that appends drawing operations to them

use std::rc::Rc;

use crate::content::{ContentStream, PageContents};
use crate::document::DocumentStore;
use crate::errors::{Error, Result};
use crate::font::FontId;
use crate::graphics::{Point, Rect, RgbColor};
use crate::image::AddedImage;
use crate::matrix::TransformationMatrix;
use crate::ops::Op;
use crate::resources::PageResources;
use crate::text::{check_font_size, layout, show_text_ops, stamp_sequence, Letter, TextStyle};
use crate::units::Pt;

/// Control point distance for approximating a quarter circle with a cubic bezier
const KAPPA: f64 = 0.552_284_749_8;

/// Colors in effect after a `set_*_color` call, undone by `reset_color`
#[derive(Debug, Copy, Clone, PartialEq)]
struct ColorState {
    stroke: RgbColor,
    fill: RgbColor,
}

/// A page of the document
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub(crate) media_box: Rect,
    pub(crate) contents: PageContents,
    pub(crate) resources: PageResources,
    color_stack: Vec<ColorState>,
}

impl PdfPage {
    pub(crate) fn new(width: Pt, height: Pt) -> Self {
        Self {
            media_box: Rect::new(0.0, 0.0, width.0, height.0),
            contents: PageContents::default(),
            resources: PageResources::new(),
            color_stack: Vec::new(),
        }
    }

    pub fn media_box(&self) -> &Rect {
        &self.media_box
    }

    pub fn contents(&self) -> &PageContents {
        &self.contents
    }

    pub fn resources(&self) -> &PageResources {
        &self.resources
    }

    fn current_colors(&self) -> ColorState {
        self.color_stack.last().copied().unwrap_or(ColorState {
            stroke: RgbColor::BLACK,
            fill: RgbColor::BLACK,
        })
    }
}

/// Appends operations to the current content stream of one page.
///
/// Obtained from [`crate::PdfDocumentBuilder::add_page`] or
/// [`crate::PdfDocumentBuilder::page`].
pub struct PageBuilder<'a> {
    pub(crate) page: &'a mut PdfPage,
    pub(crate) store: &'a mut DocumentStore,
}

impl<'a> PageBuilder<'a> {
    pub(crate) fn new(page: &'a mut PdfPage, store: &'a mut DocumentStore) -> Self {
        Self { page, store }
    }

    pub fn page(&self) -> &PdfPage {
        self.page
    }

    /// Operations of the current content stream
    pub fn operations(&self) -> &[Op] {
        self.page.contents.current().ops()
    }

    fn push(&mut self, op: Op) {
        self.page.contents.current_mut().push(op);
    }

    fn stream(&mut self) -> &mut ContentStream {
        self.page.contents.current_mut()
    }

    // --- content streams

    /// Inserts a new content stream before the current one and makes it current
    pub fn new_content_stream_before(&mut self) -> usize {
        self.page.contents.new_stream_before()
    }

    /// Inserts a new content stream after the current one and makes it current
    pub fn new_content_stream_after(&mut self) -> usize {
        self.page.contents.new_stream_after()
    }

    pub fn select_content_stream(&mut self, index: isize) -> Result<()> {
        self.page.contents.select(index)
    }

    pub fn content_stream_count(&self) -> usize {
        self.page.contents.count()
    }

    pub fn current_content_stream_index(&self) -> usize {
        self.page.contents.current_index()
    }

    // --- paths

    fn begin_line_width(&mut self, line_width: f64) {
        if line_width != 1.0 {
            self.push(Op::SaveGraphicsState);
            self.push(Op::SetLineWidth { width: line_width });
        }
    }

    fn end_line_width(&mut self, line_width: f64) {
        if line_width != 1.0 {
            self.push(Op::RestoreGraphicsState);
        }
    }

    fn paint(&mut self, fill: bool) {
        self.push(if fill {
            Op::FillStrokeEvenOdd
        } else {
            Op::StrokePath
        });
    }

    /// Straight line between two points. The line width is only set (inside
    /// its own `q` / `Q`) when it differs from the PDF default of 1.
    pub fn draw_line(&mut self, from: Point, to: Point, line_width: f64) -> &mut Self {
        self.begin_line_width(line_width);
        self.stream().extend([
            Op::MoveTo {
                x: from.x,
                y: from.y,
            },
            Op::LineTo { x: to.x, y: to.y },
            Op::StrokePath,
        ]);
        self.end_line_width(line_width);
        self
    }

    /// Rectangle with its bottom left corner at `position`, stroked or
    /// filled and stroked (even-odd)
    pub fn draw_rectangle(
        &mut self,
        position: Point,
        width: f64,
        height: f64,
        line_width: f64,
        fill: bool,
    ) -> &mut Self {
        self.begin_line_width(line_width);
        self.push(Op::AppendRectangle {
            x: position.x,
            y: position.y,
            width,
            height,
        });
        self.paint(fill);
        self.end_line_width(line_width);
        self
    }

    pub fn draw_triangle(
        &mut self,
        p1: Point,
        p2: Point,
        p3: Point,
        line_width: f64,
        fill: bool,
    ) -> &mut Self {
        self.begin_line_width(line_width);
        self.stream().extend([
            Op::MoveTo { x: p1.x, y: p1.y },
            Op::LineTo { x: p2.x, y: p2.y },
            Op::LineTo { x: p3.x, y: p3.y },
            Op::ClosePath,
        ]);
        self.paint(fill);
        self.end_line_width(line_width);
        self
    }

    /// Circle made of four bezier curves
    pub fn draw_circle(
        &mut self,
        center: Point,
        diameter: f64,
        line_width: f64,
        fill: bool,
    ) -> &mut Self {
        let r = diameter / 2.0;
        let k = r * KAPPA;
        let (x, y) = (center.x, center.y);

        self.begin_line_width(line_width);
        self.stream().extend([
            Op::MoveTo { x: x + r, y },
            Op::CurveTo {
                x1: x + r,
                y1: y + k,
                x2: x + k,
                y2: y + r,
                x3: x,
                y3: y + r,
            },
            Op::CurveTo {
                x1: x - k,
                y1: y + r,
                x2: x - r,
                y2: y + k,
                x3: x - r,
                y3: y,
            },
            Op::CurveTo {
                x1: x - r,
                y1: y - k,
                x2: x - k,
                y2: y - r,
                x3: x,
                y3: y - r,
            },
            Op::CurveTo {
                x1: x + k,
                y1: y - r,
                x2: x + r,
                y2: y - k,
                x3: x + r,
                y3: y,
            },
            Op::ClosePath,
        ]);
        self.paint(fill);
        self.end_line_width(line_width);
        self
    }

    // --- colors

    /// `q r g b RG`, undone by [`Self::reset_color`]
    pub fn set_stroke_color(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        let color = RgbColor::new(r, g, b);
        let [r, g, b] = color.to_decimal();
        let state = ColorState {
            stroke: color,
            ..self.page.current_colors()
        };
        self.page.color_stack.push(state);
        self.stream()
            .extend([Op::SaveGraphicsState, Op::SetStrokeColorRgb { r, g, b }]);
        self
    }

    /// `q r g b rg`, undone by [`Self::reset_color`]. Text added afterwards
    /// reports this color as its fill color.
    pub fn set_text_and_fill_color(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        let color = RgbColor::new(r, g, b);
        let [r, g, b] = color.to_decimal();
        let state = ColorState {
            fill: color,
            ..self.page.current_colors()
        };
        self.page.color_stack.push(state);
        self.stream()
            .extend([Op::SaveGraphicsState, Op::SetFillColorRgb { r, g, b }]);
        self
    }

    /// Restores the colors in effect before the last `set_*_color` call.
    /// Does nothing if no color was set.
    pub fn reset_color(&mut self) -> &mut Self {
        if self.page.color_stack.pop().is_some() {
            self.push(Op::RestoreGraphicsState);
        } else {
            log::warn!("reset_color without a preceding set_*_color call, ignored");
        }
        self
    }

    // --- text

    fn text_style<'f>(
        &self,
        program: &'f dyn crate::font::FontProgram,
        font: FontId,
        font_size: f64,
        position: Point,
    ) -> TextStyle<'f> {
        TextStyle {
            font: program,
            font_id: font,
            font_size,
            position,
            fill_color: self.page.current_colors().fill,
        }
    }

    /// Lays out the text without adding anything to the page
    pub fn measure_text(
        &mut self,
        text: &str,
        font_size: f64,
        position: Point,
        font: FontId,
    ) -> Result<Vec<Letter>> {
        check_font_size(font_size)?;
        let program = Rc::clone(&self.store.font(font)?.program);
        let style = self.text_style(program.as_ref(), font, font_size, position);
        let mut letters = layout(text, &style)?;
        stamp_sequence(&mut letters, self.store.next_text_sequence());
        Ok(letters)
    }

    /// Writes the text at `position` (the start of the baseline) and
    /// returns the placed letters. Nothing is written if any character has
    /// no glyph in the font.
    pub fn add_text(
        &mut self,
        text: &str,
        font_size: f64,
        position: Point,
        font: FontId,
    ) -> Result<Vec<Letter>> {
        check_font_size(font_size)?;
        let registered = self.store.font(font)?;
        let program = Rc::clone(&registered.program);
        let name = registered.key.name.clone();
        let reference = registered.reference;

        let style = self.text_style(program.as_ref(), font, font_size, position);
        let mut letters = layout(text, &style)?;
        let ops = show_text_ops(text, &letters, program.as_ref(), &name, font_size, position)?;
        stamp_sequence(&mut letters, self.store.next_text_sequence());

        self.page.resources.register_font(&name, reference);
        self.stream().extend(ops);
        Ok(letters)
    }

    // --- images

    /// Stores the JPEG in the document and draws it into `placement`
    pub fn add_jpeg(&mut self, bytes: &[u8], placement: Rect) -> Result<AddedImage> {
        let image = self.store.add_jpeg_image(bytes)?;
        self.add_image(&image, placement)?;
        Ok(image)
    }

    /// Stores the PNG in the document and draws it into `placement`
    pub fn add_png(&mut self, bytes: &[u8], placement: Rect) -> Result<AddedImage> {
        let image = self.store.add_png_image(bytes)?;
        self.add_image(&image, placement)?;
        Ok(image)
    }

    /// Draws an image already stored in this document into `placement`.
    /// Placing the same image twice on a page reuses its resource name.
    pub fn add_image(&mut self, image: &AddedImage, placement: Rect) -> Result<()> {
        if !self.store.owns_image(image) {
            return Err(Error::InvalidArgument(format!(
                "image {} does not belong to this document",
                image.id
            )));
        }

        let name = self.page.resources.register_xobject(image.reference);
        let matrix = TransformationMatrix::from_values(
            placement.width(),
            0.0,
            0.0,
            placement.height(),
            placement.left(),
            placement.bottom(),
        );
        self.stream().extend([
            Op::SaveGraphicsState,
            Op::ModifyCurrentTransformation { matrix },
            Op::InvokeXObject { name },
            Op::RestoreGraphicsState,
        ]);
        Ok(())
    }
}
