//! Writing side of the `lopdf` bridge: operations to content streams and the
//! builder to a complete PDF file.

use lopdf::content::{Content, Operation};
use lopdf::Dictionary as LoDictionary;
use lopdf::Object::{Array, Dictionary, Integer, Name, Real, Reference};
use lopdf::Stream as LoStream;
use lopdf::StringFormat::Literal;
use serde_derive::{Deserialize, Serialize};

use crate::constants::*;
use crate::document::PdfDocumentBuilder;
use crate::errors::Result;
use crate::ops::Op;
use crate::utils::compress_bytes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfSaveOptions {
    /// Flate-compress the page content streams
    pub compress: bool,
    /// Version written to the file header
    pub version: String,
}

impl Default for PdfSaveOptions {
    fn default() -> Self {
        Self {
            compress: !(std::cfg!(debug_assertions)),
            version: "1.7".to_string(),
        }
    }
}

fn real(v: f64) -> lopdf::Object {
    Real(v as f32)
}

pub(crate) fn op_to_operation(op: &Op) -> Operation {
    match op {
        Op::SaveGraphicsState => Operation::new(OP_GS_SAVE, vec![]),
        Op::RestoreGraphicsState => Operation::new(OP_GS_RESTORE, vec![]),
        Op::ModifyCurrentTransformation { matrix } => {
            Operation::new(OP_GS_MODIFY_CTM, matrix.to_operands())
        }
        Op::SetLineWidth { width } => Operation::new(OP_PATH_STATE_SET_LINE_WIDTH, vec![real(*width)]),
        Op::MoveTo { x, y } => Operation::new(OP_PATH_CONST_MOVE_TO, vec![real(*x), real(*y)]),
        Op::LineTo { x, y } => Operation::new(OP_PATH_CONST_LINE_TO, vec![real(*x), real(*y)]),
        Op::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x3,
            y3,
        } => Operation::new(
            OP_PATH_CONST_4BEZIER,
            [x1, y1, x2, y2, x3, y3].into_iter().map(|v| real(*v)).collect(),
        ),
        Op::ClosePath => Operation::new(OP_PATH_CONST_CLOSE_SUBPATH, vec![]),
        Op::AppendRectangle {
            x,
            y,
            width,
            height,
        } => Operation::new(
            OP_PATH_CONST_RECT,
            vec![real(*x), real(*y), real(*width), real(*height)],
        ),
        Op::StrokePath => Operation::new(OP_PATH_PAINT_STROKE, vec![]),
        Op::FillStrokeEvenOdd => Operation::new(OP_PATH_PAINT_FILL_STROKE_EO, vec![]),
        Op::SetStrokeColorRgb { r, g, b } => Operation::new(
            OP_COLOR_SET_STROKE_CS_DEVICERGB,
            vec![real(*r), real(*g), real(*b)],
        ),
        Op::SetFillColorRgb { r, g, b } => Operation::new(
            OP_COLOR_SET_FILL_CS_DEVICERGB,
            vec![real(*r), real(*g), real(*b)],
        ),
        Op::BeginText => Operation::new(OP_TEXT_BEGIN, vec![]),
        Op::EndText => Operation::new(OP_TEXT_END, vec![]),
        Op::SetFontAndSize { font, size } => Operation::new(
            OP_TEXT_SET_FONT,
            vec![Name(font.as_bytes().to_vec()), real(*size)],
        ),
        Op::MoveTextPosition { tx, ty } => {
            Operation::new(OP_TEXT_MOVE, vec![real(*tx), real(*ty)])
        }
        Op::ShowText { bytes } => Operation::new(OP_TEXT_SHOW, vec![lopdf::Object::String(bytes.clone(), Literal)]),
        Op::InvokeXObject { name } => {
            Operation::new(OP_XOBJECT_INVOKE, vec![Name(name.as_bytes().to_vec())])
        }
        Op::Other { operator, operands } => Operation::new(operator, operands.clone()),
    }
}

/// Encodes the operations as content stream bytes
pub fn encode_ops(ops: &[Op]) -> Result<Vec<u8>> {
    let content = Content {
        operations: ops.iter().map(op_to_operation).collect::<Vec<_>>(),
    };
    Ok(content.encode()?)
}

/// Writes the document (fonts, images, copied objects and all pages) into
/// PDF bytes. The builder itself is not modified.
pub(crate) fn serialize_document(pdf: &PdfDocumentBuilder, opts: &PdfSaveOptions) -> Result<Vec<u8>> {
    let mut doc = pdf.store.objects.clone();
    doc.version = opts.version.clone();

    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::with_capacity(pdf.pages.len());

    for page in &pdf.pages {
        let mut contents = Vec::new();
        for stream in page.contents.streams().iter().filter(|s| !s.is_empty()) {
            let bytes = encode_ops(stream.ops())?;
            let stream = if opts.compress {
                let dict = LoDictionary::from_iter(vec![("Filter", Name("FlateDecode".into()))]);
                LoStream::new(dict, compress_bytes(&bytes))
            } else {
                LoStream::new(LoDictionary::new(), bytes)
            };
            contents.push(Reference(doc.add_object(stream.with_compression(false))));
        }

        let page_dict = LoDictionary::from_iter(vec![
            ("Type", "Page".into()),
            ("Parent", Reference(pages_id)),
            ("MediaBox", Array(page.media_box.to_array())),
            ("Resources", Dictionary(page.resources.to_dictionary())),
            ("Contents", Array(contents)),
        ]);
        page_ids.push(Reference(doc.add_object(page_dict)));
    }

    let pages = LoDictionary::from_iter(vec![
        ("Type", "Pages".into()),
        ("Count", Integer(page_ids.len() as i64)),
        ("Kids", Array(page_ids)),
    ]);
    doc.objects.insert(pages_id, Dictionary(pages));

    let catalog_id = doc.add_object(LoDictionary::from_iter(vec![
        ("Type", "Catalog".into()),
        ("Pages", Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Reference(catalog_id));

    log::debug!(
        "writing {} page(s), {} object(s)",
        pdf.pages.len(),
        doc.objects.len()
    );

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
