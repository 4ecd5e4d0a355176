//! deserialize.rs
//!
//! Reading side of the `lopdf` bridge: resolving indirect objects,
//! decoding stream bytes and converting `lopdf` content operations into
//! typed [`Op`]s.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary as LoDictionary, Document as LoDocument, Object, ObjectId};

use crate::constants::*;
use crate::errors::{Error, Result};
use crate::matrix::TransformationMatrix;
use crate::ops::Op;
use crate::utils::decompress_bytes;

/// Follows indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(obj: &'a Object, doc: &'a LoDocument) -> Result<&'a Object> {
    let mut current = obj;
    // reference chains longer than this are cycles
    for _ in 0..32 {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            other => return Ok(other),
        }
    }
    Err(Error::MalformedDocument(
        "cyclic chain of indirect references".to_string(),
    ))
}

/// The entry must be an indirect reference (fonts and XObjects in a
/// resource dictionary).
pub(crate) fn expect_reference(obj: &Object, what: &str) -> Result<ObjectId> {
    match obj {
        Object::Reference(id) => Ok(*id),
        _ => Err(Error::MalformedDocument(format!(
            "{what} is not an indirect reference"
        ))),
    }
}

pub(crate) fn resolve_dict<'a>(
    obj: &'a Object,
    doc: &'a LoDocument,
    what: &str,
) -> Result<&'a LoDictionary> {
    match resolve(obj, doc)? {
        Object::Dictionary(d) => Ok(d),
        _ => Err(Error::MalformedDocument(format!("{what} is not a dictionary"))),
    }
}

fn filter_names(filter: &Object) -> Vec<Vec<u8>> {
    match filter {
        Object::Name(n) => vec![n.clone()],
        Object::Array(items) => items
            .iter()
            .filter_map(|i| i.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Decoded bytes of a stream. Image codecs (DCT, JPX, JBIG2, CCITT) are
/// not decoded and give [`Error::UnsupportedFilter`].
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    let filters = match stream.dict.get(b"Filter") {
        Ok(f) => filter_names(f),
        Err(_) => Vec::new(),
    };
    let has_params = stream.dict.get(b"DecodeParms").is_ok();

    match filters.as_slice() {
        [] => Ok(stream.content.clone()),
        [f] if f == b"FlateDecode" && !has_params => decompress_bytes(&stream.content).map_err(|e| {
            Error::MalformedDocument(format!("invalid FlateDecode data: {e}"))
        }),
        _ if filters.iter().all(|f| {
            matches!(
                f.as_slice(),
                b"FlateDecode" | b"LZWDecode" | b"ASCII85Decode" | b"ASCIIHexDecode"
            )
        }) =>
        {
            Ok(stream.decompressed_content()?)
        }
        _ => Err(Error::UnsupportedFilter(
            filters
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect::<Vec<_>>()
                .join(" "),
        )),
    }
}

/// Resources of a page dictionary, walking up `/Parent` for inherited resources.
pub(crate) fn page_resources(
    page_id: ObjectId,
    doc: &LoDocument,
) -> Result<Option<LoDictionary>> {
    let mut node = doc.get_object(page_id)?.as_dict()?;
    for _ in 0..64 {
        if let Ok(res) = node.get(b"Resources") {
            return resolve_dict(res, doc, "/Resources").map(|d| Some(d.clone()));
        }
        match node.get(b"Parent") {
            Ok(parent) => node = resolve_dict(parent, doc, "/Parent")?,
            Err(_) => return Ok(None),
        }
    }
    Err(Error::MalformedDocument("page tree is too deep".to_string()))
}

/// Decodes a content stream into typed operations.
pub(crate) fn parse_content(bytes: &[u8]) -> Result<Vec<Op>> {
    let content = Content::decode(bytes)?;
    Ok(content.operations.into_iter().map(parse_op).collect())
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f64; N]> {
    if operands.len() != N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(operands) {
        *slot = number(obj)?;
    }
    Some(out)
}

fn name(operands: &[Object]) -> Option<String> {
    match operands {
        [Object::Name(n)] => Some(String::from_utf8_lossy(n).into_owned()),
        _ => None,
    }
}

/// Converts one `lopdf` operation. Operators with unexpected operands are
/// kept as [`Op::Other`] instead of failing.
pub(crate) fn parse_op(op: Operation) -> Op {
    let typed = match op.operator.as_str() {
        OP_GS_SAVE if op.operands.is_empty() => Some(Op::SaveGraphicsState),
        OP_GS_RESTORE if op.operands.is_empty() => Some(Op::RestoreGraphicsState),
        OP_GS_MODIFY_CTM => numbers::<6>(&op.operands).map(|m| Op::ModifyCurrentTransformation {
            matrix: TransformationMatrix::from_array(m),
        }),
        OP_PATH_STATE_SET_LINE_WIDTH => {
            numbers::<1>(&op.operands).map(|[width]| Op::SetLineWidth { width })
        }
        OP_PATH_CONST_MOVE_TO => numbers::<2>(&op.operands).map(|[x, y]| Op::MoveTo { x, y }),
        OP_PATH_CONST_LINE_TO => numbers::<2>(&op.operands).map(|[x, y]| Op::LineTo { x, y }),
        OP_PATH_CONST_4BEZIER => {
            numbers::<6>(&op.operands).map(|[x1, y1, x2, y2, x3, y3]| Op::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x3,
                y3,
            })
        }
        OP_PATH_CONST_CLOSE_SUBPATH if op.operands.is_empty() => Some(Op::ClosePath),
        OP_PATH_CONST_RECT => {
            numbers::<4>(&op.operands).map(|[x, y, width, height]| Op::AppendRectangle {
                x,
                y,
                width,
                height,
            })
        }
        OP_PATH_PAINT_STROKE if op.operands.is_empty() => Some(Op::StrokePath),
        OP_PATH_PAINT_FILL_STROKE_EO if op.operands.is_empty() => Some(Op::FillStrokeEvenOdd),
        OP_COLOR_SET_STROKE_CS_DEVICERGB => {
            numbers::<3>(&op.operands).map(|[r, g, b]| Op::SetStrokeColorRgb { r, g, b })
        }
        OP_COLOR_SET_FILL_CS_DEVICERGB => {
            numbers::<3>(&op.operands).map(|[r, g, b]| Op::SetFillColorRgb { r, g, b })
        }
        OP_TEXT_BEGIN if op.operands.is_empty() => Some(Op::BeginText),
        OP_TEXT_END if op.operands.is_empty() => Some(Op::EndText),
        OP_TEXT_SET_FONT => match op.operands.as_slice() {
            [Object::Name(font), size] => number(size).map(|size| Op::SetFontAndSize {
                font: String::from_utf8_lossy(font).into_owned(),
                size,
            }),
            _ => None,
        },
        OP_TEXT_MOVE => numbers::<2>(&op.operands).map(|[tx, ty]| Op::MoveTextPosition { tx, ty }),
        OP_TEXT_SHOW => match op.operands.as_slice() {
            [Object::String(bytes, _)] => Some(Op::ShowText {
                bytes: bytes.clone(),
            }),
            _ => None,
        },
        OP_XOBJECT_INVOKE => name(&op.operands).map(|name| Op::InvokeXObject { name }),
        _ => None,
    };

    typed.unwrap_or(Op::Other {
        operator: op.operator,
        operands: op.operands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_and_unknown_operators() {
        let ops = parse_content(b"q 1 0 0 1 10 20 cm /I1 Do Q BT /F1 12 Tf (Hi) Tj ET 0.5 g").unwrap();
        assert_eq!(
            ops,
            vec![
                Op::SaveGraphicsState,
                Op::ModifyCurrentTransformation {
                    matrix: TransformationMatrix::translate(10.0, 20.0)
                },
                Op::InvokeXObject {
                    name: "I1".to_string()
                },
                Op::RestoreGraphicsState,
                Op::BeginText,
                Op::SetFontAndSize {
                    font: "F1".to_string(),
                    size: 12.0
                },
                Op::ShowText {
                    bytes: b"Hi".to_vec()
                },
                Op::EndText,
                Op::Other {
                    operator: "g".to_string(),
                    operands: vec![Object::Real(0.5)]
                },
            ]
        );
    }

    #[test]
    fn malformed_operands_are_kept_verbatim() {
        let op = parse_op(Operation::new("Tf", vec![Object::Integer(12)]));
        assert_eq!(
            op,
            Op::Other {
                operator: "Tf".to_string(),
                operands: vec![Object::Integer(12)]
            }
        );
    }
}
