use std::rc::Rc;

use pdfbuilder::{
    Error, ForeignDocument, MetricsFont, Mm, Op, PageSize, PdfDocumentBuilder, PdfSaveOptions,
    Point, Rect, TransformationMatrix,
};
use pretty_assertions::assert_eq;

fn font() -> Rc<MetricsFont> {
    Rc::new(MetricsFont::monospace("Courier", 1000, 600.0, 800.0, -200.0))
}

fn jpeg() -> Vec<u8> {
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .encode(&[90u8; 8 * 8 * 3], 8, 8, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

#[test]
fn add_text_matches_measure_text() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let mut page = doc.add_page_with_size(PageSize::A4);

    let position = Point::new(72.0, 700.0);
    let added = page.add_text("Hello World", 11.0, position, f).unwrap();
    let measured = page.measure_text("Hello World", 11.0, position, f).unwrap();

    assert_eq!(added.len(), measured.len());
    for (a, m) in added.iter().zip(&measured) {
        assert_eq!(a.value, m.value);
        assert_eq!(a.glyph_rectangle, m.glyph_rectangle);
        assert_eq!(a.start_base_line, m.start_base_line);
        assert_eq!(a.end_base_line, m.end_base_line);
        assert_eq!(a.advance_offset, m.advance_offset);
    }
    assert!(measured[0].text_sequence > added[0].text_sequence);
}

#[test]
fn text_sequence_increases_across_pages() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let first = doc
        .add_page_with_size(PageSize::A4)
        .add_text("a", 10.0, Point::new(0.0, 0.0), f)
        .unwrap();
    let second = doc
        .add_page_with_size(PageSize::Letter)
        .measure_text("b", 10.0, Point::new(0.0, 0.0), f)
        .unwrap();
    assert!(second[0].text_sequence > first[0].text_sequence);
}

#[test]
fn text_operations_and_font_resource() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let mut page = doc.add_page_with_size(PageSize::A4);
    page.add_text("ab", 10.0, Point::new(10.0, 20.0), f).unwrap();

    assert_eq!(
        page.operations(),
        &[
            Op::BeginText,
            Op::SetFontAndSize {
                font: "F1".to_string(),
                size: 10.0
            },
            Op::MoveTextPosition { tx: 10.0, ty: 20.0 },
            Op::ShowText {
                bytes: b"ab".to_vec()
            },
            Op::EndText,
        ]
    );
    assert!(page.page().resources().has_font("F1"));
}

#[test]
fn failed_text_leaves_page_untouched() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let mut page = doc.add_page_with_size(PageSize::A4);

    let err = page
        .add_text("abc€", 10.0, Point::new(0.0, 0.0), f)
        .unwrap_err();
    assert!(matches!(err, Error::GlyphNotFound('€')));

    let err = page.add_text("abc", 0.0, Point::new(0.0, 0.0), f).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    assert!(page.operations().is_empty());
    assert!(!page.page().resources().has_font("F1"));
}

#[test]
fn unknown_font_is_rejected() {
    let mut other = PdfDocumentBuilder::new();
    other.register_font(font());
    let foreign_font = other.register_font(font());

    let mut doc = PdfDocumentBuilder::new();
    let mut page = doc.add_page_with_size(PageSize::A4);
    let err = page
        .measure_text("a", 10.0, Point::new(0.0, 0.0), foreign_font)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFont(_)));
}

#[test]
fn select_content_stream_bounds() {
    let mut doc = PdfDocumentBuilder::new();
    let mut page = doc.add_page_with_size(PageSize::A4);
    page.new_content_stream_after();
    assert_eq!(page.content_stream_count(), 2);

    assert!(matches!(
        page.select_content_stream(-1),
        Err(Error::IndexOutOfRange { index: -1, len: 2, .. })
    ));
    assert!(matches!(
        page.select_content_stream(2),
        Err(Error::IndexOutOfRange { index: 2, len: 2, .. })
    ));
    assert_eq!(page.current_content_stream_index(), 1);

    page.select_content_stream(0).unwrap();
    page.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 1.0);
    page.select_content_stream(1).unwrap();
    assert!(page.operations().is_empty());
}

#[test]
fn stream_before_is_written_first() {
    let mut doc = PdfDocumentBuilder::new();
    let mut page = doc.add_page_with_size(PageSize::A4);
    page.draw_rectangle(Point::new(0.0, 0.0), 10.0, 10.0, 1.0, false);
    page.new_content_stream_before();
    page.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 1.0);

    let streams = page.page().contents().streams();
    assert_eq!(streams[0].ops()[0], Op::MoveTo { x: 0.0, y: 0.0 });
    assert_eq!(
        streams[1].ops()[0],
        Op::AppendRectangle {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0
        }
    );
}

#[test]
fn jpeg_placement() {
    let mut doc = PdfDocumentBuilder::new();
    let mut page = doc.add_page_with_size(PageSize::A4);
    let image = page
        .add_jpeg(&jpeg(), Rect::from_xywh(10.0, 20.0, 100.0, 50.0))
        .unwrap();
    assert_eq!((image.width, image.height), (8, 8));

    assert_eq!(
        page.operations(),
        &[
            Op::SaveGraphicsState,
            Op::ModifyCurrentTransformation {
                matrix: TransformationMatrix::from_values(100.0, 0.0, 0.0, 50.0, 10.0, 20.0)
            },
            Op::InvokeXObject {
                name: "I1".to_string()
            },
            Op::RestoreGraphicsState,
        ]
    );
}

#[test]
fn same_image_twice_shares_a_name() {
    let mut doc = PdfDocumentBuilder::new();
    let image = doc.add_jpeg_image(&jpeg()).unwrap();
    let mut page = doc.add_page_with_size(PageSize::A4);
    page.add_image(&image, Rect::from_xywh(0.0, 0.0, 8.0, 8.0)).unwrap();
    page.add_image(&image, Rect::from_xywh(50.0, 0.0, 8.0, 8.0)).unwrap();

    let names = page
        .operations()
        .iter()
        .filter_map(|op| op.xobject_name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["I1", "I1"]);
    assert_eq!(page.page().resources().image_counter(), 2);
}

#[test]
fn image_from_another_document_is_rejected() {
    let mut other = PdfDocumentBuilder::new();
    other.add_jpeg_image(&jpeg()).unwrap();
    other.add_jpeg_image(&jpeg()).unwrap();
    let foreign = other.add_jpeg_image(&jpeg()).unwrap();

    let mut doc = PdfDocumentBuilder::new();
    let mut page = doc.add_page_with_size(PageSize::A4);
    assert!(page
        .add_image(&foreign, Rect::from_xywh(0.0, 0.0, 1.0, 1.0))
        .is_err());
}

#[test]
fn saved_document_reads_back() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    {
        let mut page = doc.add_page(Mm(210.0), Mm(297.0));
        page.set_stroke_color(255, 0, 0)
            .draw_circle(Point::new(100.0, 100.0), 50.0, 2.0, true)
            .reset_color();
        page.add_text("two words", 12.0, Point::new(72.0, 720.0), f)
            .unwrap();
    }
    doc.add_page_with_size(PageSize::Letter)
        .draw_triangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
            1.0,
            false,
        );

    for compress in [false, true] {
        let bytes = doc
            .save(&PdfSaveOptions {
                compress,
                ..Default::default()
            })
            .unwrap();
        let reread = ForeignDocument::load_mem(&bytes).unwrap();
        assert_eq!(reread.page_count(), 2);

        let ops = reread.page(1).unwrap().operations().to_vec();
        let shown = ops
            .iter()
            .filter_map(|op| match op {
                Op::ShowText { bytes } => Some(bytes.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(shown, vec![b"two".to_vec(), b"words".to_vec()]);
        assert!(ops.contains(&Op::EndText));
    }
}

#[test]
fn page_lookup() {
    let mut doc = PdfDocumentBuilder::new();
    doc.add_page_with_size(PageSize::A4);
    doc.add_page_with_size(PageSize::Letter);
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.page(1).unwrap().page().media_box().right(), 612.0);
    assert!(doc.page(2).is_err());
}

#[test]
fn letters_of_one_call_share_their_sequence() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let mut page = doc.add_page_with_size(PageSize::A4);

    let first = page.add_text("Hello World", 12.0, Point::new(72.0, 700.0), f).unwrap();
    let second = page.add_text("again", 12.0, Point::new(72.0, 680.0), f).unwrap();

    let sequence = first[0].text_sequence;
    assert!(first.iter().all(|l| l.text_sequence == sequence));
    assert!(second.iter().all(|l| l.text_sequence == second[0].text_sequence));
    assert!(second[0].text_sequence > sequence);
}

#[test]
fn failed_text_does_not_use_a_sequence_number() {
    let mut doc = PdfDocumentBuilder::new();
    let f = doc.register_font(font());
    let mut page = doc.add_page_with_size(PageSize::A4);

    let before = page.add_text("ab", 10.0, Point::new(0.0, 0.0), f).unwrap();
    assert!(page.add_text("a€", 10.0, Point::new(0.0, 0.0), f).is_err());
    assert!(page.measure_text("a€", 10.0, Point::new(0.0, 0.0), f).is_err());
    let after = page.measure_text("cd", 10.0, Point::new(0.0, 0.0), f).unwrap();

    assert_eq!(after[0].text_sequence, before[0].text_sequence + 1);
}

#[test]
fn font_of_another_document_with_the_same_number_is_rejected() {
    let mut other = PdfDocumentBuilder::new();
    let wide = MetricsFont::monospace("Wide", 1000, 100.0, 800.0, -200.0);
    let foreign_font = other.register_font(Rc::new(wide));

    let mut doc = PdfDocumentBuilder::new();
    let own = doc.register_font(font());
    assert_eq!(doc.font(own).unwrap().key.name, other.font(foreign_font).unwrap().key.name);

    let mut page = doc.add_page_with_size(PageSize::A4);
    let err = page
        .measure_text("a", 10.0, Point::new(0.0, 0.0), foreign_font)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFont(_)));
    let err = page
        .add_text("a", 10.0, Point::new(0.0, 0.0), foreign_font)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFont(_)));
    assert!(page.operations().is_empty());
}

#[test]
fn image_of_another_document_with_the_same_object_id_is_rejected() {
    let mut other = PdfDocumentBuilder::new();
    let foreign = other.add_jpeg_image(&jpeg()).unwrap();

    // the font takes the same object number the image has in `other`
    let mut doc = PdfDocumentBuilder::new();
    doc.register_font(font());
    assert!(doc.objects().objects.contains_key(&foreign.object_id()));

    let mut page = doc.add_page_with_size(PageSize::A4);
    let err = page
        .add_image(&foreign, Rect::from_xywh(0.0, 0.0, 10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(page.operations().is_empty());
    assert!(page.page().resources().is_empty());
}
