use lopdf::{dictionary, Document, Object, Stream};
use pdfbuilder::{
    to_png, to_rgb_raster, ColorSpaceDetails, Error, IndexedColorSpace, SampledImage,
    SeparationColorSpace, XObjectImage,
};
use pretty_assertions::assert_eq;

fn image(samples: Vec<u8>, width: u32, height: u32, color_space: ColorSpaceDetails) -> SampledImage {
    SampledImage {
        samples,
        width,
        height,
        bits_per_component: 8,
        color_space,
    }
}

#[test]
fn cmyk_pixels() {
    let cyan = image(vec![255, 0, 0, 0], 1, 1, ColorSpaceDetails::DeviceCmyk);
    assert_eq!(to_rgb_raster(&cyan).unwrap().get_pixel(0, 0).0, [0, 255, 255]);

    let black = image(vec![0, 0, 0, 255], 1, 1, ColorSpaceDetails::DeviceCmyk);
    assert_eq!(to_rgb_raster(&black).unwrap().get_pixel(0, 0).0, [0, 0, 0]);
}

#[test]
fn gray_and_rgb_pixels() {
    let gray = image(vec![0, 128, 255, 7], 2, 2, ColorSpaceDetails::DeviceGray);
    let raster = to_rgb_raster(&gray).unwrap();
    assert_eq!(raster.get_pixel(1, 0).0, [128, 128, 128]);
    assert_eq!(raster.get_pixel(1, 1).0, [7, 7, 7]);

    let rgb = image(vec![1, 2, 3, 4, 5, 6], 1, 2, ColorSpaceDetails::DeviceRgb);
    let raster = to_rgb_raster(&rgb).unwrap();
    assert_eq!(raster.get_pixel(0, 1).0, [4, 5, 6]);
}

#[test]
fn size_mismatch_is_rejected() {
    let short = image(vec![0; 11], 2, 2, ColorSpaceDetails::DeviceRgb);
    assert!(to_rgb_raster(&short).is_none());

    let long = image(vec![0; 13], 2, 2, ColorSpaceDetails::DeviceRgb);
    assert!(to_rgb_raster(&long).is_none());

    let empty = image(vec![], 0, 0, ColorSpaceDetails::DeviceRgb);
    assert!(to_rgb_raster(&empty).is_none());
}

#[test]
fn only_eight_bit_samples() {
    let mut img = image(vec![0xFF], 8, 1, ColorSpaceDetails::DeviceGray);
    img.bits_per_component = 1;
    assert!(to_rgb_raster(&img).is_none());
    assert!(to_png(&img).is_none());
}

#[test]
fn indexed_over_cmyk() {
    let palette = IndexedColorSpace::new(
        ColorSpaceDetails::DeviceCmyk,
        1,
        vec![0, 0, 0, 0, 255, 0, 0, 0],
    )
    .unwrap();
    let img = image(vec![1, 0], 2, 1, ColorSpaceDetails::Indexed(palette));
    let raster = to_rgb_raster(&img).unwrap();
    assert_eq!(raster.get_pixel(0, 0).0, [0, 255, 255]);
    assert_eq!(raster.get_pixel(1, 0).0, [255, 255, 255]);
}

#[test]
fn separation_is_not_rasterized() {
    let sep = SeparationColorSpace::new(
        "Spot".to_string(),
        ColorSpaceDetails::DeviceCmyk,
        Object::Null,
    )
    .unwrap();
    let img = image(vec![0; 4], 2, 2, ColorSpaceDetails::Separation(sep));
    assert!(to_rgb_raster(&img).is_none());
}

#[test]
fn illegal_indexed_base() {
    let inner = IndexedColorSpace::new(ColorSpaceDetails::DeviceRgb, 0, vec![0, 0, 0]).unwrap();
    let err = IndexedColorSpace::new(ColorSpaceDetails::Indexed(inner), 0, vec![0]).unwrap_err();
    assert!(matches!(err, Error::InvalidColorSpace(_)));
}

#[test]
fn indexed_xobject_from_document() {
    let mut doc = Document::with_version("1.7");
    let lookup = doc.add_object(Stream::new(dictionary! {}, vec![255, 0, 0, 0, 0, 255]));
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 1,
            "BitsPerComponent" => 8,
            "ColorSpace" => vec!["Indexed".into(), "DeviceRGB".into(), 1.into(), lookup.into()],
        },
        vec![1, 0],
    );

    let img = XObjectImage::from_stream(&stream, &doc).unwrap();
    let raster = to_rgb_raster(&img).unwrap();
    assert_eq!(raster.get_pixel(0, 0).0, [0, 0, 255]);
    assert_eq!(raster.get_pixel(1, 0).0, [255, 0, 0]);

    let png = to_png(&img).unwrap();
    assert!(png.starts_with(b"\x89PNG"));
}

#[test]
fn undecodable_samples_are_rejected() {
    let doc = Document::with_version("1.7");
    let stream = Stream::new(
        dictionary! {
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "BitsPerComponent" => 8,
            "ColorSpace" => "DeviceRGB",
            "Filter" => "DCTDecode",
        },
        vec![0xFF, 0xD8, 0x00],
    );
    let img = XObjectImage::from_stream(&stream, &doc).unwrap();
    assert!(to_rgb_raster(&img).is_none());
}
