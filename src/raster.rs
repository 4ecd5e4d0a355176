//! Conversion of PDF image samples to 8-bit RGB rasters
//!
//! Failures are reported as `None`: an image that cannot be converted is
//! skipped, not an error.

use std::borrow::Cow;
use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use lopdf::Object;

use crate::color::{expand_indexed, ColorSpace, ColorSpaceDetails};
use crate::deserialize::{resolve, stream_bytes};
use crate::errors::{Error, Result};

/// Sampled image data together with the description needed to interpret it
pub trait PdfImage {
    /// Decoded samples, `None` if they cannot be obtained (e.g. an
    /// unsupported filter)
    fn raw_bytes(&self) -> Option<Cow<'_, [u8]>>;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn bits_per_component(&self) -> u8;
    fn color_space_details(&self) -> &ColorSpaceDetails;
}

/// An image whose samples are already in memory
#[derive(Debug, Clone, PartialEq)]
pub struct SampledImage {
    pub samples: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color_space: ColorSpaceDetails,
}

impl PdfImage for SampledImage {
    fn raw_bytes(&self) -> Option<Cow<'_, [u8]>> {
        Some(Cow::Borrowed(&self.samples))
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }

    fn color_space_details(&self) -> &ColorSpaceDetails {
        &self.color_space
    }
}

/// An image XObject read from a document
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectImage {
    width: u32,
    height: u32,
    bits_per_component: u8,
    color_space: ColorSpaceDetails,
    samples: Option<Vec<u8>>,
}

fn dict_integer(dict: &lopdf::Dictionary, key: &[u8], doc: &lopdf::Document) -> Option<i64> {
    let obj = dict.get(key).ok()?;
    match resolve(obj, doc).ok()? {
        Object::Integer(i) => Some(*i),
        _ => None,
    }
}

impl XObjectImage {
    pub fn from_stream(stream: &lopdf::Stream, doc: &lopdf::Document) -> Result<Self> {
        let dict = &stream.dict;
        let dimension = |key: &[u8]| {
            dict_integer(dict, key, doc)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    Error::MalformedDocument(format!(
                        "image has no valid /{}",
                        String::from_utf8_lossy(key)
                    ))
                })
        };
        let width = dimension(b"Width")?;
        let height = dimension(b"Height")?;

        let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
        let bits_per_component = match dict_integer(dict, b"BitsPerComponent", doc) {
            Some(bpc) => u8::try_from(bpc).unwrap_or(0),
            None if is_mask => 1,
            None => 8,
        };

        let color_space = match dict.get(b"ColorSpace") {
            Ok(cs) => ColorSpaceDetails::from_object(cs, doc)?,
            Err(_) if is_mask => ColorSpaceDetails::DeviceGray,
            Err(_) => ColorSpaceDetails::Unsupported,
        };

        let samples = match stream_bytes(stream) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("image samples cannot be decoded: {e}");
                None
            }
        };

        Ok(Self {
            width,
            height,
            bits_per_component,
            color_space,
            samples,
        })
    }
}

impl PdfImage for XObjectImage {
    fn raw_bytes(&self) -> Option<Cow<'_, [u8]>> {
        self.samples.as_deref().map(Cow::Borrowed)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }

    fn color_space_details(&self) -> &ColorSpaceDetails {
        &self.color_space
    }
}

/// `R = 255 * (1 - C) * (1 - K)`, likewise for G (M) and B (Y), truncated
fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> Rgb<u8> {
    let k = 1.0 - k as f64 / 255.0;
    let channel = |v: u8| (255.0 * (1.0 - v as f64 / 255.0) * k) as u8;
    Rgb([channel(c), channel(m), channel(y)])
}

/// Converts the samples to an RGB raster.
///
/// Supported are DeviceGray, DeviceRGB and DeviceCMYK images and Indexed
/// images over one of them, with 8 bits per component (16 for the device
/// spaces, of which the high byte is used). Anything else, or a sample
/// buffer whose size does not match the dimensions, gives `None`.
pub fn to_rgb_raster(image: &dyn PdfImage) -> Option<RgbImage> {
    let details = image.color_space_details();
    let n = match details.base_color_space() {
        ColorSpace::DeviceGray => 1,
        ColorSpace::DeviceRGB => 3,
        ColorSpace::DeviceCMYK => 4,
        other => {
            log::debug!("cannot rasterize image in {} space", other.name());
            return None;
        }
    };

    let bpc = image.bits_per_component();
    let indexed = matches!(details, ColorSpaceDetails::Indexed(_));
    let bytes_per_component = match bpc {
        8 => 1,
        16 if !indexed => 2,
        _ => {
            log::debug!("cannot rasterize image with {bpc} bits per component");
            return None;
        }
    };

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return None;
    }

    let raw = image.raw_bytes()?;
    let samples = match expand_indexed(details, &raw) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("indexed lookup failed: {e}");
            return None;
        }
    };

    let pixel_len = n * bytes_per_component;
    let expected = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(pixel_len)?;
    if samples.len() != expected {
        log::debug!(
            "image has {} bytes of samples, {width}x{height} needs {expected}",
            samples.len()
        );
        return None;
    }

    let mut raster = RgbImage::new(width, height);
    for (pixel, chunk) in raster.pixels_mut().zip(samples.chunks_exact(pixel_len)) {
        // big endian: the first byte of a component is the high byte
        let c = |i: usize| chunk[i * bytes_per_component];
        *pixel = match n {
            1 => Rgb([c(0), c(0), c(0)]),
            3 => Rgb([c(0), c(1), c(2)]),
            _ => cmyk_to_rgb(c(0), c(1), c(2), c(3)),
        };
    }

    Some(raster)
}

/// [`to_rgb_raster`], encoded as PNG
pub fn to_png(image: &dyn PdfImage) -> Option<Vec<u8>> {
    let raster = to_rgb_raster(image)?;
    let mut out = Vec::new();
    match raster.write_to(&mut Cursor::new(&mut out), ImageFormat::Png) {
        Ok(()) => Some(out),
        Err(e) => {
            log::debug!("PNG encoding failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::IndexedColorSpace;
    use lopdf::Dictionary as LoDictionary;

    fn sampled(samples: Vec<u8>, w: u32, h: u32, cs: ColorSpaceDetails) -> SampledImage {
        SampledImage {
            samples,
            width: w,
            height: h,
            bits_per_component: 8,
            color_space: cs,
        }
    }

    #[test]
    fn cmyk_conversion_truncates() {
        assert_eq!(cmyk_to_rgb(255, 0, 0, 0), Rgb([0, 255, 255]));
        assert_eq!(cmyk_to_rgb(0, 0, 0, 255), Rgb([0, 0, 0]));
        assert_eq!(cmyk_to_rgb(0, 0, 0, 0), Rgb([255, 255, 255]));
    }

    #[test]
    fn sixteen_bit_uses_high_byte() {
        let img = SampledImage {
            samples: vec![0x12, 0x34],
            width: 1,
            height: 1,
            bits_per_component: 16,
            color_space: ColorSpaceDetails::DeviceGray,
        };
        let raster = to_rgb_raster(&img).unwrap();
        assert_eq!(raster.get_pixel(0, 0), &Rgb([0x12, 0x12, 0x12]));
    }

    #[test]
    fn indexed_with_out_of_range_index_is_rejected() {
        let palette =
            IndexedColorSpace::new(ColorSpaceDetails::DeviceRgb, 0, vec![1, 2, 3]).unwrap();
        let img = sampled(vec![0, 1], 2, 1, ColorSpaceDetails::Indexed(palette));
        assert!(to_rgb_raster(&img).is_none());
    }

    #[test]
    fn unsupported_spaces_are_rejected() {
        let img = sampled(vec![0; 4], 2, 2, ColorSpaceDetails::Pattern);
        assert!(to_rgb_raster(&img).is_none());
        let img = sampled(vec![0; 4], 2, 2, ColorSpaceDetails::Unsupported);
        assert!(to_rgb_raster(&img).is_none());
    }

    #[test]
    fn png_export_round_trips_pixels() {
        let img = sampled(vec![10, 20, 30, 40, 50, 60], 2, 1, ColorSpaceDetails::DeviceRgb);
        let png = to_png(&img).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(1, 0), &Rgb([40, 50, 60]));
    }

    #[test]
    fn xobject_image_from_stream() {
        let doc = lopdf::Document::with_version("1.7");
        let dict = LoDictionary::from_iter(vec![
            ("Type", "XObject".into()),
            ("Subtype", "Image".into()),
            ("Width", Object::Integer(1)),
            ("Height", Object::Integer(1)),
            ("BitsPerComponent", Object::Integer(8)),
            ("ColorSpace", "DeviceCMYK".into()),
        ]);
        let stream = lopdf::Stream::new(dict, vec![0, 0, 0, 255]);
        let img = XObjectImage::from_stream(&stream, &doc).unwrap();
        assert_eq!(img.color_space_details(), &ColorSpaceDetails::DeviceCmyk);
        let raster = to_rgb_raster(&img).unwrap();
        assert_eq!(raster.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }
}
