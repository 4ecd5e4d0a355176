//! Image XObjects created from encoded JPEG and PNG files

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ExtendedColorType, ImageDecoder, ImageFormat};
use lopdf::Object::{Integer, Name, Reference};
use lopdf::{Dictionary as LoDictionary, ObjectId, Stream as LoStream};
use serde_derive::{Deserialize, Serialize};

use crate::color::ColorSpace;
use crate::errors::{Error, Result};
use crate::utils::{compress_bytes, rgba_to_rgb};

/// Handle of an image stored in a document, placeable on any of its pages
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddedImage {
    pub(crate) document: usize,
    pub(crate) id: usize,
    pub(crate) reference: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl AddedImage {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn object_id(&self) -> ObjectId {
        self.reference
    }
}

fn image_dictionary(width: u32, height: u32, color_space: ColorSpace) -> LoDictionary {
    LoDictionary::from_iter(vec![
        ("Type", Name("XObject".into())),
        ("Subtype", Name("Image".into())),
        ("Width", Integer(width as i64)),
        ("Height", Integer(height as i64)),
        ("BitsPerComponent", Integer(8)),
        ("ColorSpace", Name(color_space.name().into())),
    ])
}

fn flate_stream(mut dict: LoDictionary, pixels: &[u8]) -> LoStream {
    dict.set("Filter", Name("FlateDecode".into()));
    LoStream::new(dict, compress_bytes(pixels)).with_compression(false)
}

/// Image XObject embedding the JPEG file as is (`/DCTDecode`); only the
/// header is read.
pub(crate) fn jpeg_xobject(bytes: &[u8]) -> Result<LoStream> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();
    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L8 | ExtendedColorType::L16 => ColorSpace::DeviceGray,
        ExtendedColorType::Cmyk8 => ColorSpace::DeviceCMYK,
        _ => ColorSpace::DeviceRGB,
    };
    if width == 0 || height == 0 {
        return Err(Error::InvalidArgument("JPEG image has no pixels".to_string()));
    }
    log::debug!("embedding {width}x{height} JPEG as {}", color_space.name());

    let mut dict = image_dictionary(width, height, color_space);
    dict.set("Filter", Name("DCTDecode".into()));
    Ok(LoStream::new(dict, bytes.to_vec()).with_compression(false))
}

/// Decoded PNG image, ready to be written as an image XObject plus an
/// optional soft mask
pub(crate) struct PngXObject {
    pub image: LoStream,
    pub soft_mask: Option<LoStream>,
    pub width: u32,
    pub height: u32,
}

impl PngXObject {
    /// Adds the soft mask (if any) and returns the image stream pointing to it
    pub(crate) fn into_stream(self, doc: &mut lopdf::Document) -> LoStream {
        let mut image = self.image;
        if let Some(mask) = self.soft_mask {
            image.dict.set("SMask", Reference(doc.add_object(mask)));
        }
        image
    }
}

/// Decodes the PNG; an alpha channel becomes a separate `/SMask` image.
pub(crate) fn png_xobject(bytes: &[u8]) -> Result<PngXObject> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    let gray = color.channel_count() <= 2;

    let (pixels, alpha, color_space) = match (gray, color.has_alpha()) {
        (true, false) => (img.to_luma8().into_raw(), None, ColorSpace::DeviceGray),
        (true, true) => {
            let la = img.to_luma_alpha8().into_raw();
            let luma = la.chunks_exact(2).map(|p| p[0]).collect::<Vec<u8>>();
            let alpha = la.chunks_exact(2).map(|p| p[1]).collect::<Vec<u8>>();
            (luma, Some(alpha), ColorSpace::DeviceGray)
        }
        (false, false) => (img.to_rgb8().into_raw(), None, ColorSpace::DeviceRGB),
        (false, true) => {
            let (rgb, alpha) = rgba_to_rgb(img.to_rgba8().as_raw());
            (rgb, Some(alpha), ColorSpace::DeviceRGB)
        }
    };

    // fully opaque images need no mask
    let alpha = alpha.filter(|a: &Vec<u8>| a.iter().any(|v| *v != 255));
    log::debug!(
        "embedding {width}x{height} PNG as {} (soft mask: {})",
        color_space.name(),
        alpha.is_some()
    );

    let soft_mask = alpha.map(|a| {
        flate_stream(image_dictionary(width, height, ColorSpace::DeviceGray), &a)
    });

    Ok(PngXObject {
        image: flate_stream(image_dictionary(width, height, color_space), &pixels),
        soft_mask,
        width,
        height,
    })
}
