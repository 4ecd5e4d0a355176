//! Color spaces of page content and images, and the expansion of indexed
//! samples into full color components.

use std::borrow::Cow;
use std::sync::Arc;

use lopdf::Object;
use serde_derive::{Deserialize, Serialize};

use crate::deserialize::{resolve, stream_bytes};
use crate::errors::{Error, Result};

/// The family of a color space, without any payload
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    Indexed,
    Separation,
    Pattern,
    Unsupported,
}

impl ColorSpace {
    /// PDF name of the color space family
    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
            ColorSpace::Indexed => "Indexed",
            ColorSpace::Separation => "Separation",
            ColorSpace::Pattern => "Pattern",
            ColorSpace::Unsupported => "Unsupported",
        }
    }

    /// Number of color components of one sample in this space, for the
    /// three device spaces. Everything else has no fixed expansion.
    pub fn component_count(&self) -> Option<usize> {
        match self {
            ColorSpace::DeviceGray => Some(1),
            ColorSpace::DeviceRGB => Some(3),
            ColorSpace::DeviceCMYK => Some(4),
            _ => None,
        }
    }
}

/// A fully described color space.
///
/// The device spaces carry no state. `Indexed` and `Separation` own their
/// parameters and are validated on construction; they cannot be changed
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpaceDetails {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    Indexed(IndexedColorSpace),
    Separation(SeparationColorSpace),
    Pattern,
    Unsupported,
}

impl ColorSpaceDetails {
    pub fn color_space(&self) -> ColorSpace {
        match self {
            ColorSpaceDetails::DeviceGray => ColorSpace::DeviceGray,
            ColorSpaceDetails::DeviceRgb => ColorSpace::DeviceRGB,
            ColorSpaceDetails::DeviceCmyk => ColorSpace::DeviceCMYK,
            ColorSpaceDetails::Indexed(_) => ColorSpace::Indexed,
            ColorSpaceDetails::Separation(_) => ColorSpace::Separation,
            ColorSpaceDetails::Pattern => ColorSpace::Pattern,
            ColorSpaceDetails::Unsupported => ColorSpace::Unsupported,
        }
    }

    /// The space samples end up in after indexed lookup. Equal to
    /// [`Self::color_space`] for everything except `Indexed`.
    pub fn base_color_space(&self) -> ColorSpace {
        match self {
            ColorSpaceDetails::Indexed(i) => i.base_type,
            other => other.color_space(),
        }
    }

    /// Parses a `/ColorSpace` entry of an image or resource dictionary.
    ///
    /// Families this crate cannot convert (Lab, DeviceN, ...) come back as
    /// `Unsupported`, illegal nesting fails with `InvalidColorSpace`.
    pub fn from_object(obj: &Object, doc: &lopdf::Document) -> Result<Self> {
        let obj = resolve(obj, doc)?;
        match obj {
            Object::Name(n) => Ok(Self::from_name(n)),
            Object::Array(arr) => {
                let family = match arr.first().map(|o| resolve(o, doc)).transpose()? {
                    Some(Object::Name(n)) => n.as_slice(),
                    _ => {
                        return Err(Error::MalformedDocument(
                            "color space array does not start with a name".to_string(),
                        ))
                    }
                };
                match family {
                    b"Indexed" | b"I" => Self::parse_indexed(arr, doc),
                    b"Separation" => Self::parse_separation(arr, doc),
                    b"ICCBased" => Self::parse_icc_based(arr, doc),
                    b"CalGray" => Ok(ColorSpaceDetails::DeviceGray),
                    b"CalRGB" => Ok(ColorSpaceDetails::DeviceRgb),
                    b"Pattern" => Ok(ColorSpaceDetails::Pattern),
                    other => Ok(Self::from_name(other)),
                }
            }
            _ => Err(Error::MalformedDocument(
                "color space is neither a name nor an array".to_string(),
            )),
        }
    }

    fn from_name(name: &[u8]) -> Self {
        match name {
            b"DeviceGray" | b"G" | b"CalGray" => ColorSpaceDetails::DeviceGray,
            b"DeviceRGB" | b"RGB" | b"CalRGB" => ColorSpaceDetails::DeviceRgb,
            b"DeviceCMYK" | b"CMYK" | b"CalCMYK" => ColorSpaceDetails::DeviceCmyk,
            b"Pattern" => ColorSpaceDetails::Pattern,
            other => {
                log::warn!(
                    "unsupported color space: {}",
                    String::from_utf8_lossy(other)
                );
                ColorSpaceDetails::Unsupported
            }
        }
    }

    // [/Indexed base hival lookup]
    fn parse_indexed(arr: &[Object], doc: &lopdf::Document) -> Result<Self> {
        let [_, base, hi_val, lookup] = arr else {
            return Err(Error::MalformedDocument(format!(
                "Indexed color space needs 4 entries, found {}",
                arr.len()
            )));
        };
        let base = ColorSpaceDetails::from_object(base, doc)?;
        let hi_val = match resolve(hi_val, doc)? {
            Object::Integer(i) => (*i).clamp(0, 255) as u8,
            Object::Real(r) => r.clamp(0.0, 255.0) as u8,
            _ => {
                return Err(Error::MalformedDocument(
                    "Indexed hival is not a number".to_string(),
                ))
            }
        };
        let color_table = match resolve(lookup, doc)? {
            Object::String(bytes, _) => bytes.clone(),
            Object::Stream(s) => stream_bytes(s)?,
            _ => {
                return Err(Error::MalformedDocument(
                    "Indexed lookup table is neither a string nor a stream".to_string(),
                ))
            }
        };
        IndexedColorSpace::new(base, hi_val, color_table).map(ColorSpaceDetails::Indexed)
    }

    // [/Separation name alternateSpace tintTransform]
    fn parse_separation(arr: &[Object], doc: &lopdf::Document) -> Result<Self> {
        let [_, name, alternate, tint] = arr else {
            return Err(Error::MalformedDocument(format!(
                "Separation color space needs 4 entries, found {}",
                arr.len()
            )));
        };
        let name = match resolve(name, doc)? {
            Object::Name(n) => String::from_utf8_lossy(n).into_owned(),
            _ => {
                return Err(Error::MalformedDocument(
                    "Separation colorant is not a name".to_string(),
                ))
            }
        };
        let alternate = ColorSpaceDetails::from_object(alternate, doc)?;
        SeparationColorSpace::new(name, alternate, tint.clone()).map(ColorSpaceDetails::Separation)
    }

    // [/ICCBased stream], mapped to the device space with the same number of components
    fn parse_icc_based(arr: &[Object], doc: &lopdf::Document) -> Result<Self> {
        let stream = match arr.get(1).map(|o| resolve(o, doc)).transpose()? {
            Some(Object::Stream(s)) => s,
            _ => {
                return Err(Error::MalformedDocument(
                    "ICCBased color space without profile stream".to_string(),
                ))
            }
        };
        match stream.dict.get(b"N").ok().and_then(|n| n.as_i64().ok()) {
            Some(1) => Ok(ColorSpaceDetails::DeviceGray),
            Some(3) => Ok(ColorSpaceDetails::DeviceRgb),
            Some(4) => Ok(ColorSpaceDetails::DeviceCmyk),
            _ => match stream.dict.get(b"Alternate") {
                Ok(alternate) => ColorSpaceDetails::from_object(alternate, doc),
                Err(_) => Ok(ColorSpaceDetails::Unsupported),
            },
        }
    }
}

/// `[/Indexed base hival lookup]`: samples are indices into `color_table`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedColorSpace {
    base: Arc<ColorSpaceDetails>,
    base_type: ColorSpace,
    hi_val: u8,
    color_table: Vec<u8>,
}

impl IndexedColorSpace {
    /// The table should hold `(hi_val + 1) * components(base)` bytes. This is
    /// not checked here; [`Self::expand`] reports lookups past the end.
    pub fn new(base: ColorSpaceDetails, hi_val: u8, color_table: Vec<u8>) -> Result<Self> {
        if matches!(
            base,
            ColorSpaceDetails::Indexed(_) | ColorSpaceDetails::Pattern
        ) {
            return Err(Error::InvalidColorSpace(format!(
                "the base of an Indexed color space cannot be {}",
                base.color_space().name()
            )));
        }
        let base_type = base.base_color_space();
        Ok(Self {
            base: Arc::new(base),
            base_type,
            hi_val,
            color_table,
        })
    }

    pub fn base(&self) -> &ColorSpaceDetails {
        &self.base
    }

    pub fn hi_val(&self) -> u8 {
        self.hi_val
    }

    pub fn color_table(&self) -> &[u8] {
        &self.color_table
    }

    /// Replaces every index byte with the `n` base components it points to,
    /// `n` being 1, 3 or 4 for a Gray, RGB or CMYK base. Any other base
    /// passes the samples through unchanged.
    pub fn expand<'a>(&self, samples: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        let Some(n) = self.base_type.component_count() else {
            return Ok(Cow::Borrowed(samples));
        };

        let mut out = Vec::with_capacity(samples.len() * n);
        for &index in samples {
            let start = index as usize * n;
            let entry = self.color_table.get(start..start + n).ok_or_else(|| {
                Error::index_out_of_range("color table", index as i64, self.color_table.len())
            })?;
            out.extend_from_slice(entry);
        }
        Ok(Cow::Owned(out))
    }
}

/// Tint transform of a Separation space: a function dictionary, stream or
/// reference. Kept as-is, never evaluated.
pub type TintTransform = Object;

/// `[/Separation name alternateSpace tintTransform]`
#[derive(Debug, Clone, PartialEq)]
pub struct SeparationColorSpace {
    name: String,
    alternate: Arc<ColorSpaceDetails>,
    tint_transform: TintTransform,
}

impl SeparationColorSpace {
    pub fn new(
        name: String,
        alternate: ColorSpaceDetails,
        tint_transform: TintTransform,
    ) -> Result<Self> {
        if matches!(
            alternate,
            ColorSpaceDetails::Indexed(_) | ColorSpaceDetails::Pattern
        ) {
            return Err(Error::InvalidColorSpace(format!(
                "the alternate space of Separation /{name} cannot be {}",
                alternate.color_space().name()
            )));
        }
        Ok(Self {
            name,
            alternate: Arc::new(alternate),
            tint_transform,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternate(&self) -> &ColorSpaceDetails {
        &self.alternate
    }

    pub fn tint_transform(&self) -> &TintTransform {
        &self.tint_transform
    }
}

/// Runs indexed expansion if `details` is Indexed, otherwise returns the
/// samples untouched.
pub fn expand_indexed<'a>(details: &ColorSpaceDetails, samples: &'a [u8]) -> Result<Cow<'a, [u8]>> {
    match details {
        ColorSpaceDetails::Indexed(indexed) => indexed.expand(samples),
        _ => Ok(Cow::Borrowed(samples)),
    }
}

/// Converts a 0-255 component to the 0.0-1.0 range used by `RG` / `rg`,
/// rounded to 4 decimal places. Out-of-range inputs are clamped.
pub fn rgb_to_decimal(value: i32) -> f64 {
    let v = value.clamp(0, 255) as f64 / 255.0;
    ((v * 10_000.0).round() / 10_000.0).clamp(0.0, 1.0)
}
