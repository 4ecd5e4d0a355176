//! Errors for pdfbuilder
//!
//! Builder calls fail synchronously with one of the variants below. The
//! raster conversion in [`crate::raster`] is the exception: it reports
//! failure as `None` and never returns an `Error`.

use crate::font::FontId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Illegal nesting of color spaces (e.g. an Indexed space whose base is Indexed)
    #[error("invalid color space: {0}")]
    InvalidColorSpace(String),
    /// An index was outside of the valid range
    #[error("{what} index {index} out of range (length {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The font was never registered with the document
    #[error("font {0} is not registered with this document")]
    UnknownFont(FontId),
    #[error("the font does not contain a glyph for {0:?}")]
    GlyphNotFound(char),
    /// The foreign document violates the PDF format (e.g. a direct object
    /// where an indirect reference is required)
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// Both pages define a resource with the same name in a category that
    /// has no renaming strategy
    #[error("resource /{category} /{name} exists on both pages")]
    ResourceCollision { category: String, name: String },
    /// Stream data is encoded with a filter this crate cannot decode
    #[error("unsupported stream filter: {0}")]
    UnsupportedFilter(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    /// Writing the finished file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn index_out_of_range(what: &'static str, index: i64, len: usize) -> Self {
        Error::IndexOutOfRange {
            what,
            index,
            len,
        }
    }
}
