//! # pdfbuilder
//!
//! pdfbuilder builds the content of PDF pages (lines, rectangles, circles,
//! colors, text and images), copies pages from existing documents and
//! converts the images found in PDF files into RGB rasters.
//!
//! ## Writing PDF
//!
//! ```rust
//! use std::rc::Rc;
//! use pdfbuilder::*;
//!
//! let mut doc = PdfDocumentBuilder::new();
//! let font = doc.register_font(Rc::new(MetricsFont::monospace("Courier", 1000, 600.0, 800.0, -200.0)));
//!
//! let mut page = doc.add_page_with_size(PageSize::A4);
//! page.set_stroke_color(255, 0, 0)
//!     .draw_line(Point::new(72.0, 700.0), Point::new(300.0, 700.0), 2.0)
//!     .reset_color();
//! let letters = page.add_text("Hello World", 12.0, Point::new(72.0, 720.0), font).unwrap();
//! assert_eq!(letters.len(), 11);
//!
//! let bytes = doc.save(&PdfSaveOptions::default()).unwrap();
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//! ```
//!
//! ## Copying pages
//!
//! ```rust,ignore
//! let source = ForeignDocument::load_mem(&std::fs::read("input.pdf")?)?;
//! let mut page = doc.add_page_with_size(PageSize::Letter);
//! page.copy_from(&source.page(1)?)?;
//! ```
//!
//! ## Images to rasters
//!
//! ```rust
//! use pdfbuilder::*;
//!
//! let img = SampledImage {
//!     samples: vec![255, 0, 0, 0],
//!     width: 1,
//!     height: 1,
//!     bits_per_component: 8,
//!     color_space: ColorSpaceDetails::DeviceCmyk,
//! };
//! let raster = to_rgb_raster(&img).unwrap();
//! assert_eq!(raster.get_pixel(0, 0).0, [0, 255, 255]);
//! ```

pub mod color;
pub mod constants;
pub mod content;
pub(crate) mod deserialize;
pub mod document;
pub mod errors;
pub mod font;
pub mod graphics;
pub(crate) mod image;
pub mod matrix;
pub mod merge;
pub mod ops;
pub mod page;
pub mod raster;
pub mod resources;
pub mod serialize;
pub mod text;
pub mod units;
pub(crate) mod utils;

pub use crate::color::*;
pub use crate::content::*;
pub use crate::document::*;
pub use crate::errors::{Error, Result};
pub use crate::font::*;
pub use crate::graphics::*;
pub use crate::image::AddedImage;
pub use crate::matrix::*;
pub use crate::merge::*;
pub use crate::ops::*;
pub use crate::page::*;
pub use crate::raster::*;
pub use crate::resources::*;
pub use crate::serialize::{encode_ops, PdfSaveOptions};
pub use crate::text::Letter;
pub use crate::units::*;
