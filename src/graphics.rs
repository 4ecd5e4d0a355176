use serde_derive::{Deserialize, Serialize};

/// A point in PDF user space, measured in point from the bottom left corner
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// A rectangle described by its four corners.
///
/// An axis-aligned rectangle stays axis-aligned until it is transformed by a
/// rotating or skewing matrix, after which the corners describe the rotated
/// quadrilateral (glyph boxes of rotated text, for example).
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Rect {
    /// Rectangle from two opposite corners
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (left, right) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (bottom, top) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self {
            top_left: Point::new(left, top),
            top_right: Point::new(right, top),
            bottom_left: Point::new(left, bottom),
            bottom_right: Point::new(right, bottom),
        }
    }

    /// Rectangle with its bottom left corner at `(x, y)`
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width along the bottom edge (stays correct for rotated rectangles)
    pub fn width(&self) -> f64 {
        self.bottom_left.distance_to(&self.bottom_right)
    }

    /// Height along the left edge (stays correct for rotated rectangles)
    pub fn height(&self) -> f64 {
        self.bottom_left.distance_to(&self.top_left)
    }

    pub fn left(&self) -> f64 {
        self.corners().iter().map(|p| p.x).fold(f64::INFINITY, f64::min)
    }

    pub fn bottom(&self) -> f64 {
        self.corners().iter().map(|p| p.y).fold(f64::INFINITY, f64::min)
    }

    pub fn right(&self) -> f64 {
        self.corners().iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn top(&self) -> f64 {
        self.corners().iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// `[left bottom right top]`, the format of `/MediaBox` and `/BBox`
    pub fn to_array(&self) -> Vec<lopdf::Object> {
        [self.left(), self.bottom(), self.right(), self.top()]
            .into_iter()
            .map(|v| lopdf::Object::Real(v as f32))
            .collect()
    }
}

/// An 8-bit RGB color, as passed to the page builder
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components as normalized decimals, see [`crate::color::rgb_to_decimal`]
    pub fn to_decimal(&self) -> [f64; 3] {
        use crate::color::rgb_to_decimal;
        [
            rgb_to_decimal(self.r as i32),
            rgb_to_decimal(self.g as i32),
            rgb_to_decimal(self.b as i32),
        ]
    }
}
