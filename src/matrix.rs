//! Affine transformation matrices (current transformation matrix, text matrix,
//! font matrix), shared by the page builder and the text layout

use serde_derive::{Deserialize, Serialize};

use crate::graphics::{Point, Rect};

/// A 2D affine transform `[a b c d e f]`, the PDF representation of the 3x3 matrix
///
/// ```text
/// | a b 0 |
/// | c d 0 |
/// | e f 1 |
/// ```
///
/// Points are row vectors, so `p' = p * M`. Values are immutable: every
/// operation returns a new matrix.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformationMatrix([f64; 6]);

impl Default for TransformationMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformationMatrix {
    pub const IDENTITY: TransformationMatrix =
        TransformationMatrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub const fn from_values(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self([a, b, c, d, e, f])
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        Self(values)
    }

    /// `1 0 0 1 x y cm`
    pub const fn translate(x: f64, y: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, x, y])
    }

    /// `x 0 0 y 0 0 cm`
    pub const fn scale(x: f64, y: f64) -> Self {
        Self([x, 0.0, 0.0, y, 0.0, 0.0])
    }

    /// Counter-clockwise rotation in degrees: `cos sin -sin cos 0 0 cm`
    pub fn rotate(degrees: f64) -> Self {
        let rad = degrees.to_radians();
        Self([rad.cos(), rad.sin(), -rad.sin(), rad.cos(), 0.0, 0.0])
    }

    pub fn as_array(&self) -> [f64; 6] {
        self.0
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.0[4], self.0[5])
    }

    /// Matrix product `self * other`: the result applies `self` first, then `other`.
    pub fn multiply(&self, other: &TransformationMatrix) -> TransformationMatrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Self([
            mul_add(a1, a2, b1 * c2),
            mul_add(a1, b2, b1 * d2),
            mul_add(c1, a2, d1 * c2),
            mul_add(c1, b2, d1 * d2),
            mul_add(e1, a2, mul_add(f1, c2, e2)),
            mul_add(e1, b2, mul_add(f1, d2, f2)),
        ])
    }

    /// `self` applied after `inner`, i.e. `inner * self`. A chain
    /// `a.compose(&b).compose(&c)` evaluates `c` first when applied to a point.
    pub fn compose(&self, inner: &TransformationMatrix) -> TransformationMatrix {
        inner.multiply(self)
    }

    pub fn transform_point(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point {
            x: mul_add(a, p.x, mul_add(c, p.y, e)),
            y: mul_add(b, p.x, mul_add(d, p.y, f)),
        }
    }

    pub fn transform_rect(&self, r: &Rect) -> Rect {
        Rect {
            top_left: self.transform_point(r.top_left),
            top_right: self.transform_point(r.top_right),
            bottom_left: self.transform_point(r.bottom_left),
            bottom_right: self.transform_point(r.bottom_right),
        }
    }

    pub(crate) fn to_operands(&self) -> Vec<lopdf::Object> {
        self.0
            .iter()
            .map(|v| lopdf::Object::Real(*v as f32))
            .collect()
    }
}

/// Multiply add. Computes `(a * b) + c` with workaround for
/// arm-unknown-linux-gnueabi.
///
/// `{f32, f64}::mul_add` is completly broken on arm-unknown-linux-gnueabi.
/// See issue https://github.com/rust-lang/rust/issues/46950.
#[inline(always)]
fn mul_add(a: f64, b: f64, c: f64) -> f64 {
    if cfg!(all(
        target_arch = "arm",
        target_os = "linux",
        target_env = "gnu"
    )) {
        (a * b) + c
    } else {
        a.mul_add(b, c)
    }
}

#[test]
fn test_ctm_translate() {
    let trans = TransformationMatrix::translate(150.0, 50.0);
    assert_eq!([1.0, 0.0, 0.0, 1.0, 150.0, 50.0], trans.as_array());

    let scale = TransformationMatrix::scale(2.0, 4.0);
    assert_eq!([2.0, 0.0, 0.0, 4.0, 0.0, 0.0], scale.as_array());

    let p = trans.transform_point(Point::new(1.0, 2.0));
    assert_eq!(p, Point::new(151.0, 52.0));
}

#[test]
fn test_composition_order() {
    let scale = TransformationMatrix::scale(2.0, 2.0);
    let trans = TransformationMatrix::translate(10.0, 0.0);

    // scale first, then translate
    let m = scale.multiply(&trans);
    assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

    // translate applied after scale, same thing spelled the other way round
    let m2 = trans.compose(&scale);
    assert_eq!(m, m2);

    // translate first, then scale
    let m3 = trans.multiply(&scale);
    assert_eq!(m3.transform_point(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
}

#[test]
fn test_rotation() {
    let rot = TransformationMatrix::rotate(90.0);
    let p = rot.transform_point(Point::new(1.0, 0.0));
    assert!(p.x.abs() < 1e-9);
    assert!((p.y - 1.0).abs() < 1e-9);
}
