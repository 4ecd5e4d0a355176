use std::cmp::Ordering;

use serde_derive::{Deserialize, Serialize};

macro_rules! impl_partialeq {
    ($t:ty) => {
        impl PartialEq for $t {
            // compare on a 1/1000 grid because of floating point inaccuracy
            fn eq(&self, other: &$t) -> bool {
                self.0.is_finite()
                    && other.0.is_finite()
                    && (self.0 * 1000.0).round() == (other.0 * 1000.0).round()
            }
        }

        impl PartialOrd for $t {
            fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                if self == other {
                    Some(Ordering::Equal)
                } else {
                    self.0.partial_cmp(&other.0)
                }
            }
        }
    };
}

/// Scale in millimeter
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mm(pub f64);

impl Mm {
    pub fn into_pt(self) -> Pt {
        self.into()
    }
}

impl From<Pt> for Mm {
    fn from(value: Pt) -> Mm {
        Mm(value.0 * 0.352_777_778)
    }
}

impl_partialeq!(Mm);

/// Scale in point (1/72 inch), the unit of PDF user space
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pt(pub f64);

impl From<Mm> for Pt {
    fn from(value: Mm) -> Pt {
        Pt(value.0 * 2.834_645_669)
    }
}

impl From<Pt> for lopdf::Object {
    fn from(value: Pt) -> Self {
        lopdf::Object::Real(value.0 as f32)
    }
}

impl_partialeq!(Pt);

/// Common page sizes, in point
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    /// Portrait (width, height)
    pub fn dimensions(&self) -> (Pt, Pt) {
        match self {
            PageSize::A4 => (Pt(595.0), Pt(842.0)),
            PageSize::Letter => (Pt(612.0), Pt(792.0)),
        }
    }
}

#[test]
fn test_mm_pt_conversion() {
    let pt: Pt = Mm(25.4).into();
    assert_eq!(pt, Pt(72.0));
    let mm: Mm = Pt(72.0).into();
    assert_eq!(mm, Mm(25.4));
}
