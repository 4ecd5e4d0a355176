use lopdf::Object;

use crate::matrix::TransformationMatrix;

/// Operations that can occur in a PDF content stream.
///
/// The builder only ever emits the typed variants. Operations read from a
/// foreign page that have no typed counterpart are carried verbatim as
/// [`Op::Other`], so a merged page renders exactly like its source.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// `q` - Saves the graphics configuration on the stack
    SaveGraphicsState,
    /// `Q` - Pops the last graphics configuration state off the stack
    RestoreGraphicsState,
    /// `cm` - Concatenates a matrix to the current transformation matrix
    ModifyCurrentTransformation { matrix: TransformationMatrix },
    /// `w` - Sets the line width for stroking
    SetLineWidth { width: f64 },
    /// `m` - Begins a new subpath at the given point
    MoveTo { x: f64, y: f64 },
    /// `l` - Appends a straight line segment to the current path
    LineTo { x: f64, y: f64 },
    /// `c` - Appends a cubic bezier curve with two control points
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    },
    /// `h` - Closes the current subpath
    ClosePath,
    /// `re` - Appends a rectangle (x, y from the bottom left corner)
    AppendRectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// `S` - Strokes the path
    StrokePath,
    /// `B*` - Fills the path with the even-odd rule and strokes it
    FillStrokeEvenOdd,
    /// `RG` - Sets the stroking color in DeviceRGB (components 0.0 - 1.0)
    SetStrokeColorRgb { r: f64, g: f64, b: f64 },
    /// `rg` - Sets the fill color in DeviceRGB (components 0.0 - 1.0)
    SetFillColorRgb { r: f64, g: f64, b: f64 },
    /// `BT` - Starts a section of text
    BeginText,
    /// `ET` - Ends a section of text
    EndText,
    /// `Tf` - Sets the font (by resource name) and size
    SetFontAndSize { font: String, size: f64 },
    /// `Td` - Moves to the start of the next line, offset from the start of the current line
    MoveTextPosition { tx: f64, ty: f64 },
    /// `Tj` - Shows the already encoded bytes with the current font
    ShowText { bytes: Vec<u8> },
    /// `Do` - Paints the XObject with the given resource name
    InvokeXObject { name: String },
    /// Any other operator, with its operands untouched
    Other {
        operator: String,
        operands: Vec<Object>,
    },
}

impl Op {
    /// Resource name of the font this operation selects, if any
    pub fn font_name(&self) -> Option<&str> {
        match self {
            Op::SetFontAndSize { font, .. } => Some(font),
            _ => None,
        }
    }

    /// Resource name of the XObject this operation paints, if any
    pub fn xobject_name(&self) -> Option<&str> {
        match self {
            Op::InvokeXObject { name } => Some(name),
            _ => None,
        }
    }
}
