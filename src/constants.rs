//! PDF operator and dictionary key names, for reducing typing mistakes

/// ## Special graphics state

/// Push the graphics state
pub(crate) const OP_GS_SAVE: &str = "q";
/// Pop the graphics state
pub(crate) const OP_GS_RESTORE: &str = "Q";
/// Concatenate a matrix to the current transformation matrix
pub(crate) const OP_GS_MODIFY_CTM: &str = "cm";
/// Set line width
pub(crate) const OP_PATH_STATE_SET_LINE_WIDTH: &str = "w";

/// ## Color

/// Set the stroking color space to DeviceRGB
pub(crate) const OP_COLOR_SET_STROKE_CS_DEVICERGB: &str = "RG";
/// Set the fill color space to DeviceRGB
pub(crate) const OP_COLOR_SET_FILL_CS_DEVICERGB: &str = "rg";

/// ## Path construction

/// Move to point
pub(crate) const OP_PATH_CONST_MOVE_TO: &str = "m";
/// Straight line to the two following points
pub(crate) const OP_PATH_CONST_LINE_TO: &str = "l";
/// Cubic bezier over four following points
pub(crate) const OP_PATH_CONST_4BEZIER: &str = "c";
/// Add rectangle to the path (width / height): x y width height re
pub(crate) const OP_PATH_CONST_RECT: &str = "re";
/// Close current sub-path
pub(crate) const OP_PATH_CONST_CLOSE_SUBPATH: &str = "h";

/// ## Path painting

/// Stroke path
pub(crate) const OP_PATH_PAINT_STROKE: &str = "S";
/// Fill and stroke path using even-odd rule
pub(crate) const OP_PATH_PAINT_FILL_STROKE_EO: &str = "B*";

/// ## Text

pub(crate) const OP_TEXT_BEGIN: &str = "BT";
pub(crate) const OP_TEXT_END: &str = "ET";
/// Set font and size: /F1 12 Tf
pub(crate) const OP_TEXT_SET_FONT: &str = "Tf";
/// Move to the start of the next line, offset from the start of the current line
pub(crate) const OP_TEXT_MOVE: &str = "Td";
/// Show text without kerning
pub(crate) const OP_TEXT_SHOW: &str = "Tj";

/// ## XObjects

pub(crate) const OP_XOBJECT_INVOKE: &str = "Do";

/// ## Resource dictionary categories

pub const RESOURCE_FONT: &str = "Font";
pub const RESOURCE_XOBJECT: &str = "XObject";
