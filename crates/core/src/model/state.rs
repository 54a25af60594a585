//! Graphics and text state records.

use super::color::PDFColorSpace;
use crate::font::PDFFont;
use crate::interp::device::PathSegment;
use crate::utils::{MATRIX_IDENTITY, Matrix};
use std::sync::Arc;

/// Color value held in the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Greyscale color (0.0 = black, 1.0 = white)
    Gray(f64),
    /// RGB color
    Rgb(f64, f64, f64),
    /// CMYK color
    Cmyk(f64, f64, f64, f64),
    /// Components in a non-device space (Separation, DeviceN, Indexed, Lab...)
    Components(Vec<f64>),
    /// Colored tiling pattern (PaintType=1) - just the pattern name
    PatternColored(String),
    /// Uncolored tiling pattern (PaintType=2) - base color + pattern name
    PatternUncolored(Box<Color>, String),
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray(0.0)
    }
}

/// A clipping path recorded by `W`/`W*`, in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPath {
    pub path: Vec<PathSegment>,
    pub evenodd: bool,
}

/// Text parameters; part of the graphics state so `q`/`Q` save them.
#[derive(Debug, Clone)]
pub struct PDFTextState {
    pub font: Option<Arc<dyn PDFFont>>,
    /// Font resource name (e.g., "F1")
    pub fontname: Option<String>,
    pub fontsize: f64,
    pub charspace: f64,
    pub wordspace: f64,
    /// Horizontal scaling percentage (100 = normal)
    pub scaling: f64,
    pub leading: f64,
    /// Text rendering mode (0-7)
    pub render: i32,
    pub rise: f64,
    /// Text matrix (Tm)
    pub matrix: Matrix,
    /// Text line matrix (Tlm)
    pub linematrix: Matrix,
}

impl PDFTextState {
    pub fn new() -> Self {
        Self {
            font: None,
            fontname: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            render: 0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            linematrix: MATRIX_IDENTITY,
        }
    }

    /// Reset text matrix and line matrix; done by `BT`.
    pub fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.linematrix = MATRIX_IDENTITY;
    }
}

impl Default for PDFTextState {
    fn default() -> Self {
        Self::new()
    }
}

/// The graphics state saved by `q` and restored by `Q`.
#[derive(Debug, Clone)]
pub struct PDFGraphicState {
    /// Current transformation matrix
    pub ctm: Matrix,
    pub linewidth: f64,
    /// Line cap style (0, 1, or 2)
    pub linecap: i32,
    /// Line join style (0, 1, or 2)
    pub linejoin: i32,
    pub miterlimit: f64,
    /// Dash pattern: (array, phase)
    pub dash: (Vec<f64>, f64),
    /// Rendering intent name
    pub intent: Option<String>,
    /// Flatness tolerance
    pub flatness: f64,

    /// Stroking color
    pub scolor: Color,
    /// Stroking color space
    pub scs: PDFColorSpace,

    /// Non-stroking (fill) color
    pub ncolor: Color,
    /// Non-stroking color space
    pub ncs: PDFColorSpace,

    /// Clipping paths intersected so far.
    pub clip: Vec<ClipPath>,
    pub text: PDFTextState,
}

impl PDFGraphicState {
    pub fn new() -> Self {
        Self::with_ctm(MATRIX_IDENTITY)
    }

    pub fn with_ctm(ctm: Matrix) -> Self {
        Self {
            ctm,
            linewidth: 1.0,
            linecap: 0,
            linejoin: 0,
            miterlimit: 10.0,
            dash: (Vec::new(), 0.0),
            intent: None,
            flatness: 1.0,
            scolor: Color::default(),
            scs: PDFColorSpace::device_gray(),
            ncolor: Color::default(),
            ncs: PDFColorSpace::device_gray(),
            clip: Vec::new(),
            text: PDFTextState::new(),
        }
    }
}

impl Default for PDFGraphicState {
    fn default() -> Self {
        Self::new()
    }
}
