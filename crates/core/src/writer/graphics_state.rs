//! Graphics state operators.
//!
//! Handles: q, Q, cm, gs, w, J, j, d, M
//!
//! `q`, `Q` and `cm` inside a text object are written anyway and reported
//! to the diagnostics sink. Line style operators are rejected there.

use super::ContentStreamWriter;
use crate::error::{PdfError, Result};
use crate::interp::resources::{ResourceAllocator, ResourceKind};
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::Matrix;
use std::io::Write;

impl<W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, W, R> {
    /// Concatenate `matrix` to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn transform(&mut self, matrix: Matrix) -> Result<()> {
        let (a, b, c, d, e, f) = matrix;
        let mut frag = self.fragment();
        frag.numbers(&[a, b, c, d, e, f])?.operator("cm");
        self.emit(&frag)?;
        let warning = self.machine.concat(matrix);
        self.note(warning);
        Ok(())
    }

    /// PDF operator: `q`
    pub fn save_graphics_state(&mut self) -> Result<()> {
        let mut frag = self.fragment();
        frag.operator("q");
        self.emit(&frag)?;
        let warning = self.machine.save();
        self.note(warning);
        Ok(())
    }

    /// PDF operator: `Q`
    pub fn restore_graphics_state(&mut self) -> Result<()> {
        let mut frag = self.fragment();
        frag.operator("Q");
        self.emit(&frag)?;
        let warning = self.machine.restore();
        self.note(warning);
        Ok(())
    }

    /// Apply an ExtGState dictionary, stored as a resource.
    ///
    /// PDF operator: `gs`
    pub fn set_graphics_state_parameters(&mut self, params: &PDFDict) -> Result<()> {
        let name = self.resources.add_resource(
            ResourceKind::ExtGState,
            PDFObject::Dict(params.clone()),
            None,
        )?;
        let mut frag = self.fragment();
        frag.name(&name).operator("gs");
        self.emit(&frag)
    }

    /// PDF operator: `w`
    pub fn set_line_width(&mut self, width: f64) -> Result<()> {
        self.machine.require_no_text("setLineWidth")?;
        let mut frag = self.fragment();
        frag.number(width)?.operator("w");
        self.emit(&frag)?;
        self.machine.state_mut().linewidth = width;
        Ok(())
    }

    /// Line join: 0 miter, 1 round, 2 bevel.
    ///
    /// PDF operator: `j`
    pub fn set_line_join_style(&mut self, style: i32) -> Result<()> {
        self.machine.require_no_text("setLineJoinStyle")?;
        if !(0..=2).contains(&style) {
            return Err(PdfError::argument("Error: unknown value for line join style"));
        }
        let mut frag = self.fragment();
        frag.integer(i64::from(style)).operator("j");
        self.emit(&frag)?;
        self.machine.state_mut().linejoin = style;
        Ok(())
    }

    /// Line cap: 0 butt, 1 round, 2 projecting square.
    ///
    /// PDF operator: `J`
    pub fn set_line_cap_style(&mut self, style: i32) -> Result<()> {
        self.machine.require_no_text("setLineCapStyle")?;
        if !(0..=2).contains(&style) {
            return Err(PdfError::argument("Error: unknown value for line cap style"));
        }
        let mut frag = self.fragment();
        frag.integer(i64::from(style)).operator("J");
        self.emit(&frag)?;
        self.machine.state_mut().linecap = style;
        Ok(())
    }

    /// PDF operator: `d`
    pub fn set_line_dash_pattern(&mut self, pattern: &[f64], phase: f64) -> Result<()> {
        self.machine.require_no_text("setLineDashPattern")?;
        let mut frag = self.fragment();
        frag.raw(b"[").numbers(pattern)?.raw(b"] ").number(phase)?.operator("d");
        self.emit(&frag)?;
        self.machine.state_mut().dash = (pattern.to_vec(), phase);
        Ok(())
    }

    /// PDF operator: `M`
    pub fn set_miter_limit(&mut self, limit: f64) -> Result<()> {
        self.machine.require_no_text("setMiterLimit")?;
        if limit <= 0.0 {
            return Err(PdfError::argument(
                "A miter limit <= 0 is invalid and will not render in Acrobat Reader",
            ));
        }
        let mut frag = self.fragment();
        frag.number(limit)?.operator("M");
        self.emit(&frag)?;
        self.machine.state_mut().miterlimit = limit;
        Ok(())
    }
}
