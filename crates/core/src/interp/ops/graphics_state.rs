//! Graphics state operators.
//!
//! Handles: q, Q, cm, w, J, j, M, d, ri, i, gs
//!
//! - q/Q: Push/pop graphics state
//! - cm: Concatenate transformation matrix
//! - w, J, j, M, d: Line styling (width, cap, join, miter limit, dash)
//! - ri, i: Rendering intent and flatness
//! - gs: Set parameters from an ExtGState resource

use crate::error::{PdfError, Result};
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::ContentInterpreter;
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::Matrix;

fn line_style(value: i32, what: &str) -> Result<i32> {
    if (0..=2).contains(&value) {
        Ok(value)
    } else {
        Err(PdfError::argument(format!("unknown line {what} style {value}")))
    }
}

fn dash_array(items: &[PDFObject]) -> Result<Vec<f64>> {
    items.iter().map(PDFObject::as_num).collect()
}

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    /// Saves the current graphics state to the stack.
    ///
    /// PDF operator: `q`
    pub fn do_q(&mut self) {
        let warning = self.machine.save();
        self.note(warning);
    }

    /// Restores the graphics state from the stack.
    ///
    /// PDF operator: `Q`
    pub fn do_Q(&mut self) {
        let warning = self.machine.restore();
        self.note(warning);
    }

    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn do_cm(&mut self, matrix: Matrix) {
        let warning = self.machine.concat(matrix);
        self.note(warning);
    }

    /// Sets the line width, in user space.
    ///
    /// PDF operator: `w`
    pub fn do_w(&mut self, linewidth: f64) {
        self.machine.state_mut().linewidth = linewidth;
    }

    /// PDF operator: `J`
    pub fn do_J(&mut self, linecap: i32) -> Result<()> {
        self.machine.state_mut().linecap = line_style(linecap, "cap")?;
        Ok(())
    }

    /// PDF operator: `j`
    pub fn do_j(&mut self, linejoin: i32) -> Result<()> {
        self.machine.state_mut().linejoin = line_style(linejoin, "join")?;
        Ok(())
    }

    /// PDF operator: `M`
    pub fn do_M(&mut self, miterlimit: f64) {
        self.machine.state_mut().miterlimit = miterlimit;
    }

    /// Sets the line dash pattern.
    ///
    /// PDF operator: `d`
    pub fn do_d(&mut self, dash: &[PDFObject], phase: f64) -> Result<()> {
        self.machine.state_mut().dash = (dash_array(dash)?, phase);
        Ok(())
    }

    /// Sets the color rendering intent.
    ///
    /// PDF operator: `ri`
    pub fn do_ri(&mut self, intent: &str) {
        self.machine.state_mut().intent = Some(intent.to_string());
    }

    /// Sets the flatness tolerance.
    ///
    /// PDF operator: `i`
    pub fn do_i(&mut self, flatness: f64) {
        self.machine.state_mut().flatness = flatness;
    }

    /// Applies the LW, LC, LJ, ML, D, RI and FL entries of an ExtGState
    /// resource. Other entries are ignored. Every entry is checked before
    /// any is applied, so a bad entry leaves the state unchanged.
    ///
    /// PDF operator: `gs`
    pub fn do_gs(&mut self, name: &str) -> Result<()> {
        let params = self
            .lookup()
            .ext_gstate(name)
            .ok_or_else(|| PdfError::KeyError(format!("ExtGState {name}")))?;
        let update = ExtGStateUpdate::parse(params)?;
        let state = self.machine.state_mut();
        if let Some(linewidth) = update.linewidth {
            state.linewidth = linewidth;
        }
        if let Some(linecap) = update.linecap {
            state.linecap = linecap;
        }
        if let Some(linejoin) = update.linejoin {
            state.linejoin = linejoin;
        }
        if let Some(miterlimit) = update.miterlimit {
            state.miterlimit = miterlimit;
        }
        if let Some(dash) = update.dash {
            state.dash = dash;
        }
        if let Some(intent) = update.intent {
            state.intent = Some(intent);
        }
        if let Some(flatness) = update.flatness {
            state.flatness = flatness;
        }
        Ok(())
    }
}

/// The ExtGState entries `gs` understands, validated.
#[derive(Debug, Default)]
struct ExtGStateUpdate {
    linewidth: Option<f64>,
    linecap: Option<i32>,
    linejoin: Option<i32>,
    miterlimit: Option<f64>,
    dash: Option<(Vec<f64>, f64)>,
    intent: Option<String>,
    flatness: Option<f64>,
}

impl ExtGStateUpdate {
    fn parse(params: &PDFDict) -> Result<Self> {
        let mut update = Self::default();
        for (key, value) in params {
            match key.as_str() {
                "LW" => update.linewidth = Some(value.as_num()?),
                "LC" => update.linecap = Some(line_style(value.as_int()? as i32, "cap")?),
                "LJ" => update.linejoin = Some(line_style(value.as_int()? as i32, "join")?),
                "ML" => update.miterlimit = Some(value.as_num()?),
                "D" => match value.as_array()?.as_slice() {
                    [dash, phase] => {
                        update.dash = Some((dash_array(dash.as_array()?)?, phase.as_num()?));
                    }
                    _ => return Err(PdfError::argument("ExtGState /D must be [array phase]")),
                },
                "RI" => update.intent = Some(value.as_name()?.to_string()),
                "FL" => update.flatness = Some(value.as_num()?),
                _ => {}
            }
        }
        Ok(update)
    }
}
