//! Text operators.
//!
//! Handles: BT, ET, Tc, Tw, Tz, TL, Tf, Tr, Ts, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! Text object:
//! - BT/ET: Begin/end text object
//!
//! Text state:
//! - Tc: Character spacing
//! - Tw: Word spacing
//! - Tz: Horizontal scaling
//! - TL: Leading
//! - Tf: Font and size
//! - Tr: Rendering mode
//! - Ts: Rise (baseline offset)
//!
//! Text positioning:
//! - Td/TD: Move to next line (TD also sets leading)
//! - Tm: Set text matrix directly
//! - T*: Move to next line using current leading
//!
//! Text showing:
//! - Tj: Show string
//! - TJ: Show with individual glyph positioning
//! - ': Move to next line and show
//! - ": Set spacing, move to next line, and show
//!
//! Positioning and showing outside a text object are state errors. After a
//! string is shown the text matrix advances by the glyph widths.

use crate::diagnostics::{Warning, WarningKind};
use crate::error::{PdfError, Result};
use crate::interp::device::{PDFDevice, PDFTextSeq, PDFTextSeqItem};
use crate::interp::interpreter::ContentInterpreter;
use crate::model::machine::FontBinding;
use crate::model::objects::PDFObject;
use crate::model::state::PDFTextState;
use crate::utils::{Matrix, translate_matrix};

/// Horizontal displacement of `seq` in unscaled text space.
fn advance(textstate: &PDFTextState, seq: &PDFTextSeq) -> f64 {
    let scale = textstate.scaling / 100.0;
    let size = textstate.fontsize;
    seq.iter()
        .map(|item| match item {
            PDFTextSeqItem::Number(n) => -n / 1000.0 * size * scale,
            PDFTextSeqItem::Bytes(codes) => codes
                .iter()
                .map(|&code| {
                    let width = textstate
                        .font
                        .as_ref()
                        .map_or(0.0, |font| font.char_width(code));
                    let word = if code == b' ' { textstate.wordspace } else { 0.0 };
                    (width / 1000.0 * size + textstate.charspace + word) * scale
                })
                .sum(),
        })
        .sum()
}

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    // ========================================================================
    // Text Object Operators
    // ========================================================================

    /// BT - Begin text object; resets the text and line matrices.
    pub fn do_BT(&mut self) -> Result<()> {
        self.machine.begin_text()
    }

    /// ET - End text object.
    pub fn do_ET(&mut self) -> Result<()> {
        self.machine.end_text()
    }

    // ========================================================================
    // Text State Operators
    // ========================================================================

    /// Tc - Set character spacing.
    pub fn do_Tc(&mut self, charspace: f64) {
        self.machine.state_mut().text.charspace = charspace;
    }

    /// Tw - Set word spacing; applies to byte 32 only.
    pub fn do_Tw(&mut self, wordspace: f64) {
        self.machine.state_mut().text.wordspace = wordspace;
    }

    /// Tz - Set horizontal scaling, in percent.
    pub fn do_Tz(&mut self, scaling: f64) {
        self.machine.state_mut().text.scaling = scaling;
    }

    /// TL - Set text leading.
    pub fn do_TL(&mut self, leading: f64) {
        self.machine.state_mut().text.leading = leading;
    }

    /// Tf - Set text font and size.
    ///
    /// A font missing from the resources is reported, but the name and size
    /// still take effect so positioning stays consistent.
    pub fn do_Tf(&mut self, fontid: &str, fontsize: f64) {
        match self.lookup().font(fontid) {
            Some(font) => self.machine.set_font(FontBinding {
                font,
                name: fontid.to_string(),
                size: fontsize,
            }),
            None => {
                self.warn(
                    Warning::new(WarningKind::MissingResource, format!("font {fontid} not found"))
                        .operator("Tf"),
                );
                self.machine.set_unresolved_font(fontid, fontsize);
            }
        }
    }

    /// Tr - Set text rendering mode (0-7).
    pub fn do_Tr(&mut self, render: i32) -> Result<()> {
        if !(0..=7).contains(&render) {
            return Err(PdfError::argument(format!("unknown text rendering mode {render}")));
        }
        self.machine.state_mut().text.render = render;
        Ok(())
    }

    /// Ts - Set text rise.
    pub fn do_Ts(&mut self, rise: f64) {
        self.machine.state_mut().text.rise = rise;
    }

    // ========================================================================
    // Text Positioning Operators
    // ========================================================================

    /// Td - Move to the start of the next line, offset from the start of the
    /// current line by (tx, ty).
    pub fn do_Td(&mut self, tx: f64, ty: f64) -> Result<()> {
        self.machine.require_text("Td")?;
        let text = &mut self.machine.state_mut().text;
        text.linematrix = translate_matrix(text.linematrix, (tx, ty));
        text.matrix = text.linematrix;
        Ok(())
    }

    /// TD - Same as Td, and sets the leading to -ty.
    pub fn do_TD(&mut self, tx: f64, ty: f64) -> Result<()> {
        self.machine.require_text("TD")?;
        self.machine.state_mut().text.leading = -ty;
        self.do_Td(tx, ty)
    }

    /// Tm - Set the text matrix and text line matrix.
    pub fn do_Tm(&mut self, matrix: Matrix) -> Result<()> {
        self.machine.require_text("Tm")?;
        let text = &mut self.machine.state_mut().text;
        text.matrix = matrix;
        text.linematrix = matrix;
        Ok(())
    }

    /// T* - Move to the start of the next line, using the leading.
    pub fn do_T_star(&mut self) -> Result<()> {
        let leading = self.machine.state().text.leading;
        self.do_Td(0.0, -leading)
    }

    // ========================================================================
    // Text Showing Operators
    // ========================================================================

    fn show(&mut self, seq: PDFTextSeq) -> Result<()> {
        self.machine.require_text("showing text")?;
        let state = self.machine.state();
        self.device.render_string(&state.text, &seq, state);
        let tx = advance(&state.text, &seq);
        let text = &mut self.machine.state_mut().text;
        text.matrix = translate_matrix(text.matrix, (tx, 0.0));
        Ok(())
    }

    /// TJ - Show strings with individual glyph positioning.
    ///
    /// Numbers in the array are adjustments in thousandths of text space,
    /// subtracted from the advance.
    pub fn do_TJ(&mut self, array: &[PDFObject]) -> Result<()> {
        let seq = array
            .iter()
            .map(|item| match item {
                PDFObject::String(bytes) => Ok(PDFTextSeqItem::Bytes(bytes.clone())),
                other => other.as_num().map(PDFTextSeqItem::Number),
            })
            .collect::<Result<PDFTextSeq>>()?;
        self.show(seq)
    }

    /// Tj - Show a text string.
    pub fn do_Tj(&mut self, s: &[u8]) -> Result<()> {
        self.show(vec![PDFTextSeqItem::Bytes(s.to_vec())])
    }

    /// ' - Move to the next line and show a string.
    pub fn do_quote(&mut self, s: &[u8]) -> Result<()> {
        self.do_T_star()?;
        self.do_Tj(s)
    }

    /// " - Set word and character spacing, move to the next line and show a
    /// string.
    pub fn do_doublequote(&mut self, aw: f64, ac: f64, s: &[u8]) -> Result<()> {
        self.machine.require_text("\"")?;
        self.do_Tw(aw);
        self.do_Tc(ac);
        self.do_quote(s)
    }
}
