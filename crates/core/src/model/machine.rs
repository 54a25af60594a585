//! Graphics state machine shared by the writer and the interpreter.
//!
//! Holds the current [`PDFGraphicState`], the `q`/`Q` stack, the text-object
//! flag and the three auxiliary stacks (stroking color space, non-stroking
//! color space, font).
//!
//! Mode rules:
//! - `BT` inside a text object, `ET` outside one, and text showing or
//!   positioning outside one are [`PdfError::State`] errors.
//! - `cm`, `q` and `Q` inside a text object are applied but produce a
//!   [`StateWarning`].
//! - The text-object flag is not part of the saved state, so `Q` never
//!   reopens or closes a text object.

use super::color::PDFColorSpace;
use super::stack::StateStack;
use super::state::{Color, PDFGraphicState};
use crate::diagnostics::{Warning, WarningKind};
use crate::error::{PdfError, Result};
use crate::font::PDFFont;
use crate::utils::{MATRIX_IDENTITY, Matrix, mult_matrix};
use std::fmt;
use std::sync::Arc;

/// Non-fatal state problem; the operation was still applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateWarning {
    /// `cm`, `q` or `Q` issued inside a text object.
    InsideTextObject { operator: &'static str },
    /// `Q` with nothing saved; nothing was restored.
    RestoreWithoutSave,
}

impl fmt::Display for StateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsideTextObject { operator } => {
                write!(f, "{operator} is not allowed within a text block")
            }
            Self::RestoreWithoutSave => write!(f, "restore without a matching save"),
        }
    }
}

impl StateWarning {
    /// Structured form for a [`crate::diagnostics::Diagnostics`] sink.
    pub fn to_warning(self) -> Warning {
        match self {
            Self::InsideTextObject { operator } => {
                Warning::new(WarningKind::InsideTextObject, self.to_string()).operator(operator)
            }
            Self::RestoreWithoutSave => {
                Warning::new(WarningKind::RestoreWithoutSave, self.to_string()).operator("Q")
            }
        }
    }
}

/// Font selected by `Tf`, as kept on the font stack.
#[derive(Debug, Clone)]
pub struct FontBinding {
    pub font: Arc<dyn PDFFont>,
    /// Resource name the font was selected with.
    pub name: String,
    pub size: f64,
}

impl PartialEq for FontBinding {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.font, &other.font) && self.name == other.name && self.size == other.size
    }
}

#[derive(Debug, Clone)]
pub struct GraphicsStateMachine {
    state: PDFGraphicState,
    saved: Vec<PDFGraphicState>,
    in_text: bool,
    stroking_spaces: StateStack<PDFColorSpace>,
    non_stroking_spaces: StateStack<PDFColorSpace>,
    fonts: StateStack<Option<FontBinding>>,
}

impl GraphicsStateMachine {
    pub fn new() -> Self {
        Self::with_ctm(MATRIX_IDENTITY)
    }

    pub fn with_ctm(ctm: Matrix) -> Self {
        Self {
            state: PDFGraphicState::with_ctm(ctm),
            saved: Vec::new(),
            in_text: false,
            stroking_spaces: StateStack::new(),
            non_stroking_spaces: StateStack::new(),
            fonts: StateStack::new(),
        }
    }

    pub fn state(&self) -> &PDFGraphicState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PDFGraphicState {
        &mut self.state
    }

    pub fn ctm(&self) -> Matrix {
        self.state.ctm
    }

    /// Number of `q` frames currently saved.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text
    }

    // ========================================================================
    // Text objects
    // ========================================================================

    pub fn begin_text(&mut self) -> Result<()> {
        if self.in_text {
            return Err(PdfError::state("Error: Nested beginText() calls are not allowed."));
        }
        self.in_text = true;
        self.state.text.reset();
        Ok(())
    }

    pub fn end_text(&mut self) -> Result<()> {
        if !self.in_text {
            return Err(PdfError::state(
                "Error: You must call beginText() before calling endText.",
            ));
        }
        self.in_text = false;
        Ok(())
    }

    /// Fails unless inside a text object.
    pub fn require_text(&self, what: &str) -> Result<()> {
        if self.in_text {
            Ok(())
        } else {
            Err(PdfError::state(format!(
                "Error: must call beginText() before {what}"
            )))
        }
    }

    /// Fails inside a text object.
    pub fn require_no_text(&self, what: &str) -> Result<()> {
        if self.in_text {
            Err(PdfError::state(format!(
                "Error: {what} is not allowed within a text block."
            )))
        } else {
            Ok(())
        }
    }

    fn soft_text_check(&self, operator: &'static str) -> Option<StateWarning> {
        self.in_text
            .then_some(StateWarning::InsideTextObject { operator })
    }

    // ========================================================================
    // Save / restore / transform
    // ========================================================================

    pub fn save(&mut self) -> Option<StateWarning> {
        let warning = self.soft_text_check("q");
        self.saved.push(self.state.clone());
        self.stroking_spaces.push_duplicate();
        self.non_stroking_spaces.push_duplicate();
        self.fonts.push_duplicate();
        warning
    }

    pub fn restore(&mut self) -> Option<StateWarning> {
        let Some(previous) = self.saved.pop() else {
            return Some(StateWarning::RestoreWithoutSave);
        };
        let warning = self.soft_text_check("Q");
        self.state = previous;
        self.stroking_spaces.pop_if_present();
        self.non_stroking_spaces.pop_if_present();
        self.fonts.pop_if_present();
        warning
    }

    /// Pre-multiply the CTM by `matrix`.
    pub fn concat(&mut self, matrix: Matrix) -> Option<StateWarning> {
        let warning = self.soft_text_check("cm");
        self.state.ctm = mult_matrix(matrix, self.state.ctm);
        warning
    }

    // ========================================================================
    // Color
    // ========================================================================

    /// Select the stroking color space and reset the color to its initial value.
    pub fn set_stroking_color_space(&mut self, cs: PDFColorSpace) {
        self.state.scolor = cs.initial_color();
        self.stroking_spaces.set_top(cs.clone());
        self.state.scs = cs;
    }

    pub fn set_non_stroking_color_space(&mut self, cs: PDFColorSpace) {
        self.state.ncolor = cs.initial_color();
        self.non_stroking_spaces.set_top(cs.clone());
        self.state.ncs = cs;
    }

    pub fn set_stroking_color(&mut self, color: Color) {
        self.state.scolor = color;
    }

    pub fn set_non_stroking_color(&mut self, color: Color) {
        self.state.ncolor = color;
    }

    /// Top of the stroking color-space stack, if one was ever selected.
    pub fn stroking_color_space(&self) -> Option<&PDFColorSpace> {
        self.stroking_spaces.peek()
    }

    pub fn non_stroking_color_space(&self) -> Option<&PDFColorSpace> {
        self.non_stroking_spaces.peek()
    }

    // ========================================================================
    // Font
    // ========================================================================

    pub fn set_font(&mut self, binding: FontBinding) {
        self.state.text.font = Some(Arc::clone(&binding.font));
        self.state.text.fontname = Some(binding.name.clone());
        self.state.text.fontsize = binding.size;
        self.fonts.set_top(Some(binding));
    }

    /// Select a font name that has no font behind it.
    ///
    /// Name and size are kept; the bound font on both the text state and the
    /// font stack is cleared.
    pub fn set_unresolved_font(&mut self, name: &str, size: f64) {
        self.state.text.font = None;
        self.state.text.fontname = Some(name.to_string());
        self.state.text.fontsize = size;
        if !self.fonts.is_empty() {
            self.fonts.set_top(None);
        }
    }

    /// Font on top of the font stack.
    pub fn font(&self) -> Option<&FontBinding> {
        self.fonts.peek().and_then(Option::as_ref)
    }

    pub fn font_stack_depth(&self) -> usize {
        self.fonts.depth()
    }
}

impl Default for GraphicsStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::StandardFont;

    #[test]
    fn nested_begin_text_is_state_error() {
        let mut machine = GraphicsStateMachine::new();
        machine.begin_text().unwrap();
        assert!(matches!(machine.begin_text(), Err(PdfError::State(_))));
        machine.end_text().unwrap();
        assert!(matches!(machine.end_text(), Err(PdfError::State(_))));
    }

    #[test]
    fn save_inside_text_warns_but_applies() {
        let mut machine = GraphicsStateMachine::new();
        machine.begin_text().unwrap();
        assert_eq!(
            machine.save(),
            Some(StateWarning::InsideTextObject { operator: "q" })
        );
        assert_eq!(machine.depth(), 1);
        assert!(machine.restore().is_some());
        assert_eq!(machine.depth(), 0);
        assert!(machine.in_text_object());
    }

    #[test]
    fn restore_does_not_touch_text_flag() {
        let mut machine = GraphicsStateMachine::new();
        machine.begin_text().unwrap();
        machine.save();
        machine.end_text().unwrap();
        machine.restore();
        assert!(!machine.in_text_object());
    }

    #[test]
    fn restore_without_save_is_reported() {
        let mut machine = GraphicsStateMachine::new();
        assert_eq!(machine.restore(), Some(StateWarning::RestoreWithoutSave));
    }

    #[test]
    fn auxiliary_stacks_follow_nesting() {
        let mut machine = GraphicsStateMachine::new();
        machine.save();
        assert_eq!(machine.font_stack_depth(), 0);
        let font: Arc<dyn PDFFont> = Arc::new(StandardFont::new("Helvetica"));
        machine.set_font(FontBinding {
            font,
            name: "F1".into(),
            size: 12.0,
        });
        machine.save();
        assert_eq!(machine.font_stack_depth(), 2);
        machine.restore();
        machine.restore();
        assert_eq!(machine.font_stack_depth(), 0);
        assert!(machine.font().is_none());
    }

    #[test]
    fn selecting_space_resets_color() {
        let mut machine = GraphicsStateMachine::new();
        machine.set_stroking_color(Color::Gray(0.5));
        machine.set_stroking_color_space(PDFColorSpace::device_cmyk());
        assert_eq!(machine.state().scolor, Color::Cmyk(0.0, 0.0, 0.0, 1.0));
        assert_eq!(
            machine.stroking_color_space(),
            Some(&PDFColorSpace::device_cmyk())
        );
    }
}
