//! Text operators.
//!
//! Handles: BT, ET, Tf, Tj, TJ, TL, T*, Td, Tm, Tc, Tw, Tz, Ts, Tr
//!
//! Showing text and moving the text position require an open text object.
//! Text state parameters (Tf, Tc, Tw, Tz, TL, Ts, Tr) may be set anywhere.

use super::ContentStreamWriter;
use crate::error::{PdfError, Result};
use crate::font::PDFFont;
use crate::interp::resources::ResourceAllocator;
use crate::model::machine::FontBinding;
use crate::utils::{Matrix, mult_matrix};
use std::io::Write;
use std::sync::Arc;

/// Text rendering mode (`Tr` operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    #[default]
    Fill = 0,
    Stroke = 1,
    FillStroke = 2,
    Neither = 3,
    FillClip = 4,
    StrokeClip = 5,
    FillStrokeClip = 6,
    NeitherClip = 7,
}

impl RenderingMode {
    pub const fn from_int(value: i64) -> Option<Self> {
        Some(match value {
            0 => Self::Fill,
            1 => Self::Stroke,
            2 => Self::FillStroke,
            3 => Self::Neither,
            4 => Self::FillClip,
            5 => Self::StrokeClip,
            6 => Self::FillStrokeClip,
            7 => Self::NeitherClip,
            _ => return None,
        })
    }

    pub const fn is_clip(self) -> bool {
        self as i32 >= 4
    }
}

/// One element of a `TJ` array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextElement<'s> {
    Text(&'s str),
    /// Adjustment in thousandths of text space, subtracted from the advance.
    Adjust(f64),
}

impl<W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, W, R> {
    /// Begin a text object.
    ///
    /// PDF operator: `BT`
    pub fn begin_text(&mut self) -> Result<()> {
        if self.machine.in_text_object() {
            return Err(PdfError::state("Error: Nested beginText() calls are not allowed."));
        }
        let mut frag = self.fragment();
        frag.operator("BT");
        self.emit(&frag)?;
        self.machine.begin_text()
    }

    /// End a text object.
    ///
    /// PDF operator: `ET`
    pub fn end_text(&mut self) -> Result<()> {
        if !self.machine.in_text_object() {
            return Err(PdfError::state(
                "Error: You must call beginText() before calling endText.",
            ));
        }
        let mut frag = self.fragment();
        frag.operator("ET");
        self.emit(&frag)?;
        self.machine.end_text()
    }

    /// Select a font and size. The font is added to the resources and, if it
    /// will be subset, to the subset registry.
    ///
    /// PDF operator: `Tf`
    pub fn set_font(&mut self, font: &Arc<dyn PDFFont>, size: f64) -> Result<()> {
        let mut frag = self.fragment();
        // validate the size before allocating a resource name
        frag.number(size)?;
        let name = self.resources.add_font(font)?;
        let mut frag = self.fragment();
        frag.name(&name).number(size)?.operator("Tf");
        self.emit(&frag)?;

        if font.will_be_subset()
            && let Some(registry) = self.subsets.as_deref_mut()
        {
            registry.register(font);
        }
        self.machine.set_font(FontBinding {
            font: Arc::clone(font),
            name,
            size,
        });
        Ok(())
    }

    /// Encode `text` with the current font.
    fn encode_text(&self, text: &str) -> Result<Vec<u8>> {
        self.machine.require_text("showText()")?;
        let binding = self
            .machine
            .font()
            .ok_or_else(|| PdfError::state("Must call setFont() before showText()"))?;
        binding.font.encode(text)
    }

    /// Add the code points of text that was written to the font's subset.
    fn record_subset<'t>(&self, texts: impl IntoIterator<Item = &'t str>) {
        if let Some(binding) = self.machine.font()
            && binding.font.will_be_subset()
        {
            texts
                .into_iter()
                .flat_map(str::chars)
                .for_each(|ch| binding.font.add_to_subset(ch));
        }
    }

    /// Show a string with the current font.
    ///
    /// PDF operator: `Tj`
    pub fn show_text(&mut self, text: &str) -> Result<()> {
        let codes = self.encode_text(text)?;
        let mut frag = self.fragment();
        frag.string(&codes).raw(b" ").operator("Tj");
        self.emit(&frag)?;
        self.record_subset([text]);
        Ok(())
    }

    /// Show strings interleaved with position adjustments.
    ///
    /// Every string is encoded before anything is written or added to the
    /// font subset.
    ///
    /// PDF operator: `TJ`
    pub fn show_text_with_positioning(&mut self, elements: &[TextElement<'_>]) -> Result<()> {
        self.machine.require_text("showText()")?;
        let mut frag = self.fragment();
        frag.raw(b"[");
        for element in elements {
            match *element {
                TextElement::Text(text) => {
                    let codes = self.encode_text(text)?;
                    frag.string(&codes);
                }
                TextElement::Adjust(amount) => {
                    frag.number(amount)?;
                }
            }
        }
        frag.raw(b"] ").operator("TJ");
        self.emit(&frag)?;
        self.record_subset(elements.iter().filter_map(|element| match *element {
            TextElement::Text(text) => Some(text),
            TextElement::Adjust(_) => None,
        }));
        Ok(())
    }

    /// PDF operator: `TL`
    pub fn set_leading(&mut self, leading: f64) -> Result<()> {
        let mut frag = self.fragment();
        frag.number(leading)?.operator("TL");
        self.emit(&frag)?;
        self.machine.state_mut().text.leading = leading;
        Ok(())
    }

    /// Move to the start of the next line, using the leading.
    ///
    /// PDF operator: `T*`
    pub fn new_line(&mut self) -> Result<()> {
        self.machine.require_text("newLine()")?;
        let mut frag = self.fragment();
        frag.operator("T*");
        self.emit(&frag)?;
        let leading = self.machine.state().text.leading;
        self.move_line(0.0, -leading);
        Ok(())
    }

    /// Move to the start of the next line, offset from the current line.
    ///
    /// PDF operator: `Td`
    pub fn new_line_at_offset(&mut self, tx: f64, ty: f64) -> Result<()> {
        self.machine.require_text("newLineAtOffset()")?;
        let mut frag = self.fragment();
        frag.number(tx)?.number(ty)?.operator("Td");
        self.emit(&frag)?;
        self.move_line(tx, ty);
        Ok(())
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        let text = &mut self.machine.state_mut().text;
        text.linematrix = mult_matrix((1.0, 0.0, 0.0, 1.0, tx, ty), text.linematrix);
        text.matrix = text.linematrix;
    }

    /// Replace the text matrix and the text line matrix.
    ///
    /// PDF operator: `Tm`
    pub fn set_text_matrix(&mut self, matrix: Matrix) -> Result<()> {
        self.machine.require_text("setTextMatrix")?;
        let (a, b, c, d, e, f) = matrix;
        let mut frag = self.fragment();
        frag.numbers(&[a, b, c, d, e, f])?.operator("Tm");
        self.emit(&frag)?;
        let text = &mut self.machine.state_mut().text;
        text.matrix = matrix;
        text.linematrix = matrix;
        Ok(())
    }

    /// `Tm` rotating counterclockwise by `angle` radians about the origin,
    /// then translating by (`tx`, `ty`).
    pub fn set_text_rotation(&mut self, angle: f64, tx: f64, ty: f64) -> Result<()> {
        let (sin, cos) = angle.sin_cos();
        self.set_text_matrix((cos, sin, -sin, cos, tx, ty))
    }

    /// `Tm` scaling by (`sx`, `sy`), then translating by (`tx`, `ty`).
    pub fn set_text_scaling(&mut self, sx: f64, sy: f64, tx: f64, ty: f64) -> Result<()> {
        self.set_text_matrix((sx, 0.0, 0.0, sy, tx, ty))
    }

    /// `Tm` translating by (`tx`, `ty`).
    pub fn set_text_translation(&mut self, tx: f64, ty: f64) -> Result<()> {
        self.set_text_matrix((1.0, 0.0, 0.0, 1.0, tx, ty))
    }

    /// PDF operator: `Tc`
    pub fn set_character_spacing(&mut self, spacing: f64) -> Result<()> {
        let mut frag = self.fragment();
        frag.number(spacing)?.operator("Tc");
        self.emit(&frag)?;
        self.machine.state_mut().text.charspace = spacing;
        Ok(())
    }

    /// PDF operator: `Tw`
    pub fn set_word_spacing(&mut self, spacing: f64) -> Result<()> {
        let mut frag = self.fragment();
        frag.number(spacing)?.operator("Tw");
        self.emit(&frag)?;
        self.machine.state_mut().text.wordspace = spacing;
        Ok(())
    }

    /// Horizontal scaling in percent (100 = normal).
    ///
    /// PDF operator: `Tz`
    pub fn set_horizontal_scaling(&mut self, scale: f64) -> Result<()> {
        let mut frag = self.fragment();
        frag.number(scale)?.operator("Tz");
        self.emit(&frag)?;
        self.machine.state_mut().text.scaling = scale;
        Ok(())
    }

    /// PDF operator: `Ts`
    pub fn set_text_rise(&mut self, rise: f64) -> Result<()> {
        let mut frag = self.fragment();
        frag.number(rise)?.operator("Ts");
        self.emit(&frag)?;
        self.machine.state_mut().text.rise = rise;
        Ok(())
    }

    /// PDF operator: `Tr`
    pub fn set_rendering_mode(&mut self, mode: RenderingMode) -> Result<()> {
        let mut frag = self.fragment();
        frag.integer(mode as i64).operator("Tr");
        self.emit(&frag)?;
        self.machine.state_mut().text.render = mode as i32;
        Ok(())
    }
}
