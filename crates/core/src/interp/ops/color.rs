//! Color operators.
//!
//! Handles: CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//!
//! - CS/cs: Select a color space by name (stroke/non-stroke)
//! - SC/SCN/sc/scn: Set color in the current color space
//! - G/g, RG/rg, K/k: Select a device space and set a color in one step
//!
//! Color spaces are looked up through the resources in scope, falling back
//! to the device space names.

use crate::error::{PdfError, Result};
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::ContentInterpreter;
use crate::interp::registry::numbers;
use crate::model::color::PDFColorSpace;
use crate::model::objects::PDFObject;
use crate::model::state::Color;

/// Build a color from `SC`/`SCN` operands in `cs`.
fn color_in_space(cs: &PDFColorSpace, args: &[PDFObject]) -> Result<Color> {
    if let Some((PDFObject::Name(pattern), rest)) = args.split_last() {
        let components = numbers(rest)?;
        if components.is_empty() {
            return Ok(Color::PatternColored(pattern.clone()));
        }
        let base = match &cs.base {
            Some(base) => base.color_from_components(&components),
            None => Color::Components(components),
        };
        return Ok(Color::PatternUncolored(Box::new(base), pattern.clone()));
    }
    let components = numbers(args)?;
    if components.len() != cs.ncomponents {
        return Err(PdfError::argument(format!(
            "{} expects {} component(s), got {}",
            cs.name(),
            cs.ncomponents,
            components.len()
        )));
    }
    Ok(cs.color_from_components(&components))
}

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    fn color_space_named(&self, name: &str) -> Result<PDFColorSpace> {
        self.lookup()
            .color_space(name)
            .ok_or_else(|| PdfError::KeyError(format!("color space {name}")))
    }

    // ========================================================================
    // Color space selection
    // ========================================================================

    /// Selects the stroking color space and resets the stroking color to
    /// its initial value.
    ///
    /// PDF operator: `CS`
    pub fn do_CS(&mut self, name: &str) -> Result<()> {
        let cs = self.color_space_named(name)?;
        self.machine.set_stroking_color_space(cs);
        Ok(())
    }

    /// PDF operator: `cs`
    pub fn do_cs(&mut self, name: &str) -> Result<()> {
        let cs = self.color_space_named(name)?;
        self.machine.set_non_stroking_color_space(cs);
        Ok(())
    }

    // ========================================================================
    // Color values
    // ========================================================================

    /// Sets the stroking color in the current stroking color space.
    ///
    /// PDF operators: `SC`, `SCN`
    pub fn do_SC(&mut self, args: &[PDFObject]) -> Result<()> {
        let color = color_in_space(&self.machine.state().scs, args)?;
        self.machine.set_stroking_color(color);
        Ok(())
    }

    /// PDF operators: `sc`, `scn`
    pub fn do_sc(&mut self, args: &[PDFObject]) -> Result<()> {
        let color = color_in_space(&self.machine.state().ncs, args)?;
        self.machine.set_non_stroking_color(color);
        Ok(())
    }

    // ========================================================================
    // Device color shorthands
    // ========================================================================

    /// PDF operator: `G`
    pub fn do_G(&mut self, gray: f64) {
        self.machine
            .set_stroking_color_space(PDFColorSpace::device_gray());
        self.machine.set_stroking_color(Color::Gray(gray));
    }

    /// PDF operator: `g`
    pub fn do_g(&mut self, gray: f64) {
        self.machine
            .set_non_stroking_color_space(PDFColorSpace::device_gray());
        self.machine.set_non_stroking_color(Color::Gray(gray));
    }

    /// PDF operator: `RG`
    pub fn do_RG(&mut self, r: f64, g: f64, b: f64) {
        self.machine
            .set_stroking_color_space(PDFColorSpace::device_rgb());
        self.machine.set_stroking_color(Color::Rgb(r, g, b));
    }

    /// PDF operator: `rg`
    pub fn do_rg(&mut self, r: f64, g: f64, b: f64) {
        self.machine
            .set_non_stroking_color_space(PDFColorSpace::device_rgb());
        self.machine.set_non_stroking_color(Color::Rgb(r, g, b));
    }

    /// PDF operator: `K`
    pub fn do_K(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.machine
            .set_stroking_color_space(PDFColorSpace::device_cmyk());
        self.machine.set_stroking_color(Color::Cmyk(c, m, y, k));
    }

    /// PDF operator: `k`
    pub fn do_k(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.machine
            .set_non_stroking_color_space(PDFColorSpace::device_cmyk());
        self.machine.set_non_stroking_color(Color::Cmyk(c, m, y, k));
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::WarningKind;
    use crate::interp::device::NullDevice;
    use crate::interp::interpreter::ContentInterpreter;
    use crate::interp::resources::{PDFResources, ResourceKind};
    use crate::model::color::{ColorSpaceFamily, PDFColorSpace};
    use crate::model::objects::{PDFDict, PDFObject};
    use crate::model::state::Color;

    #[test]
    fn shorthand_matches_explicit_space() {
        let resources = PDFResources::new();
        let mut device = NullDevice;
        let mut a = ContentInterpreter::new(&mut device, &resources);
        a.execute(b"1 0 0 RG");
        let shorthand = a.machine().state().clone();

        let mut device = NullDevice;
        let mut b = ContentInterpreter::new(&mut device, &resources);
        b.execute(b"/DeviceRGB CS 1 0 0 SC");
        let explicit = b.machine().state();

        assert_eq!(shorthand.scolor, Color::Rgb(1.0, 0.0, 0.0));
        assert_eq!(shorthand.scolor, explicit.scolor);
        assert_eq!(shorthand.scs, explicit.scs);
        assert_eq!(
            a.machine().stroking_color_space(),
            Some(&PDFColorSpace::device_rgb())
        );
    }

    #[test]
    fn component_count_must_match_space() {
        let resources = PDFResources::new();
        let mut device = NullDevice;
        let mut interp = ContentInterpreter::new(&mut device, &resources);
        let summary = interp.execute(b"/DeviceCMYK cs 0.1 0.2 sc 0 0 0 1 sc");
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.warnings[0].kind, WarningKind::OperandMismatch);
        assert_eq!(
            interp.machine().state().ncolor,
            Color::Cmyk(0.0, 0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn named_spaces_and_patterns() {
        let mut resources = PDFResources::new();
        let mut sep = PDFDict::new();
        sep.insert("FunctionType".into(), PDFObject::Int(2));
        resources.insert(
            ResourceKind::ColorSpace,
            "CS0",
            PDFObject::Array(vec![
                PDFObject::name("Separation"),
                PDFObject::name("Spot"),
                PDFObject::name("DeviceCMYK"),
                PDFObject::Dict(sep),
            ]),
        );
        resources.insert(
            ResourceKind::ColorSpace,
            "CS1",
            PDFObject::Array(vec![PDFObject::name("Pattern"), PDFObject::name("DeviceRGB")]),
        );
        let mut device = NullDevice;
        let mut interp = ContentInterpreter::new(&mut device, &resources);
        let summary = interp.execute(
            b"/CS0 CS 0.5 SCN /Pattern cs /P0 scn /CS1 cs 1 0 0 /P1 scn /Nope CS",
        );
        let state = interp.machine().state();
        assert_eq!(state.scs.family, ColorSpaceFamily::Separation);
        assert_eq!(state.scolor, Color::Components(vec![0.5]));
        assert_eq!(
            state.ncolor,
            Color::PatternUncolored(Box::new(Color::Rgb(1.0, 0.0, 0.0)), "P1".into())
        );
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.warnings[0].kind, WarningKind::MissingResource);
    }
}
