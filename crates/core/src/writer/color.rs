//! Color operators.
//!
//! Handles: CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//!
//! A color space is written only when it differs from the one on top of the
//! color-space stack. Device shorthands put their space on the stack too, so
//! `rg` followed by a DeviceRGB color needs no `cs`.

use super::ContentStreamWriter;
use crate::error::{PdfError, Result};
use crate::interp::resources::{ResourceAllocator, ResourceKind};
use crate::model::color::{PDFColor, PDFColorSpace};
use crate::model::objects::PDFObject;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Stroking,
    NonStroking,
}

impl Side {
    const fn pick(self, stroking: &'static str, non_stroking: &'static str) -> &'static str {
        match self {
            Self::Stroking => stroking,
            Self::NonStroking => non_stroking,
        }
    }
}

fn check_unit(values: &[f64]) -> Result<()> {
    if values.iter().all(|v| (0.0..=1.0).contains(v)) {
        Ok(())
    } else {
        Err(PdfError::argument(format!(
            "Parameters must be within 0..1, but are {values:?}"
        )))
    }
}

fn from_255(values: &[i32]) -> Result<Vec<f64>> {
    if values.iter().all(|v| (0..=255).contains(v)) {
        Ok(values.iter().map(|&v| f64::from(v) / 255.0).collect())
    } else {
        Err(PdfError::argument(format!(
            "Parameters must be within 0..255, but are {values:?}"
        )))
    }
}

impl<W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, W, R> {
    /// Name under which `cs` is referenced from content. Device spaces use
    /// their own name; everything else becomes a ColorSpace resource.
    fn color_space_name(&mut self, cs: &PDFColorSpace) -> Result<String> {
        match &cs.definition {
            PDFObject::Name(name) => Ok(name.clone()),
            definition => self
                .resources
                .add_resource(ResourceKind::ColorSpace, definition.clone(), None),
        }
    }

    fn current_space(&self, side: Side) -> Option<&PDFColorSpace> {
        match side {
            Side::Stroking => self.machine.stroking_color_space(),
            Side::NonStroking => self.machine.non_stroking_color_space(),
        }
    }

    fn apply_space(&mut self, side: Side, cs: PDFColorSpace) {
        match side {
            Side::Stroking => self.machine.set_stroking_color_space(cs),
            Side::NonStroking => self.machine.set_non_stroking_color_space(cs),
        }
    }

    fn write_color_space(&mut self, side: Side, cs: &PDFColorSpace) -> Result<()> {
        let name = self.color_space_name(cs)?;
        let mut frag = self.fragment();
        frag.name(&name).operator(side.pick("CS", "cs"));
        self.emit(&frag)?;
        self.apply_space(side, cs.clone());
        Ok(())
    }

    fn write_color(&mut self, side: Side, color: &PDFColor) -> Result<()> {
        let cs = &color.color_space;
        let mut body = self.fragment();
        body.numbers(&color.components)?;
        if let Some(pattern) = &color.pattern {
            body.name(pattern);
        }
        let op = if cs.uses_scn() {
            side.pick("SCN", "scn")
        } else {
            side.pick("SC", "sc")
        };
        body.operator(op);

        // a resource is allocated only once the components are known to be valid
        let switch_space = self.current_space(side) != Some(cs);
        let mut frag = self.fragment();
        if switch_space {
            let name = self.color_space_name(cs)?;
            frag.name(&name).operator(side.pick("CS", "cs"));
        }
        frag.append(&body);
        self.emit(&frag)?;

        if switch_space {
            self.apply_space(side, cs.clone());
        }
        let value = color.to_state_color();
        match side {
            Side::Stroking => self.machine.set_stroking_color(value),
            Side::NonStroking => self.machine.set_non_stroking_color(value),
        }
        Ok(())
    }

    fn write_components(&mut self, side: Side, components: &[f64]) -> Result<()> {
        let Some(cs) = self.current_space(side).cloned() else {
            return Err(PdfError::state(
                "The color space must be set before setting a color",
            ));
        };
        self.write_color(side, &PDFColor::new(components, cs))
    }

    /// Write a device shorthand (`G`, `RG`, `K` and lowercase forms).
    fn write_device(&mut self, side: Side, components: &[f64], cs: PDFColorSpace) -> Result<()> {
        check_unit(components)?;
        let op = match components.len() {
            1 => side.pick("G", "g"),
            3 => side.pick("RG", "rg"),
            _ => side.pick("K", "k"),
        };
        let mut frag = self.fragment();
        frag.numbers(components)?.operator(op);
        self.emit(&frag)?;
        let value = cs.color_from_components(components);
        self.apply_space(side, cs);
        match side {
            Side::Stroking => self.machine.set_stroking_color(value),
            Side::NonStroking => self.machine.set_non_stroking_color(value),
        }
        Ok(())
    }

    // ========================================================================
    // Color spaces
    // ========================================================================

    /// PDF operator: `CS`
    pub fn set_stroking_color_space(&mut self, cs: &PDFColorSpace) -> Result<()> {
        self.write_color_space(Side::Stroking, cs)
    }

    /// PDF operator: `cs`
    pub fn set_non_stroking_color_space(&mut self, cs: &PDFColorSpace) -> Result<()> {
        self.write_color_space(Side::NonStroking, cs)
    }

    // ========================================================================
    // Colors in an explicit space
    // ========================================================================

    /// Set the stroking color, selecting its space first when needed.
    ///
    /// PDF operators: `CS` (optional), then `SC` or `SCN`
    pub fn set_stroking_color(&mut self, color: &PDFColor) -> Result<()> {
        self.write_color(Side::Stroking, color)
    }

    /// PDF operators: `cs` (optional), then `sc` or `scn`
    pub fn set_non_stroking_color(&mut self, color: &PDFColor) -> Result<()> {
        self.write_color(Side::NonStroking, color)
    }

    /// Components in the current stroking color space.
    pub fn set_stroking_color_components(&mut self, components: &[f64]) -> Result<()> {
        self.write_components(Side::Stroking, components)
    }

    pub fn set_non_stroking_color_components(&mut self, components: &[f64]) -> Result<()> {
        self.write_components(Side::NonStroking, components)
    }

    // ========================================================================
    // Device shorthands
    // ========================================================================

    /// Gray level in 0..1.
    ///
    /// PDF operator: `G`
    pub fn set_stroking_gray(&mut self, gray: f64) -> Result<()> {
        self.write_device(Side::Stroking, &[gray], PDFColorSpace::device_gray())
    }

    /// Gray level in 0..255.
    pub fn set_stroking_gray_255(&mut self, gray: i32) -> Result<()> {
        let values = from_255(&[gray])?;
        self.set_stroking_gray(values[0])
    }

    /// PDF operator: `g`
    pub fn set_non_stroking_gray(&mut self, gray: f64) -> Result<()> {
        self.write_device(Side::NonStroking, &[gray], PDFColorSpace::device_gray())
    }

    pub fn set_non_stroking_gray_255(&mut self, gray: i32) -> Result<()> {
        let values = from_255(&[gray])?;
        self.set_non_stroking_gray(values[0])
    }

    /// RGB components in 0..1.
    ///
    /// PDF operator: `RG`
    pub fn set_stroking_rgb(&mut self, r: f64, g: f64, b: f64) -> Result<()> {
        self.write_device(Side::Stroking, &[r, g, b], PDFColorSpace::device_rgb())
    }

    /// RGB components in 0..255.
    pub fn set_stroking_rgb_255(&mut self, r: i32, g: i32, b: i32) -> Result<()> {
        let values = from_255(&[r, g, b])?;
        self.write_device(Side::Stroking, &values, PDFColorSpace::device_rgb())
    }

    /// PDF operator: `rg`
    pub fn set_non_stroking_rgb(&mut self, r: f64, g: f64, b: f64) -> Result<()> {
        self.write_device(Side::NonStroking, &[r, g, b], PDFColorSpace::device_rgb())
    }

    pub fn set_non_stroking_rgb_255(&mut self, r: i32, g: i32, b: i32) -> Result<()> {
        let values = from_255(&[r, g, b])?;
        self.write_device(Side::NonStroking, &values, PDFColorSpace::device_rgb())
    }

    /// CMYK components in 0..1.
    ///
    /// PDF operator: `K`
    pub fn set_stroking_cmyk(&mut self, c: f64, m: f64, y: f64, k: f64) -> Result<()> {
        self.write_device(Side::Stroking, &[c, m, y, k], PDFColorSpace::device_cmyk())
    }

    pub fn set_stroking_cmyk_255(&mut self, c: i32, m: i32, y: i32, k: i32) -> Result<()> {
        let values = from_255(&[c, m, y, k])?;
        self.write_device(Side::Stroking, &values, PDFColorSpace::device_cmyk())
    }

    /// PDF operator: `k`
    pub fn set_non_stroking_cmyk(&mut self, c: f64, m: f64, y: f64, k: f64) -> Result<()> {
        self.write_device(Side::NonStroking, &[c, m, y, k], PDFColorSpace::device_cmyk())
    }

    pub fn set_non_stroking_cmyk_255(&mut self, c: i32, m: i32, y: i32, k: i32) -> Result<()> {
        let values = from_255(&[c, m, y, k])?;
        self.write_device(Side::NonStroking, &values, PDFColorSpace::device_cmyk())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::resources::PDFResources;
    use crate::model::objects::PDFDict;
    use crate::model::state::Color;

    #[test]
    fn color_space_written_once() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        let red = PDFColor::new(vec![1.0, 0.0, 0.0], PDFColorSpace::device_rgb());
        let blue = PDFColor::new(vec![0.0, 0.0, 1.0], PDFColorSpace::device_rgb());
        writer.set_stroking_color(&red).unwrap();
        writer.set_stroking_color(&blue).unwrap();
        assert_eq!(
            writer.get_ref(),
            b"/DeviceRGB CS\n1 0 0 SC\n0 0 1 SC\n"
        );
        assert_eq!(writer.machine().state().scolor, Color::Rgb(0.0, 0.0, 1.0));
    }

    #[test]
    fn shorthand_primes_the_space_stack() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        writer.set_non_stroking_rgb_255(255, 0, 0).unwrap();
        writer.set_non_stroking_color_components(&[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(writer.get_ref(), b"1 0 0 rg\n0 1 0 sc\n");
    }

    #[test]
    fn components_need_a_space() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        assert!(matches!(
            writer.set_stroking_color_components(&[0.5]),
            Err(PdfError::State(_))
        ));
    }

    #[test]
    fn out_of_range_components_write_nothing() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        assert!(matches!(
            writer.set_stroking_rgb_255(256, 0, 0),
            Err(PdfError::Argument(_))
        ));
        assert!(matches!(
            writer.set_stroking_cmyk(0.0, 0.0, 1.5, 0.0),
            Err(PdfError::Argument(_))
        ));
        assert!(matches!(
            writer.set_non_stroking_gray(-0.1),
            Err(PdfError::Argument(_))
        ));
        assert!(writer.get_ref().is_empty());
        assert!(writer.machine().stroking_color_space().is_none());
    }

    #[test]
    fn separation_uses_scn_and_a_resource() {
        let mut resources = PDFResources::new();
        let sep = PDFColorSpace::from_object(&PDFObject::Array(vec![
            PDFObject::name("Separation"),
            PDFObject::name("Gold"),
            PDFObject::name("DeviceCMYK"),
            PDFObject::Dict(PDFDict::new()),
        ]))
        .unwrap();
        {
            let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
            writer
                .set_non_stroking_color(&PDFColor::new(vec![0.25], sep))
                .unwrap();
            assert_eq!(writer.get_ref(), b"/cs1 cs\n0.25 scn\n");
        }
        assert!(resources.get(ResourceKind::ColorSpace, "cs1").is_some());
    }

    #[test]
    fn pattern_color_carries_name() {
        let mut resources = PDFResources::new();
        let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
        let color = PDFColor::pattern("P1", Vec::new(), PDFColorSpace::pattern());
        writer.set_non_stroking_color(&color).unwrap();
        assert_eq!(writer.get_ref(), b"/Pattern cs\n/P1 scn\n");
        assert_eq!(
            writer.machine().state().ncolor,
            Color::PatternColored("P1".into())
        );
    }

    #[test]
    fn rejected_color_allocates_no_resource() {
        let mut resources = PDFResources::new();
        let sep = PDFColorSpace::from_object(&PDFObject::Array(vec![
            PDFObject::name("Separation"),
            PDFObject::name("Gold"),
            PDFObject::name("DeviceCMYK"),
            PDFObject::Dict(PDFDict::new()),
        ]))
        .unwrap();
        {
            let mut writer = ContentStreamWriter::new(Vec::new(), &mut resources);
            assert!(matches!(
                writer.set_stroking_color(&PDFColor::new(vec![f64::NAN], sep)),
                Err(PdfError::Argument(_))
            ));
            assert!(writer.get_ref().is_empty());
            assert!(writer.machine().stroking_color_space().is_none());
        }
        assert!(resources.names(ResourceKind::ColorSpace).is_empty());
    }
}
