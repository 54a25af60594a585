//! Color spaces and their initial colors.

use super::objects::{PDFDict, PDFObject};
use super::state::Color;
use crate::error::{PdfError, Result};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Color space families understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpaceFamily {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    CalGray,
    CalRGB,
    Lab,
    ICCBased,
    Indexed,
    Pattern,
    Separation,
    DeviceN,
}

impl ColorSpaceFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceGray => "DeviceGray",
            Self::DeviceRGB => "DeviceRGB",
            Self::DeviceCMYK => "DeviceCMYK",
            Self::CalGray => "CalGray",
            Self::CalRGB => "CalRGB",
            Self::Lab => "Lab",
            Self::ICCBased => "ICCBased",
            Self::Indexed => "Indexed",
            Self::Pattern => "Pattern",
            Self::Separation => "Separation",
            Self::DeviceN => "DeviceN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "DeviceGray" | "G" => Self::DeviceGray,
            "DeviceRGB" | "RGB" => Self::DeviceRGB,
            "DeviceCMYK" | "CMYK" => Self::DeviceCMYK,
            "CalGray" => Self::CalGray,
            "CalRGB" => Self::CalRGB,
            "Lab" => Self::Lab,
            "ICCBased" => Self::ICCBased,
            "Indexed" | "I" => Self::Indexed,
            "Pattern" => Self::Pattern,
            "Separation" => Self::Separation,
            "DeviceN" => Self::DeviceN,
            _ => return None,
        })
    }

    /// Device spaces can be named directly in content without a resource entry.
    pub const fn is_device(self) -> bool {
        matches!(self, Self::DeviceGray | Self::DeviceRGB | Self::DeviceCMYK)
    }
}

/// A resolved color space.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFColorSpace {
    pub family: ColorSpaceFamily,
    /// Number of color components
    pub ncomponents: usize,
    /// The name or array this space was built from.
    pub definition: PDFObject,
    /// Underlying space of an uncolored pattern space.
    pub base: Option<Box<PDFColorSpace>>,
}

impl PDFColorSpace {
    fn predefined(family: ColorSpaceFamily, ncomponents: usize) -> Self {
        Self {
            family,
            ncomponents,
            definition: PDFObject::name(family.as_str()),
            base: None,
        }
    }

    pub fn device_gray() -> Self {
        Self::predefined(ColorSpaceFamily::DeviceGray, 1)
    }

    pub fn device_rgb() -> Self {
        Self::predefined(ColorSpaceFamily::DeviceRGB, 3)
    }

    pub fn device_cmyk() -> Self {
        Self::predefined(ColorSpaceFamily::DeviceCMYK, 4)
    }

    pub fn pattern() -> Self {
        Self::predefined(ColorSpaceFamily::Pattern, 0)
    }

    pub const fn name(&self) -> &'static str {
        self.family.as_str()
    }

    /// Build a color space from a name or an array definition.
    ///
    /// References inside the definition must already be resolved.
    pub fn from_object(obj: &PDFObject) -> Result<Self> {
        match obj {
            PDFObject::Name(name) => PREDEFINED_COLORSPACE
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| PdfError::KeyError(format!("color space {name}"))),
            PDFObject::Array(items) => {
                let family_name = items
                    .first()
                    .ok_or_else(|| PdfError::argument("empty color space array"))?
                    .as_name()?;
                let family = ColorSpaceFamily::from_name(family_name)
                    .ok_or_else(|| PdfError::KeyError(format!("color space {family_name}")))?;
                let ncomponents = match family {
                    ColorSpaceFamily::ICCBased => items
                        .get(1)
                        .and_then(|s| s.as_dict().ok())
                        .and_then(|d| d.get("N"))
                        .and_then(|n| n.as_int().ok())
                        .map_or(3, |n| n.clamp(1, 4) as usize),
                    ColorSpaceFamily::DeviceN => items
                        .get(1)
                        .and_then(|n| n.as_array().ok())
                        .map_or(1, Vec::len),
                    ColorSpaceFamily::CalRGB | ColorSpaceFamily::Lab | ColorSpaceFamily::DeviceRGB => 3,
                    ColorSpaceFamily::DeviceCMYK => 4,
                    ColorSpaceFamily::Pattern => 0,
                    _ => 1,
                };
                let base = match family {
                    ColorSpaceFamily::Pattern => match items.get(1) {
                        Some(base) => Some(Box::new(Self::from_object(base)?)),
                        None => None,
                    },
                    _ => None,
                };
                Ok(Self {
                    family,
                    ncomponents,
                    definition: obj.clone(),
                    base,
                })
            }
            other => Err(PdfError::TypeError {
                expected: "name or array",
                got: other.type_name(),
            }),
        }
    }

    /// The color a space starts out with when it is selected.
    pub fn initial_color(&self) -> Color {
        match self.family {
            ColorSpaceFamily::DeviceGray | ColorSpaceFamily::CalGray => Color::Gray(0.0),
            ColorSpaceFamily::DeviceRGB | ColorSpaceFamily::CalRGB => Color::Rgb(0.0, 0.0, 0.0),
            ColorSpaceFamily::DeviceCMYK => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            ColorSpaceFamily::Pattern => Color::Components(Vec::new()),
            ColorSpaceFamily::Separation | ColorSpaceFamily::DeviceN => {
                Color::Components(vec![1.0; self.ncomponents])
            }
            ColorSpaceFamily::ICCBased => self.color_from_components(&vec![0.0; self.ncomponents]),
            ColorSpaceFamily::Lab | ColorSpaceFamily::Indexed => {
                Color::Components(vec![0.0; self.ncomponents])
            }
        }
    }

    /// Interpret raw component values in this space.
    pub fn color_from_components(&self, components: &[f64]) -> Color {
        match (self.family, components) {
            (
                ColorSpaceFamily::DeviceGray | ColorSpaceFamily::CalGray | ColorSpaceFamily::ICCBased,
                [g],
            ) => Color::Gray(*g),
            (
                ColorSpaceFamily::DeviceRGB | ColorSpaceFamily::CalRGB | ColorSpaceFamily::ICCBased,
                [r, g, b],
            ) => Color::Rgb(*r, *g, *b),
            (ColorSpaceFamily::DeviceCMYK | ColorSpaceFamily::ICCBased, [c, m, y, k]) => {
                Color::Cmyk(*c, *m, *y, *k)
            }
            _ => Color::Components(components.to_vec()),
        }
    }

    /// Whether color values in this space are set with `SCN`/`scn`.
    pub const fn uses_scn(&self) -> bool {
        matches!(
            self.family,
            ColorSpaceFamily::Pattern
                | ColorSpaceFamily::Separation
                | ColorSpaceFamily::DeviceN
                | ColorSpaceFamily::ICCBased
        )
    }

    /// Dictionary form used when the space must be stored as a resource.
    pub fn resource_value(&self) -> PDFObject {
        self.definition.clone()
    }
}

impl Default for PDFColorSpace {
    fn default() -> Self {
        Self::device_gray()
    }
}

/// A color value together with the space it lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFColor {
    pub components: Vec<f64>,
    /// Pattern resource name, for colors in a Pattern space.
    pub pattern: Option<String>,
    pub color_space: PDFColorSpace,
}

impl PDFColor {
    pub fn new(components: impl Into<Vec<f64>>, color_space: PDFColorSpace) -> Self {
        Self {
            components: components.into(),
            pattern: None,
            color_space,
        }
    }

    /// Color painted with a pattern. `components` is empty for colored
    /// patterns and holds the base-space color for uncolored ones.
    pub fn pattern(
        name: impl Into<String>,
        components: impl Into<Vec<f64>>,
        color_space: PDFColorSpace,
    ) -> Self {
        Self {
            components: components.into(),
            pattern: Some(name.into()),
            color_space,
        }
    }

    /// The value stored in the graphics state.
    pub fn to_state_color(&self) -> Color {
        match &self.pattern {
            Some(name) if self.components.is_empty() => Color::PatternColored(name.clone()),
            Some(name) => {
                let base = match &self.color_space.base {
                    Some(base) => base.color_from_components(&self.components),
                    None => Color::Components(self.components.clone()),
                };
                Color::PatternUncolored(Box::new(base), name.clone())
            }
            None => self.color_space.color_from_components(&self.components),
        }
    }
}

/// Color spaces that may be named directly in content.
pub static PREDEFINED_COLORSPACE: LazyLock<HashMap<&'static str, PDFColorSpace>> =
    LazyLock::new(|| {
        let gray = PDFColorSpace::device_gray();
        let rgb = PDFColorSpace::device_rgb();
        let cmyk = PDFColorSpace::device_cmyk();
        HashMap::from([
            ("DeviceGray", gray.clone()),
            ("G", gray),
            ("DeviceRGB", rgb.clone()),
            ("RGB", rgb),
            ("DeviceCMYK", cmyk.clone()),
            ("CMYK", cmyk),
            ("Pattern", PDFColorSpace::pattern()),
        ])
    });

/// Helper for callers that keep color space definitions in a dictionary.
pub fn lookup_colorspace(dict: &PDFDict, name: &str) -> Result<PDFColorSpace> {
    if let Some(cs) = PREDEFINED_COLORSPACE.get(name) {
        return Ok(cs.clone());
    }
    let definition = dict
        .get(name)
        .ok_or_else(|| PdfError::KeyError(format!("color space {name}")))?;
    PDFColorSpace::from_object(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_colors_per_family() {
        assert_eq!(PDFColorSpace::device_gray().initial_color(), Color::Gray(0.0));
        assert_eq!(
            PDFColorSpace::device_cmyk().initial_color(),
            Color::Cmyk(0.0, 0.0, 0.0, 1.0)
        );
        let sep = PDFColorSpace::from_object(&PDFObject::Array(vec![
            PDFObject::name("Separation"),
            PDFObject::name("Spot"),
            PDFObject::name("DeviceCMYK"),
            PDFObject::Null,
        ]))
        .unwrap();
        assert_eq!(sep.initial_color(), Color::Components(vec![1.0]));
        assert!(sep.uses_scn());
    }

    #[test]
    fn uncolored_pattern_keeps_base() {
        let cs = PDFColorSpace::from_object(&PDFObject::Array(vec![
            PDFObject::name("Pattern"),
            PDFObject::name("DeviceRGB"),
        ]))
        .unwrap();
        assert_eq!(cs.family, ColorSpaceFamily::Pattern);
        assert_eq!(cs.base.as_deref(), Some(&PDFColorSpace::device_rgb()));
    }

    #[test]
    fn pattern_color_state_value() {
        let colored = PDFColor::pattern("P1", Vec::new(), PDFColorSpace::pattern());
        assert_eq!(colored.to_state_color(), Color::PatternColored("P1".into()));
        let rgb = PDFColor::new(vec![1.0, 0.0, 0.0], PDFColorSpace::device_rgb());
        assert_eq!(rgb.to_state_color(), Color::Rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn unknown_name_is_key_error() {
        let err = PDFColorSpace::from_object(&PDFObject::name("CS0")).unwrap_err();
        assert!(matches!(err, PdfError::KeyError(_)));
    }
}
