//! Font collaborator used by the writer and interpreter.
//!
//! Font programs are never parsed here. A font only has to map text to
//! codes, report glyph widths and take part in subsetting.

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Base interface for fonts referenced by `Tf`.
pub trait PDFFont: Debug + Send + Sync {
    /// PostScript name of the font (the `/BaseFont` entry).
    fn fontname(&self) -> &str;

    /// Encode text into character codes.
    ///
    /// Fails with [`PdfError::Argument`] when a character has no code in the
    /// font's current encoding.
    fn encode(&self, text: &str) -> Result<Vec<u8>>;

    /// Map character codes back to text. Unknown codes map to U+FFFD.
    fn decode(&self, codes: &[u8]) -> String;

    /// Glyph width in thousandths of text space.
    fn char_width(&self, code: u8) -> f64;

    /// Whether the font will be subset when the document is saved.
    fn will_be_subset(&self) -> bool {
        false
    }

    /// Record a code point as used. Only called when `will_be_subset` is true.
    fn add_to_subset(&self, _codepoint: char) {}
}

/// Receives fonts that must be subset before saving.
pub trait SubsetRegistry {
    fn register(&mut self, font: &Arc<dyn PDFFont>);
}

/// Deduplicating list of fonts to subset.
#[derive(Debug, Default)]
pub struct FontsToSubset {
    fonts: Vec<Arc<dyn PDFFont>>,
}

impl FontsToSubset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fonts(&self) -> &[Arc<dyn PDFFont>] {
        &self.fonts
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl SubsetRegistry for FontsToSubset {
    fn register(&mut self, font: &Arc<dyn PDFFont>) {
        if !self.fonts.iter().any(|f| Arc::ptr_eq(f, font)) {
            self.fonts.push(Arc::clone(font));
        }
    }
}

// WinAnsiEncoding codes 0x80..=0x9F. Zero marks an unassigned slot.
const WIN_ANSI_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, 0x02C6, 0x2030, 0x0160, 0x2039,
    0x0152, 0, 0x017D, 0, 0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, 0x02DC,
    0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

fn win_ansi_encode(ch: char) -> Option<u8> {
    let cp = ch as u32;
    match cp {
        0x20..=0x7E | 0xA0..=0xFF => Some(cp as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .position(|&u| u != 0 && u == cp)
            .map(|i| 0x80 + i as u8),
    }
}

fn win_ansi_decode(code: u8) -> char {
    match code {
        0x80..=0x9F => char::from_u32(WIN_ANSI_HIGH[(code - 0x80) as usize])
            .filter(|&c| c != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER),
        0x20..=0x7E | 0xA0..=0xFF => code as char,
        _ => char::REPLACEMENT_CHARACTER,
    }
}

/// A simple (single-byte) font using WinAnsiEncoding.
#[derive(Debug)]
pub struct StandardFont {
    basefont: String,
    first_char: u8,
    widths: Vec<f64>,
    default_width: f64,
    subset: Option<Mutex<BTreeSet<char>>>,
}

impl StandardFont {
    pub fn new(basefont: impl Into<String>) -> Self {
        Self {
            basefont: basefont.into(),
            first_char: 0,
            widths: Vec::new(),
            default_width: 500.0,
            subset: None,
        }
    }

    /// Use explicit widths starting at `first_char`.
    pub fn with_widths(mut self, first_char: u8, widths: Vec<f64>) -> Self {
        self.first_char = first_char;
        self.widths = widths;
        self
    }

    /// Mark the font as one that will be subset on save.
    pub fn subsetted(mut self) -> Self {
        self.subset = Some(Mutex::new(BTreeSet::new()));
        self
    }

    /// Build from a font dictionary (`/BaseFont`, `/FirstChar`, `/Widths`).
    pub fn from_dict(dict: &PDFDict) -> Self {
        let basefont = dict
            .get("BaseFont")
            .and_then(|n| n.as_name().ok())
            .unwrap_or("unknown");
        let first_char = dict
            .get("FirstChar")
            .and_then(|n| n.as_int().ok())
            .map_or(0, |n| n.clamp(0, 255) as u8);
        let widths = dict
            .get("Widths")
            .and_then(|w| w.as_numbers().ok())
            .unwrap_or_default();
        Self::new(basefont).with_widths(first_char, widths)
    }

    /// Code points added to the subset so far.
    pub fn subset_codepoints(&self) -> Vec<char> {
        self.subset
            .as_ref()
            .and_then(|s| s.lock().ok().map(|set| set.iter().copied().collect()))
            .unwrap_or_default()
    }

    /// Dictionary suitable for a `/Font` resource entry.
    pub fn to_dict(&self) -> PDFDict {
        let mut dict = PDFDict::new();
        dict.insert("Type".into(), PDFObject::name("Font"));
        dict.insert("Subtype".into(), PDFObject::name("Type1"));
        dict.insert("BaseFont".into(), PDFObject::name(self.basefont.as_str()));
        dict.insert("Encoding".into(), PDFObject::name("WinAnsiEncoding"));
        dict
    }
}

impl PDFFont for StandardFont {
    fn fontname(&self) -> &str {
        &self.basefont
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.chars()
            .map(|ch| {
                win_ansi_encode(ch).ok_or_else(|| {
                    PdfError::argument(format!(
                        "U+{:04X} is not available in font {} with WinAnsiEncoding",
                        ch as u32, self.basefont
                    ))
                })
            })
            .collect()
    }

    fn decode(&self, codes: &[u8]) -> String {
        codes.iter().map(|&c| win_ansi_decode(c)).collect()
    }

    fn char_width(&self, code: u8) -> f64 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }

    fn will_be_subset(&self) -> bool {
        self.subset.is_some()
    }

    fn add_to_subset(&self, codepoint: char) {
        if let Some(subset) = &self.subset
            && let Ok(mut set) = subset.lock()
        {
            set.insert(codepoint);
        }
    }
}
