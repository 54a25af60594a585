//! Named resources referenced by content operators.
//!
//! The writer allocates fresh names through [`ResourceAllocator`]; the
//! interpreter only reads through [`ResourceLookup`]. [`PDFResources`]
//! implements both over a `/Resources`-style dictionary.

use crate::error::{PdfError, Result};
use crate::font::{PDFFont, StandardFont};
use crate::model::color::{PDFColorSpace, PREDEFINED_COLORSPACE};
use crate::model::objects::{NoResolver, PDFDict, PDFObject, PDFStream, Resolver, resolve_once};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Resource dictionary categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    ColorSpace,
    XObject,
    ExtGState,
    Shading,
    Pattern,
    Properties,
}

impl ResourceKind {
    pub const ALL: [Self; 7] = [
        Self::Font,
        Self::ColorSpace,
        Self::XObject,
        Self::ExtGState,
        Self::Shading,
        Self::Pattern,
        Self::Properties,
    ];

    /// Key of the category in a resource dictionary.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Font => "Font",
            Self::ColorSpace => "ColorSpace",
            Self::XObject => "XObject",
            Self::ExtGState => "ExtGState",
            Self::Shading => "Shading",
            Self::Pattern => "Pattern",
            Self::Properties => "Properties",
        }
    }

    /// Prefix for freshly allocated names.
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Font => "F",
            Self::ColorSpace => "cs",
            Self::XObject => "X",
            Self::ExtGState => "gs",
            Self::Shading => "sh",
            Self::Pattern => "p",
            Self::Properties => "Prop",
        }
    }
}

/// Allocates resource names during a write session.
pub trait ResourceAllocator {
    /// Store `value` under a fresh `<prefix><n>` name, or return the existing
    /// name when an equal value is already stored in the same category.
    fn add_resource(
        &mut self,
        kind: ResourceKind,
        value: PDFObject,
        prefix: Option<&str>,
    ) -> Result<String>;

    /// Register a font and return its name.
    fn add_font(&mut self, font: &Arc<dyn PDFFont>) -> Result<String>;
}

/// Read-only resource resolution during interpretation.
pub trait ResourceLookup {
    fn color_space(&self, name: &str) -> Option<PDFColorSpace>;
    fn font(&self, name: &str) -> Option<Arc<dyn PDFFont>>;
    fn xobject(&self, name: &str) -> Option<&PDFStream>;
    fn ext_gstate(&self, name: &str) -> Option<&PDFDict>;
    fn properties(&self, name: &str) -> Option<&PDFDict>;
    fn has_shading(&self, name: &str) -> bool;
}

/// In-memory resource dictionary.
#[derive(Debug, Default, Clone)]
pub struct PDFResources {
    entries: IndexMap<ResourceKind, PDFDict>,
    fonts: FxHashMap<String, Arc<dyn PDFFont>>,
}

impl PDFResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `/Resources` dictionary whose entries are already direct.
    pub fn from_dict(dict: &PDFDict) -> Self {
        Self::from_dict_with(dict, &NoResolver)
    }

    /// Read a `/Resources` dictionary, resolving one level of indirection for
    /// each category, each entry and each element of array entries.
    pub fn from_dict_with(dict: &PDFDict, resolver: &dyn Resolver) -> Self {
        let mut resources = Self::new();
        for kind in ResourceKind::ALL {
            let Some(category) = dict.get(kind.key()) else {
                continue;
            };
            let PDFObject::Dict(category) = resolve_once(category, resolver) else {
                continue;
            };
            let mut resolved = PDFDict::new();
            for (name, value) in category {
                let value = match resolve_once(&value, resolver) {
                    PDFObject::Array(items) => PDFObject::Array(
                        items.iter().map(|item| resolve_once(item, resolver)).collect(),
                    ),
                    other => other,
                };
                if kind == ResourceKind::Font
                    && let Ok(font_dict) = value.as_dict()
                {
                    resources.fonts.insert(
                        name.clone(),
                        Arc::new(StandardFont::from_dict(font_dict)) as Arc<dyn PDFFont>,
                    );
                }
                resolved.insert(name, value);
            }
            resources.entries.insert(kind, resolved);
        }
        resources
    }

    /// Insert or replace a named entry.
    pub fn insert(&mut self, kind: ResourceKind, name: impl Into<String>, value: PDFObject) {
        self.entries.entry(kind).or_default().insert(name.into(), value);
    }

    /// Insert a font under an explicit name.
    pub fn insert_font(&mut self, name: impl Into<String>, font: Arc<dyn PDFFont>, dict: PDFDict) {
        let name = name.into();
        self.insert(ResourceKind::Font, name.clone(), PDFObject::Dict(dict));
        self.fonts.insert(name, font);
    }

    pub fn get(&self, kind: ResourceKind, name: &str) -> Option<&PDFObject> {
        self.entries.get(&kind).and_then(|d| d.get(name))
    }

    /// Names stored in one category, in insertion order.
    pub fn names(&self, kind: ResourceKind) -> Vec<&str> {
        self.entries
            .get(&kind)
            .map(|d| d.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The `/Resources` dictionary.
    pub fn to_dict(&self) -> PDFDict {
        self.entries
            .iter()
            .filter(|(_, d)| !d.is_empty())
            .map(|(kind, d)| (kind.key().to_string(), PDFObject::Dict(d.clone())))
            .collect()
    }

    fn fresh_name(&self, kind: ResourceKind, prefix: &str) -> String {
        let existing = self.entries.get(&kind);
        let mut n = existing.map_or(0, IndexMap::len) + 1;
        loop {
            let name = format!("{prefix}{n}");
            if !existing.is_some_and(|d| d.contains_key(&name)) {
                return name;
            }
            n += 1;
        }
    }
}

impl ResourceAllocator for PDFResources {
    fn add_resource(
        &mut self,
        kind: ResourceKind,
        value: PDFObject,
        prefix: Option<&str>,
    ) -> Result<String> {
        if let Some(existing) = self
            .entries
            .get(&kind)
            .and_then(|d| d.iter().find(|(_, v)| **v == value))
        {
            return Ok(existing.0.clone());
        }
        let prefix = prefix.unwrap_or(kind.default_prefix());
        if prefix.is_empty() || prefix.contains(|c: char| !c.is_ascii_graphic() || c == '/') {
            return Err(PdfError::argument(format!("invalid resource prefix {prefix:?}")));
        }
        let name = self.fresh_name(kind, prefix);
        self.insert(kind, name.clone(), value);
        Ok(name)
    }

    fn add_font(&mut self, font: &Arc<dyn PDFFont>) -> Result<String> {
        if let Some((name, _)) = self.fonts.iter().find(|(_, f)| Arc::ptr_eq(f, font)) {
            return Ok(name.clone());
        }
        let name = self.fresh_name(ResourceKind::Font, ResourceKind::Font.default_prefix());
        let dict = StandardFont::new(font.fontname()).to_dict();
        self.insert_font(name.clone(), Arc::clone(font), dict);
        Ok(name)
    }
}

impl ResourceLookup for PDFResources {
    fn color_space(&self, name: &str) -> Option<PDFColorSpace> {
        if let Some(cs) = self.get(ResourceKind::ColorSpace, name) {
            return PDFColorSpace::from_object(cs).ok();
        }
        PREDEFINED_COLORSPACE.get(name).cloned()
    }

    fn font(&self, name: &str) -> Option<Arc<dyn PDFFont>> {
        self.fonts.get(name).cloned()
    }

    fn xobject(&self, name: &str) -> Option<&PDFStream> {
        self.get(ResourceKind::XObject, name)
            .and_then(|x| x.as_stream().ok())
    }

    fn ext_gstate(&self, name: &str) -> Option<&PDFDict> {
        self.get(ResourceKind::ExtGState, name)
            .and_then(|x| x.as_dict().ok())
    }

    fn properties(&self, name: &str) -> Option<&PDFDict> {
        self.get(ResourceKind::Properties, name)
            .and_then(|x| x.as_dict().ok())
    }

    fn has_shading(&self, name: &str) -> bool {
        self.get(ResourceKind::Shading, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_and_dedupes_names() {
        let mut res = PDFResources::new();
        let mut gs = PDFDict::new();
        gs.insert("CA".into(), PDFObject::Real(0.5));
        let a = res
            .add_resource(ResourceKind::ExtGState, PDFObject::Dict(gs.clone()), None)
            .unwrap();
        let b = res
            .add_resource(ResourceKind::ExtGState, PDFObject::Dict(gs), None)
            .unwrap();
        assert_eq!(a, "gs1");
        assert_eq!(a, b);
        let c = res
            .add_resource(ResourceKind::ExtGState, PDFObject::Dict(PDFDict::new()), None)
            .unwrap();
        assert_eq!(c, "gs2");
    }

    #[test]
    fn font_registration_by_identity() {
        let mut res = PDFResources::new();
        let font: Arc<dyn PDFFont> = Arc::new(StandardFont::new("Helvetica"));
        let name = res.add_font(&font).unwrap();
        assert_eq!(name, "F1");
        assert_eq!(res.add_font(&font).unwrap(), "F1");
        assert!(res.font("F1").is_some());
        assert!(res.get(ResourceKind::Font, "F1").is_some());
    }

    #[test]
    fn color_space_lookup_falls_back_to_device() {
        let res = PDFResources::new();
        assert_eq!(res.color_space("DeviceRGB"), Some(PDFColorSpace::device_rgb()));
        assert!(res.color_space("CS0").is_none());
    }
}
