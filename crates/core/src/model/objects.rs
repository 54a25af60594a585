//! PDF value types.
//!
//! The value model is a plain data container. Indirect references are never
//! chased here; callers resolve them through an injected [`Resolver`].

use crate::error::{PdfError, Result};
use bytes::Bytes;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Dictionary with unique keys, preserving insertion order for round trips.
///
/// Equality ignores order.
pub type PDFDict = IndexMap<String, PDFObject>;

/// PDF Object types - the fundamental value type.
#[derive(Debug, Clone, PartialEq)]
pub enum PDFObject {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object without the leading slash
    Name(String),
    /// String (byte array)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (name -> object mapping)
    Dict(PDFDict),
    /// Stream (dictionary + raw payload)
    Stream(Box<PDFStream>),
    /// Indirect object reference
    Ref(PDFObjRef),
}

impl PDFObject {
    /// Shorthand for building a name value.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Real(_))
    }

    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(PdfError::TypeError {
                expected: "bool",
                got: self.type_name(),
            }),
        }
    }

    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "int",
                got: self.type_name(),
            }),
        }
    }

    /// Get numeric value (int or real coerced to f64)
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(PdfError::TypeError {
                expected: "number",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "name",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "string",
                got: self.type_name(),
            }),
        }
    }

    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(PdfError::TypeError {
                expected: "array",
                got: self.type_name(),
            }),
        }
    }

    /// Get as dictionary. A stream yields its attribute dictionary.
    pub fn as_dict(&self) -> Result<&PDFDict> {
        match self {
            Self::Dict(d) => Ok(d),
            Self::Stream(s) => Ok(&s.attrs),
            _ => Err(PdfError::TypeError {
                expected: "dict",
                got: self.type_name(),
            }),
        }
    }

    pub fn as_stream(&self) -> Result<&PDFStream> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "stream",
                got: self.type_name(),
            }),
        }
    }

    pub const fn as_ref(&self) -> Result<&PDFObjRef> {
        match self {
            Self::Ref(r) => Ok(r),
            _ => Err(PdfError::TypeError {
                expected: "ref",
                got: self.type_name(),
            }),
        }
    }

    /// Array of numbers as `f64`s.
    pub fn as_numbers(&self) -> Result<Vec<f64>> {
        self.as_array()?.iter().map(Self::as_num).collect()
    }

    /// Get type name for error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Stream(_) => "stream",
            Self::Ref(_) => "ref",
        }
    }
}

impl From<f64> for PDFObject {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<i64> for PDFObject {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for PDFObject {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<PDFDict> for PDFObject {
    fn from(value: PDFDict) -> Self {
        Self::Dict(value)
    }
}

/// PDF indirect object reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PDFObjRef {
    /// Object number
    pub objid: u32,
    /// Generation number
    pub genno: u32,
}

impl PDFObjRef {
    pub const fn new(objid: u32, genno: u32) -> Self {
        Self { objid, genno }
    }
}

/// Looks up the value behind an indirect reference.
///
/// Owned by the document layer. Implementations decide how (and whether) to
/// guard against reference cycles.
pub trait Resolver {
    fn resolve(&self, objref: &PDFObjRef) -> Option<PDFObject>;
}

impl<F> Resolver for F
where
    F: Fn(&PDFObjRef) -> Option<PDFObject>,
{
    fn resolve(&self, objref: &PDFObjRef) -> Option<PDFObject> {
        self(objref)
    }
}

/// Resolver that knows no objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn resolve(&self, _objref: &PDFObjRef) -> Option<PDFObject> {
        None
    }
}

impl Resolver for HashMap<(u32, u32), PDFObject> {
    fn resolve(&self, objref: &PDFObjRef) -> Option<PDFObject> {
        self.get(&(objref.objid, objref.genno)).cloned()
    }
}

/// Resolve a single level of indirection.
///
/// Non-reference values are returned as-is; a dangling reference becomes
/// `Null`. A reference that resolves to another reference is returned
/// unchanged.
pub fn resolve_once(obj: &PDFObject, resolver: &dyn Resolver) -> PDFObject {
    match obj {
        PDFObject::Ref(objref) => resolver.resolve(objref).unwrap_or(PDFObject::Null),
        other => other.clone(),
    }
}

/// PDF Stream - dictionary attributes + raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFStream {
    /// Stream dictionary attributes
    pub attrs: PDFDict,
    /// Raw (possibly encoded) data
    rawdata: Bytes,
}

impl PDFStream {
    /// Create a stream, recording the payload length in `/Length`.
    pub fn new(mut attrs: PDFDict, rawdata: impl Into<Bytes>) -> Self {
        let rawdata = rawdata.into();
        attrs.insert("Length".into(), PDFObject::Int(rawdata.len() as i64));
        Self { attrs, rawdata }
    }

    /// Create a stream without touching `/Length`, as read from a file.
    pub fn from_parts(attrs: PDFDict, rawdata: impl Into<Bytes>) -> Self {
        Self {
            attrs,
            rawdata: rawdata.into(),
        }
    }

    /// Wrap authored content bytes, Flate-compressing them when asked.
    pub fn from_content(content: &[u8], compress: bool) -> Result<Self> {
        let mut attrs = PDFDict::new();
        if compress {
            attrs.insert("Filter".into(), PDFObject::name("FlateDecode"));
            let encoded = crate::codec::flate::flate_encode(content)?;
            Ok(Self::new(attrs, encoded))
        } else {
            Ok(Self::new(attrs, content.to_vec()))
        }
    }

    pub fn rawdata(&self) -> &[u8] {
        self.rawdata.as_ref()
    }

    pub fn rawdata_bytes(&self) -> Bytes {
        self.rawdata.clone()
    }

    pub fn get(&self, name: &str) -> Option<&PDFObject> {
        self.attrs.get(name)
    }

    /// Get attribute, trying multiple names.
    pub fn get_any(&self, names: &[&str]) -> Option<&PDFObject> {
        names.iter().find_map(|name| self.attrs.get(*name))
    }

    /// Check the declared `/Length` against the payload.
    pub fn validate_length(&self) -> Result<()> {
        let actual = self.rawdata.len();
        match self.attrs.get("Length") {
            Some(PDFObject::Int(declared)) if *declared as usize == actual && *declared >= 0 => {
                Ok(())
            }
            Some(PDFObject::Int(declared)) => Err(PdfError::LengthMismatch {
                declared: *declared,
                actual,
            }),
            Some(other) => Err(PdfError::TypeError {
                expected: "int",
                got: other.type_name(),
            }),
            None => Err(PdfError::KeyError("Length".into())),
        }
    }

    /// Declared filter chain, in application order.
    ///
    /// Only the full `/Filter` key is read; on a stream `/F` names an
    /// external file.
    pub fn filters(&self) -> Result<Vec<String>> {
        filter_names(self.get("Filter"))
    }

    /// Declared per-filter parameters: a dictionary or a parallel array.
    pub fn decode_parms(&self) -> Option<&PDFObject> {
        self.get("DecodeParms")
    }
}

/// Read a `/Filter` value: absent, a single name, or an array of names.
pub fn filter_names(value: Option<&PDFObject>) -> Result<Vec<String>> {
    match value {
        None | Some(PDFObject::Null) => Ok(Vec::new()),
        Some(PDFObject::Name(name)) => Ok(vec![name.clone()]),
        Some(PDFObject::Array(items)) => items
            .iter()
            .map(|item| item.as_name().map(str::to_owned))
            .collect(),
        Some(other) => Err(PdfError::TypeError {
            expected: "name or array",
            got: other.type_name(),
        }),
    }
}
