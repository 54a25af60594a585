//! Content stream writer.
//!
//! [`ContentStreamWriter`] appends operators to a byte sink while tracking
//! the graphics state. Every call first validates the current mode and its
//! arguments and renders the complete operator text into a local buffer;
//! only then is the buffer written. A call that fails writes nothing.
//!
//! Operator groups live in submodules:
//! - `text` - BT, ET, Tf, Tj, TJ, TL, T*, Td, Tm, Tc, Tw, Tz, Ts, Tr
//! - `path` - m, l, c, v, y, re, h and the painting/clipping operators
//! - `color` - CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//! - `graphics_state` - q, Q, cm, gs, w, J, j, d, M
//! - `xobject` - Do, BI/ID/EI, sh, BMC, BDC, EMC, comments

pub mod format;

mod color;
mod graphics_state;
mod path;
mod text;
mod xobject;

pub use path::WindingRule;
pub use text::{RenderingMode, TextElement};

use crate::diagnostics::{Diagnostics, NullDiagnostics, Warning, WarningKind};
use crate::error::Result;
use crate::font::SubsetRegistry;
use crate::interp::resources::{PDFResources, ResourceAllocator};
use crate::model::machine::{GraphicsStateMachine, StateWarning};
use crate::model::objects::{PDFObject, PDFStream};
use std::io::Write;

/// Output settings for a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// Fraction digits kept when writing real numbers.
    pub max_fraction_digits: usize,
    /// Flate-compress the stream built by [`ContentStreamWriter::into_stream`].
    pub compress: bool,
}

impl WriterOptions {
    /// Settings for page content.
    pub const fn page() -> Self {
        Self {
            max_fraction_digits: 5,
            compress: true,
        }
    }

    /// Settings for form XObject, appearance and pattern content.
    pub const fn form() -> Self {
        Self {
            max_fraction_digits: 4,
            compress: true,
        }
    }

    pub const fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub const fn with_max_fraction_digits(mut self, digits: usize) -> Self {
        self.max_fraction_digits = digits;
        self
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self::page()
    }
}

/// Operator text for one call, rendered before anything reaches the sink.
#[derive(Debug)]
pub(crate) struct Fragment {
    buf: Vec<u8>,
    digits: usize,
}

impl Fragment {
    fn new(digits: usize) -> Self {
        Self {
            buf: Vec::with_capacity(32),
            digits,
        }
    }

    pub(crate) fn number(&mut self, value: f64) -> Result<&mut Self> {
        format::write_number(&mut self.buf, value, self.digits)?;
        self.buf.push(b' ');
        Ok(self)
    }

    pub(crate) fn numbers(&mut self, values: &[f64]) -> Result<&mut Self> {
        for &value in values {
            self.number(value)?;
        }
        Ok(self)
    }

    pub(crate) fn integer(&mut self, value: i64) -> &mut Self {
        self.buf.extend_from_slice(value.to_string().as_bytes());
        self.buf.push(b' ');
        self
    }

    pub(crate) fn name(&mut self, name: &str) -> &mut Self {
        format::write_name(&mut self.buf, name);
        self.buf.push(b' ');
        self
    }

    pub(crate) fn string(&mut self, bytes: &[u8]) -> &mut Self {
        format::write_string(&mut self.buf, bytes);
        self
    }

    /// Any direct object, without a trailing space.
    pub(crate) fn value(&mut self, obj: &PDFObject) -> Result<&mut Self> {
        format::write_object(&mut self.buf, obj, self.digits)?;
        Ok(self)
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub(crate) fn append(&mut self, other: &Self) -> &mut Self {
        self.buf.extend_from_slice(&other.buf);
        self
    }

    pub(crate) fn operator(&mut self, op: &str) -> &mut Self {
        self.buf.extend_from_slice(op.as_bytes());
        self.buf.push(b'\n');
        self
    }
}

/// Writes operators for a single content stream.
///
/// Names for fonts, images, forms, shadings, property lists and graphics
/// state dictionaries are allocated through the [`ResourceAllocator`] the
/// writer was created with.
pub struct ContentStreamWriter<'a, W: Write, R: ResourceAllocator + ?Sized = PDFResources> {
    sink: W,
    resources: &'a mut R,
    subsets: Option<&'a mut dyn SubsetRegistry>,
    diagnostics: Box<dyn Diagnostics + 'a>,
    machine: GraphicsStateMachine,
    options: WriterOptions,
}

impl<'a, W: Write, R: ResourceAllocator + ?Sized> ContentStreamWriter<'a, W, R> {
    pub fn new(sink: W, resources: &'a mut R) -> Self {
        Self::with_options(sink, resources, WriterOptions::default())
    }

    pub fn with_options(sink: W, resources: &'a mut R, options: WriterOptions) -> Self {
        Self {
            sink,
            resources,
            subsets: None,
            diagnostics: Box::new(NullDiagnostics),
            machine: GraphicsStateMachine::new(),
            options,
        }
    }

    /// Fonts that will be subset are registered here when selected.
    pub fn with_subset_registry(mut self, registry: &'a mut dyn SubsetRegistry) -> Self {
        self.subsets = Some(registry);
        self
    }

    /// Sink for soft warnings (transform or save/restore inside a text
    /// object, unclosed text object on close).
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub const fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// State after the operators written so far.
    pub const fn machine(&self) -> &GraphicsStateMachine {
        &self.machine
    }

    pub fn in_text_object(&self) -> bool {
        self.machine.in_text_object()
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub(crate) fn fragment(&self) -> Fragment {
        Fragment::new(self.options.max_fraction_digits)
    }

    pub(crate) fn emit(&mut self, fragment: &Fragment) -> Result<()> {
        self.sink.write_all(&fragment.buf)?;
        Ok(())
    }

    pub(crate) fn note(&mut self, warning: Option<StateWarning>) {
        if let Some(warning) = warning {
            self.diagnostics.warn(warning.to_warning());
        }
    }

    /// Append bytes verbatim. No validation is performed.
    pub fn append_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    /// Flush the sink and hand it back.
    pub fn close(mut self) -> Result<W> {
        if self.machine.in_text_object() {
            self.diagnostics.warn(
                Warning::new(
                    WarningKind::UnclosedTextObject,
                    "end_text was not called, some viewers won't display the text",
                )
                .operator("ET"),
            );
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

impl<R: ResourceAllocator + ?Sized> ContentStreamWriter<'_, Vec<u8>, R> {
    /// Close the writer and wrap the content in a stream, compressed when
    /// [`WriterOptions::compress`] is set.
    pub fn into_stream(self) -> Result<PDFStream> {
        let compress = self.options.compress;
        let content = self.close()?;
        PDFStream::from_content(&content, compress)
    }
}

impl<W: Write, R: ResourceAllocator + ?Sized> std::fmt::Debug for ContentStreamWriter<'_, W, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStreamWriter")
            .field("machine", &self.machine)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
