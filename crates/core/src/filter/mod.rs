//! Chained filter decoding.
//!
//! [`decode`] runs raw stream bytes through an ordered list of named filters.
//! Each stage writes into either an in-memory buffer or an anonymous
//! temporary file, selected by [`Buffering`]. Both produce the same bytes.
//!
//! The result is a [`DecodedStream`]: a readable handle that owns the final
//! stage buffer and the per-filter [`DecodeResult`]s. Dropping or closing it
//! releases the buffer; a failing stage drops everything built so far.

mod standard;

pub use standard::{
    ASCII85Filter, ASCIIHexFilter, FlateFilter, LZWFilter, RunLengthFilter,
};

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject, PDFStream};
use bytes::Bytes;
use rustc_hash::FxHashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// Options shared by every filter in a chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail instead of attempting slow recovery of damaged data.
    pub skip_expensive_repair: bool,
}

impl DecodeOptions {
    pub fn skip_expensive_repair(mut self, skip: bool) -> Self {
        self.skip_expensive_repair = skip;
        self
    }
}

/// Where intermediate and final stage output is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Buffering {
    #[default]
    InMemory,
    /// Anonymous temporary files, removed by the OS once dropped.
    Spooled,
}

/// Side results of one filter application.
///
/// `DecodeResult::default()` is the sentinel for "no filter ran".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeResult {
    /// Effective parameters, possibly corrected by the filter.
    pub parameters: PDFDict,
    /// Color space inferred from the encoded data, for image filters.
    pub color_space: Option<PDFObject>,
    /// Bits per component inferred from the encoded data.
    pub bits_per_component: Option<i64>,
    /// The filter recovered from damaged input.
    pub repaired: bool,
}

impl DecodeResult {
    pub fn with_parameters(parameters: &PDFDict) -> Self {
        Self {
            parameters: parameters.clone(),
            ..Self::default()
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A named stream filter.
pub trait Filter: Send + Sync {
    /// Decode everything from `input` into `output`.
    ///
    /// `index` is the filter's position in the chain.
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &PDFDict,
        index: usize,
        options: &DecodeOptions,
    ) -> Result<DecodeResult>;
}

/// Maps filter names (and their abbreviations) to implementations.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    filters: FxHashMap<String, Arc<dyn Filter>>,
    aliases: FxHashMap<String, String>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the standard text-safe and general-purpose filters.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register("ASCIIHexDecode", ASCIIHexFilter);
        registry.register("ASCII85Decode", ASCII85Filter);
        registry.register("LZWDecode", LZWFilter);
        registry.register("FlateDecode", FlateFilter);
        registry.register("RunLengthDecode", RunLengthFilter);
        for (short, long) in [
            ("AHx", "ASCIIHexDecode"),
            ("A85", "ASCII85Decode"),
            ("LZW", "LZWDecode"),
            ("Fl", "FlateDecode"),
            ("RL", "RunLengthDecode"),
        ] {
            registry.alias(short, long);
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, filter: impl Filter + 'static) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    pub fn alias(&mut self, short: impl Into<String>, name: impl Into<String>) {
        self.aliases.insert(short.into(), name.into());
    }

    /// Look up a filter by full name or abbreviation.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Filter>> {
        let name = self.aliases.get(name).map_or(name, String::as_str);
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.filters.keys().collect();
        names.sort();
        f.debug_struct("FilterRegistry").field("filters", &names).finish()
    }
}

/// Parameters for filter `index`: the same dictionary for every filter, or
/// the matching entry of a parallel array. Missing or null entries are empty.
pub fn params_for(params: Option<&PDFObject>, index: usize) -> PDFDict {
    match params {
        Some(PDFObject::Dict(dict)) => dict.clone(),
        Some(PDFObject::Array(items)) => items
            .get(index)
            .and_then(|p| p.as_dict().ok())
            .cloned()
            .unwrap_or_default(),
        _ => PDFDict::new(),
    }
}

enum StageBuffer {
    Memory(Cursor<Bytes>),
    Spooled(BufReader<File>),
}

impl StageBuffer {
    fn reader(&mut self) -> &mut dyn Read {
        match self {
            Self::Memory(cursor) => cursor,
            Self::Spooled(file) => file,
        }
    }
}

enum StageSink {
    Memory(Vec<u8>),
    Spooled(BufWriter<File>),
}

impl StageSink {
    fn new(buffering: Buffering, size_hint: usize) -> Result<Self> {
        Ok(match buffering {
            Buffering::InMemory => Self::Memory(Vec::with_capacity(size_hint)),
            Buffering::Spooled => Self::Spooled(BufWriter::new(tempfile::tempfile()?)),
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Memory(buf) => buf,
            Self::Spooled(file) => file,
        }
    }

    fn finish(self) -> Result<StageBuffer> {
        Ok(match self {
            Self::Memory(buf) => StageBuffer::Memory(Cursor::new(Bytes::from(buf))),
            Self::Spooled(writer) => {
                let mut file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
                file.seek(SeekFrom::Start(0))?;
                StageBuffer::Spooled(BufReader::new(file))
            }
        })
    }
}

/// Decoded bytes plus the side results of every filter.
///
/// Reading after [`DecodedStream::close`] yields end of input.
pub struct DecodedStream {
    buffer: Option<StageBuffer>,
    results: Vec<DecodeResult>,
}

impl DecodedStream {
    /// Side results in filter order. Empty when no filter ran.
    pub fn decode_results(&self) -> &[DecodeResult] {
        &self.results
    }

    /// Result of the last filter, or the default sentinel.
    pub fn decode_result(&self) -> DecodeResult {
        self.results.last().cloned().unwrap_or_default()
    }

    /// Whether the decoded bytes live in a temporary file.
    pub fn is_spooled(&self) -> bool {
        matches!(self.buffer, Some(StageBuffer::Spooled(_)))
    }

    /// Release the backing buffer.
    pub fn close(&mut self) {
        self.buffer = None;
    }

    pub fn read_to_vec(mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        self.close();
        Ok(out)
    }
}

impl Read for DecodedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.buffer {
            Some(buffer) => buffer.reader().read(buf),
            None => Ok(0),
        }
    }
}

impl std::fmt::Debug for DecodedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedStream")
            .field("spooled", &self.is_spooled())
            .field("closed", &self.buffer.is_none())
            .field("results", &self.results)
            .finish()
    }
}

/// Apply `filters` in order to `raw`.
///
/// An empty chain returns the input unchanged with no results. A failing or
/// unknown filter aborts with [`PdfError::Filter`] naming its index.
pub fn decode(
    raw: impl Into<Bytes>,
    filters: &[String],
    params: Option<&PDFObject>,
    registry: &FilterRegistry,
    options: &DecodeOptions,
    buffering: Buffering,
) -> Result<DecodedStream> {
    let raw = raw.into();
    let mut size_hint = raw.len();
    let mut current = StageBuffer::Memory(Cursor::new(raw));
    let mut results = Vec::with_capacity(filters.len());

    for (index, name) in filters.iter().enumerate() {
        let filter = registry.get(name).ok_or_else(|| PdfError::Filter {
            index,
            name: name.clone(),
            message: "unknown filter".into(),
        })?;
        let stage_params = params_for(params, index);
        let mut sink = StageSink::new(buffering, size_hint)?;
        let result = filter
            .decode(current.reader(), sink.writer(), &stage_params, index, options)
            .and_then(|result| {
                sink.writer().flush()?;
                Ok(result)
            })
            .map_err(|err| PdfError::Filter {
                index,
                name: name.clone(),
                message: err.to_string(),
            })?;
        if let StageSink::Memory(buf) = &sink {
            size_hint = buf.len();
        }
        current = sink.finish()?;
        results.push(result);
    }

    Ok(DecodedStream {
        buffer: Some(current),
        results,
    })
}

/// Decode a stream object using its `/Filter` and `/DecodeParms` entries.
pub fn decode_stream(
    stream: &PDFStream,
    registry: &FilterRegistry,
    options: &DecodeOptions,
    buffering: Buffering,
) -> Result<DecodedStream> {
    let filters = stream.filters()?;
    decode(
        stream.rawdata_bytes(),
        &filters,
        stream.decode_parms(),
        registry,
        options,
        buffering,
    )
}
