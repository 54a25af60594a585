//! contentstream - PDF content stream decoding, state tracking and operator codec.
//!
//! The crate is organised bottom-up:
//! - `model`: PDF values, color spaces, graphics state and the state machine
//! - `codec` / `filter`: stream codecs and the chained filter decode pipeline
//! - `parser`: content stream tokenizer
//! - `interp`: data-driven operator interpreter driving a [`PDFDevice`]
//! - `writer`: validating content stream writer
//! - `diagnostics`: structured warnings reported to a caller-supplied sink
//!
//! [`PDFDevice`]: interp::PDFDevice

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod font;
pub mod interp;
pub mod model;
pub mod parser;
pub mod utils;
pub mod writer;

pub use diagnostics::{Diagnostics, NullDiagnostics, TracingDiagnostics, Warning, WarningKind};
pub use error::{PdfError, Result};
pub use filter::{Buffering, DecodeOptions, DecodeResult, DecodedStream, FilterRegistry, decode, decode_stream};
pub use font::{FontsToSubset, PDFFont, StandardFont, SubsetRegistry};
pub use interp::{ContentInterpreter, ExecutionSummary, InterpreterOptions, OperatorRegistry};
pub use model::{PDFColor, PDFColorSpace, PDFDict, PDFObject, PDFStream};
pub use parser::{ContentParser, ContentToken, parse_content};
pub use writer::{ContentStreamWriter, WriterOptions};
