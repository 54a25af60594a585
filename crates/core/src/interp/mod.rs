//! Content stream interpretation and device output.
//!
//! This module contains:
//! - `interpreter`: the dispatch loop and execution summary
//! - `registry`: the data-driven operator table
//! - `ops`: operator implementations by category
//! - `device`: output device trait and reference devices
//! - `resources`: named resource allocation and lookup

pub mod device;
pub mod interpreter;
pub mod ops;
pub mod registry;
pub mod resources;

pub use device::{
    DeviceEvent, NullDevice, PDFDevice, PDFTextSeq, PDFTextSeqItem, PathSegment, RecordingDevice,
};
pub use interpreter::{ContentInterpreter, ExecutionSummary, InterpreterOptions, interpret};
pub use registry::{OperandKind, OperandSpec, OperatorEntry, OperatorHandler, OperatorRegistry};
pub use resources::{PDFResources, ResourceAllocator, ResourceKind, ResourceLookup};
