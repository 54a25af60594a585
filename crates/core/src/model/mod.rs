//! Value model and graphics state.
//!
//! - `objects` - PDF values (PDFObject, PDFStream, PDFObjRef, Resolver)
//! - `color` - Color spaces (PDFColorSpace)
//! - `state` - Graphics and text state records (PDFGraphicState, PDFTextState, Color)
//! - `stack` - Auxiliary save/restore stacks (StateStack)
//! - `machine` - The state machine shared by writer and interpreter

pub mod color;
pub mod machine;
pub mod objects;
pub mod stack;
pub mod state;

pub use color::{ColorSpaceFamily, PDFColor, PDFColorSpace};
pub use machine::{FontBinding, GraphicsStateMachine, StateWarning};
pub use objects::{NoResolver, PDFDict, PDFObjRef, PDFObject, PDFStream, Resolver, resolve_once};
pub use stack::StateStack;
pub use state::{ClipPath, Color, PDFGraphicState, PDFTextState};
