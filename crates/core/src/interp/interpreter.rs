//! Content stream interpreter.
//!
//! [`ContentInterpreter`] runs decoded content through an
//! [`OperatorRegistry`], keeping a [`GraphicsStateMachine`] and forwarding
//! drawing side effects to a [`PDFDevice`].
//!
//! Recovery rules:
//! - unknown operators are ignored;
//! - an operator whose operands do not match its contract, or that breaks a
//!   mode rule (nested `BT`, `ET` outside a text object, text showing or
//!   positioning outside one), is skipped with a warning;
//! - `cm`, `q` and `Q` inside a text object are applied with a warning.
//!
//! Operator handlers live in `interp::ops`.

use super::device::{PDFDevice, PathSegment};
use super::registry::OperatorRegistry;
use super::resources::{PDFResources, ResourceLookup};
use crate::diagnostics::{Diagnostics, NullDiagnostics, Warning, WarningKind};
use crate::error::{PdfError, Result};
use crate::filter::{Buffering, DecodeOptions, FilterRegistry, decode_stream};
use crate::model::machine::{GraphicsStateMachine, StateWarning};
use crate::model::objects::PDFStream;
use crate::parser::{ContentParser, ContentToken, Operation};
use crate::utils::{MATRIX_IDENTITY, Matrix};
use serde::Serialize;

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpreterOptions {
    /// Form XObjects nested deeper than this are skipped.
    pub max_xobject_depth: usize,
    /// CTM in effect before the first operator.
    pub initial_ctm: Matrix,
}

impl InterpreterOptions {
    pub const fn with_max_xobject_depth(mut self, depth: usize) -> Self {
        self.max_xobject_depth = depth;
        self
    }

    pub const fn with_initial_ctm(mut self, ctm: Matrix) -> Self {
        self.initial_ctm = ctm;
        self
    }
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_xobject_depth: 12,
            initial_ctm: MATRIX_IDENTITY,
        }
    }
}

/// Outcome of one [`ContentInterpreter::execute`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionSummary {
    /// Operators applied, including those inside form XObjects.
    pub operations: usize,
    /// Operators skipped because of bad operands or a mode violation.
    pub skipped: usize,
    pub warnings: Vec<Warning>,
}

impl ExecutionSummary {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings of one kind.
    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}

/// Executes content stream operators against a device.
pub struct ContentInterpreter<'a, D: PDFDevice> {
    pub(crate) device: &'a mut D,
    resources: &'a dyn ResourceLookup,
    /// `/Resources` of the form XObjects currently being run, innermost last.
    form_resources: Vec<PDFResources>,
    registry: OperatorRegistry<'a, D>,
    pub(crate) filters: FilterRegistry,
    diagnostics: Box<dyn Diagnostics + 'a>,
    pub(crate) options: InterpreterOptions,
    pub(crate) machine: GraphicsStateMachine,
    /// Current path, in device space.
    pub(crate) curpath: Vec<PathSegment>,
    /// Current point, in device space.
    pub(crate) current_point: Option<(f64, f64)>,
    /// Clip requested by `W`/`W*`, applied by the next painting operator.
    pub(crate) pending_clip: Option<bool>,
    /// Form XObject nesting depth.
    pub(crate) depth: usize,
    current_offset: usize,
    summary: ExecutionSummary,
}

impl<'a, D: PDFDevice> ContentInterpreter<'a, D> {
    pub fn new(device: &'a mut D, resources: &'a dyn ResourceLookup) -> Self {
        Self::with_options(device, resources, InterpreterOptions::default())
    }

    pub fn with_options(
        device: &'a mut D,
        resources: &'a dyn ResourceLookup,
        options: InterpreterOptions,
    ) -> Self {
        Self {
            device,
            resources,
            form_resources: Vec::new(),
            registry: OperatorRegistry::standard(),
            filters: FilterRegistry::standard(),
            diagnostics: Box::new(NullDiagnostics),
            machine: GraphicsStateMachine::with_ctm(options.initial_ctm),
            options,
            curpath: Vec::new(),
            current_point: None,
            pending_clip: None,
            depth: 0,
            current_offset: 0,
            summary: ExecutionSummary::default(),
        }
    }

    /// Replace the operator table.
    pub fn with_registry(mut self, registry: OperatorRegistry<'a, D>) -> Self {
        self.registry = registry;
        self
    }

    /// Filters used to decode form XObject content.
    pub fn with_filter_registry(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    /// Warnings are forwarded here as well as collected in the summary.
    pub fn with_diagnostics(mut self, diagnostics: impl Diagnostics + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    pub fn registry_mut(&mut self) -> &mut OperatorRegistry<'a, D> {
        &mut self.registry
    }

    pub const fn machine(&self) -> &GraphicsStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut GraphicsStateMachine {
        &mut self.machine
    }

    pub fn device(&self) -> &D {
        self.device
    }

    pub fn current_path(&self) -> &[PathSegment] {
        &self.curpath
    }

    /// Resources in scope: the innermost form's, else the page's.
    pub(crate) fn lookup(&self) -> &dyn ResourceLookup {
        match self.form_resources.last() {
            Some(resources) => resources,
            None => self.resources,
        }
    }

    pub(crate) fn warn(&mut self, warning: Warning) {
        let warning = match warning.offset {
            Some(_) => warning,
            None => warning.at(self.current_offset),
        };
        self.diagnostics.warn(warning.clone());
        self.summary.warnings.push(warning);
    }

    pub(crate) fn note(&mut self, warning: Option<StateWarning>) {
        if let Some(warning) = warning {
            self.warn(warning.to_warning());
        }
    }

    /// Interpret decoded content bytes.
    ///
    /// Operator failures never abort the run; they are counted and reported
    /// in the returned summary.
    pub fn execute(&mut self, content: &[u8]) -> ExecutionSummary {
        self.run(content);
        if self.machine.in_text_object() {
            self.warn(
                Warning::new(WarningKind::UnclosedTextObject, "content ended inside a text object")
                    .operator("ET"),
            );
        }
        std::mem::take(&mut self.summary)
    }

    /// Decode a content stream through `filters`, then interpret it.
    ///
    /// Fails only when decoding fails.
    pub fn process_stream(
        &mut self,
        stream: &PDFStream,
        filters: &FilterRegistry,
        buffering: Buffering,
    ) -> Result<ExecutionSummary> {
        let decoded = decode_stream(stream, filters, &DecodeOptions::default(), buffering)?;
        let repaired = decoded
            .decode_results()
            .iter()
            .any(|result| result.repaired);
        let content = decoded.read_to_vec()?;
        if repaired {
            self.warn(
                Warning::new(WarningKind::FilterRepair, "content stream was repaired while decoding")
                    .at(0),
            );
        }
        Ok(self.execute(&content))
    }

    pub(crate) fn run(&mut self, content: &[u8]) {
        let mut parser = ContentParser::new(content);
        while let Some(token) = parser.next_token() {
            for warning in parser.take_warnings() {
                self.warn(warning);
            }
            self.current_offset = token.offset();
            match token {
                ContentToken::Operation(op) => self.dispatch(&op),
                ContentToken::InlineImage(image) => {
                    self.device
                        .render_inline_image(&image, self.machine.state());
                    self.summary.operations += 1;
                }
            }
        }
        for warning in parser.take_warnings() {
            self.warn(warning);
        }
    }

    fn dispatch(&mut self, op: &Operation) {
        let Some(entry) = self.registry.get(&op.operator).copied() else {
            return;
        };
        if let Err(msg) = entry.operands.check(&op.operands) {
            self.skip(WarningKind::OperandMismatch, &op.operator, msg);
            return;
        }
        match (entry.handler)(self, &op.operands) {
            Ok(()) => self.summary.operations += 1,
            Err(err) => {
                let kind = match err {
                    PdfError::State(_) => WarningKind::StateViolation,
                    PdfError::KeyError(_) => WarningKind::MissingResource,
                    _ => WarningKind::OperandMismatch,
                };
                self.skip(kind, &op.operator, err.to_string());
            }
        }
    }

    fn skip(&mut self, kind: WarningKind, operator: &str, message: String) {
        self.summary.skipped += 1;
        self.warn(Warning::new(kind, message).operator(operator));
    }

    /// Run a form XObject's content with its own resources, one level deeper.
    pub(crate) fn run_nested(&mut self, content: &[u8], resources: Option<PDFResources>) {
        let pushed = resources.is_some();
        if let Some(resources) = resources {
            self.form_resources.push(resources);
        }
        self.depth += 1;
        let offset = self.current_offset;
        self.run(content);
        self.current_offset = offset;
        self.depth -= 1;
        if pushed {
            self.form_resources.pop();
        }
    }
}

impl<D: PDFDevice> std::fmt::Debug for ContentInterpreter<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentInterpreter")
            .field("machine", &self.machine)
            .field("options", &self.options)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// Interpret `content` against `device` with the standard operator table.
pub fn interpret<D: PDFDevice>(
    content: &[u8],
    device: &mut D,
    resources: &dyn ResourceLookup,
) -> ExecutionSummary {
    ContentInterpreter::new(device, resources).execute(content)
}
