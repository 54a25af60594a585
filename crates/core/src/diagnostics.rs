//! Structured warnings.
//!
//! The library does not log by itself. Recoverable problems are reported to a
//! [`Diagnostics`] sink supplied by the caller; [`TracingDiagnostics`] forwards
//! them to `tracing`.

use serde::Serialize;
use std::fmt;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A lexeme that could not be tokenized was skipped.
    MalformedToken,
    /// Operand count or type did not match the operator; operator skipped.
    OperandMismatch,
    /// Operator not legal in the current mode; operator skipped.
    StateViolation,
    /// Transform or save/restore inside a text object; operator applied.
    InsideTextObject,
    /// `Q` without a matching `q`.
    RestoreWithoutSave,
    /// A named resource could not be found.
    MissingResource,
    /// Form XObject nesting exceeded the configured depth.
    RecursionLimit,
    /// A text object was still open when the content ended.
    UnclosedTextObject,
    /// A filter recovered from damaged input.
    FilterRepair,
    /// A form XObject's content could not be decoded; the form was skipped.
    XObjectDecode,
}

impl WarningKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedToken => "malformed_token",
            Self::OperandMismatch => "operand_mismatch",
            Self::StateViolation => "state_violation",
            Self::InsideTextObject => "inside_text_object",
            Self::RestoreWithoutSave => "restore_without_save",
            Self::MissingResource => "missing_resource",
            Self::RecursionLimit => "recursion_limit",
            Self::UnclosedTextObject => "unclosed_text_object",
            Self::FilterRepair => "filter_repair",
            Self::XObjectDecode => "xobject_decode",
        }
    }
}

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Byte offset in the decoded content, when known.
    pub offset: Option<usize>,
    /// Operator mnemonic involved, when there is one.
    pub operator: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset: None,
            operator: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind.as_str())?;
        if let Some(op) = &self.operator {
            write!(f, " {op}")?;
        }
        if let Some(offset) = self.offset {
            write!(f, " @{offset}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Sink for warnings.
pub trait Diagnostics {
    fn warn(&mut self, warning: Warning);
}

impl Diagnostics for Vec<Warning> {
    fn warn(&mut self, warning: Warning) {
        self.push(warning);
    }
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn warn(&mut self, warning: Warning) {
        (**self).warn(warning);
    }
}

/// Drops every warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn warn(&mut self, _warning: Warning) {}
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&mut self, warning: Warning) {
        tracing::warn!(
            kind = warning.kind.as_str(),
            offset = warning.offset,
            operator = warning.operator.as_deref(),
            "{}",
            warning.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_operator_and_offset() {
        let w = Warning::new(WarningKind::OperandMismatch, "expected 4 operands, got 3")
            .operator("re")
            .at(17);
        assert_eq!(
            w.to_string(),
            "[operand_mismatch] re @17: expected 4 operands, got 3"
        );
    }

    #[test]
    fn mutable_reference_is_a_sink() {
        let mut warnings = Vec::new();
        {
            let mut sink: Box<dyn Diagnostics + '_> = Box::new(&mut warnings);
            sink.warn(Warning::new(WarningKind::MalformedToken, "bad"));
        }
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].offset, None);
    }
}
