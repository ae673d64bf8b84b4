//! The typed error taxonomy (spec §7), collapsed into one kind enum per the
//! "deep inheritance... collapse into one Error kind enum" design note.

use alloc::string::{String, ToString};
use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Type,
    Reference,
    Range,
    Uri,
    Eval,
    Aggregate,
    Suppressed,
    ModuleLinking,
    ModuleEvaluation,
    Interrupted,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Uri => "URIError",
            ErrorKind::Eval => "EvalError",
            ErrorKind::Aggregate => "AggregateError",
            ErrorKind::Suppressed => "SuppressedError",
            ErrorKind::ModuleLinking => "ModuleLinkingError",
            ErrorKind::ModuleEvaluation => "ModuleEvaluationError",
            ErrorKind::Interrupted => "Interrupted",
        }
    }

    /// Reverse of `name()`, for recovering a typed kind from a thrown JS
    /// error object's `name` property (e.g. after catching it at the
    /// `Context::eval` boundary). Anything that isn't one of our own
    /// constructor names — a user's own `Error` subclass, a plain `throw
    /// "oops"` — maps to `Eval`, matching `ErrorKind::Eval`'s role as the
    /// catch-all for "some uncaught value escaped to the embedder".
    pub fn from_name(name: &str) -> ErrorKind {
        match name {
            "SyntaxError" => ErrorKind::Syntax,
            "TypeError" => ErrorKind::Type,
            "ReferenceError" => ErrorKind::Reference,
            "RangeError" => ErrorKind::Range,
            "URIError" => ErrorKind::Uri,
            "EvalError" => ErrorKind::Eval,
            "AggregateError" => ErrorKind::Aggregate,
            "SuppressedError" => ErrorKind::Suppressed,
            "ModuleLinkingError" => ErrorKind::ModuleLinking,
            "ModuleEvaluationError" => ErrorKind::ModuleEvaluation,
            "Interrupted" => ErrorKind::Interrupted,
            _ => ErrorKind::Eval,
        }
    }
}

/// A native-level JS exception: enough to build the corresponding JS error
/// object, plus the source position for diagnostics when one is known.
#[derive(Debug, Clone)]
pub struct JsError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
}

impl JsError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError { kind, message: message.into(), span: None }
    }

    pub fn with_span(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        JsError { kind, message: message.into(), span: Some(span) }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::with_span(ErrorKind::Syntax, message, span)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    /// `name + ": " + message` per spec §7's user-visible formatting rule.
    pub fn display(&self) -> String {
        let mut s = self.kind.name().to_string();
        s.push_str(": ");
        s.push_str(&self.message);
        s
    }
}

impl From<crate::lexer::LexError> for JsError {
    fn from(e: crate::lexer::LexError) -> Self {
        JsError::syntax(e.message, e.span)
    }
}
