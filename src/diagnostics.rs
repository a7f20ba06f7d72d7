use std::fmt;

use thiserror::Error;

/// Represents a byte span within the text being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Classification of an evaluation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    UnknownFunction,
    Arity,
    Resource,
}

/// Failure of a single `evaluate` call. Always terminal for that call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{message} (at {span})")]
    Syntax { message: String, span: SourceSpan },
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String, span: SourceSpan },
    #[error("function `{name}` expected {expected} arguments but received {received}")]
    Arity {
        name: String,
        expected: usize,
        received: usize,
        span: SourceSpan,
    },
    #[error("call depth limit of {limit} exceeded while calling `{name}`")]
    CallDepthExceeded { name: String, limit: usize },
    #[error("expression nested deeper than {limit} levels (at {span})")]
    NestingTooDeep { limit: usize, span: SourceSpan },
}

impl EvalError {
    pub fn syntax(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::Syntax { .. } => DiagnosticKind::Syntax,
            Self::UnknownFunction { .. } => DiagnosticKind::UnknownFunction,
            Self::Arity { .. } => DiagnosticKind::Arity,
            Self::CallDepthExceeded { .. } | Self::NestingTooDeep { .. } => {
                DiagnosticKind::Resource
            }
        }
    }

    /// Location of the failure in the text that was being parsed, if known.
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::Syntax { span, .. }
            | Self::UnknownFunction { span, .. }
            | Self::Arity { span, .. }
            | Self::NestingTooDeep { span, .. } => Some(*span),
            Self::CallDepthExceeded { .. } => None,
        }
    }
}

/// Unified error type for the numen library and binary.
#[derive(Debug, Error)]
pub enum NumenError {
    #[error("{0}")]
    Eval(#[from] EvalError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line editor error: {0}")]
    Readline(String),
    #[error("invalid function definition: {0}")]
    Definition(String),
    #[error("{path}:{line}: {source}")]
    Script {
        path: String,
        line: usize,
        source: EvalError,
    },
}

pub type Result<T> = std::result::Result<T, NumenError>;
