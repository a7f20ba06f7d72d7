//! Core library for the numen arithmetic evaluator.
//! Implements the single-pass expression grammar, the symbol tables and the
//! interactive shell built on top of them.

pub mod config;
pub mod cursor;
pub mod diagnostics;
pub mod environment;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod value;

pub use config::{InterpreterConfig, TrailingInput};
pub use diagnostics::{DiagnosticKind, EvalError, NumenError, SourceSpan};
pub use repl::Repl;
pub use runtime::Interpreter;
pub use value::{format_number, Number, UserFunction};
