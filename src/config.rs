/// What to do with characters left over after a complete statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingInput {
    /// `2+3)` fails with a syntax error.
    #[default]
    Reject,
    /// `2+3)` evaluates to 5; the rest of the line is dropped.
    Ignore,
}

#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub trailing_input: TrailingInput,
    /// Maximum number of nested user-function frames.
    pub max_call_depth: usize,
    /// Maximum nesting of unary minus, parentheses and argument lists,
    /// counted across all frames of one evaluation.
    pub max_nesting_depth: usize,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            trailing_input: TrailingInput::default(),
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}
