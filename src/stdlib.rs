use crate::{
    diagnostics::{EvalError, SourceSpan},
    value::Number,
};

/// Natively implemented arithmetic operations, resolved before user functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Abs,
    Max,
    Min,
}

/// Name table. The capitalised long forms are aliases kept for scripts
/// written against the first version of the calculator.
const TABLE: &[(&str, Builtin)] = &[
    ("add", Builtin::Add),
    ("sub", Builtin::Sub),
    ("mul", Builtin::Mul),
    ("div", Builtin::Div),
    ("pow", Builtin::Pow),
    ("abs", Builtin::Abs),
    ("max", Builtin::Max),
    ("min", Builtin::Min),
    ("Add", Builtin::Add),
    ("Subtract", Builtin::Sub),
    ("Multiply", Builtin::Mul),
    ("Divide", Builtin::Div),
];

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, builtin)| *builtin)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        TABLE.iter().map(|(name, _)| *name)
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Abs => 1,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Pow | Self::Max | Self::Min => 2,
        }
    }

    /// Applies the operation after checking the argument count.
    ///
    /// Floating-point domain issues are not errors: `div(1,0)` is `inf`,
    /// `pow(-1,0.5)` is `NaN`.
    pub fn call(self, name: &str, args: &[Number], span: SourceSpan) -> Result<Number, EvalError> {
        ensure_exact(args, self.arity(), name, span)?;
        let value = match self {
            Self::Add => args[0] + args[1],
            Self::Sub => args[0] - args[1],
            Self::Mul => args[0] * args[1],
            Self::Div => args[0] / args[1],
            Self::Pow => args[0].powf(args[1]),
            Self::Abs => args[0].abs(),
            Self::Max => args[0].max(args[1]),
            Self::Min => args[0].min(args[1]),
        };
        Ok(value)
    }
}

pub(crate) fn ensure_exact(
    args: &[Number],
    expected: usize,
    name: &str,
    span: SourceSpan,
) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            received: args.len(),
            span,
        });
    }
    Ok(())
}
