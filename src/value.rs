use std::{fmt, rc::Rc, str::FromStr};

use crate::{
    cursor::{is_alpha, is_name_char},
    diagnostics::NumenError,
};

/// The single numeric type used for literals, variables, arguments and results.
pub type Number = f64;

/// A function registered through `Interpreter::define_function`.
///
/// The body is kept as raw text and re-parsed on every call, so a syntax
/// error in it only surfaces once the function is invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<str>,
}

impl UserFunction {
    pub fn new(name: impl Into<String>, params: Vec<String>, body: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            params,
            body: body.into(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = {}", self.name, self.params.join(", "), self.body)
    }
}

/// Parses the shell form `name(a, b) = body`.
impl FromStr for UserFunction {
    type Err = NumenError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| NumenError::Definition(format!("{reason} in `{text}`"));
        let (head, body) = text.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let (name, params) = head
            .trim()
            .split_once('(')
            .ok_or_else(|| invalid("missing '(' after the function name"))?;
        let params = params
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing ')' after the parameter list"))?;

        let name = name.trim();
        if !is_name(name) {
            return Err(invalid("function names must be letters and underscores"));
        }
        let params = if params.trim().is_empty() {
            Vec::new()
        } else {
            params
                .split(',')
                .map(|param| {
                    let param = param.trim();
                    if is_name(param) {
                        Ok(param.to_string())
                    } else {
                        Err(invalid("parameter names must be letters and underscores"))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?
        };
        let body = body.trim();
        if body.is_empty() {
            return Err(invalid("empty body"));
        }
        Ok(Self::new(name, params, body))
    }
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_alpha) && chars.all(is_name_char)
}

/// Renders a result the way the shell prints it: `5` rather than `5.0`,
/// `inf`, `-inf` and `NaN` for the non-finite cases.
pub fn format_number(value: Number) -> String {
    if value.is_nan() {
        "NaN".into()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "inf".into()
        } else {
            "-inf".into()
        }
    } else if value == 0.0 {
        // -0 prints as 0
        "0".into()
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-1024.0), "-1024");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn fractional_and_non_finite_values() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn user_function_displays_as_definition() {
        let function = UserFunction::new("hyp", vec!["a".into(), "b".into()], "a*a+b*b");
        assert_eq!(function.to_string(), "hyp(a, b) = a*a+b*b");
        assert_eq!(function.arity(), 2);
    }

    #[test]
    fn parses_shell_definitions() {
        let function: UserFunction = "sumsq( a , b ) = a*a + b*b".parse().unwrap();
        assert_eq!(function.name, "sumsq");
        assert_eq!(function.params, ["a", "b"]);
        assert_eq!(&*function.body, "a*a + b*b");

        let constant: UserFunction = "answer() = 42".parse().unwrap();
        assert_eq!(constant.arity(), 0);
    }

    #[test]
    fn rejects_malformed_definitions() {
        for text in ["square x = x*x", "square(x) x*x", "sq2(x) = x", "f(x1) = 1", "f(_x) = 1", "f(x) =  "] {
            assert!(
                matches!(text.parse::<UserFunction>(), Err(NumenError::Definition(_))),
                "`{text}` should be rejected"
            );
        }
    }
}
