use std::{mem, rc::Rc};

use tracing::{debug, trace};

use crate::{
    config::{InterpreterConfig, TrailingInput},
    cursor::{is_alpha, is_digit, is_name_char, Cursor},
    diagnostics::{EvalError, SourceSpan},
    environment::{Environment, Scope},
    stdlib::{ensure_exact, Builtin},
    value::{Number, UserFunction},
};

/// Parsing state of one text: the top-level line or a function body.
#[derive(Debug)]
struct Frame {
    cursor: Cursor,
    locals: Scope,
}

impl Frame {
    fn new(cursor: Cursor, locals: Scope) -> Self {
        Self { cursor, locals }
    }
}

/// Single-pass recursive-descent evaluator.
///
/// Each grammar level produces a number directly; no syntax tree is built.
/// Calling a user function pushes the caller's frame (cursor and local
/// scope) onto `call_stack`, evaluates the body in a fresh frame and pops
/// the caller back, so bodies may call other user functions freely.
///
/// ```text
/// statement  := "var" WS name "=" expression | expression
/// expression := term (("+" | "-") term)*
/// term       := factor (("*" | "/") factor)*
/// factor     := "-" factor | number | name | call | "(" expression ")"
/// call       := name "(" (expression ("," expression)*)? ")"
/// ```
pub struct Interpreter {
    env: Environment,
    config: InterpreterConfig,
    frame: Frame,
    call_stack: Vec<Frame>,
    nesting: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            env: Environment::new(),
            config,
            frame: Frame::new(Cursor::new(""), Scope::new()),
            call_stack: Vec::new(),
            nesting: 0,
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Evaluates one statement. A `var` statement stores its value as a
    /// global before returning it.
    pub fn evaluate(&mut self, text: &str) -> Result<Number, EvalError> {
        self.call_stack.clear();
        self.nesting = 0;
        self.frame = Frame::new(Cursor::new(text), Scope::new());
        let result = self.statement();
        self.call_stack.clear();
        if let Err(err) = &result {
            debug!(kind = ?err.kind(), error = %err, "evaluation failed");
        }
        result
    }

    /// Registers or replaces a user function. The body is not checked
    /// until the function is called.
    pub fn define_function(
        &mut self,
        name: impl Into<String>,
        params: &[&str],
        body: impl Into<Rc<str>>,
    ) {
        let params = params.iter().map(|param| param.to_string()).collect();
        self.define(UserFunction::new(name, params, body));
    }

    pub fn define(&mut self, function: UserFunction) {
        debug!(%function, "defined function");
        if let Some(previous) = self.env.define_function(function) {
            debug!(function = %previous, "replaced previous definition");
        }
    }

    pub fn variable(&self, name: &str) -> Option<Number> {
        self.env.variable(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, Number)> {
        self.env.variables()
    }

    pub fn functions(&self) -> impl Iterator<Item = &UserFunction> {
        self.env.functions()
    }

    fn cursor(&mut self) -> &mut Cursor {
        &mut self.frame.cursor
    }

    fn statement(&mut self) -> Result<Number, EvalError> {
        self.cursor().skip_whitespace();
        if !self.cursor().consume_keyword("var") {
            let value = self.expression()?;
            self.expect_end(self.config.trailing_input)?;
            return Ok(value);
        }

        let cursor = self.cursor();
        cursor.skip_whitespace();
        let start = cursor.position();
        let Some(name) = cursor.take_name().map(str::to_string) else {
            return Err(EvalError::syntax(
                "expected variable name after 'var'",
                SourceSpan::point(start),
            ));
        };
        cursor.skip_whitespace();
        if !cursor.matches('=') {
            return Err(EvalError::syntax(
                "expected '='",
                SourceSpan::point(cursor.position()),
            ));
        }
        let value = self.expression()?;
        self.expect_end(self.config.trailing_input)?;
        debug!(%name, value, "assigned global variable");
        self.env.define_variable(name, value);
        Ok(value)
    }

    fn expression(&mut self) -> Result<Number, EvalError> {
        let mut result = self.term()?;
        loop {
            self.cursor().skip_whitespace();
            if self.cursor().matches('+') {
                result += self.term()?;
            } else if self.cursor().matches('-') {
                result -= self.term()?;
            } else {
                return Ok(result);
            }
        }
    }

    fn term(&mut self) -> Result<Number, EvalError> {
        let mut result = self.factor()?;
        loop {
            self.cursor().skip_whitespace();
            if self.cursor().matches('*') {
                result *= self.factor()?;
            } else if self.cursor().matches('/') {
                // IEEE 754: x/0 is ±inf, 0/0 is NaN
                result /= self.factor()?;
            } else {
                return Ok(result);
            }
        }
    }

    fn factor(&mut self) -> Result<Number, EvalError> {
        let cursor = self.cursor();
        cursor.skip_whitespace();
        let start = cursor.position();
        match cursor.peek() {
            Some('-') => {
                cursor.advance()?;
                self.nested(start, |this| this.factor().map(|value| -value))
            }
            Some('(') => {
                cursor.advance()?;
                let value = self.nested(start, Self::expression)?;
                let cursor = self.cursor();
                cursor.skip_whitespace();
                if cursor.matches(')') {
                    Ok(value)
                } else {
                    Err(EvalError::syntax(
                        "mismatched parentheses",
                        cursor.span_from(start),
                    ))
                }
            }
            Some(ch) if is_digit(ch) => self.number(),
            Some(ch) if is_alpha(ch) => self.identifier(),
            Some(ch) => Err(EvalError::syntax(
                format!("unexpected character '{ch}'"),
                SourceSpan::new(start, start + ch.len_utf8()),
            )),
            None => Err(EvalError::syntax(
                "unexpected end of input",
                SourceSpan::point(start),
            )),
        }
    }

    fn number(&mut self) -> Result<Number, EvalError> {
        let cursor = self.cursor();
        let start = cursor.position();
        cursor.take_while(is_digit);
        if cursor.matches('.') && cursor.take_while(is_digit).is_empty() {
            return Err(EvalError::syntax(
                "malformed number: expected digits after '.'",
                cursor.span_from(start),
            ));
        }
        let span = cursor.span_from(start);
        let text = &cursor.source()[span.start..span.end];
        text.parse::<Number>()
            .map_err(|err| EvalError::syntax(format!("malformed number `{text}`: {err}"), span))
    }

    /// Resolves a name: local parameter, then global variable, then call.
    fn identifier(&mut self) -> Result<Number, EvalError> {
        let cursor = self.cursor();
        let start = cursor.position();
        let name = cursor.take_while(is_name_char).to_string();
        if let Some(value) = self.frame.locals.get(&name) {
            return Ok(*value);
        }
        if let Some(value) = self.env.variable(&name) {
            return Ok(value);
        }
        self.call(name, start)
    }

    fn call(&mut self, name: String, start: usize) -> Result<Number, EvalError> {
        let cursor = self.cursor();
        cursor.skip_whitespace();
        if !cursor.matches('(') {
            return Err(EvalError::syntax(
                format!("expected '(' after `{name}`: not a variable or a call"),
                cursor.span_from(start),
            ));
        }
        let args = self.nested(start, Self::arguments)?;
        let span = self.cursor().span_from(start);

        if let Some(builtin) = Builtin::lookup(&name) {
            return builtin.call(&name, &args, span);
        }
        match self.env.function(&name) {
            Some(function) => {
                let function = function.clone();
                self.invoke(&function, args, span)
            }
            None => Err(EvalError::UnknownFunction { name, span }),
        }
    }

    /// Parses the argument list after the opening parenthesis, left to right.
    fn arguments(&mut self) -> Result<Vec<Number>, EvalError> {
        let mut args = Vec::new();
        self.cursor().skip_whitespace();
        if self.cursor().matches(')') {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            let cursor = self.cursor();
            cursor.skip_whitespace();
            if cursor.matches(',') {
                continue;
            }
            if cursor.matches(')') {
                return Ok(args);
            }
            let at = cursor.position();
            return Err(match cursor.peek() {
                Some(ch) => EvalError::syntax(
                    format!("expected ',' or ')' in argument list, found '{ch}'"),
                    SourceSpan::new(at, at + ch.len_utf8()),
                ),
                None => EvalError::syntax("mismatched parentheses", SourceSpan::point(at)),
            });
        }
    }

    fn invoke(
        &mut self,
        function: &UserFunction,
        args: Vec<Number>,
        span: SourceSpan,
    ) -> Result<Number, EvalError> {
        ensure_exact(&args, function.arity(), &function.name, span)?;
        let limit = self.config.max_call_depth;
        if self.call_stack.len() >= limit {
            return Err(EvalError::CallDepthExceeded {
                name: function.name.clone(),
                limit,
            });
        }

        let locals: Scope = function.params.iter().cloned().zip(args).collect();
        let callee = Frame::new(Cursor::new(Rc::clone(&function.body)), locals);
        let caller = mem::replace(&mut self.frame, callee);
        self.call_stack.push(caller);
        trace!(function = %function.name, depth = self.call_stack.len(), "push frame");

        let result = self
            .expression()
            .and_then(|value| self.expect_end(TrailingInput::Reject).map(|()| value));

        if let Some(caller) = self.call_stack.pop() {
            self.frame = caller;
        }
        trace!(function = %function.name, depth = self.call_stack.len(), "pop frame");
        result
    }

    /// Runs `parse` one nesting level deeper. Unary minus, parentheses and
    /// argument lists recurse on the native stack, so their depth is capped
    /// like user-function frames are.
    fn nested<T>(
        &mut self,
        start: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        let limit = self.config.max_nesting_depth;
        if self.nesting >= limit {
            return Err(EvalError::NestingTooDeep {
                limit,
                span: SourceSpan::point(start),
            });
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn expect_end(&mut self, policy: TrailingInput) -> Result<(), EvalError> {
        let cursor = self.cursor();
        cursor.skip_whitespace();
        let at = cursor.position();
        match (policy, cursor.peek()) {
            (TrailingInput::Reject, Some(')')) => Err(EvalError::syntax(
                "mismatched parentheses",
                SourceSpan::new(at, at + 1),
            )),
            (TrailingInput::Reject, Some(ch)) => Err(EvalError::syntax(
                format!("unexpected trailing input starting at '{ch}'"),
                SourceSpan::new(at, cursor.source().len()),
            )),
            _ => Ok(()),
        }
    }
}
