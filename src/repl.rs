use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::debug;

use crate::{
    diagnostics::{NumenError, Result},
    runtime::Interpreter,
    stdlib::Builtin,
    value::{format_number, Number, UserFunction},
};

pub const DEFAULT_PROMPT: &str = "Enter expression: ";

const HELP: &str = "\
Enter an expression such as `2 + 3 * 4` or `max(3, 7)`.
  var name = expr        store a global variable
  :def f(a, b) = body    define a function
  :vars                  list variables
  :funcs                 list user functions
  :quit                  leave (an empty line does too)";

/// What the shell should do after one line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Exit,
    Value(Number),
    Message(String),
    Error(String),
}

pub struct Repl {
    interpreter: Interpreter,
    prompt: String,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self {
            interpreter,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor =
            DefaultEditor::new().map_err(|err| NumenError::Readline(err.to_string()))?;
        loop {
            let line = match editor.readline(&self.prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(NumenError::Readline(err.to_string())),
            };
            match self.respond(&line) {
                Reply::Exit => break,
                Reply::Value(value) => println!("Result: {}", format_number(value)),
                Reply::Message(message) => println!("{message}"),
                Reply::Error(message) => eprintln!("Error: {message}"),
            }
            editor.add_history_entry(line.trim()).ok();
        }
        Ok(())
    }

    /// Handles one line. Evaluation errors never end the session.
    pub fn respond(&mut self, line: &str) -> Reply {
        let trimmed = line.trim();
        // A blank line, whitespace included, ends the session.
        if trimmed.is_empty() {
            return Reply::Exit;
        }
        if let Some(command) = trimmed.strip_prefix(':') {
            return self.command(command);
        }
        match self.interpreter.evaluate(trimmed) {
            Ok(value) => Reply::Value(value),
            Err(err) => Reply::Error(err.to_string()),
        }
    }

    fn command(&mut self, command: &str) -> Reply {
        let (name, rest) = command
            .split_once(char::is_whitespace)
            .unwrap_or((command, ""));
        debug!(command = name, "shell command");
        match name {
            "quit" | "exit" => Reply::Exit,
            "help" => {
                let builtins: Vec<&str> = Builtin::names().collect();
                Reply::Message(format!("{HELP}\nbuilt-in functions: {}", builtins.join(", ")))
            }
            "def" => match rest.parse::<UserFunction>() {
                Ok(function) => {
                    let message = format!("defined {function}");
                    self.interpreter.define(function);
                    Reply::Message(message)
                }
                Err(err) => Reply::Error(err.to_string()),
            },
            "vars" => {
                let lines: Vec<String> = self
                    .interpreter
                    .variables()
                    .map(|(name, value)| format!("{name} = {}", format_number(value)))
                    .collect();
                listing(lines, "no variables defined")
            }
            "funcs" => {
                let lines: Vec<String> = self
                    .interpreter
                    .functions()
                    .map(ToString::to_string)
                    .collect();
                listing(lines, "no functions defined")
            }
            other => Reply::Error(format!("unknown command `:{other}` (try :help)")),
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn listing(lines: Vec<String>, empty: &str) -> Reply {
    if lines.is_empty() {
        Reply::Message(empty.to_string())
    } else {
        Reply::Message(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_ends_the_session() {
        let mut repl = Repl::new();
        assert_eq!(repl.respond(""), Reply::Exit);
        assert_eq!(repl.respond("   "), Reply::Exit);
        assert_eq!(repl.respond(":quit"), Reply::Exit);
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let mut repl = Repl::new();
        assert!(matches!(repl.respond("(2+3"), Reply::Error(_)));
        assert_eq!(repl.respond("2+3"), Reply::Value(5.0));
    }

    #[test]
    fn def_command_registers_a_function() {
        let mut repl = Repl::new();
        assert_eq!(
            repl.respond(":def square(x) = x*x"),
            Reply::Message("defined square(x) = x*x".into())
        );
        assert_eq!(repl.respond("square(4)"), Reply::Value(16.0));
        assert_eq!(
            repl.respond(":funcs"),
            Reply::Message("square(x) = x*x".into())
        );
        assert!(matches!(repl.respond(":def square = 1"), Reply::Error(_)));
    }

    #[test]
    fn vars_lists_globals_in_definition_order() {
        let mut repl = Repl::new();
        assert_eq!(
            repl.respond(":vars"),
            Reply::Message("no variables defined".into())
        );
        repl.respond("var b = 2");
        repl.respond("var a = 0.5");
        assert_eq!(repl.respond(":vars"), Reply::Message("b = 2\na = 0.5".into()));
        assert!(matches!(repl.respond(":bogus"), Reply::Error(_)));
    }

    #[test]
    fn help_lists_builtins() {
        let mut repl = Repl::new();
        match repl.respond(":help") {
            Reply::Message(text) => assert!(text.contains("add, sub, mul, div, pow, abs, max, min")),
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
