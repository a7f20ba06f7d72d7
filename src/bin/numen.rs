use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use numen::{
    format_number, Interpreter, InterpreterConfig, NumenError, Repl, TrailingInput, UserFunction,
};

#[derive(Parser)]
#[command(author, version, about = "Interactive arithmetic expression evaluator")]
struct Args {
    /// Ignore characters left over after a complete expression
    #[arg(long, global = true)]
    lenient: bool,

    /// Maximum nesting depth of user-defined function calls
    #[arg(long, global = true, default_value_t = InterpreterConfig::DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Maximum nesting of parentheses, unary minus and argument lists
    #[arg(long, global = true, default_value_t = InterpreterConfig::DEFAULT_MAX_NESTING_DEPTH)]
    max_nesting: usize,

    /// Define a function before evaluating anything, e.g. 'square(x) = x*x'
    #[arg(short = 'D', long = "define", global = true, value_name = "DEFINITION")]
    definitions: Vec<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session (the default)
    Repl {
        /// Prompt printed before each line
        #[arg(long, default_value = numen::repl::DEFAULT_PROMPT)]
        prompt: String,
    },
    /// Evaluate each expression in order and print the results
    Eval {
        #[arg(required = true)]
        expressions: Vec<String>,
    },
    /// Evaluate every non-blank line of a file; lines starting with `#` are skipped
    Run { script: PathBuf },
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Logging is off unless `RUST_LOG` is set, e.g. `RUST_LOG=numen=trace`.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run(args: Args) -> Result<(), NumenError> {
    let config = InterpreterConfig {
        trailing_input: if args.lenient {
            TrailingInput::Ignore
        } else {
            TrailingInput::Reject
        },
        max_call_depth: args.max_depth,
        max_nesting_depth: args.max_nesting,
    };
    let mut interpreter = Interpreter::with_config(config);
    for definition in &args.definitions {
        interpreter.define(definition.parse::<UserFunction>()?);
    }

    match args.command.unwrap_or(Command::Repl {
        prompt: numen::repl::DEFAULT_PROMPT.to_string(),
    }) {
        Command::Repl { prompt } => Repl::with_interpreter(interpreter).prompt(prompt).run(),
        Command::Eval { expressions } => {
            for expression in &expressions {
                let value = interpreter.evaluate(expression)?;
                println!("{}", format_number(value));
            }
            Ok(())
        }
        Command::Run { script } => run_script(&mut interpreter, script),
    }
}

fn run_script(interpreter: &mut Interpreter, path: PathBuf) -> Result<(), NumenError> {
    let source = fs::read_to_string(&path)?;
    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match interpreter.evaluate(line) {
            Ok(value) => println!("{}", format_number(value)),
            Err(source) => {
                return Err(NumenError::Script {
                    path: path.display().to_string(),
                    line: index + 1,
                    source,
                })
            }
        }
    }
    Ok(())
}
