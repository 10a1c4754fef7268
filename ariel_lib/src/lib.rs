//! Lexer, parser and tree-walking evaluator for the Ariel language.
//!
//! A program flows through [`lexer::tokenize`], [`parser::parse`] and
//! [`interpreter::Interpreter::run`]. [`run_source`] chains the three for
//! callers holding source text.

pub mod ariel_errors;
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod operators;
pub mod parser;
mod stack;
pub mod value;

use ariel_errors::ArielError;
use environment::Environment;
use interpreter::Interpreter;
use tracing::debug;
use value::Value;

/// Tokenizes, parses and evaluates `source` against `env`.
///
/// Lexing and parsing failures are returned as errors. Runtime failures are
/// part of the program's result and come back as `Some(Value::Error(_))`.
pub fn run_source(
    source: &str,
    env: &mut Environment,
    interpreter: &mut Interpreter<'_>,
) -> Result<Option<Value>, ArielError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    debug!(statements = program.statements.len(), "parsed program");
    Ok(interpreter.run(&program, env))
}
