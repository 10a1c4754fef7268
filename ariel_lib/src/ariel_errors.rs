use crate::ast::{AssignOp, PrefixOp};
use crate::value::{ScalarType, TypeTag};
use std::io;
use thiserror::Error;

// LEXER errors: File read errors, unsupported tokens
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("[Line {0}]: '{1}' is not a valid token")]
    InvalidTokenError(usize, String),

    #[error("[Line {0}]: unterminated {1} literal")]
    UnterminatedLiteral(usize, String),

    #[error("Error while trying to read file")]
    IoError(#[from] io::Error),
}

// PARSER errors: syntactic errors
#[derive(Debug, Error)]
pub enum ParserError {
    // All <anyhow::Error> are cast to ParseError to catch the context chain
    #[error("{0}")]
    ParseError(String),

    #[error("Unexpected ending while parsing program.")]
    UnexpectedEnding,

    #[error("[Line {0}]: expected {1}, received '{2}'.")]
    UnexpectedToken(usize, String, String),

    #[error("[Line {0}]: '{1}' cannot be assigned to.")]
    InvalidAssignmentTarget(usize, String),

    #[error("[Line {0}]: '{1}' is not a valid literal.")]
    InvalidLiteral(usize, String),
}

// Error propogation
impl From<anyhow::Error> for ParserError {
    fn from(error: anyhow::Error) -> Self {
        ParserError::ParseError(format!("{:?}", error))
    }
}

// RUNTIME errors: semantic errors raised while evaluating a program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("{0} already declared")]
    DuplicateDeclaration(String),

    #[error("mismatched types: {0}")]
    TypeMismatch(String),

    #[error("invalid declaration type: {0} {1}")]
    UnknownType(String, String),

    #[error("improper {0} condition type: {1}")]
    NonBooleanCondition(&'static str, TypeTag),

    #[error("illegal operation: {0}{1}")]
    IllegalOperation(PrefixOp, TypeTag),

    #[error("illegal operator: {0} {1} {2}")]
    IllegalOperator(TypeTag, String, TypeTag),

    #[error("illegal assignment: {0} {1} {2}")]
    IllegalAssignment(TypeTag, AssignOp, TypeTag),

    #[error("divide by zero error")]
    DivideByZero,

    #[error("array index out of bounds: {0}[{1}]")]
    IndexOutOfBounds(String, i64),

    #[error("illegal array index: {0}")]
    IllegalIndex(TypeTag),

    #[error("{0} is not an array")]
    NotAnArray(String),

    #[error("heterogeneous array typings: {0}")]
    HeterogeneousArray(String),

    #[error("illegal type in {0} array: {1}")]
    IllegalElementType(ScalarType, TypeTag),

    #[error("array size must be a non-negative integer: {0}")]
    InvalidArraySize(String),

    #[error("{0} is not a declared or built-in function")]
    NotCallable(String),

    #[error("too many arguments supplied to {0}()")]
    TooManyArguments(String),

    #[error("not enough arguments supplied to {0}()")]
    NotEnoughArguments(String),

    #[error("mismatched types for argument {0}")]
    MismatchedArgumentType(usize),

    #[error("passed non-array as array parameter")]
    NonArrayPassedAsArray,

    #[error("identifier {0} undeclared")]
    UndeclaredIdentifier(String),

    #[error("{0} does not produce a value")]
    VoidValue(String),

    #[error("call depth limit of {1} exceeded in {0}()")]
    CallDepthExceeded(String, usize),

    #[error("failed to write output: {0}")]
    Output(String),
}

impl From<io::Error> for RuntimeError {
    fn from(error: io::Error) -> Self {
        RuntimeError::Output(error.to_string())
    }
}

// Failures of the whole lex-parse-evaluate pipeline
#[derive(Debug, Error)]
pub enum ArielError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Parser(#[from] ParserError),
}
