//! Lexical analysis for Ariel source text.
//!
//! Each token class is a small `nom` recognizer; [`tokenize`] drives them
//! over the whole input, skipping whitespace and `//` comments and keeping
//! track of line numbers for error messages.

use crate::ariel_errors::LexerError;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, none_of, not_line_ending, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0_count,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

const KEYWORDS: &[&str] = &["if", "else", "while", "for", "return", "true", "false"];

/// Represents the set of token classes in Ariel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Int,
    Float,
    Char,
    Str,
    Operator,
    Punct,
}

/// A single token. For char and string literals `value` holds the decoded
/// text without quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
}

impl Token {
    /// True for an operator, punctuation mark or keyword spelled `symbol`.
    pub fn is(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::Punct | TokenKind::Keyword) && self.value == symbol
    }
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

// Whitespace and comments between tokens
fn trivia(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(alt((multispace1, comment))))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn float(input: &str) -> IResult<&str, &str> {
    recognize(tuple((digit1, char('.'), digit1)))(input)
}

// Longest spellings first
fn operator(input: &str) -> IResult<&str, &str> {
    alt((
        alt((
            tag("<<="),
            tag(">>="),
            tag("+="),
            tag("-="),
            tag("*="),
            tag("/="),
            tag("%="),
            tag("&="),
            tag("^="),
            tag("|="),
        )),
        alt((
            tag("<<"),
            tag(">>"),
            tag("<="),
            tag(">="),
            tag("=="),
            tag("!="),
            tag("&&"),
            tag("||"),
        )),
        recognize(one_of("<>=+-*/%&|^!~")),
    ))(input)
}

fn punctuation(input: &str) -> IResult<&str, &str> {
    recognize(one_of("(){}[],;"))(input)
}

fn escape(input: &str) -> IResult<&str, &str> {
    alt((
        value("\\", char('\\')),
        value("\"", char('"')),
        value("'", char('\'')),
        value("\n", char('n')),
        value("\t", char('t')),
        value("\0", char('0')),
    ))(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(is_not("\\\"\n"), '\\', escape)),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn char_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        alt((
            map(preceded(char('\\'), escape), String::from),
            map(none_of("\\'\n"), String::from),
        )),
        char('\''),
    )(input)
}

fn token(input: &str) -> IResult<&str, (TokenKind, String)> {
    alt((
        map(float, |text| (TokenKind::Float, text.to_string())),
        map(digit1, |text: &str| (TokenKind::Int, text.to_string())),
        map(identifier, |text| {
            let kind = if KEYWORDS.contains(&text) {
                TokenKind::Keyword
            } else {
                TokenKind::Ident
            };
            (kind, text.to_string())
        }),
        map(char_literal, |text| (TokenKind::Char, text)),
        map(string_literal, |text| (TokenKind::Str, text)),
        map(operator, |text| (TokenKind::Operator, text.to_string())),
        map(punctuation, |text| (TokenKind::Punct, text.to_string())),
    ))(input)
}

// Builds the error for input no recognizer accepts.
fn unrecognized(rest: &str, line: usize) -> LexerError {
    match rest.chars().next() {
        Some('"') => LexerError::UnterminatedLiteral(line, "string".to_string()),
        Some('\'') => LexerError::UnterminatedLiteral(line, "char".to_string()),
        _ => {
            let word = rest.split_whitespace().next().unwrap_or(rest);
            LexerError::InvalidTokenError(line, word.to_string())
        }
    }
}

/// Tokenizes Ariel source text.
///
/// # Returns
///
/// A [`VecDeque`] of tokens in source order, or a [`LexerError`] naming the
/// first line that could not be tokenized.
pub fn tokenize(source: &str) -> Result<VecDeque<Token>, LexerError> {
    let mut tokens = VecDeque::new();
    let mut rest = source;
    let mut line = 1;

    loop {
        let (after, skipped) = trivia(rest).map_err(|_| unrecognized(rest, line))?;
        line += skipped.matches('\n').count();
        rest = after;

        if rest.is_empty() {
            break;
        }

        let (after, (kind, value)) = token(rest).map_err(|_| unrecognized(rest, line))?;
        tokens.push_back(Token { kind, value, line });
        rest = after;
    }

    Ok(tokens)
}

/// Tokenizes the contents of the file at `file_path`.
pub fn tokenize_file(file_path: PathBuf) -> Result<VecDeque<Token>, LexerError> {
    let source = fs::read_to_string(file_path)?;
    tokenize(&source)
}
