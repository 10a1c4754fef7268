use crate::ariel_errors::ParserError;
use crate::ast::{
    AssignOp, Block, Expression, ForInit, FuncDecl, InfixOp, Initializer, Param, PrefixOp, Program,
    Statement, VarDecl,
};
use crate::lexer::{Token, TokenKind};
use anyhow::{Context, Result};
use std::collections::VecDeque;

const LOGIC_OR: &[(&str, InfixOp)] = &[("||", InfixOp::Or)];
const LOGIC_AND: &[(&str, InfixOp)] = &[("&&", InfixOp::And)];
const BIT_OR: &[(&str, InfixOp)] = &[("|", InfixOp::BitOr)];
const BIT_XOR: &[(&str, InfixOp)] = &[("^", InfixOp::BitXor)];
const BIT_AND: &[(&str, InfixOp)] = &[("&", InfixOp::BitAnd)];
const EQUALITY: &[(&str, InfixOp)] = &[("==", InfixOp::Eq), ("!=", InfixOp::Ne)];
const COMPARISON: &[(&str, InfixOp)] = &[
    ("<", InfixOp::Lt),
    ("<=", InfixOp::Le),
    (">", InfixOp::Gt),
    (">=", InfixOp::Ge),
];
const SHIFT: &[(&str, InfixOp)] = &[("<<", InfixOp::Shl), (">>", InfixOp::Shr)];
const TERM: &[(&str, InfixOp)] = &[("+", InfixOp::Add), ("-", InfixOp::Sub)];
const FACTOR: &[(&str, InfixOp)] = &[("*", InfixOp::Mul), ("/", InfixOp::Div), ("%", InfixOp::Mod)];

type Level = fn(&mut Parser) -> Result<Expression, ParserError>;

/// Parses a token stream into a [`Program`].
pub fn parse(tokens: VecDeque<Token>) -> Result<Program, ParserError> {
    Parser::new(tokens).parse()
}

/// Recursive descent parser for Ariel
pub struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    pub fn new(tokens: VecDeque<Token>) -> Self {
        Self { tokens }
    }

    /// Consumes every token, returning the statements in order.
    pub fn parse(&mut self) -> Result<Program, ParserError> {
        let mut statements = Vec::new();
        while !self.tokens.is_empty() {
            statements.push(self.statement()?);
        }
        Ok(Program { statements })
    }

    fn check(&self, symbol: &str) -> bool {
        self.tokens.front().map_or(false, |token| token.is(symbol))
    }

    fn eat(&mut self, symbol: &str) -> bool {
        if self.check(symbol) {
            self.tokens.pop_front();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Result<Token, ParserError> {
        self.tokens.pop_front().ok_or(ParserError::UnexpectedEnding)
    }

    fn expect(&mut self, symbol: &str) -> Result<Token, ParserError> {
        let token = self.advance()?;
        if !token.is(symbol) {
            return Err(ParserError::UnexpectedToken(
                token.line,
                format!("'{}'", symbol),
                token.value,
            ));
        }
        Ok(token)
    }

    fn identifier(&mut self, expected: &str) -> Result<Token, ParserError> {
        let token = self.advance()?;
        if token.kind != TokenKind::Ident {
            return Err(ParserError::UnexpectedToken(
                token.line,
                expected.to_string(),
                token.value,
            ));
        }
        Ok(token)
    }

    // `IDENT IDENT` can only start a declaration.
    fn at_declaration(&self) -> bool {
        matches!(
            (self.tokens.front(), self.tokens.get(1)),
            (Some(first), Some(second)) if first.kind == TokenKind::Ident && second.kind == TokenKind::Ident
        )
    }

    fn statement(&mut self) -> Result<Statement, ParserError> {
        let token = self.tokens.front().ok_or(ParserError::UnexpectedEnding)?;
        let (kind, value, line) = (token.kind, token.value.clone(), token.line);

        match (kind, value.as_str()) {
            (TokenKind::Punct, "{") => Ok(Statement::Block(self.block()?)),
            (TokenKind::Keyword, "while") => self.while_statement(),
            (TokenKind::Keyword, "for") => self.for_statement(),
            (TokenKind::Keyword, "if") => self.if_statement(),
            (TokenKind::Keyword, "return") => self.return_statement(),
            (TokenKind::Ident, _) if self.at_declaration() => self.declaration(),
            _ => {
                let expression = self
                    .expression()
                    .with_context(|| format!("\t[Line {}]: Invalid expression statement", line))?;
                self.expect(";")?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn block(&mut self) -> Result<Block, ParserError> {
        let open = self.expect("{")?;

        let mut statements = Vec::new();
        while !self.check("}") {
            if self.tokens.is_empty() {
                return Err(ParserError::UnexpectedEnding);
            }
            let statement = self.statement().with_context(|| {
                format!("\t[Line {}]: Invalid statement within block", open.line)
            })?;
            statements.push(statement);
        }
        self.expect("}")?;

        Ok(Block { statements })
    }

    // Parenthesised condition shared by `if` and `while`
    fn condition(&mut self, keyword: &Token) -> Result<Expression, ParserError> {
        self.expect("(")?;
        let condition = self.expression().with_context(|| {
            format!(
                "\t[Line {0}]: Invalid {1} statement: Failed to parse the {1} condition",
                keyword.line, keyword.value
            )
        })?;
        self.expect(")")?;
        Ok(condition)
    }

    fn while_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance()?;
        let condition = self.condition(&keyword)?;
        let body = self
            .statement()
            .with_context(|| format!("\t[Line {}]: Invalid while body", keyword.line))?;

        Ok(Statement::While {
            condition,
            body: Box::new(body),
        })
    }

    fn for_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance()?;
        self.expect("(")?;

        let init = if self.at_declaration() {
            ForInit::VarDecl(self.var_decl()?)
        } else {
            ForInit::Expression(self.expression()?)
        };
        self.expect(";")?;
        let condition = self.expression().with_context(|| {
            format!("\t[Line {}]: Invalid for statement: Failed to parse the condition", keyword.line)
        })?;
        self.expect(";")?;
        let increment = self.expression().with_context(|| {
            format!("\t[Line {}]: Invalid for statement: Failed to parse the increment", keyword.line)
        })?;
        self.expect(")")?;

        let body = self
            .statement()
            .with_context(|| format!("\t[Line {}]: Invalid for body", keyword.line))?;

        Ok(Statement::For {
            init,
            condition,
            increment,
            body: Box::new(body),
        })
    }

    fn if_statement(&mut self) -> Result<Statement, ParserError> {
        let keyword = self.advance()?;
        let condition = self.condition(&keyword)?;
        let consequence = self.statement()?;
        let alternative = if self.eat("else") {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Statement::IfElse {
            condition,
            consequence: Box::new(consequence),
            alternative,
        })
    }

    fn return_statement(&mut self) -> Result<Statement, ParserError> {
        self.advance()?;
        if self.eat(";") {
            return Ok(Statement::Return(None));
        }
        let value = self.expression()?;
        self.expect(";")?;
        Ok(Statement::Return(Some(value)))
    }

    fn declaration(&mut self) -> Result<Statement, ParserError> {
        if matches!(self.tokens.get(2), Some(token) if token.is("(")) {
            return self.function().map(Statement::FuncDecl);
        }
        let decl = self.var_decl()?;
        self.expect(";")?;
        Ok(Statement::VarDecl(decl))
    }

    fn var_decl(&mut self) -> Result<VarDecl, ParserError> {
        let type_token = self.identifier("a type name")?;
        let name = self.identifier("a variable name")?;

        let initializer = if self.eat("=") {
            let value = self.expression().with_context(|| {
                format!(
                    "\t[Line {}]: Invalid declaration: Failed to parse the value given to '{}'",
                    name.line, name.value
                )
            })?;
            Initializer::Value(value)
        } else if self.eat("[") {
            let size = self.expression()?;
            self.expect("]")?;
            Initializer::Size(size)
        } else {
            Initializer::Zero
        };

        Ok(VarDecl {
            type_name: type_token.value,
            name: name.value,
            initializer,
        })
    }

    fn function(&mut self) -> Result<FuncDecl, ParserError> {
        let return_type = self.identifier("a return type")?;
        let name = self.identifier("a function name")?;
        self.expect("(")?;

        let mut params = Vec::new();
        if !self.eat(")") {
            loop {
                params.push(self.param()?);
                if self.eat(")") {
                    break;
                }
                self.expect(",")?;
            }
        }

        let body = self.block().with_context(|| {
            format!(
                "\t[Line {}]: Invalid function '{}': Failed to parse its body",
                name.line, name.value
            )
        })?;

        Ok(FuncDecl {
            return_type: return_type.value,
            name: name.value,
            params,
            body,
        })
    }

    fn param(&mut self) -> Result<Param, ParserError> {
        let type_token = self.identifier("a parameter type")?;
        let name = self.identifier("a parameter name")?;

        let (type_name, array) = match type_token.value.strip_suffix("arr") {
            Some(element) if !element.is_empty() => (element.to_string(), true),
            _ => (type_token.value, false),
        };

        Ok(Param {
            type_name,
            name: name.value,
            array,
        })
    }

    pub fn expression(&mut self) -> Result<Expression, ParserError> {
        self.assignment()
    }

    // Right associative; the target is checked after the fact.
    fn assignment(&mut self) -> Result<Expression, ParserError> {
        let target = self.logic_or()?;

        let op = match self.tokens.front() {
            Some(token) if token.kind == TokenKind::Operator => match assign_op(&token.value) {
                Some(op) => op,
                None => return Ok(target),
            },
            _ => return Ok(target),
        };
        let op_token = self.advance()?;
        let value = Box::new(self.assignment()?);

        match (target, op) {
            (Expression::Identifier(name), None) => Ok(Expression::Assign { name, value }),
            (Expression::Identifier(name), Some(op)) => {
                Ok(Expression::CompoundAssign { name, op, value })
            }
            (Expression::Index { name, index }, None) => {
                Ok(Expression::AssignIndex { name, index, value })
            }
            (Expression::Index { name, index }, Some(op)) => Ok(Expression::CompoundAssignIndex {
                name,
                index,
                op,
                value,
            }),
            (other, _) => Err(ParserError::InvalidAssignmentTarget(
                op_token.line,
                other.describe(),
            )),
        }
    }

    // One left-associative precedence level.
    fn binary(&mut self, operators: &[(&str, InfixOp)], next: Level) -> Result<Expression, ParserError> {
        let mut left = next(self)?;

        while let Some(op) = self.infix_operator(operators) {
            let right = next(self)?;
            left = Expression::Infix {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn infix_operator(&mut self, operators: &[(&str, InfixOp)]) -> Option<InfixOp> {
        let token = self.tokens.front()?;
        if token.kind != TokenKind::Operator {
            return None;
        }
        let (_, op) = operators.iter().find(|(symbol, _)| *symbol == token.value)?;
        self.tokens.pop_front();
        Some(*op)
    }

    fn logic_or(&mut self) -> Result<Expression, ParserError> {
        self.binary(LOGIC_OR, Self::logic_and)
    }

    fn logic_and(&mut self) -> Result<Expression, ParserError> {
        self.binary(LOGIC_AND, Self::bit_or)
    }

    fn bit_or(&mut self) -> Result<Expression, ParserError> {
        self.binary(BIT_OR, Self::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expression, ParserError> {
        self.binary(BIT_XOR, Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expression, ParserError> {
        self.binary(BIT_AND, Self::equality)
    }

    fn equality(&mut self) -> Result<Expression, ParserError> {
        self.binary(EQUALITY, Self::comparison)
    }

    fn comparison(&mut self) -> Result<Expression, ParserError> {
        self.binary(COMPARISON, Self::shift)
    }

    fn shift(&mut self) -> Result<Expression, ParserError> {
        self.binary(SHIFT, Self::term)
    }

    fn term(&mut self) -> Result<Expression, ParserError> {
        self.binary(TERM, Self::factor)
    }

    fn factor(&mut self) -> Result<Expression, ParserError> {
        self.binary(FACTOR, Self::unary)
    }

    fn unary(&mut self) -> Result<Expression, ParserError> {
        let op = match self.tokens.front() {
            Some(token) if token.kind == TokenKind::Operator => match token.value.as_str() {
                "!" => Some(PrefixOp::Not),
                "-" => Some(PrefixOp::Neg),
                "+" => Some(PrefixOp::Abs),
                "~" => Some(PrefixOp::Complement),
                _ => None,
            },
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance()?;
                let right = self.unary()?;
                Ok(Expression::Prefix {
                    op,
                    right: Box::new(right),
                })
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> Result<Expression, ParserError> {
        let is_ident = matches!(self.tokens.front(), Some(token) if token.kind == TokenKind::Ident);
        let calls = is_ident && matches!(self.tokens.get(1), Some(token) if token.is("("));
        let indexes = is_ident && matches!(self.tokens.get(1), Some(token) if token.is("["));

        if calls {
            let name = self.advance()?;
            self.advance()?;
            let arguments = self.arguments(")").with_context(|| {
                format!(
                    "\t[Line {}]: Invalid call to '{}': Failed to parse its arguments",
                    name.line, name.value
                )
            })?;
            return Ok(Expression::Call {
                function: name.value,
                arguments,
            });
        }

        if indexes {
            let name = self.advance()?;
            self.advance()?;
            let index = self.expression()?;
            self.expect("]")?;
            return Ok(Expression::Index {
                name: name.value,
                index: Box::new(index),
            });
        }

        self.primary()
    }

    // Comma separated expressions up to `close`, which is consumed.
    fn arguments(&mut self, close: &str) -> Result<Vec<Expression>, ParserError> {
        let mut arguments = Vec::new();
        if self.eat(close) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.expression()?);
            if self.eat(close) {
                return Ok(arguments);
            }
            self.expect(",")?;
        }
    }

    fn primary(&mut self) -> Result<Expression, ParserError> {
        let token = self.advance()?;

        match token.kind {
            TokenKind::Int => token
                .value
                .parse::<i64>()
                .map(Expression::Int)
                .map_err(|_| ParserError::InvalidLiteral(token.line, token.value)),
            TokenKind::Float => token
                .value
                .parse::<f64>()
                .map(Expression::Float)
                .map_err(|_| ParserError::InvalidLiteral(token.line, token.value)),
            TokenKind::Char => Ok(Expression::Char(token.value)),
            TokenKind::Str => Ok(Expression::Str(token.value)),
            TokenKind::Ident => Ok(Expression::Identifier(token.value)),
            TokenKind::Keyword if token.value == "true" => Ok(Expression::Bool(true)),
            TokenKind::Keyword if token.value == "false" => Ok(Expression::Bool(false)),
            TokenKind::Punct if token.value == "(" => {
                let inner = self.expression()?;
                self.expect(")")?;
                Ok(inner)
            }
            TokenKind::Punct if token.value == "{" => Ok(Expression::Array(self.arguments("}")?)),
            _ => Err(ParserError::UnexpectedToken(
                token.line,
                "an expression".to_string(),
                token.value,
            )),
        }
    }
}

// `None` inside `Some` is plain `=`.
fn assign_op(symbol: &str) -> Option<Option<AssignOp>> {
    let op = match symbol {
        "=" => None,
        "+=" => Some(AssignOp::Add),
        "-=" => Some(AssignOp::Sub),
        "*=" => Some(AssignOp::Mul),
        "/=" => Some(AssignOp::Div),
        "%=" => Some(AssignOp::Mod),
        "&=" => Some(AssignOp::BitAnd),
        "|=" => Some(AssignOp::BitOr),
        "^=" => Some(AssignOp::BitXor),
        "<<=" => Some(AssignOp::Shl),
        ">>=" => Some(AssignOp::Shr),
        _ => return None,
    };
    Some(op)
}
