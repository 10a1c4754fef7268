//! Abstract syntax tree for Ariel programs.
//!
//! The tree is plain data: the parser builds it and the interpreter walks it.
//! Declared types are kept as the names written in the source so that the
//! interpreter, not the parser, decides whether a type exists.

use std::fmt;

/// Represents prefix (unary) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Not,
    Neg,
    Abs,
    Complement,
}

/// Represents infix (binary) operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    And,
    Or,
}

/// Represents compound assignment operations (`+=`, `<<=`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl AssignOp {
    /// The infix operator this compound assignment applies.
    pub fn base(self) -> InfixOp {
        match self {
            AssignOp::Add => InfixOp::Add,
            AssignOp::Sub => InfixOp::Sub,
            AssignOp::Mul => InfixOp::Mul,
            AssignOp::Div => InfixOp::Div,
            AssignOp::Mod => InfixOp::Mod,
            AssignOp::BitAnd => InfixOp::BitAnd,
            AssignOp::BitOr => InfixOp::BitOr,
            AssignOp::BitXor => InfixOp::BitXor,
            AssignOp::Shl => InfixOp::Shl,
            AssignOp::Shr => InfixOp::Shr,
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            PrefixOp::Not => "!",
            PrefixOp::Neg => "-",
            PrefixOp::Abs => "+",
            PrefixOp::Complement => "~",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOp::Lt => "<",
            InfixOp::Le => "<=",
            InfixOp::Eq => "==",
            InfixOp::Ne => "!=",
            InfixOp::Ge => ">=",
            InfixOp::Gt => ">",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::BitAnd => "&",
            InfixOp::BitOr => "|",
            InfixOp::BitXor => "^",
            InfixOp::Shl => "<<",
            InfixOp::Shr => ">>",
            InfixOp::And => "&&",
            InfixOp::Or => "||",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.base())
    }
}

/// A whole program: the unit handed to the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A function parameter. For array parameters `type_name` names the element
/// type (`intarr xs` is stored as `int` with `array` set).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub type_name: String,
    pub name: String,
    pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
}

/// How a declared variable gets its first value
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    /// `int x = 1;`
    Value(Expression),
    /// `intarr a[10];`
    Size(Expression),
    /// `int x;`
    Zero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub type_name: String,
    pub name: String,
    pub initializer: Initializer,
}

/// Initialisation clause of a `for` loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expression(Expression),
}

/// Represents statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Function declaration
    FuncDecl(FuncDecl),
    /// Variable declaration
    VarDecl(VarDecl),
    /// Braced block with its own scope
    Block(Block),
    /// While loop
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    /// C-style for loop
    For {
        init: ForInit,
        condition: Expression,
        increment: Expression,
        body: Box<Statement>,
    },
    /// If statement with an optional else branch
    IfElse {
        condition: Expression,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },
    /// `return expr;` or a bare `return;`
    Return(Option<Expression>),
    /// Expression evaluated for its value or effect
    Expression(Expression),
}

/// Represents expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Prefix {
        op: PrefixOp,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        op: InfixOp,
        right: Box<Expression>,
    },
    /// `x = value`
    Assign {
        name: String,
        value: Box<Expression>,
    },
    /// `x += value`
    CompoundAssign {
        name: String,
        op: AssignOp,
        value: Box<Expression>,
    },
    Call {
        function: String,
        arguments: Vec<Expression>,
    },
    Identifier(String),
    Char(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// Array literal `{a, b, c}`
    Array(Vec<Expression>),
    /// `a[i]`
    Index {
        name: String,
        index: Box<Expression>,
    },
    /// `a[i] = value`
    AssignIndex {
        name: String,
        index: Box<Expression>,
        value: Box<Expression>,
    },
    /// `a[i] += value`
    CompoundAssignIndex {
        name: String,
        index: Box<Expression>,
        op: AssignOp,
        value: Box<Expression>,
    },
}

impl Expression {
    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Expression::Call { function, .. } => format!("{}()", function),
            Expression::Identifier(name) => name.clone(),
            Expression::Assign { name, .. }
            | Expression::CompoundAssign { name, .. }
            | Expression::AssignIndex { name, .. }
            | Expression::CompoundAssignIndex { name, .. } => {
                format!("assignment to {}", name)
            }
            _ => "expression".to_string(),
        }
    }
}
