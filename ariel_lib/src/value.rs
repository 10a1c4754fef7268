//! Runtime values.
//!
//! `Value` is the closed set of things an Ariel expression can evaluate to.
//! Two variants are signals rather than data: `Return` carries a function
//! result outward until a call or program boundary unwraps it, and `Error`
//! is only produced when a failed evaluation is handed back to the driver.

use crate::ariel_errors::RuntimeError;
use crate::ast::{FuncDecl, Param, Statement};
use crate::builtins::Host;
use std::fmt;
use std::rc::Rc;

/// Runtime discriminator of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Error,
    Char,
    Int,
    Float,
    String,
    Bool,
    Array,
    Return,
    FuncDecl,
    BuiltIn,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Error => "error",
            TypeTag::Char => "char",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Bool => "bool",
            TypeTag::Array => "array",
            TypeTag::Return => "return",
            TypeTag::FuncDecl => "funcdecl",
            TypeTag::BuiltIn => "builtin",
        };
        f.write_str(name)
    }
}

/// Types a variable, parameter or array element can be declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    Int,
    Float,
    String,
    Bool,
}

impl ScalarType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(ScalarType::Char),
            "int" => Some(ScalarType::Int),
            "float" => Some(ScalarType::Float),
            "string" => Some(ScalarType::String),
            "bool" => Some(ScalarType::Bool),
            _ => None,
        }
    }

    pub fn tag(self) -> TypeTag {
        match self {
            ScalarType::Char => TypeTag::Char,
            ScalarType::Int => TypeTag::Int,
            ScalarType::Float => TypeTag::Float,
            ScalarType::String => TypeTag::String,
            ScalarType::Bool => TypeTag::Bool,
        }
    }

    /// Value an uninitialised declaration of this type starts with.
    pub fn zero_value(self) -> Value {
        match self {
            ScalarType::Char => Value::Char(String::new()),
            ScalarType::Int => Value::Int(0),
            ScalarType::Float => Value::Float(0.0),
            ScalarType::String => Value::Str(String::new()),
            ScalarType::Bool => Value::Bool(false),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A type name as it may appear in a variable declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl DeclaredType {
    /// Resolves `int`, `intarr`, ... Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.strip_suffix("arr") {
            Some(element) => ScalarType::from_name(element).map(DeclaredType::Array),
            None => ScalarType::from_name(name).map(DeclaredType::Scalar),
        }
    }
}

/// Ordered, owned element sequence. `element_type` is `None` until the array
/// is bound to a typed declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    pub element_type: Option<ScalarType>,
    pub elements: Vec<Value>,
}

impl Array {
    pub fn untyped(elements: Vec<Value>) -> Self {
        Self {
            element_type: None,
            elements,
        }
    }

    /// `size` zero values of `element_type`.
    pub fn zeroed(element_type: ScalarType, size: usize) -> Self {
        Self {
            element_type: Some(element_type),
            elements: vec![element_type.zero_value(); size],
        }
    }

    /// True when every element shares the first element's tag.
    pub fn is_homogeneous(&self) -> bool {
        match self.elements.first() {
            Some(first) => self.elements.iter().all(|e| e.tag() == first.tag()),
            None => true,
        }
    }

    pub fn first_tag(&self) -> Option<TypeTag> {
        self.elements.first().map(Value::tag)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A declared user function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Statement>,
}

impl Function {
    pub fn is_void(&self) -> bool {
        self.return_type == "void"
    }
}

impl From<&FuncDecl> for Function {
    fn from(decl: &FuncDecl) -> Self {
        Self {
            return_type: decl.return_type.clone(),
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.statements.clone(),
        }
    }
}

/// Signature shared by every native callable
pub type NativeFunction = fn(&[Value], &mut Host<'_>) -> Result<Option<Value>, RuntimeError>;

/// A host-provided function reachable by a reserved name
#[derive(Debug, Clone, Copy)]
pub struct BuiltIn {
    pub name: &'static str,
    pub function: NativeFunction,
}

// Builtins are unique by name.
impl PartialEq for BuiltIn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Error(String),
    Char(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Array(Array),
    Return(Box<Value>),
    Function(Rc<Function>),
    BuiltIn(BuiltIn),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Error(_) => TypeTag::Error,
            Value::Char(_) => TypeTag::Char,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Str(_) => TypeTag::String,
            Value::Bool(_) => TypeTag::Bool,
            Value::Array(_) => TypeTag::Array,
            Value::Return(_) => TypeTag::Return,
            Value::Function(_) => TypeTag::FuncDecl,
            Value::BuiltIn(_) => TypeTag::BuiltIn,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl From<RuntimeError> for Value {
    fn from(error: RuntimeError) -> Self {
        Value::Error(format!("error: {}", error))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Error(message) => f.write_str(message),
            Value::Char(text) | Value::Str(text) => f.write_str(text),
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{:.6}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Array(array) => {
                if array.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str(" }")
            }
            Value::Return(wrapped) => write!(f, "{}", wrapped),
            Value::Function(_) => f.write_str("function"),
            Value::BuiltIn(_) => f.write_str("builtin"),
        }
    }
}
