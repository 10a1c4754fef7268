use crate::ariel_errors::RuntimeError;
use crate::ast::{AssignOp, Expression, ForInit, FuncDecl, Initializer, Param, Program, Statement, VarDecl};
use crate::builtins::{self, Host};
use crate::environment::Environment;
use crate::operators::{eval_compound, eval_infix, eval_prefix};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Array, DeclaredType, Function, ScalarType, Value};
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, trace};

/// Result of evaluating one node. `Ok(None)` is "nothing";
/// `Ok(Some(Value::Return(_)))` is a return signal still travelling outward.
pub type EvalResult = Result<Option<Value>, RuntimeError>;

/// Deepest chain of user function calls allowed at once.
pub const MAX_CALL_DEPTH: usize = 4096;

pub struct Interpreter<'a> {
    host: Host<'a>,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    // Constructor
    pub fn new(output: &'a mut dyn Write) -> Self {
        Self::with_host(Host::new(output))
    }

    pub fn with_host(host: Host<'a>) -> Self {
        Self { host, depth: 0 }
    }

    /// Evaluates `program` against `env` and renders a failure as
    /// [`Value::Error`]. This is what drivers call.
    pub fn run(&mut self, program: &Program, env: &mut Environment) -> Option<Value> {
        match self.evaluate(program, env) {
            Ok(value) => value,
            Err(error) => {
                debug!(%error, "program failed");
                Some(Value::from(error))
            }
        }
    }

    /// Root eval function over a program. A return signal at the top level
    /// ends the program with its wrapped value.
    pub fn evaluate(&mut self, program: &Program, env: &mut Environment) -> EvalResult {
        match self.run_statements(&program.statements, env)? {
            Some(Value::Return(value)) => Ok(Some(*value)),
            other => Ok(other),
        }
    }

    // Runs statements in order, stopping at the first return signal.
    fn run_statements(&mut self, statements: &[Statement], env: &mut Environment) -> EvalResult {
        let mut last = None;
        for statement in statements {
            match self.execute(statement, env)? {
                signal @ Some(Value::Return(_)) => return Ok(signal),
                other => last = other,
            }
        }
        Ok(last)
    }

    pub fn execute(&mut self, statement: &Statement, env: &mut Environment) -> EvalResult {
        match statement {
            Statement::FuncDecl(decl) => self.declare_function(decl, env),
            Statement::VarDecl(decl) => self.declare_variable(decl, env),
            Statement::Block(block) => self.eval_block(&block.statements, env),
            Statement::While { condition, body } => self.eval_while(condition, body, env),
            Statement::For {
                init,
                condition,
                increment,
                body,
            } => self.eval_for(init, condition, increment, body, env),
            Statement::IfElse {
                condition,
                consequence,
                alternative,
            } => {
                if self.condition("if", condition, env)? {
                    self.execute(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.execute(alternative, env)
                } else {
                    Ok(None)
                }
            }
            Statement::Return(Some(expression)) => {
                let value = self.value_of(expression, env)?;
                Ok(Some(Value::Return(Box::new(value))))
            }
            Statement::Return(None) => Ok(None),
            Statement::Expression(expression) => self.eval_expression(expression, env),
        }
    }

    fn declare_function(&mut self, decl: &FuncDecl, env: &mut Environment) -> EvalResult {
        if env.contains(&decl.name) {
            return Err(RuntimeError::DuplicateDeclaration(decl.name.clone()));
        }

        debug!(name = %decl.name, params = decl.params.len(), "declared function");
        env.declare(decl.name.clone(), Value::Function(Rc::new(Function::from(decl))));
        Ok(None)
    }

    fn declare_variable(&mut self, decl: &VarDecl, env: &mut Environment) -> EvalResult {
        if env.contains(&decl.name) {
            return Err(RuntimeError::DuplicateDeclaration(decl.name.clone()));
        }

        let declared = DeclaredType::from_name(&decl.type_name).ok_or_else(|| {
            RuntimeError::UnknownType(decl.type_name.clone(), decl.name.clone())
        })?;

        let value = match (&decl.initializer, declared) {
            (Initializer::Value(expression), DeclaredType::Scalar(scalar)) => {
                let value = self.value_of(expression, env)?;
                if value.tag() != scalar.tag() {
                    return Err(RuntimeError::TypeMismatch(format!(
                        "{} {} = {}",
                        decl.type_name,
                        decl.name,
                        value.tag()
                    )));
                }
                value
            }
            (Initializer::Value(expression), DeclaredType::Array(element)) => {
                let value = self.value_of(expression, env)?;
                Value::Array(typed_array(&decl.name, element, value)?)
            }
            (Initializer::Size(expression), DeclaredType::Array(element)) => {
                let size = self.value_of(expression, env)?;
                Value::Array(Array::zeroed(element, array_size(size)?))
            }
            (Initializer::Size(_), DeclaredType::Scalar(_)) => {
                return Err(RuntimeError::TypeMismatch(format!(
                    "{} {}[] sizes a scalar type",
                    decl.type_name, decl.name
                )));
            }
            (Initializer::Zero, DeclaredType::Scalar(scalar)) => scalar.zero_value(),
            (Initializer::Zero, DeclaredType::Array(_)) => {
                return Err(RuntimeError::InvalidArraySize(format!(
                    "{} {} has no size",
                    decl.type_name, decl.name
                )));
            }
        };

        debug!(name = %decl.name, type_name = %decl.type_name, "declared variable");
        env.declare(decl.name.clone(), value);
        Ok(None)
    }

    fn eval_block(&mut self, statements: &[Statement], env: &mut Environment) -> EvalResult {
        env.push_scope();
        let result = self.run_statements(statements, env);
        leave_scope(env, &result);
        result
    }

    fn eval_while(
        &mut self,
        condition: &Expression,
        body: &Statement,
        env: &mut Environment,
    ) -> EvalResult {
        let mut last = None;
        while self.condition("while", condition, env)? {
            match self.execute(body, env)? {
                Some(Value::Return(value)) => return Ok(Some(*value)),
                other => last = other,
            }
        }
        Ok(last)
    }

    // A return in the body ends the loop and becomes the loop's value; the
    // statements after the loop still run.
    fn eval_for(
        &mut self,
        init: &ForInit,
        condition: &Expression,
        increment: &Expression,
        body: &Statement,
        env: &mut Environment,
    ) -> EvalResult {
        env.push_scope();
        let result = self.run_for(init, condition, increment, body, env);
        leave_scope(env, &result);

        match result? {
            Some(Value::Return(value)) => Ok(Some(*value)),
            other => Ok(other),
        }
    }

    // The whole loop, including its init clause, shares one scope.
    fn run_for(
        &mut self,
        init: &ForInit,
        condition: &Expression,
        increment: &Expression,
        body: &Statement,
        env: &mut Environment,
    ) -> EvalResult {
        match init {
            ForInit::VarDecl(decl) => self.declare_variable(decl, env)?,
            ForInit::Expression(expression) => self.eval_expression(expression, env)?,
        };

        let mut last = None;
        while self.condition("for", condition, env)? {
            match self.execute(body, env)? {
                signal @ Some(Value::Return(_)) => return Ok(signal),
                other => last = other,
            }
            self.eval_expression(increment, env)?;
        }
        Ok(last)
    }

    fn condition(
        &mut self,
        construct: &'static str,
        expression: &Expression,
        env: &mut Environment,
    ) -> Result<bool, RuntimeError> {
        match self.value_of(expression, env)? {
            Value::Bool(value) => Ok(value),
            other => Err(RuntimeError::NonBooleanCondition(construct, other.tag())),
        }
    }

    pub fn eval_expression(&mut self, expression: &Expression, env: &mut Environment) -> EvalResult {
        match expression {
            Expression::Prefix { op, right } => {
                let operand = self.value_of(right, env)?;
                eval_prefix(*op, operand).map(Some)
            }
            Expression::Infix { left, op, right } => {
                let left = self.value_of(left, env)?;
                let right = self.value_of(right, env)?;
                eval_infix(*op, left, right).map(Some)
            }
            Expression::Assign { name, value } => self.assign(name, value, env),
            Expression::CompoundAssign { name, op, value } => {
                self.compound_assign(name, *op, value, env)
            }
            Expression::Call {
                function,
                arguments,
            } => self.call(function, arguments, env),
            Expression::Identifier(name) => lookup(name, env).map(Some),
            Expression::Char(text) => Ok(Some(Value::Char(text.clone()))),
            Expression::Int(value) => Ok(Some(Value::Int(*value))),
            Expression::Float(value) => Ok(Some(Value::Float(*value))),
            Expression::Str(text) => Ok(Some(Value::Str(text.clone()))),
            Expression::Bool(value) => Ok(Some(Value::Bool(*value))),
            Expression::Array(elements) => {
                let values = self.eval_all(elements, env)?;
                Ok(Some(Value::Array(Array::untyped(values))))
            }
            Expression::Index { name, index } => self.read_index(name, index, env).map(Some),
            Expression::AssignIndex { name, index, value } => {
                self.assign_index(name, index, None, value, env)
            }
            Expression::CompoundAssignIndex {
                name,
                index,
                op,
                value,
            } => self.assign_index(name, index, Some(*op), value, env),
        }
    }

    // Evaluates an operand that must produce a value.
    fn value_of(&mut self, expression: &Expression, env: &mut Environment) -> Result<Value, RuntimeError> {
        self.eval_expression(expression, env)?
            .ok_or_else(|| RuntimeError::VoidValue(expression.describe()))
    }

    // Left to right, stopping at the first failure.
    fn eval_all(&mut self, expressions: &[Expression], env: &mut Environment) -> Result<Vec<Value>, RuntimeError> {
        expressions
            .iter()
            .map(|expression| self.value_of(expression, env))
            .collect()
    }

    fn assign(&mut self, name: &str, value: &Expression, env: &mut Environment) -> EvalResult {
        if !env.contains(name) {
            return Err(RuntimeError::UndeclaredIdentifier(name.to_string()));
        }

        let value = self.value_of(value, env)?;
        let current = env
            .get(name)
            .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.to_string()))?;

        let stored = match (current, value) {
            (Value::Array(target), value @ Value::Array(_)) => match target.element_type {
                Some(element) => Value::Array(typed_array(name, element, value)?),
                None => value,
            },
            (current, value) if current.tag() != value.tag() => {
                return Err(RuntimeError::TypeMismatch(format!(
                    "{} = {}",
                    current.tag(),
                    value.tag()
                )));
            }
            (_, value) => value,
        };

        env.assign(name, stored);
        Ok(None)
    }

    fn compound_assign(
        &mut self,
        name: &str,
        op: AssignOp,
        value: &Expression,
        env: &mut Environment,
    ) -> EvalResult {
        if !env.contains(name) {
            return Err(RuntimeError::UndeclaredIdentifier(name.to_string()));
        }

        let value = self.value_of(value, env)?;
        let current = env
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.to_string()))?;

        env.assign(name, eval_compound(op, current, value)?);
        Ok(None)
    }

    fn index_position(&mut self, index: &Expression, env: &mut Environment) -> Result<i64, RuntimeError> {
        match self.value_of(index, env)? {
            Value::Int(position) => Ok(position),
            other => Err(RuntimeError::IllegalIndex(other.tag())),
        }
    }

    fn read_index(&mut self, name: &str, index: &Expression, env: &mut Environment) -> Result<Value, RuntimeError> {
        if !env.contains(name) {
            return Err(RuntimeError::UndeclaredIdentifier(name.to_string()));
        }

        let position = self.index_position(index, env)?;
        let array = expect_array(name, env)?;
        let slot = checked_slot(name, array, position)?;
        Ok(array.elements[slot].clone())
    }

    // Replaces one element in place; the array keeps its element type.
    fn assign_index(
        &mut self,
        name: &str,
        index: &Expression,
        op: Option<AssignOp>,
        value: &Expression,
        env: &mut Environment,
    ) -> EvalResult {
        if !env.contains(name) {
            return Err(RuntimeError::UndeclaredIdentifier(name.to_string()));
        }

        let position = self.index_position(index, env)?;
        checked_slot(name, expect_array(name, env)?, position)?;

        let value = self.value_of(value, env)?;
        let array = expect_array(name, env)?;
        let slot = checked_slot(name, array, position)?;
        let element = &array.elements[slot];

        if element.tag() != value.tag() {
            return Err(RuntimeError::TypeMismatch(format!(
                "{}[{}] = {}",
                element.tag(),
                position,
                value.tag()
            )));
        }

        let stored = match op {
            Some(op) => eval_compound(op, element.clone(), value)?,
            None => value,
        };
        env.assign_element(name, slot, stored);
        Ok(None)
    }

    fn call(&mut self, name: &str, arguments: &[Expression], env: &mut Environment) -> EvalResult {
        let callee = match env.get(name) {
            Some(value) => value.clone(),
            None => match builtins::lookup(name) {
                Some(builtin) => Value::BuiltIn(builtin),
                None => return Err(RuntimeError::NotCallable(name.to_string())),
            },
        };

        match callee {
            Value::Function(function) => {
                let args = self.eval_all(arguments, env)?;
                self.call_function(&function, args, env)
            }
            Value::BuiltIn(builtin) => {
                let args = self.eval_all(arguments, env)?;
                trace!(name, args = args.len(), "calling builtin");
                (builtin.function)(&args, &mut self.host)
            }
            _ => Err(RuntimeError::NotCallable(name.to_string())),
        }
    }

    // The callee sees its parameters and the caller's functions, nothing else.
    fn call_function(&mut self, function: &Function, args: Vec<Value>, caller: &Environment) -> EvalResult {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::CallDepthExceeded(function.name.clone(), MAX_CALL_DEPTH));
        }
        if args.len() > function.params.len() {
            return Err(RuntimeError::TooManyArguments(function.name.clone()));
        }
        if args.len() < function.params.len() {
            return Err(RuntimeError::NotEnoughArguments(function.name.clone()));
        }
        for (position, (param, arg)) in function.params.iter().zip(&args).enumerate() {
            check_argument(position + 1, param, arg)?;
        }

        // Imported functions replace parameters of the same name.
        let mut local = Environment::new();
        for (param, arg) in function.params.iter().zip(args) {
            local.declare(param.name.clone(), arg);
        }
        local.import_functions(caller);

        debug!(function = %function.name, depth = self.depth, "calling function");
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.run_statements(&function.body, &mut local));
        self.depth -= 1;
        let result = result?;

        if function.is_void() {
            return Ok(None);
        }
        match result {
            Some(Value::Return(value)) => Ok(Some(*value)),
            other => Ok(other),
        }
    }
}

// Normal exit keeps writes to outer names; a return signal or an error
// undoes them.
fn leave_scope(env: &mut Environment, result: &EvalResult) {
    match result {
        Ok(Some(Value::Return(_))) | Err(_) => env.rollback_scope(),
        Ok(_) => env.commit_scope(),
    }
}

// Environment first, then the builtin table.
fn lookup(name: &str, env: &Environment) -> Result<Value, RuntimeError> {
    if let Some(value) = env.get(name) {
        return Ok(value.clone());
    }
    builtins::lookup(name)
        .map(Value::BuiltIn)
        .ok_or_else(|| RuntimeError::UndeclaredIdentifier(name.to_string()))
}

// Checks an array value against a declared element type and tags it.
fn typed_array(name: &str, element: ScalarType, value: Value) -> Result<Array, RuntimeError> {
    let mut array = match value {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::TypeMismatch(format!(
                "{}arr {} = {}",
                element,
                name,
                other.tag()
            )))
        }
    };

    if !array.is_homogeneous() {
        return Err(RuntimeError::HeterogeneousArray(name.to_string()));
    }
    if let Some(tag) = array.first_tag() {
        if tag != element.tag() {
            return Err(RuntimeError::IllegalElementType(element, tag));
        }
    }

    array.element_type = Some(element);
    Ok(array)
}

fn array_size(size: Value) -> Result<usize, RuntimeError> {
    match size {
        Value::Int(n) => usize::try_from(n).map_err(|_| RuntimeError::InvalidArraySize(n.to_string())),
        other => Err(RuntimeError::InvalidArraySize(other.tag().to_string())),
    }
}

fn expect_array<'e>(name: &str, env: &'e Environment) -> Result<&'e Array, RuntimeError> {
    match env.get(name) {
        Some(Value::Array(array)) => Ok(array),
        Some(_) => Err(RuntimeError::NotAnArray(name.to_string())),
        None => Err(RuntimeError::UndeclaredIdentifier(name.to_string())),
    }
}

fn checked_slot(name: &str, array: &Array, position: i64) -> Result<usize, RuntimeError> {
    usize::try_from(position)
        .ok()
        .filter(|&slot| slot < array.len())
        .ok_or_else(|| RuntimeError::IndexOutOfBounds(name.to_string(), position))
}

fn check_argument(position: usize, param: &Param, arg: &Value) -> Result<(), RuntimeError> {
    let expected = ScalarType::from_name(&param.type_name);
    match (param.array, arg) {
        (true, Value::Array(array)) => {
            if array.element_type.is_some() && array.element_type == expected {
                Ok(())
            } else {
                Err(RuntimeError::MismatchedArgumentType(position))
            }
        }
        (true, _) => Err(RuntimeError::NonArrayPassedAsArray),
        (false, arg) => {
            if expected.map(ScalarType::tag) == Some(arg.tag()) {
                Ok(())
            } else {
                Err(RuntimeError::MismatchedArgumentType(position))
            }
        }
    }
}
