//! Prefix, infix and compound-assignment semantics over evaluated operands.
//!
//! Operands reach these functions already evaluated; the interpreter is
//! responsible for stopping before this point when an operand failed.

use crate::ariel_errors::RuntimeError;
use crate::ast::{AssignOp, InfixOp, PrefixOp};
use crate::value::{TypeTag, Value};

pub fn eval_prefix(op: PrefixOp, operand: Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (PrefixOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (PrefixOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (PrefixOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (PrefixOp::Abs, Value::Int(n)) => Ok(Value::Int(n.wrapping_abs())),
        (PrefixOp::Abs, Value::Float(x)) => Ok(Value::Float(x.abs())),
        (PrefixOp::Complement, Value::Int(n)) => Ok(Value::Int(!n)),
        (op, operand) => Err(RuntimeError::IllegalOperation(op, operand.tag())),
    }
}

pub fn eval_infix(op: InfixOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
    if left.tag() != right.tag() {
        return Err(RuntimeError::TypeMismatch(format!(
            "{} {} {}",
            left.tag(),
            op,
            right.tag()
        )));
    }

    match (left, right) {
        (Value::Char(l), Value::Char(r)) => char_op(op, l, r),
        (Value::Int(l), Value::Int(r)) => int_op(op, l, r),
        (Value::Float(l), Value::Float(r)) => float_op(op, l, r),
        (Value::Str(l), Value::Str(r)) => string_op(op, l, r),
        (Value::Bool(l), Value::Bool(r)) => bool_op(op, l, r),
        (left, right) => Err(illegal(left.tag(), op, right.tag())),
    }
}

/// Applies `target op= value`, returning the value to store back.
pub fn eval_compound(op: AssignOp, current: Value, value: Value) -> Result<Value, RuntimeError> {
    if current.tag() != value.tag() {
        return Err(RuntimeError::TypeMismatch(format!(
            "{} {} {}",
            current.tag(),
            op,
            value.tag()
        )));
    }

    match current {
        Value::Int(_) | Value::Float(_) | Value::Str(_) => eval_infix(op.base(), current, value),
        _ => Err(RuntimeError::IllegalAssignment(current.tag(), op, value.tag())),
    }
}

fn illegal(left: TypeTag, op: InfixOp, right: TypeTag) -> RuntimeError {
    RuntimeError::IllegalOperator(left, op.to_string(), right)
}

// Ordering and equality shared by every ordered type. None when `op` is not a comparison.
fn compare<T: PartialOrd>(op: InfixOp, l: &T, r: &T) -> Option<bool> {
    match op {
        InfixOp::Lt => Some(l < r),
        InfixOp::Le => Some(l <= r),
        InfixOp::Eq => Some(l == r),
        InfixOp::Ne => Some(l != r),
        InfixOp::Ge => Some(l >= r),
        InfixOp::Gt => Some(l > r),
        _ => None,
    }
}

fn char_op(op: InfixOp, l: String, r: String) -> Result<Value, RuntimeError> {
    if let Some(result) = compare(op, &l, &r) {
        return Ok(Value::Bool(result));
    }
    match op {
        InfixOp::Add => Ok(Value::Str(l + &r)),
        _ => Err(illegal(TypeTag::Char, op, TypeTag::Char)),
    }
}

fn int_op(op: InfixOp, l: i64, r: i64) -> Result<Value, RuntimeError> {
    if let Some(result) = compare(op, &l, &r) {
        return Ok(Value::Bool(result));
    }
    let result = match op {
        InfixOp::Add => l.wrapping_add(r),
        InfixOp::Sub => l.wrapping_sub(r),
        InfixOp::Mul => l.wrapping_mul(r),
        InfixOp::Div => {
            if r == 0 {
                return Err(RuntimeError::DivideByZero);
            }
            l.wrapping_div(r)
        }
        InfixOp::Mod => {
            if r == 0 {
                return Err(RuntimeError::DivideByZero);
            }
            l.wrapping_rem(r)
        }
        InfixOp::BitAnd => l & r,
        InfixOp::BitOr => l | r,
        InfixOp::BitXor => l ^ r,
        InfixOp::Shl => match shift_amount(r) {
            Some(amount) => l.checked_shl(amount).unwrap_or(0),
            None => return Err(illegal(TypeTag::Int, op, TypeTag::Int)),
        },
        InfixOp::Shr => match shift_amount(r) {
            Some(amount) => l.checked_shr(amount).unwrap_or(if l < 0 { -1 } else { 0 }),
            None => return Err(illegal(TypeTag::Int, op, TypeTag::Int)),
        },
        _ => return Err(illegal(TypeTag::Int, op, TypeTag::Int)),
    };
    Ok(Value::Int(result))
}

// Negative shift amounts are rejected; anything past the width saturates.
fn shift_amount(r: i64) -> Option<u32> {
    if r < 0 {
        None
    } else {
        Some(u32::try_from(r).unwrap_or(u32::MAX))
    }
}

fn float_op(op: InfixOp, l: f64, r: f64) -> Result<Value, RuntimeError> {
    if let Some(result) = compare(op, &l, &r) {
        return Ok(Value::Bool(result));
    }
    match op {
        InfixOp::Add => Ok(Value::Float(l + r)),
        InfixOp::Sub => Ok(Value::Float(l - r)),
        InfixOp::Mul => Ok(Value::Float(l * r)),
        InfixOp::Div => {
            if r == 0.0 {
                return Err(RuntimeError::DivideByZero);
            }
            Ok(Value::Float(l / r))
        }
        _ => Err(illegal(TypeTag::Float, op, TypeTag::Float)),
    }
}

fn string_op(op: InfixOp, l: String, r: String) -> Result<Value, RuntimeError> {
    if let Some(result) = compare(op, &l, &r) {
        return Ok(Value::Bool(result));
    }
    match op {
        InfixOp::Add => Ok(Value::Str(l + &r)),
        _ => Err(illegal(TypeTag::String, op, TypeTag::String)),
    }
}

fn bool_op(op: InfixOp, l: bool, r: bool) -> Result<Value, RuntimeError> {
    match op {
        InfixOp::Eq => Ok(Value::Bool(l == r)),
        InfixOp::Ne => Ok(Value::Bool(l != r)),
        InfixOp::And => Ok(Value::Bool(l && r)),
        InfixOp::Or => Ok(Value::Bool(l || r)),
        _ => Err(illegal(TypeTag::Bool, op, TypeTag::Bool)),
    }
}
