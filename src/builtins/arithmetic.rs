//! Arithmetic operations: +, -, *, abs
//!
//! Integer operations supporting variadic arguments where applicable.
//!
//! - `+`: Sum of all arguments (identity: 0)
//! - `-`: Subtract subsequent args from first, or negate if single arg
//! - `*`: Product of all arguments (identity: 1)
//! - `abs`: Absolute value

use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_ONE, ARITY_ONE};
use crate::value::Value;
use std::rc::Rc;

fn int(function: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(EvalError::type_error(function, "an integer", other)),
    }
}

/// Returns the sum of all arguments. (+) is 0.
pub fn builtin_add(args: &[Value]) -> Result<Value, EvalError> {
    let mut sum = 0;
    for arg in args {
        sum += int("+", arg)?;
    }
    Ok(Value::Int(sum))
}

/// Subtracts subsequent arguments from the first; with one argument,
/// returns its negation. (-) is an arity error.
pub fn builtin_sub(args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity("-", ARITY_AT_LEAST_ONE, 0));
    }

    let first = int("-", &args[0])?;
    if args.len() == 1 {
        return Ok(Value::Int(-first));
    }

    let mut result = first;
    for arg in &args[1..] {
        result -= int("-", arg)?;
    }
    Ok(Value::Int(result))
}

/// Returns the product of all arguments. (*) is 1.
pub fn builtin_mul(args: &[Value]) -> Result<Value, EvalError> {
    let mut product = 1;
    for arg in args {
        product *= int("*", arg)?;
    }
    Ok(Value::Int(product))
}

/// Returns the absolute value of its argument.
pub fn builtin_abs(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("abs", ARITY_ONE, args.len()));
    }
    Ok(Value::Int(int("abs", &args[0])?.abs()))
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("+".to_string(), Value::BuiltIn(builtin_add));
    env.define("-".to_string(), Value::BuiltIn(builtin_sub));
    env.define("*".to_string(), Value::BuiltIn(builtin_mul));
    env.define("abs".to_string(), Value::BuiltIn(builtin_abs));
}
