//! Comparison operations: <, >, =
//!
//! Integer comparisons over at least two arguments, chained across
//! each adjacent pair.
//!
//! - `<`: strictly ascending
//! - `>`: strictly descending
//! - `=`: all equal
//!
//! All comparison functions return boolean (#t or #f)

use crate::env::Environment;
use crate::error::{EvalError, ARITY_AT_LEAST_TWO};
use crate::value::Value;
use std::rc::Rc;

fn chain(
    function: &str,
    args: &[Value],
    cmp: fn(i64, i64) -> bool,
) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity(function, ARITY_AT_LEAST_TWO, args.len()));
    }

    let mut ints = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Value::Int(n) => ints.push(*n),
            other => return Err(EvalError::type_error(function, "an integer", other)),
        }
    }

    Ok(Value::Bool(ints.windows(2).all(|pair| cmp(pair[0], pair[1]))))
}

/// Tests if the arguments are strictly ascending.
pub fn builtin_lt(args: &[Value]) -> Result<Value, EvalError> {
    chain("<", args, |a, b| a < b)
}

/// Tests if the arguments are strictly descending.
pub fn builtin_gt(args: &[Value]) -> Result<Value, EvalError> {
    chain(">", args, |a, b| a > b)
}

/// Tests if all arguments are equal.
pub fn builtin_num_eq(args: &[Value]) -> Result<Value, EvalError> {
    chain("=", args, |a, b| a == b)
}

/// Register all comparison builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("<".to_string(), Value::BuiltIn(builtin_lt));
    env.define(">".to_string(), Value::BuiltIn(builtin_gt));
    env.define("=".to_string(), Value::BuiltIn(builtin_num_eq));
}
