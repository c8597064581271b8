//! Logic operations: not
//!
//! `and` and `or` are special forms handled by the evaluator so they
//! can short-circuit; only negation is an ordinary procedure.

use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE};
use crate::value::Value;
use std::rc::Rc;

/// Logical NOT. Requires a boolean and returns its negation.
pub fn builtin_not(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("not", ARITY_ONE, args.len()));
    }

    match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(EvalError::type_error("not", "a boolean", other)),
    }
}

/// Register all logic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("not".to_string(), Value::BuiltIn(builtin_not));
}
