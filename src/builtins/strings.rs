//! String operations: string-length, string-ref
//!
//! Lengths and indices count code points, matching the character
//! literals the reader produces.

use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE, ARITY_TWO};
use crate::value::Value;
use std::rc::Rc;

/// Returns the number of characters in a string.
pub fn builtin_string_length(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("string-length", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        other => Err(EvalError::type_error("string-length", "a string", other)),
    }
}

/// Returns the character at a zero-based index, bounds-checked.
pub fn builtin_string_ref(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("string-ref", ARITY_TWO, args.len()));
    }
    let s = match &args[0] {
        Value::Str(s) => s,
        other => return Err(EvalError::type_error("string-ref", "a string", other)),
    };
    let index = match &args[1] {
        Value::Int(n) => *n,
        other => return Err(EvalError::type_error("string-ref", "an integer", other)),
    };

    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .map(Value::Char)
        .ok_or_else(|| {
            EvalError::runtime(
                "string-ref",
                format!(
                    "index {} out of bounds for string of length {}",
                    index,
                    s.chars().count()
                ),
            )
        })
}

/// Register all string builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define(
        "string-length".to_string(),
        Value::BuiltIn(builtin_string_length),
    );
    env.define("string-ref".to_string(), Value::BuiltIn(builtin_string_ref));
}
