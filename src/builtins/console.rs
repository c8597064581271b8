//! Console output: display, newline
//!
//! `display` writes strings without their quotes and everything else
//! in canonical printed form. Both return Nil.

use crate::env::Environment;
use crate::error::{EvalError, ARITY_ONE, ARITY_ZERO};
use crate::value::Value;
use std::rc::Rc;

/// Writes one value to standard output.
pub fn builtin_display(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("display", ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Str(s) => print!("{}", s),
        other => print!("{}", other),
    }
    Ok(Value::Nil)
}

/// Writes a newline to standard output.
pub fn builtin_newline(args: &[Value]) -> Result<Value, EvalError> {
    if !args.is_empty() {
        return Err(EvalError::arity("newline", ARITY_ZERO, args.len()));
    }
    println!();
    Ok(Value::Nil)
}

/// Register all console builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("display".to_string(), Value::BuiltIn(builtin_display));
    env.define("newline".to_string(), Value::BuiltIn(builtin_newline));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_returns_nil() {
        assert_eq!(
            builtin_display(&[Value::Str("hi".to_string())]).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn test_display_arity() {
        assert!(builtin_display(&[]).is_err());
        assert!(builtin_display(&[Value::Int(1), Value::Int(2)]).is_err());
    }

    #[test]
    fn test_newline_arity() {
        assert_eq!(builtin_newline(&[]).unwrap(), Value::Nil);
        assert!(builtin_newline(&[Value::Int(1)]).is_err());
    }
}
