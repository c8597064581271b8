// ABOUTME: Error types for reader and evaluator failures

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_AT_LEAST_TWO: &str = "at least 2";
pub const ARITY_ZERO: &str = "0";

/// Single error kind for the whole interpreter. No error is fatal:
/// the driver reports the message and keeps going.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    /// Reader failure: unmatched parens, unterminated literals, bad
    /// character designators.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A value did not match the expected variant. `actual` is the
    /// offending value's printed form.
    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    /// Wrong number of arguments to a special form or procedure.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String, // "2", "at least 1"
        actual: usize,
    },

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("not a procedure: {0}")]
    NotCallable(String),

    #[error("{0} used outside quasiquote")]
    StrayUnquote(&'static str),

    /// Any other evaluation failure, reported with function context.
    #[error("{function}: {message}")]
    Runtime { function: String, message: String },
}

impl EvalError {
    /// Type mismatch naming the expected type and the printed form of
    /// the value actually seen.
    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime(function: &str, message: impl Into<String>) -> Self {
        EvalError::Runtime {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_includes_printed_form() {
        let err = EvalError::type_error("+", "an integer", &Value::Symbol("foo".to_string()));
        assert_eq!(err.to_string(), "+: expected an integer, got foo");
    }

    #[test]
    fn test_arity_error_pluralizes() {
        let err = EvalError::arity("cons", ARITY_TWO, 3);
        assert_eq!(err.to_string(), "cons: expected 2 arguments, got 3");

        let err = EvalError::arity("car", ARITY_ONE, 0);
        assert_eq!(err.to_string(), "car: expected 1 argument, got 0");
    }

    #[test]
    fn test_stray_unquote_message() {
        let err = EvalError::StrayUnquote("unquote-splicing");
        assert_eq!(err.to_string(), "unquote-splicing used outside quasiquote");
    }
}
