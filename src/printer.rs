// ABOUTME: Canonical textual form for values; reading it back yields
// ABOUTME: a structurally equal value (procedures exempted)

use crate::value::Value;
use std::fmt::{self, Write};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => f.write_str(if *b { "#t" } else { "#f" }),
            Value::Char(c) => write_char(f, *c),
            Value::Str(s) => write_string(f, s),
            Value::Symbol(name) => f.write_str(name),
            Value::Nil => f.write_str("()"),
            Value::Cons(car, cdr) => write_pair(f, car, cdr),
            Value::BuiltIn(_) | Value::Lambda { .. } => f.write_str("<function>"),
        }
    }
}

/// Whitespace characters print under their symbolic names; everything
/// else prints literally after the #\ prefix.
fn write_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        ' ' => f.write_str("#\\Space"),
        '\n' => f.write_str("#\\Newline"),
        '\t' => f.write_str("#\\Tab"),
        _ => write!(f, "#\\{}", c),
    }
}

/// Quote and backslash are escaped so the reader round-trips the body.
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('"')
}

/// Walks the cdr chain, choosing between proper and dotted printing at
/// each cell.
fn write_pair(f: &mut fmt::Formatter<'_>, car: &Value, cdr: &Value) -> fmt::Result {
    f.write_char('(')?;
    write!(f, "{}", car)?;
    let mut tail = cdr;
    loop {
        match tail {
            Value::Nil => break,
            Value::Cons(car, cdr) => {
                write!(f, " {}", car)?;
                tail = cdr;
            }
            other => {
                write!(f, " . {}", other)?;
                break;
            }
        }
    }
    f.write_char(')')
}
