// ABOUTME: Reader module turning S-expression text into values, one
// ABOUTME: expression at a time so callers can stream from a buffer

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::value,
    multi::many0,
    IResult, Parser,
};

use crate::error::EvalError;
use crate::value::Value;

/// Characters that terminate an atom in addition to whitespace.
const STRUCTURAL: &str = "()\"';`,";

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && !STRUCTURAL.contains(c)
}

/// Reads one expression off the front of `input`.
///
/// Returns the value and the unconsumed remainder so further
/// expressions can be read from the same buffer. Returns None when
/// only whitespace and comments remain. Trailing input after the
/// expression is never consumed.
pub fn read_expr(input: &str) -> Result<Option<(Value, &str)>, EvalError> {
    let (rest, _) = ws_and_comments(input).unwrap_or((input, ()));
    if rest.is_empty() {
        return Ok(None);
    }
    let (rest, expr) = read_form(rest)?;
    Ok(Some((expr, rest)))
}

/// Parses exactly one expression from `input`; trailing non-whitespace
/// input is an error.
pub fn parse(input: &str) -> Result<Value, EvalError> {
    match read_expr(input)? {
        None => Err(EvalError::Syntax("unexpected end of input".to_string())),
        Some((expr, rest)) => {
            let (rest, _) = ws_and_comments(rest).unwrap_or((rest, ()));
            if rest.is_empty() {
                Ok(expr)
            } else {
                Err(EvalError::Syntax(format!(
                    "unexpected trailing input: '{}'",
                    rest.trim_end()
                )))
            }
        }
    }
}

// ============================================================================
// Token scanning
// ============================================================================

/// Skip a line comment from ';' through the end of the line.
fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

/// Skip whitespace and comments.
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), line_comment)))
        .map(|_| ())
        .parse(input)
}

/// A maximal run of non-delimiter characters.
fn atom_token(input: &str) -> Result<(&str, &str), EvalError> {
    take_while1::<_, _, nom::error::Error<_>>(is_atom_char)(input)
        .map_err(|_| EvalError::Syntax("expected an expression".to_string()))
}

/// Optional leading '-' followed by one or more decimal digits. The
/// '-' alone is a symbol, not a number.
fn is_integer(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// Recursive descent
// ============================================================================

/// Dispatches on the first significant character. `input` has no
/// leading whitespace.
fn read_form(input: &str) -> Result<(&str, Value), EvalError> {
    let first = input
        .chars()
        .next()
        .ok_or_else(|| EvalError::Syntax("unexpected end of input".to_string()))?;

    match first {
        '(' => read_list(&input[1..]),
        ')' => Err(EvalError::Syntax("unexpected ')'".to_string())),
        '"' => read_string(&input[1..]),
        '\'' => read_macro_form(&input[1..], "quote"),
        '`' => read_macro_form(&input[1..], "quasiquote"),
        ',' => {
            if let Some(rest) = input.strip_prefix(",@") {
                read_macro_form(rest, "unquote-splicing")
            } else {
                read_macro_form(&input[1..], "unquote")
            }
        }
        '#' if input[1..].starts_with('\\') => read_char(&input[2..]),
        _ => read_atom(input),
    }
}

/// Reads subexpressions until the matching ')'. An empty list is Nil;
/// otherwise a right-nested pair chain terminated by Nil.
fn read_list(mut input: &str) -> Result<(&str, Value), EvalError> {
    let mut items = Vec::new();
    loop {
        let (rest, _) = ws_and_comments(input).unwrap_or((input, ()));
        if rest.is_empty() {
            return Err(EvalError::Syntax("unmatched '('".to_string()));
        }
        if let Some(rest) = rest.strip_prefix(')') {
            return Ok((rest, Value::list(items)));
        }
        let (rest, expr) = read_form(rest)?;
        items.push(expr);
        input = rest;
    }
}

/// Reads a string body up to the closing unescaped quote. \n and \t
/// become newline and tab; a backslash before any other character
/// yields that character.
fn read_string(input: &str) -> Result<(&str, Value), EvalError> {
    let mut body = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((&input[i + 1..], Value::Str(body))),
            '\\' => match chars.next() {
                Some((_, 'n')) => body.push('\n'),
                Some((_, 't')) => body.push('\t'),
                Some((_, escaped)) => body.push(escaped),
                None => break,
            },
            other => body.push(other),
        }
    }
    Err(EvalError::Syntax("unclosed string literal".to_string()))
}

/// Reads the designator after "#\". A single character stands for
/// itself (including structural characters); multi-character
/// designators name whitespace, case-insensitively.
fn read_char(input: &str) -> Result<(&str, Value), EvalError> {
    let first = input.chars().next().ok_or_else(|| {
        EvalError::Syntax("unexpected end of input in character literal".to_string())
    })?;

    if !is_atom_char(first) {
        return Ok((&input[first.len_utf8()..], Value::Char(first)));
    }

    let (rest, designator) = atom_token(input)?;
    Ok((rest, Value::Char(designator_to_char(designator)?)))
}

fn designator_to_char(designator: &str) -> Result<char, EvalError> {
    let mut chars = designator.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => match designator.to_ascii_lowercase().as_str() {
            "space" => Ok(' '),
            "newline" => Ok('\n'),
            "tab" => Ok('\t'),
            _ => Err(EvalError::Syntax(format!(
                "unrecognized character name: {}",
                designator
            ))),
        },
    }
}

/// Expands a reader-macro marker into a two-element list (marker expr).
fn read_macro_form<'a>(input: &'a str, name: &str) -> Result<(&'a str, Value), EvalError> {
    match read_expr(input)? {
        None => Err(EvalError::Syntax(format!(
            "unexpected end of input after {}",
            name
        ))),
        Some((expr, rest)) => Ok((
            rest,
            Value::list(vec![Value::Symbol(name.to_string()), expr]),
        )),
    }
}

/// Reads an atom token and classifies it: booleans, then integers,
/// then symbols.
fn read_atom(input: &str) -> Result<(&str, Value), EvalError> {
    let (rest, token) = atom_token(input)?;
    let value = match token {
        "#t" => Value::Bool(true),
        "#f" => Value::Bool(false),
        _ if is_integer(token) => Value::Int(token.parse().map_err(|_| {
            EvalError::Syntax(format!("integer literal out of range: {}", token))
        })?),
        _ => Value::Symbol(token.to_string()),
    };
    Ok((rest, value))
}
