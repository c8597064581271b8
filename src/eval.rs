// ABOUTME: Tree-walking evaluator with special-form dispatch, closure
// ABOUTME: construction, and quasiquotation expansion

use crate::env::Environment;
use crate::error::{
    EvalError, ARITY_AT_LEAST_ONE, ARITY_AT_LEAST_TWO, ARITY_ONE, ARITY_THREE, ARITY_TWO,
};
use crate::value::Value;
use std::rc::Rc;

/// Evaluates one expression. Mutates `env` only through define/set!
/// and recurses on the host stack; tail calls are not optimized.
pub fn eval(expr: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    match expr {
        // Self-evaluating values
        Value::Int(_)
        | Value::Bool(_)
        | Value::Char(_)
        | Value::Str(_)
        | Value::BuiltIn(_)
        | Value::Lambda { .. } => Ok(expr.clone()),

        Value::Nil => Err(EvalError::runtime(
            "eval",
            "attempt to apply the empty list",
        )),

        Value::Symbol(name) => env
            .get(name)
            .ok_or_else(|| EvalError::UnboundSymbol(name.clone())),

        // A combination: special form or function call
        Value::Cons(head, tail) => {
            let args = tail.to_vec().ok_or_else(|| {
                EvalError::Syntax("combination must be a proper list".to_string())
            })?;

            if let Value::Symbol(name) = &**head {
                match name.as_str() {
                    "quote" => return eval_quote(&args),
                    "quasiquote" => {
                        if args.len() != 1 {
                            return Err(EvalError::arity("quasiquote", ARITY_ONE, args.len()));
                        }
                        return quasiquote(&args[0], env);
                    }
                    "unquote" => return Err(EvalError::StrayUnquote("unquote")),
                    "unquote-splicing" => {
                        return Err(EvalError::StrayUnquote("unquote-splicing"))
                    }
                    "if" => return eval_if(&args, env),
                    "and" => return eval_and(&args, env),
                    "or" => return eval_or(&args, env),
                    "begin" => return eval_begin(&args, env),
                    "define" => return eval_define(&args, env),
                    "set!" => return eval_set(&args, env),
                    "lambda" => return eval_lambda(&args, env),
                    _ => {}
                }
            }

            // Operator first, then operands left to right
            let procedure = eval(head, env)?;
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in &args {
                evaluated.push(eval(arg, env)?);
            }
            apply(&procedure, &evaluated)
        }
    }
}

/// Applies a procedure to already-evaluated arguments.
pub fn apply(procedure: &Value, args: &[Value]) -> Result<Value, EvalError> {
    match procedure {
        Value::BuiltIn(f) => f(args),
        Value::Lambda {
            params,
            has_rest,
            body,
            env,
        } => {
            let frame = bind_params(params, *has_rest, args, env)?;
            let mut result = Value::Nil;
            for expr in body.iter() {
                result = eval(expr, &frame)?;
            }
            Ok(result)
        }
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

/// Builds the call frame: positional parameters bind one to one, a
/// rest parameter collects the remaining arguments as a list.
fn bind_params(
    params: &[String],
    has_rest: bool,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Rc<Environment>, EvalError> {
    let frame = Environment::with_parent(env.clone());

    if has_rest {
        let required = params.len() - 1;
        if args.len() < required {
            return Err(EvalError::arity(
                "procedure",
                format!("at least {}", required),
                args.len(),
            ));
        }
        for (param, arg) in params[..required].iter().zip(args) {
            frame.define(param.clone(), arg.clone());
        }
        frame.define(params[required].clone(), Value::list(args[required..].to_vec()));
    } else {
        if args.len() != params.len() {
            return Err(EvalError::arity(
                "procedure",
                params.len().to_string(),
                args.len(),
            ));
        }
        for (param, arg) in params.iter().zip(args) {
            frame.define(param.clone(), arg.clone());
        }
    }

    Ok(frame)
}

/// (quote x) returns x unevaluated.
fn eval_quote(args: &[Value]) -> Result<Value, EvalError> {
    if args.len() != 1 {
        return Err(EvalError::arity("quote", ARITY_ONE, args.len()));
    }
    Ok(args[0].clone())
}

/// (if p c a) requires a Bool predicate; arbitrary values are not
/// treated as truthy.
fn eval_if(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 3 {
        return Err(EvalError::arity("if", ARITY_THREE, args.len()));
    }
    match eval(&args[0], env)? {
        Value::Bool(true) => eval(&args[1], env),
        Value::Bool(false) => eval(&args[2], env),
        other => Err(EvalError::type_error("if", "a boolean predicate", &other)),
    }
}

/// Short-circuits on the first #f, otherwise returns the last value.
/// Non-boolean values are truthy for the test but do not stop the
/// chain. (and) is #t.
fn eval_and(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    let mut last = Value::Bool(true);
    for arg in args {
        let value = eval(arg, env)?;
        if value == Value::Bool(false) {
            return Ok(Value::Bool(false));
        }
        last = value;
    }
    Ok(last)
}

/// Returns #t on the first #t, the value itself on the first
/// non-boolean, and #f when every expression was #f. (or) is #f.
fn eval_or(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    for arg in args {
        match eval(arg, env)? {
            Value::Bool(true) => return Ok(Value::Bool(true)),
            Value::Bool(false) => {}
            other => return Ok(other),
        }
    }
    Ok(Value::Bool(false))
}

/// Evaluates left to right, returning the last value.
fn eval_begin(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::arity("begin", ARITY_AT_LEAST_ONE, 0));
    }
    let mut result = Value::Nil;
    for arg in args {
        result = eval(arg, env)?;
    }
    Ok(result)
}

/// (define name value) binds in the current frame and returns the
/// symbol.
fn eval_define(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("define", ARITY_TWO, args.len()));
    }
    let name = match &args[0] {
        Value::Symbol(name) => name.clone(),
        other => return Err(EvalError::type_error("define", "a symbol", other)),
    };
    let value = eval(&args[1], env)?;
    env.define(name.clone(), value);
    Ok(Value::Symbol(name))
}

/// (set! name value) rebinds in the defining frame and returns the
/// symbol. An unbound name is an error.
fn eval_set(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() != 2 {
        return Err(EvalError::arity("set!", ARITY_TWO, args.len()));
    }
    let name = match &args[0] {
        Value::Symbol(name) => name.clone(),
        other => return Err(EvalError::type_error("set!", "a symbol", other)),
    };
    let value = eval(&args[1], env)?;
    env.set(&name, value)?;
    Ok(Value::Symbol(name))
}

/// (lambda formals body1 ... bodyn) captures the current environment.
/// The symbol &rest in the second-to-last formal position marks the
/// last formal as the rest parameter.
fn eval_lambda(args: &[Value], env: &Rc<Environment>) -> Result<Value, EvalError> {
    if args.len() < 2 {
        return Err(EvalError::arity("lambda", ARITY_AT_LEAST_TWO, args.len()));
    }

    let formals = args[0].to_vec().ok_or_else(|| {
        EvalError::type_error("lambda", "a proper list of parameters", &args[0])
    })?;

    let mut params = Vec::with_capacity(formals.len());
    let mut has_rest = false;
    for (i, formal) in formals.iter().enumerate() {
        let name = match formal {
            Value::Symbol(name) => name.clone(),
            other => return Err(EvalError::type_error("lambda", "a parameter symbol", other)),
        };
        if name == "&rest" {
            if i + 2 == formals.len() {
                has_rest = true;
            } else {
                return Err(EvalError::runtime(
                    "lambda",
                    "illegal rest parameter in lambda list",
                ));
            }
        } else {
            params.push(name);
        }
    }

    Ok(Value::Lambda {
        params,
        has_rest,
        body: Rc::new(args[1..].to_vec()),
        env: env.clone(),
    })
}

/// Walks a quasiquote template. Not the main evaluator: it only hands
/// off to eval for unquoted subexpressions and splices
/// unquote-splicing lists into the surrounding chain.
fn quasiquote(template: &Value, env: &Rc<Environment>) -> Result<Value, EvalError> {
    let Value::Cons(head, tail) = template else {
        return Ok(template.clone());
    };

    if is_symbol(head, "unquote") {
        let args = unquote_args(tail, "unquote")?;
        return eval(&args[0], env);
    }

    if is_symbol(head, "unquote-splicing") {
        return Err(EvalError::runtime(
            "quasiquote",
            "unquote-splicing at top level of template",
        ));
    }

    if let Value::Cons(inner_head, inner_tail) = &**head {
        if is_symbol(inner_head, "unquote-splicing") {
            let args = unquote_args(inner_tail, "unquote-splicing")?;
            let spliced = eval(&args[0], env)?;
            let items = spliced
                .to_vec()
                .ok_or_else(|| EvalError::type_error("unquote-splicing", "a proper list", &spliced))?;
            let rest = quasiquote(tail, env)?;
            return Ok(items
                .into_iter()
                .rev()
                .fold(rest, |tail, head| Value::cons(head, tail)));
        }
    }

    Ok(Value::cons(
        quasiquote(head, env)?,
        quasiquote(tail, env)?,
    ))
}

fn unquote_args(tail: &Value, form: &str) -> Result<Vec<Value>, EvalError> {
    let args = tail
        .to_vec()
        .ok_or_else(|| EvalError::Syntax(format!("{} form must be a proper list", form)))?;
    if args.len() != 1 {
        return Err(EvalError::arity(form, ARITY_ONE, args.len()));
    }
    Ok(args)
}

fn is_symbol(value: &Value, name: &str) -> bool {
    matches!(value, Value::Symbol(s) if s == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::reader::parse;

    fn setup() -> Rc<Environment> {
        let env = Environment::new();
        register_builtins(&env);
        env
    }

    fn run(source: &str, env: &Rc<Environment>) -> Result<Value, EvalError> {
        eval(&parse(source).unwrap(), env)
    }

    #[test]
    fn test_literals_self_evaluate() {
        let env = setup();
        for source in ["3", "-1", "#t", "#f", "\"hi\"", "#\\h"] {
            let literal = parse(source).unwrap();
            assert_eq!(run(source, &env).unwrap(), literal);
        }
    }

    #[test]
    fn test_symbol_lookup() {
        let env = setup();
        env.define("x".to_string(), Value::Int(42));
        assert_eq!(run("x", &env).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_unbound_symbol_is_an_error() {
        let env = setup();
        let result = run("nope", &env);
        assert!(matches!(result, Err(EvalError::UnboundSymbol(name)) if name == "nope"));
    }

    #[test]
    fn test_empty_list_is_an_error() {
        let env = setup();
        assert!(run("()", &env).is_err());
    }

    #[test]
    fn test_quote_returns_argument_unevaluated() {
        let env = setup();
        assert_eq!(
            run("(quote foo)", &env).unwrap(),
            Value::Symbol("foo".to_string())
        );
        assert_eq!(run("'(+ 1 2)", &env).unwrap(), parse("(+ 1 2)").unwrap());
    }

    #[test]
    fn test_quote_arity() {
        let env = setup();
        assert!(run("(quote)", &env).is_err());
        assert!(run("(quote a b)", &env).is_err());
    }

    #[test]
    fn test_if_chooses_branch() {
        let env = setup();
        assert_eq!(run("(if #t 1 2)", &env).unwrap(), Value::Int(1));
        assert_eq!(run("(if #f 1 2)", &env).unwrap(), Value::Int(2));
        assert_eq!(
            run("(if #t (if #t #t #f) #f)", &env).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_if_requires_exactly_three_arguments() {
        let env = setup();
        assert!(run("(if)", &env).is_err());
        assert!(run("(if #t)", &env).is_err());
        assert!(run("(if #t 1)", &env).is_err());
        assert!(run("(if #t 1 2 3)", &env).is_err());
    }

    #[test]
    fn test_if_rejects_non_bool_predicate() {
        let env = setup();
        assert!(matches!(
            run("(if 1 2 3)", &env),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_if_only_evaluates_taken_branch() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        run("(if #t (set! x 2) (set! x 3))", &env).unwrap();
        assert_eq!(run("x", &env).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_and_semantics() {
        let env = setup();
        assert_eq!(run("(and)", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("(and #f 1)", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("(and #t 3)", &env).unwrap(), Value::Int(3));
        assert_eq!(run("(and 1 2)", &env).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_and_short_circuits() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        // the set! past the deciding #f must not run
        assert_eq!(
            run("(and #f (set! x 2))", &env).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(run("x", &env).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_or_semantics() {
        let env = setup();
        assert_eq!(run("(or)", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("(or #f #f)", &env).unwrap(), Value::Bool(false));
        assert_eq!(run("(or #f #t)", &env).unwrap(), Value::Bool(true));
        // first non-boolean value is returned as-is
        assert_eq!(run("(or #f 7 #t)", &env).unwrap(), Value::Int(7));
    }

    #[test]
    fn test_or_short_circuits() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        assert_eq!(run("(or #t (set! x 2))", &env).unwrap(), Value::Bool(true));
        assert_eq!(run("x", &env).unwrap(), Value::Int(1));
    }

    #[test]
    fn test_begin_returns_last_value() {
        let env = setup();
        assert_eq!(run("(begin 1 2 3)", &env).unwrap(), Value::Int(3));
        assert!(run("(begin)", &env).is_err());
    }

    #[test]
    fn test_begin_evaluates_in_order() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        run("(begin (set! x 2) (set! x (+ x 10)))", &env).unwrap();
        assert_eq!(run("x", &env).unwrap(), Value::Int(12));
    }

    #[test]
    fn test_define_binds_and_returns_symbol() {
        let env = setup();
        assert_eq!(
            run("(define x 42)", &env).unwrap(),
            Value::Symbol("x".to_string())
        );
        assert_eq!(run("x", &env).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_define_requires_symbol_name() {
        let env = setup();
        assert!(run("(define 3 4)", &env).is_err());
        assert!(run("(define (f x) x)", &env).is_err());
    }

    #[test]
    fn test_set_requires_prior_definition() {
        let env = setup();
        assert!(matches!(
            run("(set! x 2)", &env),
            Err(EvalError::UnboundSymbol(_))
        ));
        run("(define x 1)", &env).unwrap();
        assert_eq!(
            run("(set! x 2)", &env).unwrap(),
            Value::Symbol("x".to_string())
        );
        assert_eq!(run("x", &env).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_lambda_application() {
        let env = setup();
        run("(define square (lambda (x) (* x x)))", &env).unwrap();
        assert_eq!(run("(square 2)", &env).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_lambda_body_is_a_sequence() {
        let env = setup();
        run("(define x 0)", &env).unwrap();
        run("(define f (lambda (n) (set! x n) (+ n 1)))", &env).unwrap();
        assert_eq!(run("(f 5)", &env).unwrap(), Value::Int(6));
        assert_eq!(run("x", &env).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_lambda_requires_body() {
        let env = setup();
        assert!(run("(lambda (x))", &env).is_err());
    }

    #[test]
    fn test_lambda_arity_checked_at_call() {
        let env = setup();
        run("(define f (lambda (a b) a))", &env).unwrap();
        assert!(run("(f 1)", &env).is_err());
        assert!(run("(f 1 2 3)", &env).is_err());
    }

    #[test]
    fn test_rest_parameter_collects_extra_arguments() {
        let env = setup();
        run("(define f (lambda (x &rest r) (cons x r)))", &env).unwrap();
        assert_eq!(run("(f 1 2 3)", &env).unwrap(), parse("(1 2 3)").unwrap());
        // no extra arguments leaves the rest parameter Nil
        assert_eq!(run("(f 1)", &env).unwrap(), parse("(1)").unwrap());
        // required arguments still required
        assert!(run("(f)", &env).is_err());
    }

    #[test]
    fn test_rest_parameter_alone() {
        let env = setup();
        run("(define f (lambda (&rest r) r))", &env).unwrap();
        assert_eq!(run("(f)", &env).unwrap(), Value::Nil);
        assert_eq!(run("(f 1 2)", &env).unwrap(), parse("(1 2)").unwrap());
    }

    #[test]
    fn test_misplaced_rest_marker_is_an_error() {
        let env = setup();
        assert!(run("(lambda (&rest) 1)", &env).is_err());
        assert!(run("(lambda (&rest a b) 1)", &env).is_err());
    }

    #[test]
    fn test_lexical_scope() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        run("(define f (lambda () x))", &env).unwrap();
        // a later define at the outer scope rebinds the same frame the
        // closure captured
        run("(define x 10)", &env).unwrap();
        assert_eq!(run("(f)", &env).unwrap(), Value::Int(10));
    }

    #[test]
    fn test_closure_captures_creation_site() {
        let env = setup();
        run(
            "(define make-adder (lambda (n) (lambda (m) (+ n m))))",
            &env,
        )
        .unwrap();
        run("(define add2 (make-adder 2))", &env).unwrap();
        run("(define add10 (make-adder 10))", &env).unwrap();
        assert_eq!(run("(add2 1)", &env).unwrap(), Value::Int(3));
        assert_eq!(run("(add10 1)", &env).unwrap(), Value::Int(11));
    }

    #[test]
    fn test_set_through_captured_frame() {
        let env = setup();
        run("(define counter 0)", &env).unwrap();
        run("(define bump (lambda () (set! counter (+ counter 1))))", &env).unwrap();
        run("(bump)", &env).unwrap();
        run("(bump)", &env).unwrap();
        assert_eq!(run("counter", &env).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_operands_evaluate_left_to_right() {
        let env = setup();
        run("(define x 1)", &env).unwrap();
        let result = run("(cons (begin (set! x 2) x) (begin (set! x 3) x))", &env).unwrap();
        assert_eq!(result, Value::cons(Value::Int(2), Value::Int(3)));
    }

    #[test]
    fn test_quasiquote_without_unquote_is_quote() {
        let env = setup();
        assert_eq!(run("`(1 2 3)", &env).unwrap(), parse("(1 2 3)").unwrap());
        assert_eq!(run("`foo", &env).unwrap(), Value::Symbol("foo".to_string()));
    }

    #[test]
    fn test_quasiquote_unquote_evaluates() {
        let env = setup();
        assert_eq!(
            run("`(1 ,(+ 1 1) 3)", &env).unwrap(),
            parse("(1 2 3)").unwrap()
        );
        assert_eq!(run("`,(+ 1 2)", &env).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_quasiquote_splicing() {
        let env = setup();
        assert_eq!(
            run("`(1 2 ,@(cons 3 '()))", &env).unwrap(),
            parse("(1 2 3)").unwrap()
        );
        assert_eq!(
            run("`(1 ,@'(2 3) 4)", &env).unwrap(),
            parse("(1 2 3 4)").unwrap()
        );
        assert_eq!(run("`(,@'())", &env).unwrap(), Value::Nil);
    }

    #[test]
    fn test_quasiquote_splicing_requires_proper_list() {
        let env = setup();
        assert!(run("`(1 ,@2)", &env).is_err());
    }

    #[test]
    fn test_splicing_at_template_top_is_an_error() {
        let env = setup();
        assert!(run("`,@'(1 2)", &env).is_err());
    }

    #[test]
    fn test_unquote_outside_quasiquote_is_an_error() {
        let env = setup();
        assert!(matches!(
            run(",x", &env),
            Err(EvalError::StrayUnquote("unquote"))
        ));
        assert!(matches!(
            run(",@x", &env),
            Err(EvalError::StrayUnquote("unquote-splicing"))
        ));
    }

    #[test]
    fn test_applying_non_procedure_is_an_error() {
        let env = setup();
        assert!(matches!(
            run("(1 2)", &env),
            Err(EvalError::NotCallable(_))
        ));
    }

    #[test]
    fn test_quote_neutralizes_evaluation() {
        let env = setup();
        for source in ["foo", "(+ 1 2)", "(1 2 3)", "#t", "\"hi\""] {
            let quoted = format!("(quote {})", source);
            assert_eq!(run(&quoted, &env).unwrap(), parse(source).unwrap());
        }
    }
}
