mod common;

use common::{eval, eval_err, interp, read_err};
use sprig::{EvalError, EvalOutcome, ReadError, Value};

#[test]
fn test_arity_errors() {
    assert!(matches!(eval_err("((fn [x] x))"), EvalError::Arity { .. }));
    assert!(matches!(
        eval_err("((fn [x] x) 1 2)"),
        EvalError::Arity { .. }
    ));
    assert!(matches!(eval_err("(quote)"), EvalError::Arity { .. }));
    assert!(matches!(eval_err("(quote a b)"), EvalError::Arity { .. }));
    assert!(matches!(eval_err("(if 1)"), EvalError::Arity { .. }));
    assert!(matches!(eval_err("(.+ 1)"), EvalError::Arity { .. }));
    assert!(matches!(eval_err("(.seq)"), EvalError::Arity { .. }));
    assert!(matches!(eval_err("(:a)"), EvalError::Arity { .. }));
    assert!(matches!(
        eval_err("((fn [x & xs] x))"),
        EvalError::Arity { .. }
    ));
}

#[test]
fn test_arity_mismatch_stops_before_evaluating_extra_args() {
    // The mismatch is detected from the argument count alone; no argument
    // runs, so the unresolvable symbol never errors first.
    assert!(matches!(
        eval_err("(quote a (boom))"),
        EvalError::Arity { .. }
    ));
    assert!(matches!(
        eval_err("((fn [x] x) (boom) (boom2))"),
        EvalError::Arity { .. }
    ));
    assert!(matches!(
        eval_err("(.rand (boom))"),
        EvalError::Arity { .. }
    ));
}

#[test]
fn test_invalid_argument_errors() {
    assert!(matches!(
        eval_err("(.+ 1 \"a\")"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(.< 1 :k)"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(.== 1 \"x\")"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(.seq 42)"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(let 5 1)"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(def 5 1)"),
        EvalError::InvalidArgument { .. }
    ));
    assert!(matches!(
        eval_err("(.conj {:a 1} 2)"),
        EvalError::InvalidArgument { .. }
    ));
}

#[test]
fn test_divide_by_zero() {
    assert_eq!(eval_err("(./ 1 0)"), EvalError::DivideByZero);
    assert_eq!(eval_err("(./ 1.0 0.0)"), EvalError::DivideByZero);
    assert_eq!(eval_err("(/ 3 0)"), EvalError::DivideByZero);
}

#[test]
fn test_symbol_resolution_errors() {
    assert_eq!(
        eval_err("nope"),
        EvalError::InvalidSymbol("nope".to_string())
    );
    assert_eq!(
        eval_err("(nope 1)"),
        EvalError::InvalidSymbol("nope".to_string())
    );
    assert_eq!(eval_err("(def u) u"), EvalError::Unbound("u".to_string()));
    // Rebinding an unbound var fixes it.
    assert_eq!(eval("(def u) (def u 3) u"), Value::Int(3));
}

#[test]
fn test_not_evalable() {
    assert_eq!(eval_err("(1 2)"), EvalError::NotEvalable("int".to_string()));
    assert_eq!(
        eval_err("(\"s\" 1)"),
        EvalError::NotEvalable("string".to_string())
    );
    assert_eq!(
        eval_err("(nil 1)"),
        EvalError::NotEvalable("nil".to_string())
    );
}

#[test]
fn test_recur_misuse() {
    assert_eq!(eval_err("(recur 1)"), EvalError::RecurMisuse);
    assert_eq!(eval_err("(do (recur 1) 2)"), EvalError::RecurMisuse);
    assert_eq!(
        eval_err("((fn [x] (+ 1 (recur 0))) 5)"),
        EvalError::RecurMisuse
    );
    assert_eq!(eval_err("(let [x (recur 1)] x)"), EvalError::RecurMisuse);
    assert_eq!(eval_err("[(recur 1)]"), EvalError::RecurMisuse);
}

#[test]
fn test_recur_arity_mismatch() {
    assert!(matches!(
        eval_err("(loop [a 1] (recur 1 2))"),
        EvalError::Arity { .. }
    ));
    assert!(matches!(
        eval_err("((fn [x y] (recur 1)) 1 2)"),
        EvalError::Arity { .. }
    ));
}

#[test]
fn test_read_failures_surface_in_outcome() {
    assert!(matches!(
        read_err("(1 2"),
        ReadError::MismatchedDelimiter { .. }
    ));
    assert_eq!(read_err("~x"), ReadError::MismatchedReaderMacro);
    assert_eq!(read_err("{:a}"), ReadError::MapKeyValueMismatch { count: 1 });
    assert_eq!(read_err(""), ReadError::EmptyInput);
    assert!(matches!(read_err("#q"), ReadError::InvalidDispatchMacro { .. }));
}

#[test]
fn test_outcome_variants() {
    let interp = interp();
    assert!(matches!(
        interp.evaluate("(+ 1 2)"),
        EvalOutcome::Success(Value::Int(3))
    ));
    assert!(matches!(
        interp.evaluate("(oops)"),
        EvalOutcome::EvalFailure(_)
    ));
    assert!(matches!(interp.evaluate("("), EvalOutcome::ReadFailure(_)));
}

#[test]
fn test_defs_before_a_failure_persist() {
    let interp = interp();
    assert!(interp.eval_str("(def ok 1) (boom)").is_err());
    assert_eq!(interp.eval_str("ok").unwrap(), Value::Int(1));
}

#[test]
fn test_macro_arity() {
    assert!(matches!(
        eval_err("(defmacro m [a b] `(~a ~b)) (m 1)"),
        EvalError::Arity { .. }
    ));
}
