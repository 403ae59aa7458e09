mod common;

use common::{eval, eval_with_output};
use sprig::Value;

fn ints(ns: &[i64]) -> Value {
    Value::list(ns.iter().map(|n| Value::Int(*n)).collect())
}

#[test]
fn test_predicates() {
    assert_eq!(eval("(not nil)"), Value::Bool(true));
    assert_eq!(eval("(not 1)"), Value::Bool(false));
    assert_eq!(eval("(nil? nil)"), Value::Bool(true));
    assert_eq!(eval("(nil? false)"), Value::Bool(false));
    assert_eq!(eval("(some? 0)"), Value::Bool(true));
    assert_eq!(eval("(zero? 0.0)"), Value::Bool(true));
    assert_eq!(eval("(pos? 2)"), Value::Bool(true));
    assert_eq!(eval("(neg? -2.5)"), Value::Bool(true));
    assert_eq!(eval("(identity :x)"), Value::keyword("x"));
}

#[test]
fn test_inc_dec() {
    assert_eq!(eval("(inc 1)"), Value::Int(2));
    assert_eq!(eval("(dec 1.5)"), Value::Float(0.5));
}

#[test]
fn test_list_and_seq_wrappers() {
    assert_eq!(eval("(list 1 2 3)"), ints(&[1, 2, 3]));
    assert_eq!(eval("(list)"), ints(&[]));
    assert_eq!(eval("(seq [1 2])"), ints(&[1, 2]));
    assert_eq!(eval("(seq '())"), Value::Nil);
    assert_eq!(eval("(next '(1 2))"), ints(&[2]));
    assert_eq!(eval("(second '(1 2 3))"), Value::Int(2));
    assert_eq!(eval("(last '(1 2 3))"), Value::Int(3));
    assert_eq!(eval("(last '())"), Value::Nil);
    assert_eq!(eval("(conj '(2) 1)"), ints(&[1, 2]));
}

#[test]
fn test_count_and_empty() {
    assert_eq!(eval("(count '(1 2 3))"), Value::Int(3));
    assert_eq!(eval("(count [])"), Value::Int(0));
    assert_eq!(eval("(count \"abc\")"), Value::Int(3));
    assert_eq!(eval("(count {:a 1 :b 2})"), Value::Int(2));
    assert_eq!(eval("(empty? '())"), Value::Bool(true));
    assert_eq!(eval("(empty? nil)"), Value::Bool(true));
    assert_eq!(eval("(empty? '(1))"), Value::Bool(false));
}

#[test]
fn test_reverse_and_range() {
    assert_eq!(eval("(reverse '(1 2 3))"), ints(&[3, 2, 1]));
    assert_eq!(eval("(range 4)"), ints(&[0, 1, 2, 3]));
    assert_eq!(eval("(range 0)"), ints(&[]));
}

#[test]
fn test_map_filter() {
    assert_eq!(eval("(map inc '(1 2 3))"), ints(&[2, 3, 4]));
    assert_eq!(eval("(map inc nil)"), ints(&[]));
    assert_eq!(eval("(filter pos? '(-1 2 -3 4))"), ints(&[2, 4]));
    assert_eq!(eval("(map #(.* % %) (range 4))"), ints(&[0, 1, 4, 9]));
    assert_eq!(
        eval("(filter (fn [kv] (pos? (kv 1))) {:a 1 :b -1})"),
        eval("(list [:a 1])")
    );
}

#[test]
fn test_print_output() {
    let (val, out) = eval_with_output("(println \"hi\")");
    assert_eq!(val, Value::Nil);
    assert_eq!(out, "hi\n");

    let (_, out) = eval_with_output("(print 42)");
    assert_eq!(out, "42");

    // Strings and chars print raw, other values in readable form.
    let (_, out) = eval_with_output("(do (.print \\a) (.print \"b\") (.print :c))");
    assert_eq!(out, "ab:c");

    let (_, out) = eval_with_output("(print '(1 \"s\"))");
    assert_eq!(out, "(1 \"s\")");
}

#[test]
fn test_arguments_evaluate_left_to_right_for_collection_heads() {
    let (val, out) = eval_with_output("([10 20] (do (print \"a\") 0))");
    assert_eq!(val, Value::Int(10));
    assert_eq!(out, "a");

    let (val, out) = eval_with_output("({:k 1} (do (print \"b\") :k))");
    assert_eq!(val, Value::Int(1));
    assert_eq!(out, "b");

    let (_, out) = eval_with_output("(.list (print \"1\") (print \"2\") (print \"3\"))");
    assert_eq!(out, "123");
}

#[test]
fn test_rand() {
    for _ in 0..16 {
        match eval("(rand)") {
            Value::Float(f) => assert!((0.0..1.0).contains(&f)),
            other => panic!("expected float, got {other:?}"),
        }
    }
}

#[test]
fn test_variadic_arithmetic_wrappers() {
    assert_eq!(eval("(+ 1 2 3 4)"), Value::Int(10));
    assert_eq!(eval("(- 10 1 2)"), Value::Int(7));
    assert_eq!(eval("(* 2 3 4)"), Value::Int(24));
    assert_eq!(eval("(/ 24 2 3)"), Value::Int(4));
    assert_eq!(eval("(/ 2.0)"), Value::Float(0.5));
}
