use rand::Rng;
use sprig_core::{check_arity, Builtin, EvalContext, EvalError, Value};

use crate::eval::{apply_callable, EvalResult};

/// Argument-count validation run before any call argument evaluates.
/// `apply_builtin` re-checks for direct applications (`.reduce`).
pub(crate) fn precheck_arity(b: Builtin, argc: usize) -> Result<(), EvalError> {
    let (ok, expected) = match b {
        Builtin::Add
        | Builtin::Sub
        | Builtin::Mul
        | Builtin::Div
        | Builtin::Lt
        | Builtin::Le
        | Builtin::Gt
        | Builtin::Ge
        | Builtin::StructEq
        | Builtin::NumEq => (argc == 2, "2"),
        Builtin::Seq | Builtin::First | Builtin::Next | Builtin::Rest | Builtin::Print => {
            (argc == 1, "1")
        }
        Builtin::Conj => (argc >= 2, "2+"),
        Builtin::Reduce => ((2..=3).contains(&argc), "2-3"),
        Builtin::Rand => (argc == 0, "0"),
        Builtin::List | Builtin::Concat => (true, ""),
    };
    if ok {
        Ok(())
    } else {
        Err(EvalError::arity(b.name(), expected, argc))
    }
}

pub fn apply_builtin(ctx: &EvalContext, b: Builtin, args: &[Value]) -> EvalResult {
    match b {
        Builtin::Add => {
            check_arity!(args, ".+", 2);
            numeric_binop(&args[0], &args[1], |a, b| a.wrapping_add(b), |a, b| a + b)
        }
        Builtin::Sub => {
            check_arity!(args, ".-", 2);
            numeric_binop(&args[0], &args[1], |a, b| a.wrapping_sub(b), |a, b| a - b)
        }
        Builtin::Mul => {
            check_arity!(args, ".*", 2);
            numeric_binop(&args[0], &args[1], |a, b| a.wrapping_mul(b), |a, b| a * b)
        }
        Builtin::Div => {
            check_arity!(args, "./", 2);
            divide(&args[0], &args[1])
        }
        Builtin::Lt => compare(".<", args, |o| o == std::cmp::Ordering::Less),
        Builtin::Le => compare(".<=", args, |o| o != std::cmp::Ordering::Greater),
        Builtin::Gt => compare(".>", args, |o| o == std::cmp::Ordering::Greater),
        Builtin::Ge => compare(".>=", args, |o| o != std::cmp::Ordering::Less),
        Builtin::StructEq => {
            check_arity!(args, ".=", 2);
            Ok(Value::Bool(args[0] == args[1]))
        }
        Builtin::NumEq => {
            check_arity!(args, ".==", 2);
            numeric_eq(&args[0], &args[1])
        }
        Builtin::List => Ok(Value::list(args.to_vec())),
        Builtin::Concat => concat(args),
        Builtin::Seq => {
            check_arity!(args, ".seq", 1);
            seq_value(&args[0])
        }
        Builtin::First => {
            check_arity!(args, ".first", 1);
            first_value(&args[0])
        }
        Builtin::Next => {
            check_arity!(args, ".next", 1);
            next_value(&args[0])
        }
        Builtin::Rest => {
            check_arity!(args, ".rest", 1);
            rest_value(&args[0])
        }
        Builtin::Conj => {
            check_arity!(args, ".conj", 2..);
            let mut coll = args[0].clone();
            for x in &args[1..] {
                coll = conj_one(&coll, x)?;
            }
            Ok(coll)
        }
        Builtin::Reduce => reduce(ctx, args),
        Builtin::Rand => {
            check_arity!(args, ".rand", 0);
            Ok(Value::Float(rand::rng().random::<f64>()))
        }
        Builtin::Print => {
            check_arity!(args, ".print", 1);
            ctx.write_output(&args[0].display_string())
                .map_err(|e| EvalError::custom(format!(".print: {e}")))?;
            Ok(Value::Nil)
        }
    }
}

fn not_a_number(v: &Value) -> EvalError {
    EvalError::invalid_argument("number", v.type_name())
}

/// Int op for two ints, float op otherwise. Int arithmetic wraps in
/// two's complement.
fn numeric_binop(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> EvalResult {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int_op(*x, *y))),
        _ => {
            let x = a.as_f64().ok_or_else(|| not_a_number(a))?;
            let y = b.as_f64().ok_or_else(|| not_a_number(b))?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

/// Integer division truncates toward zero; any zero divisor is an error.
fn divide(a: &Value, b: &Value) -> EvalResult {
    match b {
        Value::Int(0) => return Err(EvalError::DivideByZero),
        Value::Float(f) if *f == 0.0 => return Err(EvalError::DivideByZero),
        _ => {}
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x.wrapping_div(*y))),
        _ => {
            let x = a.as_f64().ok_or_else(|| not_a_number(a))?;
            let y = b.as_f64().ok_or_else(|| not_a_number(b))?;
            Ok(Value::Float(x / y))
        }
    }
}

fn compare(name: &str, args: &[Value], ord_ok: fn(std::cmp::Ordering) -> bool) -> EvalResult {
    check_arity!(args, name, 2);
    let ord = match (&args[0], &args[1]) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (a, b) => {
            let x = a.as_f64().ok_or_else(|| not_a_number(a))?;
            let y = b.as_f64().ok_or_else(|| not_a_number(b))?;
            match x.partial_cmp(&y) {
                Some(o) => o,
                // An incomparable pair (NaN) satisfies no ordering.
                None => return Ok(Value::Bool(false)),
            }
        }
    };
    Ok(Value::Bool(ord_ok(ord)))
}

/// Numeric equality with cross-type promotion.
fn numeric_eq(a: &Value, b: &Value) -> EvalResult {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Bool(x == y)),
        _ => {
            let x = a.as_f64().ok_or_else(|| not_a_number(a))?;
            let y = b.as_f64().ok_or_else(|| not_a_number(b))?;
            Ok(Value::Bool(x == y))
        }
    }
}

/// A list view of any seqable value: nil is empty, strings yield chars,
/// maps yield two-element vectors.
pub(crate) fn sequence_items(v: &Value) -> Option<Vec<Value>> {
    match v {
        Value::Nil => Some(Vec::new()),
        Value::List(items) | Value::Vector(items) => Some(items.as_ref().clone()),
        Value::Str(s) => Some(s.chars().map(Value::Char).collect()),
        Value::Map(m) => Some(
            m.iter()
                .map(|(k, v)| Value::vector(vec![k.clone(), v.clone()]))
                .collect(),
        ),
        _ => None,
    }
}

fn seqable(v: &Value) -> Result<Vec<Value>, EvalError> {
    sequence_items(v)
        .ok_or_else(|| EvalError::invalid_argument("seqable collection", v.type_name()))
}

/// nil or empty yields nil, anything else a list view.
pub(crate) fn seq_value(v: &Value) -> EvalResult {
    let items = seqable(v)?;
    if items.is_empty() {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items))
    }
}

pub(crate) fn first_value(v: &Value) -> EvalResult {
    let items = seqable(v)?;
    Ok(items.first().cloned().unwrap_or(Value::Nil))
}

/// Like `(.seq (.rest x))`: nil when exhausted.
pub(crate) fn next_value(v: &Value) -> EvalResult {
    let items = seqable(v)?;
    if items.len() <= 1 {
        Ok(Value::Nil)
    } else {
        Ok(Value::list(items[1..].to_vec()))
    }
}

/// Always a (possibly empty) list.
pub(crate) fn rest_value(v: &Value) -> EvalResult {
    let items = seqable(v)?;
    if items.is_empty() {
        Ok(Value::list(Vec::new()))
    } else {
        Ok(Value::list(items[1..].to_vec()))
    }
}

/// Flatten a mix of seqables into one list.
fn concat(args: &[Value]) -> EvalResult {
    let mut out = Vec::new();
    for arg in args {
        out.extend(seqable(arg)?);
    }
    Ok(Value::list(out))
}

/// Polymorphic conj: lists prepend, vectors append, maps merge
/// two-element entries, strings and nil conj as lists.
fn conj_one(coll: &Value, x: &Value) -> EvalResult {
    match coll {
        Value::List(items) => {
            let mut out = Vec::with_capacity(items.len() + 1);
            out.push(x.clone());
            out.extend(items.iter().cloned());
            Ok(Value::list(out))
        }
        Value::Vector(items) => {
            let mut out = items.as_ref().clone();
            out.push(x.clone());
            Ok(Value::vector(out))
        }
        Value::Map(m) => {
            let entry = x
                .as_slice()
                .filter(|s| s.len() == 2)
                .ok_or_else(|| EvalError::invalid_argument("two-element entry", x.type_name()))?;
            let mut out = m.as_ref().clone();
            out.insert(entry[0].clone(), entry[1].clone());
            Ok(Value::map(out))
        }
        Value::Nil => Ok(Value::list(vec![x.clone()])),
        Value::Str(s) => {
            let mut out = vec![x.clone()];
            out.extend(s.chars().map(Value::Char));
            Ok(Value::list(out))
        }
        other => Err(EvalError::invalid_argument(
            "collection",
            other.type_name(),
        )),
    }
}

/// `(.reduce f coll)` or `(.reduce f init coll)`: a standard left fold.
/// Without an init, an empty collection calls `f` with no arguments and a
/// singleton yields its element.
fn reduce(ctx: &EvalContext, args: &[Value]) -> EvalResult {
    check_arity!(args, ".reduce", 2..=3);
    let f = &args[0];
    let (mut acc, items) = if args.len() == 2 {
        let items = seqable(&args[1])?;
        match items.split_first() {
            None => return apply_callable(ctx, f, &[]),
            Some((head, tail)) => (head.clone(), tail.to_vec()),
        }
    } else {
        (args[1].clone(), seqable(&args[2])?)
    };
    for item in &items {
        acc = apply_callable(ctx, f, &[acc, item.clone()])?;
    }
    Ok(acc)
}
