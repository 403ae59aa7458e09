use std::rc::Rc;

use sprig_core::{
    intern, Arity, Binding, Env, EvalContext, EvalError, Lambda, Macro, Special, Spur, Value,
};

use crate::builtins;
use crate::eval::{self, eval_checked, eval_do_body, EvalResult};

pub fn eval_special(ctx: &EvalContext, sf: Special, args: &[Value], env: &Env) -> EvalResult {
    match sf {
        Special::Quote => eval_quote(args),
        Special::If => eval_if(ctx, args, env),
        Special::Do => eval_do_body(ctx, args, env),
        Special::Def => eval_def(ctx, args, env),
        Special::Let => eval_let(ctx, args, env),
        Special::Fn => eval_fn(args, env),
        Special::Defmacro => eval_defmacro(args, env),
        Special::Loop => eval_loop(ctx, args, env),
        Special::Recur => eval_recur(ctx, args, env),
        Special::Cons => eval_cons(ctx, args, env),
        Special::First => eval_first(ctx, args, env),
        Special::Rest => eval_rest(ctx, args, env),
    }
}

fn eval_quote(args: &[Value]) -> EvalResult {
    if args.len() != 1 {
        return Err(EvalError::arity("quote", "1", args.len()));
    }
    Ok(args[0].clone())
}

fn eval_if(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.len() < 2 || args.len() > 3 {
        return Err(EvalError::arity("if", "2-3", args.len()));
    }
    let test = eval_checked(ctx, &args[0], env)?;
    if test.is_truthy() {
        eval::eval_value(ctx, &args[1], env)
    } else if args.len() == 3 {
        eval::eval_value(ctx, &args[2], env)
    } else {
        Ok(Value::Nil)
    }
}

/// `(def sym)` declares an unbound var, `(def sym expr)` binds it. Both
/// write to the root frame; redefinitions replace.
fn eval_def(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(EvalError::arity("def", "1-2", args.len()));
    }
    let spur = args[0]
        .as_symbol_spur()
        .ok_or_else(|| EvalError::invalid_argument("symbol", args[0].type_name()))?;
    let binding = if args.len() == 2 {
        Binding::Bound(eval_checked(ctx, &args[1], env)?)
    } else {
        Binding::Unbound
    };
    env.define_global(spur, binding);
    Ok(args[0].clone())
}

/// Parse a let/loop binding sequence into symbol/value pairs, evaluating
/// each init in the frame so later pairs see earlier ones.
fn bind_pairs(
    ctx: &EvalContext,
    name: &str,
    form: &Value,
    frame: &Env,
) -> Result<Vec<Spur>, EvalError> {
    // Vectors are the written syntax; syntax-quote rebuilds them as lists.
    let pairs = form
        .as_slice()
        .ok_or_else(|| EvalError::invalid_argument("binding vector", form.type_name()))?;
    if pairs.len() % 2 != 0 {
        return Err(EvalError::invalid_argument(
            format!("{name} bindings in symbol/expression pairs"),
            format!("{} forms", pairs.len()),
        ));
    }
    let mut symbols = Vec::with_capacity(pairs.len() / 2);
    for chunk in pairs.chunks_exact(2) {
        let spur = chunk[0]
            .as_symbol_spur()
            .ok_or_else(|| EvalError::invalid_argument("symbol", chunk[0].type_name()))?;
        let val = eval_checked(ctx, &chunk[1], frame)?;
        frame.set(spur, val);
        symbols.push(spur);
    }
    Ok(symbols)
}

fn eval_let(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.is_empty() {
        return Err(EvalError::arity("let", "1+", 0));
    }
    let frame = Env::with_parent(Rc::new(env.clone()));
    bind_pairs(ctx, "let", &args[0], &frame)?;
    eval_do_body(ctx, &args[1..], &frame)
}

/// `(loop [bindings] body...)`: like let, but the body may tail-call
/// `recur` to rebind and re-run in a fresh frame.
fn eval_loop(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.is_empty() {
        return Err(EvalError::arity("loop", "1+", 0));
    }
    let frame = Env::with_parent(Rc::new(env.clone()));
    let symbols = bind_pairs(ctx, "loop", &args[0], &frame)?;
    let body = &args[1..];

    let mut current = frame;
    loop {
        match eval_do_body(ctx, body, &current)? {
            Value::Recur(vals) => {
                if vals.len() != symbols.len() {
                    return Err(EvalError::arity(
                        "loop",
                        symbols.len().to_string(),
                        vals.len(),
                    ));
                }
                let next = Env::with_parent(Rc::new(env.clone()));
                for (spur, val) in symbols.iter().zip(vals.iter()) {
                    next.set(*spur, val.clone());
                }
                current = next;
            }
            v => return Ok(v),
        }
    }
}

fn eval_recur(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    let mut vals = Vec::with_capacity(args.len());
    for arg in args {
        vals.push(eval_checked(ctx, arg, env)?);
    }
    Ok(Value::Recur(Rc::new(vals)))
}

/// `(fn name? [params] body...)` or `(fn name? ([params] body...) ...)`.
fn eval_fn(args: &[Value], env: &Env) -> EvalResult {
    let (name, rest) = match args.first() {
        Some(Value::Symbol(s)) => (Some(*s), &args[1..]),
        _ => (None, args),
    };
    let arities = parse_arities("fn", rest)?;
    Ok(Value::lambda(Lambda {
        arities,
        env: env.clone(),
        name,
    }))
}

/// `(defmacro name [params] body...)`: single arity, registered in the
/// root frame, no captured environment.
fn eval_defmacro(args: &[Value], env: &Env) -> EvalResult {
    if args.len() < 2 {
        return Err(EvalError::arity("defmacro", "2+", args.len()));
    }
    let name = args[0]
        .as_symbol_spur()
        .ok_or_else(|| EvalError::invalid_argument("symbol", args[0].type_name()))?;
    let (params, rest) = parse_params("defmacro", &args[1])?;
    let mac = Macro {
        params,
        rest,
        body: args[2..].to_vec(),
        name,
    };
    env.define_global(name, Binding::MacroDef(Rc::new(mac)));
    Ok(args[0].clone())
}

fn eval_cons(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.len() != 2 {
        return Err(EvalError::arity("cons", "2", args.len()));
    }
    let head = eval_checked(ctx, &args[0], env)?;
    let tail = eval_checked(ctx, &args[1], env)?;
    let items = builtins::sequence_items(&tail)
        .ok_or_else(|| EvalError::invalid_argument("seqable collection", tail.type_name()))?;
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(head);
    out.extend(items);
    Ok(Value::list(out))
}

fn eval_first(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.len() != 1 {
        return Err(EvalError::arity("first", "1", args.len()));
    }
    let v = eval_checked(ctx, &args[0], env)?;
    builtins::first_value(&v)
}

fn eval_rest(ctx: &EvalContext, args: &[Value], env: &Env) -> EvalResult {
    if args.len() != 1 {
        return Err(EvalError::arity("rest", "1", args.len()));
    }
    let v = eval_checked(ctx, &args[0], env)?;
    builtins::rest_value(&v)
}

/// Parse fn arity forms: either a single `[params] body...` or one or
/// more `([params] body...)` clauses.
fn parse_arities(name: &str, forms: &[Value]) -> Result<Vec<Arity>, EvalError> {
    let first = forms
        .first()
        .ok_or_else(|| EvalError::arity(name, "1+", 0))?;

    // A clause list starts with its own parameter sequence; a bare list of
    // symbols (macro-built) is a single-arity parameter sequence.
    let multi_arity = matches!(
        first,
        Value::List(items) if matches!(items.first(), Some(Value::List(_) | Value::Vector(_)))
    );

    let mut arities = Vec::new();
    if multi_arity {
        for clause in forms {
            let items = clause.as_list().ok_or_else(|| {
                EvalError::invalid_argument("arity clause list", clause.type_name())
            })?;
            let params_form = items
                .first()
                .ok_or_else(|| EvalError::invalid_argument("parameter vector", "empty list"))?;
            let (params, rest) = parse_params(name, params_form)?;
            arities.push(Arity {
                params,
                rest,
                body: items[1..].to_vec(),
            });
        }
    } else {
        let (params, rest) = parse_params(name, first)?;
        arities.push(Arity {
            params,
            rest,
            body: forms[1..].to_vec(),
        });
    }

    // Overlapping arities would make dispatch ambiguous.
    for (i, a) in arities.iter().enumerate() {
        for b in &arities[i + 1..] {
            if a.rest.is_some() && b.rest.is_some() {
                return Err(EvalError::invalid_argument(
                    "at most one variadic arity",
                    "several",
                ));
            }
            if a.rest.is_none() && b.rest.is_none() && a.params.len() == b.params.len() {
                return Err(EvalError::invalid_argument(
                    "distinct arities",
                    format!("duplicate arity {}", a.params.len()),
                ));
            }
        }
    }

    Ok(arities)
}

/// Parse a parameter sequence; `& tail` declares a variadic rest
/// parameter.
fn parse_params(name: &str, form: &Value) -> Result<(Vec<Spur>, Option<Spur>), EvalError> {
    let items = form
        .as_slice()
        .ok_or_else(|| EvalError::invalid_argument("parameter vector", form.type_name()))?;
    let ampersand = intern("&");
    let mut params = Vec::new();
    let mut rest = None;
    let mut i = 0;
    while i < items.len() {
        let spur = items[i]
            .as_symbol_spur()
            .ok_or_else(|| EvalError::invalid_argument("parameter symbol", items[i].type_name()))?;
        if spur == ampersand {
            if i + 2 != items.len() {
                return Err(EvalError::invalid_argument(
                    format!("{name} variadic tail `& more`"),
                    format!("{} forms after `&`", items.len() - i - 1),
                ));
            }
            let tail = items[i + 1].as_symbol_spur().ok_or_else(|| {
                EvalError::invalid_argument("rest parameter symbol", items[i + 1].type_name())
            })?;
            rest = Some(tail);
            break;
        }
        params.push(spur);
        i += 1;
    }
    Ok((params, rest))
}
