use std::collections::BTreeMap;
use std::rc::Rc;

use sprig_core::{
    resolve, Arity, Binding, Env, EvalContext, EvalError, EvalOutcome, Lambda, Macro, Spur, Value,
};

use crate::{builtins, prelude, special_forms};

pub type EvalResult = Result<Value, EvalError>;

/// The interpreter: a root environment plus per-instance state (the
/// output sink). Definitions persist across `evaluate` calls.
pub struct Interpreter {
    pub global_env: Rc<Env>,
    pub ctx: EvalContext,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// A bare interpreter with an empty root environment. Most callers
    /// want [`Interpreter::load_stdlib`] right after.
    pub fn new() -> Self {
        Interpreter {
            global_env: Rc::new(Env::new()),
            ctx: EvalContext::new(),
        }
    }

    /// Evaluate the bootstrap standard library against the root
    /// environment, registering `defn`, `and`, `or`, `map`, `+`, etc.
    pub fn load_stdlib(&self) -> EvalOutcome {
        self.evaluate(prelude::STDLIB)
    }

    /// Drop every global binding and reload the standard library.
    pub fn reset(&mut self) -> EvalOutcome {
        self.global_env = Rc::new(Env::new());
        self.load_stdlib()
    }

    /// Redirect `.print` output.
    pub fn set_output(&self, sink: Box<dyn std::io::Write>) {
        self.ctx.set_output(sink);
    }

    /// Read, expand, and evaluate every top-level form in `source`,
    /// returning the last result. The first failure short-circuits;
    /// definitions made before it persist.
    pub fn evaluate(&self, source: &str) -> EvalOutcome {
        let forms = match sprig_reader::read_program(source) {
            Ok(forms) => forms,
            Err(e) => return EvalOutcome::ReadFailure(e),
        };
        let mut result = Value::Nil;
        for form in &forms {
            match eval_value(&self.ctx, form, &self.global_env) {
                // A recur sentinel escaping the outermost form.
                Ok(Value::Recur(_)) => return EvalOutcome::EvalFailure(EvalError::RecurMisuse),
                Ok(v) => result = v,
                Err(e) => return EvalOutcome::EvalFailure(e),
            }
        }
        EvalOutcome::Success(result)
    }
}

/// The core eval function: evaluate a form in an environment.
pub fn eval_value(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    match expr {
        Value::Symbol(spur) => match env.get(*spur) {
            None => Err(EvalError::InvalidSymbol(resolve(*spur))),
            Some(Binding::Unbound) => Err(EvalError::Unbound(resolve(*spur))),
            Some(Binding::Bound(v)) => Ok(v),
            Some(Binding::MacroDef(m)) => Ok(Value::Macro(m)),
        },

        Value::Vector(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(eval_checked(ctx, item, env)?);
            }
            Ok(Value::vector(out))
        }

        Value::Map(m) => {
            let mut out = BTreeMap::new();
            for (k, v) in m.iter() {
                out.insert(eval_checked(ctx, k, env)?, eval_checked(ctx, v, env)?);
            }
            Ok(Value::map(out))
        }

        Value::List(items) => {
            if items.is_empty() {
                return Ok(expr.clone());
            }
            let head = eval_value(ctx, &items[0], env)?;
            let args = &items[1..];
            match head {
                // Special forms see their arguments unevaluated.
                Value::Special(sf) => special_forms::eval_special(ctx, sf, args, env),
                Value::Macro(mac) => {
                    let expansion = apply_macro(ctx, &mac, args, env)?;
                    eval_value(ctx, &expansion, env)
                }
                callable => {
                    // The argument count alone decides an arity mismatch,
                    // so it is checked before any argument evaluates.
                    arity_precheck(&callable, args.len())?;
                    let evaled = eval_args(ctx, args, env)?;
                    apply_callable(ctx, &callable, &evaled)
                }
            }
        }

        // Everything else self-evaluates.
        other => Ok(other.clone()),
    }
}

/// Evaluate in a non-tail position: a recur sentinel here is misuse.
pub(crate) fn eval_checked(ctx: &EvalContext, expr: &Value, env: &Env) -> EvalResult {
    match eval_value(ctx, expr, env)? {
        Value::Recur(_) => Err(EvalError::RecurMisuse),
        v => Ok(v),
    }
}

/// Evaluate call arguments left to right.
fn eval_args(ctx: &EvalContext, args: &[Value], env: &Env) -> Result<Vec<Value>, EvalError> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        out.push(eval_checked(ctx, arg, env)?);
    }
    Ok(out)
}

fn arity_precheck(callable: &Value, argc: usize) -> Result<(), EvalError> {
    match callable {
        Value::Lambda(l) => select_arity(l, argc).map(|_| ()),
        Value::Builtin(b) => builtins::precheck_arity(*b, argc),
        Value::Vector(_) if argc != 1 => Err(EvalError::arity("vector", "1", argc)),
        Value::Map(_) if !(1..=2).contains(&argc) => Err(EvalError::arity("map", "1-2", argc)),
        Value::Keyword(_) | Value::Symbol(_) if !(1..=2).contains(&argc) => {
            Err(EvalError::arity(callable.type_name(), "1-2", argc))
        }
        _ => Ok(()),
    }
}

/// Apply an already-evaluated callable to already-evaluated arguments.
/// Shared between list application and higher-order built-ins.
pub fn apply_callable(ctx: &EvalContext, callable: &Value, args: &[Value]) -> EvalResult {
    match callable {
        Value::Builtin(b) => builtins::apply_builtin(ctx, *b, args),
        Value::Lambda(l) => apply_lambda(ctx, l, args),

        // A vector in function position indexes itself.
        Value::Vector(items) => {
            if args.len() != 1 {
                return Err(EvalError::arity("vector", "1", args.len()));
            }
            let index = args[0]
                .as_int()
                .ok_or_else(|| EvalError::invalid_argument("int index", args[0].type_name()))?;
            if index < 0 || index as usize >= items.len() {
                return Err(EvalError::OutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            Ok(items[index as usize].clone())
        }

        // A map looks up its first argument, with an optional default.
        Value::Map(m) => {
            if args.is_empty() || args.len() > 2 {
                return Err(EvalError::arity("map", "1-2", args.len()));
            }
            match m.get(&args[0]) {
                Some(v) => Ok(v.clone()),
                None => Ok(args.get(1).cloned().unwrap_or(Value::Nil)),
            }
        }

        // Keywords and symbols look themselves up in a map argument;
        // unsupported argument types yield the default (or nil).
        Value::Keyword(_) | Value::Symbol(_) => {
            if args.is_empty() || args.len() > 2 {
                return Err(EvalError::arity(callable.type_name(), "1-2", args.len()));
            }
            let found = match &args[0] {
                Value::Map(m) => m.get(callable).cloned(),
                _ => None,
            };
            Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(Value::Nil)))
        }

        other => Err(EvalError::NotEvalable(other.type_name().to_string())),
    }
}

fn describe_arities(lambda: &Lambda) -> String {
    let mut parts: Vec<String> = lambda
        .arities
        .iter()
        .map(|a| {
            if a.rest.is_some() {
                format!("{}+", a.params.len())
            } else {
                a.params.len().to_string()
            }
        })
        .collect();
    parts.sort();
    parts.join("|")
}

fn select_arity(lambda: &Lambda, argc: usize) -> Result<&Arity, EvalError> {
    if let Some(a) = lambda.arities.iter().find(|a| a.matches_exact(argc)) {
        return Ok(a);
    }
    lambda
        .arities
        .iter()
        .filter(|a| a.matches_variadic(argc))
        .max_by_key(|a| a.params.len())
        .ok_or_else(|| EvalError::arity(lambda.name_str(), describe_arities(lambda), argc))
}

/// Apply a lambda: select the arity, bind a child frame of the captured
/// environment, and run the body. A recur sentinel from the body rebinds
/// the parameters and re-runs the body in place.
pub fn apply_lambda(ctx: &EvalContext, lambda: &Rc<Lambda>, args: &[Value]) -> EvalResult {
    let arity = select_arity(lambda, args.len())?;

    // Initial call: a variadic arity collects the tail into a list.
    let mut bound: Vec<(Spur, Value)> = arity
        .params
        .iter()
        .copied()
        .zip(args.iter().cloned())
        .collect();
    if let Some(rest) = arity.rest {
        bound.push((rest, Value::list(args[arity.params.len()..].to_vec())));
    }

    loop {
        let frame = Env::with_parent(Rc::new(lambda.env.clone()));
        if let Some(name) = lambda.name {
            frame.set(name, Value::Lambda(Rc::clone(lambda)));
        }
        for (spur, val) in &bound {
            frame.set(*spur, val.clone());
        }

        match eval_do_body(ctx, &arity.body, &frame)? {
            Value::Recur(vals) => {
                // On recur the rest parameter rebinds directly.
                let names: Vec<Spur> = arity.params.iter().copied().chain(arity.rest).collect();
                if vals.len() != names.len() {
                    return Err(EvalError::arity(
                        lambda.name_str(),
                        names.len().to_string(),
                        vals.len(),
                    ));
                }
                bound = names.into_iter().zip(vals.iter().cloned()).collect();
            }
            v => return Ok(v),
        }
    }
}

/// Expand a macro call: bind the unevaluated argument forms in a child
/// frame of the caller's environment and evaluate the body to produce the
/// expansion.
pub fn apply_macro(
    ctx: &EvalContext,
    mac: &Rc<Macro>,
    args: &[Value],
    caller_env: &Env,
) -> EvalResult {
    let name = resolve(mac.name);
    if mac.rest.is_some() {
        if args.len() < mac.params.len() {
            return Err(EvalError::arity(
                name,
                format!("{}+", mac.params.len()),
                args.len(),
            ));
        }
    } else if args.len() != mac.params.len() {
        return Err(EvalError::arity(
            name,
            mac.params.len().to_string(),
            args.len(),
        ));
    }

    let frame = Env::with_parent(Rc::new(caller_env.clone()));
    for (param, arg) in mac.params.iter().zip(args.iter()) {
        frame.set(*param, arg.clone());
    }
    if let Some(rest) = mac.rest {
        frame.set(rest, Value::list(args[mac.params.len()..].to_vec()));
    }

    eval_checked_body(ctx, &mac.body, &frame)
}

/// Evaluate forms as an implicit `do`: a recur sentinel in a non-last
/// position is misuse, the last result passes through untouched.
pub(crate) fn eval_do_body(ctx: &EvalContext, forms: &[Value], env: &Env) -> EvalResult {
    let Some((last, init)) = forms.split_last() else {
        return Ok(Value::Nil);
    };
    for form in init {
        eval_checked(ctx, form, env)?;
    }
    eval_value(ctx, last, env)
}

/// An implicit `do` whose result must not be a recur sentinel (macro
/// bodies).
fn eval_checked_body(ctx: &EvalContext, forms: &[Value], env: &Env) -> EvalResult {
    match eval_do_body(ctx, forms, env)? {
        Value::Recur(_) => Err(EvalError::RecurMisuse),
        v => Ok(v),
    }
}
