//! Sprig — a small Clojure-flavored Lisp.
//!
//! This crate provides the embedding API for the Sprig interpreter.
//!
//! # Quick Start
//!
//! ```no_run
//! use sprig::{Interpreter, Value};
//!
//! let interp = Interpreter::new().unwrap();
//! let result = interp.eval_str("(+ 1 2)").unwrap();
//! assert_eq!(result, Value::Int(3));
//! ```

use std::io::Write;
use std::rc::Rc;

pub use sprig_core::{
    Binding, Builtin, Env, EvalError, EvalOutcome, ReadError, Special, SprigError, Value,
};
pub use sprig_reader::{read, read_many, read_program};

/// Builder for configuring and constructing an [`Interpreter`].
///
/// By default the standard library is loaded and `.print` writes to
/// standard output.
pub struct InterpreterBuilder {
    stdlib: bool,
    output: Option<Box<dyn Write>>,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            stdlib: true,
            output: None,
        }
    }

    /// Enable or disable the bootstrap standard library (default: `true`).
    pub fn with_stdlib(mut self, enable: bool) -> Self {
        self.stdlib = enable;
        self
    }

    /// Redirect `.print` output to the given sink.
    pub fn with_output(mut self, sink: Box<dyn Write>) -> Self {
        self.output = Some(sink);
        self
    }

    /// Build the interpreter; fails if the standard library fails to
    /// load.
    pub fn build(self) -> Result<Interpreter, SprigError> {
        let inner = sprig_eval::Interpreter::new();
        if let Some(sink) = self.output {
            inner.set_output(sink);
        }
        if self.stdlib {
            inner.load_stdlib().into_result()?;
        }
        Ok(Interpreter { inner })
    }
}

/// A Sprig interpreter instance with its own global environment.
///
/// Use [`InterpreterBuilder`] for fine-grained control, or
/// [`Interpreter::new`] for a default interpreter with the standard
/// library loaded.
pub struct Interpreter {
    inner: sprig_eval::Interpreter,
}

impl Interpreter {
    pub fn new() -> Result<Self, SprigError> {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Read, expand, and evaluate source text. Definitions (`def`)
    /// persist across calls.
    pub fn evaluate(&self, source: &str) -> EvalOutcome {
        self.inner.evaluate(source)
    }

    /// Like [`Interpreter::evaluate`], as a plain `Result`.
    pub fn eval_str(&self, source: &str) -> Result<Value, SprigError> {
        self.inner.evaluate(source).into_result()
    }

    /// Drop every global binding and reload the standard library.
    pub fn reset(&mut self) -> Result<(), SprigError> {
        self.inner.reset().into_result().map(|_| ())
    }

    /// Redirect `.print` output.
    pub fn set_output(&self, sink: Box<dyn Write>) {
        self.inner.set_output(sink);
    }

    /// Load and evaluate a source file, as `evaluate` does.
    pub fn load_file(&self, path: impl AsRef<std::path::Path>) -> Result<Value, SprigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::custom(format!("load_file {}: {e}", path.display())))?;
        self.eval_str(&content)
    }

    /// The root environment.
    pub fn global_env(&self) -> &Rc<Env> {
        &self.inner.global_env
    }
}
