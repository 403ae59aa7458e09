#![allow(dead_code)]

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use sprig::{EvalError, Interpreter, ReadError, SprigError, Value};

pub fn interp() -> Interpreter {
    Interpreter::new().expect("standard library should load")
}

/// Evaluate source in a fresh interpreter with the stdlib loaded.
pub fn eval(input: &str) -> Value {
    interp()
        .eval_str(input)
        .unwrap_or_else(|e| panic!("eval failed for `{input}`: {e}"))
}

pub fn eval_err(input: &str) -> EvalError {
    match interp().eval_str(input) {
        Err(SprigError::Eval(e)) => e,
        other => panic!("expected eval error for `{input}`, got {other:?}"),
    }
}

pub fn read_err(input: &str) -> ReadError {
    match interp().eval_str(input) {
        Err(SprigError::Read(e)) => e,
        other => panic!("expected read error for `{input}`, got {other:?}"),
    }
}

/// A clonable sink for capturing `.print` output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Evaluate with a captured output sink, returning the result and what
/// `.print` wrote.
pub fn eval_with_output(input: &str) -> (Value, String) {
    let buf = SharedBuffer::default();
    let interp = Interpreter::builder()
        .with_output(Box::new(buf.clone()))
        .build()
        .expect("standard library should load");
    let val = interp
        .eval_str(input)
        .unwrap_or_else(|e| panic!("eval failed for `{input}`: {e}"));
    (val, buf.contents())
}
