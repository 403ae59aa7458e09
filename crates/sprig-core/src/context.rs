use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use hashbrown::HashMap;
use lasso::Spur;

use crate::value::{intern, Macro, Value};

/// What a symbol resolves to in a frame.
///
/// `Unbound` is a declared-but-uninitialized var (`(def x)`); looking it up
/// is an error distinct from the symbol being entirely unknown.
#[derive(Debug, Clone)]
pub enum Binding {
    Unbound,
    Bound(Value),
    MacroDef(Rc<Macro>),
}

/// A lexical frame plus its parent chain. Lookup walks child to root;
/// `def` and `defmacro` always write to the root frame.
#[derive(Debug, Clone)]
pub struct Env {
    pub bindings: Rc<RefCell<HashMap<Spur, Binding>>>,
    pub parent: Option<Rc<Env>>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Env>) -> Self {
        Env {
            bindings: Rc::new(RefCell::new(HashMap::new())),
            parent: Some(parent),
        }
    }

    pub fn get(&self, name: Spur) -> Option<Binding> {
        if let Some(binding) = self.bindings.borrow().get(&name) {
            Some(binding.clone())
        } else if let Some(parent) = &self.parent {
            parent.get(name)
        } else {
            None
        }
    }

    pub fn get_str(&self, name: &str) -> Option<Binding> {
        self.get(intern(name))
    }

    /// Bind in this frame.
    pub fn set(&self, name: Spur, val: Value) {
        self.bindings.borrow_mut().insert(name, Binding::Bound(val));
    }

    pub fn set_str(&self, name: &str, val: Value) {
        self.set(intern(name), val);
    }

    /// The root frame of this chain.
    pub fn root(&self) -> Env {
        let mut current = self.clone();
        while let Some(parent) = current.parent.clone() {
            current = (*parent).clone();
        }
        current
    }

    /// Bind a var in the root frame; redefinitions replace.
    pub fn define_global(&self, name: Spur, binding: Binding) {
        self.root().bindings.borrow_mut().insert(name, binding);
    }

    /// Drop every binding in this frame (used by `Interpreter::reset`).
    pub fn clear(&self) {
        self.bindings.borrow_mut().clear();
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-interpreter evaluation state: the injectable output sink that
/// `.print` writes to. Defaults to standard output.
pub struct EvalContext {
    output: RefCell<Box<dyn Write>>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext {
            output: RefCell::new(Box::new(io::stdout())),
        }
    }

    pub fn with_output(sink: Box<dyn Write>) -> Self {
        EvalContext {
            output: RefCell::new(sink),
        }
    }

    pub fn set_output(&self, sink: Box<dyn Write>) {
        *self.output.borrow_mut() = sink;
    }

    pub fn write_output(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
