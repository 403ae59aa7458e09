pub mod context;
pub mod error;
pub mod value;

pub use context::{Binding, Env, EvalContext};
pub use error::{EvalError, EvalOutcome, ReadError, Span, SprigError};
pub use lasso::Spur;
pub use value::{
    compare_spurs, intern, resolve, with_resolved, Arity, Builtin, Lambda, Macro, ReaderMacroKind,
    Special, Value, BUILTIN_NAMES, SPECIAL_FORM_NAMES,
};
