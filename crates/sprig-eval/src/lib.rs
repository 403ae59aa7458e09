pub mod builtins;
pub mod eval;
pub mod prelude;
pub mod special_forms;

pub use eval::{apply_callable, apply_lambda, apply_macro, eval_value, EvalResult, Interpreter};
pub use prelude::STDLIB;
