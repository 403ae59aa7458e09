pub mod expand;
pub mod lexer;
pub mod reader;

pub use expand::{expand, expand_forms};
pub use reader::{read, read_many};

use sprig_core::{ReadError, Value};

/// Read and reader-macro-expand every top-level form: the full front-end
/// pipeline, producing evaluable trees.
pub fn read_program(input: &str) -> Result<Vec<Value>, ReadError> {
    let forms = read_many(input)?;
    expand_forms(&forms)
}
