use std::fmt;

/// Check arity of a built-in's arguments, returning `EvalError::Arity` on
/// mismatch.
///
/// # Forms
///
/// ```ignore
/// check_arity!(args, ".conj", 2);        // exactly 2
/// check_arity!(args, ".reduce", 2..=3);  // 2 to 3 inclusive
/// check_arity!(args, ".concat", 0..);    // any
/// ```
#[macro_export]
macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err($crate::EvalError::arity(
                $name,
                stringify!($exact),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err($crate::EvalError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..) => {
        if $args.len() < $lo {
            return Err($crate::EvalError::arity(
                $name,
                concat!(stringify!($lo), "+"),
                $args.len(),
            ));
        }
    };
}

/// A line/column position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn point(line: usize, col: usize) -> Span {
        Span { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Errors from the read phase: lexing, parsing, and reader-macro
/// expansion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    #[error("empty input")]
    EmptyInput,

    #[error("invalid character literal `\\{text}` at {span}")]
    InvalidCharacter { text: String, span: Span },

    #[error("invalid unicode literal `\\{text}` at {span}: expected exactly four hex digits")]
    InvalidUnicode { text: String, span: Span },

    #[error("invalid octal literal `\\{text}` at {span}: expected three octal digits below 256")]
    InvalidOctal { text: String, span: Span },

    #[error("invalid keyword at {span}: `:` requires a name")]
    InvalidKeyword { span: Span },

    #[error("invalid dispatch macro at {span}: `#` may not be followed by {found}")]
    InvalidDispatchMacro { found: String, span: Span },

    #[error("invalid string escape sequence `\\{escape}` at {span}")]
    InvalidStringEscapeSequence { escape: char, span: Span },

    #[error("non-terminated string starting at {span}")]
    NonTerminatedString { span: Span },

    #[error("bad start token `{token}`")]
    BadStartToken { token: String },

    #[error("mismatched delimiter: expected `{expected}`, found {found}")]
    MismatchedDelimiter { expected: char, found: String },

    #[error("reader macro without a matching form")]
    MismatchedReaderMacro,

    #[error("map literal requires an even number of forms, found {count}")]
    MapKeyValueMismatch { count: usize },
}

/// Errors from the evaluation phase.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("arity error: {name} expects {expected} args, got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("invalid argument: expected {expected}, got {got}")]
    InvalidArgument { expected: String, got: String },

    #[error("index {index} out of bounds (length {len})")]
    OutOfBounds { index: i64, len: usize },

    #[error("divide by zero")]
    DivideByZero,

    #[error("unable to resolve symbol: {0}")]
    InvalidSymbol(String),

    #[error("var is unbound: {0}")]
    Unbound(String),

    #[error("not evalable: {0}")]
    NotEvalable(String),

    #[error("recur outside the tail position of a loop or fn body")]
    RecurMisuse,

    #[error("{0}")]
    Custom(String),
}

impl EvalError {
    pub fn arity(name: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        EvalError::Arity {
            name: name.into(),
            expected: expected.into(),
            got,
        }
    }

    pub fn invalid_argument(expected: impl Into<String>, got: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn custom(msg: impl Into<String>) -> Self {
        EvalError::Custom(msg.into())
    }
}

/// Umbrella error for the embedding and CLI surfaces.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SprigError {
    #[error("read error: {0}")]
    Read(#[from] ReadError),

    #[error("eval error: {0}")]
    Eval(#[from] EvalError),
}

/// Result of evaluating a piece of source text.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    Success(crate::Value),
    ReadFailure(ReadError),
    EvalFailure(EvalError),
}

impl EvalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, EvalOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<crate::Value, SprigError> {
        match self {
            EvalOutcome::Success(v) => Ok(v),
            EvalOutcome::ReadFailure(e) => Err(SprigError::Read(e)),
            EvalOutcome::EvalFailure(e) => Err(SprigError::Eval(e)),
        }
    }
}

impl From<Result<crate::Value, SprigError>> for EvalOutcome {
    fn from(r: Result<crate::Value, SprigError>) -> Self {
        match r {
            Ok(v) => EvalOutcome::Success(v),
            Err(SprigError::Read(e)) => EvalOutcome::ReadFailure(e),
            Err(SprigError::Eval(e)) => EvalOutcome::EvalFailure(e),
        }
    }
}
