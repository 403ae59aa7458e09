use std::collections::BTreeMap;

use sprig_core::{Builtin, ReadError, ReaderMacroKind, Special, Value};

/// Rewrite every reader-macro node in a parsed form into plain
/// expressions. After this pass no `ReaderMacro` variant remains.
pub fn expand(form: &Value) -> Result<Value, ReadError> {
    match form {
        Value::ReaderMacro(ReaderMacroKind::Quote, inner) => Ok(quote_form(literalize(inner))),
        Value::ReaderMacro(ReaderMacroKind::SyntaxQuote, inner) => syntax_quote(inner, 1),
        Value::ReaderMacro(ReaderMacroKind::Unquote | ReaderMacroKind::UnquoteSplice, _) => {
            Err(ReadError::MismatchedReaderMacro)
        }
        Value::List(items) => Ok(Value::list(expand_all(items)?)),
        Value::Vector(items) => Ok(Value::vector(expand_all(items)?)),
        Value::Map(m) => {
            let mut out = BTreeMap::new();
            for (k, v) in m.iter() {
                out.insert(expand(k)?, expand(v)?);
            }
            Ok(Value::map(out))
        }
        _ => Ok(form.clone()),
    }
}

/// Expand a sequence of top-level forms.
pub fn expand_forms(forms: &[Value]) -> Result<Vec<Value>, ReadError> {
    forms.iter().map(expand).collect()
}

fn expand_all(items: &[Value]) -> Result<Vec<Value>, ReadError> {
    items.iter().map(expand).collect()
}

fn quote_form(inner: Value) -> Value {
    Value::list(vec![Value::Special(Special::Quote), inner])
}

fn builtin_call(b: Builtin, args: Vec<Value>) -> Value {
    let mut items = vec![Value::Builtin(b)];
    items.extend(args);
    Value::list(items)
}

/// Quoted data is taken literally, but reader-macro nodes may not survive
/// the pass: they are rewritten to their surface list forms.
fn literalize(form: &Value) -> Value {
    match form {
        Value::ReaderMacro(kind, inner) => {
            let head = match kind {
                ReaderMacroKind::Quote => Value::Special(Special::Quote),
                ReaderMacroKind::SyntaxQuote => Value::symbol("syntax-quote"),
                ReaderMacroKind::Unquote => Value::symbol("unquote"),
                ReaderMacroKind::UnquoteSplice => Value::symbol("unquote-splice"),
            };
            Value::list(vec![head, literalize(inner)])
        }
        Value::List(items) => Value::list(items.iter().map(literalize).collect()),
        Value::Vector(items) => Value::vector(items.iter().map(literalize).collect()),
        Value::Map(m) => {
            let mut out = BTreeMap::new();
            for (k, v) in m.iter() {
                out.insert(literalize(k), literalize(v));
            }
            Value::map(out)
        }
        _ => form.clone(),
    }
}

/// Build the program a syntax-quoted form expands to. `depth` counts the
/// enclosing syntax-quote levels; `~` and `~@` only cancel at depth 1.
fn syntax_quote(form: &Value, depth: u32) -> Result<Value, ReadError> {
    match form {
        Value::Symbol(_) => Ok(quote_form(form.clone())),
        Value::List(items) | Value::Vector(items) => {
            let mut slots = Vec::with_capacity(items.len());
            for item in items.iter() {
                slots.push(slot(item, depth)?);
            }
            Ok(builtin_call(
                Builtin::Seq,
                vec![builtin_call(Builtin::Concat, slots)],
            ))
        }
        Value::ReaderMacro(ReaderMacroKind::Unquote, inner) => {
            if depth == 1 {
                expand(inner)
            } else {
                syntax_quote(inner, depth - 1)
            }
        }
        Value::ReaderMacro(ReaderMacroKind::UnquoteSplice, inner) => {
            if depth == 1 {
                // Splicing needs a surrounding sequence slot.
                Err(ReadError::MismatchedReaderMacro)
            } else {
                syntax_quote(inner, depth - 1)
            }
        }
        Value::ReaderMacro(ReaderMacroKind::SyntaxQuote, inner) => {
            // Expand the inner quote to its builder tree first, then quote
            // that tree as ordinary forms at the current depth.
            let built = syntax_quote(inner, depth + 1)?;
            syntax_quote(&built, depth)
        }
        Value::ReaderMacro(ReaderMacroKind::Quote, _) => {
            let expanded = expand(form)?;
            syntax_quote(&expanded, depth)
        }
        Value::Map(_) => Ok(literalize(form)),
        _ => Ok(form.clone()),
    }
}

/// The per-element fragment a sequence contributes to its `.concat`
/// rebuild.
fn slot(item: &Value, depth: u32) -> Result<Value, ReadError> {
    match item {
        Value::ReaderMacro(ReaderMacroKind::Unquote, inner) => {
            let arg = if depth == 1 {
                expand(inner)?
            } else {
                syntax_quote(inner, depth - 1)?
            };
            Ok(builtin_call(Builtin::List, vec![arg]))
        }
        Value::ReaderMacro(ReaderMacroKind::UnquoteSplice, inner) => {
            if depth == 1 {
                expand(inner)
            } else {
                syntax_quote(inner, depth - 1)
            }
        }
        _ => Ok(builtin_call(Builtin::List, vec![syntax_quote(item, depth)?])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read;

    fn expanded(input: &str) -> Value {
        expand(&read(input).unwrap()).unwrap()
    }

    fn contains_reader_macro(v: &Value) -> bool {
        match v {
            Value::ReaderMacro(_, _) => true,
            Value::List(items) | Value::Vector(items) => items.iter().any(contains_reader_macro),
            Value::Map(m) => m
                .iter()
                .any(|(k, v)| contains_reader_macro(k) || contains_reader_macro(v)),
            _ => false,
        }
    }

    #[test]
    fn test_quote_expansion() {
        assert_eq!(expanded("'a"), read("(quote a)").unwrap());
        assert_eq!(expanded("''a"), read("(quote (quote a))").unwrap());
    }

    #[test]
    fn test_syntax_quote_symbol() {
        assert_eq!(expanded("`a"), read("(quote a)").unwrap());
    }

    #[test]
    fn test_syntax_quote_list_literal_shape() {
        assert_eq!(
            expanded("`(a b)"),
            read("(.seq (.concat (.list (quote a)) (.list (quote b))))").unwrap()
        );
    }

    #[test]
    fn test_syntax_quote_unquote() {
        assert_eq!(
            expanded("`(a ~b)"),
            read("(.seq (.concat (.list (quote a)) (.list b)))").unwrap()
        );
    }

    #[test]
    fn test_syntax_quote_unquote_splice() {
        assert_eq!(
            expanded("`(~@a b)"),
            read("(.seq (.concat a (.list (quote b))))").unwrap()
        );
    }

    #[test]
    fn test_syntax_quote_literals_pass_through() {
        assert_eq!(expanded("`1"), Value::Int(1));
        assert_eq!(expanded("`:k"), Value::keyword("k"));
        assert_eq!(expanded("`\"s\""), Value::string("s"));
    }

    #[test]
    fn test_vector_rebuilds_as_seq() {
        assert_eq!(
            expanded("`[a]"),
            read("(.seq (.concat (.list (quote a))))").unwrap()
        );
    }

    #[test]
    fn test_unquote_outside_syntax_quote_errors() {
        assert_eq!(
            expand(&read("~a").unwrap()),
            Err(ReadError::MismatchedReaderMacro)
        );
        assert_eq!(
            expand(&read("(f ~@a)").unwrap()),
            Err(ReadError::MismatchedReaderMacro)
        );
    }

    #[test]
    fn test_no_reader_macro_survives() {
        for src in [
            "'(a 'b `c ~d)",
            "`(a ~b ~@c `(d ~e))",
            "(f 'x `y)",
            "[1 '2 {`k 'v}]",
            "``(a ~b)",
            "`(~@xs)",
        ] {
            let out = expand(&read(src).unwrap()).unwrap();
            assert!(
                !contains_reader_macro(&out),
                "reader macro survived in expansion of {src}: {out:?}"
            );
        }
    }

    #[test]
    fn test_nested_syntax_quote_quotes_builder_tree() {
        // The inner quote becomes a builder tree whose symbols are quoted
        // by the outer level; one evaluation peels one level. The `quote`
        // head is a special-form value and self-quotes.
        let out = expanded("``a");
        assert_eq!(
            out,
            read("(.seq (.concat (.list quote) (.list (quote a))))").unwrap()
        );
    }

    #[test]
    fn test_quoted_data_literalizes_reader_macros() {
        assert_eq!(
            expanded("'(~a)"),
            read("(quote ((unquote a)))").unwrap()
        );
    }
}
