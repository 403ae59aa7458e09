use sprig_core::{Builtin, ReadError, ReaderMacroKind, Special, Value};
use sprig_reader::{read, read_many, read_program};

#[test]
fn test_atoms() {
    assert_eq!(read("nil").unwrap(), Value::Nil);
    assert_eq!(read("true").unwrap(), Value::Bool(true));
    assert_eq!(read("42").unwrap(), Value::Int(42));
    assert_eq!(read("-2.5").unwrap(), Value::Float(-2.5));
    assert_eq!(read("\\a").unwrap(), Value::Char('a'));
    assert_eq!(read("\"hi\"").unwrap(), Value::string("hi"));
    assert_eq!(read(":kw").unwrap(), Value::keyword("kw"));
    assert_eq!(read("sym").unwrap(), Value::symbol("sym"));
    assert_eq!(read("if").unwrap(), Value::Special(Special::If));
    assert_eq!(read(".conj").unwrap(), Value::Builtin(Builtin::Conj));
}

#[test]
fn test_collections() {
    assert_eq!(
        read("(1 2 3)").unwrap(),
        Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
    assert_eq!(
        read("[1 [2]]").unwrap(),
        Value::vector(vec![Value::Int(1), Value::vector(vec![Value::Int(2)])])
    );
    assert_eq!(read("()").unwrap(), Value::list(vec![]));

    let m = read("{:a 1 :b 2}").unwrap();
    let m = m.as_map().unwrap();
    assert_eq!(m.get(&Value::keyword("a")), Some(&Value::Int(1)));
    assert_eq!(m.get(&Value::keyword("b")), Some(&Value::Int(2)));
}

#[test]
fn test_map_duplicate_keys_keep_last() {
    let m = read("{:a 1 :a 2}").unwrap();
    assert_eq!(
        m.as_map().unwrap().get(&Value::keyword("a")),
        Some(&Value::Int(2))
    );
}

#[test]
fn test_map_odd_forms() {
    assert_eq!(
        read("{:a 1 :b}"),
        Err(ReadError::MapKeyValueMismatch { count: 3 })
    );
}

#[test]
fn test_reader_macros_are_first_class_nodes() {
    assert_eq!(
        read("'x").unwrap(),
        Value::reader_macro(ReaderMacroKind::Quote, Value::symbol("x"))
    );
    assert_eq!(
        read("`(a ~b ~@c)").unwrap(),
        Value::reader_macro(
            ReaderMacroKind::SyntaxQuote,
            Value::list(vec![
                Value::symbol("a"),
                Value::reader_macro(ReaderMacroKind::Unquote, Value::symbol("b")),
                Value::reader_macro(ReaderMacroKind::UnquoteSplice, Value::symbol("c")),
            ])
        )
    );
    // Nested wrappers apply innermost first.
    assert_eq!(
        read("'~x").unwrap(),
        Value::reader_macro(
            ReaderMacroKind::Quote,
            Value::reader_macro(ReaderMacroKind::Unquote, Value::symbol("x"))
        )
    );
}

#[test]
fn test_dangling_reader_macro() {
    assert_eq!(read("'"), Err(ReadError::MismatchedReaderMacro));
    assert_eq!(read("`"), Err(ReadError::MismatchedReaderMacro));
    assert_eq!(read_many("(f) ~@"), Err(ReadError::MismatchedReaderMacro));
}

#[test]
fn test_delimiter_errors() {
    assert!(matches!(
        read("(1 2"),
        Err(ReadError::MismatchedDelimiter { expected: ')', .. })
    ));
    assert!(matches!(
        read("[1 )"),
        Err(ReadError::MismatchedDelimiter { expected: ']', .. })
    ));
    assert!(matches!(
        read("{:a 1]"),
        Err(ReadError::MismatchedDelimiter { expected: '}', .. })
    ));
    assert!(matches!(read(")"), Err(ReadError::BadStartToken { .. })));
}

#[test]
fn test_empty_input() {
    assert_eq!(read(""), Err(ReadError::EmptyInput));
    assert_eq!(read("; just a comment"), Err(ReadError::EmptyInput));
    assert_eq!(read_many("  ,, "), Err(ReadError::EmptyInput));
}

#[test]
fn test_ignore_form() {
    assert_eq!(read("#_(1 2) 3").unwrap(), Value::Int(3));
    assert_eq!(
        read("(1 #_2 3)").unwrap(),
        Value::list(vec![Value::Int(1), Value::Int(3)])
    );
}

#[test]
fn test_var_quote_reads_as_quote() {
    assert_eq!(
        read("#'x").unwrap(),
        Value::reader_macro(ReaderMacroKind::Quote, Value::symbol("x"))
    );
}

#[test]
fn test_set_literal_reserved() {
    assert!(matches!(
        read("#{1 2}"),
        Err(ReadError::BadStartToken { .. })
    ));
}

#[test]
fn test_inline_fn() {
    assert_eq!(
        read("#(.+ % 1)").unwrap(),
        read("(fn [%1] (.+ %1 1))").unwrap()
    );
    assert_eq!(
        read("#(.+ %1 %2)").unwrap(),
        read("(fn [%1 %2] (.+ %1 %2))").unwrap()
    );
    // No arguments referenced: a thunk.
    assert_eq!(read("#(.rand)").unwrap(), read("(fn [] (.rand))").unwrap());
}

#[test]
fn test_regex_literal() {
    let v = read(r##"#"a\d+""##).unwrap();
    match v {
        Value::Regex(r) => assert_eq!(r.as_str(), r"a\d+"),
        other => panic!("expected regex, got {other:?}"),
    }
    assert!(matches!(
        read(r##"#"[unclosed""##),
        Err(ReadError::BadStartToken { .. })
    ));
}

#[test]
fn test_read_many() {
    let forms = read_many("(a) (b) 3").unwrap();
    assert_eq!(forms.len(), 3);
    assert_eq!(forms[2], Value::Int(3));
}

#[test]
fn test_read_program_expands() {
    let forms = read_program("'(1 2)").unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(
        forms[0],
        Value::list(vec![
            Value::Special(Special::Quote),
            Value::list(vec![Value::Int(1), Value::Int(2)]),
        ])
    );
}

#[test]
fn test_print_parse_roundtrip() {
    for src in [
        "nil",
        "true",
        "false",
        "42",
        "-1.5",
        "400.0",
        "\\a",
        "\\space",
        "\"a\\nb\"",
        ":kw",
        "sym",
        "(1 2 (3))",
        "[1 [2] {:a 1}]",
        "{:a 1, :b [2 3]}",
    ] {
        let v = read(src).unwrap();
        let printed = format!("{v}");
        let reparsed = read(&printed).unwrap();
        assert_eq!(v, reparsed, "round-trip failed for {src} -> {printed}");
    }
}
