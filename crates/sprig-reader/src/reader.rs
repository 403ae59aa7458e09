use std::collections::BTreeMap;

use regex::Regex;
use sprig_core::{resolve, ReadError, ReaderMacroKind, Special, Value};

use crate::lexer::{tokenize, SpannedToken, Token};

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|t| t.token.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn parse_expr(&mut self) -> Result<Value, ReadError> {
        match self.peek() {
            None => Err(ReadError::EmptyInput),
            Some(Token::LParen) => {
                let items = self.parse_seq(&Token::RParen, ')')?;
                Ok(Value::list(items))
            }
            Some(Token::LBracket) => {
                let items = self.parse_seq(&Token::RBracket, ']')?;
                Ok(Value::vector(items))
            }
            Some(Token::LBrace) => self.parse_map(),
            Some(Token::Quote) => self.parse_wrapped(ReaderMacroKind::Quote),
            Some(Token::SyntaxQuote) => self.parse_wrapped(ReaderMacroKind::SyntaxQuote),
            Some(Token::Unquote) => self.parse_wrapped(ReaderMacroKind::Unquote),
            Some(Token::UnquoteSplice) => self.parse_wrapped(ReaderMacroKind::UnquoteSplice),
            // No var system: `#'x` reads as a plain quote.
            Some(Token::VarQuote) => self.parse_wrapped(ReaderMacroKind::Quote),
            Some(Token::IgnoreForm) => {
                self.advance();
                self.parse_expr()
                    .map_err(reader_macro_needs_form)?;
                self.parse_expr()
            }
            Some(Token::InlineFnStart) => self.parse_inline_fn(),
            Some(Token::SetStart) => Err(ReadError::BadStartToken {
                token: "#{".to_string(),
            }),
            Some(t @ (Token::RParen | Token::RBracket | Token::RBrace)) => {
                Err(ReadError::BadStartToken {
                    token: t.describe(),
                })
            }
            Some(_) => self.parse_atom(),
        }
    }

    /// Consume a reader-macro token and wrap the following form.
    fn parse_wrapped(&mut self, kind: ReaderMacroKind) -> Result<Value, ReadError> {
        self.advance();
        let inner = self.parse_expr().map_err(reader_macro_needs_form)?;
        Ok(Value::reader_macro(kind, inner))
    }

    /// Parse forms up to the matching close delimiter. The open token has
    /// not been consumed yet.
    fn parse_seq(&mut self, close: &Token, close_char: char) -> Result<Vec<Value>, ReadError> {
        self.advance();
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(ReadError::MismatchedDelimiter {
                        expected: close_char,
                        found: "end of input".to_string(),
                    });
                }
                Some(t) if t == close => {
                    self.advance();
                    return Ok(items);
                }
                Some(t @ (Token::RParen | Token::RBracket | Token::RBrace)) => {
                    return Err(ReadError::MismatchedDelimiter {
                        expected: close_char,
                        found: t.describe(),
                    });
                }
                Some(_) => items.push(self.parse_expr()?),
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value, ReadError> {
        let items = self.parse_seq(&Token::RBrace, '}')?;
        if items.len() % 2 != 0 {
            return Err(ReadError::MapKeyValueMismatch { count: items.len() });
        }
        let mut map = BTreeMap::new();
        let mut iter = items.into_iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            map.insert(k, v);
        }
        Ok(Value::map(map))
    }

    /// `#(...)` builds `(fn [%1 ... %n] (...))`, rewriting `%` to `%1`.
    fn parse_inline_fn(&mut self) -> Result<Value, ReadError> {
        let items = self.parse_seq(&Token::RParen, ')')?;
        let mut max_arg = 0usize;
        let body = rewrite_percent_args(&Value::list(items), &mut max_arg);
        let params: Vec<Value> = (1..=max_arg)
            .map(|n| Value::symbol(&format!("%{n}")))
            .collect();
        Ok(Value::list(vec![
            Value::Special(Special::Fn),
            Value::vector(params),
            body,
        ]))
    }

    fn parse_atom(&mut self) -> Result<Value, ReadError> {
        match self.advance() {
            Some(Token::Nil) => Ok(Value::Nil),
            Some(Token::Bool(b)) => Ok(Value::Bool(b)),
            Some(Token::Int(n)) => Ok(Value::Int(n)),
            Some(Token::Float(f)) => Ok(Value::Float(f)),
            Some(Token::Char(c)) => Ok(Value::Char(c)),
            Some(Token::Str(s)) => Ok(Value::string(s)),
            Some(Token::Regex(pattern)) => match Regex::new(&pattern) {
                Ok(r) => Ok(Value::regex(r)),
                Err(_) => Err(ReadError::BadStartToken {
                    token: format!("#\"{pattern}\""),
                }),
            },
            Some(Token::Keyword(name)) => Ok(Value::keyword(&name)),
            Some(Token::Symbol(name)) => Ok(Value::symbol(&name)),
            Some(Token::Special(sf)) => Ok(Value::Special(sf)),
            Some(Token::Builtin(b)) => Ok(Value::Builtin(b)),
            Some(t) => Err(ReadError::BadStartToken {
                token: t.describe(),
            }),
            None => Err(ReadError::EmptyInput),
        }
    }
}

fn reader_macro_needs_form(e: ReadError) -> ReadError {
    match e {
        ReadError::EmptyInput => ReadError::MismatchedReaderMacro,
        other => other,
    }
}

/// Rewrite `%` / `%n` symbols inside an inline-fn body, tracking the
/// highest argument index seen.
fn rewrite_percent_args(form: &Value, max_arg: &mut usize) -> Value {
    match form {
        Value::Symbol(spur) => {
            let name = resolve(*spur);
            if name == "%" {
                *max_arg = (*max_arg).max(1);
                return Value::symbol("%1");
            }
            if let Some(digits) = name.strip_prefix('%') {
                if let Ok(n) = digits.parse::<usize>() {
                    if n >= 1 {
                        *max_arg = (*max_arg).max(n);
                    }
                }
            }
            form.clone()
        }
        Value::List(items) => {
            Value::list(items.iter().map(|v| rewrite_percent_args(v, max_arg)).collect())
        }
        Value::Vector(items) => {
            Value::vector(items.iter().map(|v| rewrite_percent_args(v, max_arg)).collect())
        }
        Value::ReaderMacro(kind, inner) => {
            Value::reader_macro(*kind, rewrite_percent_args(inner, max_arg))
        }
        _ => form.clone(),
    }
}

/// Read a single form from source text.
pub fn read(input: &str) -> Result<Value, ReadError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    parser.parse_expr()
}

/// Read every top-level form from source text. An empty token stream is
/// `EmptyInput`.
pub fn read_many(input: &str) -> Result<Vec<Value>, ReadError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let mut forms = Vec::new();
    while !parser.at_end() {
        forms.push(parser.parse_expr()?);
    }
    if forms.is_empty() {
        return Err(ReadError::EmptyInput);
    }
    Ok(forms)
}
