use sprig_core::{Builtin, ReadError, Span, Special};

/// A classified token. Syntax tokens come straight from the raw pass;
/// everything else is resolved from an `Unknown` run during the
/// classification pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Quote,
    SyntaxQuote,
    Unquote,
    UnquoteSplice,
    VarQuote,
    SetStart,
    InlineFnStart,
    IgnoreForm,
    Char(char),
    Str(String),
    Regex(String),
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Keyword(String),
    Symbol(String),
    Special(Special),
    Builtin(Builtin),
}

impl Token {
    /// Short rendering for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::Quote => "`'`".to_string(),
            Token::SyntaxQuote => "'`'".to_string(),
            Token::Unquote => "`~`".to_string(),
            Token::UnquoteSplice => "`~@`".to_string(),
            Token::VarQuote => "`#'`".to_string(),
            Token::SetStart => "`#{`".to_string(),
            Token::InlineFnStart => "`#(`".to_string(),
            Token::IgnoreForm => "`#_`".to_string(),
            Token::Char(c) => format!("`\\{c}`"),
            Token::Str(_) => "string".to_string(),
            Token::Regex(_) => "regex".to_string(),
            Token::Nil => "`nil`".to_string(),
            Token::Bool(b) => format!("`{b}`"),
            Token::Int(n) => format!("`{n}`"),
            Token::Float(f) => format!("`{f}`"),
            Token::Keyword(k) => format!("`:{k}`"),
            Token::Symbol(s) => format!("`{s}`"),
            Token::Special(s) => format!("`{}`", s.name()),
            Token::Builtin(b) => format!("`{}`", b.name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Output of the raw pass. `Unknown` runs are resolved by the
/// classification pass; the rest map 1:1 onto classified tokens.
enum RawToken {
    Syntax(Token),
    Char(char),
    Str(String),
    Regex(String),
    Unknown(String),
}

/// Characters that end a bare token run. Commas count as whitespace.
fn is_terminator(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            ',' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | '`' | '~' | '@' | '\\'
        )
}

/// Tokenize source text: a raw pass followed by classification of each
/// `Unknown` run.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ReadError> {
    let raw = raw_pass(input)?;
    let mut tokens = Vec::with_capacity(raw.len());
    for (tok, span) in raw {
        let token = match tok {
            RawToken::Syntax(t) => t,
            RawToken::Char(c) => Token::Char(c),
            RawToken::Str(s) => Token::Str(s),
            RawToken::Regex(s) => Token::Regex(s),
            RawToken::Unknown(word) => classify_word(&word, span)?,
        };
        tokens.push(SpannedToken { token, span });
    }
    Ok(tokens)
}

fn raw_pass(input: &str) -> Result<Vec<(RawToken, Span)>, ReadError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut col = 1;

    macro_rules! push_syntax {
        ($tok:expr, $len:expr) => {{
            tokens.push((RawToken::Syntax($tok), Span::point(line, col)));
            i += $len;
            col += $len;
        }};
    }

    while i < chars.len() {
        let ch = chars[i];
        let span = Span::point(line, col);

        match ch {
            '\n' => {
                line += 1;
                col = 1;
                i += 1;
            }
            c if c.is_whitespace() || c == ',' => {
                col += 1;
                i += 1;
            }

            ';' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }

            '(' => push_syntax!(Token::LParen, 1),
            ')' => push_syntax!(Token::RParen, 1),
            '[' => push_syntax!(Token::LBracket, 1),
            ']' => push_syntax!(Token::RBracket, 1),
            '{' => push_syntax!(Token::LBrace, 1),
            '}' => push_syntax!(Token::RBrace, 1),
            '\'' => push_syntax!(Token::Quote, 1),
            '`' => push_syntax!(Token::SyntaxQuote, 1),

            '~' => {
                if chars.get(i + 1) == Some(&'@') {
                    push_syntax!(Token::UnquoteSplice, 2);
                } else {
                    push_syntax!(Token::Unquote, 1);
                }
            }

            '#' => match chars.get(i + 1) {
                Some('{') => push_syntax!(Token::SetStart, 2),
                Some('\'') => push_syntax!(Token::VarQuote, 2),
                Some('(') => push_syntax!(Token::InlineFnStart, 2),
                Some('_') => push_syntax!(Token::IgnoreForm, 2),
                Some('"') => {
                    i += 2;
                    col += 2;
                    let body = read_regex_body(&chars, &mut i, &mut line, &mut col, span)?;
                    tokens.push((RawToken::Regex(body), span));
                }
                Some(other) => {
                    return Err(ReadError::InvalidDispatchMacro {
                        found: format!("`{other}`"),
                        span,
                    });
                }
                None => {
                    return Err(ReadError::InvalidDispatchMacro {
                        found: "end of input".to_string(),
                        span,
                    });
                }
            },

            '"' => {
                i += 1;
                col += 1;
                let body = read_string_body(&chars, &mut i, &mut line, &mut col, span)?;
                tokens.push((RawToken::Str(body), span));
            }

            '\\' => {
                let c = read_char_literal(&chars, &mut i, &mut col, span)?;
                tokens.push((RawToken::Char(c), span));
            }

            _ => {
                let start = i;
                while i < chars.len() && !is_terminator(chars[i]) {
                    i += 1;
                    col += 1;
                }
                if i == start {
                    // A lone terminator with no other reading (`@`).
                    i += 1;
                    col += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push((RawToken::Unknown(word), span));
            }
        }
    }

    Ok(tokens)
}

/// Read a string body after the opening quote. Only `\r \n \t \" \\`
/// escapes are recognized.
fn read_string_body(
    chars: &[char],
    i: &mut usize,
    line: &mut usize,
    col: &mut usize,
    start: Span,
) -> Result<String, ReadError> {
    let mut s = String::new();
    loop {
        match chars.get(*i) {
            None => return Err(ReadError::NonTerminatedString { span: start }),
            Some('"') => {
                *i += 1;
                *col += 1;
                return Ok(s);
            }
            Some('\\') => {
                let escape = match chars.get(*i + 1) {
                    None => return Err(ReadError::NonTerminatedString { span: start }),
                    Some(c) => *c,
                };
                match escape {
                    'r' => s.push('\r'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    other => {
                        return Err(ReadError::InvalidStringEscapeSequence {
                            escape: other,
                            span: Span::point(*line, *col),
                        });
                    }
                }
                *i += 2;
                *col += 2;
            }
            Some(&c) => {
                if c == '\n' {
                    *line += 1;
                    *col = 0;
                }
                s.push(c);
                *i += 1;
                *col += 1;
            }
        }
    }
}

/// Read a regex body after `#"`. The body uses raw escape rules: only
/// `\"` is special (a literal quote); every other backslash passes
/// through untouched.
fn read_regex_body(
    chars: &[char],
    i: &mut usize,
    line: &mut usize,
    col: &mut usize,
    start: Span,
) -> Result<String, ReadError> {
    let mut s = String::new();
    loop {
        match chars.get(*i) {
            None => return Err(ReadError::NonTerminatedString { span: start }),
            Some('"') => {
                *i += 1;
                *col += 1;
                return Ok(s);
            }
            Some('\\') if chars.get(*i + 1) == Some(&'"') => {
                s.push('"');
                *i += 2;
                *col += 2;
            }
            Some(&c) => {
                if c == '\n' {
                    *line += 1;
                    *col = 0;
                }
                s.push(c);
                *i += 1;
                *col += 1;
            }
        }
    }
}

/// Read a character literal starting at the backslash.
fn read_char_literal(
    chars: &[char],
    i: &mut usize,
    col: &mut usize,
    span: Span,
) -> Result<char, ReadError> {
    let first = match chars.get(*i + 1) {
        Some(c) => *c,
        None => {
            return Err(ReadError::InvalidCharacter {
                text: String::new(),
                span,
            });
        }
    };

    // Single-char form: the next character, when followed by a terminator.
    let after = chars.get(*i + 2);
    if after.is_none() || after.is_some_and(|c| is_terminator(*c)) {
        *i += 2;
        *col += 2;
        return Ok(first);
    }

    let start = *i + 1;
    let mut end = start;
    while end < chars.len() && !is_terminator(chars[end]) {
        end += 1;
    }
    let text: String = chars[start..end].iter().collect();
    *col += end - *i;
    *i = end;

    match text.as_str() {
        "space" => return Ok(' '),
        "tab" => return Ok('\t'),
        "newline" => return Ok('\n'),
        "return" => return Ok('\r'),
        "backspace" => return Ok('\u{8}'),
        "formfeed" => return Ok('\u{c}'),
        _ => {}
    }

    if let Some(hex) = text.strip_prefix('u') {
        if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReadError::InvalidUnicode { text, span });
        }
        let code = u32::from_str_radix(hex, 16).map_err(|_| ReadError::InvalidUnicode {
            text: text.clone(),
            span,
        })?;
        return char::from_u32(code).ok_or(ReadError::InvalidUnicode { text, span });
    }

    if let Some(oct) = text.strip_prefix('o') {
        if oct.len() != 3 || !oct.chars().all(|c| ('0'..='7').contains(&c)) {
            return Err(ReadError::InvalidOctal { text, span });
        }
        let code = u32::from_str_radix(oct, 8).map_err(|_| ReadError::InvalidOctal {
            text: text.clone(),
            span,
        })?;
        if code >= 256 {
            return Err(ReadError::InvalidOctal { text, span });
        }
        return char::from_u32(code).ok_or(ReadError::InvalidOctal { text, span });
    }

    Err(ReadError::InvalidCharacter { text, span })
}

/// Resolve an `Unknown` run, in order: special form, built-in, keyword,
/// literal, number, identifier.
fn classify_word(word: &str, span: Span) -> Result<Token, ReadError> {
    if let Some(sf) = Special::from_name(word) {
        return Ok(Token::Special(sf));
    }
    if let Some(b) = Builtin::from_name(word) {
        return Ok(Token::Builtin(b));
    }
    if word == ":" {
        return Err(ReadError::InvalidKeyword { span });
    }
    if let Some(name) = word.strip_prefix(':') {
        return Ok(Token::Keyword(name.to_string()));
    }
    match word {
        "nil" => return Ok(Token::Nil),
        "true" => return Ok(Token::Bool(true)),
        "false" => return Ok(Token::Bool(false)),
        _ => {}
    }
    if let Some(tok) = classify_number(word) {
        return Ok(tok);
    }
    Ok(Token::Symbol(word.to_string()))
}

/// A token with an optional leading sign, decimal digits, and at most one
/// dot is a number: exactly one dot makes it a float.
fn classify_number(word: &str) -> Option<Token> {
    let body = word
        .strip_prefix('+')
        .or_else(|| word.strip_prefix('-'))
        .unwrap_or(word);
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    match body.chars().filter(|c| *c == '.').count() {
        0 => word.parse::<i64>().ok().map(Token::Int),
        1 => word.parse::<f64>().ok().map(Token::Float),
        _ => None,
    }
}
