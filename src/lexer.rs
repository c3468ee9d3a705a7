//! Byte-level scanner producing the token stream the parser consumes.
//!
//! Single pass over `&str` source; no separate structural pass is needed
//! since the grammar is keyword/brace-delimited rather than indentation
//! sensitive. String and long-bracket comment content is interned through
//! the shared `Interner` so tokens stay `Copy`.

use crate::intern::{Interner, Symbol};
use crate::token::{lookup_keyword, SemInfo, Span, Token, TokenType};

pub struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    interner: &'a mut Interner,
    lookahead: Option<Token>,
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

type LexResult<T> = Result<T, LexError>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, interner: &'a mut Interner) -> Self {
        Lexer {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            interner,
            lookahead: None,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn skip_whitespace_and_comments(&mut self) -> LexResult<()> {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.bump();
                }
                Some(b'-') if self.peek_byte_at(1) == Some(b'-') => {
                    self.pos += 2;
                    if self.starts_with("[") {
                        if let Some(level) = self.try_long_bracket_level() {
                            self.read_long_bracket(level)?;
                            continue;
                        }
                    }
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// At an opening `[`, checks for `[=*[` and returns the equals count if
    /// it is a genuine long-bracket opener, without consuming input if not.
    fn try_long_bracket_level(&mut self) -> Option<usize> {
        let save = self.pos;
        if self.peek_byte() != Some(b'[') {
            return None;
        }
        self.pos += 1;
        let mut level = 0;
        while self.peek_byte() == Some(b'=') {
            level += 1;
            self.pos += 1;
        }
        if self.peek_byte() == Some(b'[') {
            self.pos += 1;
            Some(level)
        } else {
            self.pos = save;
            None
        }
    }

    fn read_long_bracket(&mut self, level: usize) -> LexResult<String> {
        let start_line = self.line;
        let mut content = String::new();
        loop {
            match self.peek_byte() {
                None => {
                    return Err(LexError {
                        message: "unterminated long bracket".to_string(),
                        span: Span::new(self.pos, self.pos, start_line),
                    })
                }
                Some(b']') => {
                    let save = self.pos;
                    self.pos += 1;
                    let mut closing_level = 0;
                    while self.peek_byte() == Some(b'=') {
                        closing_level += 1;
                        self.pos += 1;
                    }
                    if closing_level == level && self.peek_byte() == Some(b']') {
                        self.pos += 1;
                        return Ok(content);
                    }
                    self.pos = save;
                    content.push(']');
                    self.bump();
                }
                Some(_) => {
                    let b = self.bump().unwrap();
                    content.push(b as char);
                }
            }
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    fn read_number(&mut self, span_start: usize, line: u32) -> LexResult<Token> {
        let start = self.pos;
        let is_hex = self.starts_with("0x") || self.starts_with("0X");
        if is_hex {
            self.pos += 2;
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_hexdigit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        } else {
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        let mut is_float = false;
        if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) && !is_hex {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_digit() {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
        let span = Span::new(span_start, self.pos, line);
        if is_float {
            let value: f64 = text.parse().map_err(|_| LexError {
                message: format!("malformed number '{}'", text),
                span,
            })?;
            Ok(Token::with_seminfo(TokenType::Flt, span, SemInfo::Flt(value)))
        } else if is_hex {
            let value = i64::from_str_radix(&text[2..], 16).map_err(|_| LexError {
                message: format!("malformed number '{}'", text),
                span,
            })?;
            Ok(Token::with_seminfo(TokenType::Int, span, SemInfo::Int(value)))
        } else {
            let value: i64 = text.parse().map_err(|_| LexError {
                message: format!("malformed number '{}'", text),
                span,
            })?;
            Ok(Token::with_seminfo(TokenType::Int, span, SemInfo::Int(value)))
        }
    }

    fn read_string(&mut self, quote: u8, span_start: usize, line: u32) -> LexResult<Token> {
        self.pos += 1;
        let mut content = String::new();
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    return Err(LexError {
                        message: "unterminated string".to_string(),
                        span: Span::new(span_start, self.pos, line),
                    })
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek_byte() {
                        Some(b'n') => {
                            content.push('\n');
                            self.pos += 1;
                        }
                        Some(b't') => {
                            content.push('\t');
                            self.pos += 1;
                        }
                        Some(b'r') => {
                            content.push('\r');
                            self.pos += 1;
                        }
                        Some(b'\\') => {
                            content.push('\\');
                            self.pos += 1;
                        }
                        Some(b'"') => {
                            content.push('"');
                            self.pos += 1;
                        }
                        Some(b'\'') => {
                            content.push('\'');
                            self.pos += 1;
                        }
                        Some(other) => {
                            content.push(other as char);
                            self.pos += 1;
                        }
                        None => {
                            return Err(LexError {
                                message: "unterminated escape".to_string(),
                                span: Span::new(span_start, self.pos, line),
                            })
                        }
                    }
                }
                Some(_) => {
                    let b = self.bump().unwrap();
                    content.push(b as char);
                }
            }
        }
        let sym = self.interner.intern(&content);
        let span = Span::new(span_start, self.pos, line);
        Ok(Token::with_seminfo(TokenType::String, span, SemInfo::Str(sym)))
    }

    fn read_at_cast(&mut self, span_start: usize, line: u32) -> LexResult<Token> {
        self.pos += 1;
        let name = self.read_name();
        let (kind, has_brackets_candidate) = match name.as_str() {
            "integer" => (TokenType::ToInteger, true),
            "number" => (TokenType::ToNumber, true),
            "table" => (TokenType::ToTable, false),
            "string" => (TokenType::ToString, false),
            "closure" => (TokenType::ToClosure, false),
            _ => {
                let span = Span::new(span_start, self.pos, line);
                let sym = self.interner.intern(&name);
                return Ok(Token::with_seminfo(TokenType::ToUserType, span, SemInfo::Str(sym)));
            }
        };
        if has_brackets_candidate && self.peek_byte() == Some(b'[') && self.peek_byte_at(1) == Some(b']') {
            self.pos += 2;
            let span = Span::new(span_start, self.pos, line);
            let kind = if kind == TokenType::ToInteger { TokenType::ToIntArray } else { TokenType::ToNumArray };
            return Ok(Token::new(kind, span));
        }
        let span = Span::new(span_start, self.pos, line);
        Ok(Token::new(kind, span))
    }

    fn scan_one(&mut self) -> LexResult<Token> {
        self.skip_whitespace_and_comments()?;
        let start = self.pos;
        let line = self.line;

        let b = match self.peek_byte() {
            None => return Ok(Token::new(TokenType::Eos, Span::new(start, start, line))),
            Some(b) => b,
        };

        if b.is_ascii_digit() {
            return self.read_number(start, line);
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            let name = self.read_name();
            let span = Span::new(start, self.pos, line);
            return Ok(match lookup_keyword(&name) {
                Some(kind) => Token::new(kind, span),
                None => {
                    let sym = self.interner.intern(&name);
                    Token::with_seminfo(TokenType::Name, span, SemInfo::Str(sym))
                }
            });
        }
        if b == b'"' || b == b'\'' {
            return self.read_string(b, start, line);
        }
        if b == b'@' {
            return self.read_at_cast(start, line);
        }

        macro_rules! two_char {
            ($second:expr, $kind2:expr, $kind1:expr) => {{
                self.pos += 1;
                if self.peek_byte() == Some($second) {
                    self.pos += 1;
                    Token::new($kind2, Span::new(start, self.pos, line))
                } else {
                    Token::new($kind1, Span::new(start, self.pos, line))
                }
            }};
        }

        let tok = match b {
            b'+' => {
                self.pos += 1;
                Token::new(TokenType::Plus, Span::new(start, self.pos, line))
            }
            b'-' => {
                self.pos += 1;
                Token::new(TokenType::Minus, Span::new(start, self.pos, line))
            }
            b'*' => {
                self.pos += 1;
                Token::new(TokenType::Star, Span::new(start, self.pos, line))
            }
            b'/' => {
                self.pos += 1;
                if self.peek_byte() == Some(b'/') {
                    self.pos += 1;
                    Token::new(TokenType::Idiv, Span::new(start, self.pos, line))
                } else {
                    Token::new(TokenType::Slash, Span::new(start, self.pos, line))
                }
            }
            b'%' => {
                self.pos += 1;
                Token::new(TokenType::Percent, Span::new(start, self.pos, line))
            }
            b'^' => {
                self.pos += 1;
                Token::new(TokenType::Caret, Span::new(start, self.pos, line))
            }
            b'#' => {
                self.pos += 1;
                Token::new(TokenType::Hash, Span::new(start, self.pos, line))
            }
            b'&' => {
                self.pos += 1;
                Token::new(TokenType::Ampersand, Span::new(start, self.pos, line))
            }
            b'~' => two_char!(b'=', TokenType::Ne, TokenType::Tilde),
            b'|' => {
                self.pos += 1;
                Token::new(TokenType::Pipe, Span::new(start, self.pos, line))
            }
            b'<' => {
                self.pos += 1;
                match self.peek_byte() {
                    Some(b'=') => {
                        self.pos += 1;
                        Token::new(TokenType::Le, Span::new(start, self.pos, line))
                    }
                    Some(b'<') => {
                        self.pos += 1;
                        Token::new(TokenType::Shl, Span::new(start, self.pos, line))
                    }
                    _ => Token::new(TokenType::Lt, Span::new(start, self.pos, line)),
                }
            }
            b'>' => {
                self.pos += 1;
                match self.peek_byte() {
                    Some(b'=') => {
                        self.pos += 1;
                        Token::new(TokenType::Ge, Span::new(start, self.pos, line))
                    }
                    Some(b'>') => {
                        self.pos += 1;
                        Token::new(TokenType::Shr, Span::new(start, self.pos, line))
                    }
                    _ => Token::new(TokenType::Gt, Span::new(start, self.pos, line)),
                }
            }
            b'=' => two_char!(b'=', TokenType::Eq, TokenType::Assign),
            b'(' => {
                self.pos += 1;
                Token::new(TokenType::LParen, Span::new(start, self.pos, line))
            }
            b')' => {
                self.pos += 1;
                Token::new(TokenType::RParen, Span::new(start, self.pos, line))
            }
            b'{' => {
                self.pos += 1;
                Token::new(TokenType::LBrace, Span::new(start, self.pos, line))
            }
            b'}' => {
                self.pos += 1;
                Token::new(TokenType::RBrace, Span::new(start, self.pos, line))
            }
            b'[' => {
                self.pos += 1;
                Token::new(TokenType::LBracket, Span::new(start, self.pos, line))
            }
            b']' => {
                self.pos += 1;
                Token::new(TokenType::RBracket, Span::new(start, self.pos, line))
            }
            b':' => {
                self.pos += 1;
                if self.peek_byte() == Some(b':') {
                    self.pos += 1;
                    Token::new(TokenType::DbColon, Span::new(start, self.pos, line))
                } else {
                    Token::new(TokenType::Colon, Span::new(start, self.pos, line))
                }
            }
            b';' => {
                self.pos += 1;
                Token::new(TokenType::Semi, Span::new(start, self.pos, line))
            }
            b',' => {
                self.pos += 1;
                Token::new(TokenType::Comma, Span::new(start, self.pos, line))
            }
            b'.' => {
                self.pos += 1;
                if self.peek_byte() == Some(b'.') {
                    self.pos += 1;
                    if self.peek_byte() == Some(b'.') {
                        self.pos += 1;
                        Token::new(TokenType::Dots, Span::new(start, self.pos, line))
                    } else {
                        Token::new(TokenType::Concat, Span::new(start, self.pos, line))
                    }
                } else {
                    Token::new(TokenType::Dot, Span::new(start, self.pos, line))
                }
            }
            other => {
                return Err(LexError {
                    message: format!("unexpected symbol near '{}'", other as char),
                    span: Span::new(start, start + 1, line),
                })
            }
        };
        Ok(tok)
    }

    pub fn advance(&mut self) -> LexResult<Token> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(tok);
        }
        self.scan_one()
    }

    pub fn lookahead(&mut self) -> LexResult<Token> {
        if let Some(tok) = self.lookahead {
            return Ok(tok);
        }
        let tok = self.scan_one()?;
        self.lookahead = Some(tok);
        Ok(tok)
    }

    /// Tokenizes the entire input, stopping at (and including) `<eof>`.
    pub fn tokenize_all(mut self) -> LexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.advance()?;
            let done = tok.kind == TokenType::Eos;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

pub fn intern_name(interner: &mut Interner, s: &str) -> Symbol {
    interner.intern(s)
}
