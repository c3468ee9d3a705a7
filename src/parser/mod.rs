//! Recursive-descent parser producing the typed AST directly from tokens.
//!
//! Mirrors the reference front end's structure: one `Parser` carrying the
//! token cursor, interner, and arena context, with symbol resolution
//! threaded through an explicit `&mut FuncStack` parameter rather than
//! stored on `self`. `FuncStack` owns every function currently being
//! parsed, so resolving a name can add an up-value to any number of
//! intervening functions in one pass, not just the immediate parent.

mod expr;
mod stmt;
mod types;

use crate::arena_ctx::AstContext;
use crate::ast::FunctionExpr;
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::{Interner, Symbol};
use crate::token::{SemInfo, Span, Token, TokenType};

pub(crate) type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a, 'int> {
    tokens: Vec<Token>,
    current: usize,
    pub(crate) interner: &'int mut Interner,
    pub(crate) ctx: AstContext<'a>,
}

impl<'a, 'int> Parser<'a, 'int> {
    pub fn new(tokens: Vec<Token>, interner: &'int mut Interner, ctx: AstContext<'a>) -> Self {
        Parser { tokens, current: 0, interner, ctx }
    }

    fn peek(&self) -> Token {
        self.tokens[self.current]
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenType::Eos
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenType) -> bool {
        self.peek().kind == kind
    }

    fn check_any(&self, kinds: &[TokenType]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    fn match_token(&mut self, kind: TokenType) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn consume(&mut self, kind: TokenType) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken { expected: kind, found: self.peek().kind },
                span: self.current_span(),
            })
        }
    }

    /// Matches a closing keyword against the token that opened the block,
    /// reporting the opening line on mismatch the way `check_match` does in
    /// the reference parser.
    fn check_match(&mut self, close: TokenType, open: TokenType, open_line: u32) -> ParseResult<Token> {
        if self.check(close) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                kind: ParseErrorKind::MismatchedCloser { expected: close, opened_at_line: open_line, found: self.peek().kind },
                span: self.current_span(),
            })
        }
    }

    /// Consumes a `Name` token and returns its interned symbol.
    fn name_and_next(&mut self) -> ParseResult<(Symbol, Span)> {
        if !self.check(TokenType::Name) {
            return Err(ParseError {
                kind: ParseErrorKind::NameExpected { found: self.peek().kind },
                span: self.current_span(),
            });
        }
        let tok = self.advance();
        match tok.seminfo {
            SemInfo::Str(sym) => Ok((sym, tok.span)),
            _ => unreachable!("Name token without interned seminfo"),
        }
    }

    /// True when the current token ends a block: `else`, `elseif`, `end`,
    /// `<eof>`, and (inside a repeat body) `until`.
    fn block_follow(&self, with_until: bool) -> bool {
        match self.peek().kind {
            TokenType::Else | TokenType::Elseif | TokenType::End | TokenType::Eos => true,
            TokenType::Until => with_until,
            _ => false,
        }
    }
}

/// Parses a full compilation unit (a vararg top-level chunk) into its
/// `FunctionExpr`.
pub fn parse_chunk<'a, 'int>(
    tokens: Vec<Token>,
    interner: &'int mut Interner,
    ctx: AstContext<'a>,
) -> ParseResult<&'a FunctionExpr<'a>> {
    let mut parser = Parser::new(tokens, interner, ctx);
    let mut stack = crate::ast::FuncStack::new(crate::ast::Function::new(None, true));
    let body = parser.parse_block(&mut stack)?;
    if !parser.is_at_end() {
        return Err(ParseError {
            kind: ParseErrorKind::UnexpectedToken { expected: TokenType::Eos, found: parser.peek().kind },
            span: parser.current_span(),
        });
    }
    let main_function = stack.exit();
    let params = ctx.alloc_params([]);
    Ok(ctx.alloc_function(FunctionExpr {
        name: None,
        params,
        is_vararg: true,
        body,
        num_locals: main_function.max_locals as usize,
        num_upvalues: main_function.upvalues.len(),
    }))
}
