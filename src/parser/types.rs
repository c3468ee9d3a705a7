//! Type annotation parsing: local-declaration `: typename` suffixes and
//! dotted user-type names.

use super::{ParseResult, Parser};
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::Symbol;
use crate::token::TokenType;
use crate::types::{lookup_scalar_type, Type};

/// Matches the reference parser's `MAXVARS`: a chunk or function body may
/// declare at most this many locals in one `local` statement list.
pub const MAX_LOCALS: u16 = 200;

/// Matches the 256-byte buffer `parse_user_defined_type_name` formats a
/// dotted type name into.
pub const MAX_USERTYPE_NAME: usize = 256;

impl<'a, 'int> Parser<'a, 'int> {
    /// `(':' typename ('[' ']')?)?`, defaulting to `Type::Any` when absent.
    /// `typename` is one of the seven scalar keywords, or a (possibly
    /// dotted) user-defined type name.
    pub(super) fn parse_optional_type_annotation(&mut self) -> ParseResult<Type> {
        if !self.match_token(TokenType::Colon) {
            return Ok(Type::Any);
        }
        let (name_sym, _) = self.name_and_next()?;
        let name = self.interner.resolve(name_sym).to_string();
        match lookup_scalar_type(&name) {
            Some(Type::Integer) if self.peek_is_array_suffix() => {
                self.consume_array_suffix()?;
                Ok(Type::IntegerArray)
            }
            Some(Type::Number) if self.peek_is_array_suffix() => {
                self.consume_array_suffix()?;
                Ok(Type::NumberArray)
            }
            Some(scalar) => Ok(scalar),
            None => {
                let full_name = self.parse_user_defined_type_name(&name)?;
                let sym = self.interner.intern(&full_name);
                Ok(Type::Userdata(sym))
            }
        }
    }

    fn peek_is_array_suffix(&self) -> bool {
        self.check(TokenType::LBracket)
    }

    fn consume_array_suffix(&mut self) -> ParseResult<()> {
        self.consume(TokenType::LBracket)?;
        self.consume(TokenType::RBracket)?;
        Ok(())
    }

    /// Folds `NAME ('.' NAME)*` into one dotted name, bounded by
    /// `MAX_USERTYPE_NAME` bytes total.
    pub(super) fn parse_user_defined_type_name(&mut self, first: &str) -> ParseResult<String> {
        let mut buffer = first.to_string();
        while self.match_token(TokenType::Dot) {
            let (part_sym, span) = self.name_and_next()?;
            let part = self.interner.resolve(part_sym);
            if buffer.len() + part.len() + 1 >= MAX_USERTYPE_NAME {
                return Err(ParseError {
                    kind: ParseErrorKind::OvergrownUserTypeName { limit: MAX_USERTYPE_NAME },
                    span,
                });
            }
            buffer.push('.');
            buffer.push_str(part);
        }
        Ok(buffer)
    }

    /// Resolves a `@<name>` cast's user-type operand, applying the same
    /// dotted-name folding as declaration-site type annotations.
    pub(super) fn parse_cast_user_type(&mut self, first_sym: Symbol) -> ParseResult<Symbol> {
        let first = self.interner.resolve(first_sym).to_string();
        let full_name = self.parse_user_defined_type_name(&first)?;
        Ok(self.interner.intern(&full_name))
    }
}
