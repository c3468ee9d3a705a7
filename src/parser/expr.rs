//! Expression grammar: operator-precedence climbing, suffixed expressions
//! (field/index/call chains), table constructors, and function literals.

use super::{ParseResult, Parser};
use crate::ast::{BinaryOp, Expr, FunctionExpr, Literal, Param, Suffix, TableField, UnaryOp, UNARY_PRIORITY};
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::Symbol;
use crate::token::{SemInfo, TokenType};
use crate::types::Type;

fn binary_op_for(kind: TokenType) -> Option<BinaryOp> {
    use TokenType::*;
    Some(match kind {
        Plus => BinaryOp::Add,
        Minus => BinaryOp::Sub,
        Star => BinaryOp::Mul,
        Percent => BinaryOp::Mod,
        Caret => BinaryOp::Pow,
        Slash => BinaryOp::Div,
        Idiv => BinaryOp::Idiv,
        Ampersand => BinaryOp::Band,
        Pipe => BinaryOp::Bor,
        Tilde => BinaryOp::Bxor,
        Shl => BinaryOp::Shl,
        Shr => BinaryOp::Shr,
        Concat => BinaryOp::Concat,
        Ne => BinaryOp::Ne,
        Eq => BinaryOp::Eq,
        Lt => BinaryOp::Lt,
        Le => BinaryOp::Le,
        Gt => BinaryOp::Gt,
        Ge => BinaryOp::Ge,
        TokenType::And => BinaryOp::And,
        TokenType::Or => BinaryOp::Or,
        _ => return None,
    })
}

fn unary_op_for(kind: TokenType) -> Option<UnaryOp> {
    use TokenType::*;
    Some(match kind {
        TokenType::Not => UnaryOp::Not,
        Minus => UnaryOp::Minus,
        Tilde => UnaryOp::Bnot,
        Hash => UnaryOp::Len,
        ToInteger => UnaryOp::ToInteger,
        ToNumber => UnaryOp::ToNumber,
        ToIntArray => UnaryOp::ToIntArray,
        ToNumArray => UnaryOp::ToNumArray,
        ToTable => UnaryOp::ToTable,
        ToString => UnaryOp::ToString,
        ToClosure => UnaryOp::ToClosure,
        _ => return None,
    })
}

fn result_type_of_unary(op: UnaryOp) -> Type {
    match op {
        UnaryOp::ToInteger => Type::Integer,
        UnaryOp::ToNumber => Type::Number,
        UnaryOp::ToIntArray => Type::IntegerArray,
        UnaryOp::ToNumArray => Type::NumberArray,
        UnaryOp::ToTable => Type::Table,
        UnaryOp::ToString => Type::String,
        UnaryOp::ToClosure => Type::Function,
        UnaryOp::ToType(sym) => Type::Userdata(sym),
        UnaryOp::Not => Type::Boolean,
        UnaryOp::Len => Type::Integer,
        UnaryOp::Minus | UnaryOp::Bnot => Type::Any,
    }
}

/// Typed arithmetic result, mirroring the reference compiler's int/float
/// tagging: `int op int` stays `integer` for the ops that admit it, any
/// float operand promotes to `number`, and anything else (a non-numeric
/// operand, or a type the checker hasn't settled at parse time) falls back
/// to `any` rather than guessing.
fn result_type_of_binary(op: BinaryOp, left: Type, right: Type) -> Type {
    use BinaryOp::*;
    match op {
        Eq | Ne | Lt | Le | Gt | Ge | And | Or => Type::Boolean,
        Concat => Type::String,
        Add | Sub | Mul | Mod | Idiv => match (left, right) {
            (Type::Integer, Type::Integer) => Type::Integer,
            (Type::Integer, Type::Number) | (Type::Number, Type::Integer) | (Type::Number, Type::Number) => Type::Number,
            _ => Type::Any,
        },
        // Division and exponentiation always produce a float, even for two
        // integer operands, matching Lua's `/` and `^`.
        Div | Pow => match (left, right) {
            (Type::Integer, Type::Integer)
            | (Type::Integer, Type::Number)
            | (Type::Number, Type::Integer)
            | (Type::Number, Type::Number) => Type::Number,
            _ => Type::Any,
        },
        Band | Bor | Bxor | Shl | Shr => match (left, right) {
            (Type::Integer, Type::Integer) => Type::Integer,
            _ => Type::Any,
        },
    }
}

impl<'a, 'int> Parser<'a, 'int> {
    pub(super) fn parse_expression<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a Expr<'a>> {
        self.parse_sub_expression(func, 0)
    }

    /// `subexpr -> (simpleexp | unop subexpr) { binop subexpr }`, expanding
    /// while the next operator's left binding power exceeds `limit`.
    fn parse_sub_expression<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>, limit: u8) -> ParseResult<&'a Expr<'a>> {
        let mut left = if self.peek().kind == TokenType::ToUserType {
            let tok = self.advance();
            let SemInfo::Str(first_sym) = tok.seminfo else { unreachable!() };
            let full = self.parse_cast_user_type(first_sym)?;
            let operand = self.parse_sub_expression(func, UNARY_PRIORITY)?;
            let ty = Type::Userdata(full);
            self.ctx.unary(UnaryOp::ToType(full), operand, ty)
        } else if let Some(op) = unary_op_for(self.peek().kind) {
            self.advance();
            let operand = self.parse_sub_expression(func, UNARY_PRIORITY)?;
            let ty = result_type_of_unary(op);
            self.ctx.unary(op, operand, ty)
        } else {
            self.parse_simple_expression(func)?
        };

        while let Some(op) = binary_op_for(self.peek().kind) {
            let (op_left, op_right) = op.priority();
            if op_left <= limit {
                break;
            }
            self.advance();
            let right = self.parse_sub_expression(func, op_right)?;
            let ty = result_type_of_binary(op, left.ty(), right.ty());
            left = self.ctx.binary(op, left, right, ty);
        }
        Ok(left)
    }

    /// `simpleexp -> FLT | INT | STRING | NIL | TRUE | FALSE | constructor |
    /// FUNCTION body | suffixedexp`.
    fn parse_simple_expression<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a Expr<'a>> {
        match self.peek().kind {
            TokenType::Flt => {
                let tok = self.advance();
                let SemInfo::Flt(v) = tok.seminfo else { unreachable!() };
                Ok(self.ctx.literal(Literal::Number(v)))
            }
            TokenType::Int => {
                let tok = self.advance();
                let SemInfo::Int(v) = tok.seminfo else { unreachable!() };
                Ok(self.ctx.literal(Literal::Integer(v)))
            }
            TokenType::String => {
                let tok = self.advance();
                let SemInfo::Str(sym) = tok.seminfo else { unreachable!() };
                Ok(self.ctx.literal(Literal::String(sym)))
            }
            TokenType::Nil => {
                self.advance();
                Ok(self.ctx.literal(Literal::Nil))
            }
            TokenType::True => {
                self.advance();
                Ok(self.ctx.literal(Literal::Boolean(true)))
            }
            TokenType::False => {
                self.advance();
                Ok(self.ctx.literal(Literal::Boolean(false)))
            }
            TokenType::LBrace => self.parse_table_constructor(func),
            TokenType::Function => {
                self.advance();
                let function = self.parse_function_body(func, None, false)?;
                Ok(self.ctx.function_expr(function))
            }
            _ => self.parse_suffixed_expression(func),
        }
    }

    /// `primaryexp -> NAME | '(' expr ')'`
    fn parse_primary_expression<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a Expr<'a>> {
        match self.peek().kind {
            TokenType::LParen => {
                self.advance();
                let inner = self.parse_expression(func)?;
                self.consume(TokenType::RParen)?;
                Ok(inner)
            }
            TokenType::Name => {
                let (sym, _) = self.name_and_next()?;
                let var = crate::ast::resolve(func, sym);
                Ok(self.ctx.identifier(var))
            }
            found => Err(ParseError {
                kind: ParseErrorKind::UnexpectedSymbol { found },
                span: self.current_span(),
            }),
        }
    }

    /// `suffixedexp -> primaryexp { '.' NAME | '[' exp ']' | ':' NAME
    /// funcargs | funcargs }`
    pub(super) fn parse_suffixed_expression<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a Expr<'a>> {
        let base = self.parse_primary_expression(func)?;
        let mut suffixes: Vec<Suffix<'a>> = Vec::new();
        loop {
            match self.peek().kind {
                TokenType::Dot => {
                    self.advance();
                    let (sym, _) = self.name_and_next()?;
                    suffixes.push(Suffix::FieldSelector(sym));
                }
                TokenType::LBracket => {
                    self.advance();
                    let index = self.parse_expression(func)?;
                    self.consume(TokenType::RBracket)?;
                    suffixes.push(Suffix::ComputedIndex(index));
                }
                TokenType::Colon => {
                    self.advance();
                    let (method_name, _) = self.name_and_next()?;
                    let args = self.parse_call_args(func)?;
                    suffixes.push(Suffix::FunctionCall { args, method_name: Some(method_name) });
                }
                TokenType::LParen | TokenType::String | TokenType::LBrace => {
                    let args = self.parse_call_args(func)?;
                    suffixes.push(Suffix::FunctionCall { args, method_name: None });
                }
                _ => break,
            }
        }
        if suffixes.is_empty() {
            return Ok(base);
        }
        let suffix_slice = self.ctx.alloc_suffixes(suffixes);
        Ok(self.ctx.suffixed(base, suffix_slice, Type::Any))
    }

    /// `funcargs -> '(' [ explist ] ')' | constructor | STRING`
    fn parse_call_args<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a [&'a Expr<'a>]> {
        match self.peek().kind {
            TokenType::LParen => {
                self.advance();
                let args = if self.check(TokenType::RParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list(func)?
                };
                self.consume(TokenType::RParen)?;
                Ok(self.ctx.alloc_expr_refs(args))
            }
            TokenType::LBrace => {
                let table = self.parse_table_constructor(func)?;
                Ok(self.ctx.alloc_expr_refs([table]))
            }
            TokenType::String => {
                let tok = self.advance();
                let SemInfo::Str(sym) = tok.seminfo else { unreachable!() };
                let s = self.ctx.literal(Literal::String(sym));
                Ok(self.ctx.alloc_expr_refs([s]))
            }
            found => Err(ParseError {
                kind: ParseErrorKind::ExpectedOneOf { options: vec![TokenType::LParen, TokenType::LBrace, TokenType::String], found },
                span: self.current_span(),
            }),
        }
    }

    /// `explist -> expr { ',' expr }`
    pub(super) fn parse_expression_list<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<Vec<&'a Expr<'a>>> {
        let mut exprs = vec![self.parse_expression(func)?];
        while self.match_token(TokenType::Comma) {
            exprs.push(self.parse_expression(func)?);
        }
        Ok(exprs)
    }

    /// `constructor -> '{' [ field { sep field } [sep] ] '}'`, `sep -> ',' | ';'`
    fn parse_table_constructor<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<&'a Expr<'a>> {
        let open_line = self.current_span().line;
        self.consume(TokenType::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(TokenType::RBrace) {
            fields.push(self.parse_table_field(func)?);
            if !self.match_token(TokenType::Comma) && !self.match_token(TokenType::Semi) {
                break;
            }
        }
        self.check_match(TokenType::RBrace, TokenType::LBrace, open_line)?;
        let field_slice = self.ctx.alloc_table_fields(fields);
        Ok(self.ctx.table_constructor(field_slice))
    }

    /// `field -> listfield | recfield`, `recfield -> (NAME | '[' exp ']') '=' exp`
    fn parse_table_field<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<TableField<'a>> {
        match self.peek().kind {
            TokenType::Name if self.peek_second_is(TokenType::Assign) => {
                let (key, _) = self.name_and_next()?;
                self.consume(TokenType::Assign)?;
                let value = self.parse_expression(func)?;
                Ok(TableField::Named { key, value })
            }
            TokenType::LBracket => {
                self.advance();
                let key = self.parse_expression(func)?;
                self.consume(TokenType::RBracket)?;
                self.consume(TokenType::Assign)?;
                let value = self.parse_expression(func)?;
                Ok(TableField::Indexed { key, value })
            }
            _ => {
                let value = self.parse_expression(func)?;
                Ok(TableField::Positional(value))
            }
        }
    }

    fn peek_second_is(&self, kind: TokenType) -> bool {
        self.tokens.get(self.current + 1).map(|t| t.kind == kind).unwrap_or(false)
    }

    /// `parlist -> [ param { ',' param } ]`, `param -> NAME (':' typename)? | '...'`
    fn parse_parameter_list<'f>(&mut self, func: &mut crate::ast::FuncStack<'f>) -> ParseResult<(Vec<Param>, bool)> {
        let mut params = Vec::new();
        let mut is_vararg = false;
        if !self.check(TokenType::RParen) {
            loop {
                match self.peek().kind {
                    TokenType::Name => {
                        let (name, _) = self.name_and_next()?;
                        let ty = self.parse_optional_type_annotation()?;
                        func.declare_local(name, ty);
                        params.push(Param { name, ty });
                    }
                    TokenType::Dots => {
                        self.advance();
                        is_vararg = true;
                    }
                    found => {
                        return Err(ParseError {
                            kind: ParseErrorKind::ExpectedOneOf { options: vec![TokenType::Name, TokenType::Dots], found },
                            span: self.current_span(),
                        })
                    }
                }
                if is_vararg || !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        Ok((params, is_vararg))
    }

    /// `body -> '(' parlist ')' block END`, shared by function expressions,
    /// `local function`, and `function name ... end` statements. `name` is
    /// attached for diagnostics and printing; `is_method` injects an
    /// implicit `self` parameter.
    pub(super) fn parse_function_body<'f>(
        &mut self,
        stack: &mut crate::ast::FuncStack<'f>,
        name: Option<Symbol>,
        is_method: bool,
    ) -> ParseResult<&'a FunctionExpr<'a>> {
        let open_line = self.current_span().line;
        self.consume(TokenType::LParen)?;
        stack.enter(crate::ast::Function::new(name, false));
        if is_method {
            let self_sym = self.interner.intern("self");
            stack.declare_local(self_sym, Type::Any);
        }
        let (mut params, is_vararg) = self.parse_parameter_list(stack)?;
        if is_method {
            let self_sym = self.interner.intern("self");
            params.insert(0, Param { name: self_sym, ty: Type::Any });
        }
        stack.is_vararg = is_vararg;
        self.consume(TokenType::RParen)?;
        let body = self.parse_block(stack)?;
        self.check_match(TokenType::End, TokenType::Function, open_line)?;
        let inner = stack.exit();
        let param_slice = self.ctx.alloc_params(params);
        Ok(self.ctx.alloc_function(FunctionExpr {
            name,
            params: param_slice,
            is_vararg,
            body,
            num_locals: inner.max_locals as usize,
            num_upvalues: inner.upvalues.len(),
        }))
    }
}
