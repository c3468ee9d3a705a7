//! Statement grammar: blocks, control flow, declarations, and the
//! assignment/call-statement disambiguation.

use super::types::MAX_LOCALS;
use super::{ParseResult, Parser};
use crate::ast::{Block, Expr, FuncStack, Function, LValue, Stmt, Suffix, VarKind, VarRef};
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::Symbol;
use crate::token::TokenType;
use crate::types::Type;

impl<'a, 'int> Parser<'a, 'int> {
    /// Parses statements until a block terminator, folding a trailing
    /// `return` in as the list's final entry (return must end a block).
    fn parse_statement_list<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Vec<Stmt<'a>>> {
        let mut stmts = Vec::new();
        while !self.block_follow(true) {
            if self.check(TokenType::Return) {
                stmts.push(self.parse_return_statement(func)?);
                break;
            }
            if let Some(stmt) = self.parse_statement(func)? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    pub(super) fn parse_block<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Block<'a>> {
        func.open_scope();
        let stmts = self.parse_statement_list(func)?;
        func.close_scope();
        Ok(self.ctx.alloc_stmts(stmts))
    }

    fn parse_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Option<Stmt<'a>>> {
        match self.peek().kind {
            TokenType::Semi => {
                self.advance();
                Ok(None)
            }
            TokenType::If => Ok(Some(self.parse_if_statement(func)?)),
            TokenType::While => Ok(Some(self.parse_while_statement(func)?)),
            TokenType::Do => Ok(Some(self.parse_do_statement(func)?)),
            TokenType::For => Ok(Some(self.parse_for_statement(func)?)),
            TokenType::Repeat => Ok(Some(self.parse_repeat_statement(func)?)),
            TokenType::Function => Ok(Some(self.parse_function_statement(func)?)),
            TokenType::Local => {
                self.advance();
                if self.match_token(TokenType::Function) {
                    Ok(Some(self.parse_local_function_statement(func)?))
                } else {
                    Ok(Some(self.parse_local_statement(func)?))
                }
            }
            TokenType::DbColon => Ok(Some(self.parse_label_statement()?)),
            TokenType::Break => {
                self.advance();
                Ok(Some(Stmt::Break))
            }
            TokenType::Goto => Ok(Some(self.parse_goto_statement()?)),
            _ => Ok(Some(self.parse_expression_statement(func)?)),
        }
    }

    fn parse_if_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let open_line = self.current_span().line;
        self.advance(); // if
        let (cond, then_block) = self.parse_if_cond_then_block(func)?;
        let mut elseifs = Vec::new();
        while self.check(TokenType::Elseif) {
            self.advance();
            elseifs.push(self.parse_if_cond_then_block(func)?);
        }
        let else_block = if self.match_token(TokenType::Else) {
            Some(self.parse_block(func)?)
        } else {
            None
        };
        self.check_match(TokenType::End, TokenType::If, open_line)?;
        let elseifs_slice = self.ctx.alloc_elseifs(elseifs);
        Ok(Stmt::If { cond, then_block, elseifs: elseifs_slice, else_block })
    }

    /// Short-circuits when the token right after `then` is `goto` or
    /// `break`: parse just that one statement, and if a block terminator
    /// immediately follows, skip the general statement-list loop entirely.
    fn parse_if_cond_then_block<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<(&'a Expr<'a>, Block<'a>)> {
        let cond = self.parse_expression(func)?;
        self.consume(TokenType::Then)?;
        func.open_scope();
        if self.check(TokenType::Goto) || self.check(TokenType::Break) {
            let first = self.parse_statement(func)?;
            let mut stmts: Vec<Stmt<'a>> = first.into_iter().collect();
            if self.block_follow(true) {
                func.close_scope();
                return Ok((cond, self.ctx.alloc_stmts(stmts)));
            }
            stmts.extend(self.parse_statement_list(func)?);
            func.close_scope();
            return Ok((cond, self.ctx.alloc_stmts(stmts)));
        }
        let stmts = self.parse_statement_list(func)?;
        func.close_scope();
        Ok((cond, self.ctx.alloc_stmts(stmts)))
    }

    fn parse_while_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let open_line = self.current_span().line;
        self.advance(); // while
        let cond = self.parse_expression(func)?;
        self.consume(TokenType::Do)?;
        let body = self.parse_block(func)?;
        self.check_match(TokenType::End, TokenType::While, open_line)?;
        Ok(Stmt::While { cond, body })
    }

    /// The `until` condition is parsed before the loop's scope closes, so
    /// it can still see locals declared in the body.
    fn parse_repeat_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let open_line = self.current_span().line;
        self.advance(); // repeat
        func.open_scope();
        let stmts = self.parse_statement_list(func)?;
        self.check_match(TokenType::Until, TokenType::Repeat, open_line)?;
        let cond = self.parse_expression(func)?;
        func.close_scope();
        let body = self.ctx.alloc_stmts(stmts);
        Ok(Stmt::Repeat { body, cond })
    }

    fn parse_do_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let open_line = self.current_span().line;
        self.advance(); // do
        let body = self.parse_block(func)?;
        self.check_match(TokenType::End, TokenType::Do, open_line)?;
        Ok(Stmt::Do { body })
    }

    /// `for NAME '=' ...` is numeric, `for NAME {',' NAME} IN ...` is
    /// generic; anything else after the first name is an error.
    fn parse_for_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let open_line = self.current_span().line;
        self.advance(); // for
        let (first_name, _) = self.name_and_next()?;
        match self.peek().kind {
            TokenType::Assign => self.parse_fornum_statement(func, first_name, open_line),
            TokenType::Comma | TokenType::In => self.parse_for_list(func, first_name, open_line),
            found => Err(ParseError {
                kind: ParseErrorKind::ExpectedEqualsOrIn { found },
                span: self.current_span(),
            }),
        }
    }

    fn parse_fornum_statement<'f>(&mut self, func: &mut FuncStack<'f>, name: Symbol, open_line: u32) -> ParseResult<Stmt<'a>> {
        self.advance(); // '='
        let start = self.parse_expression(func)?;
        self.consume(TokenType::Comma)?;
        let stop = self.parse_expression(func)?;
        let step = if self.match_token(TokenType::Comma) {
            Some(self.parse_expression(func)?)
        } else {
            None
        };
        self.consume(TokenType::Do)?;
        func.open_scope();
        let slot = func.declare_local(name, Type::Any);
        let var = VarRef { kind: VarKind::Local, name, ty: Type::Any, slot };
        let body_stmts = self.parse_statement_list(func)?;
        func.close_scope();
        self.check_match(TokenType::End, TokenType::For, open_line)?;
        let body = self.ctx.alloc_stmts(body_stmts);
        Ok(Stmt::ForNumeric { var, start, stop, step, body })
    }

    fn parse_for_list<'f>(&mut self, func: &mut FuncStack<'f>, first_name: Symbol, open_line: u32) -> ParseResult<Stmt<'a>> {
        let mut names = vec![first_name];
        while self.match_token(TokenType::Comma) {
            let (name, _) = self.name_and_next()?;
            names.push(name);
        }
        self.consume(TokenType::In)?;
        let exprs = self.parse_expression_list(func)?;
        self.consume(TokenType::Do)?;
        func.open_scope();
        let var_refs: Vec<VarRef> = names
            .into_iter()
            .map(|name| {
                let slot = func.declare_local(name, Type::Any);
                VarRef { kind: VarKind::Local, name, ty: Type::Any, slot }
            })
            .collect();
        let body_stmts = self.parse_statement_list(func)?;
        func.close_scope();
        self.check_match(TokenType::End, TokenType::For, open_line)?;
        let names_slice = self.ctx.alloc_var_refs(var_refs);
        let exprs_slice = self.ctx.alloc_expr_refs(exprs);
        let body = self.ctx.alloc_stmts(body_stmts);
        Ok(Stmt::ForGeneric { names: names_slice, exprs: exprs_slice, body })
    }

    /// Locals are only visible starting after the whole `local a, b = ...`
    /// statement, so the right-hand side is parsed before any of the new
    /// names are declared in `func`'s scope.
    fn parse_local_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let mut pending = Vec::new();
        loop {
            let (name, span) = self.name_and_next()?;
            let ty = self.parse_optional_type_annotation()?;
            pending.push((name, ty, span));
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        let values = if self.match_token(TokenType::Assign) {
            self.parse_expression_list(func)?
        } else {
            Vec::new()
        };
        let mut entries = Vec::with_capacity(pending.len());
        for (name, ty, span) in pending {
            if func.locals.len() >= MAX_LOCALS as usize {
                return Err(ParseError { kind: ParseErrorKind::TooManyLocals { limit: MAX_LOCALS }, span });
            }
            let slot = func.declare_local(name, ty);
            entries.push((name, VarRef { kind: VarKind::Local, name, ty, slot }));
        }
        let names_slice = self.ctx.alloc_named_locals(entries);
        let values_slice = self.ctx.alloc_expr_refs(values);
        Ok(Stmt::Local { names: names_slice, values: values_slice })
    }

    /// Desugars to `local f; f = function ... end`: the local is declared
    /// before the body is parsed so the function can call itself by name.
    fn parse_local_function_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let (name, _) = self.name_and_next()?;
        let slot = func.declare_local(name, Type::Function);
        let var = VarRef { kind: VarKind::Local, name, ty: Type::Function, slot };
        let function = self.parse_function_body(func, Some(name), false)?;
        Ok(Stmt::LocalFunction { name, var, function })
    }

    /// `function funcname funcbody` desugars to an assignment against the
    /// (possibly dotted, possibly method-form) target named by `funcname`.
    fn parse_function_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        self.advance(); // function
        let (base_name, _) = self.name_and_next()?;
        let base_var = crate::ast::resolve(func, base_name);
        let mut target: &'a Expr<'a> = self.ctx.identifier(base_var);
        let mut is_method = false;
        let mut fn_name = base_name;
        loop {
            if self.match_token(TokenType::Dot) {
                let (field, _) = self.name_and_next()?;
                fn_name = field;
                let suffix_slice = self.ctx.alloc_suffixes([Suffix::FieldSelector(field)]);
                target = self.ctx.suffixed(target, suffix_slice, Type::Any);
                continue;
            }
            if self.match_token(TokenType::Colon) {
                let (method, _) = self.name_and_next()?;
                fn_name = method;
                let suffix_slice = self.ctx.alloc_suffixes([Suffix::FieldSelector(method)]);
                target = self.ctx.suffixed(target, suffix_slice, Type::Any);
                is_method = true;
            }
            break;
        }
        let function = self.parse_function_body(func, Some(fn_name), is_method)?;
        let value = self.ctx.function_expr(function);
        let target_lvalue = self.expr_to_lvalue(target);
        let targets = self.ctx.alloc_lvalues([target_lvalue]);
        let values = self.ctx.alloc_expr_refs([value]);
        Ok(Stmt::Assign { targets, values })
    }

    fn parse_label_statement(&mut self) -> ParseResult<Stmt<'a>> {
        self.advance(); // '::'
        let (name, _) = self.name_and_next()?;
        self.consume(TokenType::DbColon)?;
        Ok(Stmt::Label { name })
    }

    fn parse_goto_statement(&mut self) -> ParseResult<Stmt<'a>> {
        self.advance(); // goto
        let (label, _) = self.name_and_next()?;
        Ok(Stmt::Goto { label })
    }

    fn parse_return_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        self.advance(); // return
        let values = if self.block_follow(true) || self.check(TokenType::Semi) {
            Vec::new()
        } else {
            self.parse_expression_list(func)?
        };
        self.match_token(TokenType::Semi);
        let values_slice = self.ctx.alloc_expr_refs(values);
        Ok(Stmt::Return { values: values_slice })
    }

    /// One or more comma-separated suffixed expressions followed by `=`
    /// become an assignment; otherwise the (single) parsed expression is
    /// kept as a call statement. The reference parser never actually
    /// checks that this expression is a call rather than some other
    /// suffixed expression, and this mirrors that.
    fn parse_expression_statement<'f>(&mut self, func: &mut FuncStack<'f>) -> ParseResult<Stmt<'a>> {
        let first = self.parse_suffixed_expression(func)?;
        if self.check(TokenType::Assign) || self.check(TokenType::Comma) {
            let mut targets = vec![self.expr_to_lvalue(first)];
            while self.match_token(TokenType::Comma) {
                let next = self.parse_suffixed_expression(func)?;
                targets.push(self.expr_to_lvalue(next));
            }
            self.consume(TokenType::Assign)?;
            let values = self.parse_expression_list(func)?;
            let targets_slice = self.ctx.alloc_lvalues(targets);
            let values_slice = self.ctx.alloc_expr_refs(values);
            return Ok(Stmt::Assign { targets: targets_slice, values: values_slice });
        }
        Ok(Stmt::ExprStmt { call: first })
    }

    fn expr_to_lvalue(&self, expr: &'a Expr<'a>) -> LValue<'a> {
        match *expr {
            Expr::Identifier(v) => LValue::Var(v),
            _ => LValue::Suffixed(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::intern::Interner;
    use crate::lexer::Lexer;

    macro_rules! arenas {
        ($($name:ident),+) => {
            $(let $name = Arena::new();)+
        };
    }

    fn parse_block_str(src: &str) -> Block<'static> {
        // Leaked arenas so the returned `Block` can outlive this helper;
        // fine for tests, never done in real parsing paths.
        let exprs = Box::leak(Box::new(Arena::new()));
        let stmts = Box::leak(Box::new(Arena::new()));
        let functions = Box::leak(Box::new(Arena::new()));
        let params = Box::leak(Box::new(Arena::new()));
        let suffixes = Box::leak(Box::new(Arena::new()));
        let table_fields = Box::leak(Box::new(Arena::new()));
        let expr_refs = Box::leak(Box::new(Arena::new()));
        let lvalues = Box::leak(Box::new(Arena::new()));
        let named_locals = Box::leak(Box::new(Arena::new()));
        let var_refs = Box::leak(Box::new(Arena::new()));
        let elseifs = Box::leak(Box::new(Arena::new()));
        let ctx = crate::arena_ctx::AstContext::new(
            exprs, stmts, functions, params, suffixes, table_fields, expr_refs, lvalues, named_locals, var_refs, elseifs,
        );
        let interner = Box::leak(Box::new(Interner::new()));
        let tokens = {
            let lexer = Lexer::new(src, &mut *interner);
            lexer.tokenize_all().unwrap()
        };
        let mut parser = Parser::new(tokens, interner, ctx);
        let mut func = FuncStack::new(Function::new(None, true));
        parser.parse_block(&mut func).unwrap()
    }

    #[test]
    fn parses_local_declaration() {
        let block = parse_block_str("local x = 1");
        assert_eq!(block.len(), 1);
        assert!(matches!(block[0], Stmt::Local { .. }));
    }

    #[test]
    fn parses_if_elseif_else() {
        let block = parse_block_str("if a then b() elseif c then d() else e() end");
        assert_eq!(block.len(), 1);
        match &block[0] {
            Stmt::If { elseifs, else_block, .. } => {
                assert_eq!(elseifs.len(), 1);
                assert!(else_block.is_some());
            }
            _ => panic!("expected if statement"),
        }
    }

    #[test]
    fn goto_short_circuits_then_block() {
        let block = parse_block_str("if a then goto done end ::done::");
        assert_eq!(block.len(), 2);
        match &block[0] {
            Stmt::If { then_block, .. } => {
                assert_eq!(then_block.len(), 1);
                assert!(matches!(then_block[0], Stmt::Goto { .. }));
            }
            _ => panic!("expected if statement"),
        }
    }

    #[test]
    fn numeric_for_declares_loop_variable() {
        let block = parse_block_str("for i = 1, 10 do x = i end");
        match &block[0] {
            Stmt::ForNumeric { var, .. } => assert_eq!(var.kind, VarKind::Local),
            _ => panic!("expected numeric for"),
        }
    }

    #[test]
    fn generic_for_declares_all_names() {
        let block = parse_block_str("for k, v in pairs(t) do end");
        match &block[0] {
            Stmt::ForGeneric { names, .. } => assert_eq!(names.len(), 2),
            _ => panic!("expected generic for"),
        }
    }

    #[test]
    fn local_function_can_reference_itself() {
        let block = parse_block_str("local function fact(n) return fact(n) end");
        assert!(matches!(block[0], Stmt::LocalFunction { .. }));
    }

    #[test]
    fn bare_call_becomes_expr_stmt() {
        let block = parse_block_str("print(1)");
        assert!(matches!(block[0], Stmt::ExprStmt { .. }));
    }

    #[test]
    fn multi_assignment_parses_all_targets() {
        let block = parse_block_str("a, b = 1, 2");
        match &block[0] {
            Stmt::Assign { targets, values } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(values.len(), 2);
            }
            _ => panic!("expected assignment"),
        }
    }

    #[test]
    fn too_many_locals_is_rejected() {
        let mut src = String::new();
        for i in 0..210 {
            src.push_str(&format!("local v{} = {}\n", i, i));
        }
        let exprs = Arena::new();
        let stmts = Arena::new();
        let functions = Arena::new();
        let params = Arena::new();
        let suffixes = Arena::new();
        let table_fields = Arena::new();
        let expr_refs = Arena::new();
        let lvalues = Arena::new();
        let named_locals = Arena::new();
        let var_refs = Arena::new();
        let elseifs = Arena::new();
        let ctx = crate::arena_ctx::AstContext::new(
            &exprs, &stmts, &functions, &params, &suffixes, &table_fields, &expr_refs, &lvalues, &named_locals, &var_refs, &elseifs,
        );
        let mut interner = Interner::new();
        let tokens = {
            let lexer = Lexer::new(&src, &mut interner);
            lexer.tokenize_all().unwrap()
        };
        let mut parser = Parser::new(tokens, &mut interner, ctx);
        let mut func = FuncStack::new(Function::new(None, true));
        let err = parser.parse_block(&mut func).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::TooManyLocals { .. }));
    }
}
