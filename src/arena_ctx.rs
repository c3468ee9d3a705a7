//! Bundles the arenas a parse needs and exposes builder methods for every
//! AST node shape, mirroring the teacher's `AstContext` pattern: one
//! `Copy`-able struct of arena references passed down through the parser
//! instead of a single owning allocator.

use crate::arena::Arena;
use crate::ast::{Expr, FunctionExpr, LValue, Literal, Param, Stmt, Suffix, TableField, VarRef};
use crate::intern::Symbol;
use crate::types::Type;

#[derive(Clone, Copy)]
pub struct AstContext<'a> {
    pub exprs: &'a Arena<Expr<'a>>,
    pub stmts: &'a Arena<Stmt<'a>>,
    pub functions: &'a Arena<FunctionExpr<'a>>,
    pub params: &'a Arena<Param>,
    pub suffixes: &'a Arena<Suffix<'a>>,
    pub table_fields: &'a Arena<TableField<'a>>,
    pub expr_refs: &'a Arena<&'a Expr<'a>>,
    pub lvalues: &'a Arena<LValue<'a>>,
    pub named_locals: &'a Arena<(Symbol, VarRef)>,
    pub var_refs: &'a Arena<VarRef>,
    pub elseifs: &'a Arena<(&'a Expr<'a>, &'a [Stmt<'a>])>,
}

impl<'a> AstContext<'a> {
    pub fn new(
        exprs: &'a Arena<Expr<'a>>,
        stmts: &'a Arena<Stmt<'a>>,
        functions: &'a Arena<FunctionExpr<'a>>,
        params: &'a Arena<Param>,
        suffixes: &'a Arena<Suffix<'a>>,
        table_fields: &'a Arena<TableField<'a>>,
        expr_refs: &'a Arena<&'a Expr<'a>>,
        lvalues: &'a Arena<LValue<'a>>,
        named_locals: &'a Arena<(Symbol, VarRef)>,
        var_refs: &'a Arena<VarRef>,
        elseifs: &'a Arena<(&'a Expr<'a>, &'a [Stmt<'a>])>,
    ) -> Self {
        AstContext {
            exprs,
            stmts,
            functions,
            params,
            suffixes,
            table_fields,
            expr_refs,
            lvalues,
            named_locals,
            var_refs,
            elseifs,
        }
    }

    pub fn alloc_expr(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(expr)
    }

    pub fn alloc_stmt(&self, stmt: Stmt<'a>) -> &'a Stmt<'a> {
        self.stmts.alloc(stmt)
    }

    pub fn alloc_stmts<I>(&self, stmts: I) -> &'a [Stmt<'a>]
    where
        I: IntoIterator<Item = Stmt<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.stmts.alloc_slice(stmts)
    }

    pub fn alloc_function(&self, function: FunctionExpr<'a>) -> &'a FunctionExpr<'a> {
        self.functions.alloc(function)
    }

    pub fn alloc_params<I>(&self, params: I) -> &'a [Param]
    where
        I: IntoIterator<Item = Param>,
        I::IntoIter: ExactSizeIterator,
    {
        self.params.alloc_slice(params)
    }

    pub fn alloc_suffixes<I>(&self, suffixes: I) -> &'a [Suffix<'a>]
    where
        I: IntoIterator<Item = Suffix<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.suffixes.alloc_slice(suffixes)
    }

    pub fn alloc_table_fields<I>(&self, fields: I) -> &'a [TableField<'a>]
    where
        I: IntoIterator<Item = TableField<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.table_fields.alloc_slice(fields)
    }

    pub fn alloc_expr_refs<I>(&self, exprs: I) -> &'a [&'a Expr<'a>]
    where
        I: IntoIterator<Item = &'a Expr<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.expr_refs.alloc_slice(exprs)
    }

    pub fn alloc_lvalues<I>(&self, lvalues: I) -> &'a [LValue<'a>]
    where
        I: IntoIterator<Item = LValue<'a>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.lvalues.alloc_slice(lvalues)
    }

    pub fn alloc_named_locals<I>(&self, names: I) -> &'a [(Symbol, VarRef)]
    where
        I: IntoIterator<Item = (Symbol, VarRef)>,
        I::IntoIter: ExactSizeIterator,
    {
        self.named_locals.alloc_slice(names)
    }

    pub fn alloc_var_refs<I>(&self, vars: I) -> &'a [VarRef]
    where
        I: IntoIterator<Item = VarRef>,
        I::IntoIter: ExactSizeIterator,
    {
        self.var_refs.alloc_slice(vars)
    }

    pub fn alloc_elseifs<I>(&self, elseifs: I) -> &'a [(&'a Expr<'a>, &'a [Stmt<'a>])]
    where
        I: IntoIterator<Item = (&'a Expr<'a>, &'a [Stmt<'a>])>,
        I::IntoIter: ExactSizeIterator,
    {
        self.elseifs.alloc_slice(elseifs)
    }

    pub fn literal(&self, lit: Literal) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Literal(lit))
    }

    pub fn identifier(&self, var: VarRef) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Identifier(var))
    }

    #[inline(always)]
    pub fn binary(&self, op: crate::ast::BinaryOp, left: &'a Expr<'a>, right: &'a Expr<'a>, ty: Type) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Binary { op, left, right, ty })
    }

    #[inline(always)]
    pub fn unary(&self, op: crate::ast::UnaryOp, operand: &'a Expr<'a>, ty: Type) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Unary { op, operand, ty })
    }

    #[inline(always)]
    pub fn suffixed(&self, base: &'a Expr<'a>, suffixes: &'a [Suffix<'a>], ty: Type) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Suffixed { base, suffixes, ty })
    }

    #[inline(always)]
    pub fn table_constructor(&self, fields: &'a [TableField<'a>]) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::TableConstructor { fields })
    }

    #[inline(always)]
    pub fn function_expr(&self, function: &'a FunctionExpr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(Expr::Function(function))
    }
}
