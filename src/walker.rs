//! Event-driven AST traversal.
//!
//! Unlike [`crate::ast`]'s node shapes, which a caller can already match on
//! directly, this module exists for consumers that want a single linear
//! event stream over a parsed chunk — a pretty-printer, a lint pass, a
//! reference-counting pass, anything that would otherwise have to
//! reimplement the walk. Every composite node fires a `Start` event before
//! descending into its children and the matching `End` event after; the
//! two are declared as adjacent enum variants so `End as u16 == Start as
//! u16 + 1` always holds. Node lists (suffix chains, call arguments,
//! elseif arms, block statements) wrap each element in its own `Start`/
//! `End` pair tagged with the list's own event kind.
//!
//! The walk is synchronous, single-threaded, and allocates nothing beyond
//! what the visitor itself chooses to do.

use crate::ast::{BinaryOp, Expr, FunctionExpr, Literal, Stmt, Suffix, TableField, UnaryOp, VarKind};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EventKind {
    StartChunk,
    EndChunk,
    StartFunctionBody,
    EndFunctionBody,
    StartStatement,
    EndStatement,
    StartTableConstructor,
    EndTableConstructor,
    StartSuffixList,
    EndSuffixList,
    StartFunctionArg,
    EndFunctionArg,
    StartReturnExpr,
    EndReturnExpr,
    StartLocalRhsExpr,
    EndLocalRhsExpr,
    StartExprLhs,
    EndExprLhs,
    StartExprRhs,
    EndExprRhs,
    StartThenBlock,
    EndThenBlock,
    StartElseBlock,
    EndElseBlock,
    StartForExpr,
    EndForExpr,
    StartForBody,
    EndForBody,
    StartSuffixedExpr,
    EndSuffixedExpr,
    StartPrimaryExpr,
    EndPrimaryExpr,
    StartFunctionCall,
    EndFunctionCall,
    StartUnaryExpr,
    EndUnaryExpr,
    StartBinaryExpr,
    EndBinaryExpr,
    StartIndexedAssign,
    EndIndexedAssign,
}

impl EventKind {
    /// The `End` kind paired with this `Start` kind, by adjacent discriminant.
    pub fn end(self) -> EventKind {
        use EventKind::*;
        match self {
            StartChunk => EndChunk,
            StartFunctionBody => EndFunctionBody,
            StartStatement => EndStatement,
            StartTableConstructor => EndTableConstructor,
            StartSuffixList => EndSuffixList,
            StartFunctionArg => EndFunctionArg,
            StartReturnExpr => EndReturnExpr,
            StartLocalRhsExpr => EndLocalRhsExpr,
            StartExprLhs => EndExprLhs,
            StartExprRhs => EndExprRhs,
            StartThenBlock => EndThenBlock,
            StartElseBlock => EndElseBlock,
            StartForExpr => EndForExpr,
            StartForBody => EndForBody,
            StartSuffixedExpr => EndSuffixedExpr,
            StartPrimaryExpr => EndPrimaryExpr,
            StartFunctionCall => EndFunctionCall,
            StartUnaryExpr => EndUnaryExpr,
            StartBinaryExpr => EndBinaryExpr,
            StartIndexedAssign => EndIndexedAssign,
            other => unreachable!("end() called on an End event: {:?}", other),
        }
    }
}

/// Four independent entry points, mirroring the reference walker's
/// function-pointer struct: a generic structural event, a literal (which
/// carries its own value rather than an opaque type tag), and dedicated
/// hooks for unary/binary operators since those also carry an operator
/// tag alongside the event.
pub trait Visitor {
    fn event(&mut self, _kind: EventKind, _ty: Option<Type>) {}
    fn literal(&mut self, _lit: Literal, _ty: Type) {}
    fn unary(&mut self, _kind: EventKind, _op: UnaryOp, _ty: Type) {}
    fn binary(&mut self, _kind: EventKind, _op: BinaryOp, _ty: Type) {}
}

fn walk_paired<V: Visitor>(v: &mut V, kind: EventKind, ty: Option<Type>, inner: impl FnOnce(&mut V)) {
    v.event(kind, ty);
    inner(v);
    v.event(kind.end(), None);
}

fn walk_list<'a, T, V: Visitor>(v: &mut V, items: &'a [T], kind: EventKind, mut each: impl FnMut(&mut V, &'a T)) {
    for item in items {
        v.event(kind, None);
        each(v, item);
        v.event(kind.end(), None);
    }
}

/// Entry point: walks a whole compilation unit, firing `StartChunk`/`EndChunk`
/// around the main function's body.
pub fn walk_chunk<'a, V: Visitor>(v: &mut V, root: &'a FunctionExpr<'a>) {
    walk_paired(v, EventKind::StartChunk, None, |v| walk_function(v, root));
}

pub fn walk_function<'a, V: Visitor>(v: &mut V, function: &'a FunctionExpr<'a>) {
    walk_paired(v, EventKind::StartFunctionBody, None, |v| {
        walk_block(v, function.body);
    });
}

pub fn walk_block<'a, V: Visitor>(v: &mut V, block: &'a [Stmt<'a>]) {
    walk_list(v, block, EventKind::StartStatement, walk_stmt);
}

pub fn walk_stmt<'a, V: Visitor>(v: &mut V, stmt: &'a Stmt<'a>) {
    match *stmt {
        Stmt::Local { values, .. } => {
            walk_list(v, values, EventKind::StartLocalRhsExpr, |v, e| walk_expr(v, *e));
        }
        Stmt::LocalFunction { function, .. } => walk_function(v, function),
        Stmt::Assign { targets, values } => {
            for target in targets.iter() {
                if let crate::ast::LValue::Suffixed(expr) = *target {
                    walk_paired(v, EventKind::StartExprLhs, None, |v| walk_expr(v, expr));
                }
            }
            walk_list(v, values, EventKind::StartExprRhs, |v, e| walk_expr(v, *e));
        }
        Stmt::ExprStmt { call } => walk_expr(v, call),
        Stmt::Do { body } => walk_block(v, body),
        Stmt::While { cond, body } => {
            walk_expr(v, cond);
            walk_block(v, body);
        }
        Stmt::Repeat { body, cond } => {
            walk_block(v, body);
            walk_expr(v, cond);
        }
        Stmt::If { cond, then_block, elseifs, else_block } => {
            walk_expr(v, cond);
            walk_paired(v, EventKind::StartThenBlock, None, |v| walk_block(v, then_block));
            for (elseif_cond, elseif_block) in elseifs.iter().copied() {
                walk_expr(v, elseif_cond);
                walk_paired(v, EventKind::StartThenBlock, None, |v| walk_block(v, elseif_block));
            }
            if let Some(else_block) = else_block {
                walk_paired(v, EventKind::StartElseBlock, None, |v| walk_block(v, else_block));
            }
        }
        Stmt::ForNumeric { start, stop, step, body, .. } => {
            walk_paired(v, EventKind::StartForExpr, None, |v| {
                walk_expr(v, start);
                walk_expr(v, stop);
                if let Some(step) = step {
                    walk_expr(v, step);
                }
            });
            walk_paired(v, EventKind::StartForBody, None, |v| walk_block(v, body));
        }
        Stmt::ForGeneric { exprs, body, .. } => {
            walk_list(v, exprs, EventKind::StartForExpr, |v, e| walk_expr(v, *e));
            walk_paired(v, EventKind::StartForBody, None, |v| walk_block(v, body));
        }
        Stmt::Return { values } => {
            walk_list(v, values, EventKind::StartReturnExpr, |v, e| walk_expr(v, *e));
        }
        Stmt::Break | Stmt::Goto { .. } | Stmt::Label { .. } => {}
    }
}

pub fn walk_expr<'a, V: Visitor>(v: &mut V, expr: &'a Expr<'a>) {
    match *expr {
        Expr::Literal(lit) => v.literal(lit, expr.ty()),
        Expr::Identifier(var_ref) => {
            // A bare variable reference has no children; global/local/upvalue
            // classification is carried on `VarRef` itself, not as an event.
            debug_assert!(matches!(var_ref.kind, VarKind::Local | VarKind::Upvalue | VarKind::Global));
        }
        Expr::Unary { op, operand, ty } => {
            v.unary(EventKind::StartUnaryExpr, op, ty);
            walk_expr(v, operand);
            v.unary(EventKind::EndUnaryExpr, op, ty);
        }
        Expr::Binary { op, left, right, ty } => {
            v.binary(EventKind::StartBinaryExpr, op, ty);
            walk_expr(v, left);
            walk_expr(v, right);
            v.binary(EventKind::EndBinaryExpr, op, ty);
        }
        Expr::Suffixed { base, suffixes, ty } => {
            walk_paired(v, EventKind::StartSuffixedExpr, Some(ty), |v| {
                walk_paired(v, EventKind::StartPrimaryExpr, Some(base.ty()), |v| walk_expr(v, base));
                walk_list(v, suffixes, EventKind::StartSuffixList, walk_suffix);
            });
        }
        Expr::TableConstructor { fields } => {
            walk_list(v, fields, EventKind::StartTableConstructor, walk_table_field);
        }
        Expr::Function(function) => walk_function(v, function),
    }
}

fn walk_suffix<'a, V: Visitor>(v: &mut V, suffix: &'a Suffix<'a>) {
    match *suffix {
        Suffix::FieldSelector(_) => {}
        Suffix::ComputedIndex(index) => walk_expr(v, index),
        Suffix::FunctionCall { args, .. } => {
            walk_paired(v, EventKind::StartFunctionCall, None, |v| {
                walk_list(v, args, EventKind::StartFunctionArg, |v, e| walk_expr(v, *e));
            });
        }
    }
}

fn walk_table_field<'a, V: Visitor>(v: &mut V, field: &'a TableField<'a>) {
    match *field {
        TableField::Positional(value) => walk_expr(v, value),
        TableField::Named { value, .. } => walk_expr(v, value),
        TableField::Indexed { key, value } => {
            walk_paired(v, EventKind::StartIndexedAssign, None, |v| {
                walk_expr(v, key);
                walk_expr(v, value);
            });
        }
    }
}
