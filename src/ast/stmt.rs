//! Statement AST nodes.

use super::expr::{Expr, FunctionExpr};
use super::symbol::VarRef;
use crate::intern::Symbol;

pub type Block<'a> = &'a [Stmt<'a>];

#[derive(Debug)]
pub enum LValue<'a> {
    Var(VarRef),
    Suffixed(&'a Expr<'a>),
}

#[derive(Debug)]
pub enum Stmt<'a> {
    Local {
        names: &'a [(Symbol, VarRef)],
        values: &'a [&'a Expr<'a>],
    },
    LocalFunction {
        name: Symbol,
        var: VarRef,
        function: &'a FunctionExpr<'a>,
    },
    Assign {
        targets: &'a [LValue<'a>],
        values: &'a [&'a Expr<'a>],
    },
    /// A call used as a statement; the grammar requires the expression to
    /// be a function/method call, not an arbitrary suffixed expression.
    ExprStmt {
        call: &'a Expr<'a>,
    },
    Do {
        body: Block<'a>,
    },
    While {
        cond: &'a Expr<'a>,
        body: Block<'a>,
    },
    Repeat {
        body: Block<'a>,
        cond: &'a Expr<'a>,
    },
    If {
        cond: &'a Expr<'a>,
        then_block: Block<'a>,
        elseifs: &'a [(&'a Expr<'a>, Block<'a>)],
        else_block: Option<Block<'a>>,
    },
    ForNumeric {
        var: VarRef,
        start: &'a Expr<'a>,
        stop: &'a Expr<'a>,
        step: Option<&'a Expr<'a>>,
        body: Block<'a>,
    },
    ForGeneric {
        names: &'a [VarRef],
        exprs: &'a [&'a Expr<'a>],
        body: Block<'a>,
    },
    Return {
        values: &'a [&'a Expr<'a>],
    },
    Break,
    Goto {
        label: Symbol,
    },
    Label {
        name: Symbol,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_a_statement_slice() {
        let stmts: Vec<Stmt> = vec![Stmt::Break];
        let block: Block = &stmts;
        assert_eq!(block.len(), 1);
    }
}
