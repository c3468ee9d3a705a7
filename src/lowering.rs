//! Desugaring pass from surface statement forms to their canonical form.
//!
//! The one surface form that needs desugaring is the generic `for ... in`
//! loop. Its canonical expansion is the classic iterator/state/control
//! triple followed by a `while` whose condition calls the iterator:
//!
//! ```text
//! for <names> in <exprs> do <body> end
//! -- desugars to --
//! do
//!   local f, s, ctrl = <exprs>
//!   while true do
//!     local <names> = f(s, ctrl)
//!     if <names[0]> == nil then break end
//!     ctrl = <names[0]>
//!     <body>
//!   end
//! end
//! ```
//!
//! This is not reached by [`crate::parser`] or [`crate::walker`] today —
//! both operate on `Stmt::ForGeneric` directly — so this module is a
//! contract, not yet wired into the pipeline. [`crate::compiler`]'s
//! `lower` operation calls it and surfaces `NotImplemented` until someone
//! completes the expansion above.

use crate::ast::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoweringError {
    /// The `for-in` desugaring described in this module's doc comment has
    /// no implementation yet.
    NotImplemented,
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoweringError::NotImplemented => {
                write!(f, "for-in lowering is not implemented")
            }
        }
    }
}

impl std::error::Error for LoweringError {}

/// Rewrites a `Stmt::ForGeneric` into its canonical `do ... local f, s,
/// ctrl = ...; while true do ... end end` desugaring.
///
/// Every other statement shape is returned unchanged (lowering is a no-op
/// outside generic `for` loops).
pub fn lower_stmt<'a>(stmt: &'a Stmt<'a>) -> Result<&'a Stmt<'a>, LoweringError> {
    match stmt {
        Stmt::ForGeneric { .. } => Err(LoweringError::NotImplemented),
        _ => Ok(stmt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::arena_ctx::AstContext;
    use crate::intern::Interner;
    use crate::lexer::Lexer;

    #[test]
    fn non_for_in_statements_pass_through_unchanged() {
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
        let ctx = AstContext::new(
            &exprs, &stmts, &functions, &params, &suffixes, &table_fields, &expr_refs, &lvalues, &named_locals,
            &var_refs, &elseifs,
        );
        let mut interner = Interner::new();
        let tokens = Lexer::new("break", &mut interner).tokenize_all().unwrap();
        let chunk = crate::parser::parse_chunk(tokens, &mut interner, ctx).unwrap();
        let stmt = &chunk.body[0];
        assert!(matches!(lower_stmt(stmt), Ok(Stmt::Break)));
    }

    #[test]
    fn for_in_statement_reports_not_implemented() {
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
        let ctx = AstContext::new(
            &exprs, &stmts, &functions, &params, &suffixes, &table_fields, &expr_refs, &lvalues, &named_locals,
            &var_refs, &elseifs,
        );
        let mut interner = Interner::new();
        let tokens = Lexer::new("for k, v in pairs(t) do end", &mut interner).tokenize_all().unwrap();
        let chunk = crate::parser::parse_chunk(tokens, &mut interner, ctx).unwrap();
        let stmt = &chunk.body[0];
        assert!(matches!(lower_stmt(stmt), Err(LoweringError::NotImplemented)));
    }
}
