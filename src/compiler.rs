//! Embedder-facing façade gathering the external interface operations
//! behind one type, matching the reference compiler's `compiler_state`
//! handle: `create_compiler_state`, `parse`, `lower`, `walk`, `print`,
//! `destroy_compiler_state`, `intern_string`.
//!
//! The reference handle owns its arena outright; here the arena is a
//! `AstContext` the caller constructs and lends to `CompilerState` for its
//! lifetime, since a single Rust struct cannot both own an arena and hold
//! borrowed references into it. `create_compiler_state`'s "(allocator)"
//! input in the operation table is exactly this: the embedder supplies the
//! allocator, the state borrows it.

use crate::arena_ctx::AstContext;
use crate::ast::FunctionExpr;
use crate::error::ParseError;
use crate::intern::{Interner, Symbol};
use crate::lexer::{LexError, Lexer};
use crate::lowering::LoweringError;
use crate::walker::{self, Visitor};

/// Either half of the taxonomy named in §7: a syntax error from tokenizing
/// or parsing, or an internal failure from a later pass (currently only
/// lowering).
#[derive(Debug, Clone)]
pub enum CompileError {
    Lex(LexError),
    Syntax(ParseError),
    Lowering(LoweringError),
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex(err) => write!(f, "{}", err.message),
            CompileError::Syntax(err) => write!(f, "{}", err.kind.message()),
            CompileError::Lowering(err) => write!(f, "{}", err),
        }
    }
}

/// Opaque compiler-state handle. `'a` is the lifetime of the arenas backing
/// `ctx`; every AST node reachable from `main_function` lives that long.
pub struct CompilerState<'a> {
    interner: Interner,
    ctx: AstContext<'a>,
    main_function: Option<&'a FunctionExpr<'a>>,
    last_error: Option<CompileError>,
    display_name: String,
}

impl<'a> CompilerState<'a> {
    /// `create_compiler_state`: the embedder hands over the arena bundle
    /// that will back every node this state ever parses.
    pub fn create(ctx: AstContext<'a>) -> Self {
        CompilerState { interner: Interner::new(), ctx, main_function: None, last_error: None, display_name: String::new() }
    }

    /// `parse`: tokenizes `source` and parses it as a full chunk, storing
    /// the resulting AST inside the state. `display_name` is carried only
    /// for diagnostics (it never affects parsing).
    pub fn parse(&mut self, source: &str, display_name: &str) -> Result<(), CompileError> {
        self.display_name = display_name.to_string();
        let result = Lexer::new(source, &mut self.interner)
            .tokenize_all()
            .map_err(CompileError::from)
            .and_then(|tokens| crate::parser::parse_chunk(tokens, &mut self.interner, self.ctx).map_err(CompileError::from));
        match result {
            Ok(chunk) => {
                self.main_function = Some(chunk);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// `lower`: runs the desugaring pass over every statement in the parsed
    /// chunk's top-level body. Currently fails as soon as it meets a
    /// generic `for` loop, since [`crate::lowering`] has no implementation
    /// for that case yet.
    pub fn lower(&mut self) -> Result<(), CompileError> {
        let chunk = self.main_function.ok_or_else(|| CompileError::Lowering(LoweringError::NotImplemented))?;
        for stmt in chunk.body {
            crate::lowering::lower_stmt(stmt).map_err(CompileError::Lowering)?;
        }
        Ok(())
    }

    /// `walk`: drives `visitor` over the parsed chunk's event stream. A
    /// no-op when nothing has been parsed yet.
    pub fn walk<V: Visitor>(&self, visitor: &mut V) {
        if let Some(chunk) = self.main_function {
            walker::walk_chunk(visitor, chunk);
        }
    }

    /// `print`: renders the parsed chunk through [`crate::printer`],
    /// returning the buffer instead of taking an output-stream parameter —
    /// callers write it themselves (`write!`/`println!`/`fs::write`).
    pub fn print(&self) -> Option<String> {
        self.main_function.map(|chunk| crate::printer::print_chunk(chunk, &self.interner))
    }

    /// `intern_string`: interns `bytes` (already validated UTF-8 by the
    /// caller) and returns its handle.
    pub fn intern_string(&mut self, bytes: &str) -> Symbol {
        self.interner.intern(bytes)
    }

    pub fn last_error(&self) -> Option<&CompileError> {
        self.last_error.as_ref()
    }

    pub fn main_function(&self) -> Option<&'a FunctionExpr<'a>> {
        self.main_function
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// `destroy_compiler_state`: consumes `self`, making the release point
    /// visible at the call site even though `Drop` alone would have freed
    /// the interner regardless. The arena bundle itself outlives `self` —
    /// `'a` is borrowed, not owned — and is released by its own owner.
    pub fn destroy(self) {
        drop(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn with_state<F: FnOnce(&mut CompilerState)>(f: F) {
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
        let mut state = CompilerState::create(ctx);
        f(&mut state);
    }

    #[test]
    fn parse_then_print_round_trips_through_the_facade() {
        with_state(|state| {
            state.parse("local x: integer = 1", "<test>").unwrap();
            let out = state.print().unwrap();
            assert!(out.contains("x: integer"));
        });
    }

    #[test]
    fn parse_failure_is_remembered_as_last_error() {
        with_state(|state| {
            assert!(state.parse("local = 1", "<test>").is_err());
            assert!(state.last_error().is_some());
        });
    }

    #[test]
    fn walk_before_parse_is_a_harmless_no_op() {
        with_state(|state| {
            struct Counter(usize);
            impl Visitor for Counter {
                fn event(&mut self, _kind: walker::EventKind, _ty: Option<crate::types::Type>) {
                    self.0 += 1;
                }
            }
            let mut counter = Counter(0);
            state.walk(&mut counter);
            assert_eq!(counter.0, 0);
        });
    }

    #[test]
    fn lower_surfaces_not_implemented_for_generic_for() {
        with_state(|state| {
            state.parse("for k, v in pairs(t) do end", "<test>").unwrap();
            let err = state.lower().unwrap_err();
            assert!(matches!(err, CompileError::Lowering(LoweringError::NotImplemented)));
        });
    }

    #[test]
    fn intern_string_returns_stable_handles_for_equal_bytes() {
        with_state(|state| {
            let a = state.intern_string("needle");
            let b = state.intern_string("needle");
            assert_eq!(a, b);
        });
    }
}
