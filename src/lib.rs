//! Recursive-descent front end for a dynamically typed scripting language
//! with optional static type annotations: lexer, parser, symbol resolution
//! (locals/up-values/globals), typed AST, a dense bitset utility, an
//! event-driven AST walker, and a deterministic type-annotated printer.
//!
//! [`CompilerState`] gathers the embedder-facing operations (`parse`,
//! `lower`, `walk`, `print`, `intern_string`) behind one handle; everything
//! else in this crate is usable standalone (the bitset in particular has no
//! dependency on the parser types).

pub mod arena;
pub mod arena_ctx;
pub mod ast;
pub mod bitset;
pub mod compiler;
pub mod error;
pub mod intern;
pub mod lexer;
pub mod lowering;
pub mod parser;
pub mod printer;
pub mod style;
pub mod suggest;
pub mod token;
pub mod types;
pub mod walker;

pub use arena::Arena;
pub use arena_ctx::AstContext;
pub use ast::{
    resolve, BinaryOp, Block, Expr, FuncStack, Function, FunctionExpr, LValue, Literal, LocalVar, Param, Scope, Stmt,
    Suffix, TableField, UnaryOp, UpvalDesc, VarKind, VarRef, UNARY_PRIORITY,
};
pub use bitset::{Bitset, BitsetIter};
pub use compiler::{CompileError, CompilerState};
pub use error::{describe, ParseError, ParseErrorKind};
pub use intern::{Interner, Symbol, SymbolEq};
pub use lexer::{LexError, Lexer};
pub use lowering::{lower_stmt, LoweringError};
pub use parser::{parse_chunk, Parser};
pub use printer::print_chunk;
pub use style::Style;
pub use token::{SemInfo, Span, Token, TokenType};
pub use types::{lookup_scalar_type, Type};
pub use walker::{walk_block, walk_chunk, walk_expr, walk_function, walk_stmt, EventKind, Visitor};
