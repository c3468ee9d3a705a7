pub mod expr;
pub mod stmt;
pub mod symbol;

pub use expr::{BinaryOp, Expr, FunctionExpr, Literal, Param, Suffix, TableField, UnaryOp, UNARY_PRIORITY};
pub use stmt::{Block, LValue, Stmt};
pub use symbol::{resolve, FuncStack, Function, LocalVar, Scope, UpvalDesc, VarKind, VarRef};
