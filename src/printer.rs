//! Deterministic, indentation-based AST printer.
//!
//! Mirrors the reference implementation's recursive node printer: one
//! function per node shape, each line prefixed by two spaces per nesting
//! level, expression lines annotated with their resolved [`Type`]. Unlike
//! [`crate::walker`] this does not go through an event stream — the
//! reference printer is itself a direct recursive descent over the tree,
//! and indentation level maps naturally onto recursion depth.
//!
//! Output never depends on anything but the AST and the interner backing
//! its symbols, so two printer runs over identical input always agree
//! byte for byte; this is what makes golden-file comparisons meaningful.

use std::fmt::Write as _;

use crate::ast::{BinaryOp, Expr, FunctionExpr, LValue, Literal, Param, Stmt, Suffix, TableField, UnaryOp};
use crate::intern::Interner;
use crate::types::Type;

const INDENT: &str = "  ";

/// Prints a whole compilation unit starting at indentation level 0.
pub fn print_chunk<'a>(chunk: &'a FunctionExpr<'a>, interner: &Interner) -> String {
    let mut p = Printer { interner, buf: String::new() };
    p.function(chunk, 0);
    p.buf
}

struct Printer<'i> {
    interner: &'i Interner,
    buf: String,
}

impl<'i> Printer<'i> {
    fn line(&mut self, level: usize, args: std::fmt::Arguments) {
        for _ in 0..level {
            self.buf.push_str(INDENT);
        }
        self.buf.write_fmt(args).expect("writing to a String never fails");
        self.buf.push('\n');
    }

    fn type_name(&self, ty: Type) -> &str {
        match ty {
            Type::Any => "any",
            Type::Nil => "nil",
            Type::Boolean => "boolean",
            Type::Integer => "integer",
            Type::Number => "number",
            Type::IntegerArray => "integer[]",
            Type::NumberArray => "number[]",
            Type::Table => "table",
            Type::String => "string",
            Type::Function => "closure",
            Type::Userdata(sym) => self.interner.resolve(sym),
        }
    }

    fn param(&self, p: &Param) -> String {
        format!("{}: {}", self.interner.resolve(p.name), self.type_name(p.ty))
    }

    fn function<'a>(&mut self, f: &'a FunctionExpr<'a>, level: usize) {
        let params: Vec<String> = f.params.iter().map(|p| self.param(p)).collect();
        let vararg = if f.is_vararg { if params.is_empty() { "..." } else { ", ..." } } else { "" };
        self.line(level, format_args!("function({}{})", params.join(", "), vararg));
        self.block(f.body, level + 1);
        self.line(level, format_args!("end"));
    }

    fn block<'a>(&mut self, block: &'a [Stmt<'a>], level: usize) {
        for stmt in block {
            self.stmt(stmt, level);
        }
    }

    fn stmt<'a>(&mut self, stmt: &'a Stmt<'a>, level: usize) {
        match *stmt {
            Stmt::Local { names, values } => {
                let decls: Vec<String> = names
                    .iter()
                    .map(|(name, var)| format!("{}: {}", self.interner.resolve(*name), self.type_name(var.ty)))
                    .collect();
                self.line(level, format_args!("local {}", decls.join(", ")));
                if !values.is_empty() {
                    self.line(level + 1, format_args!("="));
                    for value in values.iter() {
                        self.expr(*value, level + 2);
                    }
                }
            }
            Stmt::LocalFunction { name, .. } => {
                self.line(level, format_args!("local function {}", self.interner.resolve(name)));
            }
            Stmt::Assign { targets, values } => {
                self.line(level, format_args!("[assign start]"));
                for target in targets.iter() {
                    match *target {
                        LValue::Var(var) => self.line(level + 1, format_args!("{}", self.interner.resolve(var.name))),
                        LValue::Suffixed(expr) => self.expr(expr, level + 1),
                    }
                }
                self.line(level, format_args!("="));
                for value in values.iter() {
                    self.expr(*value, level + 1);
                }
                self.line(level, format_args!("[assign end]"));
            }
            Stmt::ExprStmt { call } => self.expr(call, level),
            Stmt::Do { body } => {
                self.line(level, format_args!("do"));
                self.block(body, level + 1);
                self.line(level, format_args!("end"));
            }
            Stmt::While { cond, body } => {
                self.line(level, format_args!("while"));
                self.expr(cond, level + 1);
                self.line(level, format_args!("do"));
                self.block(body, level + 1);
                self.line(level, format_args!("end"));
            }
            Stmt::Repeat { body, cond } => {
                self.line(level, format_args!("repeat"));
                self.block(body, level + 1);
                self.line(level, format_args!("until"));
                self.expr(cond, level + 1);
            }
            Stmt::If { cond, then_block, elseifs, else_block } => {
                self.line(level, format_args!("if"));
                self.expr(cond, level + 1);
                self.line(level, format_args!("then"));
                self.block(then_block, level + 1);
                for (elseif_cond, elseif_block) in elseifs.iter().copied() {
                    self.line(level, format_args!("elseif"));
                    self.expr(elseif_cond, level + 1);
                    self.line(level, format_args!("then"));
                    self.block(elseif_block, level + 1);
                }
                if let Some(else_block) = else_block {
                    self.line(level, format_args!("else"));
                    self.block(else_block, level + 1);
                }
                self.line(level, format_args!("end"));
            }
            Stmt::ForNumeric { var, start, stop, step, body } => {
                let name = self.interner.resolve(var.name).to_string();
                let ty_name = self.type_name(var.ty).to_string();
                self.line(level, format_args!("for {}: {}", name, ty_name));
                self.line(level, format_args!("="));
                self.expr(start, level + 1);
                self.expr(stop, level + 1);
                if let Some(step) = step {
                    self.expr(step, level + 1);
                }
                self.line(level, format_args!("do"));
                self.block(body, level + 1);
                self.line(level, format_args!("end"));
            }
            Stmt::ForGeneric { names, exprs, body } => {
                let decls: Vec<&str> = names.iter().map(|v| self.interner.resolve(v.name)).collect();
                self.line(level, format_args!("for {}", decls.join(", ")));
                self.line(level, format_args!("in"));
                for expr in exprs.iter() {
                    self.expr(*expr, level + 1);
                }
                self.line(level, format_args!("do"));
                self.block(body, level + 1);
                self.line(level, format_args!("end"));
            }
            Stmt::Return { values } => {
                self.line(level, format_args!("return"));
                for value in values.iter() {
                    self.expr(*value, level + 1);
                }
            }
            Stmt::Break => self.line(level, format_args!("break")),
            Stmt::Goto { label } => self.line(level, format_args!("goto {}", self.interner.resolve(label))),
            Stmt::Label { name } => self.line(level, format_args!("::{}::", self.interner.resolve(name))),
        }
    }

    fn expr<'a>(&mut self, expr: &'a Expr<'a>, level: usize) {
        let ty = expr.ty();
        match *expr {
            Expr::Literal(lit) => self.literal(lit, level),
            Expr::Identifier(var) => {
                let name = self.interner.resolve(var.name).to_string();
                let ty_name = self.type_name(ty).to_string();
                self.line(level, format_args!("{} : {}", name, ty_name));
            }
            Expr::Unary { op, operand, .. } => {
                let ty_name = self.type_name(ty).to_string();
                self.line(level, format_args!("[unary expr start] {}", ty_name));
                self.line(level + 1, format_args!("{}", unary_op_str(op)));
                self.expr(operand, level + 1);
                self.line(level, format_args!("[unary expr end]"));
            }
            Expr::Binary { op, left, right, .. } => {
                let ty_name = self.type_name(ty).to_string();
                self.line(level, format_args!("[binary expr start] {}", ty_name));
                self.expr(left, level + 1);
                self.line(level, format_args!("{}", binary_op_str(op)));
                self.expr(right, level + 1);
                self.line(level, format_args!("[binary expr end]"));
            }
            Expr::Suffixed { base, suffixes, .. } => {
                let ty_name = self.type_name(ty).to_string();
                self.line(level, format_args!("[suffixed expr start] {}", ty_name));
                self.expr(base, level + 1);
                for suffix in suffixes.iter() {
                    self.suffix(suffix, level + 1);
                }
                self.line(level, format_args!("[suffixed expr end]"));
            }
            Expr::TableConstructor { fields } => {
                let ty_name = self.type_name(ty).to_string();
                self.line(level, format_args!("{{ [table constructor start] {}", ty_name));
                for field in fields.iter() {
                    self.table_field(field, level + 1);
                }
                self.line(level, format_args!("}} [table constructor end]"));
            }
            Expr::Function(f) => self.function(f, level),
        }
    }

    fn literal(&mut self, lit: Literal, level: usize) {
        match lit {
            Literal::Nil => self.line(level, format_args!("nil")),
            Literal::Boolean(b) => self.line(level, format_args!("{}", b)),
            Literal::Integer(i) => self.line(level, format_args!("{}", i)),
            Literal::Number(n) => self.line(level, format_args!("{:.16}", n)),
            Literal::String(sym) => self.line(level, format_args!("'{}'", self.interner.resolve(sym))),
        }
    }

    fn suffix<'a>(&mut self, suffix: &'a Suffix<'a>, level: usize) {
        match *suffix {
            Suffix::FieldSelector(name) => {
                self.line(level, format_args!(".{}", self.interner.resolve(name)));
            }
            Suffix::ComputedIndex(index) => {
                self.line(level, format_args!("["));
                self.expr(index, level + 1);
                self.line(level, format_args!("]"));
            }
            Suffix::FunctionCall { args, method_name } => {
                if let Some(name) = method_name {
                    self.line(level, format_args!(":{}(", self.interner.resolve(name)));
                } else {
                    self.line(level, format_args!("("));
                }
                for arg in args.iter() {
                    self.expr(*arg, level + 1);
                }
                self.line(level, format_args!(")"));
            }
        }
    }

    fn table_field<'a>(&mut self, field: &'a TableField<'a>, level: usize) {
        match *field {
            TableField::Positional(value) => self.expr(value, level),
            TableField::Named { key, value } => {
                self.line(level, format_args!("{} =", self.interner.resolve(key)));
                self.expr(value, level + 1);
            }
            TableField::Indexed { key, value } => {
                self.line(level, format_args!("["));
                self.expr(key, level + 1);
                self.line(level, format_args!("] ="));
                self.expr(value, level + 1);
            }
        }
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Not => "not",
        UnaryOp::Minus => "-",
        UnaryOp::Bnot => "~",
        UnaryOp::Len => "#",
        UnaryOp::ToInteger => "@integer",
        UnaryOp::ToNumber => "@number",
        UnaryOp::ToIntArray => "@integer[]",
        UnaryOp::ToNumArray => "@number[]",
        UnaryOp::ToTable => "@table",
        UnaryOp::ToClosure => "@closure",
        UnaryOp::ToString => "@string",
        UnaryOp::ToType(_) => "@<usertype>",
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "^",
        BinaryOp::Div => "/",
        BinaryOp::Idiv => "//",
        BinaryOp::Band => "&",
        BinaryOp::Bor => "|",
        BinaryOp::Bxor => "~",
        BinaryOp::Shl => "<<",
        BinaryOp::Shr => ">>",
        BinaryOp::Concat => "..",
        BinaryOp::Ne => "~=",
        BinaryOp::Eq => "==",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::arena_ctx::AstContext;
    use crate::lexer::Lexer;

    fn print_source(src: &str) -> String {
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
        let tokens = Lexer::new(src, &mut interner).tokenize_all().unwrap();
        let chunk = crate::parser::parse_chunk(tokens, &mut interner, ctx).unwrap();
        print_chunk(chunk, &interner)
    }

    #[test]
    fn output_is_deterministic_across_runs() {
        let src = "local x: integer = 1 + 2\nreturn x";
        assert_eq!(print_source(src), print_source(src));
    }

    #[test]
    fn local_declaration_shows_annotated_type() {
        let out = print_source("local x: integer = 1");
        assert!(out.contains("x: integer"));
    }

    #[test]
    fn binary_expression_shows_operator_and_type() {
        let out = print_source("local x = 1 + 2");
        assert!(out.contains("[binary expr start] integer"));
        assert!(out.contains("+"));
    }

    #[test]
    fn function_call_chain_prints_call_parens() {
        let out = print_source("f(1, 2)");
        assert!(out.contains("("));
        assert!(out.contains(")"));
    }

    #[test]
    fn if_chain_prints_then_and_elseif_blocks() {
        let out = print_source("if x then y() elseif z then w() else v() end");
        assert!(out.contains("if"));
        assert!(out.contains("elseif"));
        assert!(out.contains("else"));
    }

    #[test]
    fn nested_blocks_increase_indentation() {
        let out = print_source("do\n  do\n    local x = 1\n  end\nend");
        let inner_line = out.lines().find(|l| l.trim_start() == "local x: integer").unwrap();
        let leading_spaces = inner_line.len() - inner_line.trim_start().len();
        assert!(leading_spaces >= 4);
    }
}
