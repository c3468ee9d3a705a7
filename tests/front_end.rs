//! End-to-end scenarios driven entirely through `CompilerState`, covering
//! the concrete source -> AST shapes named for the parser.

use corvid_front::{
    Arena, AstContext, BinaryOp, CompilerState, Expr, Literal, LValue, Stmt, TableField, Type, VarKind,
};

macro_rules! with_state {
    ($state:ident, $body:block) => {{
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
        let mut $state = CompilerState::create(ctx);
        $body
    }};
}

#[test]
fn s1_local_with_untyped_declaration() {
    with_state!(state, {
        state.parse("local a = 1", "<s1>").unwrap();
        let chunk = state.main_function().unwrap();
        match chunk.body[0] {
            Stmt::Local { names, values } => {
                assert_eq!(names.len(), 1);
                assert_eq!(names[0].1.ty, Type::Any);
                assert_eq!(values.len(), 1);
                assert!(matches!(values[0], Expr::Literal(Literal::Integer(1))));
            }
            _ => panic!("expected a local statement"),
        }
    });
}

#[test]
fn s2_local_with_integer_annotation() {
    with_state!(state, {
        state.parse("local a: integer = 1", "<s2>").unwrap();
        let chunk = state.main_function().unwrap();
        match chunk.body[0] {
            Stmt::Local { names, values } => {
                assert_eq!(names[0].1.ty, Type::Integer);
                assert!(matches!(values[0], Expr::Literal(Literal::Integer(1))));
            }
            _ => panic!("expected a local statement"),
        }
    });
}

#[test]
fn s3_nested_function_captures_enclosing_local_as_upvalue() {
    with_state!(state, {
        state.parse("local a = 1\nlocal function f() return a end", "<s3>").unwrap();
        let chunk = state.main_function().unwrap();
        let inner = match chunk.body[1] {
            Stmt::LocalFunction { function, .. } => function,
            _ => panic!("expected a local function statement"),
        };
        assert_eq!(inner.num_upvalues, 1);
        match inner.body[0] {
            Stmt::Return { values } => match values[0] {
                Expr::Identifier(var) => assert_eq!(var.kind, VarKind::Upvalue),
                _ => panic!("expected an identifier expression"),
            },
            _ => panic!("expected a return statement"),
        }
    });
}

/// A two-level-removed local must be threaded through the intervening
/// function as an up-value too, not just captured by the innermost one.
#[test]
fn s3b_doubly_nested_function_threads_upvalue_through_both_levels() {
    with_state!(state, {
        state
            .parse("local x = 1\nfunction a() function b() return x end end", "<s3b>")
            .unwrap();
        let chunk = state.main_function().unwrap();
        let a = match chunk.body[1] {
            Stmt::Assign { values, .. } => match *values[0] {
                Expr::Function(f) => f,
                _ => panic!("expected a function expression"),
            },
            _ => panic!("expected an assignment statement"),
        };
        assert_eq!(a.num_upvalues, 1, "enclosing function `a` must capture `x` to pass it down");
        let b = match a.body[0] {
            Stmt::Assign { values, .. } => match *values[0] {
                Expr::Function(f) => f,
                _ => panic!("expected a function expression"),
            },
            _ => panic!("expected an assignment statement"),
        };
        assert_eq!(b.num_upvalues, 1);
        match b.body[0] {
            Stmt::Return { values } => match values[0] {
                Expr::Identifier(var) => assert_eq!(var.kind, VarKind::Upvalue, "`x` must not resolve to a global"),
                _ => panic!("expected an identifier expression"),
            },
            _ => panic!("expected a return statement"),
        }
    });
}

#[test]
fn s4_numeric_for_has_symbol_and_bounds() {
    with_state!(state, {
        state.parse("for i=1,10 do end", "<s4>").unwrap();
        let chunk = state.main_function().unwrap();
        match chunk.body[0] {
            Stmt::ForNumeric { var, start, stop, step, .. } => {
                assert_eq!(var.ty, Type::Any);
                assert!(matches!(start, Expr::Literal(Literal::Integer(1))));
                assert!(matches!(stop, Expr::Literal(Literal::Integer(10))));
                assert!(step.is_none());
            }
            _ => panic!("expected a numeric for statement"),
        }
    });
}

#[test]
fn s5_parallel_assignment_swaps_two_globals() {
    with_state!(state, {
        state.parse("a,b = b,a", "<s5>").unwrap();
        let chunk = state.main_function().unwrap();
        match chunk.body[0] {
            Stmt::Assign { targets, values } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(values.len(), 2);
                for target in targets.iter() {
                    match target {
                        LValue::Var(var) => assert_eq!(var.kind, VarKind::Global),
                        _ => panic!("expected plain variable targets"),
                    }
                }
            }
            _ => panic!("expected an assignment statement"),
        }
    });
}

#[test]
fn s6_table_constructor_has_three_typed_entries() {
    with_state!(state, {
        state.parse("local t = {x = 1, [2] = 'y', 3}", "<s6>").unwrap();
        let chunk = state.main_function().unwrap();
        let fields = match chunk.body[0] {
            Stmt::Local { values, .. } => match *values[0] {
                Expr::TableConstructor { fields } => fields,
                _ => panic!("expected a table constructor"),
            },
            _ => panic!("expected a local statement"),
        };
        assert_eq!(fields.len(), 3);
        match fields[0] {
            TableField::Named { value, .. } => assert_eq!(value.ty(), Type::Integer),
            _ => panic!("expected a named field"),
        }
        match fields[1] {
            TableField::Indexed { key, value } => {
                assert_eq!(key.ty(), Type::Integer);
                assert_eq!(value.ty(), Type::String);
            }
            _ => panic!("expected an indexed field"),
        }
        match fields[2] {
            TableField::Positional(value) => assert_eq!(value.ty(), Type::Integer),
            _ => panic!("expected a positional field"),
        }
    });
}

#[test]
fn binary_expression_type_matches_operand_type() {
    with_state!(state, {
        state.parse("local x = 1 + 2", "<binop>").unwrap();
        let chunk = state.main_function().unwrap();
        match chunk.body[0] {
            Stmt::Local { values, .. } => match *values[0] {
                Expr::Binary { op, ty, .. } => {
                    assert_eq!(op, BinaryOp::Add);
                    assert_eq!(ty, Type::Integer);
                }
                _ => panic!("expected a binary expression"),
            },
            _ => panic!("expected a local statement"),
        }
    });
}

#[test]
fn printer_output_is_stable_across_successive_parses() {
    with_state!(state, {
        state.parse("local a: integer = 1 + 2\nreturn a", "<print>").unwrap();
        let first = state.print().unwrap();
        let second = state.print().unwrap();
        assert_eq!(first, second);
        assert!(first.contains("a: integer"));
    });
}

#[test]
fn syntax_error_surfaces_through_compiler_state() {
    with_state!(state, {
        let err = state.parse("local = 1", "<bad>").unwrap_err();
        assert!(!err.to_string().is_empty());
        assert!(state.last_error().is_some());
    });
}
