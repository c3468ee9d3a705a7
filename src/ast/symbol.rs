//! Symbol resolution: locals, up-values, globals, and lexical scopes.
//!
//! Resolution happens during parsing, not as a separate pass: each
//! `Function` tracks its own locals and up-value list, and `Scope`s form a
//! chain within a function. Nesting across functions is tracked by
//! [`FuncStack`], which owns every function currently being parsed
//! (outermost first); `resolve` walks it from the innermost function
//! outward, threading an up-value entry through every intervening function
//! on the way back, the same way the reference parser's
//! `search_for_variable`/`add_upvalue_in_levels_upto` pair does over its
//! parent-pointer chain.

use crate::intern::Symbol as Name;
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Local,
    Upvalue,
    Global,
}

/// A resolved reference to a variable, as stored in `Expr::Identifier`.
#[derive(Debug, Clone, Copy)]
pub struct VarRef {
    pub kind: VarKind,
    pub name: Name,
    pub ty: Type,
    /// Slot index into the owning function's `locals`/`upvalues` list.
    /// Unused (0) for `Global`.
    pub slot: u16,
}

#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: Name,
    pub ty: Type,
}

/// Describes how a function captures a binding from an enclosing scope:
/// either directly from the immediately enclosing function's locals, or by
/// threading an up-value that enclosing function already captured from
/// further out.
#[derive(Debug, Clone)]
pub struct UpvalDesc {
    pub name: Name,
    pub ty: Type,
    pub from_parent_local: bool,
    pub parent_slot: u16,
}

/// One lexical block inside a function. Scopes form a tree via `parent`;
/// `local_base` is the index into the owning function's `locals` Vec where
/// this scope's own declarations start.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub parent: Option<usize>,
    pub local_base: usize,
}

#[derive(Debug)]
pub struct Function<'a> {
    pub name: Option<Name>,
    pub is_vararg: bool,
    pub locals: Vec<LocalVar>,
    pub upvalues: Vec<UpvalDesc>,
    pub scopes: Vec<Scope>,
    pub current_scope: usize,
    /// High-water mark of `locals.len()`, tracked separately because
    /// `close_scope` truncates live locals back down on block exit but the
    /// emitted `FunctionExpr` still needs the total slot count ever live.
    pub max_locals: u16,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a> Function<'a> {
    pub fn new(name: Option<Name>, is_vararg: bool) -> Self {
        Function {
            name,
            is_vararg,
            locals: Vec::new(),
            upvalues: Vec::new(),
            scopes: vec![Scope { parent: None, local_base: 0 }],
            current_scope: 0,
            max_locals: 0,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn open_scope(&mut self) {
        let base = self.locals.len();
        self.scopes.push(Scope { parent: Some(self.current_scope), local_base: base });
        self.current_scope = self.scopes.len() - 1;
    }

    pub fn close_scope(&mut self) {
        let base = self.scopes[self.current_scope].local_base;
        self.locals.truncate(base);
        self.current_scope = self.scopes[self.current_scope].parent.unwrap_or(0);
    }

    pub fn declare_local(&mut self, name: Name, ty: Type) -> u16 {
        self.locals.push(LocalVar { name, ty });
        self.max_locals = self.max_locals.max(self.locals.len() as u16);
        (self.locals.len() - 1) as u16
    }

    /// Searches scopes of this function only, innermost first, for `name`.
    fn search_local(&self, name: Name) -> Option<u16> {
        let mut scope_idx = Some(self.current_scope);
        while let Some(idx) = scope_idx {
            let scope = self.scopes[idx];
            let slice = &self.locals[scope.local_base..];
            if let Some(pos) = slice.iter().rposition(|l| l.name == name) {
                return Some((scope.local_base + pos) as u16);
            }
            scope_idx = scope.parent;
        }
        None
    }

    fn find_upvalue(&self, name: Name) -> Option<u16> {
        self.upvalues.iter().position(|u| u.name == name).map(|i| i as u16)
    }

    fn add_upvalue(&mut self, name: Name, ty: Type, from_parent_local: bool, parent_slot: u16) -> u16 {
        self.upvalues.push(UpvalDesc { name, ty, from_parent_local, parent_slot });
        (self.upvalues.len() - 1) as u16
    }
}

/// Every function currently being parsed, outermost first. The parser
/// pushes a new `Function` on entering a function body and pops it on
/// leaving, so at any point during parsing this holds the full chain of
/// lexical enclosure for the point the cursor is at -- exactly the chain
/// `resolve` needs to thread an up-value through more than one level.
pub struct FuncStack<'a> {
    levels: Vec<Function<'a>>,
}

impl<'a> FuncStack<'a> {
    pub fn new(root: Function<'a>) -> Self {
        FuncStack { levels: vec![root] }
    }

    /// Enters a nested function body, making it the current (innermost) one.
    pub fn enter(&mut self, func: Function<'a>) {
        self.levels.push(func);
    }

    /// Leaves the current function body, returning it to the caller so its
    /// `max_locals`/`upvalues` can be read into a `FunctionExpr`.
    pub fn exit(&mut self) -> Function<'a> {
        self.levels.pop().expect("FuncStack::exit called with no function on the stack")
    }
}

impl<'a> std::ops::Deref for FuncStack<'a> {
    type Target = Function<'a>;
    fn deref(&self) -> &Function<'a> {
        self.levels.last().expect("FuncStack is never empty")
    }
}

impl<'a> std::ops::DerefMut for FuncStack<'a> {
    fn deref_mut(&mut self) -> &mut Function<'a> {
        self.levels.last_mut().expect("FuncStack is never empty")
    }
}

/// Resolves `name` against the innermost function on `stack`, threading an
/// up-value entry through every intervening function when the binding
/// turns out to live in an outer function's locals or up-value list.
/// Mirrors the reference parser's `search_for_variable`: recurse outward
/// one level at a time, and on the way back out, record an up-value at
/// each level the name had to pass through.
pub fn resolve<'a>(stack: &mut FuncStack<'a>, name: Name) -> VarRef {
    let top = stack.levels.len() - 1;
    resolve_at(&mut stack.levels, top, name)
}

fn resolve_at<'a>(levels: &mut [Function<'a>], idx: usize, name: Name) -> VarRef {
    if let Some(slot) = levels[idx].search_local(name) {
        let ty = levels[idx].locals[slot as usize].ty;
        return VarRef { kind: VarKind::Local, name, ty, slot };
    }
    if let Some(slot) = levels[idx].find_upvalue(name) {
        let ty = levels[idx].upvalues[slot as usize].ty;
        return VarRef { kind: VarKind::Upvalue, name, ty, slot };
    }
    if idx == 0 {
        return VarRef { kind: VarKind::Global, name, ty: Type::Any, slot: 0 };
    }
    let (outer, inner) = levels.split_at_mut(idx);
    let found_in_outer = resolve_at(outer, idx - 1, name);
    let current = &mut inner[0];
    match found_in_outer.kind {
        VarKind::Local => {
            let slot = current.add_upvalue(name, found_in_outer.ty, true, found_in_outer.slot);
            VarRef { kind: VarKind::Upvalue, name, ty: found_in_outer.ty, slot }
        }
        VarKind::Upvalue => {
            let slot = current.add_upvalue(name, found_in_outer.ty, false, found_in_outer.slot);
            VarRef { kind: VarKind::Upvalue, name, ty: found_in_outer.ty, slot }
        }
        VarKind::Global => found_in_outer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn resolves_local_in_same_function() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.declare_local(x, Type::Integer);
        let r = resolve(&mut stack, x);
        assert_eq!(r.kind, VarKind::Local);
        assert_eq!(r.slot, 0);
    }

    #[test]
    fn unresolved_name_is_global() {
        let mut interner = Interner::new();
        let g = interner.intern("g");
        let mut stack = FuncStack::new(Function::new(None, false));
        let r = resolve(&mut stack, g);
        assert_eq!(r.kind, VarKind::Global);
    }

    #[test]
    fn shadowing_uses_innermost_declaration() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.declare_local(x, Type::Integer);
        stack.open_scope();
        stack.declare_local(x, Type::String);
        let r = resolve(&mut stack, x);
        assert_eq!(r.ty, Type::String);
        stack.close_scope();
        let r2 = resolve(&mut stack, x);
        assert_eq!(r2.ty, Type::Integer);
    }

    #[test]
    fn captures_parent_local_as_upvalue() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.declare_local(x, Type::Integer);

        stack.enter(Function::new(None, false));
        let r = resolve(&mut stack, x);
        assert_eq!(r.kind, VarKind::Upvalue);
        assert_eq!(stack.upvalues[0].from_parent_local, true);
        assert_eq!(stack.upvalues[0].parent_slot, 0);
    }

    #[test]
    fn max_locals_survives_scope_close() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.declare_local(a, Type::Integer);
        stack.open_scope();
        stack.declare_local(b, Type::Integer);
        assert_eq!(stack.max_locals, 2);
        stack.close_scope();
        assert_eq!(stack.locals.len(), 1);
        assert_eq!(stack.max_locals, 2);
    }

    #[test]
    fn threads_upvalue_through_two_levels() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.declare_local(x, Type::Integer);

        // Neither intervening level captures `x` before the grandchild asks
        // for it -- a single `resolve` call at the innermost level must add
        // an up-value to *both* the parent and the child in one pass.
        stack.enter(Function::new(None, false));
        stack.enter(Function::new(None, false));
        let r = resolve(&mut stack, x);
        assert_eq!(r.kind, VarKind::Upvalue);
        assert_eq!(stack.upvalues[0].from_parent_local, false);
        assert_eq!(stack.upvalues[0].parent_slot, 0);

        stack.exit(); // drop the child, exposing the parent as current
        assert_eq!(stack.upvalues[0].from_parent_local, true);
        assert_eq!(stack.upvalues[0].parent_slot, 0);
    }

    #[test]
    fn three_level_chain_resolves_to_global_when_unbound() {
        let mut interner = Interner::new();
        let z = interner.intern("z");
        let mut stack = FuncStack::new(Function::new(None, false));
        stack.enter(Function::new(None, false));
        stack.enter(Function::new(None, false));
        let r = resolve(&mut stack, z);
        assert_eq!(r.kind, VarKind::Global);
        // No up-value should have been fabricated at any level.
        assert!(stack.upvalues.is_empty());
    }
}
