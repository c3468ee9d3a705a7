//! Region allocation for front-end objects.
//!
//! Every AST node, symbol, scope, and interned string produced while
//! parsing one compilation unit is allocated from an `Arena` owned by the
//! `CompilerState`. Objects never outlive the arena; non-owning
//! back-pointers (symbol -> scope, up-value -> captured local, function ->
//! parent) stay valid for exactly as long as the arena does.

use bumpalo::Bump;

pub struct Arena<T> {
    bump: Bump,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Arena {
            bump: Bump::new(),
            _marker: std::marker::PhantomData,
        }
    }

    pub fn alloc(&self, value: T) -> &T {
        self.bump.alloc(value)
    }

    pub fn alloc_slice<I>(&self, items: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(items)
    }

    /// Resets the arena, invalidating all references but keeping allocated
    /// capacity. A `CompilerState` that re-parses many small inputs (e.g. a
    /// REPL) can reuse one arena set instead of allocating a fresh one per
    /// parse.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_stable_reference() {
        let arena: Arena<i32> = Arena::new();
        let r1 = arena.alloc(42);
        let r2 = arena.alloc(100);
        assert_eq!(*r1, 42);
        assert_eq!(*r2, 100);
    }

    #[test]
    fn references_remain_valid_after_many_allocations() {
        let arena: Arena<i32> = Arena::new();
        let refs: Vec<&i32> = (0..10000).map(|i| arena.alloc(i)).collect();
        for (i, r) in refs.iter().enumerate() {
            assert_eq!(**r, i as i32);
        }
    }

    #[test]
    fn works_with_node_like_structs() {
        #[derive(Debug, PartialEq)]
        struct FakeNode {
            tag: u8,
            payload: i64,
        }

        let arena: Arena<FakeNode> = Arena::new();
        let n1 = arena.alloc(FakeNode { tag: 1, payload: 2 });
        let n2 = arena.alloc(FakeNode { tag: 3, payload: 4 });
        assert_eq!(n1, &FakeNode { tag: 1, payload: 2 });
        assert_eq!(n2, &FakeNode { tag: 3, payload: 4 });
    }

    #[test]
    fn alloc_slice_works() {
        let arena: Arena<i32> = Arena::new();
        let slice = arena.alloc_slice([1, 2, 3]);
        assert_eq!(slice, &[1, 2, 3]);
    }

    #[test]
    fn alloc_slice_from_vec() {
        let arena: Arena<i32> = Arena::new();
        let vec = vec![10, 20, 30];
        let slice = arena.alloc_slice(vec);
        assert_eq!(slice, &[10, 20, 30]);
    }

    #[test]
    fn alloc_empty_slice() {
        let arena: Arena<i32> = Arena::new();
        let empty: Vec<i32> = vec![];
        let slice = arena.alloc_slice(empty);
        assert!(slice.is_empty());
    }

    #[test]
    fn reset_invalidation_is_observable_via_reuse() {
        let mut arena: Arena<i32> = Arena::new();
        let before = arena.alloc(7);
        assert_eq!(*before, 7);
        arena.reset();
        let after = arena.alloc(9);
        assert_eq!(*after, 9);
    }
}
