//! Stack-discipline rollback of arena allocations.
//!
//! An [`ArenaScope`] remembers an arena's cursor and rewinds to it exactly
//! once. The scope holds the arena's only mutable borrow and dereferences
//! to it for pushes and accessors, so all pushes made "inside" the scope go
//! through it:
//!
//! ```
//! # fn main() -> Result<(), tinydef_mem::ArenaError> {
//! let mut arena = tinydef_mem::Arena::new(1 << 16)?;
//! arena.push(8);
//! {
//!     let scope = arena.scope();
//!     let tmp = scope.push(1024);
//!     tmp.fill(1);
//! } // cursor rewinds to 8 here, on every exit path
//! assert_eq!(arena.used(), 8);
//! # Ok(())
//! # }
//! ```
//!
//! Rewinds go through the scope's own [`pop`](ArenaScope::pop),
//! [`pop_to`](ArenaScope::pop_to) and [`clear`](ArenaScope::clear), which
//! stop at the saved cursor. Bytes pushed before the scope opened are out of
//! its reach, and the cursor it restores is never above the live one.
//!
//! Nested scopes borrow the enclosing scope, so they always release
//! innermost first; an outer scope cannot be released or dropped while an
//! inner one is alive.

use std::ops::Deref;

use tracing::debug;

use crate::arena::Arena;
use crate::vm::{OsMemory, VirtualMemory};

/// How an [`ArenaScope`] applies its rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeMode {
    /// Rewind when the scope is dropped.
    Automatic,
    /// Rewind only on an explicit [`ArenaScope::release`].
    Manual,
}

/// A saved arena cursor that is restored at most once.
pub struct ArenaScope<'a, V: VirtualMemory = OsMemory> {
    arena: &'a mut Arena<V>,
    mark: usize,
    mode: ScopeMode,
    released: bool,
}

impl<'a, V: VirtualMemory> ArenaScope<'a, V> {
    /// Record `arena`'s cursor and rewind to it on drop.
    pub fn new(arena: &'a mut Arena<V>) -> Self {
        Self::with_mode(arena, ScopeMode::Automatic)
    }

    /// Record `arena`'s cursor; the caller must call [`release`](Self::release).
    pub fn manual(arena: &'a mut Arena<V>) -> Self {
        Self::with_mode(arena, ScopeMode::Manual)
    }

    /// Record `arena`'s cursor with an explicit mode.
    pub fn with_mode(arena: &'a mut Arena<V>, mode: ScopeMode) -> Self {
        let mark = arena.used();
        Self {
            arena,
            mark,
            mode,
            released: false,
        }
    }

    /// Cursor position the scope rewinds to.
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// Release mode of this scope.
    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    /// Whether the rollback has been applied.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Rewind the arena to the saved cursor.
    ///
    /// Works in both modes; an automatic scope released early does nothing
    /// on drop. Releasing twice is a bug: it trips a debug assertion and is
    /// otherwise ignored.
    pub fn release(&mut self) {
        debug_assert!(!self.released, "arena scope released twice");
        if self.released {
            return;
        }
        self.released = true;
        self.arena.pop_to(self.mark);
    }

    /// Move the cursor back by `size` bytes, stopping at the mark.
    pub fn pop(&mut self, size: usize) {
        let target = self.arena.used().saturating_sub(size).max(self.mark);
        self.arena.pop_to(target);
    }

    /// Move the cursor back to `mark`, or to the scope's own mark if `mark`
    /// lies below it. Marks past the cursor are ignored.
    pub fn pop_to(&mut self, mark: usize) {
        self.arena.pop_to(mark.max(self.mark));
    }

    /// Drop everything pushed since the scope opened, keeping the scope open.
    pub fn clear(&mut self) {
        self.arena.pop_to(self.mark);
    }

    /// Open an automatic scope nested inside this one.
    pub fn scope(&mut self) -> ArenaScope<'_, V> {
        ArenaScope::new(&mut *self.arena)
    }

    /// Open a manual scope nested inside this one.
    pub fn manual_scope(&mut self) -> ArenaScope<'_, V> {
        ArenaScope::manual(&mut *self.arena)
    }
}

impl<V: VirtualMemory> Deref for ArenaScope<'_, V> {
    type Target = Arena<V>;

    fn deref(&self) -> &Arena<V> {
        self.arena
    }
}

impl<V: VirtualMemory> Drop for ArenaScope<'_, V> {
    fn drop(&mut self) {
        match self.mode {
            ScopeMode::Automatic if !self.released => self.release(),
            ScopeMode::Manual if !self.released => {
                debug!(mark = self.mark, "manual arena scope dropped without release");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(1 << 16).unwrap()
    }

    #[test]
    fn automatic_scope_restores_cursor() {
        let mut arena = arena();
        arena.push(40);
        {
            let mut scope = arena.scope();
            assert_eq!(scope.mark(), 40);
            scope.push(100);
            scope.pop(30);
            scope.push(500);
            assert_eq!(scope.used(), 610);
        }
        assert_eq!(arena.used(), 40);
    }

    #[test]
    fn automatic_scope_restores_on_early_return() {
        fn fill(arena: &mut Arena, fail: bool) -> Result<usize, &'static str> {
            let scope = arena.scope();
            scope.push(256);
            if fail {
                return Err("bail");
            }
            Ok(scope.used())
        }

        let mut arena = arena();
        arena.push(16);
        assert_eq!(fill(&mut arena, false), Ok(272));
        assert_eq!(arena.used(), 16);
        assert!(fill(&mut arena, true).is_err());
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn automatic_scope_restores_on_panic() {
        let mut arena = arena();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let scope = arena.scope();
            scope.push(64);
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn nested_scopes_release_innermost_first() {
        let mut arena = arena();
        arena.push(10);
        {
            let mut outer = arena.scope();
            outer.push(20);
            {
                let inner = outer.scope();
                assert_eq!(inner.mark(), 30);
                inner.push(40);
                assert_eq!(inner.used(), 70);
            }
            assert_eq!(outer.used(), 30);
            outer.push(5);
        }
        assert_eq!(arena.used(), 10);
    }

    #[test]
    fn manual_scope_waits_for_release() {
        let mut arena = arena();
        {
            let scope = arena.manual_scope();
            scope.push(128);
            assert_eq!(scope.mode(), ScopeMode::Manual);
        }
        assert_eq!(arena.used(), 128);

        let mut scope = arena.manual_scope();
        scope.push(64);
        scope.release();
        assert!(scope.is_released());
        assert_eq!(scope.used(), 128);
    }

    #[test]
    fn early_release_of_automatic_scope_applies_once() {
        let mut arena = arena();
        {
            let mut scope = arena.scope();
            scope.push(32);
            scope.release();
            assert_eq!(scope.used(), 0);
            // Allocations after the release are no longer covered.
            scope.push(8);
        }
        assert_eq!(arena.used(), 8);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "arena scope released twice")]
    fn double_release_asserts_in_debug() {
        let mut arena = arena();
        let mut scope = arena.manual_scope();
        scope.release();
        scope.release();
    }

    #[test]
    fn clear_inside_scope_stops_at_mark() {
        let mut arena = arena();
        arena.push(50);
        let mut scope = arena.manual_scope();
        scope.push(50);
        scope.clear();
        assert_eq!(scope.used(), 50);
        scope.push(10);
        scope.release();
        assert_eq!(scope.used(), 50);
    }

    #[test]
    fn pops_inside_scope_never_cross_mark() {
        let mut arena = arena();
        arena.push(100);
        {
            let mut scope = ArenaScope::new(&mut arena);
            scope.pop(200);
            assert_eq!(scope.used(), 100);
            scope.push(30);
            scope.pop_to(10);
            assert_eq!(scope.used(), 100);
            scope.push(30);
            scope.pop_to(120);
            assert_eq!(scope.used(), 120);
        }
        assert_eq!(arena.used(), 100);
    }

    #[test]
    fn nested_scope_pops_stop_at_inner_mark() {
        let mut arena = arena();
        let mut outer = arena.scope();
        outer.push(64);
        {
            let mut inner = outer.manual_scope();
            inner.push(16);
            inner.pop(1000);
            assert_eq!(inner.used(), 64);
            inner.release();
        }
        assert_eq!(outer.used(), 64);
        outer.pop(1000);
        assert_eq!(outer.used(), 0);
    }

    #[test]
    fn scope_reuses_bytes_of_released_allocations() {
        let mut arena = arena();
        let first = {
            let scope = arena.scope();
            scope.push(16).as_ptr() as usize
        };
        let second = arena.push(16).as_ptr() as usize;
        assert_eq!(first, second);
    }
}
