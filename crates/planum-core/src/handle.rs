//! Expression handles.
//!
//! A handle is a 32-bit index into an [`ExprArena`](crate::ExprArena). Because
//! the arena hash-conses its nodes, two handles from the same arena are equal
//! exactly when the expressions they name are structurally identical.

use std::fmt;

/// A handle to an expression in the arena.
///
/// Handles are ordered by allocation index. The order is arbitrary but
/// deterministic for a given sequence of arena operations, which is what
/// canonical term ordering relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprHandle(u32);

impl ExprHandle {
    /// Creates a handle from a raw index. Only the arena should call this.
    #[must_use]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the position of the node in arena storage.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_order_follows_index() {
        let a = ExprHandle::new(3);
        let b = ExprHandle::new(7);
        assert!(a < b);
        assert_eq!(b.index(), 7);
    }

    #[test]
    fn test_handle_size() {
        assert_eq!(std::mem::size_of::<ExprHandle>(), 4);
    }
}
