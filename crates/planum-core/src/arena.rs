//! Arena storage for expressions.
//!
//! An [`ExprArena`] is the unit of state for one calculation: it owns every
//! expression node and every symbol name created while serving a single user
//! action, and is dropped afterwards. Nodes are hash-consed, so building the
//! same expression twice yields the same handle.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::expr::{Constant, ExprNode, Func, SymbolId};
use crate::handle::ExprHandle;
use crate::intern::InternTable;
use crate::rational::Rational;

/// Hash-consed expression storage plus the symbol table.
#[derive(Debug, Default)]
pub struct ExprArena {
    /// Storage for all expression nodes.
    nodes: Vec<ExprNode>,
    /// Interning table: maps node content to its handle.
    intern_map: HashMap<ExprNode, ExprHandle>,
    /// Symbol names.
    symbols: InternTable<String>,
}

impl ExprArena {
    /// Creates a new empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an arena with pre-allocated node capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            intern_map: HashMap::with_capacity(capacity),
            symbols: InternTable::new(),
        }
    }

    /// Interns an expression node, returning its handle.
    ///
    /// # Panics
    ///
    /// Panics if the arena outgrows 32-bit indices.
    pub fn intern(&mut self, node: ExprNode) -> ExprHandle {
        if let Some(&handle) = self.intern_map.get(&node) {
            return handle;
        }

        let index = u32::try_from(self.nodes.len()).expect("arena capacity exceeded");
        let handle = ExprHandle::new(index);
        self.nodes.push(node.clone());
        self.intern_map.insert(node, handle);
        handle
    }

    /// Gets the node at the given handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle came from another arena and is out of range.
    #[must_use]
    pub fn get(&self, handle: ExprHandle) -> &ExprNode {
        &self.nodes[handle.index()]
    }

    /// Interns a symbol name, returning its id.
    pub fn intern_symbol(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name.to_string())
    }

    /// Looks up a symbol id without creating it.
    #[must_use]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get_id(name)
    }

    /// Gets the name of a symbol by its id.
    #[must_use]
    pub fn symbol_name(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id).map(String::as_str)
    }

    /// Returns the number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Convenience constructors ===

    /// Creates a rational literal.
    pub fn number(&mut self, value: Rational) -> ExprHandle {
        self.intern(ExprNode::Number(value))
    }

    /// Creates an integer literal.
    pub fn integer(&mut self, value: i64) -> ExprHandle {
        self.number(Rational::from_integer(value))
    }

    /// Creates the literal `num/den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn rational(&mut self, num: i64, den: i64) -> ExprHandle {
        self.number(Rational::from_i64(num, den))
    }

    /// Creates a symbol expression.
    pub fn symbol(&mut self, name: &str) -> ExprHandle {
        let id = self.intern_symbol(name);
        self.intern(ExprNode::Symbol(id))
    }

    /// Creates π.
    pub fn pi(&mut self) -> ExprHandle {
        self.intern(ExprNode::Constant(Constant::Pi))
    }

    /// Creates a sum. A single argument is returned unchanged and an empty
    /// sum is zero.
    pub fn add(&mut self, args: impl Into<SmallVec<[ExprHandle; 4]>>) -> ExprHandle {
        let args = args.into();
        match args.len() {
            0 => self.integer(0),
            1 => args[0],
            _ => self.intern(ExprNode::Add(args)),
        }
    }

    /// Creates a product. A single argument is returned unchanged and an
    /// empty product is one.
    pub fn mul(&mut self, args: impl Into<SmallVec<[ExprHandle; 4]>>) -> ExprHandle {
        let args = args.into();
        match args.len() {
            0 => self.integer(1),
            1 => args[0],
            _ => self.intern(ExprNode::Mul(args)),
        }
    }

    /// Creates a power expression.
    pub fn pow(&mut self, base: ExprHandle, exp: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Pow { base, exp })
    }

    /// Creates a negation expression.
    pub fn neg(&mut self, arg: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Neg(arg))
    }

    /// Creates a quotient expression.
    pub fn div(&mut self, num: ExprHandle, den: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Div { num, den })
    }

    /// Creates a function application.
    pub fn apply(&mut self, func: Func, arg: ExprHandle) -> ExprHandle {
        self.intern(ExprNode::Function { func, arg })
    }

    // === Queries ===

    /// Returns true if `symbol` does not occur anywhere in `handle`.
    #[must_use]
    pub fn is_free_of(&self, handle: ExprHandle, symbol: SymbolId) -> bool {
        match self.get(handle) {
            ExprNode::Symbol(id) => *id != symbol,
            node => node
                .children()
                .into_iter()
                .all(|child| self.is_free_of(child, symbol)),
        }
    }

    /// Collects the symbols occurring in `handle`, in first-seen order.
    #[must_use]
    pub fn symbols_in(&self, handle: ExprHandle) -> Vec<SymbolId> {
        let mut found = Vec::new();
        self.collect_symbols(handle, &mut found);
        found
    }

    fn collect_symbols(&self, handle: ExprHandle, found: &mut Vec<SymbolId>) {
        match self.get(handle) {
            ExprNode::Symbol(id) => {
                if !found.contains(id) {
                    found.push(*id);
                }
            }
            node => {
                for child in node.children() {
                    self.collect_symbols(child, found);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_interned() {
        let mut arena = ExprArena::new();

        let x = arena.symbol("x");
        let y = arena.symbol("y");

        assert_eq!(x, arena.symbol("x"));
        assert_ne!(x, y);
        assert_eq!(arena.symbol_id("y"), Some(1));
        assert_eq!(arena.symbol_name(0), Some("x"));
    }

    #[test]
    fn test_hash_consing() {
        let mut arena = ExprArena::new();

        let x = arena.symbol("x");
        let one = arena.integer(1);

        let sum1 = arena.add(smallvec::smallvec![x, one]);
        let sum2 = arena.add(smallvec::smallvec![x, one]);
        assert_eq!(sum1, sum2);

        // x, 1, (x + 1)
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn test_degenerate_sums_and_products() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");

        assert_eq!(arena.add(SmallVec::<[ExprHandle; 4]>::new()), arena.integer(0));
        assert_eq!(arena.mul(SmallVec::<[ExprHandle; 4]>::new()), arena.integer(1));
        assert_eq!(arena.add(smallvec::smallvec![x]), x);
    }

    #[test]
    fn test_free_of() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let sin_x = arena.apply(Func::Sin, x);
        let expr = arena.mul(smallvec::smallvec![sin_x, y]);

        let x_id = arena.symbol_id("x").unwrap();
        let theta = arena.intern_symbol("theta");

        assert!(!arena.is_free_of(expr, x_id));
        assert!(arena.is_free_of(expr, theta));
        assert_eq!(arena.symbols_in(expr).len(), 2);
    }
}
