//! Interning tables.
//!
//! The arena keeps its symbol names in an [`InternTable`], so a name maps to
//! the same [`SymbolId`](crate::SymbolId) for the lifetime of the arena.

use hashbrown::HashMap;
use std::hash::Hash;

/// Maps values to dense `u32` ids and back.
#[derive(Debug, Clone)]
pub struct InternTable<T> {
    map: HashMap<T, u32>,
    values: Vec<T>,
}

impl<T: Clone + Eq + Hash> Default for InternTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> InternTable<T> {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Interns a value, returning its id. Existing values keep their id.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` values are interned.
    pub fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let id = u32::try_from(self.values.len()).expect("intern table overflow");
        self.map.insert(value.clone(), id);
        self.values.push(value);
        id
    }

    /// Gets a value by its id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.values.get(id as usize)
    }

    /// Gets the id of a value without interning it.
    #[must_use]
    pub fn get_id<Q>(&self, value: &Q) -> Option<u32>
    where
        T: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(value).copied()
    }

    /// Returns the number of interned values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
