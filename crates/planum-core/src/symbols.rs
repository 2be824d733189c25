//! Per-call symbol tables.
//!
//! A [`SymbolTable`] lists the variable names an input field may mention.
//! It is created by the caller and handed to the parser for each call, so
//! `P(x, y)` accepts `x` and `y` while a region bound accepts nothing.

use crate::expr::Func;

/// The variables a parsed expression may reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    names: Vec<String>,
}

impl SymbolTable {
    /// Builds a table from variable names. Function names and `pi` are
    /// reserved and silently skipped.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for name in names {
            let name = name.into();
            if name == "pi" || Func::from_name(&name).is_some() || table.contains(&name) {
                continue;
            }
            table.names.push(name);
        }
        table
    }

    /// A table that accepts no variables (constant expressions only).
    #[must_use]
    pub fn constants_only() -> Self {
        Self::default()
    }

    /// Returns true if `name` is a declared variable.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Iterates over the declared names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no variable is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_are_skipped() {
        let table = SymbolTable::new(["x", "sin", "pi", "y", "x"]);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert!(table.contains("y"));
        assert!(!table.contains("sin"));
    }

    #[test]
    fn test_constants_only() {
        let table = SymbolTable::constants_only();
        assert!(table.is_empty());
        assert!(!table.contains("x"));
    }
}
