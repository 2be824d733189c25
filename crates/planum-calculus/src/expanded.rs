//! The canonical sum-of-terms representation.
//!
//! An [`Expanded`] value is a finite sum `Σ cᵢ · mᵢ` where every `cᵢ` is a
//! non-zero [`Rational`] and every `mᵢ` is a [`Monomial`], a product of atoms
//! raised to non-zero integer powers. Atoms are arena handles of expressions
//! the engine cannot break down further: symbols, π, function applications,
//! fractional powers and sums kept behind a negative exponent.
//!
//! Both maps are ordered by handle index, so iteration order, and therefore
//! every printed result, is deterministic. The arithmetic here is purely
//! structural; simplification rules that need to look inside atoms live on
//! [`Calculus`](crate::Calculus).

use std::collections::BTreeMap;

use num_traits::{One, Zero};
use planum_core::{ExprHandle, Rational};

/// A product of atoms with integer exponents. The empty monomial is `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial(BTreeMap<ExprHandle, i64>);

impl Monomial {
    /// The empty product.
    #[must_use]
    pub fn one() -> Self {
        Self::default()
    }

    /// A single atom raised to `exp`.
    #[must_use]
    pub fn atom(atom: ExprHandle, exp: i64) -> Self {
        let mut m = Self::default();
        m.multiply_atom(atom, exp);
        m
    }

    /// Returns true for the empty product.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// The exponent of `atom`, zero if absent.
    #[must_use]
    pub fn exponent(&self, atom: ExprHandle) -> i64 {
        self.0.get(&atom).copied().unwrap_or(0)
    }

    /// Iterates over `(atom, exponent)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprHandle, i64)> + '_ {
        self.0.iter().map(|(&a, &e)| (a, e))
    }

    /// Number of distinct atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty product.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Multiplies in `atom^exp`, dropping the atom if its exponent cancels.
    pub fn multiply_atom(&mut self, atom: ExprHandle, exp: i64) {
        if exp == 0 {
            return;
        }
        let entry = self.0.entry(atom).or_insert(0);
        *entry += exp;
        if *entry == 0 {
            self.0.remove(&atom);
        }
    }

    /// The product of two monomials.
    #[must_use]
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = self.clone();
        for (atom, exp) in other.iter() {
            out.multiply_atom(atom, exp);
        }
        out
    }

    /// Raises every exponent to the `k`-th multiple.
    #[must_use]
    pub fn pow(&self, k: i64) -> Monomial {
        if k == 0 {
            return Monomial::one();
        }
        Monomial(self.0.iter().map(|(&a, &e)| (a, e * k)).collect())
    }

    /// Splits into the atoms satisfying `pred` and the rest.
    #[must_use]
    pub fn partition(&self, mut pred: impl FnMut(ExprHandle) -> bool) -> (Monomial, Monomial) {
        let mut yes = Monomial::one();
        let mut no = Monomial::one();
        for (atom, exp) in self.iter() {
            if pred(atom) {
                yes.multiply_atom(atom, exp);
            } else {
                no.multiply_atom(atom, exp);
            }
        }
        (yes, no)
    }
}

/// A canonical sum of rational multiples of monomials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Expanded {
    terms: BTreeMap<Monomial, Rational>,
}

impl Expanded {
    /// The empty sum.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant one.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(Rational::one())
    }

    /// A rational constant.
    #[must_use]
    pub fn constant(value: Rational) -> Self {
        Self::term(Monomial::one(), value)
    }

    /// A single atom with coefficient one.
    #[must_use]
    pub fn atom(atom: ExprHandle) -> Self {
        Self::term(Monomial::atom(atom, 1), Rational::one())
    }

    /// `coefficient · monomial`.
    #[must_use]
    pub fn term(monomial: Monomial, coefficient: Rational) -> Self {
        let mut out = Self::zero();
        out.add_term(monomial, coefficient);
        out
    }

    /// Returns true for the empty sum.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true for the empty sum.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value if this is a rational constant (zero included).
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::zero()),
            1 => self.terms.get(&Monomial::one()).cloned(),
            _ => None,
        }
    }

    /// The single term, if there is exactly one.
    #[must_use]
    pub fn as_term(&self) -> Option<(&Monomial, &Rational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// The coefficient of the first term in canonical order.
    #[must_use]
    pub fn leading_coefficient(&self) -> Option<&Rational> {
        self.terms.values().next()
    }

    /// The coefficient of `monomial`, zero if absent.
    #[must_use]
    pub fn coefficient(&self, monomial: &Monomial) -> Rational {
        self.terms.get(monomial).cloned().unwrap_or_default()
    }

    /// Iterates over `(monomial, coefficient)` pairs in canonical order.
    pub fn terms(&self) -> impl DoubleEndedIterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    /// Adds `coefficient · monomial` in place.
    pub fn add_term(&mut self, monomial: Monomial, coefficient: Rational) {
        if coefficient.is_zero() {
            return;
        }
        let entry = self.terms.entry(monomial.clone()).or_default();
        *entry = &*entry + &coefficient;
        if entry.is_zero() {
            self.terms.remove(&monomial);
        }
    }

    /// Adds another sum in place.
    pub fn add_assign(&mut self, other: &Expanded) {
        for (m, c) in other.terms() {
            self.add_term(m.clone(), c.clone());
        }
    }

    /// The sum of two values.
    #[must_use]
    pub fn add(&self, other: &Expanded) -> Expanded {
        let mut out = self.clone();
        out.add_assign(other);
        out
    }

    /// The difference of two values.
    #[must_use]
    pub fn sub(&self, other: &Expanded) -> Expanded {
        self.add(&other.neg())
    }

    /// The additive inverse.
    #[must_use]
    pub fn neg(&self) -> Expanded {
        self.scale(&-Rational::one())
    }

    /// Multiplies every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: &Rational) -> Expanded {
        if factor.is_zero() {
            return Expanded::zero();
        }
        Expanded {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    /// Multiplies every term by a monomial without further simplification.
    #[must_use]
    pub fn mul_monomial(&self, monomial: &Monomial) -> Expanded {
        let mut out = Expanded::zero();
        for (m, c) in self.terms() {
            out.add_term(m.mul(monomial), c.clone());
        }
        out
    }

    /// Returns true if every atom of every term satisfies `pred`.
    pub fn all_atoms(&self, mut pred: impl FnMut(ExprHandle) -> bool) -> bool {
        self.terms
            .keys()
            .all(|m| m.iter().all(|(atom, _)| pred(atom)))
    }
}

impl From<Rational> for Expanded {
    fn from(value: Rational) -> Self {
        Self::constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_core::ExprArena;

    #[test]
    fn test_like_terms_combine_and_cancel() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");

        let mut e = Expanded::atom(x);
        e.add_term(Monomial::atom(x, 1), Rational::from_integer(2));
        assert_eq!(e.coefficient(&Monomial::atom(x, 1)), Rational::from_integer(3));

        e.add_term(Monomial::atom(x, 1), Rational::from_integer(-3));
        assert!(e.is_zero());
        assert_eq!(e.as_constant(), Some(Rational::zero()));
    }

    #[test]
    fn test_monomial_exponents_cancel() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");

        let m = Monomial::atom(x, 2).mul(&Monomial::atom(y, 1));
        let inv = m.pow(-1);
        assert!(m.mul(&inv).is_one());
        assert_eq!(m.exponent(x), 2);
        assert_eq!(inv.exponent(y), -1);
    }

    #[test]
    fn test_constant_term_sorts_first() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let mut e = Expanded::atom(x);
        e.add_term(Monomial::one(), Rational::from_integer(5));
        let (first, c) = e.terms().next().unwrap();
        assert!(first.is_one());
        assert_eq!(c, &Rational::from_integer(5));
        assert_eq!(e.leading_coefficient(), Some(&Rational::from_integer(5)));
    }

    #[test]
    fn test_partition() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let y = arena.symbol("y");
        let m = Monomial::atom(x, 3).mul(&Monomial::atom(y, -1));
        let (with_x, rest) = m.partition(|a| a == x);
        assert_eq!(with_x, Monomial::atom(x, 3));
        assert_eq!(rest, Monomial::atom(y, -1));
    }
}
