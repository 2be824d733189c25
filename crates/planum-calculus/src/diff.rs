//! Symbolic differentiation of expanded values.

use num_traits::One;
use planum_core::{ExprHandle, ExprNode, Func, Rational, SymbolId};

use crate::engine::Calculus;
use crate::error::Result;
use crate::expanded::Expanded;

impl Calculus<'_> {
    /// Differentiates `value` with respect to `var`.
    ///
    /// Each term is differentiated with the product rule over its atoms;
    /// function atoms use the chain rule.
    ///
    /// # Errors
    ///
    /// Propagates canonicalization failures of the derivative.
    pub fn diff(&mut self, value: &Expanded, var: SymbolId) -> Result<Expanded> {
        let mut out = Expanded::zero();
        for (monomial, coefficient) in value.terms() {
            for (atom, exp) in monomial.iter() {
                let inner = self.diff_atom(atom, var)?;
                if inner.is_zero() {
                    continue;
                }
                let mut rest = monomial.clone();
                rest.multiply_atom(atom, -1);
                let outer = Expanded::term(rest, coefficient * &Rational::from_integer(exp));
                out.add_assign(&self.mul(&outer, &inner)?);
            }
        }
        Ok(out)
    }

    /// Differentiates an expression handle (parsing output or canonical).
    ///
    /// # Errors
    ///
    /// See [`Calculus::diff`].
    pub fn diff_expr(&mut self, handle: ExprHandle, var: SymbolId) -> Result<Expanded> {
        let value = self.expand(handle)?;
        self.diff(&value, var)
    }

    /// Repeated differentiation.
    ///
    /// # Errors
    ///
    /// See [`Calculus::diff`].
    pub fn diff_n(&mut self, value: &Expanded, var: SymbolId, n: usize) -> Result<Expanded> {
        let mut out = value.clone();
        for _ in 0..n {
            if out.is_zero() {
                break;
            }
            out = self.diff(&out, var)?;
        }
        Ok(out)
    }

    fn diff_atom(&mut self, atom: ExprHandle, var: SymbolId) -> Result<Expanded> {
        if self.arena().is_free_of(atom, var) {
            return Ok(Expanded::zero());
        }
        match self.arena().get(atom).clone() {
            ExprNode::Symbol(_) => Ok(Expanded::one()),
            ExprNode::Function { func, arg } => {
                let u = self.expand(arg)?;
                let du = self.diff(&u, var)?;
                let outer = match func {
                    Func::Sin => self.apply(Func::Cos, &u)?,
                    Func::Cos => self.apply(Func::Sin, &u)?.neg(),
                    Func::Tan => {
                        // 1 + tan²(u)
                        let tan = Expanded::atom(atom);
                        let square = self.mul(&tan, &tan)?;
                        square.add(&Expanded::one())
                    }
                    Func::Exp => Expanded::atom(atom),
                    Func::Log => self.pow_int(&u, -1)?,
                    Func::Sqrt => {
                        let root = self.pow_rational(&u, &Rational::from_i64(-1, 2))?;
                        root.scale(&Rational::from_i64(1, 2))
                    }
                };
                self.mul(&outer, &du)
            }
            ExprNode::Pow { base, exp } => {
                let f = self
                    .arena()
                    .get(exp)
                    .as_number()
                    .cloned()
                    .unwrap_or_else(Rational::one);
                let b = self.expand(base)?;
                let db = self.diff(&b, var)?;
                let lowered = self.pow_rational(&b, &(f.clone() - Rational::one()))?;
                let outer = lowered.scale(&f);
                self.mul(&outer, &db)
            }
            _ => {
                // Sums behind a negative exponent and other composite atoms.
                let expanded = self.expand(atom)?;
                self.diff(&expanded, var)
            }
        }
    }
}
