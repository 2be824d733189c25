//! Canonicalization of arena expressions.
//!
//! [`Calculus`] borrows the request's arena and turns parsed expressions into
//! [`Expanded`] form. All algebraic simplification happens here:
//!
//! - products are distributed and like terms combined
//! - powers of a common base are merged into `baseⁿ · base^f` with `n`
//!   integral and `0 < f < 1`, so `√x · √x = x`
//! - all `exp` factors of a term merge into one, `exp(log u) = u` and
//!   `log(exp u) = u`
//! - square roots of rationals pull out square factors (`√8 = 2√2`)
//! - `sin`, `cos` and `tan` are made odd/even in their argument and take
//!   exact values at multiples of π/6 and π/4

use std::collections::BTreeMap;

use hashbrown::HashMap;
use num_traits::{One, Zero};
use planum_core::{Bindings, ExprArena, ExprHandle, ExprNode, Func, Rational, SymbolId};
use smallvec::SmallVec;
use tracing::trace;

use crate::error::{IntegrationError, Result};
use crate::expanded::{Expanded, Monomial};

/// Largest integer power applied to a single term.
pub const MAX_EXPONENT: i64 = 4096;

/// Largest integer power applied to a sum by repeated multiplication.
pub const MAX_EXPANSION_POWER: i64 = 64;

/// Symbolic engine bound to one arena.
pub struct Calculus<'a> {
    arena: &'a mut ExprArena,
    memo: HashMap<ExprHandle, Expanded>,
}

impl<'a> Calculus<'a> {
    /// Creates an engine over `arena`.
    pub fn new(arena: &'a mut ExprArena) -> Self {
        Self {
            arena,
            memo: HashMap::new(),
        }
    }

    /// The underlying arena.
    #[must_use]
    pub fn arena(&self) -> &ExprArena {
        &*self.arena
    }

    /// Mutable access to the underlying arena.
    pub fn arena_mut(&mut self) -> &mut ExprArena {
        &mut *self.arena
    }

    /// Interns a variable name.
    pub fn variable(&mut self, name: &str) -> SymbolId {
        self.arena.intern_symbol(name)
    }

    /// The atom handle of a variable.
    pub fn symbol_atom(&mut self, var: SymbolId) -> ExprHandle {
        self.arena.intern(ExprNode::Symbol(var))
    }

    /// A variable as an expanded value.
    pub fn symbol(&mut self, var: SymbolId) -> Expanded {
        Expanded::atom(self.symbol_atom(var))
    }

    /// π as an expanded value.
    pub fn pi(&mut self) -> Expanded {
        Expanded::atom(self.arena.pi())
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Expands an arena expression into canonical form.
    ///
    /// # Errors
    ///
    /// Fails on division by zero, `log(0)`, values that are not real, poles
    /// of `tan` at exact multiples of π and powers too large to expand.
    pub fn expand(&mut self, handle: ExprHandle) -> Result<Expanded> {
        if let Some(done) = self.memo.get(&handle) {
            return Ok(done.clone());
        }
        let expanded = self.expand_node(handle)?;
        self.memo.insert(handle, expanded.clone());
        Ok(expanded)
    }

    fn expand_node(&mut self, handle: ExprHandle) -> Result<Expanded> {
        let node = self.arena.get(handle).clone();
        let expanded = match node {
            ExprNode::Number(n) => Expanded::constant(n),
            ExprNode::Symbol(_) | ExprNode::Constant(_) => Expanded::atom(handle),
            ExprNode::Add(args) => {
                let mut sum = Expanded::zero();
                for arg in args {
                    sum.add_assign(&self.expand(arg)?);
                }
                sum
            }
            ExprNode::Mul(args) => {
                let mut product = Expanded::one();
                for arg in args {
                    let factor = self.expand(arg)?;
                    product = self.mul(&product, &factor)?;
                }
                product
            }
            ExprNode::Neg(arg) => self.expand(arg)?.neg(),
            ExprNode::Div { num, den } => {
                let num = self.expand(num)?;
                let den = self.expand(den)?;
                self.div(&num, &den)?
            }
            ExprNode::Pow { base, exp } => {
                let base = self.expand(base)?;
                let exp = self.expand(exp)?;
                match exp.as_constant() {
                    Some(r) => self.pow_rational(&base, &r)?,
                    None => {
                        // b^e = exp(e · log b)
                        let log_base = self.apply(Func::Log, &base)?;
                        let exponent = self.mul(&exp, &log_base)?;
                        self.apply(Func::Exp, &exponent)?
                    }
                }
            }
            ExprNode::Function { func, arg } => {
                let arg = self.expand(arg)?;
                self.apply(func, &arg)?
            }
        };
        trace!(?handle, terms = expanded.len(), "expanded");
        Ok(expanded)
    }

    /// Builds the canonical arena expression of an expanded value.
    ///
    /// Terms are emitted highest first, so polynomials read `x**2 + x + 1`.
    pub fn to_expr(&mut self, value: &Expanded) -> ExprHandle {
        let mut terms: SmallVec<[ExprHandle; 4]> = SmallVec::new();
        for (monomial, coefficient) in value.terms().rev() {
            let mut factors: SmallVec<[ExprHandle; 4]> = SmallVec::new();
            if !coefficient.is_one() || monomial.is_one() {
                factors.push(self.arena.number(coefficient.clone()));
            }
            for (atom, exp) in monomial.iter() {
                if exp == 1 {
                    factors.push(atom);
                } else {
                    let exp = self.arena.integer(exp);
                    factors.push(self.arena.pow(atom, exp));
                }
            }
            terms.push(self.arena.mul(factors));
        }
        self.arena.add(terms)
    }

    /// Renders an expanded value as LaTeX.
    pub fn latex(&mut self, value: &Expanded) -> String {
        let handle = self.to_expr(value);
        self.arena.to_latex(handle)
    }

    /// Renders an expanded value as plain text.
    pub fn text(&mut self, value: &Expanded) -> String {
        let handle = self.to_expr(value);
        self.arena.to_text(handle)
    }

    /// Evaluates an expanded value numerically.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Eval`] for unbound symbols or non-finite
    /// results.
    pub fn evaluate(&mut self, value: &Expanded, bindings: &Bindings) -> Result<f64> {
        let handle = self.to_expr(value);
        Ok(planum_core::evaluate(&*self.arena, handle, bindings)?)
    }

    /// Returns true if no atom of `value` mentions `var`.
    #[must_use]
    pub fn is_free_of(&self, value: &Expanded, var: SymbolId) -> bool {
        value.all_atoms(|atom| self.arena.is_free_of(atom, var))
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Multiplies two values.
    ///
    /// # Errors
    ///
    /// Propagates failures from merging powers or exponentials.
    pub fn mul(&mut self, a: &Expanded, b: &Expanded) -> Result<Expanded> {
        let mut out = Expanded::zero();
        for (ma, ca) in a.terms() {
            for (mb, cb) in b.terms() {
                let monomial = ma.mul(mb);
                let coefficient = ca * cb;
                if self.needs_normalization(&monomial) {
                    let term = self.normalize_term(&monomial, &coefficient)?;
                    out.add_assign(&term);
                } else {
                    out.add_term(monomial, coefficient);
                }
            }
        }
        Ok(out)
    }

    /// Divides `num` by `den`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::DivisionByZero`] if `den` is zero.
    pub fn div(&mut self, num: &Expanded, den: &Expanded) -> Result<Expanded> {
        let inverse = self.pow_int(den, -1)?;
        self.mul(num, &inverse)
    }

    /// Raises a value to an integer power.
    ///
    /// Negative powers of sums become an opaque atom with a negative
    /// exponent; the sum is first scaled so its leading coefficient is one.
    ///
    /// # Errors
    ///
    /// Fails for `0^-n` and for exponents above [`MAX_EXPONENT`] (or
    /// [`MAX_EXPANSION_POWER`] when the base is a sum).
    pub fn pow_int(&mut self, base: &Expanded, k: i64) -> Result<Expanded> {
        if k == 0 {
            return Ok(Expanded::one());
        }
        if k == 1 {
            return Ok(base.clone());
        }
        if base.is_zero() {
            return if k > 0 {
                Ok(Expanded::zero())
            } else {
                Err(IntegrationError::DivisionByZero)
            };
        }
        if k.abs() > MAX_EXPONENT {
            return Err(IntegrationError::ExponentTooLarge(k.to_string()));
        }
        let k32 = i32::try_from(k).map_err(|_| IntegrationError::ExponentTooLarge(k.to_string()))?;

        if let Some((monomial, coefficient)) = base.as_term() {
            let coefficient = coefficient
                .checked_pow(k32)
                .ok_or(IntegrationError::DivisionByZero)?;
            let monomial = monomial.pow(k);
            return if self.needs_normalization(&monomial) {
                self.normalize_term(&monomial, &coefficient)
            } else {
                Ok(Expanded::term(monomial, coefficient))
            };
        }

        if k < 0 {
            let lead = base
                .leading_coefficient()
                .cloned()
                .unwrap_or_else(Rational::one);
            let inverse = lead
                .checked_recip()
                .ok_or(IntegrationError::DivisionByZero)?;
            let monic = base.scale(&inverse);
            let atom = self.to_expr(&monic);
            let coefficient = lead
                .checked_pow(k32)
                .ok_or(IntegrationError::DivisionByZero)?;
            return Ok(Expanded::term(Monomial::atom(atom, k), coefficient));
        }

        if k > MAX_EXPANSION_POWER {
            return Err(IntegrationError::ExponentTooLarge(k.to_string()));
        }
        let mut result = Expanded::one();
        let mut square = base.clone();
        let mut remaining = k;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = self.mul(&result, &square)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                square = self.mul(&square, &square)?;
            }
        }
        Ok(result)
    }

    /// Raises a value to a rational power.
    ///
    /// # Errors
    ///
    /// Fails for even roots of negative constants, `0^r` with `r < 0` and
    /// exponents that do not fit machine integers.
    pub fn pow_rational(&mut self, base: &Expanded, r: &Rational) -> Result<Expanded> {
        if let Some(k) = r.to_i64() {
            return self.pow_int(base, k);
        }
        if let Some(c) = base.as_constant() {
            return self.number_power(&c, r);
        }

        match base.as_term() {
            Some((monomial, coefficient)) if coefficient.is_positive() => {
                let (monomial, coefficient) = (monomial.clone(), coefficient.clone());
                let mut out = self.number_power(&coefficient, r)?;
                for (atom, exp) in monomial.iter() {
                    let factor = self.atom_power(atom, &(Rational::from_integer(exp) * r.clone()))?;
                    out = self.mul(&out, &factor)?;
                }
                Ok(out)
            }
            _ => {
                let lead = base
                    .leading_coefficient()
                    .cloned()
                    .unwrap_or_else(Rational::one);
                let odd_root = r
                    .to_i64_parts()
                    .is_some_and(|(_, q)| q % 2 == 1);
                let scale = if lead.is_positive() || odd_root {
                    lead
                } else {
                    lead.abs()
                };
                let inverse = scale
                    .checked_recip()
                    .ok_or(IntegrationError::DivisionByZero)?;
                let normalized = base.scale(&inverse);
                let coefficient = self.number_power(&scale, r)?;
                let atom = self.to_expr(&normalized);
                let power = self.atom_power(atom, r)?;
                self.mul(&coefficient, &power)
            }
        }
    }

    /// `c^r` for a rational constant.
    fn number_power(&mut self, c: &Rational, r: &Rational) -> Result<Expanded> {
        if let Some(k) = r.to_i64() {
            return self.pow_int(&Expanded::constant(c.clone()), k);
        }
        if c.is_zero() {
            return if r.is_positive() {
                Ok(Expanded::zero())
            } else {
                Err(IntegrationError::DivisionByZero)
            };
        }
        let (p, q) = r
            .to_i64_parts()
            .ok_or_else(|| IntegrationError::ExponentTooLarge(r.to_string()))?;
        if c.is_negative() {
            if q % 2 == 0 {
                return Err(IntegrationError::NonReal(format!("({c})^({r})")));
            }
            let magnitude = self.number_power(&c.abs(), r)?;
            return Ok(if p % 2 == 0 {
                magnitude
            } else {
                magnitude.neg()
            });
        }

        let (n, f) = split_exponent(r)?;
        let whole = checked_rational_pow(c, n)?;
        let (fp, fq) = f
            .to_i64_parts()
            .ok_or_else(|| IntegrationError::ExponentTooLarge(r.to_string()))?;

        if let Some(root) = exact_root(c, fq) {
            let root = checked_rational_pow(&root, fp)?;
            return Ok(Expanded::constant(whole * root));
        }

        if fq == 2 {
            // √(a/b) = √(a·b) / b
            if let Some((a, b)) = c.to_i64_parts() {
                if let Some((outside, inside)) = a
                    .checked_mul(b)
                    .and_then(|ab| Rational::from_integer(ab).square_factor())
                {
                    let coefficient = whole * Rational::from_i64(outside, b);
                    let radicand = self.arena.integer(inside);
                    let half = self.arena.rational(1, 2);
                    let atom = self.arena.pow(radicand, half);
                    return Ok(Expanded::term(Monomial::atom(atom, 1), coefficient));
                }
            }
        }

        let base = self.arena.number(c.clone());
        let exp = self.arena.number(f);
        let atom = self.arena.pow(base, exp);
        Ok(Expanded::term(Monomial::atom(atom, 1), whole))
    }

    /// `atom^t` for an arbitrary rational `t`, in canonical split form.
    fn atom_power(&mut self, base: ExprHandle, total: &Rational) -> Result<Expanded> {
        if total.is_zero() {
            return Ok(Expanded::one());
        }
        match self.arena.get(base).clone() {
            ExprNode::Number(c) => return self.number_power(&c, total),
            ExprNode::Function {
                func: Func::Exp,
                arg,
            } => {
                let u = self.expand(arg)?;
                return self.apply(Func::Exp, &u.scale(total));
            }
            ExprNode::Pow { base: inner, exp } => {
                if let Some(f) = self.arena.get(exp).as_number().cloned() {
                    return self.atom_power(inner, &(f * total.clone()));
                }
            }
            _ => {}
        }

        let (n, f) = split_exponent(total)?;
        let expanded_base = self.expand(base)?;
        let mut out = self.pow_int(&expanded_base, n)?;
        if !f.is_zero() {
            let exp = self.arena.number(f);
            let atom = self.arena.pow(base, exp);
            out = self.mul(&out, &Expanded::atom(atom))?;
        }
        Ok(out)
    }

    /// A term is canonical when every fractional-power atom has exponent
    /// one and a distinct base, and at most one `exp` atom occurs, also with
    /// exponent one.
    fn needs_normalization(&self, monomial: &Monomial) -> bool {
        let mut pow_bases: SmallVec<[ExprHandle; 4]> = SmallVec::new();
        let mut exp_seen = false;
        for (atom, exp) in monomial.iter() {
            match self.arena.get(atom) {
                ExprNode::Pow { base, .. } => {
                    if exp != 1 || pow_bases.contains(base) {
                        return true;
                    }
                    pow_bases.push(*base);
                }
                ExprNode::Function { func: Func::Exp, .. } => {
                    if exp != 1 || exp_seen {
                        return true;
                    }
                    exp_seen = true;
                }
                _ => {}
            }
        }
        false
    }

    fn normalize_term(&mut self, monomial: &Monomial, coefficient: &Rational) -> Result<Expanded> {
        let mut groups: BTreeMap<ExprHandle, Rational> = BTreeMap::new();
        let mut exponent_sum = Expanded::zero();
        let mut has_exp = false;
        let mut rest = Monomial::one();

        for (atom, exp) in monomial.iter() {
            match self.arena.get(atom).clone() {
                ExprNode::Pow { base, exp: power } => {
                    let f = self.arena.get(power).as_number().cloned().unwrap_or_default();
                    let entry = groups.entry(base).or_default();
                    *entry = &*entry + &(f * Rational::from_integer(exp));
                }
                ExprNode::Function {
                    func: Func::Exp,
                    arg,
                } => {
                    let u = self.expand(arg)?;
                    exponent_sum.add_assign(&u.scale(&Rational::from_integer(exp)));
                    has_exp = true;
                }
                _ => rest.multiply_atom(atom, exp),
            }
        }

        // Plain powers of a base that also carries a fractional power join it.
        let (joined, rest) = rest.partition(|atom| groups.contains_key(&atom));
        for (atom, exp) in joined.iter() {
            if let Some(entry) = groups.get_mut(&atom) {
                *entry = &*entry + &Rational::from_integer(exp);
            }
        }

        let mut out = Expanded::term(rest, coefficient.clone());
        for (base, total) in groups {
            let factor = self.atom_power(base, &total)?;
            out = self.mul(&out, &factor)?;
        }
        if has_exp {
            let factor = self.apply(Func::Exp, &exponent_sum)?;
            out = self.mul(&out, &factor)?;
        }
        Ok(out)
    }

    // ========================================================================
    // Elementary functions
    // ========================================================================

    /// Applies an elementary function, simplifying where an exact rule
    /// applies.
    ///
    /// # Errors
    ///
    /// Fails for `log(0)`, `log` of a negative constant, `sqrt` of a
    /// negative constant and `tan` at an odd multiple of π/2.
    pub fn apply(&mut self, func: Func, arg: &Expanded) -> Result<Expanded> {
        match func {
            Func::Sqrt => self.pow_rational(arg, &Rational::from_i64(1, 2)),
            Func::Exp => self.exp(arg),
            Func::Log => self.log(arg),
            Func::Sin | Func::Cos | Func::Tan => self.trig(func, arg),
        }
    }

    fn function_atom(&mut self, func: Func, arg: &Expanded) -> Expanded {
        let arg = self.to_expr(arg);
        Expanded::atom(self.arena.apply(func, arg))
    }

    /// The single atom of `value` if it is exactly `atom¹` with coefficient
    /// one.
    fn as_single_atom(value: &Expanded) -> Option<ExprHandle> {
        let (monomial, coefficient) = value.as_term()?;
        if !coefficient.is_one() || monomial.len() != 1 {
            return None;
        }
        monomial
            .iter()
            .next()
            .and_then(|(atom, exp)| (exp == 1).then_some(atom))
    }

    fn exp(&mut self, arg: &Expanded) -> Result<Expanded> {
        if arg.is_zero() {
            return Ok(Expanded::one());
        }
        // exp(c · log u) = u^c
        if let Some((monomial, coefficient)) = arg.as_term() {
            if monomial.len() == 1 {
                if let Some((atom, 1)) = monomial.iter().next() {
                    if let ExprNode::Function {
                        func: Func::Log,
                        arg: inner,
                    } = *self.arena.get(atom)
                    {
                        let coefficient = coefficient.clone();
                        let u = self.expand(inner)?;
                        return self.pow_rational(&u, &coefficient);
                    }
                }
            }
        }
        Ok(self.function_atom(Func::Exp, arg))
    }

    fn log(&mut self, arg: &Expanded) -> Result<Expanded> {
        if let Some(c) = arg.as_constant() {
            if c.is_zero() {
                return Err(IntegrationError::Undefined("log(0)".to_string()));
            }
            if c.is_negative() {
                return Err(IntegrationError::NonReal(format!("log({c})")));
            }
            if c.is_one() {
                return Ok(Expanded::zero());
            }
        }
        if let Some(atom) = Self::as_single_atom(arg) {
            if let ExprNode::Function {
                func: Func::Exp,
                arg: inner,
            } = *self.arena.get(atom)
            {
                return self.expand(inner);
            }
        }
        Ok(self.function_atom(Func::Log, arg))
    }

    fn trig(&mut self, func: Func, arg: &Expanded) -> Result<Expanded> {
        let flip = arg.leading_coefficient().is_some_and(Rational::is_negative);
        let arg = if flip { arg.neg() } else { arg.clone() };

        let value = match self.special_trig(func, &arg)? {
            Some(value) => value,
            None => self.function_atom(func, &arg),
        };
        Ok(if flip && func != Func::Cos {
            value.neg()
        } else {
            value
        })
    }

    /// Exact values at multiples of π/12 whose sine is a known surd.
    fn special_trig(&mut self, func: Func, arg: &Expanded) -> Result<Option<Expanded>> {
        let twelfths = if arg.is_zero() {
            Some(0)
        } else {
            let pi = self.arena.pi();
            arg.as_term().and_then(|(monomial, coefficient)| {
                if *monomial == Monomial::atom(pi, 1) {
                    (coefficient * &Rational::from_integer(12)).to_i64()
                } else {
                    None
                }
            })
        };
        let Some(k) = twelfths else {
            return Ok(None);
        };

        let surd = match func {
            Func::Sin => sin_twelfths(k),
            Func::Cos => sin_twelfths(k + 6),
            Func::Tan => match k.rem_euclid(12) {
                6 => {
                    let text = self.text(arg);
                    return Err(IntegrationError::Undefined(format!("tan({text})")));
                }
                other => tan_twelfths(other),
            },
            _ => None,
        };
        match surd {
            Some((coefficient, radicand)) => {
                let root = self.number_power(&Rational::from_integer(radicand), &Rational::from_i64(1, 2))?;
                Ok(Some(root.scale(&coefficient)))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // Substitution
    // ========================================================================

    /// Replaces `var` by `value` and re-canonicalizes.
    ///
    /// # Errors
    ///
    /// Fails if the substituted expression hits a singularity, for example
    /// `log(x)` at `x = 0`.
    pub fn substitute(&mut self, target: &Expanded, var: SymbolId, value: &Expanded) -> Result<Expanded> {
        self.substitute_all(target, &[(var, value.clone())])
    }

    /// Replaces several variables simultaneously.
    ///
    /// # Errors
    ///
    /// See [`Calculus::substitute`].
    pub fn substitute_all(&mut self, target: &Expanded, replacements: &[(SymbolId, Expanded)]) -> Result<Expanded> {
        if replacements
            .iter()
            .all(|(var, _)| self.is_free_of(target, *var))
        {
            return Ok(target.clone());
        }
        let mut by_symbol: HashMap<SymbolId, ExprHandle> = HashMap::new();
        for (var, value) in replacements {
            let handle = self.to_expr(value);
            by_symbol.insert(*var, handle);
        }
        let root = self.to_expr(target);
        let mut memo = HashMap::new();
        let replaced = self.replace(root, &by_symbol, &mut memo);
        self.expand(replaced)
    }

    fn replace(
        &mut self,
        handle: ExprHandle,
        by_symbol: &HashMap<SymbolId, ExprHandle>,
        memo: &mut HashMap<ExprHandle, ExprHandle>,
    ) -> ExprHandle {
        if let Some(&done) = memo.get(&handle) {
            return done;
        }
        let node = self.arena.get(handle).clone();
        let out = match node {
            ExprNode::Symbol(id) => by_symbol.get(&id).copied().unwrap_or(handle),
            ExprNode::Number(_) | ExprNode::Constant(_) => handle,
            ExprNode::Add(args) => {
                let args: SmallVec<[ExprHandle; 4]> = args
                    .iter()
                    .map(|&arg| self.replace(arg, by_symbol, memo))
                    .collect();
                self.arena.add(args)
            }
            ExprNode::Mul(args) => {
                let args: SmallVec<[ExprHandle; 4]> = args
                    .iter()
                    .map(|&arg| self.replace(arg, by_symbol, memo))
                    .collect();
                self.arena.mul(args)
            }
            ExprNode::Pow { base, exp } => {
                let base = self.replace(base, by_symbol, memo);
                let exp = self.replace(exp, by_symbol, memo);
                self.arena.pow(base, exp)
            }
            ExprNode::Neg(arg) => {
                let arg = self.replace(arg, by_symbol, memo);
                self.arena.neg(arg)
            }
            ExprNode::Div { num, den } => {
                let num = self.replace(num, by_symbol, memo);
                let den = self.replace(den, by_symbol, memo);
                self.arena.div(num, den)
            }
            ExprNode::Function { func, arg } => {
                let arg = self.replace(arg, by_symbol, memo);
                self.arena.apply(func, arg)
            }
        };
        memo.insert(handle, out);
        out
    }
}

/// Splits `t` into `n + f` with `n` integral and `0 <= f < 1`.
fn split_exponent(t: &Rational) -> Result<(i64, Rational)> {
    let (num, den) = t
        .to_i64_parts()
        .ok_or_else(|| IntegrationError::ExponentTooLarge(t.to_string()))?;
    let n = num.div_euclid(den);
    let f = t.clone() - Rational::from_integer(n);
    Ok((n, f))
}

fn checked_rational_pow(c: &Rational, n: i64) -> Result<Rational> {
    if n.abs() > MAX_EXPONENT {
        return Err(IntegrationError::ExponentTooLarge(n.to_string()));
    }
    let n = i32::try_from(n).map_err(|_| IntegrationError::ExponentTooLarge(n.to_string()))?;
    c.checked_pow(n).ok_or(IntegrationError::DivisionByZero)
}

/// The exact `q`-th root of a non-negative rational, if it has one.
fn exact_root(c: &Rational, q: i64) -> Option<Rational> {
    let (num, den) = c.to_i64_parts()?;
    Some(Rational::from_i64(integer_root(num, q)?, integer_root(den, q)?))
}

fn integer_root(n: i64, q: i64) -> Option<i64> {
    if n < 0 || q <= 0 {
        return None;
    }
    let exp = u32::try_from(q).ok()?;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let guess = (n as f64).powf(1.0 / q as f64).round() as i64;
    (guess.saturating_sub(1).max(0)..=guess + 1).find(|r| r.checked_pow(exp) == Some(n))
}

/// `sin(kπ/12)` as `coefficient · √radicand` where it is a known surd.
fn sin_twelfths(k: i64) -> Option<(Rational, i64)> {
    let k = k.rem_euclid(24);
    if k >= 12 {
        return sin_twelfths(k - 12).map(|(c, r)| (-c, r));
    }
    let half = Rational::from_i64(1, 2);
    match k {
        0 => Some((Rational::zero(), 1)),
        2 | 10 => Some((half, 1)),
        3 | 9 => Some((half, 2)),
        4 | 8 => Some((half, 3)),
        6 => Some((Rational::one(), 1)),
        _ => None,
    }
}

/// `tan(kπ/12)` for `k` in `0..12`, excluding the pole at 6.
fn tan_twelfths(k: i64) -> Option<(Rational, i64)> {
    match k {
        0 => Some((Rational::zero(), 1)),
        2 => Some((Rational::from_i64(1, 3), 3)),
        3 => Some((Rational::one(), 1)),
        4 => Some((Rational::one(), 3)),
        8 => Some((-Rational::one(), 3)),
        9 => Some((-Rational::one(), 1)),
        10 => Some((Rational::from_i64(-1, 3), 3)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_core::{parse_expression, SymbolTable};

    fn expand_text(source: &str) -> Result<String> {
        let mut arena = ExprArena::new();
        let h = parse_expression(&mut arena, source, &SymbolTable::new(["x", "y", "r", "theta"]))
            .expect("test input parses");
        let mut calc = Calculus::new(&mut arena);
        let e = calc.expand(h)?;
        Ok(calc.text(&e))
    }

    fn same(a: &str, b: &str) -> bool {
        let mut arena = ExprArena::new();
        let symbols = SymbolTable::new(["x", "y"]);
        let ha = parse_expression(&mut arena, a, &symbols).unwrap();
        let hb = parse_expression(&mut arena, b, &symbols).unwrap();
        let mut calc = Calculus::new(&mut arena);
        calc.expand(ha).unwrap() == calc.expand(hb).unwrap()
    }

    #[test]
    fn test_distribution_and_like_terms() {
        assert_eq!(expand_text("(x + 1)**2").unwrap(), "x**2 + 2*x + 1");
        assert_eq!(expand_text("x*y - y*x").unwrap(), "0");
        assert!(same("(x + y)*(x - y)", "x**2 - y**2"));
    }

    #[test]
    fn test_rational_arithmetic_is_exact() {
        assert_eq!(expand_text("0.1 + 0.2").unwrap(), "3/10");
        assert_eq!(expand_text("x/2 + x/3").unwrap(), "5*x/6");
    }

    #[test]
    fn test_radicals() {
        assert!(same("sqrt(x)*sqrt(x)", "x"));
        assert!(same("sqrt(8)", "2*sqrt(2)"));
        assert!(same("sqrt(2)**2", "2"));
        assert!(same("x**(3/2)", "x*sqrt(x)"));
        assert!(same("4**0.5", "2"));
        assert!(same("sqrt(1/2)", "sqrt(2)/2"));
    }

    #[test]
    fn test_exponentials_and_logs() {
        assert!(same("exp(x)*exp(y)", "exp(x + y)"));
        assert!(same("exp(x)**2", "exp(2*x)"));
        assert!(same("exp(log(x))", "x"));
        assert!(same("log(exp(x + 1))", "x + 1"));
        assert!(same("exp(0)", "1"));
        assert!(same("log(1)", "0"));
    }

    #[test]
    fn test_log_errors() {
        assert_eq!(
            expand_text("log(0)"),
            Err(IntegrationError::Undefined("log(0)".to_string()))
        );
        assert!(matches!(expand_text("log(-2)"), Err(IntegrationError::NonReal(_))));
        assert!(matches!(expand_text("sqrt(-4)"), Err(IntegrationError::NonReal(_))));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(expand_text("x/(y - y)"), Err(IntegrationError::DivisionByZero));
    }

    #[test]
    fn test_trig_special_values() {
        assert_eq!(expand_text("sin(pi)").unwrap(), "0");
        assert_eq!(expand_text("cos(2*pi)").unwrap(), "1");
        assert_eq!(expand_text("sin(pi/6)").unwrap(), "1/2");
        assert_eq!(expand_text("cos(pi)").unwrap(), "-1");
        assert_eq!(expand_text("tan(pi/4)").unwrap(), "1");
        assert!(same("sin(pi/4)", "sqrt(2)/2"));
        assert!(same("cos(pi/6)", "sqrt(3)/2"));
        assert!(same("sin(-pi/2)", "-1"));
        assert!(matches!(expand_text("tan(pi/2)"), Err(IntegrationError::Undefined(_))));
    }

    #[test]
    fn test_trig_parity() {
        assert!(same("sin(-x)", "-sin(x)"));
        assert!(same("cos(-x)", "cos(x)"));
        assert!(same("tan(-x)", "-tan(x)"));
    }

    #[test]
    fn test_negative_powers_of_sums() {
        assert!(same("1/(2*x + 2)", "(1/2)/(x + 1)"));
        assert!(same("(x + 1)**-1 * 3", "3/(x + 1)"));
        assert_eq!(expand_text("1/(x + 1)").unwrap(), "1/(x + 1)");
    }

    #[test]
    fn test_symbolic_exponent() {
        assert!(same("2**x", "exp(x*log(2))"));
    }

    #[test]
    fn test_exponent_limit() {
        assert!(matches!(
            expand_text("(x + 1)**100"),
            Err(IntegrationError::ExponentTooLarge(_))
        ));
        assert!(expand_text("x**100").is_ok());
    }

    #[test]
    fn test_substitute() {
        let mut arena = ExprArena::new();
        let symbols = SymbolTable::new(["x", "y"]);
        let h = parse_expression(&mut arena, "x**2 + y", &symbols).unwrap();
        let mut calc = Calculus::new(&mut arena);
        let e = calc.expand(h).unwrap();
        let x = calc.variable("x");
        let y = calc.variable("y");
        let y_expr = calc.symbol(y);
        let replacement = y_expr.add(&Expanded::one());
        let result = calc.substitute(&e, x, &replacement).unwrap();
        assert_eq!(calc.text(&result), "y**2 + 3*y + 1");
    }

    #[test]
    fn test_integer_root() {
        assert_eq!(integer_root(27, 3), Some(3));
        assert_eq!(integer_root(26, 3), None);
        assert_eq!(integer_root(1, 5), Some(1));
        assert_eq!(integer_root(0, 2), Some(0));
    }
}
