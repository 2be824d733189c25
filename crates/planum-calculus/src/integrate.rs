//! Exact antiderivatives.
//!
//! Integration is linear over the terms of an [`Expanded`] value. Each term
//! is split into the factors free of the integration variable, which pass
//! through as a constant, and the factors that depend on it, which must
//! match one of a fixed set of patterns:
//!
//! | integrand                          | method                              |
//! |------------------------------------|-------------------------------------|
//! | `B^t`, `B` linear                  | power rule, `log B` at `t = -1`     |
//! | `xᵏ · sin/cos/exp(u)`, `u` linear  | tabular integration by parts        |
//! | `Π sin/cos(uᵢ)^kᵢ · xᵏ`            | linearize, then tabular             |
//! | `tan(u)`                           | `-log(cos u) / u'`                  |
//! | `log(u)`, `xᵏ · log(x)`            | integration by parts                |
//!
//! Anything else fails with [`IntegrationError::NoClosedForm`]; there is no
//! numeric fallback.

use num_traits::{One, Zero};
use planum_core::{Bindings, ExprHandle, ExprNode, Func, Rational, SymbolId};
use tracing::{debug, trace};

use crate::engine::Calculus;
use crate::error::{IntegrationError, Result};
use crate::expanded::{Expanded, Monomial};

/// The variable-dependent factors of one term, sorted by kind.
#[derive(Debug, Default)]
struct Factors {
    /// `(base, exponent)` pairs; the base is an expanded sum or symbol.
    powers: Vec<(Expanded, Rational)>,
    trig: Vec<(Func, Expanded, i64)>,
    exp: Option<Expanded>,
    other: Vec<(ExprHandle, i64)>,
}

impl Calculus<'_> {
    /// An antiderivative of `f` with respect to `var`, without constant.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::NoClosedForm`] for any term outside the
    /// supported patterns, and propagates algebraic failures.
    pub fn antiderivative(&mut self, f: &Expanded, var: SymbolId) -> Result<Expanded> {
        let mut out = Expanded::zero();
        for (monomial, coefficient) in f.terms() {
            let (free, dependent) = monomial.partition(|atom| self.arena().is_free_of(atom, var));
            let constant = Expanded::term(free, coefficient.clone());
            let integral = if dependent.is_one() {
                self.symbol(var)
            } else {
                self.integrate_monomial(&dependent, var)?
            };
            out.add_assign(&self.mul(&constant, &integral)?);
        }
        trace!(terms = out.len(), "antiderivative");
        Ok(out)
    }

    /// `F(upper) - F(lower)` for an antiderivative `F` of `f`.
    ///
    /// An empty interval gives zero without looking at `f`. Otherwise `f`
    /// must be finite and real on the closed interval, see
    /// [`Calculus::check_interval`].
    ///
    /// # Errors
    ///
    /// See [`Calculus::antiderivative`] and [`Calculus::check_interval`].
    /// Also fails if `F` is singular at either bound.
    pub fn definite(
        &mut self,
        f: &Expanded,
        var: SymbolId,
        lower: &Expanded,
        upper: &Expanded,
    ) -> Result<Expanded> {
        if lower == upper {
            return Ok(Expanded::zero());
        }
        self.check_interval(f, var, lower, upper, &Bindings::new())?;
        let antiderivative = self.antiderivative(f, var)?;
        let at_upper = self.substitute(&antiderivative, var, upper)?;
        let at_lower = self.substitute(&antiderivative, var, lower)?;
        let value = at_upper.sub(&at_lower);
        debug!(terms = value.len(), "definite integral");
        Ok(value)
    }

    /// `du/dvar` if `u` is linear in `var` with a non-zero slope.
    ///
    /// # Errors
    ///
    /// Propagates differentiation failures.
    pub fn linear_coefficient(&mut self, u: &Expanded, var: SymbolId) -> Result<Option<Expanded>> {
        let slope = self.diff(u, var)?;
        if slope.is_zero() || !self.is_free_of(&slope, var) {
            return Ok(None);
        }
        Ok(Some(slope))
    }

    fn no_closed_form(&mut self, monomial: &Monomial) -> IntegrationError {
        let text = self.text(&Expanded::term(monomial.clone(), Rational::one()));
        IntegrationError::NoClosedForm(text)
    }

    fn classify(&mut self, monomial: &Monomial) -> Result<Factors> {
        let mut factors = Factors::default();
        for (atom, exp) in monomial.iter() {
            match self.arena().get(atom).clone() {
                ExprNode::Symbol(_) => {
                    factors
                        .powers
                        .push((Expanded::atom(atom), Rational::from_integer(exp)));
                }
                ExprNode::Pow { base, exp: power } => {
                    let f = self
                        .arena()
                        .get(power)
                        .as_number()
                        .cloned()
                        .unwrap_or_else(Rational::one);
                    let base = self.expand(base)?;
                    factors.powers.push((base, f * Rational::from_integer(exp)));
                }
                ExprNode::Add(_) => {
                    let base = self.expand(atom)?;
                    factors.powers.push((base, Rational::from_integer(exp)));
                }
                ExprNode::Function {
                    func: func @ (Func::Sin | Func::Cos),
                    arg,
                } if exp > 0 => {
                    let u = self.expand(arg)?;
                    factors.trig.push((func, u, exp));
                }
                ExprNode::Function {
                    func: Func::Exp,
                    arg,
                } if factors.exp.is_none() => {
                    let u = self.expand(arg)?;
                    factors.exp = Some(u.scale(&Rational::from_integer(exp)));
                }
                _ => factors.other.push((atom, exp)),
            }
        }
        Ok(factors)
    }

    fn integrate_monomial(&mut self, monomial: &Monomial, var: SymbolId) -> Result<Expanded> {
        let factors = self.classify(monomial)?;
        let x = self.symbol(var);

        if !factors.other.is_empty() {
            return self.integrate_special(monomial, &factors, var);
        }

        if factors.trig.is_empty() && factors.exp.is_none() {
            let Some((base, total)) = common_base(&factors.powers) else {
                return Err(self.no_closed_form(monomial));
            };
            return match self.linear_coefficient(&base, var)? {
                Some(alpha) => self.linear_power(&base, &total, &alpha),
                None => Err(self.no_closed_form(monomial)),
            };
        }

        // Polynomial part must be xᵏ with k a non-negative integer.
        let k = match common_base(&factors.powers) {
            None if factors.powers.is_empty() => 0,
            Some((base, total)) if base == x => match total.to_i64() {
                Some(k) if k >= 0 => k,
                _ => return Err(self.no_closed_form(monomial)),
            },
            _ => return Err(self.no_closed_form(monomial)),
        };

        match (&factors.exp, factors.trig.as_slice()) {
            (Some(u), []) => self.tabular(k, Func::Exp, u, var, monomial),
            (None, [(func, u, 1)]) => self.tabular(k, *func, u, var, monomial),
            (None, trig) => {
                let linear = self.linearize_trig(trig)?;
                let polynomial = self.pow_int(&x, k)?;
                let product = self.mul(&polynomial, &linear)?;
                // Every term now carries at most one first-power sin or cos.
                self.antiderivative(&product, var)
            }
            (Some(_), _) => Err(self.no_closed_form(monomial)),
        }
    }

    /// `∫ B^t dx` for `B` linear with slope `alpha`.
    fn linear_power(&mut self, base: &Expanded, total: &Rational, alpha: &Expanded) -> Result<Expanded> {
        let inverse_slope = self.pow_int(alpha, -1)?;
        let raised = total.clone() + Rational::one();
        if raised.is_zero() {
            let log = self.apply(Func::Log, base)?;
            return self.mul(&log, &inverse_slope);
        }
        let power = self.pow_rational(base, &raised)?;
        let scale = raised
            .checked_recip()
            .ok_or(IntegrationError::DivisionByZero)?;
        let power = power.scale(&scale);
        self.mul(&power, &inverse_slope)
    }

    /// `∫ xᵏ g(u) dx` for `g` in `{sin, cos, exp}` and `u` linear.
    ///
    /// Uses `Σⱼ (-1)ʲ k!/(k-j)! · x^(k-j) · G_(j+1)(u) / αʲ⁺¹` where each
    /// `G` is an antiderivative of the previous one in `u`.
    fn tabular(&mut self, k: i64, g: Func, u: &Expanded, var: SymbolId, monomial: &Monomial) -> Result<Expanded> {
        let Some(alpha) = self.linear_coefficient(u, var)? else {
            return Err(self.no_closed_form(monomial));
        };
        let inverse_slope = self.pow_int(&alpha, -1)?;
        let x = self.symbol(var);

        let mut current = (g, Rational::one());
        let mut slope_power = Expanded::one();
        let mut falling = Rational::one();
        let mut out = Expanded::zero();
        for j in 0..=k {
            current = antiderivative_in_u(current);
            slope_power = self.mul(&slope_power, &inverse_slope)?;

            let (func, sign) = &current;
            let g_value = self.apply(*func, u)?.scale(sign);
            let polynomial = self.pow_int(&x, k - j)?;
            let mut term = self.mul(&polynomial, &g_value)?;
            term = self.mul(&term, &slope_power)?;
            let parity = if j % 2 == 0 { Rational::one() } else { -Rational::one() };
            out.add_assign(&term.scale(&(parity * falling.clone())));

            falling = falling * Rational::from_integer(k - j);
        }
        Ok(out)
    }

    /// `tan(u)`, `log(u)` and `xᵏ · log(x)`.
    fn integrate_special(&mut self, monomial: &Monomial, factors: &Factors, var: SymbolId) -> Result<Expanded> {
        let [(atom, 1)] = factors.other.as_slice() else {
            return Err(self.no_closed_form(monomial));
        };
        if !factors.trig.is_empty() || factors.exp.is_some() {
            return Err(self.no_closed_form(monomial));
        }
        let ExprNode::Function { func, arg } = self.arena().get(*atom).clone() else {
            return Err(self.no_closed_form(monomial));
        };
        let u = self.expand(arg)?;
        let x = self.symbol(var);

        match func {
            Func::Tan if factors.powers.is_empty() => {
                let Some(alpha) = self.linear_coefficient(&u, var)? else {
                    return Err(self.no_closed_form(monomial));
                };
                let cos = self.apply(Func::Cos, &u)?;
                let log = self.apply(Func::Log, &cos)?;
                let inverse_slope = self.pow_int(&alpha, -1)?;
                Ok(self.mul(&log, &inverse_slope)?.neg())
            }
            Func::Log if factors.powers.is_empty() => {
                let Some(alpha) = self.linear_coefficient(&u, var)? else {
                    return Err(self.no_closed_form(monomial));
                };
                // (u log u - u) / α
                let log = Expanded::atom(*atom);
                let u_log_u = self.mul(&u, &log)?;
                let inverse_slope = self.pow_int(&alpha, -1)?;
                self.mul(&u_log_u.sub(&u), &inverse_slope)
            }
            Func::Log if u == x => {
                let Some((base, k)) = common_base(&factors.powers) else {
                    return Err(self.no_closed_form(monomial));
                };
                if base != x {
                    return Err(self.no_closed_form(monomial));
                }
                let log = Expanded::atom(*atom);
                let raised = k + Rational::one();
                if raised.is_zero() {
                    // log(x)² / 2
                    let square = self.mul(&log, &log)?;
                    return Ok(square.scale(&Rational::from_i64(1, 2)));
                }
                // x^(k+1) log x / (k+1) - x^(k+1) / (k+1)²
                let inverse = raised
                    .checked_recip()
                    .ok_or(IntegrationError::DivisionByZero)?;
                let power = self.pow_rational(&x, &raised)?;
                let with_log = self.mul(&power, &log)?.scale(&inverse);
                let plain = power.scale(&(&inverse * &inverse));
                Ok(with_log.sub(&plain))
            }
            _ => Err(self.no_closed_form(monomial)),
        }
    }
}

/// Merges power factors that share a base; `None` unless exactly one base
/// remains.
fn common_base(powers: &[(Expanded, Rational)]) -> Option<(Expanded, Rational)> {
    let ((first, _), rest) = powers.split_first()?;
    if rest.iter().any(|(base, _)| base != first) {
        return None;
    }
    let total = powers
        .iter()
        .fold(Rational::zero(), |acc, (_, e)| acc + e.clone());
    Some((first.clone(), total))
}

/// One step of `∫ · du` on `sign · g(u)`.
fn antiderivative_in_u((g, sign): (Func, Rational)) -> (Func, Rational) {
    match g {
        Func::Sin => (Func::Cos, -sign),
        Func::Cos => (Func::Sin, sign),
        other => (other, sign),
    }
}
