//! Singularities of an integrand on an interval.
//!
//! An antiderivative only gives the definite integral when the integrand is
//! finite and real on the whole closed interval. Before evaluating one, the
//! factors that can break this are located and sampled:
//!
//! | factor                | singular where | error                          |
//! |-----------------------|----------------|--------------------------------|
//! | `B^t`, `t <= -1`      | `B = 0`        | [`IntegrationError::Divergent`] |
//! | `tan(u)`              | `cos u = 0`    | [`IntegrationError::Divergent`] |
//! | `1 / sin(u)`          | `sin u = 0`    | [`IntegrationError::Divergent`] |
//! | `B^t`, `t` fractional | `B < 0`        | [`IntegrationError::NonReal`]   |
//! | `log(u)`              | `u < 0`        | [`IntegrationError::NonReal`]   |
//!
//! A zero is found exactly when it sits on a bound, and otherwise by a zero
//! or a sign change between consecutive samples. Factors that cannot be
//! evaluated (free parameters) are not checked.

use num_traits::One;
use planum_core::{Bindings, ExprHandle, ExprNode, Func, Rational, SymbolId};
use tracing::debug;

use crate::engine::Calculus;
use crate::error::{IntegrationError, Result};
use crate::expanded::Expanded;

/// Number of subintervals sampled per singular factor.
pub const SAMPLES: u32 = 64;

/// Sampled values this close to zero count as a zero.
const ZERO_TOLERANCE: f64 = 1e-12;

/// A factor of the integrand that restricts where it is defined.
#[derive(Clone, Debug, PartialEq)]
pub enum Singularity {
    /// The integrand is unbounded where this vanishes.
    Pole(Expanded),
    /// The integrand is not real where this is negative.
    Branch(Expanded),
}

impl Calculus<'_> {
    /// The factors of `f` that make it unbounded or complex somewhere along
    /// `var`.
    ///
    /// # Errors
    ///
    /// Propagates expansion failures.
    pub fn singularities(&mut self, f: &Expanded, var: SymbolId) -> Result<Vec<Singularity>> {
        let mut found = Vec::new();
        for (monomial, _) in f.terms() {
            for (atom, exp) in monomial.iter() {
                if self.arena().is_free_of(atom, var) {
                    continue;
                }
                if let Some(singularity) = self.classify_singular(atom, exp)? {
                    if !found.contains(&singularity) {
                        found.push(singularity);
                    }
                }
            }
        }
        Ok(found)
    }

    fn classify_singular(&mut self, atom: ExprHandle, exp: i64) -> Result<Option<Singularity>> {
        let singularity = match self.arena().get(atom).clone() {
            ExprNode::Symbol(_) | ExprNode::Add(_) if exp < 0 => Singularity::Pole(self.expand(atom)?),
            ExprNode::Pow { base, exp: power } => {
                let Some(power) = self.arena().get(power).as_number().cloned() else {
                    return Ok(None);
                };
                let base = self.expand(base)?;
                if power.clone() * Rational::from_integer(exp) <= -Rational::one() {
                    Singularity::Pole(base)
                } else if power.is_integer() {
                    return Ok(None);
                } else {
                    Singularity::Branch(base)
                }
            }
            ExprNode::Function { func: Func::Tan, arg } => {
                let arg = self.expand(arg)?;
                let at = if exp > 0 { Func::Cos } else { Func::Sin };
                Singularity::Pole(self.apply(at, &arg)?)
            }
            ExprNode::Function {
                func: Func::Sin | Func::Cos | Func::Exp,
                ..
            } if exp < 0 => Singularity::Pole(Expanded::atom(atom)),
            ExprNode::Function { func: Func::Log, arg } => Singularity::Branch(self.expand(arg)?),
            _ => return Ok(None),
        };
        Ok(Some(singularity))
    }

    /// Checks that `f` is finite and real for `var` on the closed interval
    /// between `lower` and `upper`, with every other symbol taken from
    /// `bindings`. An empty interval always passes.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Divergent`] when a pole lies on the
    /// interval and [`IntegrationError::NonReal`] when a branch is crossed.
    pub fn check_interval(
        &mut self,
        f: &Expanded,
        var: SymbolId,
        lower: &Expanded,
        upper: &Expanded,
        bindings: &Bindings,
    ) -> Result<()> {
        if lower == upper {
            return Ok(());
        }
        let singularities = self.singularities(f, var)?;
        if singularities.is_empty() {
            return Ok(());
        }
        let bounds = match (self.evaluate(lower, bindings), self.evaluate(upper, bindings)) {
            (Ok(a), Ok(b)) => Some((a, b)),
            _ => None,
        };

        for singularity in &singularities {
            let hit = match singularity {
                Singularity::Pole(vanishing) => {
                    self.vanishes_at_bound(vanishing, var, lower, upper)
                        || bounds.is_some_and(|(a, b)| {
                            self.sample(vanishing, var, a, b, bindings)
                                .is_some_and(|values| crosses_zero(&values))
                        })
                }
                Singularity::Branch(radicand) => bounds.is_some_and(|(a, b)| {
                    self.sample(radicand, var, a, b, bindings)
                        .is_some_and(|values| values.iter().any(|&v| v < -ZERO_TOLERANCE))
                }),
            };
            if hit {
                debug!(?singularity, "integrand singular on the interval");
                let integrand = self.text(f);
                let lower = self.text(lower);
                let upper = self.text(upper);
                return Err(match singularity {
                    Singularity::Pole(_) => IntegrationError::Divergent {
                        integrand,
                        lower,
                        upper,
                    },
                    Singularity::Branch(_) => {
                        IntegrationError::NonReal(format!("{integrand} on [{lower}, {upper}]"))
                    }
                });
            }
        }
        Ok(())
    }

    fn vanishes_at_bound(&mut self, vanishing: &Expanded, var: SymbolId, lower: &Expanded, upper: &Expanded) -> bool {
        [lower, upper].into_iter().any(|bound| {
            self.substitute(vanishing, var, bound)
                .is_ok_and(|value| value.is_zero())
        })
    }

    /// `value` at `SAMPLES + 1` evenly spaced points from `a` to `b`, or
    /// `None` if any of them cannot be evaluated.
    fn sample(&mut self, value: &Expanded, var: SymbolId, a: f64, b: f64, bindings: &Bindings) -> Option<Vec<f64>> {
        let handle = self.to_expr(value);
        let mut point = bindings.clone();
        (0..=SAMPLES)
            .map(|i| {
                point.set(var, a + (b - a) * f64::from(i) / f64::from(SAMPLES));
                planum_core::evaluate(self.arena(), handle, &point).ok()
            })
            .collect()
    }
}

fn crosses_zero(values: &[f64]) -> bool {
    values.iter().any(|v| v.abs() <= ZERO_TOLERANCE)
        || values.windows(2).any(|pair| pair[0].signum() != pair[1].signum())
}
