//! Linearization of trigonometric products.
//!
//! A product of powers of `sin` and `cos` is rewritten as a sum of single
//! `sin`/`cos` terms of integer combinations of the original arguments, by
//! way of `sin u = (e^{iu} - e^{-iu}) / 2i` and `cos u = (e^{iu} + e^{-iu}) / 2`.
//! The intermediate complex exponentials are tracked as a spectrum mapping
//! each frequency to a complex rational coefficient; only the real part
//! survives at the end.

use std::collections::BTreeMap;

use num_traits::Zero;
use planum_core::{Func, Rational};

use crate::engine::Calculus;
use crate::error::{IntegrationError, Result};
use crate::expanded::Expanded;

/// Largest total degree accepted by [`Calculus::linearize_trig`].
pub const MAX_TRIG_DEGREE: i64 = 16;

/// A complex rational `re + i·im`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Complex {
    re: Rational,
    im: Rational,
}

type Spectrum = BTreeMap<Expanded, Complex>;

fn accumulate(spectrum: &mut Spectrum, frequency: Expanded, re: Rational, im: Rational) {
    let entry = spectrum.entry(frequency).or_default();
    entry.re = &entry.re + &re;
    entry.im = &entry.im + &im;
}

impl Calculus<'_> {
    /// Rewrites `Π f(uᵢ)^kᵢ` (with `f` in `{sin, cos}`) as a sum of first
    /// powers of `sin` and `cos`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::ExponentTooLarge`] above
    /// [`MAX_TRIG_DEGREE`], and [`IntegrationError::NoClosedForm`] for a
    /// factor that is not `sin` or `cos` with a non-negative power.
    pub fn linearize_trig(&mut self, factors: &[(Func, Expanded, i64)]) -> Result<Expanded> {
        let degree: i64 = factors.iter().map(|(_, _, k)| *k).sum();
        if degree > MAX_TRIG_DEGREE {
            return Err(IntegrationError::ExponentTooLarge(degree.to_string()));
        }

        let half = Rational::from_i64(1, 2);
        let mut spectrum = Spectrum::new();
        spectrum.insert(
            Expanded::zero(),
            Complex {
                re: Rational::from_integer(1),
                im: Rational::zero(),
            },
        );

        for (func, arg, power) in factors {
            if *power < 0 || !matches!(func, Func::Sin | Func::Cos) {
                return Err(IntegrationError::NoClosedForm(format!(
                    "{}(...)^{power}",
                    func.name()
                )));
            }
            for _ in 0..*power {
                let mut next = Spectrum::new();
                for (frequency, z) in &spectrum {
                    let up = frequency.add(arg);
                    let down = frequency.sub(arg);
                    if *func == Func::Cos {
                        // z/2 at ±u
                        accumulate(&mut next, up, &z.re * &half, &z.im * &half);
                        accumulate(&mut next, down, &z.re * &half, &z.im * &half);
                    } else {
                        // -iz/2 at +u, iz/2 at -u
                        accumulate(&mut next, up, &z.im * &half, -(&z.re * &half));
                        accumulate(&mut next, down, -(&z.im * &half), &z.re * &half);
                    }
                }
                next.retain(|_, z| !(z.re.is_zero() && z.im.is_zero()));
                spectrum = next;
            }
        }

        // Re(z · e^{if}) = re·cos f - im·sin f
        let mut out = Expanded::zero();
        for (frequency, z) in spectrum {
            if !z.re.is_zero() {
                let cos = self.apply(Func::Cos, &frequency)?;
                out.add_assign(&cos.scale(&z.re));
            }
            if !z.im.is_zero() {
                let sin = self.apply(Func::Sin, &frequency)?;
                out.add_assign(&sin.scale(&-z.im));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_core::{parse_expression, ExprArena, SymbolTable};

    fn linearized_equals(factors: &[(Func, &str, i64)], expected: &str) -> bool {
        let mut arena = ExprArena::new();
        let symbols = SymbolTable::new(["x"]);
        let args: Vec<_> = factors
            .iter()
            .map(|(f, a, k)| (*f, parse_expression(&mut arena, a, &symbols).unwrap(), *k))
            .collect();
        let expected = parse_expression(&mut arena, expected, &symbols).unwrap();
        let mut calc = Calculus::new(&mut arena);
        let factors: Vec<_> = args
            .into_iter()
            .map(|(f, h, k)| (f, calc.expand(h).unwrap(), k))
            .collect();
        let lhs = calc.linearize_trig(&factors).unwrap();
        lhs == calc.expand(expected).unwrap()
    }

    #[test]
    fn test_sin_squared() {
        assert!(linearized_equals(&[(Func::Sin, "x", 2)], "1/2 - cos(2*x)/2"));
    }

    #[test]
    fn test_cos_squared() {
        assert!(linearized_equals(&[(Func::Cos, "x", 2)], "1/2 + cos(2*x)/2"));
    }

    #[test]
    fn test_sin_cos() {
        assert!(linearized_equals(
            &[(Func::Sin, "x", 1), (Func::Cos, "x", 1)],
            "sin(2*x)/2"
        ));
    }

    #[test]
    fn test_mixed_frequencies() {
        // sin(x)cos(2x) = (sin(3x) - sin(x)) / 2
        assert!(linearized_equals(
            &[(Func::Sin, "x", 1), (Func::Cos, "2*x", 1)],
            "sin(3*x)/2 - sin(x)/2"
        ));
    }

    #[test]
    fn test_cube() {
        // sin³x = (3 sin x - sin 3x) / 4
        assert!(linearized_equals(&[(Func::Sin, "x", 3)], "3*sin(x)/4 - sin(3*x)/4"));
    }

    #[test]
    fn test_degree_limit() {
        let mut arena = ExprArena::new();
        let x = arena.symbol("x");
        let mut calc = Calculus::new(&mut arena);
        let u = calc.expand(x).unwrap();
        assert!(matches!(
            calc.linearize_trig(&[(Func::Sin, u, 40)]),
            Err(IntegrationError::ExponentTooLarge(_))
        ));
    }
}
