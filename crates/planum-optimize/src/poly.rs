//! Dense univariate polynomials with rational coefficients.

use num_traits::Zero;
use planum_calculus::Expanded;
use planum_core::{ExprHandle, Rational};

/// Highest degree accepted by [`DensePoly::from_expanded`].
pub const MAX_DEGREE: usize = 256;

/// Integer coefficients beyond this are not searched for rational roots.
const MAX_ROOT_SEARCH: i64 = 1_000_000_000_000;

/// A dense univariate polynomial.
///
/// Coefficients are stored in ascending degree order with no trailing zeros,
/// except that the zero polynomial is `[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensePoly {
    coeffs: Vec<Rational>,
}

impl DensePoly {
    /// Creates a polynomial from ascending coefficients.
    #[must_use]
    pub fn new(mut coeffs: Vec<Rational>) -> Self {
        while coeffs.len() > 1 && coeffs.last().is_some_and(Zero::is_zero) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(Rational::zero());
        }
        Self { coeffs }
    }

    /// Reads `value` as a polynomial in `atom`.
    ///
    /// Returns `None` if any term mentions another atom, has a negative
    /// power of `atom`, or exceeds [`MAX_DEGREE`].
    #[must_use]
    pub fn from_expanded(value: &Expanded, atom: ExprHandle) -> Option<Self> {
        let mut coeffs = Vec::new();
        for (monomial, coefficient) in value.terms() {
            let degree = if monomial.is_one() {
                0
            } else if monomial.len() == 1 {
                usize::try_from(monomial.exponent(atom)).ok().filter(|&k| k > 0)?
            } else {
                return None;
            };
            if degree > MAX_DEGREE {
                return None;
            }
            if coeffs.len() <= degree {
                coeffs.resize(degree + 1, Rational::zero());
            }
            coeffs[degree] = coefficient.clone();
        }
        Some(Self::new(coeffs))
    }

    /// Degree; zero for constants, including the zero polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Whether every coefficient is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_zero()
    }

    /// Ascending coefficients.
    #[must_use]
    pub fn coeffs(&self) -> &[Rational] {
        &self.coeffs
    }

    /// Horner evaluation.
    #[must_use]
    pub fn eval(&self, x: &Rational) -> Rational {
        self.coeffs
            .iter()
            .rev()
            .fold(Rational::zero(), |acc, c| acc * x + c)
    }

    /// Divides by `x - root`, dropping the remainder.
    #[must_use]
    pub fn deflate(&self, root: &Rational) -> Self {
        if self.degree() == 0 {
            return Self::new(vec![Rational::zero()]);
        }
        let mut quotient = vec![Rational::zero(); self.degree()];
        let mut carry = Rational::zero();
        for i in (1..self.coeffs.len()).rev() {
            carry = carry * root + &self.coeffs[i];
            quotient[i - 1] = carry.clone();
        }
        Self::new(quotient)
    }

    /// Splits off every rational root.
    ///
    /// Returns the distinct roots in ascending order and the quotient left
    /// after dividing out each root with its full multiplicity. Candidates
    /// come from the rational root theorem; polynomials whose integer form
    /// has coefficients beyond 10¹² are only checked for the root 0.
    #[must_use]
    pub fn split_rational_roots(&self) -> (Vec<Rational>, Self) {
        let mut p = self.clone();
        let mut roots = Vec::new();
        if p.is_zero() {
            return (roots, p);
        }

        if p.degree() > 0 && p.coeffs[0].is_zero() {
            roots.push(Rational::zero());
            while p.degree() > 0 && p.coeffs[0].is_zero() {
                p = Self::new(p.coeffs[1..].to_vec());
            }
        }

        if let Some(integral) = p.integer_coefficients() {
            let constant = integral.first().copied().unwrap_or(0);
            let leading = integral.last().copied().unwrap_or(1);
            for q in divisors(leading) {
                for n in divisors(constant) {
                    for sign in [1, -1] {
                        if p.degree() == 0 {
                            break;
                        }
                        let candidate = Rational::from_i64(sign * n, q);
                        if roots.contains(&candidate) || !p.eval(&candidate).is_zero() {
                            continue;
                        }
                        while p.degree() > 0 && p.eval(&candidate).is_zero() {
                            p = p.deflate(&candidate);
                        }
                        roots.push(candidate);
                    }
                }
            }
        }

        roots.sort();
        (roots, p)
    }

    /// Coefficients scaled to integers, if they fit the search limit.
    fn integer_coefficients(&self) -> Option<Vec<i64>> {
        let mut lcm: i64 = 1;
        for c in &self.coeffs {
            let (_, den) = c.to_i64_parts()?;
            lcm = lcm.checked_mul(den / gcd(lcm, den))?;
        }
        let scale = Rational::from_integer(lcm);
        self.coeffs
            .iter()
            .map(|c| {
                let n = (c * &scale).to_i64()?;
                (n.abs() <= MAX_ROOT_SEARCH).then_some(n)
            })
            .collect()
    }

    /// Real roots of a polynomial with no rational roots, numerically.
    ///
    /// Roots of the derivative split the real line into monotone pieces
    /// inside the Cauchy bound; each piece with a sign change is bisected.
    #[must_use]
    pub fn real_roots(&self) -> Vec<f64> {
        let coeffs: Vec<f64> = self.coeffs.iter().map(Rational::to_f64).collect();
        real_roots_f64(&coeffs)
    }
}

impl std::ops::Mul for DensePoly {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        let mut coeffs = vec![Rational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] = &coeffs[i + j] + &(a * b);
            }
        }
        Self::new(coeffs)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs().max(1)
}

/// Positive divisors of `|n|`; `[1]` for zero.
fn divisors(n: i64) -> Vec<i64> {
    let n = n.abs();
    if n == 0 {
        return vec![1];
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d != n / d {
                large.push(n / d);
            }
        }
        d += 1;
    }
    small.extend(large.into_iter().rev());
    small
}

fn horner(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn real_roots_f64(coeffs: &[f64]) -> Vec<f64> {
    let mut coeffs = coeffs.to_vec();
    while coeffs.len() > 1 && coeffs.last() == Some(&0.0) {
        coeffs.pop();
    }
    let degree = coeffs.len().saturating_sub(1);
    let lead = coeffs[degree];
    match degree {
        0 => return Vec::new(),
        1 => return vec![-coeffs[0] / lead],
        _ => {}
    }

    let bound = 1.0 + coeffs[..degree].iter().map(|c| (c / lead).abs()).fold(0.0, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let derivative: Vec<f64> = coeffs.iter().enumerate().skip(1).map(|(i, c)| c * i as f64).collect();

    let mut points = vec![-bound];
    points.extend(real_roots_f64(&derivative).into_iter().filter(|c| c.abs() < bound));
    points.push(bound);
    points.sort_by(f64::total_cmp);

    let scale = coeffs.iter().map(|c| c.abs()).fold(0.0, f64::max);
    let tolerance = 1e-12 * scale;
    let mut roots: Vec<f64> = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (fa, fb) = (horner(&coeffs, a), horner(&coeffs, b));
        if fa.abs() <= tolerance {
            roots.push(a);
        } else if fa.signum() != fb.signum() && fb.abs() > tolerance {
            roots.push(bisect(|x| horner(&coeffs, x), a, b, fa));
        }
    }
    roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * (1.0 + b.abs()));
    roots
}

/// Bisects `[a, b]` given a sign change and `f(a)`.
pub(crate) fn bisect(mut f: impl FnMut(f64) -> f64, mut a: f64, mut b: f64, mut fa: f64) -> f64 {
    for _ in 0..200 {
        let mid = 0.5 * (a + b);
        if mid <= a || mid >= b {
            break;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[i64]) -> DensePoly {
        DensePoly::new(coeffs.iter().map(|&c| Rational::from_integer(c)).collect())
    }

    fn q(n: i64, d: i64) -> Rational {
        Rational::from_i64(n, d)
    }

    #[test]
    fn test_normalization() {
        assert_eq!(poly(&[1, 2, 0, 0]).degree(), 1);
        assert!(poly(&[0, 0]).is_zero());
        assert_eq!(poly(&[]).degree(), 0);
    }

    #[test]
    fn test_eval_and_deflate() {
        // (x - 1)(x + 2) = x² + x - 2
        let p = poly(&[-2, 1, 1]);
        assert_eq!(p.eval(&q(1, 1)), q(0, 1));
        assert_eq!(p.eval(&q(3, 1)), q(10, 1));
        assert_eq!(p.deflate(&q(1, 1)), poly(&[2, 1]));
    }

    #[test]
    fn test_rational_roots() {
        // 3x² - 3
        let (roots, rest) = poly(&[-3, 0, 3]).split_rational_roots();
        assert_eq!(roots, vec![q(-1, 1), q(1, 1)]);
        assert_eq!(rest.degree(), 0);

        // (2x - 1)(x + 3) = 2x² + 5x - 3
        let (roots, _) = poly(&[-3, 5, 2]).split_rational_roots();
        assert_eq!(roots, vec![q(-3, 1), q(1, 2)]);
    }

    #[test]
    fn test_multiple_and_zero_roots() {
        // x³ (x - 1)² = x⁵ - 2x⁴ + x³
        let (roots, rest) = poly(&[0, 0, 0, 1, -2, 1]).split_rational_roots();
        assert_eq!(roots, vec![q(0, 1), q(1, 1)]);
        assert_eq!(rest, poly(&[1]));
    }

    #[test]
    fn test_irrational_remainder() {
        // (x - 1)(x² - 2)
        let (roots, rest) = poly(&[2, -2, -1, 1]).split_rational_roots();
        assert_eq!(roots, vec![q(1, 1)]);
        assert_eq!(rest, poly(&[-2, 0, 1]));
    }

    #[test]
    fn test_numeric_roots() {
        // x³ - 2 has one real root.
        let roots = poly(&[-2, 0, 0, 1]).real_roots();
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2f64.cbrt()).abs() < 1e-12);

        // x⁴ - 10x² + 1 = (x² - 5)² - 24 has four real roots ±√2 ± √3.
        let roots = poly(&[1, 0, -10, 0, 1]).real_roots();
        let s = 2f64.sqrt();
        let t = 3f64.sqrt();
        let expected = [-s - t, s - t, t - s, s + t];
        assert_eq!(roots.len(), 4);
        for (r, e) in roots.iter().zip(expected) {
            assert!((r - e).abs() < 1e-10, "{r} vs {e}");
        }

        assert!(poly(&[1, 0, 1]).real_roots().is_empty());
    }

    #[test]
    fn test_from_expanded_rejects_other_atoms() {
        use planum_calculus::Calculus;
        use planum_core::{parse_expression, ExprArena, SymbolTable};

        let mut arena = ExprArena::new();
        let table = SymbolTable::new(["x"]);
        let poly_expr = parse_expression(&mut arena, "3*x**2 - x/2 + 1", &table).unwrap();
        let trig_expr = parse_expression(&mut arena, "x*sin(x)", &table).unwrap();
        let inverse_expr = parse_expression(&mut arena, "1/x", &table).unwrap();
        let mut calc = Calculus::new(&mut arena);
        let x = calc.variable("x");
        let atom = calc.symbol_atom(x);

        let value = calc.expand(poly_expr).unwrap();
        assert_eq!(
            DensePoly::from_expanded(&value, atom),
            Some(DensePoly::new(vec![q(1, 1), q(-1, 2), q(3, 1)]))
        );
        let value = calc.expand(trig_expr).unwrap();
        assert_eq!(DensePoly::from_expanded(&value, atom), None);
        let value = calc.expand(inverse_expr).unwrap();
        assert_eq!(DensePoly::from_expanded(&value, atom), None);
    }
}
