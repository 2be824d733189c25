//! Critical points of `f(x)` and the second-derivative test.
//!
//! When `f'` is a polynomial with rational coefficients its roots are found
//! exactly where possible: rational roots first, then a leftover quadratic
//! in closed form, then numeric isolation of whatever remains. Any other `f'`
//! is scanned for sign changes over [`ExtremaConfig`]'s interval and each
//! bracket is bisected.

use planum_calculus::{Calculus, Expanded};
use planum_core::{parse_expression, Bindings, ExprArena, Rational, SymbolId, SymbolTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OptimizeError, Result};
use crate::poly::{bisect, DensePoly};

/// `f''` values within this of zero are inconclusive.
pub const INCONCLUSIVE_TOLERANCE: f64 = 1e-9;

/// Options of the `[extrema]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtremaConfig {
    /// Left end of the sign-change scan.
    pub search_min: f64,
    /// Right end of the sign-change scan.
    pub search_max: f64,
    /// Number of scan intervals.
    pub samples: usize,
}

impl Default for ExtremaConfig {
    fn default() -> Self {
        Self {
            search_min: -10.0,
            search_max: 10.0,
            samples: 2000,
        }
    }
}

impl ExtremaConfig {
    /// Checks the scan interval.
    ///
    /// # Errors
    ///
    /// Fails for a non-finite or empty interval or fewer than two samples.
    pub fn validate(&self) -> Result<()> {
        if !(self.search_min.is_finite() && self.search_max.is_finite() && self.search_min < self.search_max) {
            return Err(OptimizeError::InvalidInterval {
                min: self.search_min,
                max: self.search_max,
            });
        }
        if self.samples < 2 {
            return Err(OptimizeError::TooFewSamples(self.samples));
        }
        Ok(())
    }
}

/// Outcome of the second-derivative test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// `f'' > 0`.
    Minimum,
    /// `f'' < 0`.
    Maximum,
    /// `f'' = 0`.
    Inconclusive,
}

/// How the critical points were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootMethod {
    /// Roots of a polynomial `f'`.
    Polynomial,
    /// Sign-change scan of a general `f'`.
    SignScan,
}

/// One solution of `f'(x) = 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPoint {
    /// Location.
    pub x: f64,
    /// Exact location as text, when known.
    pub exact: Option<String>,
    /// Exact location as LaTeX, when known.
    pub latex: Option<String>,
    /// `f(x)`, if defined there.
    pub value: Option<f64>,
    /// `f''(x)`.
    pub second_derivative: f64,
    /// Result of the second-derivative test.
    pub classification: Classification,
}

/// Everything shown for one function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremaReport {
    /// `f(x)` as LaTeX.
    pub function_latex: String,
    /// `f'(x)` as plain text.
    pub first_derivative: String,
    /// `f'(x)` as LaTeX.
    pub first_derivative_latex: String,
    /// `f''(x)` as plain text.
    pub second_derivative: String,
    /// `f''(x)` as LaTeX.
    pub second_derivative_latex: String,
    /// Root finder used.
    pub method: RootMethod,
    /// Critical points in ascending order.
    pub points: Vec<CriticalPoint>,
    /// Remarks such as an empty result.
    pub notes: Vec<String>,
}

/// A root before classification.
struct Root {
    x: f64,
    exact: Option<Expanded>,
}

/// Finds and classifies the critical points of `f(x)`.
///
/// # Errors
///
/// Fails on unparsable input, an invalid scan configuration, or a function
/// the symbolic engine cannot differentiate.
pub fn find_extrema(f: &str, config: &ExtremaConfig) -> Result<ExtremaReport> {
    config.validate()?;
    let mut arena = ExprArena::new();
    let handle = parse_expression(&mut arena, f, &SymbolTable::new(["x"]))
        .map_err(|source| OptimizeError::Parse { component: "f", source })?;

    let mut calc = Calculus::new(&mut arena);
    let x = calc.variable("x");
    let f = calc.expand(handle)?;
    let f1 = calc.diff(&f, x)?;
    let f2 = calc.diff(&f1, x)?;
    debug!(terms = f1.len(), "first derivative");

    let atom = calc.symbol_atom(x);
    let mut notes = Vec::new();
    let (method, roots) = match DensePoly::from_expanded(&f1, atom) {
        Some(poly) if poly.is_zero() => {
            notes.push("f'(x) vanishes identically; every point is critical".to_string());
            (RootMethod::Polynomial, Vec::new())
        }
        Some(poly) => (RootMethod::Polynomial, polynomial_roots(&mut calc, &poly)?),
        None => (RootMethod::SignScan, scan_roots(&mut calc, &f1, x, config)),
    };
    debug!(?method, count = roots.len(), "critical points");

    let mut points = Vec::with_capacity(roots.len());
    for root in roots {
        points.push(classify(&mut calc, &f, &f2, x, root)?);
    }
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    if points.is_empty() && notes.is_empty() {
        notes.push("no critical points found".to_string());
    }

    Ok(ExtremaReport {
        function_latex: calc.latex(&f),
        first_derivative: calc.text(&f1),
        first_derivative_latex: calc.latex(&f1),
        second_derivative: calc.text(&f2),
        second_derivative_latex: calc.latex(&f2),
        method,
        points,
        notes,
    })
}

fn polynomial_roots(calc: &mut Calculus<'_>, poly: &DensePoly) -> Result<Vec<Root>> {
    let (rational, rest) = poly.split_rational_roots();
    let mut roots: Vec<Root> = rational
        .into_iter()
        .map(|r| Root {
            x: r.to_f64(),
            exact: Some(Expanded::constant(r)),
        })
        .collect();

    match rest.degree() {
        0 | 1 => {}
        2 => roots.extend(quadratic_roots(calc, rest.coeffs())?),
        degree => {
            debug!(degree, "isolating remaining roots numerically");
            roots.extend(rest.real_roots().into_iter().map(|x| Root { x, exact: None }));
        }
    }
    Ok(roots)
}

/// Real roots of `c + b x + a x²` as `-b/2a ± √D`.
fn quadratic_roots(calc: &mut Calculus<'_>, coeffs: &[Rational]) -> Result<Vec<Root>> {
    let (c, b, a) = (&coeffs[0], &coeffs[1], &coeffs[2]);
    let two = Rational::from_integer(2);
    let four = Rational::from_integer(4);
    let centre = -(b / &(&two * a));
    // D = (b² - 4ac) / 4a²
    let discriminant = &(&(b * b) - &(&(&four * a) * c)) / &(&(&four * a) * a);
    if discriminant.is_negative() {
        return Ok(Vec::new());
    }

    let offset = calc.pow_rational(&Expanded::constant(discriminant), &Rational::from_i64(1, 2))?;
    let centre = Expanded::constant(centre);
    let mut roots = Vec::with_capacity(2);
    for value in [centre.sub(&offset), centre.add(&offset)] {
        let x = calc.evaluate(&value, &Bindings::new())?;
        roots.push(Root { x, exact: Some(value) });
    }
    Ok(roots)
}

fn scan_roots(calc: &mut Calculus<'_>, f1: &Expanded, x: SymbolId, config: &ExtremaConfig) -> Vec<Root> {
    let handle = calc.to_expr(f1);
    let arena = calc.arena();
    let derivative = |t: f64| planum_core::evaluate(arena, handle, &Bindings::new().with(x, t)).ok();

    let (lo, hi) = (config.search_min, config.search_max);
    #[allow(clippy::cast_precision_loss)]
    let step = (hi - lo) / config.samples as f64;
    let mut roots: Vec<f64> = Vec::new();
    let mut previous: Option<(f64, f64)> = None;
    for i in 0..=config.samples {
        #[allow(clippy::cast_precision_loss)]
        let t = lo + step * i as f64;
        let Some(v) = derivative(t) else {
            previous = None;
            continue;
        };
        if v == 0.0 {
            roots.push(t);
        } else if let Some((pt, pv)) = previous {
            if pv != 0.0 && pv.signum() != v.signum() {
                let root = bisect(|s| derivative(s).unwrap_or(f64::NAN), pt, t, pv);
                // A sign change across a pole is not a root.
                if derivative(root).is_some_and(|r| r.abs() <= 1e-6 * (1.0 + pv.abs().min(v.abs()))) {
                    roots.push(root);
                }
            }
        }
        previous = Some((t, v));
    }
    roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * (1.0 + b.abs()));
    debug!(count = roots.len(), lo, hi, "sign scan");
    roots.into_iter().map(|x| Root { x, exact: None }).collect()
}

fn classify(calc: &mut Calculus<'_>, f: &Expanded, f2: &Expanded, x: SymbolId, root: Root) -> Result<CriticalPoint> {
    let bindings = Bindings::new().with(x, root.x);
    let value = calc.evaluate(f, &bindings).ok();

    let exact_second = match &root.exact {
        Some(exact) => calc.substitute(f2, x, exact)?.as_constant(),
        None => None,
    };
    let (second_derivative, classification) = match exact_second {
        Some(s) => (s.to_f64(), sign_class(s.signum())),
        None => {
            let s = calc.evaluate(f2, &bindings)?;
            let sign = if s.abs() <= INCONCLUSIVE_TOLERANCE {
                0
            } else if s > 0.0 {
                1
            } else {
                -1
            };
            (s, sign_class(sign))
        }
    };

    let (exact, latex) = match &root.exact {
        Some(e) => (Some(calc.text(e)), Some(calc.latex(e))),
        None => (None, None),
    };
    Ok(CriticalPoint {
        x: root.x,
        exact,
        latex,
        value,
        second_derivative,
        classification,
    })
}

fn sign_class(sign: i8) -> Classification {
    match sign {
        1 => Classification::Minimum,
        -1 => Classification::Maximum,
        _ => Classification::Inconclusive,
    }
}
