//! Constrained extrema by Lagrange multipliers.
//!
//! For `f` subject to `g = 0` the stationary points of
//! `L = f + λ g` solve `∂L/∂v = 0` for every variable and `∂L/∂λ = g = 0`.
//! A linear system is solved exactly over the rationals; anything else goes
//! to a multi-start Newton iteration with a symbolic Jacobian.

use hashbrown::HashMap;
use num_traits::Zero;
use planum_calculus::{Calculus, Expanded};
use planum_core::{parse_expression, Bindings, ExprArena, ExprHandle, Rational, SymbolId, SymbolTable};
use planum_matrix::Matrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{OptimizeError, Result};
use crate::newton::{seed, System};
use crate::numeric_text;

/// Name of the multiplier symbol.
pub const MULTIPLIER: &str = "lam";

/// Options of the `[lagrange]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagrangeConfig {
    /// Newton starting points.
    pub seeds: usize,
    /// Iteration budget per seed.
    pub max_iterations: usize,
    /// Residual below which a point counts as a solution.
    pub tolerance: f64,
}

impl Default for LagrangeConfig {
    fn default() -> Self {
        Self {
            seeds: 64,
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// The variables `f` and `g` range over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    /// `(x, y)`.
    #[default]
    Two,
    /// `(x, y, z)`.
    Three,
}

impl Dimension {
    /// From a variable count of 2 or 3.
    #[must_use]
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// Variable names in order.
    #[must_use]
    pub fn names(self) -> &'static [&'static str] {
        match self {
            Self::Two => &["x", "y"],
            Self::Three => &["x", "y", "z"],
        }
    }
}

/// One stationary equation `∂L/∂v = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Equation {
    /// The variable differentiated by.
    pub variable: String,
    /// Left-hand side as text.
    pub text: String,
    /// `… = 0` as LaTeX.
    pub latex: String,
}

/// The value of one unknown in a solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Unknown name.
    pub variable: String,
    /// Exact value, or the numeric value rounded for display.
    pub text: String,
    /// Numeric value.
    pub value: f64,
}

/// A stationary point of the Lagrangian.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// Values of the variables, then of the multiplier.
    pub assignments: Vec<Assignment>,
    /// `f` at the point, if defined.
    pub objective: Option<f64>,
    /// Whether the values are exact.
    pub exact: bool,
}

/// Solver used for the stationary system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveMethod {
    /// Exact rational elimination of a linear system.
    Linear,
    /// Multi-start Newton iteration.
    Newton,
}

/// Everything shown for one problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagrangeReport {
    /// `L` as plain text.
    pub lagrangian: String,
    /// `L` as LaTeX.
    pub lagrangian_latex: String,
    /// `∂L/∂v = 0` for each unknown.
    pub equations: Vec<Equation>,
    /// Solver used.
    pub method: SolveMethod,
    /// Distinct solutions, sorted.
    pub solutions: Vec<Solution>,
    /// Set when there is nothing to report.
    pub note: Option<String>,
}

/// Solves the Lagrange system of `f` subject to `g = 0`.
///
/// # Errors
///
/// Fails on unparsable input or when the engine cannot differentiate.
pub fn solve_lagrange(f: &str, g: &str, dimension: Dimension, config: &LagrangeConfig) -> Result<LagrangeReport> {
    let names = dimension.names();
    let mut arena = ExprArena::new();
    let table = SymbolTable::new(names.iter().copied());
    let f = parse_expression(&mut arena, f, &table).map_err(|source| OptimizeError::Parse { component: "f", source })?;
    let g = parse_expression(&mut arena, g, &table).map_err(|source| OptimizeError::Parse { component: "g", source })?;

    let mut calc = Calculus::new(&mut arena);
    let mut unknowns: Vec<SymbolId> = names.iter().map(|name| calc.variable(name)).collect();
    let lam = calc.variable(MULTIPLIER);
    unknowns.push(lam);

    let f = calc.expand(f)?;
    let g = calc.expand(g)?;
    let multiplier = calc.symbol(lam);
    let lagrangian = f.add(&calc.mul(&multiplier, &g)?);

    let mut gradient = Vec::with_capacity(unknowns.len());
    for &v in &unknowns {
        gradient.push(calc.diff(&lagrangian, v)?);
    }
    let equations = unknowns
        .iter()
        .zip(&gradient)
        .map(|(&v, eq)| Equation {
            variable: calc.arena().symbol_name(v).unwrap_or_default().to_string(),
            text: calc.text(eq),
            latex: format!("{} = 0", calc.latex(eq)),
        })
        .collect();
    debug!(unknowns = unknowns.len(), "stationary system");

    let (method, solutions) = match linear_system(&mut calc, &gradient, &unknowns) {
        Some((a, b)) => (SolveMethod::Linear, solve_linear(&mut calc, &f, &a, &b, &unknowns)?),
        None => (SolveMethod::Newton, solve_newton(&mut calc, &f, &gradient, &unknowns, config)?),
    };

    let note = solutions.is_empty().then(|| "no solution found".to_string());
    Ok(LagrangeReport {
        lagrangian: calc.text(&lagrangian),
        lagrangian_latex: calc.latex(&lagrangian),
        equations,
        method,
        solutions,
        note,
    })
}

/// `A v = b` if every equation is affine in the unknowns.
fn linear_system(calc: &mut Calculus<'_>, equations: &[Expanded], unknowns: &[SymbolId]) -> Option<(Matrix, Vec<Rational>)> {
    let columns: HashMap<ExprHandle, usize> = unknowns
        .iter()
        .enumerate()
        .map(|(j, &v)| (calc.symbol_atom(v), j))
        .collect();

    let mut a = Matrix::zeros(equations.len(), unknowns.len());
    let mut b = vec![Rational::zero(); equations.len()];
    for (i, eq) in equations.iter().enumerate() {
        for (monomial, coefficient) in eq.terms() {
            if monomial.is_one() {
                b[i] = -coefficient;
                continue;
            }
            let mut atoms = monomial.iter();
            match (atoms.next(), atoms.next()) {
                (Some((atom, 1)), None) => {
                    let &j = columns.get(&atom)?;
                    a[(i, j)] = coefficient.clone();
                }
                _ => return None,
            }
        }
    }
    Some((a, b))
}

fn solve_linear(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    a: &Matrix,
    b: &[Rational],
    unknowns: &[SymbolId],
) -> Result<Vec<Solution>> {
    let Some(values) = a.solve(b) else {
        debug!("linear system has no unique solution");
        return Ok(Vec::new());
    };

    let replacements: Vec<(SymbolId, Expanded)> = unknowns
        .iter()
        .zip(&values)
        .map(|(&v, value)| (v, Expanded::constant(value.clone())))
        .collect();
    let objective = calc.substitute_all(f, &replacements)?.as_constant().map(|c| c.to_f64());
    let objective = match objective {
        Some(value) => Some(value),
        None => calc.evaluate(f, &bind(unknowns, values.iter().map(Rational::to_f64))).ok(),
    };

    let assignments = unknowns
        .iter()
        .zip(&values)
        .map(|(&v, value)| Assignment {
            variable: calc.arena().symbol_name(v).unwrap_or_default().to_string(),
            text: value.to_string(),
            value: value.to_f64(),
        })
        .collect();
    Ok(vec![Solution {
        assignments,
        objective,
        exact: true,
    }])
}

fn solve_newton(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    gradient: &[Expanded],
    unknowns: &[SymbolId],
    config: &LagrangeConfig,
) -> Result<Vec<Solution>> {
    let mut jacobian = Vec::with_capacity(gradient.len());
    for eq in gradient {
        let mut row = Vec::with_capacity(unknowns.len());
        for &v in unknowns {
            let partial = calc.diff(eq, v)?;
            row.push(calc.to_expr(&partial));
        }
        jacobian.push(row);
    }
    let residuals: Vec<ExprHandle> = gradient.iter().map(|eq| calc.to_expr(eq)).collect();
    let objective = calc.to_expr(f);

    let system = System {
        arena: calc.arena(),
        unknowns: unknowns.to_vec(),
        residuals,
        jacobian,
    };

    let mut found: Vec<Vec<f64>> = Vec::new();
    for index in 0..config.seeds {
        let start = seed(index, unknowns.len());
        let Some(point) = system.solve_from(&start, config.max_iterations, config.tolerance) else {
            continue;
        };
        if !found.iter().any(|known| same_point(known, &point)) {
            found.push(point);
        }
    }
    if found.is_empty() {
        warn!(seeds = config.seeds, "newton iteration did not converge from any seed");
    } else {
        debug!(solutions = found.len(), seeds = config.seeds, "newton solutions");
    }
    found.sort_by(|a, b| {
        a.iter()
            .zip(b)
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let arena = calc.arena();
    Ok(found
        .into_iter()
        .map(|point| {
            let bindings = bind(unknowns, point.iter().copied());
            let assignments = unknowns
                .iter()
                .zip(&point)
                .map(|(&v, &value)| Assignment {
                    variable: arena.symbol_name(v).unwrap_or_default().to_string(),
                    text: numeric_text(value),
                    value,
                })
                .collect();
            Solution {
                assignments,
                objective: planum_core::evaluate(arena, objective, &bindings).ok(),
                exact: false,
            }
        })
        .collect())
}

fn bind(unknowns: &[SymbolId], values: impl Iterator<Item = f64>) -> Bindings {
    let mut bindings = Bindings::new();
    for (&v, value) in unknowns.iter().zip(values) {
        bindings.set(v, value);
    }
    bindings
}

fn same_point(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-6 * (1.0 + x.abs().max(y.abs())))
}
