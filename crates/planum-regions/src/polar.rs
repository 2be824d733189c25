//! Numeric double integrals in polar coordinates.
//!
//! `∫_{θmin}^{θmax} ∫_{rmin(θ)}^{rmax(θ)} f(r, θ) r dr dθ` by nested adaptive
//! G7K15 quadrature. The inner integral is a full adaptive integration for
//! every θ node of the outer rule.

use planum_calculus::numerical::{adaptive_integrate, QuadratureConfig};
use planum_core::{evaluate, parse_constant, parse_expression, Bindings, EvalError, ExprArena, ExprHandle, SymbolTable};
use serde::Serialize;
use tracing::debug;

use crate::error::QuadratureError;
use crate::plot::RegionPlot;

/// The textual inputs of a polar integral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolarProblem {
    /// Integrand `f(r, theta)`.
    pub f: String,
    /// Inner lower bound `r_min(theta)`.
    pub r_min: String,
    /// Inner upper bound `r_max(theta)`.
    pub r_max: String,
    /// Outer lower bound, a constant.
    pub theta_min: String,
    /// Outer upper bound, a constant.
    pub theta_max: String,
}

impl Default for PolarProblem {
    /// `r sin θ` over the cardioid `r ≤ 1 + cos θ`.
    fn default() -> Self {
        Self {
            f: "r*sin(theta)".to_string(),
            r_min: "0".to_string(),
            r_max: "1 + cos(theta)".to_string(),
            theta_min: "0".to_string(),
            theta_max: "2*pi".to_string(),
        }
    }
}

/// Result of a polar integral.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolarReport {
    /// Integral estimate.
    pub value: f64,
    /// Outer error estimate plus the inner estimates weighted by the outer
    /// rule.
    pub error: f64,
    /// Integrand evaluations across all inner integrals.
    pub evaluations: usize,
    /// Whether every quadrature met its tolerance.
    pub converged: bool,
    /// Boundary of the region.
    pub plot: RegionPlot,
}

struct Compiled {
    arena: ExprArena,
    f: ExprHandle,
    r_min: ExprHandle,
    r_max: ExprHandle,
    r: u32,
    theta: u32,
}

impl Compiled {
    fn parse(problem: &PolarProblem) -> Result<(Self, f64, f64), QuadratureError> {
        let mut arena = ExprArena::new();
        let both = SymbolTable::new(["r", "theta"]);
        let angle_only = SymbolTable::new(["theta"]);
        let parse = |arena: &mut ExprArena, component: &'static str, src: &str, table: &SymbolTable| {
            parse_expression(arena, src, table).map_err(|source| QuadratureError::Parse { component, source })
        };
        let f = parse(&mut arena, "f", &problem.f, &both)?;
        let r_min = parse(&mut arena, "r_min", &problem.r_min, &angle_only)?;
        let r_max = parse(&mut arena, "r_max", &problem.r_max, &angle_only)?;

        let mut bound = |component: &'static str, src: &str| -> Result<f64, QuadratureError> {
            let h = parse_constant(&mut arena, src).map_err(|source| QuadratureError::Parse { component, source })?;
            evaluate(&arena, h, &Bindings::new()).map_err(|source| QuadratureError::Eval {
                component,
                theta: f64::NAN,
                source,
            })
        };
        let theta_min = bound("theta_min", &problem.theta_min)?;
        let theta_max = bound("theta_max", &problem.theta_max)?;

        let r = arena.intern_symbol("r");
        let theta = arena.intern_symbol("theta");
        let compiled = Self {
            arena,
            f,
            r_min,
            r_max,
            r,
            theta,
        };
        Ok((compiled, theta_min, theta_max))
    }

    fn radius_bounds(&self, theta: f64) -> Result<(f64, f64), QuadratureError> {
        let bindings = Bindings::new().with(self.theta, theta);
        let eval = |component: &'static str, h: ExprHandle| {
            evaluate(&self.arena, h, &bindings).map_err(|source| QuadratureError::Eval { component, theta, source })
        };
        Ok((eval("r_min", self.r_min)?, eval("r_max", self.r_max)?))
    }

    fn integrand(&self, bindings: &mut Bindings, r: f64, theta: f64) -> Result<f64, EvalError> {
        bindings.set(self.r, r);
        bindings.set(self.theta, theta);
        Ok(evaluate(&self.arena, self.f, bindings)? * r)
    }
}

/// Evaluates a polar double integral.
///
/// # Errors
///
/// Fails on unparsable input, non-constant or non-finite θ bounds, and the
/// first evaluation error or non-finite value met at any node.
pub fn integrate_polar(
    problem: &PolarProblem,
    config: &QuadratureConfig,
    plot_samples: usize,
) -> Result<PolarReport, QuadratureError> {
    let (compiled, theta_min, theta_max) = Compiled::parse(problem)?;
    if !theta_min.is_finite() || !theta_max.is_finite() {
        return Err(QuadratureError::InvalidBounds {
            min: theta_min,
            max: theta_max,
        });
    }

    let mut failure: Option<QuadratureError> = None;
    let mut bindings = Bindings::new();
    let mut evaluations = 0;
    let mut inner_error = 0.0;
    let mut inner_converged = true;

    let outer = adaptive_integrate(
        |theta| {
            if failure.is_some() {
                return f64::NAN;
            }
            let (lo, hi) = match compiled.radius_bounds(theta) {
                Ok(bounds) => bounds,
                Err(err) => {
                    failure = Some(err);
                    return f64::NAN;
                }
            };
            let inner = adaptive_integrate(
                |r| {
                    if failure.is_some() {
                        return f64::NAN;
                    }
                    match compiled.integrand(&mut bindings, r, theta) {
                        Ok(value) => value,
                        Err(source) => {
                            failure = Some(QuadratureError::Eval {
                                component: "f",
                                theta,
                                source,
                            });
                            f64::NAN
                        }
                    }
                },
                lo,
                hi,
                config,
            );
            evaluations += inner.evaluations;
            inner_error += inner.error;
            inner_converged &= inner.converged;
            inner.value
        },
        theta_min,
        theta_max,
        config,
    );

    if let Some(err) = failure {
        return Err(err);
    }

    // Inner errors are summed over the outer nodes; scale by the mean node
    // weight of the outer partition.
    #[allow(clippy::cast_precision_loss)]
    let weight = (theta_max - theta_min).abs() / outer.evaluations.max(1) as f64;
    let error = outer.error + inner_error * weight;
    debug!(value = outer.value, error, evaluations, "polar integral");

    let plot = polar_outline(&compiled, theta_min, theta_max, plot_samples)?;
    Ok(PolarReport {
        value: outer.value,
        error,
        evaluations,
        converged: outer.converged && inner_converged,
        plot,
    })
}

/// Traces `r_max` forward and `r_min` backward.
fn polar_outline(compiled: &Compiled, theta_min: f64, theta_max: f64, samples: usize) -> Result<RegionPlot, QuadratureError> {
    let samples = samples.max(2);
    #[allow(clippy::cast_precision_loss)]
    let angles: Vec<f64> = (0..=samples)
        .map(|i| theta_min + (theta_max - theta_min) * i as f64 / samples as f64)
        .collect();

    let mut outer = Vec::with_capacity(angles.len());
    let mut inner = Vec::with_capacity(angles.len());
    for &theta in &angles {
        let (lo, hi) = compiled.radius_bounds(theta)?;
        let (sin, cos) = theta.sin_cos();
        outer.push([hi * cos, hi * sin]);
        inner.push([lo * cos, lo * sin]);
    }
    inner.reverse();
    outer.extend(inner);
    Ok(RegionPlot::polygon("Polar Region", outer))
}
