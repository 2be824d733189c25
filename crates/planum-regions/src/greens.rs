//! Green's theorem over a rectangle, a disk or a right triangle.
//!
//! ```text
//! ∮_C (P dx + Q dy) = ∬_R (∂Q/∂x - ∂P/∂y) dA
//! ```
//!
//! [`evaluate`] parses the field, computes the integrand symbolically and
//! integrates it exactly over the region as an iterated integral, recording
//! every intermediate result as a LaTeX step.
//!
//! Before an inner integral is taken, the integrand is checked for poles
//! along slices of the outer variable, so a singular line crossing the
//! region is reported instead of integrated through.

use planum_calculus::{Calculus, Expanded};
use planum_core::{Bindings, ExprArena, Func, Rational, SymbolId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GreenError;
use crate::field::{Integrand, VectorField};
use crate::plot::RegionPlot;
use crate::region::Region;

/// The statement of the theorem, shown above every derivation.
pub const THEOREM_LATEX: &str = r"\oint_C (P\,dx + Q\,dy) = \iint_R \left(\frac{\partial Q}{\partial x} - \frac{\partial P}{\partial y}\right) dA";

/// Values of the outer variable at which the inner integral is checked.
const SLICES: u32 = 32;

const BOUNDARY_NOTE: &str = "disk: x = R cos(theta), y = R sin(theta) with r fixed at the radius, \
integrated over theta only; this is not the area integral over the disk (use disk mode `area` for that)";

/// Which variable a rectangle integral eliminates first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationOrder {
    /// `∫ ∫ f dy dx`.
    #[default]
    YThenX,
    /// `∫ ∫ f dx dy`.
    XThenY,
}

/// How the disk integral is set up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiskMode {
    /// Substitute at the boundary radius and integrate over θ only.
    #[default]
    Boundary,
    /// Full polar double integral over `0 ≤ r ≤ R`, `0 ≤ θ ≤ 2π`.
    Area,
}

/// Options of the `[greens]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenOptions {
    /// Rectangle integration order.
    pub order: IntegrationOrder,
    /// Disk semantics.
    pub disk_mode: DiskMode,
    /// Points on the sampled circle outline.
    pub plot_samples: usize,
}

impl Default for GreenOptions {
    fn default() -> Self {
        Self {
            order: IntegrationOrder::default(),
            disk_mode: DiskMode::default(),
            plot_samples: 300,
        }
    }
}

/// One line of a derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// What was done.
    pub label: String,
    /// The resulting expression.
    pub latex: String,
}

impl Step {
    fn new(label: impl Into<String>, latex: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            latex: latex.into(),
        }
    }
}

/// Everything shown for one Green's theorem computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationResult {
    /// Human-readable description of the region.
    pub region: String,
    /// `∂Q/∂x` in LaTeX.
    pub dq_dx: String,
    /// `∂P/∂y` in LaTeX.
    pub dp_dy: String,
    /// The integrand in LaTeX.
    pub integrand: String,
    /// The exact value in LaTeX.
    pub exact_latex: String,
    /// The exact value as plain text.
    pub exact_text: String,
    /// Floating-point value of the exact result, if it is finite.
    pub approx: Option<f64>,
    /// The derivation, in order.
    pub steps: Vec<Step>,
    /// Caveats about the computation.
    pub notes: Vec<String>,
    /// Outline of the region.
    pub plot: RegionPlot,
}

/// Runs the whole pipeline in a fresh arena.
///
/// # Errors
///
/// - [`GreenError::Parse`] if `p` or `q` is not a valid formula in `x`, `y`
/// - [`GreenError::Shape`] if the region parameters are invalid
/// - [`GreenError::Integration`] if an integral has no supported closed form,
///   diverges or leaves the reals on the region
pub fn evaluate(p: &str, q: &str, region: &Region, options: &GreenOptions) -> Result<IntegrationResult, GreenError> {
    region.validate()?;
    let mut arena = ExprArena::new();
    let field = VectorField::parse(&mut arena, p, q)?;
    let mut calc = Calculus::new(&mut arena);
    let integrand = Integrand::of(&mut calc, &field)?;
    debug!(%region, "integrating");

    let mut notes = Vec::new();
    let mut steps = vec![
        Step::new("Green's theorem", THEOREM_LATEX),
        Step::new("dQ/dx", calc.latex(&integrand.dq_dx)),
        Step::new("dP/dy", calc.latex(&integrand.dp_dy)),
        Step::new("Integrand", calc.latex(&integrand.value)),
    ];

    let f = &integrand.value;
    let (value, plot) = match region {
        Region::Rectangle { x1, x2, y1, y2 } => {
            let value = rectangle(&mut calc, f, [x1, x2, y1, y2], options.order, &mut steps)?;
            let plot = RegionPlot::rectangle(x1.to_f64(), x2.to_f64(), y1.to_f64(), y2.to_f64());
            (value, plot)
        }
        Region::Disk { radius } => {
            let value = match options.disk_mode {
                DiskMode::Boundary => {
                    warn!("disk integral uses boundary semantics");
                    notes.push(BOUNDARY_NOTE.to_string());
                    disk_boundary(&mut calc, f, radius, &mut steps)?
                }
                DiskMode::Area => disk_area(&mut calc, f, radius, &mut steps)?,
            };
            (value, RegionPlot::circle(radius.to_f64(), options.plot_samples))
        }
        Region::RightTriangle { a, b } => {
            let value = triangle(&mut calc, f, a, b, &mut steps)?;
            (value, RegionPlot::triangle(a.to_f64(), b.to_f64()))
        }
    };

    let exact_latex = calc.latex(&value);
    let exact_text = calc.text(&value);
    let handle = calc.to_expr(&value);
    let approx = match planum_core::evaluate(calc.arena(), handle, &Bindings::new()) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "no floating-point value");
            notes.push(format!("no floating-point value for {exact_text}: {err}"));
            None
        }
    };
    steps.push(Step::new("Result", exact_latex.clone()));
    debug!(%exact_text, ?approx, "green integral");

    Ok(IntegrationResult {
        region: region.to_string(),
        dq_dx: calc.latex(&integrand.dq_dx),
        dp_dy: calc.latex(&integrand.dp_dy),
        integrand: calc.latex(&integrand.value),
        exact_latex,
        exact_text,
        approx,
        steps,
        notes,
        plot,
    })
}

fn constant_latex(calc: &mut Calculus<'_>, value: &Rational) -> String {
    calc.latex(&Expanded::constant(value.clone()))
}

/// Checks the inner integral of `f` over `inner` for every slice of the
/// open outer range, taken at the midpoints of [`SLICES`] equal parts.
fn check_slices(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    (inner, lower, upper): (SymbolId, &Expanded, &Expanded),
    (outer, from, to): (SymbolId, f64, f64),
) -> Result<(), GreenError> {
    for i in 0..SLICES {
        let t = from + (to - from) * (f64::from(i) + 0.5) / f64::from(SLICES);
        calc.check_interval(f, inner, lower, upper, &Bindings::new().with(outer, t))?;
    }
    Ok(())
}

pub(crate) fn rectangle(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    [x1, x2, y1, y2]: [&Rational; 4],
    order: IntegrationOrder,
    steps: &mut Vec<Step>,
) -> Result<Expanded, GreenError> {
    let (inner, outer) = match order {
        IntegrationOrder::YThenX => (("y", y1, y2), ("x", x1, x2)),
        IntegrationOrder::XThenY => (("x", x1, x2), ("y", y1, y2)),
    };
    let (inner_name, inner_lo, inner_hi) = inner;
    let (outer_name, outer_lo, outer_hi) = outer;

    let integrand = calc.latex(f);
    let [ol, oh, il, ih] = [outer_lo, outer_hi, inner_lo, inner_hi].map(|v| constant_latex(calc, v));
    steps.push(Step::new(
        "Set up the iterated integral",
        format!(
            r"\int_{{{ol}}}^{{{oh}}} \int_{{{il}}}^{{{ih}}} \left({integrand}\right) \, d{inner_name} \, d{outer_name}"
        ),
    ));

    let inner_var = calc.variable(inner_name);
    let outer_var = calc.variable(outer_name);
    let (lo, hi) = (Expanded::constant(inner_lo.clone()), Expanded::constant(inner_hi.clone()));
    if outer_lo != outer_hi {
        check_slices(calc, f, (inner_var, &lo, &hi), (outer_var, outer_lo.to_f64(), outer_hi.to_f64()))?;
    }
    let step1 = calc.definite(f, inner_var, &lo, &hi)?;
    steps.push(Step::new(format!("Integrate with respect to {inner_name}"), calc.latex(&step1)));

    let step2 = calc.definite(
        &step1,
        outer_var,
        &Expanded::constant(outer_lo.clone()),
        &Expanded::constant(outer_hi.clone()),
    )?;
    steps.push(Step::new(
        format!("Integrate the result with respect to {outer_name}"),
        calc.latex(&step2),
    ));
    Ok(step2)
}

/// `x = ρ cos θ`, `y = ρ sin θ` and the Jacobian factor `ρ`.
fn to_polar(calc: &mut Calculus<'_>, f: &Expanded, rho: &Expanded) -> Result<Expanded, GreenError> {
    let x = calc.variable("x");
    let y = calc.variable("y");
    let theta_var = calc.variable("theta");
    let theta = calc.symbol(theta_var);
    let cos = calc.apply(Func::Cos, &theta)?;
    let sin = calc.apply(Func::Sin, &theta)?;
    let xs = calc.mul(rho, &cos)?;
    let ys = calc.mul(rho, &sin)?;
    let substituted = calc.substitute_all(f, &[(x, xs), (y, ys)])?;
    Ok(calc.mul(&substituted, rho)?)
}

fn full_turn(calc: &mut Calculus<'_>) -> Expanded {
    calc.pi().scale(&Rational::from_integer(2))
}

fn disk_boundary(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    radius: &Rational,
    steps: &mut Vec<Step>,
) -> Result<Expanded, GreenError> {
    let rho = Expanded::constant(radius.clone());
    let polar = to_polar(calc, f, &rho)?;
    let r = calc.text(&rho);
    steps.push(Step::new(
        format!("Substitute x = {r} cos(theta), y = {r} sin(theta) and multiply by the Jacobian {r}"),
        calc.latex(&polar),
    ));

    let theta = calc.variable("theta");
    let turn = full_turn(calc);
    let value = calc.definite(&polar, theta, &Expanded::zero(), &turn)?;
    steps.push(Step::new("Integrate over theta from 0 to 2*pi", calc.latex(&value)));
    Ok(value)
}

fn disk_area(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    radius: &Rational,
    steps: &mut Vec<Step>,
) -> Result<Expanded, GreenError> {
    let r_var = calc.variable("r");
    let rho = calc.symbol(r_var);
    let polar = to_polar(calc, f, &rho)?;
    let big_r = constant_latex(calc, radius);
    let integrand = calc.latex(&polar);
    steps.push(Step::new(
        "Substitute x = r cos(theta), y = r sin(theta) and multiply by the Jacobian r",
        format!(r"\int_{{0}}^{{{big_r}}} \int_{{0}}^{{2\pi}} \left({integrand}\right) \, d\theta \, dr"),
    ));

    let theta = calc.variable("theta");
    let turn = full_turn(calc);
    check_slices(calc, &polar, (theta, &Expanded::zero(), &turn), (r_var, 0.0, radius.to_f64()))?;
    let inner = calc.definite(&polar, theta, &Expanded::zero(), &turn)?;
    steps.push(Step::new("Integrate with respect to theta", calc.latex(&inner)));

    let value = calc.definite(&inner, r_var, &Expanded::zero(), &Expanded::constant(radius.clone()))?;
    steps.push(Step::new("Integrate the result with respect to r", calc.latex(&value)));
    Ok(value)
}

fn triangle(
    calc: &mut Calculus<'_>,
    f: &Expanded,
    a: &Rational,
    b: &Rational,
    steps: &mut Vec<Step>,
) -> Result<Expanded, GreenError> {
    let x = calc.variable("x");
    let y = calc.variable("y");

    // b (1 - x/a)
    let slope = b / a;
    let hypotenuse = Expanded::constant(b.clone()).sub(&calc.symbol(x).scale(&slope));

    let integrand = calc.latex(f);
    let [al, top] = [calc.latex(&Expanded::constant(a.clone())), calc.latex(&hypotenuse)];
    steps.push(Step::new(
        "Set up the iterated integral",
        format!(r"\int_{{0}}^{{{al}}} \int_{{0}}^{{{top}}} \left({integrand}\right) \, dy \, dx"),
    ));

    check_slices(calc, f, (y, &Expanded::zero(), &hypotenuse), (x, 0.0, a.to_f64()))?;
    let inner = calc.definite(f, y, &Expanded::zero(), &hypotenuse)?;
    steps.push(Step::new("Integrate with respect to y", calc.latex(&inner)));

    let value = calc.definite(&inner, x, &Expanded::zero(), &Expanded::constant(a.clone()))?;
    steps.push(Step::new("Integrate the result with respect to x", calc.latex(&value)));
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_calculus::IntegrationError;
    use std::f64::consts::PI;

    fn r(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    fn rect(x1: i64, x2: i64, y1: i64, y2: i64) -> Region {
        Region::rectangle(r(x1), r(x2), r(y1), r(y2)).unwrap()
    }

    #[test]
    fn test_rectangle_default() {
        let result = evaluate("x**2", "x*y", &rect(0, 2, 0, 3), &GreenOptions::default()).unwrap();
        assert_eq!(result.integrand, "y");
        assert_eq!(result.exact_text, "9");
        assert!((result.approx.unwrap() - 9.0).abs() < 1e-12);
        assert!(result.notes.is_empty());
        assert_eq!(result.plot.outline.len(), 5);
    }

    #[test]
    fn test_rectangle_steps() {
        let result = evaluate("x**2", "x*y", &rect(0, 2, 0, 3), &GreenOptions::default()).unwrap();
        let labels: Vec<_> = result.steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Green's theorem",
                "dQ/dx",
                "dP/dy",
                "Integrand",
                "Set up the iterated integral",
                "Integrate with respect to y",
                "Integrate the result with respect to x",
                "Result",
            ]
        );
        // ∫_0^3 y dy = 9/2
        assert_eq!(result.steps[5].latex, r"\frac{9}{2}");
    }

    #[test]
    fn test_rectangle_order_agrees() {
        let x_first = GreenOptions {
            order: IntegrationOrder::XThenY,
            ..GreenOptions::default()
        };
        let region = rect(-1, 2, 1, 4);
        let a = evaluate("x*y**2 + sin(y)", "x**2*exp(y)", &region, &GreenOptions::default()).unwrap();
        let b = evaluate("x*y**2 + sin(y)", "x**2*exp(y)", &region, &x_first).unwrap();
        assert!((a.approx.unwrap() - b.approx.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_rectangle() {
        let result = evaluate("x**2", "x*y", &rect(1, 1, 0, 3), &GreenOptions::default()).unwrap();
        assert_eq!(result.exact_text, "0");
        assert_eq!(result.approx, Some(0.0));
    }

    #[test]
    fn test_degenerate_rectangle_on_a_pole() {
        // The integrand 1/x² is singular along the whole edge x = 0.
        for order in [IntegrationOrder::YThenX, IntegrationOrder::XThenY] {
            let options = GreenOptions {
                order,
                ..GreenOptions::default()
            };
            let result = evaluate("0", "-1/x", &rect(0, 0, 0, 1), &options).unwrap();
            assert_eq!(result.exact_text, "0");
        }
    }

    #[test]
    fn test_pole_inside_rectangle() {
        let options = GreenOptions::default();
        for (q, region) in [("-1/x", rect(-1, 1, 0, 1)), ("-1/(x - 1)", rect(0, 2, 0, 1))] {
            let err = evaluate("0", q, &region, &options).unwrap_err();
            assert!(
                matches!(err, GreenError::Integration(IntegrationError::Divergent { .. })),
                "{q}: {err}"
            );
        }
    }

    #[test]
    fn test_pole_on_rectangle_edge() {
        let err = evaluate("0", "-1/x", &rect(0, 1, 0, 1), &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Integration(IntegrationError::Divergent { .. })));
    }

    #[test]
    fn test_pole_line_across_region() {
        // -dP/dy = -1/(y - x) is singular on the diagonal y = x.
        let err = evaluate("log(y - x)", "0", &rect(0, 1, 0, 1), &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Integration(IntegrationError::Divergent { .. })));

        let region = Region::right_triangle(r(2), r(2)).unwrap();
        let err = evaluate("log(y - x)", "0", &region, &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Integration(IntegrationError::Divergent { .. })));
    }

    #[test]
    fn test_overflowing_value_keeps_exact_result() {
        let result = evaluate("0", "x*exp(1000)", &rect(0, 1, 0, 1), &GreenOptions::default()).unwrap();
        assert_eq!(result.exact_text, "exp(1000)");
        assert_eq!(result.approx, None);
        assert_eq!(result.notes.len(), 1);
        assert!(result.notes[0].contains("exp(1000)"));
    }

    #[test]
    fn test_step_labels_are_plain_text() {
        let area = GreenOptions {
            disk_mode: DiskMode::Area,
            ..GreenOptions::default()
        };
        let disk = Region::disk(r(2)).unwrap();
        let runs = [
            evaluate("-y", "x", &disk, &GreenOptions::default()).unwrap(),
            evaluate("-y", "x", &disk, &area).unwrap(),
            evaluate("x**2", "x*y", &rect(0, 2, 0, 3), &GreenOptions::default()).unwrap(),
        ];
        for result in &runs {
            for step in &result.steps {
                assert!(!step.label.contains('\\'), "{}", step.label);
            }
        }
        assert_eq!(
            runs[0].steps[4].label,
            "Substitute x = 2 cos(theta), y = 2 sin(theta) and multiply by the Jacobian 2"
        );
    }

    #[test]
    fn test_triangle() {
        let region = Region::right_triangle(r(3), r(4)).unwrap();
        let result = evaluate("x**2", "x*y", &region, &GreenOptions::default()).unwrap();
        assert_eq!(result.exact_text, "8");
        assert_eq!(result.exact_latex, "8");
    }

    #[test]
    fn test_disk_modes() {
        let region = Region::disk(r(1)).unwrap();
        let boundary = evaluate("-y", "x", &region, &GreenOptions::default()).unwrap();
        assert_eq!(boundary.exact_text, "4*pi");
        assert!((boundary.approx.unwrap() - 4.0 * PI).abs() < 1e-12);
        assert_eq!(boundary.notes.len(), 1);
        assert_eq!(boundary.plot.outline.len(), 301);

        let area = GreenOptions {
            disk_mode: DiskMode::Area,
            ..GreenOptions::default()
        };
        let result = evaluate("-y", "x", &region, &area).unwrap();
        assert_eq!(result.exact_text, "2*pi");
        assert!(result.notes.is_empty());
    }

    #[test]
    fn test_disk_polynomial_area() {
        // ∬ (x² + y²) over the unit disk, from P = -y³/3, Q = x³/3.
        let area = GreenOptions {
            disk_mode: DiskMode::Area,
            ..GreenOptions::default()
        };
        let region = Region::disk(r(1)).unwrap();
        let result = evaluate("-y**3/3", "x**3/3", &region, &area).unwrap();
        assert!((result.approx.unwrap() - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_error() {
        let err = evaluate("x +* y", "x*y", &rect(0, 2, 0, 3), &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Parse { component: "P", .. }));
    }

    #[test]
    fn test_invalid_region_is_rejected() {
        let region = Region::Disk { radius: r(-1) };
        let err = evaluate("x", "y", &region, &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Shape(_)));
    }

    #[test]
    fn test_no_closed_form() {
        let err = evaluate("0", "exp(x**2)", &rect(0, 1, 0, 1), &GreenOptions::default()).unwrap_err();
        assert!(matches!(err, GreenError::Integration(_)));
    }

    #[test]
    fn test_runs_are_identical() {
        let region = Region::right_triangle(r(3), r(4)).unwrap();
        let a = evaluate("x**2*y", "sin(x)", &region, &GreenOptions::default()).unwrap();
        let b = evaluate("x**2*y", "sin(x)", &region, &GreenOptions::default()).unwrap();
        assert_eq!(a, b);
    }
}
