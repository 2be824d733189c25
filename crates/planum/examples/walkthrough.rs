//! A tour of the calculators.
//!
//! Run with: cargo run -p planum --example walkthrough

use planum::calculus::QuadratureConfig;
use planum::optimize::Classification;
use planum::prelude::*;
use planum::regions::DiskMode;

fn q(n: i64) -> Rational {
    Rational::from_integer(n)
}

fn main() {
    println!("== Green's theorem ==\n");
    greens_examples();

    println!("\n== Polar double integrals ==\n");
    polar_examples();

    println!("\n== Cayley-Hamilton ==\n");
    cayley_examples();

    println!("\n== Extrema ==\n");
    extrema_examples();

    println!("\n== Lagrange multipliers ==\n");
    lagrange_examples();
}

fn greens_examples() {
    let cases = [
        ("x**2", "x*y", Region::rectangle(q(0), q(2), q(0), q(3))),
        ("x**2", "x*y", Region::right_triangle(q(3), q(4))),
        ("-y", "x", Region::disk(q(2))),
    ];
    for (p, q_field, region) in cases {
        let region = region.expect("valid region");
        match evaluate(p, q_field, &region, &GreenOptions::default()) {
            Ok(result) => {
                println!("P = {p}, Q = {q_field} over {region}");
                for step in &result.steps {
                    println!("  {:<28} {}", step.label, step.latex);
                }
                match result.approx {
                    Some(approx) => println!("  = {} ≈ {approx:.6}", result.exact_text),
                    None => println!("  = {}", result.exact_text),
                }
                for note in &result.notes {
                    println!("  note: {note}");
                }
            }
            Err(e) => println!("P = {p}, Q = {q_field}: {e}"),
        }
    }

    let disk = Region::disk(q(2)).expect("valid region");
    let area = GreenOptions {
        disk_mode: DiskMode::Area,
        ..GreenOptions::default()
    };
    if let Ok(result) = evaluate("-y", "x", &disk, &area) {
        println!("Same disk as an area integral: {}", result.exact_text);
    }
}

fn polar_examples() {
    let config = QuadratureConfig::default();
    let problems = [
        PolarProblem::default(),
        PolarProblem {
            f: "1".to_string(),
            r_max: "1 + cos(theta)".to_string(),
            ..PolarProblem::default()
        },
    ];
    for problem in &problems {
        match integrate_polar(problem, &config, 200) {
            Ok(report) => println!(
                "f = {} over r <= {}: {:.10} (error {:.1e}, {} evaluations)",
                problem.f, problem.r_max, report.value, report.error, report.evaluations
            ),
            Err(e) => println!("f = {}: {e}", problem.f),
        }
    }
}

fn cayley_examples() {
    for text in ["2 1\n1 2", "1 2 0\n0 1 3\n4 0 1", "1/2 1/3\n1/4 1/5"] {
        match verify_text(text) {
            Ok(report) => println!(
                "{}\n  p(x) = {}\n  p(A) = 0: {}",
                text.replace('\n', "; "),
                report.polynomial,
                report.verified
            ),
            Err(e) => println!("{text}: {e}"),
        }
    }
}

fn extrema_examples() {
    let config = ExtremaConfig::default();
    for f in ["x**3 - 3*x + 2", "x**3 - 6*x", "x**4", "sin(x)*exp(-x**2/10)"] {
        let Ok(report) = find_extrema(f, &config) else {
            continue;
        };
        println!("f(x) = {f}, f'(x) = {}", report.first_derivative);
        for point in &report.points {
            let kind = match point.classification {
                Classification::Minimum => "minimum",
                Classification::Maximum => "maximum",
                Classification::Inconclusive => "inconclusive",
            };
            let at = point.exact.clone().unwrap_or_else(|| format!("{:.6}", point.x));
            println!("  x = {at}: {kind}");
        }
    }
}

fn lagrange_examples() {
    let config = LagrangeConfig::default();
    let cases = [
        ("x**2 + y**2", "x + y - 1", Dimension::Two),
        ("x + y", "x**2 + y**2 - 1", Dimension::Two),
        ("x*y*z", "x + y + z - 3", Dimension::Three),
    ];
    for (f, g, dimension) in cases {
        let Ok(report) = solve_lagrange(f, g, dimension, &config) else {
            continue;
        };
        println!("f = {f}, g = {g}: L = {}", report.lagrangian);
        for solution in &report.solutions {
            let values: Vec<String> = solution
                .assignments
                .iter()
                .map(|a| format!("{} = {}", a.variable, a.text))
                .collect();
            println!("  {}", values.join(", "));
        }
        if let Some(note) = &report.note {
            println!("  {note}");
        }
    }
}
