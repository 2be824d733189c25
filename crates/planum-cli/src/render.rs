//! Plain-text rendering of calculator reports.

use std::io::{self, Write};

use planum_matrix::CayleyHamiltonReport;
use planum_optimize::{Classification, ExtremaReport, LagrangeReport, RootMethod, SolveMethod};
use planum_regions::{IntegrationResult, PolarReport};

pub fn greens(result: &IntegrationResult, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Green's theorem over the {}", result.region)?;
    writeln!(out, "  dQ/dx     = {}", result.dq_dx)?;
    writeln!(out, "  dP/dy     = {}", result.dp_dy)?;
    writeln!(out, "  integrand = {}", result.integrand)?;
    writeln!(out)?;
    let width = result.steps.iter().map(|s| s.label.len()).max().unwrap_or(0);
    for step in &result.steps {
        writeln!(out, "  {:<width$}  {}", step.label, step.latex)?;
    }
    writeln!(out)?;
    match result.approx {
        Some(approx) => writeln!(out, "result: {} ~ {approx:.10}", result.exact_text)?,
        None => writeln!(out, "result: {}", result.exact_text)?,
    }
    writeln!(out, "latex:  {}", result.exact_latex)?;
    notes(&result.notes, out)
}

pub fn polar(report: &PolarReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "integral ~ {:.12}", report.value)?;
    writeln!(out, "error estimate {:.3e} after {} evaluations", report.error, report.evaluations)?;
    if !report.converged {
        writeln!(out, "note: tolerance not reached on every subinterval")?;
    }
    Ok(())
}

pub fn cayley_hamilton(report: &CayleyHamiltonReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "A =")?;
    matrix(&report.matrix, out)?;
    writeln!(out, "tr A  = {}", report.trace)?;
    writeln!(out, "det A = {}", report.determinant)?;
    writeln!(out, "p(x)  = {}", report.polynomial)?;
    writeln!(out, "p(A) =")?;
    matrix(&report.p_of_a, out)?;
    let verdict = if report.verified { "holds" } else { "FAILS" };
    writeln!(out, "Cayley-Hamilton {verdict}")
}

fn matrix(rows: &[Vec<String>], out: &mut impl Write) -> io::Result<()> {
    let width = rows.iter().flatten().map(String::len).max().unwrap_or(0);
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>width$}")).collect();
        writeln!(out, "  [ {} ]", cells.join("  "))?;
    }
    Ok(())
}

pub fn extrema(report: &ExtremaReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "f'(x)  = {}", report.first_derivative)?;
    writeln!(out, "f''(x) = {}", report.second_derivative)?;
    let method = match report.method {
        RootMethod::Polynomial => "polynomial roots",
        RootMethod::SignScan => "sign-change scan",
    };
    writeln!(out, "critical points ({method}):")?;
    for point in &report.points {
        let at = point.exact.clone().unwrap_or_else(|| format!("{:.10}", point.x));
        let kind = match point.classification {
            Classification::Minimum => "local minimum",
            Classification::Maximum => "local maximum",
            Classification::Inconclusive => "inconclusive (f'' = 0)",
        };
        match point.value {
            Some(value) => writeln!(out, "  x = {at}: {kind}, f(x) ~ {value:.10}")?,
            None => writeln!(out, "  x = {at}: {kind}")?,
        }
    }
    notes(&report.notes, out)
}

pub fn lagrange(report: &LagrangeReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "L = {}", report.lagrangian)?;
    for equation in &report.equations {
        writeln!(out, "  dL/d{} = {} = 0", equation.variable, equation.text)?;
    }
    let method = match report.method {
        SolveMethod::Linear => "exact elimination",
        SolveMethod::Newton => "Newton iteration",
    };
    writeln!(out, "solutions ({method}):")?;
    for solution in &report.solutions {
        let values: Vec<String> = solution
            .assignments
            .iter()
            .map(|a| format!("{} = {}", a.variable, a.text))
            .collect();
        match solution.objective {
            Some(f) => writeln!(out, "  {}  (f ~ {f:.10})", values.join(", "))?,
            None => writeln!(out, "  {}", values.join(", "))?,
        }
    }
    if let Some(note) = &report.note {
        writeln!(out, "note: {note}")?;
    }
    Ok(())
}

fn notes(notes: &[String], out: &mut impl Write) -> io::Result<()> {
    for note in notes {
        writeln!(out, "note: {note}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use planum_core::Rational;
    use planum_optimize::{find_extrema, solve_lagrange, Dimension, ExtremaConfig, LagrangeConfig};
    use planum_regions::{evaluate, GreenOptions, Region};

    fn render<T>(report: &T, f: impl Fn(&T, &mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(report, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_greens_text() {
        let q = Rational::from_integer;
        let region = Region::rectangle(q(0), q(2), q(0), q(3)).unwrap();
        let result = evaluate("x**2", "x*y", &region, &GreenOptions::default()).unwrap();
        let text = render(&result, |r, out| greens(r, out));
        assert!(text.starts_with("Green's theorem over the rectangle"));
        assert!(text.contains("result: 9 ~ 9.0000000000"));
    }

    #[test]
    fn test_greens_text_without_float() {
        let q = Rational::from_integer;
        let region = Region::rectangle(q(0), q(1), q(0), q(1)).unwrap();
        let result = evaluate("0", "x*exp(1000)", &region, &GreenOptions::default()).unwrap();
        let text = render(&result, |r, out| greens(r, out));
        assert!(text.contains("result: exp(1000)\n"));
        assert!(text.contains("note: no floating-point value"));
    }

    #[test]
    fn test_cayley_text() {
        let report = planum_matrix::verify_text("2 1\n1 2").unwrap();
        let text = render(&report, |r, out| cayley_hamilton(r, out));
        assert!(text.contains("p(x)  = x**2 - 4*x + 3"));
        assert!(text.contains("[ 2  1 ]"));
        assert!(text.ends_with("Cayley-Hamilton holds\n"));
    }

    #[test]
    fn test_extrema_text() {
        let report = find_extrema("x**3 - 3*x + 2", &ExtremaConfig::default()).unwrap();
        let text = render(&report, |r, out| extrema(r, out));
        assert!(text.contains("critical points (polynomial roots):"));
        assert!(text.contains("x = -1: local maximum"));
        assert!(text.contains("x = 1: local minimum"));
    }

    #[test]
    fn test_lagrange_text() {
        let report = solve_lagrange("x**2 + y**2", "x + y - 1", Dimension::Two, &LagrangeConfig::default()).unwrap();
        let text = render(&report, |r, out| lagrange(r, out));
        assert!(text.contains("x = 1/2, y = 1/2, lam = -1"));
        assert!(!text.contains("note:"));
    }
}
