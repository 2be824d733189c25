//! Characteristic polynomials and the Cayley–Hamilton check.

use num_traits::{One, Zero};
use planum_calculus::{Calculus, Expanded, Monomial};
use planum_core::{ExprArena, Rational};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::MatrixError;
use crate::matrix::Matrix;
use crate::parse::parse_matrix;

/// Coefficients of `det(xI − A)`, highest degree first.
///
/// Uses the Faddeev–LeVerrier recurrence
/// `M_k = A M_{k−1} + c_{n−k+1} I`, `c_{n−k} = −tr(A M_k) / k`,
/// which only divides by the integers `1..=n` and so stays exact.
///
/// # Panics
///
/// Panics if `a` is not square.
#[must_use]
pub fn characteristic_polynomial(a: &Matrix) -> Vec<Rational> {
    assert!(a.is_square());
    let n = a.num_rows();
    let mut coefficients = Vec::with_capacity(n + 1);
    coefficients.push(Rational::one());

    let mut m = Matrix::zeros(n, n);
    for k in 1..=n {
        // M_k = A M_{k-1} + c_{n-k+1} I
        let mut next = a.mm(&m);
        next.add_diagonal(&coefficients[k - 1]);
        let am = a.mm(&next);
        let k_rational = Rational::from(i64::try_from(k).unwrap_or(i64::MAX));
        let c = -(&am.trace() / &k_rational);
        coefficients.push(c);
        m = next;
    }
    coefficients
}

/// `p(A)` by Horner's rule, with `coefficients` highest degree first.
///
/// # Panics
///
/// Panics if `a` is not square.
#[must_use]
pub fn evaluate_polynomial(coefficients: &[Rational], a: &Matrix) -> Matrix {
    assert!(a.is_square());
    let n = a.num_rows();
    let mut result = Matrix::zeros(n, n);
    for c in coefficients {
        result = result.mm(a);
        result.add_diagonal(c);
    }
    result
}

/// The outcome of a Cayley–Hamilton check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CayleyHamiltonReport {
    /// The input matrix, entry by entry.
    pub matrix: Vec<Vec<String>>,
    /// `tr A`.
    pub trace: String,
    /// `det A`.
    pub determinant: String,
    /// Coefficients of `p`, highest degree first.
    pub coefficients: Vec<String>,
    /// `p(x)` as plain text.
    pub polynomial: String,
    /// `p(x) = …` as LaTeX.
    pub polynomial_latex: String,
    /// `p(A)`.
    pub p_of_a: Vec<Vec<String>>,
    /// Whether `p(A)` is exactly zero.
    pub verified: bool,
}

/// Checks the Cayley–Hamilton theorem for an already parsed matrix.
///
/// # Errors
///
/// Returns [`MatrixError::NotSquare`] for a rectangular matrix and
/// [`MatrixError::Empty`] for a matrix without entries.
pub fn verify(a: &Matrix) -> Result<CayleyHamiltonReport, MatrixError> {
    if !a.is_square() {
        return Err(MatrixError::NotSquare {
            rows: a.num_rows(),
            cols: a.num_cols(),
        });
    }
    if a.num_rows() == 0 {
        return Err(MatrixError::Empty);
    }

    let coefficients = characteristic_polynomial(a);
    let p_of_a = evaluate_polynomial(&coefficients, a);
    let verified = p_of_a.is_zero();
    if verified {
        debug!(size = a.num_rows(), "cayley-hamilton verified");
    } else {
        warn!(size = a.num_rows(), "p(A) is not zero");
    }

    let mut arena = ExprArena::new();
    let mut calc = Calculus::new(&mut arena);
    let x = calc.variable("x");
    let atom = calc.symbol_atom(x);
    let mut polynomial = Expanded::zero();
    let degree = coefficients.len() - 1;
    for (i, c) in coefficients.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        let power = i64::try_from(degree - i).unwrap_or(i64::MAX);
        let monomial = if power == 0 { Monomial::one() } else { Monomial::atom(atom, power) };
        polynomial.add_term(monomial, c.clone());
    }

    Ok(CayleyHamiltonReport {
        matrix: entries(a),
        trace: a.trace().to_string(),
        determinant: a.det().to_string(),
        coefficients: coefficients.iter().map(ToString::to_string).collect(),
        polynomial: calc.text(&polynomial),
        polynomial_latex: format!("p(x) = {}", calc.latex(&polynomial)),
        p_of_a: entries(&p_of_a),
        verified,
    })
}

/// Parses `text` with [`parse_matrix`] and checks it.
///
/// # Errors
///
/// See [`parse_matrix`].
pub fn verify_text(text: &str) -> Result<CayleyHamiltonReport, MatrixError> {
    verify(&parse_matrix(text)?)
}

fn entries(m: &Matrix) -> Vec<Vec<String>> {
    m.rows().map(|row| row.iter().map(ToString::to_string).collect()).collect()
}
