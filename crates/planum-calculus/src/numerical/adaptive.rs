//! Adaptive subdivision driven by the G7K15 error estimate.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::{debug, warn};

use super::gauss_kronrod::g7k15;
use super::QuadratureConfig;

/// Outcome of an adaptive integration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuadratureResult {
    /// Integral estimate.
    pub value: f64,
    /// Estimated absolute error.
    pub error: f64,
    /// Number of integrand evaluations.
    pub evaluations: usize,
    /// Number of subintervals in the final partition.
    pub intervals: usize,
    /// Whether the tolerance was met before the subdivision limit.
    pub converged: bool,
}

#[derive(Clone, Copy, Debug)]
struct Piece {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Piece {}

impl PartialOrd for Piece {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Piece {
    // Largest error on top of the heap.
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

fn tolerance(config: &QuadratureConfig, value: f64) -> f64 {
    config.abs_tol.max(config.rel_tol * value.abs())
}

/// Integrates `f` over `[a, b]`, bisecting the piece with the largest error
/// until the total error is within tolerance or the subdivision limit is
/// reached.
///
/// Reversed bounds give the negated integral. A non-finite sample makes
/// the estimate non-finite; callers that need to detect evaluation failures
/// should record them from inside `f`.
pub fn adaptive_integrate<F: FnMut(f64) -> f64>(
    mut f: F,
    a: f64,
    b: f64,
    config: &QuadratureConfig,
) -> QuadratureResult {
    let first = g7k15(&mut f, a, b);
    let mut evaluations = first.evaluations;
    let mut value = first.value;
    let mut error = first.error;

    let mut heap = BinaryHeap::new();
    heap.push(Piece {
        a,
        b,
        value: first.value,
        error: first.error,
    });

    let mut subdivisions = 0;
    while error > tolerance(config, value) && subdivisions < config.max_subdivisions {
        if !error.is_finite() {
            break;
        }
        let Some(worst) = heap.pop() else {
            break;
        };
        subdivisions += 1;

        let mid = (worst.a + worst.b) / 2.0;
        let left = g7k15(&mut f, worst.a, mid);
        let right = g7k15(&mut f, mid, worst.b);
        evaluations += left.evaluations + right.evaluations;

        value += left.value + right.value - worst.value;
        error += left.error + right.error - worst.error;

        heap.push(Piece {
            a: worst.a,
            b: mid,
            value: left.value,
            error: left.error,
        });
        heap.push(Piece {
            a: mid,
            b: worst.b,
            value: right.value,
            error: right.error,
        });
    }

    // Re-sum to shed the drift of the running totals.
    let value: f64 = heap.iter().map(|p| p.value).sum();
    let error: f64 = heap.iter().map(|p| p.error).sum();
    let converged = error.is_finite() && error <= tolerance(config, value);
    if converged {
        debug!(value, error, evaluations, intervals = heap.len(), "quadrature converged");
    } else {
        warn!(value, error, evaluations, "quadrature did not reach tolerance");
    }

    QuadratureResult {
        value,
        error,
        evaluations,
        intervals: heap.len(),
        converged,
    }
}
