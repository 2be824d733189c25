//! Multi-start Newton iteration for square nonlinear systems.

use planum_core::{evaluate, Bindings, ExprArena, ExprHandle, SymbolId};
use tracing::trace;

/// Half-width of the box seeds are drawn from.
pub const SEED_RADIUS: f64 = 5.0;

const PRIMES: [u32; 6] = [2, 3, 5, 7, 11, 13];

/// A system `F(v) = 0` with a symbolic Jacobian, ready for numeric work.
pub(crate) struct System<'a> {
    pub arena: &'a ExprArena,
    pub unknowns: Vec<SymbolId>,
    pub residuals: Vec<ExprHandle>,
    /// Row `i` holds `∂F_i/∂v_j`.
    pub jacobian: Vec<Vec<ExprHandle>>,
}

impl System<'_> {
    fn bind(&self, point: &[f64]) -> Bindings {
        let mut bindings = Bindings::new();
        for (&symbol, &value) in self.unknowns.iter().zip(point) {
            bindings.set(symbol, value);
        }
        bindings
    }

    /// `F(point)`, or `None` if any component is undefined there.
    pub fn residual(&self, point: &[f64]) -> Option<Vec<f64>> {
        let bindings = self.bind(point);
        self.residuals
            .iter()
            .map(|&h| evaluate(self.arena, h, &bindings).ok())
            .collect()
    }

    fn jacobian_at(&self, point: &[f64]) -> Option<Vec<Vec<f64>>> {
        let bindings = self.bind(point);
        self.jacobian
            .iter()
            .map(|row| row.iter().map(|&h| evaluate(self.arena, h, &bindings).ok()).collect())
            .collect()
    }

    /// Damped Newton iteration from `seed`.
    ///
    /// Returns the point once `max |F| <= tolerance`, or `None` when the
    /// Jacobian is singular, the iteration leaves the domain, or the budget
    /// runs out.
    pub fn solve_from(&self, seed: &[f64], max_iterations: usize, tolerance: f64) -> Option<Vec<f64>> {
        let mut point = seed.to_vec();
        let mut f = self.residual(&point)?;
        for iteration in 0..max_iterations {
            let norm = max_norm(&f);
            if norm <= tolerance {
                trace!(iteration, norm, "newton converged");
                return Some(point);
            }

            let step = solve_dense(self.jacobian_at(&point)?, f.iter().map(|v| -v).collect())?;

            // Halve the step until the residual shrinks.
            let mut scale = 1.0;
            let mut accepted = None;
            for _ in 0..20 {
                let candidate: Vec<f64> = point.iter().zip(&step).map(|(p, s)| p + scale * s).collect();
                if let Some(next) = self.residual(&candidate) {
                    if max_norm(&next) < norm {
                        accepted = Some((candidate, next));
                        break;
                    }
                }
                scale *= 0.5;
            }
            let (next_point, next_f) = accepted?;
            point = next_point;
            f = next_f;
        }
        (max_norm(&f) <= tolerance).then_some(point)
    }
}

fn max_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

/// Solves `A x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` for a (numerically) singular matrix.
pub(crate) fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    let scale = a.iter().flatten().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= 1e-14 * scale {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let sum: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - sum) / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// The `index`-th point of the Halton sequence in `[-SEED_RADIUS, SEED_RADIUS]^dim`.
///
/// Index 0 is the origin.
pub(crate) fn seed(index: usize, dim: usize) -> Vec<f64> {
    if index == 0 {
        return vec![0.0; dim];
    }
    (0..dim)
        .map(|d| {
            let base = PRIMES[d % PRIMES.len()];
            SEED_RADIUS * (2.0 * radical_inverse(index, base) - 1.0)
        })
        .collect()
}

fn radical_inverse(mut index: usize, base: u32) -> f64 {
    let base_f = f64::from(base);
    let mut inverse = 1.0 / base_f;
    let mut value = 0.0;
    let base = base as usize;
    while index > 0 {
        #[allow(clippy::cast_precision_loss)]
        let digit = (index % base) as f64;
        value += digit * inverse;
        index /= base;
        inverse /= base_f;
    }
    value
}
