//! Dense matrices over exact rationals.

use std::fmt;
use std::ops::{Index, IndexMut};

use num_traits::{One, Zero};
use planum_core::Rational;

/// A dense row-major matrix of rationals.
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    data: Vec<Rational>,
    num_rows: usize,
    num_cols: usize,
}

impl Matrix {
    /// The zero matrix.
    #[must_use]
    pub fn zeros(num_rows: usize, num_cols: usize) -> Self {
        Self {
            data: vec![Rational::zero(); num_rows * num_cols],
            num_rows,
            num_cols,
        }
    }

    /// The `n × n` identity.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = Rational::one();
        }
        m
    }

    /// Builds a matrix from rows of equal length, or `None` if they are
    /// ragged.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Rational>>) -> Option<Self> {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != num_cols) {
            return None;
        }
        Some(Self {
            data: rows.into_iter().flatten().collect(),
            num_rows,
            num_cols,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Whether the matrix is square.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.num_rows == self.num_cols
    }

    /// Whether every entry is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(Zero::is_zero)
    }

    /// The entry at `(row, col)`, if in range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&Rational> {
        if row < self.num_rows && col < self.num_cols {
            Some(&self[(row, col)])
        } else {
            None
        }
    }

    /// The entries of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[Rational] {
        &self.data[row * self.num_cols..(row + 1) * self.num_cols]
    }

    /// Iterates over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Rational]> {
        (0..self.num_rows).map(move |r| self.row(r))
    }

    /// Matrix-vector product.
    ///
    /// # Panics
    ///
    /// Panics if `x.len()` differs from the column count.
    #[must_use]
    pub fn mv(&self, x: &[Rational]) -> Vec<Rational> {
        assert_eq!(x.len(), self.num_cols);
        self.rows()
            .map(|row| {
                row.iter()
                    .zip(x)
                    .fold(Rational::zero(), |acc, (a, b)| acc + &(a * b))
            })
            .collect()
    }

    /// Matrix product.
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions differ.
    #[must_use]
    pub fn mm(&self, other: &Self) -> Self {
        assert_eq!(self.num_cols, other.num_rows);
        let mut result = Self::zeros(self.num_rows, other.num_cols);
        for i in 0..self.num_rows {
            for k in 0..self.num_cols {
                let a = &self[(i, k)];
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.num_cols {
                    let term = a * &other[(k, j)];
                    result[(i, j)] = &result[(i, j)] + &term;
                }
            }
        }
        result
    }

    /// Multiplies every entry by `c`.
    #[must_use]
    pub fn scale(&self, c: &Rational) -> Self {
        Self {
            data: self.data.iter().map(|a| a * c).collect(),
            num_rows: self.num_rows,
            num_cols: self.num_cols,
        }
    }

    /// Adds `c` to every diagonal entry.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn add_diagonal(&mut self, c: &Rational) {
        assert!(self.is_square());
        for i in 0..self.num_rows {
            self[(i, i)] = &self[(i, i)] + c;
        }
    }

    /// Sum of the diagonal.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    #[must_use]
    pub fn trace(&self) -> Rational {
        assert!(self.is_square());
        (0..self.num_rows).fold(Rational::zero(), |acc, i| acc + &self[(i, i)])
    }

    /// Swaps two rows.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.num_cols {
            self.data.swap(i * self.num_cols + k, j * self.num_cols + k);
        }
    }

    /// Multiplies row `i` by `c`.
    pub fn scale_row(&mut self, i: usize, c: &Rational) {
        for k in 0..self.num_cols {
            self[(i, k)] = &self[(i, k)] * c;
        }
    }

    /// Adds `c` times row `src` to row `dst`.
    pub fn add_scaled_row(&mut self, dst: usize, src: usize, c: &Rational) {
        for k in 0..self.num_cols {
            let term = &self[(src, k)] * c;
            self[(dst, k)] = &self[(dst, k)] + &term;
        }
    }

    /// Reduced row echelon form and the rank.
    #[must_use]
    pub fn rref(&self) -> (Self, usize) {
        let mut m = self.clone();
        let mut pivot_row = 0;
        for col in 0..m.num_cols {
            if pivot_row == m.num_rows {
                break;
            }
            let Some(found) = (pivot_row..m.num_rows).find(|&r| !m[(r, col)].is_zero()) else {
                continue;
            };
            m.swap_rows(pivot_row, found);

            if let Some(inv) = m[(pivot_row, col)].checked_recip() {
                m.scale_row(pivot_row, &inv);
            }
            for r in 0..m.num_rows {
                if r != pivot_row && !m[(r, col)].is_zero() {
                    let factor = -&m[(r, col)];
                    m.add_scaled_row(r, pivot_row, &factor);
                }
            }
            pivot_row += 1;
        }
        (m, pivot_row)
    }

    /// Solves `A x = b` when the solution exists and is unique.
    ///
    /// # Panics
    ///
    /// Panics if `b.len()` differs from the row count.
    #[must_use]
    pub fn solve(&self, b: &[Rational]) -> Option<Vec<Rational>> {
        assert_eq!(b.len(), self.num_rows);
        let n = self.num_cols;
        let mut augmented = Self::zeros(self.num_rows, n + 1);
        for i in 0..self.num_rows {
            for j in 0..n {
                augmented[(i, j)] = self[(i, j)].clone();
            }
            augmented[(i, n)] = b[i].clone();
        }

        let (reduced, rank) = augmented.rref();
        // A pivot in the last column means 0 = c.
        for row in 0..rank {
            if (0..n).all(|col| reduced[(row, col)].is_zero()) {
                return None;
            }
        }
        if rank != n {
            return None;
        }
        Some((0..n).map(|i| reduced[(i, n)].clone()).collect())
    }

    /// Determinant by Gaussian elimination over the rationals.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    #[must_use]
    pub fn det(&self) -> Rational {
        assert!(self.is_square());
        let n = self.num_rows;
        let mut m = self.clone();
        let mut det = Rational::one();

        for col in 0..n {
            let Some(pivot_row) = (col..n).find(|&r| !m[(r, col)].is_zero()) else {
                return Rational::zero();
            };
            if pivot_row != col {
                m.swap_rows(col, pivot_row);
                det = -det;
            }
            let pivot = m[(col, col)].clone();
            det = det * &pivot;
            let Some(inv) = pivot.checked_recip() else {
                return Rational::zero();
            };
            for row in col + 1..n {
                if !m[(row, col)].is_zero() {
                    let factor = -(&m[(row, col)] * &inv);
                    m.add_scaled_row(row, col, &factor);
                }
            }
        }
        det
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Rational;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.data[row * self.num_cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.data[row * self.num_cols + col]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl fmt::Display for Matrix {
    /// One row per line, entries separated by spaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, entry) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{entry}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_rows(rows.iter().map(|r| r.iter().map(|&v| q(v)).collect()).collect()).unwrap()
    }

    #[test]
    fn test_identity_and_zeros() {
        let id = Matrix::identity(3);
        assert_eq!(id.trace(), q(3));
        assert!(Matrix::zeros(2, 3).is_zero());
        assert!(!id.is_zero());
        assert_eq!(id.get(3, 0), None);
    }

    #[test]
    fn test_ragged_rows() {
        assert!(Matrix::from_rows(vec![vec![q(1), q(2)], vec![q(3)]]).is_none());
    }

    #[test]
    fn test_mv() {
        let a = m(&[&[1, 2, 3], &[4, 5, 6]]);
        assert_eq!(a.mv(&[q(1), q(2), q(3)]), vec![q(14), q(32)]);
    }

    #[test]
    fn test_mm() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let b = m(&[&[5, 6], &[7, 8]]);
        assert_eq!(a.mm(&b), m(&[&[19, 22], &[43, 50]]));
        assert_eq!(a.mm(&Matrix::identity(2)), a);
    }

    #[test]
    fn test_det() {
        assert_eq!(m(&[&[3, 8], &[4, 6]]).det(), q(-14));
        assert_eq!(m(&[&[0, 1], &[1, 0]]).det(), q(-1));
        assert_eq!(m(&[&[1, 2], &[2, 4]]).det(), q(0));
        assert_eq!(m(&[&[2, 0, 1], &[1, 3, 2], &[1, 1, 2]]).det(), q(6));
        assert_eq!(m(&[&[2, 0, 1], &[1, 3, 2], &[1, 1, 1]]).det(), q(0));
        assert_eq!(m(&[&[0, 2, 1], &[1, 0, 0], &[0, 1, 3]]).det(), q(-5));
    }

    #[test]
    fn test_rref_rank() {
        let (_, rank) = m(&[&[1, 2, 3], &[2, 4, 6]]).rref();
        assert_eq!(rank, 1);
        let (reduced, rank) = m(&[&[2, 1], &[1, 2]]).rref();
        assert_eq!(rank, 2);
        assert_eq!(reduced, Matrix::identity(2));
    }

    #[test]
    fn test_solve() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert_eq!(a.solve(&[q(5), q(11)]), Some(vec![q(1), q(2)]));

        let half = Rational::from_i64(1, 2);
        let a = m(&[&[2, 0, 1], &[0, 2, 1], &[1, 1, 0]]);
        assert_eq!(a.solve(&[q(0), q(0), q(1)]), Some(vec![half.clone(), half, q(-1)]));
    }

    #[test]
    fn test_solve_singular() {
        let a = m(&[&[1, 2], &[2, 4]]);
        // Inconsistent.
        assert_eq!(a.solve(&[q(1), q(3)]), None);
        // Infinitely many.
        assert_eq!(a.solve(&[q(1), q(2)]), None);
    }

    #[test]
    fn test_display() {
        let a = Matrix::from_rows(vec![vec![q(1), Rational::from_i64(-1, 2)], vec![q(0), q(3)]]).unwrap();
        assert_eq!(a.to_string(), "1 -1/2\n0 3");
    }
}
