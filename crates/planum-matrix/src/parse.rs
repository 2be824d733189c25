//! Reading matrices from text.

use planum_calculus::Calculus;
use planum_core::{parse_constant, ExprArena};
use tracing::trace;

use crate::error::MatrixError;
use crate::matrix::Matrix;

/// Parses a square matrix.
///
/// Rows are separated by newlines or `;`, entries by whitespace or commas.
/// Every entry is a constant expression such as `3`, `-1/2` or `2**-1` that
/// must simplify to an exact rational. Blank rows are ignored.
///
/// # Errors
///
/// Returns [`MatrixError`] for empty or ragged input, a non-square shape, or
/// an entry that does not parse or is not rational.
pub fn parse_matrix(text: &str) -> Result<Matrix, MatrixError> {
    let rows: Vec<Vec<&str>> = text
        .split(['\n', ';'])
        .map(|line| {
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|entry| !entry.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    let Some(first) = rows.first() else {
        return Err(MatrixError::Empty);
    };
    let expected = first.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != expected) {
        return Err(MatrixError::Ragged {
            row: i + 1,
            expected,
            found: row.len(),
        });
    }
    if rows.len() != expected {
        return Err(MatrixError::NotSquare {
            rows: rows.len(),
            cols: expected,
        });
    }

    let mut arena = ExprArena::new();
    let mut values = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let mut parsed = Vec::with_capacity(row.len());
        for (j, &entry) in row.iter().enumerate() {
            let (row, col) = (i + 1, j + 1);
            let handle = parse_constant(&mut arena, entry).map_err(|source| MatrixError::Parse { row, col, source })?;
            let value = Calculus::new(&mut arena)
                .expand(handle)
                .map_err(|source| MatrixError::Undefined { row, col, source })?;
            let Some(value) = value.as_constant() else {
                return Err(MatrixError::NonRational {
                    row,
                    col,
                    text: entry.to_string(),
                });
            };
            trace!(row, col, %value, "matrix entry");
            parsed.push(value);
        }
        values.push(parsed);
    }

    // Row lengths were checked above.
    Matrix::from_rows(values).ok_or(MatrixError::Ragged {
        row: 1,
        expected,
        found: 0,
    })
}
