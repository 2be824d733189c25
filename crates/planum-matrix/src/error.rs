//! Errors of matrix input.

use planum_calculus::IntegrationError;
use planum_core::ParseError;
use thiserror::Error;

/// Why a matrix could not be read or used.
///
/// Rows and columns are 1-based, as the user sees them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("matrix input is empty")]
    Empty,

    #[error("row {row} has {found} entries, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("entry ({row}, {col}) '{text}' is not a rational number")]
    NonRational { row: usize, col: usize, text: String },

    #[error("entry ({row}, {col}): {source}")]
    Parse {
        row: usize,
        col: usize,
        #[source]
        source: ParseError,
    },

    #[error("entry ({row}, {col}): {source}")]
    Undefined {
        row: usize,
        col: usize,
        #[source]
        source: IntegrationError,
    },
}
