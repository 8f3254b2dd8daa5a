//! Construction-time errors. Bad activations are not errors; see `game::Ignored`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid needs at least one row")]
    ZeroRows,
    #[error("grid needs at least one column")]
    ZeroCols,
    #[error("merge threshold must be greater than 1, got {0}")]
    ThresholdTooLow(u32),
    #[error("grid of {rows}x{cols} is too large, at most {max}x{max} stones")]
    TooLarge { rows: usize, cols: usize, max: usize },
    #[error("grid is {found_rows}x{found_cols}, configured for {rows}x{cols}")]
    GridMismatch {
        rows: usize,
        cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} has {found} stones, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown stone {ch:?} at row {row}, column {col}")]
    UnknownStone { row: usize, col: usize, ch: char },
    #[error("expected {expected} cells, got {found}")]
    LengthMismatch { expected: usize, found: usize },
}
