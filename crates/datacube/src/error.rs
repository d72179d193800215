//! Error types for cube assembly and evaluation.

use thiserror::Error;

/// Errors that can occur while building or evaluating a cube.
#[derive(Error, Debug)]
pub enum CubeError {
    /// A deferred loader failed while materializing data.
    #[error("failed to load array data: {0:#}")]
    Load(#[source] anyhow::Error),

    /// A loader produced an array with a shape other than the declared one.
    #[error("array shape {actual:?} does not match declared shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A band variable is not a two-dimensional (y, x) field.
    #[error("band '{band}' has {ndim} dimensions; expected (y, x)")]
    NotTwoDimensional { band: String, ndim: usize },

    /// Bands in one cube must share a single (y, x) grid.
    #[error("band '{band}' has grid {actual:?}, which differs from the cube grid {expected:?}")]
    GridMismatch {
        band: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A band name occurs more than once.
    #[error("duplicate band '{0}'")]
    DuplicateBand(String),

    /// A cube must have at least one band.
    #[error("cannot build a cube without bands")]
    EmptyCube,

    /// A coordinate vector does not match its dimension length.
    #[error("coordinate '{dim}' has {actual} labels; dimension length is {expected}")]
    CoordinateLength {
        dim: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A swath line/node index is not a finite number.
    #[error("invalid swath index: {0}")]
    InvalidSwathIndex(String),

    /// Two observations map to the same (line, node) cell.
    #[error("duplicate swath cell at line {line}, node {node}")]
    DuplicateSwathCell { line: i64, node: i64 },

    /// An observation vector length differs from the swath index length.
    #[error("expected {expected} observations, got {actual}")]
    ObservationCount { expected: usize, actual: usize },
}

impl CubeError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

/// Result type for cube operations.
pub type CubeResult<T> = std::result::Result<T, CubeError>;
