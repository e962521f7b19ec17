use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error(
        "matmul dimension mismatch: [{lhs_rows}x{lhs_cols}] @ [{rhs_rows}x{rhs_cols}] \
         (first matrix columns differ from second matrix rows)"
    )]
    DimensionMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("cannot trim {trim_rows} rows and {trim_cols} columns from {rows}x{cols} matrix")]
    TrimOutOfBounds {
        trim_rows: usize,
        trim_cols: usize,
        rows: usize,
        cols: usize,
    },
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: Vec<usize>, got: Vec<usize> },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("gemm backend error: {0}")]
    Backend(String),
}

impl MatrixError {
    /// True for out-of-range element access and over-long trims.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            MatrixError::IndexOutOfBounds { .. } | MatrixError::TrimOutOfBounds { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;
