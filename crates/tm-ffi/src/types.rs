use tm_matrix::{DenseMatrix, MatrixError, Strategy};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TmStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorDimensionMismatch = 2,
    ErrorIndex = 3,
    ErrorBackend = 4,
    ErrorInternal = 5,
}

impl From<&MatrixError> for TmStatus {
    fn from(err: &MatrixError) -> Self {
        match err {
            MatrixError::DimensionMismatch { .. } => TmStatus::ErrorDimensionMismatch,
            MatrixError::IndexOutOfBounds { .. } | MatrixError::TrimOutOfBounds { .. } => {
                TmStatus::ErrorIndex
            }
            MatrixError::InvalidArgument(_) | MatrixError::ShapeMismatch { .. } => {
                TmStatus::ErrorInvalidArgument
            }
            MatrixError::Backend(_) => TmStatus::ErrorBackend,
        }
    }
}

/// Multiplication strategy selector.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TmStrategy {
    Naive = 0,
    Vendor = 1,
    Tiled = 2,
}

impl TmStrategy {
    /// Resolve to a `Strategy`; `tile_size` is only read for `Tiled` and must
    /// be positive.
    pub fn resolve(self, tile_size: i64) -> Result<Strategy, MatrixError> {
        match self {
            TmStrategy::Naive => Ok(Strategy::Naive),
            TmStrategy::Vendor => Ok(Strategy::Vendor),
            TmStrategy::Tiled => {
                if tile_size <= 0 {
                    return Err(MatrixError::InvalidArgument(format!(
                        "tile size must be positive, got {}",
                        tile_size
                    )));
                }
                let tile_size = usize::try_from(tile_size).map_err(|_| {
                    MatrixError::InvalidArgument(format!("tile size {} too large", tile_size))
                })?;
                Ok(Strategy::Tiled { tile_size })
            }
        }
    }
}

/// Opaque matrix handle owned by the caller.
pub struct TmMatrix {
    pub inner: DenseMatrix,
}

impl TmMatrix {
    pub fn new(inner: DenseMatrix) -> Self {
        Self { inner }
    }
}
