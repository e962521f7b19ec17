//! The three multiplication strategies and a selector over them.
//!
//! Every strategy takes its operands by reference and returns a freshly
//! allocated `mat1.rows() x mat2.cols()` matrix; inputs are never mutated.

use std::fmt;

use tracing::{debug, trace};

use crate::backend::{GemmBackend, GemmDims};
use crate::block::Block;
use crate::error::{MatrixError, Result};
use crate::matrix::{element_count, DenseMatrix};
use crate::tiler::Tiler;

/// Tile edge used when a caller has no better figure. 64x64 doubles is 32 KiB
/// per staged tile.
pub const DEFAULT_TILE_SIZE: usize = 64;

/// Fails with `DimensionMismatch` unless `mat1.cols() == mat2.rows()`.
pub fn validate_multiplication(mat1: &DenseMatrix, mat2: &DenseMatrix) -> Result<()> {
    if mat1.cols() != mat2.rows() {
        return Err(MatrixError::DimensionMismatch {
            lhs_rows: mat1.rows(),
            lhs_cols: mat1.cols(),
            rhs_rows: mat2.rows(),
            rhs_cols: mat2.cols(),
        });
    }
    Ok(())
}

/// Reference triple loop. Used as the correctness oracle for the others.
pub fn multiply_naive(mat1: &DenseMatrix, mat2: &DenseMatrix) -> Result<DenseMatrix> {
    validate_multiplication(mat1, mat2)?;
    debug!(
        m = mat1.rows(),
        k = mat1.cols(),
        n = mat2.cols(),
        "multiply_naive"
    );

    let (m, k, n) = (mat1.rows(), mat1.cols(), mat2.cols());
    let a = mat1.as_slice();
    let b = mat2.as_slice();
    let mut ret = DenseMatrix::new(m, n);
    let c = ret.as_mut_slice();
    for i in 0..m {
        for kk in 0..n {
            let mut v = 0.0;
            for j in 0..k {
                v += a[i * k + j] * b[j * n + kk];
            }
            c[i * n + kk] = v;
        }
    }
    Ok(ret)
}

#[cfg(feature = "cblas")]
static DEFAULT_BACKEND: crate::blas::CblasBackend = crate::blas::CblasBackend;
#[cfg(not(feature = "cblas"))]
static DEFAULT_BACKEND: crate::cpu::MatrixMultiplyBackend = crate::cpu::MatrixMultiplyBackend;

/// The backend `multiply_vendor` uses: system CBLAS when the `cblas` feature
/// is on, `matrixmultiply` otherwise.
pub fn default_backend() -> &'static dyn GemmBackend {
    &DEFAULT_BACKEND
}

/// Multiply with the default vendor GEMM.
pub fn multiply_vendor(mat1: &DenseMatrix, mat2: &DenseMatrix) -> Result<DenseMatrix> {
    multiply_vendor_with(mat1, mat2, default_backend())
}

/// Multiply through `backend` as one row-major GEMM with `alpha = 1`,
/// `beta = 0`.
pub fn multiply_vendor_with(
    mat1: &DenseMatrix,
    mat2: &DenseMatrix,
    backend: &dyn GemmBackend,
) -> Result<DenseMatrix> {
    validate_multiplication(mat1, mat2)?;
    let dims = GemmDims::new(mat1.rows(), mat1.cols(), mat2.cols());
    debug!(m = dims.m, k = dims.k, n = dims.n, backend = backend.name(), "multiply_vendor");

    let mut ret = DenseMatrix::new(dims.m, dims.n);
    if dims.is_degenerate() {
        return Ok(ret);
    }
    trace!(backend = backend.name(), "dispatching dgemm");
    backend.dgemm(
        dims,
        1.0,
        mat1.as_slice(),
        mat2.as_slice(),
        0.0,
        ret.as_mut_slice(),
    )?;
    Ok(ret)
}

/// Extent needed to round `dim` up to a multiple of `tile_size`.
fn padding(dim: usize, tile_size: usize) -> Result<usize> {
    dim.div_ceil(tile_size)
        .checked_mul(tile_size)
        .map(|padded| padded - dim)
        .ok_or_else(|| {
            MatrixError::InvalidArgument(format!(
                "tile size {} overflows padded extent of dimension {}",
                tile_size, dim
            ))
        })
}

/// Cache-blocked multiplication with square tiles of edge `tile_size`.
///
/// Both operands are zero-padded up to tile multiples, the padded product is
/// swept tile by tile with a single `Tiler` and `Block`, and the padding is
/// trimmed off the result. `tile_size` need not divide any dimension.
///
/// # Errors
/// `DimensionMismatch` for incompatible operands, `InvalidArgument` for a
/// zero tile size or one whose tile or padded buffers cannot be addressed.
/// Both checks run before anything is allocated.
pub fn multiply_tiled(
    mat1: &DenseMatrix,
    mat2: &DenseMatrix,
    tile_size: usize,
) -> Result<DenseMatrix> {
    validate_multiplication(mat1, mat2)?;
    if tile_size == 0 {
        return Err(MatrixError::InvalidArgument(
            "tile size must be positive".to_string(),
        ));
    }

    let pad_m = padding(mat1.rows(), tile_size)?;
    let pad_k = padding(mat1.cols(), tile_size)?;
    let pad_n = padding(mat2.cols(), tile_size)?;
    // padded extents are exact tile multiples computed with checked_mul above
    let (m_p, k_p, n_p) = (
        mat1.rows() + pad_m,
        mat1.cols() + pad_k,
        mat2.cols() + pad_n,
    );
    // staging buffers, both padded operands and the padded result
    element_count(tile_size, tile_size)?;
    element_count(m_p, k_p)?;
    element_count(k_p, n_p)?;
    element_count(m_p, n_p)?;
    debug!(
        m = mat1.rows(),
        k = mat1.cols(),
        n = mat2.cols(),
        tile_size,
        pad_m,
        pad_k,
        pad_n,
        "multiply_tiled"
    );

    let a = mat1.padded_copy(pad_m, pad_k);
    let b = mat2.padded_copy(pad_k, pad_n);
    let mut ret = DenseMatrix::new(a.rows(), b.cols());

    let mut value = Block::new(tile_size);
    let mut tiler = Tiler::new(tile_size);

    for it in (0..a.rows()).step_by(tile_size) {
        for kt in (0..b.cols()).step_by(tile_size) {
            value.reset(0.0);
            for jt in (0..a.cols()).step_by(tile_size) {
                tiler.load(&a, it, jt, &b, jt, kt)?;
                tiler.multiply_into(&mut value)?;
            }
            value.save_into(&mut ret, it, kt)?;
        }
    }

    ret.unpad(pad_m, pad_n)?;
    Ok(ret)
}

/// Which algorithm `multiply` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Naive,
    Vendor,
    Tiled { tile_size: usize },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::Vendor => "vendor",
            Strategy::Tiled { .. } => "tiled",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Tiled {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Tiled { tile_size } => write!(f, "tiled({})", tile_size),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Multiply `mat1 @ mat2` with the chosen strategy.
pub fn multiply(
    mat1: &DenseMatrix,
    mat2: &DenseMatrix,
    strategy: Strategy,
) -> Result<DenseMatrix> {
    match strategy {
        Strategy::Naive => multiply_naive(mat1, mat2),
        Strategy::Vendor => multiply_vendor(mat1, mat2),
        Strategy::Tiled { tile_size } => multiply_tiled(mat1, mat2, tile_size),
    }
}
