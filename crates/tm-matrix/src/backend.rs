use std::fmt::Debug;

use crate::error::{MatrixError, Result};

/// Extents of one GEMM call: `a` is `m x k`, `b` is `k x n`, `c` is `m x n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmDims {
    pub m: usize,
    pub k: usize,
    pub n: usize,
}

impl GemmDims {
    pub fn new(m: usize, k: usize, n: usize) -> Self {
        GemmDims { m, k, n }
    }

    /// True when the product has no elements or no reduction extent.
    pub fn is_degenerate(&self) -> bool {
        self.m == 0 || self.k == 0 || self.n == 0
    }

    /// Check that each operand holds exactly the elements `self` implies.
    pub fn check_operands(&self, a: &[f64], b: &[f64], c: &[f64]) -> Result<()> {
        let expected = [self.m * self.k, self.k * self.n, self.m * self.n];
        let got = [a.len(), b.len(), c.len()];
        if expected != got {
            return Err(MatrixError::ShapeMismatch {
                expected: expected.to_vec(),
                got: got.to_vec(),
            });
        }
        Ok(())
    }
}

/// A dense double-precision GEMM provider (BLAS, a tuned Rust kernel, a test
/// double).
///
/// All operands are dense and row-major, with leading dimensions equal to
/// their column counts. Implementations compute `c = alpha * a * b + beta * c`
/// and must not read `c` when `beta == 0`.
pub trait GemmBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "matrixmultiply", "cblas").
    fn name(&self) -> &str;

    /// General matrix multiply over row-major slices.
    fn dgemm(
        &self,
        dims: GemmDims,
        alpha: f64,
        a: &[f64],
        b: &[f64],
        beta: f64,
        c: &mut [f64],
    ) -> Result<()>;
}

/// `c = beta * c`, the whole result of a GEMM with an empty reduction.
pub(crate) fn scale_output(beta: f64, c: &mut [f64]) {
    if beta == 0.0 {
        c.fill(0.0);
    } else if beta != 1.0 {
        for v in c.iter_mut() {
            *v *= beta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_operands() {
        let dims = GemmDims::new(2, 3, 4);
        assert!(dims
            .check_operands(&[0.0; 6], &[0.0; 12], &[0.0; 8])
            .is_ok());
        let err = dims
            .check_operands(&[0.0; 6], &[0.0; 11], &[0.0; 8])
            .unwrap_err();
        assert_eq!(
            err,
            MatrixError::ShapeMismatch {
                expected: vec![6, 12, 8],
                got: vec![6, 11, 8],
            }
        );
    }

    #[test]
    fn test_degenerate() {
        assert!(GemmDims::new(0, 3, 4).is_degenerate());
        assert!(GemmDims::new(2, 0, 4).is_degenerate());
        assert!(!GemmDims::new(1, 1, 1).is_degenerate());
    }

    #[test]
    fn test_scale_output() {
        let mut c = vec![1.0, f64::NAN];
        scale_output(0.0, &mut c);
        assert_eq!(c, vec![0.0, 0.0]);

        let mut c = vec![1.0, 2.0];
        scale_output(3.0, &mut c);
        assert_eq!(c, vec![3.0, 6.0]);
    }
}
