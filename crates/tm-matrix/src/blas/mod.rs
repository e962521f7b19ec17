// System CBLAS backend, enabled with the `cblas` feature.
//
// The `cblas` crate only declares the symbols. The final binary has to link a
// provider (OpenBLAS, MKL, Accelerate), e.g. through `openblas-src`.

use cblas::{Layout, Transpose};

use crate::backend::{scale_output, GemmBackend, GemmDims};
use crate::error::{MatrixError, Result};

/// GEMM backend that calls `cblas_dgemm` from the linked BLAS library.
#[derive(Debug, Clone, Copy, Default)]
pub struct CblasBackend;

impl CblasBackend {
    pub fn new() -> Self {
        CblasBackend
    }
}

fn to_blas_int(name: &str, v: usize) -> Result<i32> {
    i32::try_from(v).map_err(|_| {
        MatrixError::InvalidArgument(format!("{} = {} exceeds the CBLAS index range", name, v))
    })
}

impl GemmBackend for CblasBackend {
    fn name(&self) -> &str {
        "cblas"
    }

    fn dgemm(
        &self,
        dims: GemmDims,
        alpha: f64,
        a: &[f64],
        b: &[f64],
        beta: f64,
        c: &mut [f64],
    ) -> Result<()> {
        dims.check_operands(a, b, c)?;
        if dims.m == 0 || dims.n == 0 {
            return Ok(());
        }
        if dims.k == 0 {
            scale_output(beta, c);
            return Ok(());
        }

        let m = to_blas_int("m", dims.m)?;
        let k = to_blas_int("k", dims.k)?;
        let n = to_blas_int("n", dims.n)?;
        // SAFETY: operand lengths match `dims`; row-major leading dimensions
        // are the column counts k, n and n.
        unsafe {
            cblas::dgemm(
                Layout::RowMajor,
                Transpose::None,
                Transpose::None,
                m,
                n,
                k,
                alpha,
                a,
                k,
                b,
                n,
                beta,
                c,
                n,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(CblasBackend::new().name(), "cblas");
    }

    #[test]
    fn test_length_mismatch_rejected_before_call() {
        let mut c = vec![0.0; 4];
        let err = CblasBackend::new()
            .dgemm(GemmDims::new(2, 2, 2), 1.0, &[0.0; 3], &[0.0; 4], 0.0, &mut c)
            .unwrap_err();
        assert!(matches!(err, MatrixError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_empty_reduction_scales_output() {
        let mut c = vec![2.0; 6];
        CblasBackend::new()
            .dgemm(GemmDims::new(2, 0, 3), 1.0, &[], &[], 0.5, &mut c)
            .unwrap();
        assert_eq!(c, vec![1.0; 6]);
    }

    #[test]
    fn test_blas_int_range() {
        assert_eq!(to_blas_int("m", 7).unwrap(), 7);
        assert!(matches!(
            to_blas_int("m", i32::MAX as usize + 1),
            Err(MatrixError::InvalidArgument(_))
        ));
    }
}
