use crate::backend::{scale_output, GemmBackend, GemmDims};
use crate::error::Result;

/// GEMM backend built on the `matrixmultiply` crate.
///
/// A cache-blocked, SIMD-tuned pure Rust kernel. It needs no system library,
/// so it is the default vendor backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixMultiplyBackend;

impl MatrixMultiplyBackend {
    pub fn new() -> Self {
        MatrixMultiplyBackend
    }
}

impl GemmBackend for MatrixMultiplyBackend {
    fn name(&self) -> &str {
        "matrixmultiply"
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

        let GemmDims { m, k, n } = dims;
        // SAFETY: the slice lengths were checked against `dims` above, and
        // the row/column strides describe dense row-major storage within them.
        unsafe {
            matrixmultiply::dgemm(
                m,
                k,
                n,
                alpha,
                a.as_ptr(),
                k as isize,
                1,
                b.as_ptr(),
                n as isize,
                1,
                beta,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
        Ok(())
    }
}
