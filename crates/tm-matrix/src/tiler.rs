use crate::block::Block;
use crate::error::{MatrixError, Result};
use crate::matrix::DenseMatrix;

/// Stages one `dim x dim` tile of each operand and multiplies them.
///
/// The left tile is staged row-major. The right tile is staged transposed,
/// so that column `k` of the source tile becomes contiguous row `k` of the
/// staging buffer and every inner product in `multiply_into` reads two
/// contiguous runs.
///
/// Both staging buffers are fully overwritten by every `load`.
#[derive(Debug, Clone)]
pub struct Tiler {
    dim: usize,
    lhs: Vec<f64>,
    rhs_t: Vec<f64>,
}

impl Tiler {
    pub fn new(dim: usize) -> Self {
        Tiler {
            dim,
            lhs: vec![0.0; dim * dim],
            rhs_t: vec![0.0; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn check_region(&self, mat: &DenseMatrix, row: usize, col: usize) -> Result<()> {
        if self.dim == 0 {
            return Ok(());
        }
        let last_row = row + self.dim - 1;
        let last_col = col + self.dim - 1;
        if last_row >= mat.rows() || last_col >= mat.cols() {
            return Err(MatrixError::IndexOutOfBounds {
                row: last_row,
                col: last_col,
                rows: mat.rows(),
                cols: mat.cols(),
            });
        }
        Ok(())
    }

    /// Stage the tile of `mat1` at `(r1, c1)` row-major and the tile of
    /// `mat2` at `(r2, c2)` transposed.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` if either tile runs past its matrix. The
    /// tiled strategy pads its operands so this never happens there.
    pub fn load(
        &mut self,
        mat1: &DenseMatrix,
        r1: usize,
        c1: usize,
        mat2: &DenseMatrix,
        r2: usize,
        c2: usize,
    ) -> Result<()> {
        self.check_region(mat1, r1, c1)?;
        self.check_region(mat2, r2, c2)?;

        let n = self.dim;
        let src1 = mat1.as_slice();
        for i in 0..n {
            let start = (r1 + i) * mat1.cols() + c1;
            self.lhs[i * n..(i + 1) * n].copy_from_slice(&src1[start..start + n]);
        }

        let src2 = mat2.as_slice();
        for i in 0..n {
            let start = (r2 + i) * mat2.cols() + c2;
            for (j, &v) in src2[start..start + n].iter().enumerate() {
                self.rhs_t[j * n + i] = v;
            }
        }
        Ok(())
    }

    /// Add the product of the staged tiles into `acc`.
    ///
    /// `acc(i, k) += dot(lhs row i, rhs_t row k)`; existing contents of
    /// `acc` are kept so partial products sum across reduction tiles.
    pub fn multiply_into(&self, acc: &mut Block) -> Result<()> {
        if acc.dim() != self.dim {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![self.dim, self.dim],
                got: vec![acc.dim(), acc.dim()],
            });
        }

        let n = self.dim;
        let out = acc.as_mut_slice();
        for i in 0..n {
            let a_row = &self.lhs[i * n..(i + 1) * n];
            for k in 0..n {
                let b_row = &self.rhs_t[k * n..(k + 1) * n];
                let mut dot = 0.0;
                for (x, y) in a_row.iter().zip(b_row) {
                    dot += x * y;
                }
                out[i * n + k] += dot;
            }
        }
        Ok(())
    }
}
