use std::ops::{Index, IndexMut};

use crate::error::{MatrixError, Result};
use crate::matrix::DenseMatrix;

/// A square `dim x dim` accumulator tile.
///
/// The tiled strategy keeps one block per multiplication call, resets it
/// before each output tile, accumulates partial products across the
/// reduction tiles, then adds it into the result with `save_into`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    dim: usize,
    buffer: Vec<f64>,
}

impl Block {
    /// Create a zero-filled block.
    pub fn new(dim: usize) -> Self {
        Block {
            dim,
            buffer: vec![0.0; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Row-major contents.
    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    /// Assign `value` to every element.
    pub fn reset(&mut self, value: f64) {
        self.buffer.fill(value);
    }

    /// Element-wise `self += other`.
    pub fn accumulate(&mut self, other: &Block) -> Result<()> {
        if self.dim != other.dim {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![self.dim, self.dim],
                got: vec![other.dim, other.dim],
            });
        }
        for (dst, src) in self.buffer.iter_mut().zip(&other.buffer) {
            *dst += src;
        }
        Ok(())
    }

    /// Add every element into `matrix` with the block's origin at
    /// `(row_offset, col_offset)`.
    ///
    /// # Errors
    /// Returns `IndexOutOfBounds` if the block does not fit; nothing is
    /// written in that case.
    pub fn save_into(
        &self,
        matrix: &mut DenseMatrix,
        row_offset: usize,
        col_offset: usize,
    ) -> Result<()> {
        if self.dim == 0 {
            return Ok(());
        }
        let last_row = row_offset + self.dim - 1;
        let last_col = col_offset + self.dim - 1;
        if last_row >= matrix.rows() || last_col >= matrix.cols() {
            return Err(MatrixError::IndexOutOfBounds {
                row: last_row,
                col: last_col,
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }

        let cols = matrix.cols();
        let dst = matrix.as_mut_slice();
        for (i, src_row) in self.buffer.chunks_exact(self.dim).enumerate() {
            let start = (row_offset + i) * cols + col_offset;
            for (d, s) in dst[start..start + self.dim].iter_mut().zip(src_row) {
                *d += s;
            }
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Block {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.dim && col < self.dim, "block index out of range");
        &self.buffer[row * self.dim + col]
    }
}

impl IndexMut<(usize, usize)> for Block {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.dim && col < self.dim, "block index out of range");
        &mut self.buffer[row * self.dim + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_is_zeroed() {
        let b = Block::new(3);
        assert_eq!(b.dim(), 3);
        assert_eq!(b.as_slice(), &[0.0; 9]);
    }

    #[test]
    fn test_reset() {
        let mut b = Block::new(2);
        b.reset(1.5);
        assert_eq!(b.as_slice(), &[1.5; 4]);
        b.reset(0.0);
        assert_eq!(b.as_slice(), &[0.0; 4]);
    }

    #[test]
    fn test_accumulate() {
        let mut a = Block::new(2);
        let mut b = Block::new(2);
        a[(0, 0)] = 1.0;
        b[(0, 0)] = 2.0;
        b[(1, 1)] = 3.0;
        a.accumulate(&b).unwrap();
        assert_eq!(a.as_slice(), &[3.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_accumulate_dim_mismatch() {
        let mut a = Block::new(2);
        let b = Block::new(3);
        assert!(matches!(
            a.accumulate(&b),
            Err(MatrixError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_into_adds() {
        let mut m = DenseMatrix::from_rows(&[
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0],
            vec![1.0, 1.0, 1.0],
        ])
        .unwrap();
        let mut b = Block::new(2);
        b.reset(2.0);
        b.save_into(&mut m, 1, 1).unwrap();
        assert_eq!(
            m.as_slice(),
            &[1.0, 1.0, 1.0, 1.0, 3.0, 3.0, 1.0, 3.0, 3.0]
        );
    }

    #[test]
    fn test_save_into_out_of_bounds() {
        let mut m = DenseMatrix::new(3, 3);
        let mut b = Block::new(2);
        b.reset(1.0);
        let err = b.save_into(&mut m, 2, 0).unwrap_err();
        assert!(err.is_index_error());
        assert_eq!(m, DenseMatrix::new(3, 3));
    }
}
