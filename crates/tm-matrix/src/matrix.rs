use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{MatrixError, Result};

/// A dense, row-major matrix of f64 values.
///
/// The buffer always holds exactly `rows * cols` elements; element `(i, j)`
/// lives at `i * cols + j`. Equality is exact element-wise comparison, with no
/// tolerance.
///
/// Moving a matrix transfers its buffer. `Default` is the empty 0x0 matrix, so
/// `std::mem::take` leaves the source in a valid state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    buffer: Vec<f64>,
}

/// Element count of a `rows x cols` buffer, refusing extents whose byte size
/// does not fit in `isize`.
pub(crate) fn element_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols)
        .filter(|&n| {
            n.checked_mul(std::mem::size_of::<f64>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or_else(|| {
            MatrixError::InvalidArgument(format!(
                "{}x{} matrix exceeds the addressable size",
                rows, cols
            ))
        })
}

impl DenseMatrix {
    /// Create a zero-filled `rows x cols` matrix.
    ///
    /// # Panics
    /// Panics if `rows * cols` elements cannot be addressed; use `try_new`
    /// for untrusted extents.
    pub fn new(rows: usize, cols: usize) -> Self {
        match DenseMatrix::try_new(rows, cols) {
            Ok(m) => m,
            Err(e) => panic!("{}", e),
        }
    }

    /// Create a zero-filled `rows x cols` matrix.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the element count overflows.
    pub fn try_new(rows: usize, cols: usize) -> Result<Self> {
        let n = element_count(rows, cols)?;
        Ok(DenseMatrix {
            rows,
            cols,
            buffer: vec![0.0; n],
        })
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `rows * cols` overflows and
    /// `ShapeMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let n = element_count(rows, cols)?;
        if data.len() != n {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![n],
                got: vec![data.len()],
            });
        }
        Ok(DenseMatrix {
            rows,
            cols,
            buffer: data,
        })
    }

    /// Build a matrix from a sequence of rows.
    ///
    /// The first row's length fixes the column count; every other row must
    /// match it. An empty sequence gives the 0x0 matrix.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut buffer = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MatrixError::InvalidArgument(format!(
                    "row {} has {} columns but row 0 has {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            buffer.extend_from_slice(row);
        }
        Ok(DenseMatrix {
            rows: rows.len(),
            cols,
            buffer,
        })
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = DenseMatrix::new(n, n);
        for i in 0..n {
            m.buffer[i * n + i] = 1.0;
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements (`rows * cols`).
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The row-major buffer, for zero-copy hand-off to external consumers.
    pub fn as_slice(&self) -> &[f64] {
        &self.buffer
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.buffer
    }

    /// Borrow row `row` as a contiguous slice.
    pub fn row(&self, row: usize) -> Result<&[f64]> {
        if row >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let start = row * self.cols;
        Ok(&self.buffer[start..start + self.cols])
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    /// Bounds-checked element read.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let idx = self.offset(row, col)?;
        Ok(self.buffer[idx])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let idx = self.offset(row, col)?;
        self.buffer[idx] = value;
        Ok(())
    }

    /// Copy into a `(rows + extra_rows) x (cols + extra_cols)` matrix.
    ///
    /// Elements inside the original extent are copied; everything else,
    /// including cells where only one coordinate is out of range, is zero.
    ///
    /// # Panics
    /// Panics if the padded extent cannot be addressed.
    pub fn padded_copy(&self, extra_rows: usize, extra_cols: usize) -> DenseMatrix {
        let rows = self
            .rows
            .checked_add(extra_rows)
            .expect("padded row count overflows usize");
        let cols = self
            .cols
            .checked_add(extra_cols)
            .expect("padded column count overflows usize");
        let mut out = DenseMatrix::new(rows, cols);
        for i in 0..self.rows {
            let src = i * self.cols;
            let dst = i * out.cols;
            out.buffer[dst..dst + self.cols].copy_from_slice(&self.buffer[src..src + self.cols]);
        }
        out
    }

    /// Drop the trailing `trim_rows` rows and `trim_cols` columns in place.
    ///
    /// Surviving elements keep their row-major order. The buffer is compacted
    /// and truncated, never reallocated.
    ///
    /// # Errors
    /// Returns `TrimOutOfBounds` if either trim exceeds the current extent;
    /// the matrix is left untouched in that case.
    pub fn unpad(&mut self, trim_rows: usize, trim_cols: usize) -> Result<()> {
        if trim_rows > self.rows || trim_cols > self.cols {
            return Err(MatrixError::TrimOutOfBounds {
                trim_rows,
                trim_cols,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let rows = self.rows - trim_rows;
        let cols = self.cols - trim_cols;
        if cols != self.cols {
            // Row i moves from i*old_cols to i*cols <= i*old_cols, so a
            // forward sweep never clobbers a row it still has to read.
            for i in 1..rows {
                let src = i * self.cols;
                self.buffer.copy_within(src..src + cols, i * cols);
            }
        }
        self.buffer.truncate(rows * cols);
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    /// # Panics
    /// Panics if the index is out of bounds; use `get` for a checked read.
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.buffer[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.buffer[row * self.cols + col]
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DenseMatrix {}x{}", self.rows, self.cols)?;
        for i in 0..self.rows {
            write!(f, "[")?;
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.buffer[i * self.cols + j])?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DenseMatrix {
        DenseMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_new_is_zeroed() {
        let m = DenseMatrix::new(2, 3);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.as_slice(), &[0.0; 6]);
    }

    #[test]
    fn test_from_rows() {
        let m = sample();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.row(1).unwrap(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidArgument(_)));
    }

    #[test]
    fn test_from_rows_empty() {
        let rows: Vec<Vec<f64>> = Vec::new();
        let m = DenseMatrix::from_rows(&rows).unwrap();
        assert_eq!((m.rows(), m.cols()), (0, 0));
        assert!(m.is_empty());
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        assert!(DenseMatrix::from_vec(2, 2, vec![1.0; 3]).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_from_vec_overflowing_extent() {
        let err = DenseMatrix::from_vec(1 << 32, 1 << 32, Vec::new()).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidArgument(_)));
        // fits in usize elements but not in isize bytes
        assert!(DenseMatrix::from_vec(1 << 31, 1 << 31, Vec::new()).is_err());
    }

    #[test]
    fn test_try_new_overflowing_extent() {
        assert!(matches!(
            DenseMatrix::try_new(usize::MAX, 2),
            Err(MatrixError::InvalidArgument(_))
        ));
        assert_eq!(DenseMatrix::try_new(2, 3).unwrap(), DenseMatrix::new(2, 3));
    }

    #[test]
    #[should_panic]
    fn test_padded_copy_overflow_panics() {
        let m = DenseMatrix::new(1, 1);
        let _padded = m.padded_copy(usize::MAX, 0);
    }

    #[test]
    fn test_get_set() {
        let mut m = sample();
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        m.set(0, 1, 42.0).unwrap();
        assert_eq!(m[(0, 1)], 42.0);
        m[(1, 0)] = -1.0;
        assert_eq!(m.get(1, 0).unwrap(), -1.0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let mut m = sample();
        let err = m.get(2, 0).unwrap_err();
        assert!(err.is_index_error());
        assert!(m.get(0, 3).is_err());
        assert!(m.set(5, 5, 1.0).is_err());
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds_panics() {
        let m = sample();
        let _value: f64 = m[(0, 3)];
    }

    #[test]
    fn test_identity() {
        let i = DenseMatrix::identity(3);
        assert_eq!(
            i.as_slice(),
            &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_padded_copy() {
        let m = sample();
        let p = m.padded_copy(1, 2);
        assert_eq!((p.rows(), p.cols()), (3, 5));
        assert_eq!(
            p.as_slice(),
            &[
                1.0, 2.0, 3.0, 0.0, 0.0, //
                4.0, 5.0, 6.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );
        // source untouched
        assert_eq!(m, sample());
    }

    #[test]
    fn test_padded_copy_zero_extra_is_clone() {
        let m = sample();
        assert_eq!(m.padded_copy(0, 0), m);
    }

    #[test]
    fn test_unpad_restores_padded_copy() {
        let m = sample();
        let mut p = m.padded_copy(3, 1);
        p.unpad(3, 1).unwrap();
        assert_eq!(p, m);
    }

    #[test]
    fn test_unpad_keeps_row_major_order() {
        let mut m = DenseMatrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .unwrap();
        m.unpad(1, 1).unwrap();
        assert_eq!((m.rows(), m.cols()), (2, 2));
        assert_eq!(m.as_slice(), &[1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_unpad_to_empty() {
        let mut m = sample();
        m.unpad(2, 0).unwrap();
        assert_eq!((m.rows(), m.cols()), (0, 3));
        assert!(m.is_empty());
    }

    #[test]
    fn test_unpad_too_far() {
        let mut m = sample();
        let err = m.unpad(0, 4).unwrap_err();
        assert!(matches!(err, MatrixError::TrimOutOfBounds { .. }));
        assert!(err.is_index_error());
        assert_eq!(m, sample());
    }

    #[test]
    fn test_take_leaves_empty_matrix() {
        let mut m = sample();
        let moved = std::mem::take(&mut m);
        assert_eq!(moved, sample());
        assert_eq!((m.rows(), m.cols()), (0, 0));
        assert!(m.is_empty());
    }

    #[test]
    fn test_equality_is_exact() {
        let a = sample();
        let mut b = sample();
        assert_eq!(a, b);
        b[(0, 0)] += 1e-12;
        assert_ne!(a, b);
        assert_ne!(
            DenseMatrix::new(2, 3),
            DenseMatrix::new(3, 2),
        );
    }

    #[test]
    fn test_display() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 2.0]]).unwrap();
        assert_eq!(m.to_string(), "DenseMatrix 1x2\n[1, 2]\n");
    }
}
