mod error;
mod types;

pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use tm_matrix::DenseMatrix;

/// Execute a closure that returns a `TmStatus`, catching any panics
/// and converting them into `TmStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> TmStatus + std::panic::UnwindSafe>(f: F) -> TmStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            TmStatus::ErrorInternal
        }
    }
}

fn null_argument() -> TmStatus {
    set_last_error("null argument".to_string());
    TmStatus::ErrorInvalidArgument
}

/// Hand `matrix` to the caller through `out`.
///
/// # Safety
/// `out` must be non-null and writable.
unsafe fn emit(matrix: DenseMatrix, out: *mut *mut TmMatrix) -> TmStatus {
    *out = Box::into_raw(Box::new(TmMatrix::new(matrix)));
    TmStatus::Ok
}

/// Create a zero-filled `rows x cols` matrix.
///
/// On success, writes a heap-allocated `TmMatrix` pointer into `*out`.
/// The caller must later call `tm_matrix_destroy` to free it.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_create(
    rows: usize,
    cols: usize,
    out: *mut *mut TmMatrix,
) -> TmStatus {
    catch_panic(|| {
        if out.is_null() {
            return null_argument();
        }
        match DenseMatrix::try_new(rows, cols) {
            Ok(m) => unsafe { emit(m, out) },
            Err(e) => fail(e),
        }
    })
}

/// Create a matrix by copying `len` row-major values from `data`.
///
/// `len` must equal `rows * cols`. `data` may be null only when `len` is 0.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_from_data(
    rows: usize,
    cols: usize,
    data: *const f64,
    len: usize,
    out: *mut *mut TmMatrix,
) -> TmStatus {
    catch_panic(|| {
        if out.is_null() || (data.is_null() && len > 0) {
            return null_argument();
        }
        let values = if len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }.to_vec()
        };
        match DenseMatrix::from_vec(rows, cols, values) {
            Ok(m) => unsafe { emit(m, out) },
            Err(e) => fail(e),
        }
    })
}

/// Destroy a matrix previously returned by this library.
///
/// Passing a null pointer is a no-op and returns `TmStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_destroy(matrix: *mut TmMatrix) -> TmStatus {
    if matrix.is_null() {
        return TmStatus::Ok;
    }
    drop(Box::from_raw(matrix));
    TmStatus::Ok
}

/// Row count, or 0 for a null handle.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_rows(matrix: *const TmMatrix) -> usize {
    matrix.as_ref().map_or(0, |m| m.inner.rows())
}

/// Column count, or 0 for a null handle.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_cols(matrix: *const TmMatrix) -> usize {
    matrix.as_ref().map_or(0, |m| m.inner.cols())
}

/// Read element `(row, col)` into `*value`.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_get(
    matrix: *const TmMatrix,
    row: usize,
    col: usize,
    value: *mut f64,
) -> TmStatus {
    catch_panic(|| {
        if matrix.is_null() || value.is_null() {
            return null_argument();
        }
        let m = unsafe { &*matrix };
        match m.inner.get(row, col) {
            Ok(v) => {
                unsafe { *value = v };
                TmStatus::Ok
            }
            Err(e) => fail(e),
        }
    })
}

/// Write `value` to element `(row, col)`.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_set(
    matrix: *mut TmMatrix,
    row: usize,
    col: usize,
    value: f64,
) -> TmStatus {
    catch_panic(|| {
        if matrix.is_null() {
            return null_argument();
        }
        let m = unsafe { &mut *matrix };
        match m.inner.set(row, col, value) {
            Ok(()) => TmStatus::Ok,
            Err(e) => fail(e),
        }
    })
}

/// Pointer to the `rows * cols` row-major buffer, valid until the matrix is
/// destroyed. Returns null for a null handle.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_data(matrix: *mut TmMatrix) -> *mut f64 {
    match matrix.as_mut() {
        Some(m) => m.inner.as_mut_slice().as_mut_ptr(),
        None => std::ptr::null_mut(),
    }
}

/// Exact equality: same shape and element-wise equal buffers. Null handles
/// compare unequal to everything.
#[no_mangle]
pub unsafe extern "C" fn tm_matrix_equal(a: *const TmMatrix, b: *const TmMatrix) -> bool {
    match (a.as_ref(), b.as_ref()) {
        (Some(a), Some(b)) => a.inner == b.inner,
        _ => false,
    }
}

/// Multiply `a @ b` with the selected strategy.
///
/// `tile_size` is only read for `TmStrategy::Tiled` and must be positive.
/// Operand shapes are checked first, so a mismatched pair reports
/// `ErrorDimensionMismatch` whatever the tile size. On success, writes a new matrix into `*out`; on failure `*out` is left
/// untouched.
#[no_mangle]
pub unsafe extern "C" fn tm_multiply(
    a: *const TmMatrix,
    b: *const TmMatrix,
    strategy: TmStrategy,
    tile_size: i64,
    out: *mut *mut TmMatrix,
) -> TmStatus {
    catch_panic(|| {
        if a.is_null() || b.is_null() || out.is_null() {
            return null_argument();
        }
        let (a, b) = unsafe { (&*a, &*b) };
        let result = tm_matrix::validate_multiplication(&a.inner, &b.inner)
            .and_then(|()| strategy.resolve(tile_size))
            .and_then(|s| tm_matrix::multiply(&a.inner, &b.inner, s));
        match result {
            Ok(m) => unsafe { emit(m, out) },
            Err(e) => fail(e),
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `tm_free_string`.
#[no_mangle]
pub extern "C" fn tm_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `tm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn tm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
