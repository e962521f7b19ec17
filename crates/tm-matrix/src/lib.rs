//! `tm-matrix` - Dense f64 matrix multiplication with interchangeable strategies.
//!
//! This crate provides:
//! - A row-major `DenseMatrix` with padding and in-place unpadding
//! - `Block` accumulators and the `Tiler` staging engine for cache blocking
//! - Three strategies: `multiply_naive`, `multiply_vendor`, `multiply_tiled`
//! - A `GemmBackend` trait for pluggable vendor GEMM (matrixmultiply, CBLAS)
//!
//! All strategies are synchronous and allocate a fresh result. Nothing here is
//! shared between calls, so independent multiplications can run on separate
//! threads without locking.

pub mod backend;
pub mod block;
#[cfg(feature = "cblas")]
pub mod blas;
pub mod cpu;
pub mod error;
pub mod matrix;
pub mod multiply;
pub mod tiler;

// Re-export primary types at the crate root for convenience.
pub use backend::{GemmBackend, GemmDims};
pub use block::Block;
#[cfg(feature = "cblas")]
pub use blas::CblasBackend;
pub use cpu::MatrixMultiplyBackend;
pub use error::{MatrixError, Result};
pub use matrix::DenseMatrix;
pub use multiply::{
    default_backend, multiply, multiply_naive, multiply_tiled, multiply_vendor,
    multiply_vendor_with, validate_multiplication, Strategy, DEFAULT_TILE_SIZE,
};
pub use tiler::Tiler;
