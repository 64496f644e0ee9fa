//! Filter operations
//!
//! This module provides the Gaussian blur and its building blocks.

/// Filter kernels
pub mod kernels;

/// Per-pixel convolution along one axis
pub mod convolution;

/// Error types for the filter module.
mod error;
pub use error::BlurError;

/// Parallel gaussian blur
mod gaussian;
pub use gaussian::*;
