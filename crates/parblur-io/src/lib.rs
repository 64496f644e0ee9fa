#![deny(missing_docs)]
//! Image reading and writing for parblur

/// Error types for the io module.
pub mod error;

/// High-level functions to read and write image files.
pub mod functional;

pub use crate::error::IoError;
