//! # mat5-reader
//!
//! A reader for MATLAB Level-5 MAT-files (`.mat`, versions 5 through 7).
//! Decodes numeric, character, sparse and cell matrices, opaque (class 17)
//! objects, bare numeric and text elements and zlib-compressed variables
//! into an owned tree of typed arrays.
//!
//! Struct, object and function-handle matrices are rejected with
//! [`MatError::UnsupportedMatrixClass`]. HDF5-based v7.3 files are not MAT
//! Level-5 files and fail at the header.
pub mod mat;

// Re-export the main types for convenience
pub use mat::{
    MatError,
    MatFile,
    Result,
    types::{
        array::{
            Array, ArrayData, CellMatrix, Matrix, MatrixData, NumericData, NumericMatrix,
            OpaqueMatrix, SparseMatrix,
        },
        element::MatElement,
        models::{
            ArrayFlags, DataType, ElementKind, Endianness, MatHeader, MatVersion, MatrixClass,
            ReadOptions, Tag,
        },
    },
};
