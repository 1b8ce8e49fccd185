//! Core MAT-file reader module.
//!
//! - [`types`]: decoded array tree, header/tag models, errors
//! - [`format`]: header, tag, element and matrix parsers
//! - [`codec`]: inflation, byte-order decoding and numeric widening

pub mod codec;
pub mod format;
pub mod reader;
pub mod types;
mod utils;

pub use reader::MatFile;
pub use types::error::{MatError, Result};
