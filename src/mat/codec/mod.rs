//! Codec layer: pure data transformations used by the format parsers.
//!
//! # Submodules
//!
//! - [`compression`][]: zlib inflation of compressed elements
//! - [`numeric`][]: byte-order-aware decoding of numeric and text payloads
//! - [`convert`][]: checked numeric widening between element types

pub mod compression;
pub mod convert;
pub mod numeric;
