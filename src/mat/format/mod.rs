//! File format parsing layer for MAT-files.
//!
//! This module bridges raw bytes and the high-level
//! [`MatFile`](crate::mat::reader::MatFile).
//!
//! # Module Organization
//!
//! - [`header`]: parses the fixed 128-byte header and its byte order
//! - [`tag`]: decodes 8-byte element tags (regular and small-element forms)
//! - [`element`]: the recursive element reader (primitive, text, compressed)
//! - `matrix`: matrix elements and their class-specific payloads
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header (128 B) │ ← header::parse()
//! ├─────────────────┤
//! │  Element        │ ← ElementReader::read_array()
//! │   tag + payload │     ├─ primitive / text
//! ├─────────────────┤     ├─ matrix ─┐ (recursive)
//! │  Element        │     └─ compressed ─┘
//! │  ...            │
//! └─────────────────┘
//! ```

pub mod element;
pub mod header;
mod matrix;
pub mod tag;
