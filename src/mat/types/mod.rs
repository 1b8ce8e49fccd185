//! Foundational data structures, error types and numeric element traits.

pub mod array;
pub mod element;
pub mod error;
pub mod models;
