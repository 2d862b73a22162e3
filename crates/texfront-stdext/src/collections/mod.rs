//! Containers with semantics that the standard library does not provide.

pub mod groupingmap;
pub mod interner;
