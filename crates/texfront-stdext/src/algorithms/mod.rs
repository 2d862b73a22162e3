//! Algorithms over strings and sequences.

pub mod spellcheck;
pub mod substringsearch;
