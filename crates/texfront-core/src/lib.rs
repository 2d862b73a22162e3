//! Numeric types shared by the texfront crates.
//!
//! TeX does all of its dimension arithmetic in fixed point, and the rounding
//! it performs is visible in typeset output. The algorithms here are Knuth's,
//! reproduced exactly.

mod glue;
mod scaled;
mod unit;

pub use glue::{Glue, GlueOrder};
pub use scaled::{OverflowError, Scaled};
pub use unit::ScaledUnit;
