//! Data structures and algorithms used by the texfront pipeline that are not specific to TeX.

pub mod algorithms;
pub mod collections;
pub mod color;
