//! Core definitions shared by all versedex-* crates: the error type, the result
//! alias and the argument/data verification macros.

pub mod error;
pub mod result;

pub use result::Result;
