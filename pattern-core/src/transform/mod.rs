//! Pattern transformations applied during assembly.

mod stitching;

pub use stitching::{breakpoints, resolve_stitches};
