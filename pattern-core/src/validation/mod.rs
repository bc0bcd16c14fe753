//! Checks run on assembled patterns before serialization.

mod validate;

pub use validate::{quick_validate, validate_panel, validate_pattern, ValidationResult};
