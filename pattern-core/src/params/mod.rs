//! Body measurements and garment design parameters loaded from YAML.

mod body;
mod design;

pub use body::BodyParameters;
pub use design::{CuffDesign, GarmentDesign, MetaDesign, PantsDesign, Param, ShirtDesign};

use crate::error::{PatternError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Load and deserialize one top-level section of a YAML file.
pub(crate) fn load_section<T: DeserializeOwned>(path: &Path, section: &str) -> Result<T> {
    if !path.exists() {
        return Err(PatternError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    parse_section(&text, section).map_err(|err| match err {
        PatternError::Yaml { source, .. } => PatternError::Yaml {
            path: path.to_path_buf(),
            source,
        },
        PatternError::MissingSection { section, .. } => PatternError::MissingSection {
            path: path.to_path_buf(),
            section,
        },
        other => other,
    })
}

/// Deserialize one top-level section of a YAML document.
pub(crate) fn parse_section<T: DeserializeOwned>(text: &str, section: &str) -> Result<T> {
    let yaml_err = |source| PatternError::Yaml {
        path: Default::default(),
        source,
    };
    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(yaml_err)?;
    let value = doc
        .get(section)
        .cloned()
        .ok_or_else(|| PatternError::MissingSection {
            path: Default::default(),
            section: section.to_string(),
        })?;
    serde_yaml::from_value(value).map_err(yaml_err)
}

/// Reject non-positive measurements.
pub(crate) fn require_positive(field: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(PatternError::InvalidValue {
            field: field.to_string(),
            expected: "a positive number".to_string(),
            value: value.to_string(),
        })
    }
}
