//! Body measurements.

use crate::error::Result;
use crate::params::{load_section, parse_section, require_positive};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Body measurements (centimeters), the `body:` section of a body file.
///
/// Only the measurements used by garment placement are typed; the rest are
/// kept as loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyParameters {
    /// Full body height.
    pub height: f64,
    /// Head length, top of the head to the chin.
    pub head_l: f64,
    /// Chin to waist distance.
    pub waist_line: f64,
    /// Waist to hip line distance.
    pub hips_line: f64,
    /// Hip line to crotch distance.
    pub crotch_hip_diff: f64,
    /// Other measurements.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl BodyParameters {
    /// Load the `body:` section of a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let body: Self = load_section(path, "body")?;
        body.validate()?;
        Ok(body)
    }

    /// Parse the `body:` section of a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let body: Self = parse_section(text, "body")?;
        body.validate()?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        require_positive("body.height", self.height)?;
        require_positive("body.head_l", self.head_l)?;
        require_positive("body.waist_line", self.waist_line)?;
        require_positive("body.hips_line", self.hips_line)?;
        require_positive("body.crotch_hip_diff", self.crotch_hip_diff)?;
        Ok(())
    }

    /// Height of the waist above the floor.
    pub fn waist_level(&self) -> f64 {
        self.height - self.head_l - self.waist_line
    }

    /// Crotch to floor distance.
    pub fn leg_length(&self) -> f64 {
        self.waist_level() - self.hips_line - self.crotch_hip_diff
    }

    /// Look up an untyped measurement.
    pub fn measurement(&self, name: &str) -> Option<f64> {
        self.extra.get(name).and_then(serde_yaml::Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PatternError;

    const BODY: &str = "
body:
  height: 172
  head_l: 22
  waist_line: 44
  hips_line: 22
  crotch_hip_diff: 8
  bust: 96.5
";

    #[test]
    fn test_derived_levels() {
        let body = BodyParameters::from_yaml_str(BODY).unwrap();
        assert_eq!(body.waist_level(), 106.0);
        assert_eq!(body.leg_length(), 76.0);
        assert_eq!(body.measurement("bust"), Some(96.5));
        assert_eq!(body.measurement("neck_w"), None);
    }

    #[test]
    fn test_missing_measurement_is_parse_error() {
        let err = BodyParameters::from_yaml_str("body:\n  height: 172\n").unwrap_err();
        assert!(matches!(err, PatternError::Yaml { .. }));
        assert_eq!(err.code_value(), 3);
    }

    #[test]
    fn test_non_positive_measurement() {
        let text = BODY.replace("head_l: 22", "head_l: -1");
        let err = BodyParameters::from_yaml_str(&text).unwrap_err();
        assert!(matches!(err, PatternError::InvalidValue { .. }));
    }
}
