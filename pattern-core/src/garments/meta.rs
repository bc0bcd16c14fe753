//! Garment program selection from the design's `meta` section.

use crate::error::{PatternError, Result};
use crate::garments::{Pants, Shirt};
use crate::model::{Component, Pattern};
use crate::params::{BodyParameters, GarmentDesign};
use tracing::{debug, info};

/// Garment combining an optional upper and an optional bottom program.
#[derive(Debug, Clone)]
pub struct MetaGarment {
    pub name: String,
    pub component: Component,
}

impl MetaGarment {
    pub fn new(name: &str, body: &BodyParameters, design: &GarmentDesign) -> Result<Self> {
        let mut component = Component::new(name);

        match design.meta.upper.v.as_deref() {
            Some("Shirt") => {
                let shirt = design.shirt.as_ref().ok_or_else(|| missing("shirt", "Shirt"))?;
                component.subs.push(Shirt::new(body, shirt)?.component);
            }
            Some(other) => {
                return Err(PatternError::UnknownGarment {
                    name: other.to_string(),
                })
            }
            None => debug!("No upper garment"),
        }

        match design.meta.bottom.v.as_deref() {
            Some("Pants") => {
                let pants = design.pants.as_ref().ok_or_else(|| missing("pants", "Pants"))?;
                component.subs.push(Pants::new(body, pants)?.component);
            }
            Some(other) => {
                return Err(PatternError::UnknownGarment {
                    name: other.to_string(),
                })
            }
            None => debug!("No bottom garment"),
        }

        if component.subs.is_empty() {
            return Err(PatternError::InvalidValue {
                field: "design.meta".to_string(),
                expected: "an upper or bottom garment program".to_string(),
                value: "none".to_string(),
            });
        }

        info!(
            "Garment {}: {} panels",
            name,
            component.all_panels().len()
        );
        Ok(Self {
            name: name.to_string(),
            component,
        })
    }

    /// Flatten into a pattern with resolved stitches.
    pub fn assembly(&self) -> Result<Pattern> {
        self.component.assembly()
    }

    /// Check if any panel outline crosses itself.
    pub fn is_self_intersecting(&self) -> bool {
        self.component
            .all_panels()
            .into_iter()
            .any(|p| p.is_self_intersecting())
    }
}

fn missing(section: &str, program: &str) -> PatternError {
    PatternError::InvalidValue {
        field: format!("design.{section}"),
        expected: format!("a {section} section for the {program} program"),
        value: "missing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Param;

    fn body() -> BodyParameters {
        BodyParameters::from_yaml_str(
            "body: {height: 172, head_l: 22, waist_line: 44, hips_line: 22, crotch_hip_diff: 8}",
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_program() {
        let mut design = GarmentDesign::default();
        design.meta.upper = Param::new(Some("Hoodie".to_string()));
        let err = MetaGarment::new("g", &body(), &design).unwrap_err();
        assert!(matches!(err, PatternError::UnknownGarment { ref name } if name == "Hoodie"));
    }

    #[test]
    fn test_missing_section() {
        let mut design = GarmentDesign::default();
        design.meta.bottom = Param::new(Some("Pants".to_string()));
        let err = MetaGarment::new("g", &body(), &design).unwrap_err();
        assert!(err.to_string().contains("design.pants"));
    }

    #[test]
    fn test_empty_selection() {
        let err = MetaGarment::new("g", &body(), &GarmentDesign::default()).unwrap_err();
        assert!(matches!(err, PatternError::InvalidValue { .. }));
    }
}
