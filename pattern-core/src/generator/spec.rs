//! JSON pattern specification.
//!
//! Panels are stored as vertex loops with per-edge curvature in chord-relative
//! coordinates, next to the stitch list and the panel order.

use crate::config::UNITS_IN_METER;
use crate::error::{PatternError, Result};
use crate::geometry::{pt, Edge, EdgeSequence};
use crate::model::{Panel, Pattern, Stitch};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized pattern file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub pattern: PatternBody,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub parameter_order: Vec<String>,
    pub properties: SpecProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternBody {
    pub panels: BTreeMap<String, PanelSpec>,
    pub stitches: Vec<Stitch>,
    pub panel_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub translation: [f64; 3],
    pub rotation: [f64; 3],
    pub vertices: Vec<[f64; 2]>,
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub endpoints: [usize; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<CurvatureSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvatureSpec {
    #[serde(rename = "type")]
    pub kind: CurveKind,
    /// Control points relative to the edge chord.
    pub params: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Quadratic,
    Cubic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecProperties {
    pub curvature_coords: String,
    pub normalize_panel_translation: bool,
    pub normalized_edge_loops: bool,
    pub units_in_meter: u32,
}

impl Default for SpecProperties {
    fn default() -> Self {
        Self {
            curvature_coords: "relative".to_string(),
            normalize_panel_translation: false,
            normalized_edge_loops: true,
            units_in_meter: UNITS_IN_METER,
        }
    }
}

impl PatternSpec {
    /// Build the specification of an assembled pattern.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let panels = pattern
            .panels
            .iter()
            .map(|p| (p.name.clone(), panel_spec(p)))
            .collect();
        Self {
            pattern: PatternBody {
                panels,
                stitches: pattern.stitches.clone(),
                panel_order: pattern
                    .panel_order()
                    .into_iter()
                    .map(String::from)
                    .collect(),
            },
            parameters: BTreeMap::new(),
            parameter_order: Vec::new(),
            properties: SpecProperties::default(),
        }
    }

    /// Rebuild panels and stitches. Interfaces are not stored and come back
    /// empty.
    pub fn to_pattern(&self, name: &str) -> Result<Pattern> {
        let panels = self
            .pattern
            .panel_order
            .iter()
            .map(|panel_name| {
                let spec = self.pattern.panels.get(panel_name).ok_or_else(|| {
                    PatternError::PanelNotFound {
                        name: panel_name.clone(),
                    }
                })?;
                panel_from_spec(panel_name, spec)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Pattern {
            name: name.to_string(),
            panels,
            stitches: self.pattern.stitches.clone(),
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a specification file's contents.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

fn panel_spec(panel: &Panel) -> PanelSpec {
    let n = panel.edges.len();
    let vertices = panel
        .edges
        .vertices()
        .into_iter()
        .map(|v| [v.x, v.y])
        .collect();
    let edges = panel
        .edges
        .iter()
        .enumerate()
        .map(|(i, edge)| {
            let params = edge.relative_control_points();
            let curvature = match params.len() {
                1 => Some(CurveKind::Quadratic),
                2 => Some(CurveKind::Cubic),
                _ => None,
            }
            .map(|kind| CurvatureSpec { kind, params });
            EdgeSpec {
                endpoints: [i, (i + 1) % n],
                curvature,
            }
        })
        .collect();

    PanelSpec {
        translation: panel.translation.into(),
        rotation: panel.rotation.into(),
        vertices,
        edges,
    }
}

fn panel_from_spec(name: &str, spec: &PanelSpec) -> Result<Panel> {
    let vertex = |i: usize| {
        spec.vertices
            .get(i)
            .map(|v| pt(v[0], v[1]))
            .ok_or_else(|| {
                PatternError::geometry(format!("panel {name}: vertex {i} out of range"))
            })
    };
    let edges = spec
        .edges
        .iter()
        .map(|e| {
            let start = vertex(e.endpoints[0])?;
            let end = vertex(e.endpoints[1])?;
            let params = e.curvature.as_ref().map_or(&[][..], |c| c.params.as_slice());
            Ok(Edge::from_relative(start, end, params))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut panel = Panel::new(name, EdgeSequence::new(edges));
    panel.translation = Vector3::from(spec.translation);
    panel.rotation = Vector3::from(spec.rotation);
    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StitchOrientation, StitchSide};

    fn pattern() -> Pattern {
        let edges = EdgeSequence::new(vec![
            Edge::quadratic(pt(0.0, 0.0), pt(-1.0, 5.0), pt(0.0, 10.0)),
            Edge::line(pt(0.0, 10.0), pt(10.0, 10.0)),
            Edge::line(pt(10.0, 10.0), pt(10.0, 0.0)),
        ])
        .close_loop();
        let mut panel = Panel::new("front", edges);
        panel.translate_by(Vector3::new(0.0, 90.0, 30.0));
        Pattern {
            name: "tee".into(),
            panels: vec![panel],
            stitches: vec![Stitch {
                a: StitchSide {
                    panel: "front".into(),
                    edge: 0,
                },
                b: StitchSide {
                    panel: "front".into(),
                    edge: 2,
                },
                orientation: StitchOrientation::Reversed,
            }],
        }
    }

    #[test]
    fn test_panel_spec_layout() {
        let spec = PatternSpec::from_pattern(&pattern());
        let front = &spec.pattern.panels["front"];
        assert_eq!(front.vertices.len(), 4);
        assert_eq!(front.edges[3].endpoints, [3, 0]);
        assert_eq!(front.translation, [0.0, 90.0, 30.0]);

        let curvature = front.edges[0].curvature.as_ref().unwrap();
        assert_eq!(curvature.kind, CurveKind::Quadratic);
        // Control point halfway along the chord, 0.1 chord lengths to its left
        assert!((curvature.params[0][0] - 0.5).abs() < 1e-12);
        assert!((curvature.params[0][1] - 0.1).abs() < 1e-12);
        assert!(front.edges[1].curvature.is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let built = pattern();
        let json = PatternSpec::from_pattern(&built).to_json_string().unwrap();
        assert!(json.contains("\"curvature_coords\": \"relative\""));

        let restored = PatternSpec::from_json_str(&json)
            .unwrap()
            .to_pattern("tee")
            .unwrap();
        assert_eq!(restored.panel_order(), vec!["front"]);
        assert_eq!(restored.stitches, built.stitches);
        let (a, b) = (&restored.panels[0], &built.panels[0]);
        assert_eq!(a.translation, b.translation);
        for (ea, eb) in a.edges.iter().zip(b.edges.iter()) {
            assert!((ea.start - eb.start).norm() < 1e-12);
            assert!((ea.point_at(0.3) - eb.point_at(0.3)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_missing_panel_in_order() {
        let mut spec = PatternSpec::from_pattern(&pattern());
        spec.pattern.panel_order.push("back".into());
        let err = spec.to_pattern("tee").unwrap_err();
        assert!(matches!(err, PatternError::PanelNotFound { .. }));
    }
}
