//! Flattened garment pattern: placed panels plus resolved stitches.

use crate::model::{EdgeLookup, Panel};
use serde::{Deserialize, Serialize};

/// One side of a stitch: an edge addressed by its index in a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchSide {
    pub panel: String,
    pub edge: usize,
}

/// Which ends of the two stitched edges are sewn together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StitchOrientation {
    /// Start to start, end to end.
    Same,
    /// Start of `a` to end of `b`.
    Reversed,
}

/// Stitch between two edges, serialized as `[side, side, orientation]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StitchRecord", into = "StitchRecord")]
pub struct Stitch {
    pub a: StitchSide,
    pub b: StitchSide,
    pub orientation: StitchOrientation,
}

#[derive(Serialize, Deserialize)]
struct StitchRecord(StitchSide, StitchSide, StitchOrientation);

impl From<StitchRecord> for Stitch {
    fn from(StitchRecord(a, b, orientation): StitchRecord) -> Self {
        Self { a, b, orientation }
    }
}

impl From<Stitch> for StitchRecord {
    fn from(s: Stitch) -> Self {
        StitchRecord(s.a, s.b, s.orientation)
    }
}

/// Assembled garment.
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    /// Garment name.
    pub name: String,
    /// Panels in assembly order.
    pub panels: Vec<Panel>,
    /// Edge-to-edge stitches.
    pub stitches: Vec<Stitch>,
}

impl Pattern {
    /// Panel names in assembly order.
    pub fn panel_order(&self) -> Vec<&str> {
        self.panels.iter().map(|p| p.name.as_str()).collect()
    }

    /// Find a panel by name.
    pub fn find_panel(&self, name: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.name == name)
    }

    /// Names of panels whose outline crosses itself.
    pub fn self_intersecting_panels(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter(|p| p.is_self_intersecting())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Check if any panel outline crosses itself.
    pub fn is_self_intersecting(&self) -> bool {
        self.panels.iter().any(Panel::is_self_intersecting)
    }
}

impl EdgeLookup for Pattern {
    fn lookup_panel(&self, name: &str) -> Option<&Panel> {
        self.find_panel(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stitch_serializes_as_triple() {
        let stitch = Stitch {
            a: StitchSide {
                panel: "front".into(),
                edge: 1,
            },
            b: StitchSide {
                panel: "back".into(),
                edge: 3,
            },
            orientation: StitchOrientation::Reversed,
        };
        let json = serde_json::to_string(&stitch).unwrap();
        assert_eq!(
            json,
            r#"[{"panel":"front","edge":1},{"panel":"back","edge":3},"reversed"]"#
        );
        let back: Stitch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stitch);
    }
}
