//! Structural checks on assembled patterns: closed outlines, usable edges,
//! stitches that point at real edges of similar length.

use crate::config::{MIN_EDGE_LENGTH, STITCH_LENGTH_WARN_RATIO};
use crate::error::{PatternError, Result};
use crate::model::{Panel, Pattern, StitchSide};
use std::collections::BTreeMap;

/// Findings collected while checking a pattern.
///
/// Errors make the pattern unusable for simulation; warnings are logged.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// False once any error was recorded.
    pub passed: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::passing()
    }
}

impl ValidationResult {
    /// No findings yet.
    pub fn passing() -> Self {
        Self {
            passed: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record an error; the result no longer passes.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Take over the findings of a sub-check.
    pub fn absorb(&mut self, other: ValidationResult) {
        self.passed &= other.passed;
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}

/// Validate panels and stitches of a pattern.
pub fn validate_pattern(pattern: &Pattern) -> ValidationResult {
    let mut result = ValidationResult::passing();

    if pattern.panels.is_empty() {
        result.fail(format!("Pattern {}: No panels", pattern.name));
        return result;
    }

    for panel in &pattern.panels {
        result.absorb(validate_panel(panel));
    }

    if pattern.stitches.is_empty() {
        result.warn(format!("Pattern {}: No stitches defined", pattern.name));
    }

    let mut uses: BTreeMap<(&str, usize), usize> = BTreeMap::new();
    for (idx, stitch) in pattern.stitches.iter().enumerate() {
        let a = stitch_edge_length(pattern, &stitch.a);
        let b = stitch_edge_length(pattern, &stitch.b);
        for (side, length) in [(&stitch.a, a), (&stitch.b, b)] {
            if length.is_none() {
                result.fail(format!(
                    "Stitch {}: Edge {} of panel {} not found",
                    idx + 1,
                    side.edge,
                    side.panel
                ));
            }
            *uses.entry((side.panel.as_str(), side.edge)).or_default() += 1;
        }

        if let (Some(a), Some(b)) = (a, b) {
            let longest = a.max(b);
            if longest > 0.0 && (a - b).abs() / longest > STITCH_LENGTH_WARN_RATIO {
                result.warn(format!(
                    "Stitch {}: Edge lengths differ ({:.2} vs {:.2})",
                    idx + 1,
                    a,
                    b
                ));
            }
        }
    }

    for ((panel, edge), count) in uses {
        if count > 1 {
            result.warn(format!(
                "Panel {}, Edge {}: Stitched {} times",
                panel, edge, count
            ));
        }
    }

    result
}

/// Validate the outline of a single panel.
pub fn validate_panel(panel: &Panel) -> ValidationResult {
    let mut result = ValidationResult::passing();

    if panel.edges.len() < 3 {
        result.fail(format!(
            "Panel {}: Needs at least 3 edges, has {}",
            panel.name,
            panel.edges.len()
        ));
    }

    if !panel.edges.is_chained() {
        result.fail(format!("Panel {}: Edges are not chained", panel.name));
    } else if !panel.edges.is_closed() {
        result.fail(format!("Panel {}: Outline is not closed", panel.name));
    }

    for (idx, edge) in panel.edges.iter().enumerate() {
        if edge.length() < MIN_EDGE_LENGTH {
            result.fail(format!(
                "Panel {}, Edge {}: Degenerate edge (length {:.4})",
                panel.name,
                idx,
                edge.length()
            ));
        }
    }

    if panel.is_self_intersecting() {
        result.warn(format!("Panel {}: Outline is self-intersecting", panel.name));
    }

    result
}

fn stitch_edge_length(pattern: &Pattern, side: &StitchSide) -> Option<f64> {
    pattern
        .find_panel(&side.panel)?
        .edges
        .edges()
        .get(side.edge)
        .map(|e| e.length())
}

/// Fail with the collected errors (used by `--validate`).
pub fn quick_validate(pattern: &Pattern) -> Result<()> {
    let result = validate_pattern(pattern);

    if !result.passed {
        return Err(PatternError::InvalidGeometry {
            message: result.errors.join("; "),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{pt, Edge, EdgeSequence};
    use crate::model::{Stitch, StitchOrientation};

    fn square(name: &str, size: f64) -> Panel {
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(0.0, size), pt(size, size), pt(size, 0.0)],
        )
        .close_loop();
        Panel::new(name, edges)
    }

    fn stitch(a: (&str, usize), b: (&str, usize)) -> Stitch {
        Stitch {
            a: StitchSide {
                panel: a.0.into(),
                edge: a.1,
            },
            b: StitchSide {
                panel: b.0.into(),
                edge: b.1,
            },
            orientation: StitchOrientation::Reversed,
        }
    }

    fn pattern(panels: Vec<Panel>, stitches: Vec<Stitch>) -> Pattern {
        Pattern {
            name: "test".into(),
            panels,
            stitches,
        }
    }

    // ==================== ValidationResult tests ====================

    #[test]
    fn test_fresh_result_passes() {
        let result = ValidationResult::default();
        assert_eq!(result, ValidationResult::passing());
        assert!(result.passed);
        assert!(result.errors.is_empty() && result.warnings.is_empty());
    }

    #[test]
    fn test_warnings_keep_result_passing() {
        let mut result = ValidationResult::passing();
        result.warn("Panel a: Outline is self-intersecting");
        assert!(result.passed);
        result.fail("Panel a: Outline is not closed");
        assert!(!result.passed);
        assert_eq!(result.errors, vec!["Panel a: Outline is not closed"]);
    }

    #[test]
    fn test_absorb_sub_check() {
        let mut pattern_check = ValidationResult::passing();
        pattern_check.warn("Pattern p: No stitches defined");

        let mut panel_check = ValidationResult::passing();
        panel_check.fail("Panel a: Edges are not chained");
        panel_check.warn("Panel a: Outline is self-intersecting");

        pattern_check.absorb(panel_check);
        assert!(!pattern_check.passed);
        assert_eq!(pattern_check.warnings.len(), 2);
        assert_eq!(pattern_check.errors.len(), 1);

        pattern_check.absorb(ValidationResult::passing());
        assert!(!pattern_check.passed);
    }

    // ==================== validate_panel tests ====================

    #[test]
    fn test_validate_panel_valid() {
        let result = validate_panel(&square("a", 10.0));
        assert!(result.passed);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_panel_too_few_edges() {
        let edges = EdgeSequence::new(vec![
            Edge::line(pt(0.0, 0.0), pt(0.0, 10.0)),
            Edge::line(pt(0.0, 10.0), pt(0.0, 0.0)),
        ]);
        let result = validate_panel(&Panel::new("thin", edges));
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.contains("at least 3 edges")));
    }

    #[test]
    fn test_validate_panel_open_outline() {
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0)],
        );
        let result = validate_panel(&Panel::new("open", edges));
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.contains("not closed")));
    }

    #[test]
    fn test_validate_panel_unchained() {
        let edges = EdgeSequence::new(vec![
            Edge::line(pt(0.0, 0.0), pt(0.0, 10.0)),
            Edge::line(pt(1.0, 10.0), pt(10.0, 0.0)),
            Edge::line(pt(10.0, 0.0), pt(0.0, 0.0)),
        ]);
        let result = validate_panel(&Panel::new("gap", edges));
        assert!(result.errors.iter().any(|e| e.contains("not chained")));
    }

    #[test]
    fn test_validate_panel_degenerate_edge() {
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(0.0, 10.0), pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0)],
        )
        .close_loop();
        let result = validate_panel(&Panel::new("dup", edges));
        assert!(!result.passed);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("Edge 1: Degenerate")));
    }

    #[test]
    fn test_validate_panel_self_intersection_warning() {
        // Bow tie
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 10.0)],
        )
        .close_loop();
        let result = validate_panel(&Panel::new("bow", edges));
        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("self-intersecting")));
    }

    // ==================== validate_pattern tests ====================

    #[test]
    fn test_validate_pattern_empty() {
        let result = validate_pattern(&pattern(vec![], vec![]));
        assert!(!result.passed);
        assert!(result.errors[0].contains("No panels"));
    }

    #[test]
    fn test_validate_pattern_no_stitches_warning() {
        let result = validate_pattern(&pattern(vec![square("a", 10.0)], vec![]));
        assert!(result.passed);
        assert!(result.warnings.iter().any(|w| w.contains("No stitches")));
    }

    #[test]
    fn test_validate_pattern_valid_stitch() {
        let p = pattern(
            vec![square("a", 10.0), square("b", 10.0)],
            vec![stitch(("a", 0), ("b", 2))],
        );
        let result = validate_pattern(&p);
        assert!(result.passed);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_validate_pattern_unknown_stitch_target() {
        let p = pattern(
            vec![square("a", 10.0)],
            vec![stitch(("a", 0), ("b", 0)), stitch(("a", 1), ("a", 9))],
        );
        let result = validate_pattern(&p);
        assert!(!result.passed);
        assert!(result.errors.iter().any(|e| e.contains("panel b not found")));
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("Edge 9 of panel a not found")));
    }

    #[test]
    fn test_validate_pattern_length_mismatch_warning() {
        let p = pattern(
            vec![square("a", 10.0), square("b", 12.0)],
            vec![stitch(("a", 0), ("b", 0))],
        );
        let result = validate_pattern(&p);
        assert!(result.passed);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("lengths differ (10.00 vs 12.00)")));
    }

    #[test]
    fn test_validate_pattern_edge_stitched_twice() {
        let p = pattern(
            vec![square("a", 10.0), square("b", 10.0)],
            vec![stitch(("a", 0), ("b", 0)), stitch(("a", 0), ("b", 2))],
        );
        let result = validate_pattern(&p);
        assert!(result
            .warnings
            .iter()
            .any(|w| w == "Panel a, Edge 0: Stitched 2 times"));
    }

    // ==================== quick_validate tests ====================

    #[test]
    fn test_quick_validate() {
        assert!(quick_validate(&pattern(vec![square("a", 10.0)], vec![])).is_ok());

        let err = quick_validate(&pattern(vec![], vec![])).unwrap_err();
        assert!(matches!(err, PatternError::InvalidGeometry { .. }));
    }
}
