//! Panel definition: a named 2D cloth piece placed in 3D.

use crate::config::{EPS, MIN_EDGE_LENGTH};
use crate::error::{PatternError, Result};
use crate::geometry::{segments_intersect, Edge, EdgeId, EdgeSequence};
use crate::model::Interface;
use nalgebra::{Point2, Point3, Rotation3, Vector2, Vector3};
use std::collections::BTreeMap;

/// A single cloth piece.
///
/// The outline is a closed edge loop in panel space, wound clockwise so the
/// panel interior lies to the right of every edge.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    /// Unique panel name.
    pub name: String,
    /// 3D placement of the panel origin.
    pub translation: Vector3<f64>,
    /// Euler angles (XYZ, degrees).
    pub rotation: Vector3<f64>,
    /// Outline.
    pub edges: EdgeSequence,
    /// Named edge subsets for stitching.
    pub interfaces: BTreeMap<String, Interface>,
}

/// Result of cutting a dart into an edge.
#[derive(Debug, Clone)]
pub struct DartCut {
    /// Replacement for the edge, dart sides included.
    pub edges: EdgeSequence,
    /// The edge parts without the dart sides, for interfaces.
    pub interface_edges: EdgeSequence,
}

impl Panel {
    /// Create a panel from its outline.
    pub fn new(name: impl Into<String>, edges: EdgeSequence) -> Self {
        Self {
            name: name.into(),
            edges,
            ..Default::default()
        }
    }

    /// Look up a named interface.
    pub fn interface(&self, name: &str) -> Result<&Interface> {
        self.interfaces
            .get(name)
            .ok_or_else(|| PatternError::InterfaceNotFound {
                component: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Move the panel in 3D.
    pub fn translate_by(&mut self, offset: Vector3<f64>) -> &mut Self {
        self.translation += offset;
        self
    }

    /// Rotation matrix of the panel placement.
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        )
    }

    /// Position of a panel-space point in the world.
    pub fn world_point(&self, p: Point2<f64>) -> Point3<f64> {
        Point3::from(self.rotation_matrix() * Vector3::new(p.x, p.y, 0.0) + self.translation)
    }

    /// Move the panel-space origin to `point`.
    ///
    /// With `replicate_placement` the translation is adjusted so the panel
    /// stays where it was in the world.
    pub fn set_pivot(&mut self, point: Point2<f64>, replicate_placement: bool) {
        self.edges.translate(-point.coords);
        if replicate_placement {
            self.translation += self.rotation_matrix() * Vector3::new(point.x, point.y, 0.0);
        }
    }

    /// Mirror the panel across the world YZ plane.
    ///
    /// Local geometry is reflected and the loop reversed so the winding stays
    /// clockwise. Edge ids are kept and the panel's interfaces still walk
    /// the mirrored edges from the mirrored start.
    pub fn mirror(&mut self) {
        self.edges.reflect_x();
        self.edges.reverse();
        for interface in self.interfaces.values_mut() {
            interface.follow_mirrored(|panel| panel == self.name);
        }
        self.translation.x = -self.translation.x;
        self.rotation.y = -self.rotation.y;
        self.rotation.z = -self.rotation.z;
    }

    /// Height of the panel outline.
    pub fn length(&self) -> f64 {
        let (_, min_y, _, max_y) = self.edges.bounding_box();
        max_y - min_y
    }

    /// Width of the outline at height `level` (panel space), zero if the
    /// level misses the panel.
    pub fn width_at(&self, level: f64) -> f64 {
        let mut xs = Vec::new();
        for edge in &self.edges {
            for w in edge.polyline().windows(2) {
                let (a, b) = (w[0], w[1]);
                if (a.y - level) * (b.y - level) <= 0.0 && (a.y - b.y).abs() > EPS {
                    let t = (level - a.y) / (b.y - a.y);
                    xs.push(a.x + t * (b.x - a.x));
                }
            }
        }
        let min = xs.iter().copied().fold(f64::MAX, f64::min);
        let max = xs.iter().copied().fold(f64::MIN, f64::max);
        if xs.is_empty() {
            0.0
        } else {
            max - min
        }
    }

    /// Check if the outline crosses itself.
    pub fn is_self_intersecting(&self) -> bool {
        let segments: Vec<(usize, Point2<f64>, Point2<f64>)> = self
            .edges
            .iter()
            .enumerate()
            .flat_map(|(i, e)| {
                e.polyline()
                    .windows(2)
                    .map(|w| (i, w[0], w[1]))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (k, &(ei, a0, a1)) in segments.iter().enumerate() {
            for &(ej, b0, b1) in &segments[k + 1..] {
                if ei != ej && segments_intersect(a0, a1, b0, b1) {
                    return true;
                }
            }
        }
        false
    }

    /// Cut a dart into the edge `edge_id`.
    ///
    /// The dart opening is centred `offset` along the edge (arc length from
    /// its start) and as wide as the dart shape. The apex points to the right
    /// of the edge (the interior of a clockwise loop) when `right` is set.
    /// The panel is left untouched; substitute the returned edges. Dart
    /// sides are straight.
    pub fn add_dart(
        &self,
        dart: &EdgeSequence,
        edge_id: EdgeId,
        offset: f64,
        right: bool,
    ) -> Result<DartCut> {
        let edge = self
            .edges
            .get(edge_id)
            .ok_or_else(|| PatternError::EdgeNotFound {
                panel: self.name.clone(),
                edge: edge_id.value(),
            })?;
        cut_dart(edge, dart, offset, right)
    }

    /// Replace an edge by its two halves split at parameter `t`.
    ///
    /// Panel interfaces follow the split. Returns the ids of the parts in
    /// edge direction.
    pub fn split_edge(&mut self, id: EdgeId, t: f64) -> Result<(EdgeId, EdgeId)> {
        let edge = self
            .edges
            .get(id)
            .ok_or_else(|| PatternError::EdgeNotFound {
                panel: self.name.clone(),
                edge: id.value(),
            })?;
        let (first, second) = edge.split_at(t);
        let parts = (first.id(), second.id());
        self.edges
            .substitute(id, EdgeSequence::new(vec![first, second]))?;
        for interface in self.interfaces.values_mut() {
            interface.substitute(&self.name, id, &[parts.0, parts.1]);
        }
        Ok(parts)
    }
}

/// Cut a dart opening out of `edge` and fit the dart shape into it.
pub fn cut_dart(edge: &Edge, dart: &EdgeSequence, offset: f64, right: bool) -> Result<DartCut> {
    let (first, last) = match (dart.edges().first(), dart.edges().last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(PatternError::geometry("empty dart shape")),
    };
    let dart_width = (last.end - first.start).norm();
    let length = edge.length();
    let open_start = offset - dart_width / 2.0;
    let open_end = offset + dart_width / 2.0;
    if dart_width < MIN_EDGE_LENGTH || open_start < MIN_EDGE_LENGTH || open_end > length - MIN_EDGE_LENGTH {
        return Err(PatternError::DartOutOfBounds {
            width: dart_width,
            offset,
            length,
        });
    }

    let (left, rest) = edge.split_at_length(open_start);
    let (_, right_part) = rest.split_at_length(open_end - open_start);

    // Dart frame: x along the opening chord, -y toward the panel interior
    let p = left.end;
    let q = right_part.start;
    let chord = q - p;
    let u = chord / chord.norm();
    let inward = if right {
        Vector2::new(u.y, -u.x)
    } else {
        Vector2::new(-u.y, u.x)
    };
    let scale = chord.norm() / dart_width;
    let dart_u = (last.end - first.start) / dart_width;
    let dart_v = Vector2::new(-dart_u.y, dart_u.x);
    let origin = first.start;

    let mut dart_edges: Vec<Edge> = dart
        .iter()
        .map(|e| {
            Edge::line(e.start, e.end).map_points(|pt| {
                let local = pt - origin;
                let x = local.dot(&dart_u);
                let y = local.dot(&dart_v);
                p + u * (x * scale) - inward * y
            })
        })
        .collect();
    // Snap the dart ends onto the opening to keep the loop exactly chained
    if let Some(e) = dart_edges.first_mut() {
        e.start = p;
    }
    if let Some(e) = dart_edges.last_mut() {
        e.end = q;
    }

    let mut edges = EdgeSequence::new(vec![left.clone()]);
    edges.extend(EdgeSequence::new(dart_edges));
    edges.push(right_part.clone());

    Ok(DartCut {
        edges,
        interface_edges: EdgeSequence::new(vec![left, right_part]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;

    fn rect(name: &str) -> Panel {
        // Clockwise 10 x 20 rectangle, top edge runs left to right
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(0.0, 20.0), pt(10.0, 20.0), pt(10.0, 0.0)],
        )
        .close_loop();
        Panel::new(name, edges)
    }

    #[test]
    fn test_dart_cut_geometry() {
        let panel = rect("p");
        let top = panel.edges.edges()[1].id();
        let dart = EdgeSequence::dart_shape(2.0, 5.0);
        let cut = panel.add_dart(&dart, top, 4.0, true).unwrap();

        assert_eq!(cut.edges.len(), 4);
        assert!(cut.edges.is_chained());
        assert_eq!(cut.interface_edges.len(), 2);

        let sides = &cut.edges.edges()[1..3];
        assert!((sides[0].length() - sides[1].length()).abs() < 1e-9);
        // Apex points into the panel (downwards from the top edge)
        assert!((sides[0].end - pt(4.0, 15.0)).norm() < 1e-9);
        assert!((cut.interface_edges.length() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_dart_substitution_keeps_loop_closed() {
        let mut panel = rect("p");
        let top = panel.edges.edges()[1].id();
        let cut = panel
            .add_dart(&EdgeSequence::dart_shape(2.0, 5.0), top, 4.0, true)
            .unwrap();
        panel.edges.substitute(top, cut.edges).unwrap();
        assert_eq!(panel.edges.len(), 7);
        assert!(panel.edges.is_closed());
        assert!(!panel.is_self_intersecting());
    }

    #[test]
    fn test_dart_out_of_bounds() {
        let panel = rect("p");
        let top = panel.edges.edges()[1].id();
        let err = panel
            .add_dart(&EdgeSequence::dart_shape(4.0, 5.0), top, 9.0, true)
            .unwrap_err();
        assert!(matches!(err, PatternError::DartOutOfBounds { .. }));
    }

    #[test]
    fn test_mirror_keeps_clockwise_winding() {
        let mut panel = rect("p");
        panel.translate_by(Vector3::new(5.0, 0.0, 3.0));
        panel.rotation = Vector3::new(0.0, 30.0, 10.0);
        let area = panel.edges.signed_area();

        panel.mirror();
        assert!(panel.edges.is_closed());
        assert!((panel.edges.signed_area() - area).abs() < 1e-9);
        assert_eq!(panel.translation, Vector3::new(-5.0, 0.0, 3.0));
        assert_eq!(panel.rotation, Vector3::new(0.0, -30.0, -10.0));
    }

    #[test]
    fn test_set_pivot() {
        let mut panel = rect("p");
        let before = panel.world_point(panel.edges.edges()[2].start);
        panel.set_pivot(pt(10.0, 20.0), true);
        assert_eq!(panel.edges.edges()[2].start, pt(0.0, 0.0));
        let after = panel.world_point(panel.edges.edges()[2].start);
        assert!((before - after).norm() < 1e-9);

        panel.set_pivot(pt(-10.0, 0.0), false);
        assert_eq!(panel.translation, Vector3::new(10.0, 20.0, 0.0));
    }

    #[test]
    fn test_split_edge_updates_interfaces() {
        let mut panel = rect("p");
        let top = panel.edges.edges()[1].id();
        panel
            .interfaces
            .insert("top".into(), Interface::new("p", [top]));
        let (a, b) = panel.split_edge(top, 0.25).unwrap();
        assert_eq!(panel.edges.len(), 5);
        let ids: Vec<EdgeId> = panel.interfaces["top"]
            .edges()
            .iter()
            .map(|e| e.edge)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_width_at_and_length() {
        let panel = rect("p");
        assert!((panel.width_at(10.0) - 10.0).abs() < 1e-9);
        assert_eq!(panel.width_at(30.0), 0.0);
        assert!((panel.length() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersection() {
        // Bow-tie outline
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 10.0)],
        )
        .close_loop();
        assert!(Panel::new("bow", edges).is_self_intersecting());
        assert!(!rect("p").is_self_intersecting());
    }
}
