//! Edge definition: straight segments and Bezier curves in panel space.

use crate::config::{ARC_LENGTH_MAX_DEPTH, ARC_LENGTH_TOLERANCE, EPS, POLYLINE_SAMPLES};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EDGE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of an edge.
///
/// Transforms (translation, reflection, reversal) keep the id, so interfaces
/// can refer to an edge while its panel is being placed. Splitting produces
/// two new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Allocate a new process-unique id.
    pub fn fresh() -> Self {
        EdgeId(NEXT_EDGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Shape of an edge between its endpoints.
///
/// Control points are absolute panel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Curvature {
    /// Straight segment.
    #[default]
    Straight,
    /// Quadratic Bezier with one control point.
    Quadratic { control: Point2<f64> },
    /// Cubic Bezier with two control points.
    Cubic {
        control1: Point2<f64>,
        control2: Point2<f64>,
    },
}

/// Single panel edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    /// Start point.
    pub start: Point2<f64>,
    /// End point.
    pub end: Point2<f64>,
    /// Curve shape.
    pub curvature: Curvature,
}

impl Edge {
    /// Create a straight edge.
    pub fn line(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            id: EdgeId::fresh(),
            start,
            end,
            curvature: Curvature::Straight,
        }
    }

    /// Create a quadratic Bezier edge.
    pub fn quadratic(start: Point2<f64>, control: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            id: EdgeId::fresh(),
            start,
            end,
            curvature: Curvature::Quadratic { control },
        }
    }

    /// Create a cubic Bezier edge.
    pub fn cubic(
        start: Point2<f64>,
        control1: Point2<f64>,
        control2: Point2<f64>,
        end: Point2<f64>,
    ) -> Self {
        Self {
            id: EdgeId::fresh(),
            start,
            end,
            curvature: Curvature::Cubic { control1, control2 },
        }
    }

    /// Create a curve from control points given in coordinates relative to
    /// the chord (see [`rel_to_abs`]). One point gives a quadratic curve,
    /// two a cubic one, anything else a straight edge.
    pub fn from_relative(start: Point2<f64>, end: Point2<f64>, rel: &[[f64; 2]]) -> Self {
        match rel {
            [c] => Self::quadratic(start, rel_to_abs(start, end, *c), end),
            [c1, c2] => Self::cubic(
                start,
                rel_to_abs(start, end, *c1),
                rel_to_abs(start, end, *c2),
                end,
            ),
            _ => Self::line(start, end),
        }
    }

    /// Edge identity.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Check if this edge is a straight segment.
    pub fn is_straight(&self) -> bool {
        matches!(self.curvature, Curvature::Straight)
    }

    /// Chord vector from start to end.
    pub fn chord(&self) -> Vector2<f64> {
        self.end - self.start
    }

    /// Control polygon: start, control points, end.
    pub fn control_polygon(&self) -> Vec<Point2<f64>> {
        match self.curvature {
            Curvature::Straight => vec![self.start, self.end],
            Curvature::Quadratic { control } => vec![self.start, control, self.end],
            Curvature::Cubic { control1, control2 } => {
                vec![self.start, control1, control2, self.end]
            }
        }
    }

    /// Control points in chord-relative coordinates.
    pub fn relative_control_points(&self) -> Vec<[f64; 2]> {
        match self.curvature {
            Curvature::Straight => Vec::new(),
            Curvature::Quadratic { control } => vec![abs_to_rel(self.start, self.end, control)],
            Curvature::Cubic { control1, control2 } => vec![
                abs_to_rel(self.start, self.end, control1),
                abs_to_rel(self.start, self.end, control2),
            ],
        }
    }

    /// Evaluate the curve at parameter `t` in [0, 1].
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        let (p0, p3) = (self.start.coords, self.end.coords);
        let p = match self.curvature {
            Curvature::Straight => p0 * s + p3 * t,
            Curvature::Quadratic { control } => {
                p0 * (s * s) + control.coords * (2.0 * s * t) + p3 * (t * t)
            }
            Curvature::Cubic { control1, control2 } => {
                p0 * (s * s * s)
                    + control1.coords * (3.0 * s * s * t)
                    + control2.coords * (3.0 * s * t * t)
                    + p3 * (t * t * t)
            }
        };
        Point2::from(p)
    }

    /// First derivative with respect to `t`.
    pub fn derivative_at(&self, t: f64) -> Vector2<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        match self.curvature {
            Curvature::Straight => self.end - self.start,
            Curvature::Quadratic { control } => {
                (control - self.start) * (2.0 * s) + (self.end - control) * (2.0 * t)
            }
            Curvature::Cubic { control1, control2 } => {
                (control1 - self.start) * (3.0 * s * s)
                    + (control2 - control1) * (6.0 * s * t)
                    + (self.end - control2) * (3.0 * t * t)
            }
        }
    }

    /// Second derivative with respect to `t`.
    pub fn second_derivative_at(&self, t: f64) -> Vector2<f64> {
        let t = t.clamp(0.0, 1.0);
        let s = 1.0 - t;
        match self.curvature {
            Curvature::Straight => Vector2::zeros(),
            Curvature::Quadratic { control } => {
                (self.end.coords - control.coords * 2.0 + self.start.coords) * 2.0
            }
            Curvature::Cubic { control1, control2 } => {
                let a = control2.coords - control1.coords * 2.0 + self.start.coords;
                let b = self.end.coords - control2.coords * 2.0 + control1.coords;
                a * (6.0 * s) + b * (6.0 * t)
            }
        }
    }

    /// Unit tangent at parameter `t`.
    ///
    /// Falls back to the chord direction where the derivative vanishes.
    pub fn unit_tangent(&self, t: f64) -> Vector2<f64> {
        let d = self.derivative_at(t);
        let norm = d.norm();
        if norm > EPS {
            return d / norm;
        }
        let chord = self.chord();
        let chord_len = chord.norm();
        if chord_len > EPS {
            chord / chord_len
        } else {
            Vector2::x()
        }
    }

    /// Signed curvature at parameter `t`.
    pub fn curvature_at(&self, t: f64) -> f64 {
        let d = self.derivative_at(t);
        let dd = self.second_derivative_at(t);
        let speed = d.norm();
        if speed < EPS {
            return 0.0;
        }
        (d.x * dd.y - d.y * dd.x) / (speed * speed * speed)
    }

    /// Arc length of the edge.
    pub fn length(&self) -> f64 {
        match self.curvature {
            Curvature::Straight => self.chord().norm(),
            _ => self.arc_length_between(0.0, 1.0),
        }
    }

    /// Arc length between two parameter values.
    pub fn arc_length_between(&self, t0: f64, t1: f64) -> f64 {
        let (a, b) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        if self.is_straight() {
            return self.chord().norm() * (b.clamp(0.0, 1.0) - a.clamp(0.0, 1.0));
        }
        adaptive_arc_length(self, a, b, ARC_LENGTH_TOLERANCE, ARC_LENGTH_MAX_DEPTH)
    }

    /// Parameter `t` at which the arc length from the start equals `length`.
    ///
    /// Clamps to [0, 1] outside the edge.
    pub fn t_at_length(&self, length: f64) -> f64 {
        if length <= 0.0 {
            return 0.0;
        }
        let total = self.length();
        if length >= total {
            return 1.0;
        }
        if self.is_straight() {
            return length / total;
        }

        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..60 {
            let mid = (lo + hi) / 2.0;
            let arc = self.arc_length_between(0.0, mid);
            if (arc - length).abs() < ARC_LENGTH_TOLERANCE {
                return mid;
            }
            if arc < length {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) / 2.0
    }

    /// Point at the given arc length from the start.
    ///
    /// Negative lengths extend the edge backwards along its start tangent,
    /// lengths past the end extend it along the end tangent.
    pub fn evaluate_at_length(&self, length: f64) -> Point2<f64> {
        if length < 0.0 {
            return self.start + self.unit_tangent(0.0) * length;
        }
        let total = self.length();
        if length > total {
            return self.end + self.unit_tangent(1.0) * (length - total);
        }
        self.point_at(self.t_at_length(length))
    }

    /// Split the edge at parameter `t`. Both parts get fresh ids.
    pub fn split_at(&self, t: f64) -> (Edge, Edge) {
        let t = t.clamp(0.0, 1.0);
        let mid = self.point_at(t);
        match self.curvature {
            Curvature::Straight => (Edge::line(self.start, mid), Edge::line(mid, self.end)),
            Curvature::Quadratic { control } => {
                let p01 = lerp(self.start, control, t);
                let p12 = lerp(control, self.end, t);
                (
                    Edge::quadratic(self.start, p01, mid),
                    Edge::quadratic(mid, p12, self.end),
                )
            }
            Curvature::Cubic { control1, control2 } => {
                let p01 = lerp(self.start, control1, t);
                let p12 = lerp(control1, control2, t);
                let p23 = lerp(control2, self.end, t);
                let p012 = lerp(p01, p12, t);
                let p123 = lerp(p12, p23, t);
                (
                    Edge::cubic(self.start, p01, p012, mid),
                    Edge::cubic(mid, p123, p23, self.end),
                )
            }
        }
    }

    /// Split the edge at the given arc length from the start.
    pub fn split_at_length(&self, length: f64) -> (Edge, Edge) {
        self.split_at(self.t_at_length(length))
    }

    /// Same edge traversed from end to start. Keeps the id.
    pub fn reversed(&self) -> Edge {
        let curvature = match self.curvature {
            Curvature::Straight => Curvature::Straight,
            Curvature::Quadratic { control } => Curvature::Quadratic { control },
            Curvature::Cubic { control1, control2 } => Curvature::Cubic {
                control1: control2,
                control2: control1,
            },
        };
        Edge {
            id: self.id,
            start: self.end,
            end: self.start,
            curvature,
        }
    }

    /// Apply a point mapping to every defining point. Keeps the id.
    pub fn map_points(&self, f: impl Fn(Point2<f64>) -> Point2<f64>) -> Edge {
        let curvature = match self.curvature {
            Curvature::Straight => Curvature::Straight,
            Curvature::Quadratic { control } => Curvature::Quadratic { control: f(control) },
            Curvature::Cubic { control1, control2 } => Curvature::Cubic {
                control1: f(control1),
                control2: f(control2),
            },
        };
        Edge {
            id: self.id,
            start: f(self.start),
            end: f(self.end),
            curvature,
        }
    }

    /// Translate the edge in place.
    pub fn translate(&mut self, offset: Vector2<f64>) {
        *self = self.map_points(|p| p + offset);
    }

    /// Mirror the edge about the local y axis (x -> -x).
    pub fn reflect_x(&mut self) {
        *self = self.map_points(|p| Point2::new(-p.x, p.y));
    }

    /// Sample the edge as a polyline (endpoints included).
    pub fn polyline(&self) -> Vec<Point2<f64>> {
        if self.is_straight() {
            return vec![self.start, self.end];
        }
        let n = POLYLINE_SAMPLES;
        (0..=n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }
}

/// Convert chord-relative coordinates to an absolute point.
///
/// `rel[0]` is the fraction along the chord, `rel[1]` the fraction along the
/// chord rotated by +90 degrees.
pub fn rel_to_abs(start: Point2<f64>, end: Point2<f64>, rel: [f64; 2]) -> Point2<f64> {
    let chord = end - start;
    let perp = Vector2::new(-chord.y, chord.x);
    start + chord * rel[0] + perp * rel[1]
}

/// Convert an absolute point to chord-relative coordinates.
pub fn abs_to_rel(start: Point2<f64>, end: Point2<f64>, point: Point2<f64>) -> [f64; 2] {
    let chord = end - start;
    let len_sq = chord.norm_squared();
    if len_sq < EPS * EPS {
        return [0.0, 0.0];
    }
    let perp = Vector2::new(-chord.y, chord.x);
    let v = point - start;
    [v.dot(&chord) / len_sq, v.dot(&perp) / len_sq]
}

fn lerp(a: Point2<f64>, b: Point2<f64>, t: f64) -> Point2<f64> {
    Point2::from(a.coords * (1.0 - t) + b.coords * t)
}

/// Adaptive Simpson integration of the curve speed.
fn adaptive_arc_length(edge: &Edge, a: f64, b: f64, tolerance: f64, max_depth: usize) -> f64 {
    fn simpson_step(edge: &Edge, a: f64, b: f64) -> f64 {
        let mid = (a + b) / 2.0;
        let h = (b - a) / 6.0;
        let fa = edge.derivative_at(a).norm();
        let fm = edge.derivative_at(mid).norm();
        let fb = edge.derivative_at(b).norm();
        h * (fa + 4.0 * fm + fb)
    }

    fn adaptive_helper(
        edge: &Edge,
        a: f64,
        b: f64,
        tolerance: f64,
        whole: f64,
        depth: usize,
    ) -> f64 {
        let mid = (a + b) / 2.0;
        let left = simpson_step(edge, a, mid);
        let right = simpson_step(edge, mid, b);
        let combined = left + right;

        if depth == 0 || (combined - whole).abs() < 15.0 * tolerance {
            combined + (combined - whole) / 15.0
        } else {
            let new_tol = tolerance / 2.0;
            adaptive_helper(edge, a, mid, new_tol, left, depth - 1)
                + adaptive_helper(edge, mid, b, new_tol, right, depth - 1)
        }
    }

    // Split once up front so symmetric curves do not fool the first estimate
    let mid = (a + b) / 2.0;
    let left = simpson_step(edge, a, mid);
    let right = simpson_step(edge, mid, b);
    adaptive_helper(edge, a, mid, tolerance / 2.0, left, max_depth)
        + adaptive_helper(edge, mid, b, tolerance / 2.0, right, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn test_line_length_and_eval() {
        let e = Edge::line(p(0.0, 0.0), p(3.0, 4.0));
        assert!((e.length() - 5.0).abs() < TOL);
        let mid = e.evaluate_at_length(2.5);
        assert!((mid.x - 1.5).abs() < TOL);
        assert!((mid.y - 2.0).abs() < TOL);
    }

    #[test]
    fn test_evaluate_at_negative_length_extrapolates() {
        let e = Edge::quadratic(p(0.0, 0.0), p(0.0, 5.0), p(5.0, 5.0));
        let below = e.evaluate_at_length(-2.0);
        assert!((below.x - 0.0).abs() < TOL);
        assert!((below.y + 2.0).abs() < TOL);

        let past = e.evaluate_at_length(e.length() + 1.0);
        assert!((past.x - 6.0).abs() < TOL);
        assert!((past.y - 5.0).abs() < TOL);
    }

    #[test]
    fn test_quarter_circle_like_quadratic_length() {
        // Symmetric quadratic: length lies between chord and control polygon
        let e = Edge::quadratic(p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0));
        let len = e.length();
        assert!(len > 2.0);
        assert!(len < 2.0 * 2f64.sqrt());
        // Known closed form value for this curve
        assert!((len - 2.295587149).abs() < 1e-6);
    }

    #[test]
    fn test_split_preserves_length_and_ids() {
        let e = Edge::cubic(p(0.0, 0.0), p(1.0, 2.0), p(3.0, 2.0), p(4.0, 0.0));
        let (a, b) = e.split_at_length(e.length() * 0.3);
        assert!((a.length() + b.length() - e.length()).abs() < 1e-6);
        assert!((a.length() - e.length() * 0.3).abs() < 1e-6);
        assert_eq!(a.end, b.start);
        assert_ne!(a.id(), e.id());
        assert_ne!(b.id(), e.id());
    }

    #[test]
    fn test_reversed_keeps_shape() {
        let e = Edge::cubic(p(0.0, 0.0), p(1.0, 2.0), p(3.0, 3.0), p(4.0, 0.0));
        let r = e.reversed();
        assert_eq!(r.id(), e.id());
        let a = e.point_at(0.25);
        let b = r.point_at(0.75);
        assert!((a - b).norm() < TOL);
    }

    #[test]
    fn test_relative_coordinates_roundtrip() {
        let start = p(1.0, 1.0);
        let end = p(5.0, 3.0);
        let control = p(2.0, 4.0);
        let rel = abs_to_rel(start, end, control);
        let back = rel_to_abs(start, end, rel);
        assert!((back - control).norm() < TOL);

        // Left of the chord means positive perpendicular coordinate
        assert!(rel[1] > 0.0);
    }

    #[test]
    fn test_reflect_x() {
        let mut e = Edge::quadratic(p(1.0, 0.0), p(2.0, 1.0), p(3.0, 0.0));
        let id = e.id();
        e.reflect_x();
        assert_eq!(e.id(), id);
        assert_eq!(e.start, p(-1.0, 0.0));
        assert_eq!(e.curvature, Curvature::Quadratic { control: p(-2.0, 1.0) });
    }

    #[test]
    fn test_unit_tangent_degenerate_control() {
        // Control coincides with start: derivative vanishes at t=0
        let e = Edge::quadratic(p(0.0, 0.0), p(0.0, 0.0), p(2.0, 0.0));
        let t = e.unit_tangent(0.0);
        assert!((t - Vector2::x()).norm() < TOL);
    }
}
