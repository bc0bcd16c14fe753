//! Ordered edge chains: panel outlines, dart shapes and edge replacements.

use crate::config::float_cmp::approx_zero;
use crate::config::EPS;
use crate::error::{PatternError, Result};
use crate::geometry::edge::{Edge, EdgeId};
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Ordered sequence of edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSequence {
    edges: Vec<Edge>,
}

impl EdgeSequence {
    /// Create a sequence from edges.
    pub fn new(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Polyline through `start` and the given vertices.
    pub fn from_verts(start: Point2<f64>, verts: &[Point2<f64>]) -> Self {
        let mut edges = Vec::with_capacity(verts.len());
        let mut prev = start;
        for &v in verts {
            edges.push(Edge::line(prev, v));
            prev = v;
        }
        Self { edges }
    }

    /// Dart wedge of the given opening width and depth:
    /// `(0, 0) -> (width / 2, -depth) -> (width, 0)`.
    pub fn dart_shape(width: f64, depth: f64) -> Self {
        let apex = Point2::new(width / 2.0, -depth);
        Self::new(vec![
            Edge::line(Point2::origin(), apex),
            Edge::line(apex, Point2::new(width, 0.0)),
        ])
    }

    /// Append an edge.
    pub fn push(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Append all edges of another sequence.
    pub fn extend(&mut self, other: EdgeSequence) {
        self.edges.extend(other.edges);
    }

    /// Close the loop with a straight edge if the last edge does not end at
    /// the first start.
    pub fn close_loop(mut self) -> Self {
        if let (Some(first), Some(last)) = (self.edges.first(), self.edges.last()) {
            if (last.end - first.start).norm() > EPS {
                let closing = Edge::line(last.end, first.start);
                self.edges.push(closing);
            }
        }
        self
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the sequence has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edges as a slice.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Iterate over edges.
    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    /// Edge at position, negative positions count from the end.
    pub fn at(&self, index: isize) -> Option<&Edge> {
        let len = self.edges.len() as isize;
        let i = if index < 0 { len + index } else { index };
        if i < 0 || i >= len {
            None
        } else {
            self.edges.get(i as usize)
        }
    }

    /// Position of the edge with the given id.
    pub fn position(&self, id: EdgeId) -> Option<usize> {
        self.edges.iter().position(|e| e.id() == id)
    }

    /// Edge with the given id.
    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    /// Ids of all edges in order.
    pub fn ids(&self) -> Vec<EdgeId> {
        self.edges.iter().map(Edge::id).collect()
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// Check if every edge starts where the previous one ends.
    pub fn is_chained(&self) -> bool {
        self.edges
            .windows(2)
            .all(|w| approx_zero((w[0].end - w[1].start).norm()))
    }

    /// Check if the chain is closed (last end meets first start).
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) => {
                self.is_chained() && approx_zero((last.end - first.start).norm())
            }
            _ => false,
        }
    }

    /// Start vertices of every edge (the loop's vertices for a closed loop).
    pub fn vertices(&self) -> Vec<Point2<f64>> {
        self.edges.iter().map(|e| e.start).collect()
    }

    /// Signed area of a closed loop (negative for clockwise winding).
    pub fn signed_area(&self) -> f64 {
        let points: Vec<Point2<f64>> = self
            .edges
            .iter()
            .flat_map(|e| {
                let mut pts = e.polyline();
                pts.pop();
                pts
            })
            .collect();
        let n = points.len();
        (0..n)
            .map(|i| {
                let a = points[i];
                let b = points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of the sampled edges.
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        if self.edges.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for p in self.edges.iter().flat_map(Edge::polyline) {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        (min_x, min_y, max_x, max_y)
    }

    /// Replace the edge with the given id by a sequence of edges.
    pub fn substitute(&mut self, id: EdgeId, replacement: EdgeSequence) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| PatternError::geometry(format!("edge {} not in sequence", id)))?;
        self.edges.splice(pos..=pos, replacement.edges);
        Ok(())
    }

    /// Translate every edge.
    pub fn translate(&mut self, offset: Vector2<f64>) {
        for e in &mut self.edges {
            e.translate(offset);
        }
    }

    /// Mirror every edge about the local y axis.
    pub fn reflect_x(&mut self) {
        for e in &mut self.edges {
            e.reflect_x();
        }
    }

    /// Reverse the order of the edges and the direction of each edge.
    pub fn reverse(&mut self) {
        self.edges.reverse();
        for e in &mut self.edges {
            *e = e.reversed();
        }
    }
}

impl<'a> IntoIterator for &'a EdgeSequence {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl From<Vec<Edge>> for EdgeSequence {
    fn from(edges: Vec<Edge>) -> Self {
        Self::new(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn square() -> EdgeSequence {
        // Clockwise unit square
        EdgeSequence::from_verts(p(0.0, 0.0), &[p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)]).close_loop()
    }

    #[test]
    fn test_close_loop_adds_closing_edge() {
        let seq = square();
        assert_eq!(seq.len(), 4);
        assert!(seq.is_closed());
        assert!((seq.length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_loop_is_idempotent() {
        let seq = square().close_loop();
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn test_negative_index() {
        let seq = square();
        assert_eq!(seq.at(-1).map(|e| e.end), Some(p(0.0, 0.0)));
        assert_eq!(seq.at(0).map(|e| e.start), Some(p(0.0, 0.0)));
        assert!(seq.at(4).is_none());
        assert!(seq.at(-5).is_none());
    }

    #[test]
    fn test_signed_area_clockwise() {
        assert!((square().signed_area() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_substitute_keeps_chain() {
        let mut seq = square();
        let top = seq.edges()[1].clone();
        let (a, b) = top.split_at(0.5);
        seq.substitute(top.id(), EdgeSequence::new(vec![a, b])).unwrap();
        assert_eq!(seq.len(), 5);
        assert!(seq.is_closed());
        assert!(seq.position(top.id()).is_none());
    }

    #[test]
    fn test_reverse_keeps_closure_and_flips_winding() {
        let mut seq = square();
        seq.reverse();
        assert!(seq.is_closed());
        assert!((seq.signed_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dart_shape() {
        let dart = EdgeSequence::dart_shape(2.0, 5.0);
        assert_eq!(dart.len(), 2);
        assert_eq!(dart.edges()[0].end, p(1.0, -5.0));
        assert!((dart.edges()[0].length() - dart.edges()[1].length()).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let seq = square();
        assert_eq!(seq.bounding_box(), (0.0, 0.0, 1.0, 1.0));
    }
}
