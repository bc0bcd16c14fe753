//! Interfaces: named edge subsets of panels exposed for stitching.

use crate::error::{PatternError, Result};
use crate::geometry::{Edge, EdgeId};
use crate::model::Panel;
use nalgebra::Point3;
use std::collections::BTreeSet;

/// Resolves edge geometry by panel name and edge id.
pub trait EdgeLookup {
    /// Find a panel by name.
    fn lookup_panel(&self, name: &str) -> Option<&Panel>;

    /// Find an edge of a panel.
    fn lookup_edge(&self, panel: &str, id: EdgeId) -> Option<&Edge> {
        self.lookup_panel(panel)?.edges.get(id)
    }
}

impl EdgeLookup for Panel {
    fn lookup_panel(&self, name: &str) -> Option<&Panel> {
        (self.name == name).then_some(self)
    }
}

impl EdgeLookup for [Panel] {
    fn lookup_panel(&self, name: &str) -> Option<&Panel> {
        self.iter().find(|p| p.name == name)
    }
}

impl EdgeLookup for Vec<Panel> {
    fn lookup_panel(&self, name: &str) -> Option<&Panel> {
        self.as_slice().lookup_panel(name)
    }
}

/// One edge taking part in an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceEdge {
    /// Owning panel.
    pub panel: String,
    /// Edge id within the panel.
    pub edge: EdgeId,
    /// Whether the interface runs against the edge direction.
    pub flipped: bool,
    /// Gathering ratio: physical length over stitched length.
    pub ruffle: f64,
}

/// Ordered edge list used as one side of a seam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interface {
    edges: Vec<InterfaceEdge>,
}

impl Interface {
    /// Interface over edges of one panel, in the given order.
    pub fn new(panel: &str, ids: impl IntoIterator<Item = EdgeId>) -> Self {
        let edges = ids
            .into_iter()
            .map(|edge| InterfaceEdge {
                panel: panel.to_string(),
                edge,
                flipped: false,
                ruffle: 1.0,
            })
            .collect();
        Self { edges }
    }

    /// Set the ruffle coefficient of every edge.
    pub fn with_ruffle(mut self, ruffle: f64) -> Self {
        for e in &mut self.edges {
            e.ruffle = ruffle;
        }
        self
    }

    /// Concatenate interfaces.
    pub fn from_multiple(parts: impl IntoIterator<Item = Interface>) -> Self {
        Self {
            edges: parts.into_iter().flat_map(|p| p.edges).collect(),
        }
    }

    /// Traverse every edge against its current interface direction.
    pub fn flip_edges(mut self) -> Self {
        for e in &mut self.edges {
            e.flipped = !e.flipped;
        }
        self
    }

    /// Keep the walk over edges of mirrored panels, whose stored direction
    /// was reversed by the mirror.
    pub fn follow_mirrored(&mut self, is_mirrored: impl Fn(&str) -> bool) {
        for e in &mut self.edges {
            if is_mirrored(&e.panel) {
                e.flipped = !e.flipped;
            }
        }
    }

    /// Reverse the edge order, optionally flipping each edge as well.
    pub fn reverse(mut self, with_edge_dir_reverse: bool) -> Self {
        self.edges.reverse();
        if with_edge_dir_reverse {
            self = self.flip_edges();
        }
        self
    }

    /// Interface edges.
    pub fn edges(&self) -> &[InterfaceEdge] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the interface has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Names of panels this interface touches.
    pub fn panels(&self) -> BTreeSet<&str> {
        self.edges.iter().map(|e| e.panel.as_str()).collect()
    }

    /// Check if the interface uses the given edge.
    pub fn contains(&self, panel: &str, id: EdgeId) -> bool {
        self.edges.iter().any(|e| e.panel == panel && e.edge == id)
    }

    /// Edge geometry oriented along the interface.
    pub fn oriented_edges(&self, lookup: &(impl EdgeLookup + ?Sized)) -> Result<Vec<Edge>> {
        self.edges
            .iter()
            .map(|ie| {
                let edge = lookup.lookup_edge(&ie.panel, ie.edge).ok_or_else(|| {
                    PatternError::EdgeNotFound {
                        panel: ie.panel.clone(),
                        edge: ie.edge.value(),
                    }
                })?;
                Ok(if ie.flipped {
                    edge.reversed()
                } else {
                    edge.clone()
                })
            })
            .collect()
    }

    /// Lengths of the edges, in interface order.
    pub fn edge_lengths(&self, lookup: &(impl EdgeLookup + ?Sized)) -> Result<Vec<f64>> {
        Ok(self
            .oriented_edges(lookup)?
            .iter()
            .map(Edge::length)
            .collect())
    }

    /// Total length of the interface edges.
    pub fn length(&self, lookup: &(impl EdgeLookup + ?Sized)) -> Result<f64> {
        Ok(self.edge_lengths(lookup)?.iter().sum())
    }

    /// World-space vertices along the interface (edge starts plus final end).
    pub fn world_points(&self, lookup: &(impl EdgeLookup + ?Sized)) -> Result<Vec<Point3<f64>>> {
        let mut points = Vec::with_capacity(self.edges.len() + 1);
        for (ie, edge) in self.edges.iter().zip(self.oriented_edges(lookup)?) {
            let panel = lookup
                .lookup_panel(&ie.panel)
                .ok_or_else(|| PatternError::PanelNotFound {
                    name: ie.panel.clone(),
                })?;
            if points.is_empty() {
                points.push(panel.world_point(edge.start));
            }
            points.push(panel.world_point(edge.end));
        }
        Ok(points)
    }

    /// World-space endpoints of every edge, two per edge.
    pub fn world_endpoints(
        &self,
        lookup: &(impl EdgeLookup + ?Sized),
    ) -> Result<Vec<Point3<f64>>> {
        let mut points = Vec::with_capacity(self.edges.len() * 2);
        for ie in &self.edges {
            let panel = lookup
                .lookup_panel(&ie.panel)
                .ok_or_else(|| PatternError::PanelNotFound {
                    name: ie.panel.clone(),
                })?;
            let edge = panel
                .edges
                .get(ie.edge)
                .ok_or_else(|| PatternError::EdgeNotFound {
                    panel: ie.panel.clone(),
                    edge: ie.edge.value(),
                })?;
            points.push(panel.world_point(edge.start));
            points.push(panel.world_point(edge.end));
        }
        Ok(points)
    }

    /// Replace an edge by its parts (given in edge direction).
    ///
    /// Flipped entries receive the parts in reverse order. Returns whether
    /// the edge was found.
    pub fn substitute(&mut self, panel: &str, id: EdgeId, parts: &[EdgeId]) -> bool {
        let Some(pos) = self
            .edges
            .iter()
            .position(|e| e.panel == panel && e.edge == id)
        else {
            return false;
        };

        let old = self.edges[pos].clone();
        let mut replacement: Vec<InterfaceEdge> = parts
            .iter()
            .map(|&edge| InterfaceEdge { edge, ..old.clone() })
            .collect();
        if old.flipped {
            replacement.reverse();
        }
        self.edges.splice(pos..=pos, replacement);

        // An edge may appear only once, but keep going if it repeats
        self.substitute(panel, id, parts);
        true
    }
}
