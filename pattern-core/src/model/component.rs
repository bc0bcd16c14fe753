//! Components: panels and sub-components joined by stitching rules.

use crate::error::{PatternError, Result};
use crate::model::{EdgeLookup, Interface, Panel, Pattern};
use crate::transform::resolve_stitches;
use nalgebra::{Point3, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Pair of interfaces to be sewn together.
#[derive(Debug, Clone)]
pub struct StitchRule {
    pub a: Interface,
    pub b: Interface,
}

impl StitchRule {
    pub fn new(a: Interface, b: Interface) -> Self {
        Self { a, b }
    }
}

/// Horizontal alignment used by [`Component::place_by_interface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A garment part built from panels and sub-components.
#[derive(Debug, Clone, Default)]
pub struct Component {
    pub name: String,
    pub panels: Vec<Panel>,
    pub subs: Vec<Component>,
    pub stitching_rules: Vec<StitchRule>,
    pub interfaces: BTreeMap<String, Interface>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a stitching rule.
    pub fn stitch(&mut self, a: Interface, b: Interface) {
        self.stitching_rules.push(StitchRule::new(a, b));
    }

    /// Move every panel in 3D.
    pub fn translate_by(&mut self, offset: Vector3<f64>) -> &mut Self {
        for panel in &mut self.panels {
            panel.translate_by(offset);
        }
        for sub in &mut self.subs {
            sub.translate_by(offset);
        }
        self
    }

    /// Mirror every panel across the world YZ plane.
    ///
    /// Interfaces and stitching rules keep walking their edges in the
    /// mirrored direction.
    pub fn mirror(&mut self) -> &mut Self {
        let names: BTreeSet<String> = self.all_panels().iter().map(|p| p.name.clone()).collect();
        for panel in &mut self.panels {
            panel.mirror();
        }
        for sub in &mut self.subs {
            sub.mirror();
        }
        let rules = self
            .stitching_rules
            .iter_mut()
            .flat_map(|rule| [&mut rule.a, &mut rule.b]);
        for interface in self.interfaces.values_mut().chain(rules) {
            interface.follow_mirrored(|panel| names.contains(panel));
        }
        self
    }

    /// All panels, own panels first, then sub-components depth-first.
    pub fn all_panels(&self) -> Vec<&Panel> {
        let mut panels: Vec<&Panel> = self.panels.iter().collect();
        for sub in &self.subs {
            panels.extend(sub.all_panels());
        }
        panels
    }

    /// Find a panel anywhere in the component tree.
    pub fn find_panel(&self, name: &str) -> Option<&Panel> {
        self.panels
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.subs.iter().find_map(|s| s.find_panel(name)))
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

    /// Height of the world-space bounding box of all panels.
    pub fn length(&self) -> f64 {
        let ys: Vec<f64> = self
            .all_panels()
            .into_iter()
            .flat_map(|panel| {
                panel
                    .edges
                    .iter()
                    .flat_map(|e| e.polyline())
                    .map(|p| panel.world_point(p).y)
                    .collect::<Vec<_>>()
            })
            .collect();
        if ys.is_empty() {
            return 0.0;
        }
        let min = ys.iter().copied().fold(f64::MAX, f64::min);
        let max = ys.iter().copied().fold(f64::MIN, f64::max);
        max - min
    }

    /// Move the component so that its interface `own` sits `gap` below the
    /// `target` interface.
    ///
    /// Horizontally the interfaces are aligned by their left ends, right ends
    /// or centres; in depth they are centred on each other.
    pub fn place_by_interface(
        &mut self,
        own: &Interface,
        target: &Interface,
        target_lookup: &(impl EdgeLookup + ?Sized),
        gap: f64,
        alignment: Alignment,
    ) -> Result<()> {
        let own_points = own.world_endpoints(&*self)?;
        let target_points = target.world_endpoints(target_lookup)?;
        if own_points.is_empty() || target_points.is_empty() {
            return Err(PatternError::EmptyInterface);
        }

        let (own_min, own_max) = x_range(&own_points);
        let (target_min, target_max) = x_range(&target_points);
        let dx = match alignment {
            Alignment::Left => target_min - own_min,
            Alignment::Right => target_max - own_max,
            Alignment::Center => (target_min + target_max - own_min - own_max) / 2.0,
        };
        let own_centre = centroid(&own_points);
        let target_centre = centroid(&target_points);
        let offset = Vector3::new(
            dx,
            target_centre.y - gap - own_centre.y,
            target_centre.z - own_centre.z,
        );

        debug!("Placing {} by interface: offset {:?}", self.name, offset);
        self.translate_by(offset);
        Ok(())
    }

    /// Flatten the component into a pattern and resolve its stitches.
    pub fn assembly(&self) -> Result<Pattern> {
        let mut panels: Vec<Panel> = Vec::new();
        let mut names = BTreeSet::new();
        for panel in self.all_panels() {
            if !names.insert(panel.name.clone()) {
                return Err(PatternError::DuplicatePanel {
                    name: panel.name.clone(),
                });
            }
            panels.push(panel.clone());
        }

        let rules = self.all_stitching_rules();
        debug!(
            "Assembling {}: {} panels, {} stitching rules",
            self.name,
            panels.len(),
            rules.len()
        );
        let stitches = resolve_stitches(&mut panels, &rules)?;

        Ok(Pattern {
            name: self.name.clone(),
            panels,
            stitches,
        })
    }

    /// Stitching rules of the whole tree, sub-components first.
    fn all_stitching_rules(&self) -> Vec<StitchRule> {
        let mut rules: Vec<StitchRule> = self
            .subs
            .iter()
            .flat_map(Component::all_stitching_rules)
            .collect();
        rules.extend(self.stitching_rules.iter().cloned());
        rules
    }
}

impl EdgeLookup for Component {
    fn lookup_panel(&self, name: &str) -> Option<&Panel> {
        self.find_panel(name)
    }
}

fn x_range(points: &[Point3<f64>]) -> (f64, f64) {
    points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)))
}

fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}
