//! Pattern data model: panels, interfaces, components and assembled patterns.

mod component;
mod interface;
mod panel;
mod pattern;

pub use component::{Alignment, Component, StitchRule};
pub use interface::{EdgeLookup, Interface, InterfaceEdge};
pub use panel::{cut_dart, DartCut, Panel};
pub use pattern::{Pattern, Stitch, StitchOrientation, StitchSide};
