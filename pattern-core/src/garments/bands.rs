//! Bands attached to garment openings: cuffs for the pant legs.

use crate::error::{PatternError, Result};
use crate::geometry::{pt, EdgeSequence};
use crate::model::{Component, Interface, Panel};
use crate::params::{require_positive, CuffDesign};
use nalgebra::Vector3;

/// Straight tube of two rectangular panels.
#[derive(Debug, Clone)]
pub struct CuffBand {
    pub component: Component,
}

impl CuffBand {
    /// `width` is the full tube circumference, `length` its height.
    pub fn new(tag: &str, width: f64, length: f64) -> Result<Self> {
        let component = tube(tag, width, width, length)?;
        Ok(Self { component })
    }
}

/// Flared tube: the bottom is `skirt_ruffle` times wider than the top.
#[derive(Debug, Clone)]
pub struct CuffSkirt {
    pub component: Component,
}

impl CuffSkirt {
    pub fn new(tag: &str, width: f64, length: f64, skirt_ruffle: f64) -> Result<Self> {
        let ruffle = require_positive("cuff.skirt_ruffle", skirt_ruffle)?;
        let component = tube(tag, width, width * ruffle, length)?;
        Ok(Self { component })
    }
}

/// Build the cuff program named by the design.
pub fn cuff(
    kind: &str,
    tag: &str,
    width: f64,
    length: f64,
    design: &CuffDesign,
) -> Result<Component> {
    match kind {
        "CuffBand" => Ok(CuffBand::new(tag, width, length)?.component),
        "CuffSkirt" => Ok(CuffSkirt::new(tag, width, length, design.skirt_ruffle.v)?.component),
        other => Err(PatternError::UnknownGarment {
            name: other.to_string(),
        }),
    }
}

/// Front and back panels sewn along both sides.
fn tube(tag: &str, top_width: f64, bottom_width: f64, length: f64) -> Result<Component> {
    let top = require_positive("cuff.width", top_width)? / 2.0;
    let bottom = require_positive("cuff.width", bottom_width)? / 2.0;
    let length = require_positive("cuff.length", length)?;

    let mut front = band_panel(&format!("{tag}_cuff_f"), top, bottom, length);
    front.translate_by(Vector3::new(-top / 2.0, 0.0, 10.0));
    let mut back = band_panel(&format!("{tag}_cuff_b"), top, bottom, length);
    back.translate_by(Vector3::new(-top / 2.0, 0.0, -10.0));

    let mut component = Component::new(format!("{tag}_cuff"));
    component.stitch(
        front.interface("left")?.clone(),
        back.interface("left")?.clone(),
    );
    component.stitch(
        front.interface("right")?.clone(),
        back.interface("right")?.clone(),
    );
    component.interfaces.insert(
        "top".into(),
        Interface::from_multiple([
            front.interface("top")?.clone(),
            back.interface("top")?.clone(),
        ]),
    );
    component.interfaces.insert(
        "bottom".into(),
        Interface::from_multiple([
            front.interface("bottom")?.clone(),
            back.interface("bottom")?.clone(),
        ]),
    );
    component.panels = vec![front, back];
    Ok(component)
}

/// Trapezoid with the top edge from `(0, length)` to `(top, length)`,
/// the bottom centred below it.
fn band_panel(name: &str, top: f64, bottom: f64, length: f64) -> Panel {
    let flare = (bottom - top) / 2.0;
    let edges = EdgeSequence::from_verts(
        pt(-flare, 0.0),
        &[pt(0.0, length), pt(top, length), pt(top + flare, 0.0)],
    )
    .close_loop();
    let ids = edges.ids();
    let mut panel = Panel::new(name, edges);
    for (key, id) in ["left", "top", "right", "bottom"].into_iter().zip(ids) {
        panel
            .interfaces
            .insert(key.to_string(), Interface::new(name, [id]));
    }
    panel
}
