//! Straight, non-fitted upper garment (T-shirt body).

use crate::error::Result;
use crate::geometry::{dir, pt, CurveFit, Edge, EdgeSequence};
use crate::model::{Component, Interface, Panel};
use crate::params::{require_positive, BodyParameters, ShirtDesign};
use nalgebra::Vector3;
use tracing::debug;

/// Front half of the torso, fitted to the bust.
#[derive(Debug, Clone)]
pub struct TorsoFrontHalfPanel {
    pub panel: Panel,
}

impl TorsoFrontHalfPanel {
    pub fn new(name: &str, body: &BodyParameters, design: &ShirtDesign) -> Result<Self> {
        let max_len = require_positive("shirt.front_length", design.front_length.v)?;
        let bottom = Edge::line(
            pt(0.0, 0.0),
            pt(-require_positive("shirt.width_hip", design.width_hip.v)? / 2.0, 0.0),
        );
        let panel = torso_half_panel(name, body, design, bottom, max_len)?;
        Ok(Self { panel })
    }

    /// Panel width at a height above the panel bottom.
    pub fn width_at(&self, level: f64) -> f64 {
        self.panel.width_at(level)
    }
}

/// Back half of the torso.
///
/// With `match_length_to_front` the panel shares the front height and the
/// extra back length is taken up by a curved bottom edge.
#[derive(Debug, Clone)]
pub struct TorsoBackHalfPanel {
    pub panel: Panel,
}

impl TorsoBackHalfPanel {
    pub fn new(
        name: &str,
        body: &BodyParameters,
        design: &ShirtDesign,
        match_length_to_front: bool,
    ) -> Result<Self> {
        let hip = require_positive("shirt.width_hip", design.width_hip.v)? / 2.0;
        let back_length = require_positive("shirt.back_length", design.back_length.v)?;

        let (max_len, bottom) = if match_length_to_front {
            let max_len = require_positive("shirt.front_length", design.front_length.v)?;
            let bottom = CurveFit::new(pt(0.0, max_len - back_length), pt(-hip, 0.0))
                .target_tan0(dir(-1.0, 0.0))
                .curve_from_tangents()?;
            (max_len, bottom)
        } else {
            (back_length, Edge::line(pt(0.0, 0.0), pt(-hip, 0.0)))
        };

        let panel = torso_half_panel(name, body, design, bottom, max_len)?;
        Ok(Self { panel })
    }

    /// Panel width at a height above the panel bottom.
    pub fn width_at(&self, level: f64) -> f64 {
        self.panel.width_at(level)
    }
}

/// Shared outline: bottom, side curves through waist and bust line,
/// armhole, shoulder and the centre line.
fn torso_half_panel(
    name: &str,
    body: &BodyParameters,
    design: &ShirtDesign,
    bottom: Edge,
    max_len: f64,
) -> Result<Panel> {
    let waist = require_positive("shirt.width_waist", design.width_waist.v)? / 2.0;
    let bust = require_positive("shirt.width_chest", design.width_chest.v)? / 2.0;

    let right_bottom = CurveFit::new(
        bottom.end,
        pt(-waist, max_len - design.waist_over_bust_line_height.v),
    )
    .target_tan1(dir(0.0, 1.0))
    .curve_from_tangents()?;
    let right_middle = CurveFit::new(right_bottom.end, pt(-bust, max_len - design.scye_depth.v))
        .target_tan0(dir(0.0, 1.0))
        .curve_from_tangents()?;

    let mut edges = EdgeSequence::new(vec![
        bottom.clone(),
        right_bottom.clone(),
        right_middle.clone(),
    ]);
    edges.extend(EdgeSequence::from_verts(
        right_middle.end,
        &[pt(-bust, max_len - design.shoulder_slant.v), pt(0.0, max_len)],
    ));
    let edges = edges.close_loop();

    // bottom, right_bottom, right_middle, armhole, shoulder, centre
    let ids = edges.ids();
    let n = ids.len();
    let (armhole, shoulder, centre) = (ids[n - 3], ids[n - 2], ids[n - 1]);

    let mut panel = Panel::new(name, edges);
    let interfaces = [
        ("outside", vec![right_bottom.id(), right_middle.id()]),
        ("inside", vec![centre]),
        ("shoulder", vec![shoulder]),
        ("bottom", vec![bottom.id()]),
        ("shoulder_corner", vec![armhole, shoulder]),
        ("collar_corner", vec![shoulder, centre]),
    ];
    for (key, ids) in interfaces {
        panel
            .interfaces
            .insert(key.to_string(), Interface::new(name, ids));
    }

    panel.translate_by(Vector3::new(0.0, body.height - body.head_l - max_len, 0.0));
    debug!("Built torso panel {} ({} edges)", name, panel.edges.len());
    Ok(panel)
}

/// Front and back torso panels of one side, sewn at the side and shoulder.
#[derive(Debug, Clone)]
pub struct TorsoHalf {
    pub component: Component,
}

impl TorsoHalf {
    pub fn new(tag: &str, body: &BodyParameters, design: &ShirtDesign) -> Result<Self> {
        let mut front = TorsoFrontHalfPanel::new(&format!("torso_f_{tag}"), body, design)?.panel;
        front.translate_by(Vector3::new(0.0, 0.0, 30.0));
        let mut back = TorsoBackHalfPanel::new(
            &format!("torso_b_{tag}"),
            body,
            design,
            design.match_back_to_front.v,
        )?
        .panel;
        back.translate_by(Vector3::new(0.0, 0.0, -25.0));

        let mut component = Component::new(format!("torso_{tag}"));
        component.stitch(
            front.interface("outside")?.clone(),
            back.interface("outside")?.clone(),
        );
        component.stitch(
            front.interface("shoulder")?.clone(),
            back.interface("shoulder")?.clone(),
        );

        component
            .interfaces
            .insert("front_in".into(), front.interface("inside")?.clone());
        component
            .interfaces
            .insert("back_in".into(), back.interface("inside")?.clone());
        component.interfaces.insert(
            "bottom".into(),
            Interface::from_multiple([
                front.interface("bottom")?.clone(),
                back.interface("bottom")?.clone(),
            ]),
        );

        component.panels = vec![front, back];
        Ok(Self { component })
    }
}

/// Shirt body: right torso half plus a mirrored left half, sewn at the
/// centre front and centre back.
#[derive(Debug, Clone)]
pub struct Shirt {
    pub component: Component,
}

impl Shirt {
    pub fn new(body: &BodyParameters, design: &ShirtDesign) -> Result<Self> {
        let right = TorsoHalf::new("r", body, design)?.component;
        let mut left = TorsoHalf::new("l", body, design)?.component;
        left.mirror();

        let mut component = Component::new("shirt");
        component.stitch(
            right.interface("front_in")?.clone(),
            left.interface("front_in")?.clone(),
        );
        component.stitch(
            right.interface("back_in")?.clone(),
            left.interface("back_in")?.clone(),
        );
        component.interfaces.insert(
            "bottom".into(),
            Interface::from_multiple([
                right.interface("bottom")?.clone(),
                left.interface("bottom")?.clone().reverse(true),
            ]),
        );

        component.subs = vec![right, left];
        Ok(Self { component })
    }

    /// Height of the assembled shirt.
    pub fn length(&self) -> f64 {
        self.component.length()
    }
}
