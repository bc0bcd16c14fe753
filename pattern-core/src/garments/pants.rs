//! Fitted pants: pant panels with waist darts, leg halves and the full garment.

use crate::error::{PatternError, Result};
use crate::garments::bands;
use crate::geometry::{dir, pt, CurveFit, Edge, EdgeId, EdgeSequence};
use crate::model::{cut_dart, Alignment, Component, Interface, Panel};
use crate::params::{require_positive, BodyParameters, PantsDesign};
use nalgebra::Vector3;
use tracing::debug;

/// Gap between the leg bottom and a freshly placed cuff.
const CUFF_GAP: f64 = 5.0;

/// Panel-specific sizes derived from the pants design.
#[derive(Debug, Clone)]
pub struct PantPanelSizes {
    /// Top edge height above the crotch line.
    pub rise: f64,
    /// Mean of front and back rise.
    pub mid_rise: f64,
    /// Half waist.
    pub waist: f64,
    /// Half hips.
    pub hips: f64,
    pub crotch_extension: f64,
    /// Hip line to crotch line, measured on the side seam.
    pub hips_crotch_diff: f64,
    /// Crotch height below the waist on the body.
    pub body_crotch_height: f64,
    /// Hip line to crotch line, measured on the crotch seam.
    pub crotch_hip_diff: f64,
    /// Dart distance from the top edge end.
    pub dart_position: f64,
    /// Waist measure the top interface is gathered to.
    pub match_top_int_to: Option<f64>,
    /// Dart depth scale.
    pub hipline_ext: f64,
    pub double_dart: bool,
}

/// One pant panel (front or back) of the right leg.
///
/// Outline: five side curves up to the waist, top edge, crotch line and
/// curve, three inside leg curves, bottom.
#[derive(Debug, Clone)]
pub struct PantPanel {
    pub panel: Panel,
}

impl PantPanel {
    pub fn new(name: &str, design: &PantsDesign, sizes: &PantPanelSizes) -> Result<Self> {
        let l1 = require_positive("pants.length_1", design.length_1.v)?;
        let l2 = require_positive("pants.length_2", design.length_2.v)?;
        let l3 = require_positive("pants.length_3", design.length_3.v)?;
        let w1 = require_positive("pants.width_1", design.width_1.v)?;
        let w2 = require_positive("pants.width_2", design.width_2.v)?;
        let w3 = require_positive("pants.width_3", design.width_3.v)?;
        let w4 = require_positive("pants.width_4", design.width_4.v)?;
        let leg = l1 + l2 + l3;
        let s = sizes;

        // Side seam, bottom to top
        let right_5 = CurveFit::new(
            pt(-s.hips, s.hips_crotch_diff + leg),
            pt(-s.waist, s.mid_rise + leg),
        )
        .target_tan0(dir(0.0, 1.0))
        .curve_from_tangents()?;
        let ext_point_thigh = right_5.evaluate_at_length(-s.hips_crotch_diff);

        let right_4 = CurveFit::new(ext_point_thigh, right_5.start)
            .target_tan1(dir(0.0, 1.0))
            .curve_from_tangents()?;

        let x_grainline = ext_point_thigh.x + (w1 + s.crotch_extension) / 2.0;

        let right_3 = CurveFit::new(pt(x_grainline - w2 / 2.0, l2 + l3), right_4.start)
            .target_tan1(right_4.unit_tangent(0.0))
            .pre_start(pt(x_grainline - w3 / 2.0, l3))
            .initial_guess([0.1, 0.0])
            .interpolate_with_tangents()?;
        let right_2 = CurveFit::new(pt(x_grainline - w3 / 2.0, l3), right_3.start)
            .pre_start(pt(x_grainline - w4 / 2.0, 0.0))
            .post_end(right_3.end)
            .interpolate_with_tangents()?;
        let right_1 = CurveFit::new(pt(x_grainline - w4 / 2.0, 0.0), right_2.start)
            .post_end(right_2.end)
            .interpolate_with_tangents()?;

        // Waist and crotch
        let top = Edge::line(right_5.end, pt(0.0, s.rise + leg));
        let crotch_top = Edge::line(top.end, pt(0.0, s.crotch_hip_diff + leg));
        let crotch_bottom = CurveFit::new(
            crotch_top.end,
            pt(ext_point_thigh.x + s.hips + s.crotch_extension, leg),
        )
        .target_tan0(dir(0.0, -1.0))
        .target_tan1(dir(1.0, 0.0))
        .initial_guess([0.5, -0.5])
        .curve_from_tangents()?;

        // Inside leg seam, top to bottom
        let left_top = CurveFit::new(crotch_bottom.end, pt(right_2.end.x + w2, l2 + l3))
            .post_end(pt(x_grainline + w3 / 2.0, l3))
            .initial_guess([0.3, 0.0])
            .interpolate_with_tangents()?;
        let left_middle = CurveFit::new(left_top.end, pt(x_grainline + w3 / 2.0, l3))
            .post_end(pt(x_grainline + w4 / 2.0, 0.0))
            .interpolate_with_tangents()?;
        let left_bottom = CurveFit::new(left_middle.end, pt(x_grainline + w4 / 2.0, 0.0))
            .pre_start(left_middle.start)
            .interpolate_with_tangents()?;

        let edges = EdgeSequence::new(vec![
            right_1.clone(),
            right_2.clone(),
            right_3.clone(),
            right_4.clone(),
            right_5.clone(),
            top.clone(),
            crotch_top.clone(),
            crotch_bottom.clone(),
            left_top.clone(),
            left_middle.clone(),
            left_bottom.clone(),
        ])
        .close_loop();
        let bottom = edges
            .at(-1)
            .map(Edge::id)
            .ok_or_else(|| PatternError::geometry("empty pant outline"))?;

        let mut panel = Panel::new(name, edges);
        panel.set_pivot(crotch_bottom.end, false);
        panel.translation = Vector3::new(-0.5, -s.body_crotch_height + 5.0, 0.0);

        let interfaces = [
            (
                "outside",
                vec![right_1.id(), right_2.id(), right_3.id(), right_4.id(), right_5.id()],
            ),
            ("crotch", vec![crotch_top.id(), crotch_bottom.id()]),
            ("inside", vec![left_top.id(), left_middle.id(), left_bottom.id()]),
            ("bottom", vec![bottom]),
        ];
        for (key, ids) in interfaces {
            panel
                .interfaces
                .insert(key.to_string(), Interface::new(name, ids));
        }

        let ruffle = s.match_top_int_to.map_or(1.0, |to| s.waist / to);
        let dart_depth = design.length_waist_to_hip.v * s.hipline_ext * 0.8;
        let dart_width = (s.hips - s.waist) / 2.0;
        let top_ids = if dart_width > 0.0 {
            let (top_edges, int_edges) = add_darts(
                &panel,
                top.id(),
                dart_width,
                dart_depth,
                s.dart_position,
                s.double_dart,
            )?;
            panel.edges.substitute(top.id(), top_edges)?;
            int_edges.ids()
        } else {
            vec![top.id()]
        };
        panel.interfaces.insert(
            "top".to_string(),
            Interface::new(name, top_ids).with_ruffle(ruffle),
        );

        debug!("Built pant panel {} ({} edges)", name, panel.edges.len());
        Ok(Self { panel })
    }
}

/// Cut one or two darts into the top edge, measured from its end.
///
/// Returns the replacement for the top edge and the interface edges.
fn add_darts(
    panel: &Panel,
    top: EdgeId,
    dart_width: f64,
    dart_depth: f64,
    dart_position: f64,
    double_dart: bool,
) -> Result<(EdgeSequence, EdgeSequence)> {
    let (offsets, darts) = if double_dart {
        // Distance between dart centres
        let dist = dart_position * 0.5;
        (
            vec![
                -(dart_position + dist / 2.0 + dart_width / 2.0 + dart_width / 4.0),
                -(dart_position - dist / 2.0) - dart_width / 4.0,
            ],
            vec![
                EdgeSequence::dart_shape(dart_width / 2.0, dart_depth * 0.9),
                EdgeSequence::dart_shape(dart_width / 2.0, dart_depth),
            ],
        )
    } else {
        (
            vec![-dart_position - dart_width / 2.0],
            vec![EdgeSequence::dart_shape(dart_width, dart_depth)],
        )
    };

    let top_edge = panel
        .edges
        .get(top)
        .cloned()
        .ok_or_else(|| PatternError::EdgeNotFound {
            panel: panel.name.clone(),
            edge: top.value(),
        })?;
    let mut top_edges = EdgeSequence::new(vec![top_edge.clone()]);
    let mut int_edges = EdgeSequence::new(vec![top_edge]);

    for (off, dart) in offsets.iter().zip(&darts) {
        let last = top_edges
            .at(-1)
            .cloned()
            .ok_or_else(|| PatternError::geometry("empty top edge"))?;
        let cut = cut_dart(&last, dart, last.length() + off, true)?;
        top_edges.substitute(last.id(), cut.edges)?;
        int_edges.substitute(last.id(), cut.interface_edges)?;
    }
    Ok((top_edges, int_edges))
}

/// Front and back pant panels of one leg, with an optional cuff.
#[derive(Debug, Clone)]
pub struct PantsHalf {
    pub component: Component,
    front: String,
    cuff: Option<usize>,
    mid_rise: f64,
}

impl PantsHalf {
    pub fn new(tag: &str, body: &BodyParameters, design: &PantsDesign) -> Result<Self> {
        let waist = require_positive("pants.waist", design.waist.v)?;
        let width_hips = require_positive("pants.width_hips", design.width_hips.v)?;
        let mid_rise = (design.back_rise.v + design.front_rise.v) / 2.0;
        let hips_crotch_diff = mid_rise - design.length_waist_to_hip.v;
        let body_crotch_height =
            (body.hips_line - body.crotch_hip_diff) * (1.0 + design.crotch_shift_ratio.v);

        let front_sizes = PantPanelSizes {
            rise: design.front_rise.v,
            mid_rise,
            waist: waist / 2.0,
            hips: width_hips / 2.0,
            crotch_extension: width_hips / 8.0,
            hips_crotch_diff,
            body_crotch_height,
            crotch_hip_diff: hips_crotch_diff,
            dart_position: waist / 4.0,
            match_top_int_to: Some(waist / 2.0),
            hipline_ext: 1.0,
            double_dart: design.double_dart.v,
        };
        let back_sizes = PantPanelSizes {
            rise: design.back_rise.v,
            crotch_extension: width_hips / 8.0 + 3.0,
            dart_position: width_hips / 4.0,
            hipline_ext: 1.1,
            double_dart: false,
            ..front_sizes.clone()
        };

        let front_name = format!("pant_f_{tag}");
        let mut front = PantPanel::new(&front_name, design, &front_sizes)?.panel;
        front.translate_by(Vector3::new(0.0, body.waist_level() - 5.0, 25.0));
        let mut back = PantPanel::new(&format!("pant_b_{tag}"), design, &back_sizes)?.panel;
        back.translate_by(Vector3::new(0.0, body.waist_level() - 5.0, -20.0));

        let mut component = Component::new(format!("pants_{tag}"));
        component.stitch(
            front.interface("outside")?.clone(),
            back.interface("outside")?.clone(),
        );
        component.stitch(
            front.interface("inside")?.clone(),
            back.interface("inside")?.clone(),
        );
        for (key, panel, name) in [
            ("crotch_f", &front, "crotch"),
            ("crotch_b", &back, "crotch"),
            ("top_f", &front, "top"),
            ("top_b", &back, "top"),
        ] {
            component
                .interfaces
                .insert(key.to_string(), panel.interface(name)?.clone());
        }

        let pant_bottom = Interface::from_multiple([
            front.interface("bottom")?.clone(),
            back.interface("bottom")?.clone(),
        ]);
        component.panels = vec![front, back];

        let mut cuff_index = None;
        if let Some(kind) = design.cuff.cuff_type.v.as_deref() {
            let bottom_length = pant_bottom.length(&component.panels)?;
            let b_width = bottom_length / design.cuff.top_ruffle.v;
            let cuff_len = design.cuff.cuff_len.v * body.leg_length();

            let mut cuff = bands::cuff(kind, &format!("pant_{tag}"), b_width, cuff_len, &design.cuff)?;
            let cuff_top = cuff.interface("top")?.clone();
            cuff.place_by_interface(
                &cuff_top,
                &pant_bottom,
                component.panels.as_slice(),
                CUFF_GAP,
                Alignment::Left,
            )?;
            // Leg bottoms run towards the side seam, cuff tops away from it
            component.stitch(pant_bottom, cuff_top.flip_edges());
            cuff_index = Some(component.subs.len());
            component.subs.push(cuff);
        }

        Ok(Self {
            component,
            front: front_name,
            cuff: cuff_index,
            mid_rise,
        })
    }

    /// Leg length: front panel height plus the cuff.
    pub fn length(&self) -> f64 {
        let front = self
            .component
            .find_panel(&self.front)
            .map_or(0.0, Panel::length);
        let cuff = self
            .cuff
            .and_then(|i| self.component.subs.get(i))
            .map_or(0.0, Component::length);
        front + cuff
    }

    /// Mean of front and back rise.
    pub fn get_rise(&self) -> f64 {
        self.mid_rise
    }
}

/// Full pants: right leg and mirrored left leg sewn at the crotch.
#[derive(Debug, Clone)]
pub struct Pants {
    pub component: Component,
    right_length: f64,
    rise: f64,
}

impl Pants {
    pub fn new(body: &BodyParameters, design: &PantsDesign) -> Result<Self> {
        let right = PantsHalf::new("r", body, design)?;
        let right_length = right.length();
        let rise = right.get_rise();
        let right = right.component;
        let mut left = PantsHalf::new("l", body, design)?.component;
        left.mirror();

        let mut component = Component::new("pants");
        component.stitch(
            right.interface("crotch_f")?.clone(),
            left.interface("crotch_f")?.clone(),
        );
        component.stitch(
            right.interface("crotch_b")?.clone(),
            left.interface("crotch_b")?.clone(),
        );

        let top_f = |c: &Component| c.interface("top_f").cloned();
        let top_b = |c: &Component| c.interface("top_b").cloned();
        component.interfaces.insert(
            "top_f".into(),
            Interface::from_multiple([top_f(&right)?, top_f(&left)?]),
        );
        component.interfaces.insert(
            "top_b".into(),
            Interface::from_multiple([top_b(&right)?, top_b(&left)?]),
        );
        // Around the body from the front centre, right side first
        component.interfaces.insert(
            "top".into(),
            Interface::from_multiple([
                top_f(&right)?.reverse(true),
                top_b(&right)?,
                top_b(&left)?.reverse(true),
                top_f(&left)?,
            ]),
        );

        component.subs = vec![right, left];
        Ok(Self {
            component,
            right_length,
            rise,
        })
    }

    /// Leg length.
    pub fn length(&self) -> f64 {
        self.right_length
    }

    /// Mean of front and back rise.
    pub fn get_rise(&self) -> f64 {
        self.rise
    }
}
