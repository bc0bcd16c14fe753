//! Stitch resolution: match two interfaces edge by edge.
//!
//! Both sides are parameterised by normalised cumulative (ruffle-adjusted)
//! length. A breakpoint on one side with no partner on the other splits the
//! corresponding edge there, until both sides have pairwise matching
//! breakpoints. Edges are then sewn in order; each pair joins the ends the
//! two interface walks reach together.

use crate::config::{EPS, STITCH_MATCH_TOLERANCE, STITCH_MAX_SPLITS};
use crate::error::{PatternError, Result};
use crate::geometry::EdgeId;
use crate::model::{
    EdgeLookup, Interface, InterfaceEdge, Panel, Stitch, StitchOrientation, StitchRule, StitchSide,
};
use tracing::debug;

/// Request to split an edge at an arc length from its start.
#[derive(Debug, Clone)]
struct SplitRequest {
    panel: String,
    edge: EdgeId,
    length: f64,
}

/// Resolve stitching rules over a flat panel list.
///
/// Edges of `panels` are split where needed; later rules see the split
/// parts.
pub fn resolve_stitches(panels: &mut [Panel], rules: &[StitchRule]) -> Result<Vec<Stitch>> {
    let mut sides: Vec<(Interface, Interface)> =
        rules.iter().map(|r| (r.a.clone(), r.b.clone())).collect();
    if sides.iter().any(|(a, b)| a.is_empty() || b.is_empty()) {
        return Err(PatternError::EmptyInterface);
    }

    let mut splits = 0;
    while let Some(request) = next_split(&sides, panels)? {
        splits += 1;
        if splits > STITCH_MAX_SPLITS {
            return Err(PatternError::geometry(
                "stitch resolution did not converge",
            ));
        }
        apply_split(panels, &mut sides, &request)?;
    }
    if splits > 0 {
        debug!("Split {} edge(s) to match stitched sides", splits);
    }

    let mut stitches = Vec::new();
    for (a, b) in &sides {
        if a.len() != b.len() {
            return Err(PatternError::geometry(format!(
                "stitched sides have {} and {} edges",
                a.len(),
                b.len()
            )));
        }
        for (ea, eb) in a.edges().iter().zip(b.edges()) {
            let orientation = if ea.flipped == eb.flipped {
                StitchOrientation::Same
            } else {
                StitchOrientation::Reversed
            };
            stitches.push(Stitch {
                a: stitch_side(panels, ea)?,
                b: stitch_side(panels, eb)?,
                orientation,
            });
        }
    }
    Ok(stitches)
}

/// Normalised cumulative breakpoints of an interface, `0.0` and `1.0` included.
pub fn breakpoints(interface: &Interface, lookup: &(impl EdgeLookup + ?Sized)) -> Result<Vec<f64>> {
    let lengths = interface.edge_lengths(lookup)?;
    let scaled: Vec<f64> = lengths
        .iter()
        .zip(interface.edges())
        .map(|(len, e)| len / e.ruffle)
        .collect();
    let total: f64 = scaled.iter().sum();
    if total < EPS {
        return Err(PatternError::geometry("zero-length interface"));
    }

    let mut fractions = Vec::with_capacity(scaled.len() + 1);
    fractions.push(0.0);
    let mut acc = 0.0;
    for len in &scaled {
        acc += len;
        fractions.push(acc / total);
    }
    if let Some(last) = fractions.last_mut() {
        *last = 1.0;
    }
    Ok(fractions)
}

/// Find the first unmatched breakpoint over all rules.
fn next_split(sides: &[(Interface, Interface)], panels: &[Panel]) -> Result<Option<SplitRequest>> {
    for (a, b) in sides {
        let fa = breakpoints(a, panels)?;
        let fb = breakpoints(b, panels)?;
        let inner_a = &fa[1..fa.len() - 1];
        let inner_b = &fb[1..fb.len() - 1];

        let (mut i, mut j) = (0, 0);
        loop {
            match (inner_a.get(i), inner_b.get(j)) {
                (None, None) => break,
                (Some(&x), Some(&y)) if (x - y).abs() < STITCH_MATCH_TOLERANCE => {
                    i += 1;
                    j += 1;
                }
                (Some(&x), Some(&y)) if x < y => return split_at(b, &fb, x, panels).map(Some),
                (Some(_), Some(&y)) => return split_at(a, &fa, y, panels).map(Some),
                (Some(&x), None) => return split_at(b, &fb, x, panels).map(Some),
                (None, Some(&y)) => return split_at(a, &fa, y, panels).map(Some),
            }
        }
    }
    Ok(None)
}

/// Locate the edge of `side` holding `fraction` and the arc length of the
/// split point from the edge start.
fn split_at(
    side: &Interface,
    fractions: &[f64],
    fraction: f64,
    panels: &[Panel],
) -> Result<SplitRequest> {
    let k = fractions
        .windows(2)
        .position(|w| fraction >= w[0] && fraction < w[1])
        .unwrap_or(fractions.len().saturating_sub(2));
    let ie = &side.edges()[k];
    let span = fractions[k + 1] - fractions[k];
    let local = if span > 0.0 {
        (fraction - fractions[k]) / span
    } else {
        0.5
    };

    let edge = panels
        .lookup_edge(&ie.panel, ie.edge)
        .ok_or_else(|| PatternError::EdgeNotFound {
            panel: ie.panel.clone(),
            edge: ie.edge.value(),
        })?;
    let along = if ie.flipped { 1.0 - local } else { local };

    Ok(SplitRequest {
        panel: ie.panel.clone(),
        edge: ie.edge,
        length: along * edge.length(),
    })
}

fn apply_split(
    panels: &mut [Panel],
    sides: &mut [(Interface, Interface)],
    request: &SplitRequest,
) -> Result<()> {
    let panel = panels
        .iter_mut()
        .find(|p| p.name == request.panel)
        .ok_or_else(|| PatternError::PanelNotFound {
            name: request.panel.clone(),
        })?;
    let t = panel
        .edges
        .get(request.edge)
        .map(|e| e.t_at_length(request.length))
        .ok_or_else(|| PatternError::EdgeNotFound {
            panel: request.panel.clone(),
            edge: request.edge.value(),
        })?;
    let (first, second) = panel.split_edge(request.edge, t)?;
    debug!(
        "Split edge {} of {} at length {:.3}",
        request.edge, request.panel, request.length
    );

    for (a, b) in sides.iter_mut() {
        a.substitute(&request.panel, request.edge, &[first, second]);
        b.substitute(&request.panel, request.edge, &[first, second]);
    }
    Ok(())
}

fn stitch_side(panels: &[Panel], ie: &InterfaceEdge) -> Result<StitchSide> {
    let panel = panels
        .lookup_panel(&ie.panel)
        .ok_or_else(|| PatternError::PanelNotFound {
            name: ie.panel.clone(),
        })?;
    let edge = panel
        .edges
        .position(ie.edge)
        .ok_or_else(|| PatternError::EdgeNotFound {
            panel: ie.panel.clone(),
            edge: ie.edge.value(),
        })?;
    Ok(StitchSide {
        panel: ie.panel.clone(),
        edge,
    })
}
