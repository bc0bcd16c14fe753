//! 2D geometry of panel outlines.

mod edge;
mod fit;
mod sequence;

pub use edge::{abs_to_rel, rel_to_abs, Curvature, Edge, EdgeId};
pub use fit::CurveFit;
pub use sequence::EdgeSequence;

use nalgebra::{Point2, Vector2};

/// Shorthand for a panel-space point.
#[inline]
pub fn pt(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

/// Shorthand for a panel-space direction.
#[inline]
pub fn dir(x: f64, y: f64) -> Vector2<f64> {
    Vector2::new(x, y)
}

/// Check if two segments cross, ignoring contacts at shared endpoints.
pub fn segments_intersect(
    a0: Point2<f64>,
    a1: Point2<f64>,
    b0: Point2<f64>,
    b1: Point2<f64>,
) -> bool {
    use crate::config::EPS;

    let cross = |o: Point2<f64>, p: Point2<f64>, q: Point2<f64>| {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };

    let d1 = cross(b0, b1, a0);
    let d2 = cross(b0, b1, a1);
    let d3 = cross(a0, a1, b0);
    let d4 = cross(a0, a1, b1);

    // Proper crossing only; touching and collinear overlaps are left to callers
    ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
}
