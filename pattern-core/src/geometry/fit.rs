//! Curve construction from endpoint tangents.
//!
//! Garment outlines are drawn as chains of short curves whose tangents have
//! to agree at the joints. [`CurveFit`] builds one such curve from its
//! endpoints plus any mix of:
//!
//! - explicit target tangents at the start and/or the end,
//! - neighbour points (`pre_start`, `post_end`) from which tangents are
//!   derived Catmull-Rom style.
//!
//! A single constrained tangent gives a quadratic curve whose control point
//! slides along the tangent ray to the position of least bending energy.
//! Two tangents on [`CurveFit::curve_from_tangents`] give the quadratic whose
//! control point is the intersection of both rays; when the rays do not meet
//! in front of the endpoints the control point is found by a Nelder-Mead
//! search that trades tangent mismatch against bending energy.

use crate::config::{
    CURVE_FIT_MAX_ITERATIONS, CURVE_FIT_REGULARIZATION, CURVE_FIT_SAMPLES, EPS, MIN_EDGE_LENGTH,
};
use crate::error::{PatternError, Result};
use crate::geometry::edge::{rel_to_abs, Edge};
use nalgebra::{Point2, Vector2};
use tracing::debug;

/// Builder for tangent-constrained curves.
#[derive(Debug, Clone)]
pub struct CurveFit {
    start: Point2<f64>,
    end: Point2<f64>,
    tan0: Option<Vector2<f64>>,
    tan1: Option<Vector2<f64>>,
    pre_start: Option<Point2<f64>>,
    post_end: Option<Point2<f64>>,
    initial_guess: [f64; 2],
}

impl CurveFit {
    /// Start a curve between two points.
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self {
            start,
            end,
            tan0: None,
            tan1: None,
            pre_start: None,
            post_end: None,
            initial_guess: [0.5, 0.0],
        }
    }

    /// Required direction of travel at the start.
    pub fn target_tan0(mut self, tangent: Vector2<f64>) -> Self {
        self.tan0 = Some(tangent);
        self
    }

    /// Required direction of travel at the end.
    pub fn target_tan1(mut self, tangent: Vector2<f64>) -> Self {
        self.tan1 = Some(tangent);
        self
    }

    /// Point preceding the start on the outline.
    pub fn pre_start(mut self, point: Point2<f64>) -> Self {
        self.pre_start = Some(point);
        self
    }

    /// Point following the end on the outline.
    pub fn post_end(mut self, point: Point2<f64>) -> Self {
        self.post_end = Some(point);
        self
    }

    /// Starting control point for the numeric search, chord-relative.
    pub fn initial_guess(mut self, guess: [f64; 2]) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Quadratic curve honouring the explicit target tangents.
    ///
    /// Neighbour points are ignored. Without any target the result is a
    /// straight edge.
    pub fn curve_from_tangents(&self) -> Result<Edge> {
        let chord = self.checked_chord()?;
        let tan0 = self.tan0.map(|t| unit(t, "start tangent")).transpose()?;
        let tan1 = self.tan1.map(|t| unit(t, "end tangent")).transpose()?;

        let control = match (tan0, tan1) {
            (None, None) => return Ok(Edge::line(self.start, self.end)),
            (Some(t0), None) => {
                let k = minimize_along_ray(|k| {
                    let c = self.start + t0 * (k * chord);
                    bending_energy(self.start, c, self.end)
                });
                self.start + t0 * (k * chord)
            }
            (None, Some(t1)) => {
                let k = minimize_along_ray(|k| {
                    let c = self.end - t1 * (k * chord);
                    bending_energy(self.start, c, self.end)
                });
                self.end - t1 * (k * chord)
            }
            (Some(t0), Some(t1)) => match ray_intersection(self.start, t0, self.end, t1) {
                Some(c) => c,
                None => self.search_control(Some(t0), Some(t1)),
            },
        };

        Ok(Edge::quadratic(self.start, control, self.end))
    }

    /// Curve through the endpoints with tangents taken from explicit targets
    /// or, failing that, from the neighbour points.
    ///
    /// Both tangents known gives a cubic Hermite segment, one tangent a
    /// quadratic curve, none a straight edge.
    pub fn interpolate_with_tangents(&self) -> Result<Edge> {
        let chord = self.checked_chord()?;
        let tan0 = match (self.tan0, self.pre_start) {
            (Some(t), _) => Some(unit(t, "start tangent")?),
            (None, Some(pre)) => Some(unit(self.end - pre, "start tangent from pre_start")?),
            (None, None) => None,
        };
        let tan1 = match (self.tan1, self.post_end) {
            (Some(t), _) => Some(unit(t, "end tangent")?),
            (None, Some(post)) => Some(unit(post - self.start, "end tangent from post_end")?),
            (None, None) => None,
        };

        match (tan0, tan1) {
            (Some(t0), Some(t1)) => {
                let handle = chord / 3.0;
                Ok(Edge::cubic(
                    self.start,
                    self.start + t0 * handle,
                    self.end - t1 * handle,
                    self.end,
                ))
            }
            _ => {
                let mut fit = CurveFit::new(self.start, self.end).initial_guess(self.initial_guess);
                fit.tan0 = tan0;
                fit.tan1 = tan1;
                fit.curve_from_tangents()
            }
        }
    }

    fn checked_chord(&self) -> Result<f64> {
        let chord = (self.end - self.start).norm();
        if chord < MIN_EDGE_LENGTH {
            return Err(PatternError::geometry(format!(
                "curve endpoints coincide at ({:.3}, {:.3})",
                self.start.x, self.start.y
            )));
        }
        Ok(chord)
    }

    /// Numeric search of the control point in chord-relative coordinates.
    fn search_control(&self, tan0: Option<Vector2<f64>>, tan1: Option<Vector2<f64>>) -> Point2<f64> {
        let (start, end) = (self.start, self.end);
        let loss = |x: &[f64]| {
            let c = rel_to_abs(start, end, [x[0], x[1]]);
            let mut fin = 0.0;
            if let Some(t0) = tan0 {
                fin += tangent_mismatch(c - start, t0);
            }
            if let Some(t1) = tan1 {
                fin += tangent_mismatch(end - c, t1);
            }
            fin + CURVE_FIT_REGULARIZATION * bending_energy(start, c, end)
        };

        let best = nelder_mead(loss, &self.initial_guess, 0.1, CURVE_FIT_MAX_ITERATIONS);
        debug!(
            "Curve fit fallback: guess {:?} -> [{:.4}, {:.4}]",
            self.initial_guess, best[0], best[1]
        );
        rel_to_abs(start, end, [best[0], best[1]])
    }
}

fn unit(v: Vector2<f64>, what: &str) -> Result<Vector2<f64>> {
    let norm = v.norm();
    if norm < EPS {
        return Err(PatternError::geometry(format!("{} has zero length", what)));
    }
    Ok(v / norm)
}

fn tangent_mismatch(direction: Vector2<f64>, target: Vector2<f64>) -> f64 {
    let norm = direction.norm();
    if norm < EPS {
        // Undefined direction counts as opposite
        return 4.0;
    }
    (direction / norm - target).norm_squared()
}

/// Intersection of `a + s * da` and `b - u * db` with `s, u > 0`.
fn ray_intersection(
    a: Point2<f64>,
    da: Vector2<f64>,
    b: Point2<f64>,
    db: Vector2<f64>,
) -> Option<Point2<f64>> {
    let d = b - a;
    let det = da.x * db.y - da.y * db.x;
    if det.abs() < EPS {
        return None;
    }
    let s = (d.x * db.y - d.y * db.x) / det;
    let u = (da.x * d.y - da.y * d.x) / det;
    if s > EPS && u > EPS {
        Some(a + da * s)
    } else {
        None
    }
}

/// Dimensionless bending energy of a quadratic curve: chord length times the
/// integral of squared curvature over arc length.
fn bending_energy(start: Point2<f64>, control: Point2<f64>, end: Point2<f64>) -> f64 {
    let chord = (end - start).norm();
    let second = (end.coords - control.coords * 2.0 + start.coords) * 2.0;
    let n = CURVE_FIT_SAMPLES;
    let dt = 1.0 / n as f64;

    let mut energy = 0.0;
    for i in 0..n {
        let t = (i as f64 + 0.5) * dt;
        let d = (control - start) * (2.0 * (1.0 - t)) + (end - control) * (2.0 * t);
        let speed = d.norm();
        if speed < EPS {
            return 1e6;
        }
        let kappa = (d.x * second.y - d.y * second.x) / (speed * speed * speed);
        energy += kappa * kappa * speed * dt;
    }
    energy * chord
}

/// Golden-section search of the control distance along a tangent ray, as a
/// multiple of the chord length in [0.05, 1].
///
/// A faint pull toward 0.5 breaks ties for collinear configurations.
fn minimize_along_ray(energy: impl Fn(f64) -> f64) -> f64 {
    let f = |k: f64| energy(k) + 1e-6 * (k - 0.5) * (k - 0.5);
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let (mut lo, mut hi) = (0.05, 1.0);
    let mut c = hi - ratio * (hi - lo);
    let mut d = lo + ratio * (hi - lo);
    let (mut fc, mut fd) = (f(c), f(d));

    for _ in 0..80 {
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - ratio * (hi - lo);
            fc = f(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + ratio * (hi - lo);
            fd = f(d);
        }
    }
    (lo + hi) / 2.0
}

/// Minimise `f` with the Nelder-Mead simplex method.
pub(crate) fn nelder_mead(
    f: impl Fn(&[f64]) -> f64,
    x0: &[f64],
    step: f64,
    max_iterations: usize,
) -> Vec<f64> {
    let n = x0.len();
    let mut simplex: Vec<Vec<f64>> = vec![x0.to_vec()];
    for i in 0..n {
        let mut x = x0.to_vec();
        x[i] += step;
        simplex.push(x);
    }
    let mut values: Vec<f64> = simplex.iter().map(|x| f(x.as_slice())).collect();

    // x = c + k * (w - c)
    let combine = |c: &[f64], w: &[f64], k: f64| -> Vec<f64> {
        c.iter().zip(w).map(|(ci, wi)| ci + k * (wi - ci)).collect()
    };

    for _ in 0..max_iterations {
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let size = simplex[1..]
            .iter()
            .map(|x| {
                x.iter()
                    .zip(&simplex[0])
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max);
        if size < 1e-10 {
            break;
        }

        let centroid: Vec<f64> = (0..n)
            .map(|j| simplex[..n].iter().map(|x| x[j]).sum::<f64>() / n as f64)
            .collect();
        let worst = simplex[n].clone();

        let reflected = combine(&centroid, &worst, -1.0);
        let fr = f(reflected.as_slice());

        if fr < values[0] {
            let expanded = combine(&centroid, &worst, -2.0);
            let fe = f(expanded.as_slice());
            if fe < fr {
                simplex[n] = expanded;
                values[n] = fe;
            } else {
                simplex[n] = reflected;
                values[n] = fr;
            }
            continue;
        }
        if fr < values[n - 1] {
            simplex[n] = reflected;
            values[n] = fr;
            continue;
        }

        let (contracted, fc_limit) = if fr < values[n] {
            (combine(&centroid, &worst, -0.5), fr)
        } else {
            (combine(&centroid, &worst, 0.5), values[n])
        };
        let fc = f(contracted.as_slice());
        if fc < fc_limit {
            simplex[n] = contracted;
            values[n] = fc;
            continue;
        }

        // Shrink toward the best vertex
        let best = simplex[0].clone();
        for i in 1..=n {
            simplex[i] = combine(&best, &simplex[i], 0.5);
            values[i] = f(simplex[i].as_slice());
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);
    simplex[best].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Curvature;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    fn close(a: Vector2<f64>, b: Vector2<f64>, tol: f64) -> bool {
        (a - b).norm() < tol
    }

    #[test]
    fn test_no_tangents_gives_line() {
        let e = CurveFit::new(p(0.0, 0.0), p(1.0, 1.0))
            .curve_from_tangents()
            .unwrap();
        assert!(e.is_straight());
    }

    #[test]
    fn test_start_tangent_is_exact() {
        let e = CurveFit::new(p(-25.0, 92.5), p(-20.0, 112.5))
            .target_tan0(v(0.0, 1.0))
            .curve_from_tangents()
            .unwrap();
        assert!(close(e.unit_tangent(0.0), v(0.0, 1.0), 1e-9));
        assert_eq!(e.start, p(-25.0, 92.5));
        assert_eq!(e.end, p(-20.0, 112.5));
    }

    #[test]
    fn test_end_tangent_is_exact() {
        let e = CurveFit::new(p(0.0, 0.0), p(-24.0, 25.0))
            .target_tan1(v(0.0, 1.0))
            .curve_from_tangents()
            .unwrap();
        assert!(close(e.unit_tangent(1.0), v(0.0, 1.0), 1e-9));
    }

    #[test]
    fn test_collinear_tangent_keeps_control_inside_chord() {
        let e = CurveFit::new(p(0.0, 0.0), p(0.0, 10.0))
            .target_tan1(v(0.0, 1.0))
            .curve_from_tangents()
            .unwrap();
        match e.curvature {
            Curvature::Quadratic { control } => {
                assert!(control.x.abs() < 1e-9);
                assert!((control.y - 5.0).abs() < 0.1);
            }
            _ => panic!("expected quadratic"),
        }
        assert!((e.length() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_both_tangents_use_ray_intersection() {
        let e = CurveFit::new(p(0.0, 92.5), p(6.25, 85.0))
            .target_tan0(v(0.0, -1.0))
            .target_tan1(v(1.0, 0.0))
            .initial_guess([0.5, -0.5])
            .curve_from_tangents()
            .unwrap();
        assert_eq!(e.curvature, Curvature::Quadratic { control: p(0.0, 85.0) });
    }

    #[test]
    fn test_incompatible_tangents_fall_back_to_search() {
        // Parallel tangents cannot be met by a quadratic curve
        let e = CurveFit::new(p(0.0, 0.0), p(10.0, 0.0))
            .target_tan0(v(0.0, 1.0))
            .target_tan1(v(0.0, 1.0))
            .curve_from_tangents()
            .unwrap();
        assert_eq!(e.start, p(0.0, 0.0));
        assert_eq!(e.end, p(10.0, 0.0));
        assert!(e.length().is_finite());
        assert!(e.length() >= 10.0);
    }

    #[test]
    fn test_interpolate_derives_tangents_from_neighbours() {
        let pre = p(0.0, 0.0);
        let start = p(1.0, 1.0);
        let end = p(2.0, 3.0);
        let post = p(2.5, 6.0);
        let e = CurveFit::new(start, end)
            .pre_start(pre)
            .post_end(post)
            .interpolate_with_tangents()
            .unwrap();

        assert!(matches!(e.curvature, Curvature::Cubic { .. }));
        assert!(close(e.unit_tangent(0.0), (end - pre).normalize(), 1e-9));
        assert!(close(e.unit_tangent(1.0), (post - start).normalize(), 1e-9));
    }

    #[test]
    fn test_explicit_tangent_overrides_neighbour() {
        let e = CurveFit::new(p(0.0, 0.0), p(0.0, 10.0))
            .pre_start(p(5.0, -10.0))
            .target_tan0(v(1.0, 0.0))
            .interpolate_with_tangents()
            .unwrap();
        assert!(close(e.unit_tangent(0.0), v(1.0, 0.0), 1e-9));
    }

    #[test]
    fn test_interpolate_single_neighbour_gives_quadratic() {
        let e = CurveFit::new(p(3.0, 30.0), p(2.0, 0.0))
            .pre_start(p(4.0, 55.0))
            .interpolate_with_tangents()
            .unwrap();
        assert!(matches!(e.curvature, Curvature::Quadratic { .. }));
        assert!(close(
            e.unit_tangent(0.0),
            (p(2.0, 0.0) - p(4.0, 55.0)).normalize(),
            1e-9
        ));
    }

    #[test]
    fn test_degenerate_inputs_are_rejected() {
        let err = CurveFit::new(p(1.0, 1.0), p(1.0, 1.0))
            .curve_from_tangents()
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidGeometry { .. }));

        let err = CurveFit::new(p(0.0, 0.0), p(1.0, 0.0))
            .target_tan0(v(0.0, 0.0))
            .curve_from_tangents()
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_nelder_mead_bowl() {
        let x = nelder_mead(
            |x| (x[0] - 1.0).powi(2) + 3.0 * (x[1] + 2.0).powi(2),
            &[0.0, 0.0],
            0.5,
            500,
        );
        assert!((x[0] - 1.0).abs() < 1e-4);
        assert!((x[1] + 2.0).abs() < 1e-4);
    }
}
