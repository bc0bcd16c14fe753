//! Configuration constants and settings for pattern construction.

/// Floating-point comparison epsilon (pattern units are centimeters).
pub const EPS: f64 = 0.0001;

/// Edges shorter than this are considered degenerate.
pub const MIN_EDGE_LENGTH: f64 = 0.001;

/// Weight of the bending energy term when fitting curves to tangents.
pub const CURVE_FIT_REGULARIZATION: f64 = 0.001;

/// Number of samples used to integrate the bending energy of a curve.
pub const CURVE_FIT_SAMPLES: usize = 24;

/// Nelder-Mead iteration cap for curve fitting.
pub const CURVE_FIT_MAX_ITERATIONS: usize = 500;

/// Arc length integration tolerance.
pub const ARC_LENGTH_TOLERANCE: f64 = 1e-9;

/// Recursion cap for adaptive arc length integration.
pub const ARC_LENGTH_MAX_DEPTH: usize = 18;

/// Polyline resolution for curved edges (intersection tests, previews).
pub const POLYLINE_SAMPLES: usize = 20;

/// Breakpoints on two stitched sides closer than this fraction of the
/// interface length are treated as the same vertex.
pub const STITCH_MATCH_TOLERANCE: f64 = 0.02;

/// Cap on edge splits while matching stitched sides.
pub const STITCH_MAX_SPLITS: usize = 256;

/// Stitched edges whose lengths differ by more than this ratio are reported.
pub const STITCH_LENGTH_WARN_RATIO: f64 = 0.1;

/// Pattern units per meter (centimeters).
pub const UNITS_IN_METER: u32 = 100;

/// Suffix of the serialized specification file.
pub const SPECIFICATION_SUFFIX: &str = "_specification.json";

/// Suffix of the 2D pattern preview.
pub const PATTERN_SVG_SUFFIX: &str = "_pattern.svg";

/// Format of the timestamp tag appended to output folders.
pub const TIMESTAMP_FORMAT: &str = "%y%m%d-%H-%M-%S";

/// Default garment design file.
pub const DEFAULT_GARMENT_PATH: &str = "assets/design_params/t-shirt.yaml";

/// Default simulation properties file.
pub const DEFAULT_SIM_CONFIG: &str = "./assets/Sim_props/default_sim_props.yaml";

/// Default output folder.
pub const DEFAULT_OUTPUT_FOLDER: &str = "./output";

/// Subfolder of the output folder holding specifications and simulation results.
pub const INTERMEDIATES_FOLDER: &str = "intermediates";

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }

    /// Check if a is in range [min, max] with epsilon tolerance.
    #[inline]
    pub fn in_range(a: f64, min: f64, max: f64) -> bool {
        a >= min - EPS && a <= max + EPS
    }
}

/// Utility functions for angle operations.
pub mod angle {
    /// Normalize angle to the (-180, 180] range.
    #[inline]
    pub fn normalize_degrees(angle: f64) -> f64 {
        let mut a = angle % 360.0;
        if a <= -180.0 {
            a += 360.0;
        } else if a > 180.0 {
            a -= 360.0;
        }
        // Avoid printing -0 in specifications
        if a == 0.0 {
            a = 0.0;
        }
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(angle::normalize_degrees(0.0), 0.0);
        assert_eq!(angle::normalize_degrees(-0.0).to_bits(), 0.0f64.to_bits());
        assert_eq!(angle::normalize_degrees(190.0), -170.0);
        assert_eq!(angle::normalize_degrees(-190.0), 170.0);
        assert_eq!(angle::normalize_degrees(180.0), 180.0);
        assert_eq!(angle::normalize_degrees(540.0), 180.0);
    }

    #[test]
    fn test_float_cmp() {
        assert!(float_cmp::approx_eq(1.0, 1.00001));
        assert!(!float_cmp::approx_eq(1.0, 1.001));
        assert!(float_cmp::approx_zero(-0.00001));
        assert!(float_cmp::in_range(1.0, 0.0, 1.0));
        assert!(!float_cmp::in_range(1.1, 0.0, 1.0));
    }
}
