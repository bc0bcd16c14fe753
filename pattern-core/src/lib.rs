//! pattern-core - Core library for parametric garment patterns.
//!
//! Builds sewing pattern panels (shirt torso, pants, cuffs) from body
//! measurements and design parameters, resolves the stitches between them,
//! serializes the result as a JSON pattern specification and hands it to an
//! external cloth simulator.
//!
//! # Example
//!
//! ```no_run
//! use pattern_core::{BodyParameters, GarmentDesign, MetaGarment};
//! use std::path::Path;
//!
//! let body = BodyParameters::load(Path::new("assets/bodies/mean_all.yaml")).unwrap();
//! let design = GarmentDesign::load(Path::new("assets/design_params/t-shirt.yaml")).unwrap();
//! let garment = MetaGarment::new("t-shirt", &body, &design).unwrap();
//! let pattern = garment.assembly().unwrap();
//! println!("{} panels, {} stitches", pattern.panels.len(), pattern.stitches.len());
//! ```

pub mod config;
pub mod error;
pub mod garments;
pub mod generator;
pub mod geometry;
pub mod model;
pub mod params;
pub mod sim;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use error::{ErrorCode, PatternError, Result};
pub use garments::MetaGarment;
pub use generator::{serialize_pattern, timestamp_tag, PatternSpec, SerializeOptions};
pub use model::{Component, Interface, Panel, Pattern, Stitch};
pub use params::{BodyParameters, GarmentDesign};
pub use sim::{ExternalBackend, PathConfig, SimProperties, SimulationBackend, SimulationStats};
pub use validation::{validate_pattern, ValidationResult};

use config::INTERMEDIATES_FOLDER;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Build and assemble the garment described by a design file.
///
/// The garment is named after the design file stem.
pub fn build_pattern(body_path: &Path, garment_path: &Path) -> Result<Pattern> {
    let body = BodyParameters::load(body_path)?;
    let design = GarmentDesign::load(garment_path)?;
    let name = garment_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("garment");

    let garment = MetaGarment::new(name, &body, &design)?;
    let pattern = garment.assembly()?;
    if garment.is_self_intersecting() {
        warn!("{} is self-intersecting", garment.name);
    }

    let validation = validate_pattern(&pattern);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    for error in &validation.errors {
        warn!("{}", error);
    }
    Ok(pattern)
}

/// Build the garment and write its specification under
/// `<output_root>/intermediates`.
///
/// This is the main high-level function that performs the full pattern pipeline:
/// 1. Load body measurements and design parameters
/// 2. Build and assemble the garment
/// 3. Serialize into a timestamped folder
///
/// # Returns
///
/// Path of the written `_specification.json`.
pub fn generate_garment_specification(
    body_path: &Path,
    garment_path: &Path,
    output_root: &Path,
) -> Result<PathBuf> {
    let pattern = build_pattern(body_path, garment_path)?;
    let serialized = serialize_pattern(
        &pattern,
        &output_root.join(INTERMEDIATES_FOLDER),
        &SerializeOptions::timestamped(),
    )?;
    Ok(serialized.specification)
}

/// Simulate a serialized pattern on a body mesh.
///
/// Results go to a timestamped folder under `<output_root>/intermediates`.
pub fn run_simulation(
    body_mesh: &Path,
    spec_path: &Path,
    sim_config: &Path,
    output_root: &Path,
    backend: &dyn SimulationBackend,
) -> Result<SimulationStats> {
    let mut props = SimProperties::load(sim_config)?;
    let tag = timestamp_tag();
    let paths = PathConfig::from_specification(
        spec_path,
        &output_root.join(INTERMEDIATES_FOLDER),
        body_mesh,
        Some(&tag),
    );
    info!("Simulation output: {}", paths.out_element.display());
    sim::simulate_garment(backend, &paths, &mut props)
}
