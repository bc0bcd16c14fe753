//! Simulation driver: output layout, simulation properties and the
//! backend that meshes and drapes a serialized pattern.

mod paths;
mod props;
mod runner;

pub use paths::{garment_name_from_spec, PathConfig};
pub use props::{PropsSection, SectionStats, SimProperties, RENDER_STATS, SIM_STATS};
pub use runner::{
    program_exists, simulate_garment, ExternalBackend, SimulationBackend, SimulationStats,
};
