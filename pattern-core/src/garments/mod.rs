//! Garment programs: parametric panels assembled into garments.

pub mod bands;
mod meta;
mod pants;
mod torso;

pub use bands::{CuffBand, CuffSkirt};
pub use meta::MetaGarment;
pub use pants::{PantPanel, PantPanelSizes, Pants, PantsHalf};
pub use torso::{Shirt, TorsoBackHalfPanel, TorsoFrontHalfPanel, TorsoHalf};
