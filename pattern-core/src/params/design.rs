//! Garment design parameters.
//!
//! Every leaf of a design file is a map with the value under `v`; other
//! keys (`range`, `type`, ...) describe the parameter space and are ignored.

use crate::error::Result;
use crate::params::{load_section, parse_section};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A design parameter leaf.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Param<T> {
    pub v: T,
}

impl<T> Param<T> {
    pub fn new(v: T) -> Self {
        Self { v }
    }
}

/// The `design:` section of a garment design file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GarmentDesign {
    #[serde(default)]
    pub meta: MetaDesign,
    #[serde(default)]
    pub shirt: Option<ShirtDesign>,
    #[serde(default)]
    pub pants: Option<PantsDesign>,
}

/// Garment program selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetaDesign {
    /// Upper garment program (`Shirt`) or none.
    #[serde(default)]
    pub upper: Param<Option<String>>,
    /// Bottom garment program (`Pants`) or none.
    #[serde(default)]
    pub bottom: Param<Option<String>>,
}

/// Straight, non-fitted upper garment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShirtDesign {
    pub width_chest: Param<f64>,
    pub width_waist: Param<f64>,
    pub width_hip: Param<f64>,
    pub front_length: Param<f64>,
    pub back_length: Param<f64>,
    /// Vertical distance from the waist to the bust line.
    pub waist_over_bust_line_height: Param<f64>,
    /// Armhole depth below the shoulder line.
    pub scye_depth: Param<f64>,
    pub shoulder_slant: Param<f64>,
    /// Shape the back bottom so front and back panels share one height.
    #[serde(default = "default_true")]
    pub match_back_to_front: Param<bool>,
}

/// Fitted pants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantsDesign {
    pub waist: Param<f64>,
    pub width_hips: Param<f64>,
    pub front_rise: Param<f64>,
    pub back_rise: Param<f64>,
    pub length_waist_to_hip: Param<f64>,
    /// Crotch placement relative to the body crotch height.
    pub crotch_shift_ratio: Param<f64>,
    /// Leg section lengths, top to bottom.
    pub length_1: Param<f64>,
    pub length_2: Param<f64>,
    pub length_3: Param<f64>,
    /// Leg widths at the section boundaries, top to bottom.
    pub width_1: Param<f64>,
    pub width_2: Param<f64>,
    pub width_3: Param<f64>,
    pub width_4: Param<f64>,
    /// Two smaller darts per panel instead of one.
    #[serde(default)]
    pub double_dart: Param<bool>,
    #[serde(default)]
    pub cuff: CuffDesign,
}

/// Cuff at the bottom of the pant legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuffDesign {
    /// Cuff program (`CuffBand`, `CuffSkirt`) or none.
    #[serde(rename = "type", default)]
    pub cuff_type: Param<Option<String>>,
    /// Leg bottom length over cuff top length.
    #[serde(default = "default_one")]
    pub top_ruffle: Param<f64>,
    /// Cuff length as a fraction of the leg length.
    #[serde(default = "default_cuff_len")]
    pub cuff_len: Param<f64>,
    /// Flare of a skirt cuff: bottom width over top width.
    #[serde(default = "default_skirt_ruffle")]
    pub skirt_ruffle: Param<f64>,
}

impl Default for CuffDesign {
    fn default() -> Self {
        Self {
            cuff_type: Param::new(None),
            top_ruffle: default_one(),
            cuff_len: default_cuff_len(),
            skirt_ruffle: default_skirt_ruffle(),
        }
    }
}

fn default_true() -> Param<bool> {
    Param::new(true)
}

fn default_one() -> Param<f64> {
    Param::new(1.0)
}

fn default_cuff_len() -> Param<f64> {
    Param::new(0.1)
}

fn default_skirt_ruffle() -> Param<f64> {
    Param::new(1.5)
}

impl GarmentDesign {
    /// Load the `design:` section of a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        load_section(path, "design")
    }

    /// Parse the `design:` section of a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        parse_section(text, "design")
    }
}
