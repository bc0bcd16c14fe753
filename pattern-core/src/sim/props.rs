//! Simulation properties file.
//!
//! ```yaml
//! sim:
//!   config:
//!     resolution_scale: 1.0
//!   stats: {}
//! render:
//!   config:
//!     uv_texture: { ... }
//!   stats: {}
//! ```
//!
//! `config` sections are passed through to the simulator untouched. `stats`
//! sections hold per-garment results keyed by stat name, then garment name.

use super::SimulationStats;
use crate::error::{PatternError, Result};
use crate::params::require_positive;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Stat name -> garment name -> value.
pub type SectionStats = BTreeMap<String, BTreeMap<String, Value>>;

/// Stat names reset before each simulation run.
pub const SIM_STATS: [&str; 6] = [
    "fails",
    "sim_time",
    "spf",
    "fin_frame",
    "body_collisions",
    "self_collisions",
];

/// Stat names reset before each render.
pub const RENDER_STATS: [&str; 1] = ["render_time"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropsSection {
    #[serde(default)]
    pub config: Mapping,
    #[serde(default)]
    pub stats: SectionStats,
}

/// Simulation and render configuration plus recorded statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimProperties {
    #[serde(default)]
    pub sim: PropsSection,
    #[serde(default)]
    pub render: PropsSection,
    /// Other top-level sections, kept as is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SimProperties {
    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PatternError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        serde_yaml::from_str(&text).map_err(|source| PatternError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|source| PatternError::Yaml {
            path: Default::default(),
            source,
        })
    }

    /// Write to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_yaml::to_string(self).map_err(|source| PatternError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Box mesh resolution (`sim.config.resolution_scale`).
    pub fn resolution_scale(&self) -> Result<f64> {
        let field = "sim.config.resolution_scale";
        match self.sim.config.get("resolution_scale") {
            Some(value) => match value.as_f64() {
                Some(scale) => require_positive(field, scale),
                None => Err(PatternError::InvalidValue {
                    field: field.to_string(),
                    expected: "a positive number".to_string(),
                    value: format!("{value:?}"),
                }),
            },
            None => Err(PatternError::InvalidValue {
                field: field.to_string(),
                expected: "a positive number".to_string(),
                value: "missing".to_string(),
            }),
        }
    }

    /// UV texture settings (`render.config.uv_texture`).
    pub fn uv_texture(&self) -> Option<&Value> {
        self.render.config.get("uv_texture")
    }

    /// Replace the stats of both sections with empty entries.
    pub fn reset_stats(&mut self) {
        self.sim.stats = empty_stats(&SIM_STATS);
        self.render.stats = empty_stats(&RENDER_STATS);
    }

    /// Record the results of simulating `garment`.
    ///
    /// Failures are listed per failure kind.
    pub fn record_stats(&mut self, garment: &str, stats: &SimulationStats) {
        let sim = &mut self.sim.stats;
        let mut put = |key: &str, value: Value| {
            sim.entry(key.to_string())
                .or_default()
                .insert(garment.to_string(), value);
        };
        put("sim_time", stats.sim_time.into());
        put("spf", stats.spf.into());
        put("fin_frame", stats.fin_frame.into());
        put("body_collisions", stats.body_collisions.into());
        put("self_collisions", stats.self_collisions.into());

        let fails = self.sim.stats.entry("fails".to_string()).or_default();
        for kind in &stats.fails {
            let slot = fails
                .entry(kind.clone())
                .or_insert_with(|| Value::Sequence(Vec::new()));
            if let Value::Sequence(names) = slot {
                names.push(garment.into());
            }
        }

        if let Some(render_time) = stats.render_time {
            self.render
                .stats
                .entry("render_time".to_string())
                .or_default()
                .insert(garment.to_string(), render_time.into());
        }
    }
}

fn empty_stats(keys: &[&str]) -> SectionStats {
    keys.iter().map(|k| (k.to_string(), BTreeMap::new())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PROPS: &str = r#"
sim:
  config:
    resolution_scale: 1.5
    max_sim_steps: 1500
  stats:
    sim_time:
      old_run: 12.0
render:
  config:
    uv_texture:
      seam_width: 0.5
frame_rate: 25
"#;

    #[test]
    fn test_parse_config() {
        let props = SimProperties::from_yaml_str(PROPS).unwrap();
        assert_eq!(props.resolution_scale().unwrap(), 1.5);
        assert!(props.uv_texture().is_some());
        assert_eq!(props.extra["frame_rate"], Value::from(25));
    }

    #[test]
    fn test_missing_resolution_scale() {
        let props = SimProperties::from_yaml_str("sim:\n  config: {}\n").unwrap();
        let err = props.resolution_scale().unwrap_err();
        assert!(err.to_string().contains("sim.config.resolution_scale"));
    }

    #[test]
    fn test_reset_and_record_stats() {
        let mut props = SimProperties::from_yaml_str(PROPS).unwrap();
        props.reset_stats();
        assert_eq!(props.sim.stats.len(), 6);
        assert!(props.sim.stats["sim_time"].is_empty());
        assert_eq!(props.render.stats.keys().collect::<Vec<_>>(), vec!["render_time"]);

        let stats = SimulationStats {
            fails: vec!["static_equilibrium".into()],
            sim_time: 4.5,
            spf: 0.02,
            fin_frame: 220,
            body_collisions: 3,
            self_collisions: 0,
            render_time: None,
        };
        props.record_stats("tee", &stats);
        props.record_stats("pants", &stats);

        assert_eq!(props.sim.stats["fin_frame"]["tee"], Value::from(220));
        assert_eq!(
            props.sim.stats["fails"]["static_equilibrium"],
            Value::Sequence(vec!["tee".into(), "pants".into()])
        );
        assert!(props.render.stats["render_time"].is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim_props.yaml");
        let mut props = SimProperties::from_yaml_str(PROPS).unwrap();
        props.reset_stats();
        props.save(&path).unwrap();

        let reloaded = SimProperties::load(&path).unwrap();
        assert_eq!(reloaded, props);
    }
}
