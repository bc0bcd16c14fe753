//! Hand-off to the cloth simulator.

use super::{PathConfig, SimProperties};
use crate::error::{PatternError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info, warn};

/// Results reported by the simulator for one garment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationStats {
    /// Failure kinds detected during the run (empty on success).
    pub fails: Vec<String>,
    /// Wall time of the simulation in seconds.
    pub sim_time: f64,
    /// Seconds per frame.
    pub spf: f64,
    /// Last simulated frame.
    pub fin_frame: u32,
    pub body_collisions: u32,
    pub self_collisions: u32,
    pub render_time: Option<f64>,
}

/// Box mesh generation and draping.
pub trait SimulationBackend {
    /// Mesh the pattern at `paths.in_spec` into `paths.box_mesh`.
    fn generate_box_mesh(&self, paths: &PathConfig, props: &SimProperties) -> Result<()>;

    /// Drape the box mesh on the body, writing `paths.sim_mesh`.
    fn simulate(&self, paths: &PathConfig, props: &SimProperties) -> Result<SimulationStats>;
}

/// Simulator run as an external program.
///
/// `<program> boxmesh --spec <json> --resolution-scale <s> [--uv-texture <json>]
/// --output <obj>` and `<program> simulate --box-mesh <obj> --body <obj>
/// --props <yaml> --output <obj>`; the second prints [`SimulationStats`] as
/// JSON on stdout.
#[derive(Debug, Clone)]
pub struct ExternalBackend {
    program: PathBuf,
}

impl ExternalBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, step: &str, args: &[&OsStr]) -> Result<Output> {
        debug!("Running {} {}", self.program.display(), step);
        let output = Command::new(&self.program)
            .arg(step)
            .args(args)
            .output()
            .map_err(|source| PatternError::SimulatorLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PatternError::SimulatorFailed {
                step: step.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Arguments of the `boxmesh` step.
///
/// `render.config.uv_texture`, when set, is passed on as JSON.
fn box_mesh_args(paths: &PathConfig, props: &SimProperties) -> Result<Vec<OsString>> {
    let mut args: Vec<OsString> = vec![
        "--spec".into(),
        paths.in_spec.clone().into(),
        "--resolution-scale".into(),
        props.resolution_scale()?.to_string().into(),
    ];
    if let Some(uv) = props.uv_texture() {
        args.push("--uv-texture".into());
        args.push(serde_json::to_string(uv)?.into());
    }
    args.push("--output".into());
    args.push(paths.box_mesh.clone().into());
    Ok(args)
}

impl SimulationBackend for ExternalBackend {
    fn generate_box_mesh(&self, paths: &PathConfig, props: &SimProperties) -> Result<()> {
        let args = box_mesh_args(paths, props)?;
        let args: Vec<&OsStr> = args.iter().map(OsString::as_os_str).collect();
        self.run("boxmesh", &args)?;
        Ok(())
    }

    fn simulate(&self, paths: &PathConfig, _props: &SimProperties) -> Result<SimulationStats> {
        let output = self.run(
            "simulate",
            &[
                OsStr::new("--box-mesh"),
                paths.box_mesh.as_os_str(),
                OsStr::new("--body"),
                paths.body_mesh.as_os_str(),
                OsStr::new("--props"),
                paths.sim_props.as_os_str(),
                OsStr::new("--output"),
                paths.sim_mesh.as_os_str(),
            ],
        )?;
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Mesh and drape one garment.
///
/// Stats in `props` are reset, the props are written next to the results
/// before the run and again with the recorded stats after it.
pub fn simulate_garment(
    backend: &dyn SimulationBackend,
    paths: &PathConfig,
    props: &mut SimProperties,
) -> Result<SimulationStats> {
    if !paths.body_mesh.exists() {
        return Err(PatternError::FileNotFound {
            path: paths.body_mesh.clone(),
        });
    }
    fs::create_dir_all(&paths.out_element)?;
    props.reset_stats();
    props.save(&paths.sim_props)?;

    info!("Generating box mesh for {}", paths.garment_name());
    backend.generate_box_mesh(paths, props)?;

    info!(
        "Simulating {} on {}",
        paths.garment_name(),
        paths.body_mesh.display()
    );
    let stats = backend.simulate(paths, props)?;
    if !stats.fails.is_empty() {
        warn!(
            "Simulation of {} reported failures: {}",
            paths.garment_name(),
            stats.fails.join(", ")
        );
    }

    props.record_stats(paths.garment_name(), &stats);
    props.save(&paths.sim_props)?;
    info!(
        "Simulation finished at frame {} in {:.1}s",
        stats.fin_frame, stats.sim_time
    );
    Ok(stats)
}

/// Check that the simulator program can be found before running.
pub fn program_exists(program: &Path) -> bool {
    if program.components().count() > 1 {
        return program.exists();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records calls and writes placeholder meshes.
    #[derive(Default)]
    struct MockBackend {
        calls: RefCell<Vec<String>>,
        fails: Vec<String>,
    }

    impl SimulationBackend for MockBackend {
        fn generate_box_mesh(&self, paths: &PathConfig, props: &SimProperties) -> Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("boxmesh {}", props.resolution_scale()?));
            fs::write(&paths.box_mesh, "o box\n")?;
            Ok(())
        }

        fn simulate(&self, paths: &PathConfig, _props: &SimProperties) -> Result<SimulationStats> {
            assert!(paths.box_mesh.exists());
            assert!(paths.sim_props.exists());
            self.calls.borrow_mut().push("simulate".to_string());
            Ok(SimulationStats {
                fails: self.fails.clone(),
                sim_time: 2.0,
                spf: 0.01,
                fin_frame: 200,
                ..Default::default()
            })
        }
    }

    fn setup(dir: &Path) -> (PathConfig, SimProperties) {
        let body = dir.join("body.obj");
        fs::write(&body, "o body\n").unwrap();
        let paths = PathConfig::new(dir, &dir.join("out"), "tee", &body, None);
        let props = SimProperties::from_yaml_str("sim:\n  config:\n    resolution_scale: 2\n").unwrap();
        (paths, props)
    }

    #[test]
    fn test_simulate_garment_calls_backend_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut props) = setup(dir.path());
        let backend = MockBackend::default();

        let stats = simulate_garment(&backend, &paths, &mut props).unwrap();
        assert_eq!(stats.fin_frame, 200);
        assert_eq!(*backend.calls.borrow(), vec!["boxmesh 2", "simulate"]);

        let saved = SimProperties::load(&paths.sim_props).unwrap();
        assert_eq!(saved.sim.stats["fin_frame"]["tee"], serde_yaml::Value::from(200));
        assert!(saved.sim.stats["fails"].is_empty());
    }

    #[test]
    fn test_simulate_garment_records_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, mut props) = setup(dir.path());
        let backend = MockBackend {
            fails: vec!["crashes".into()],
            ..Default::default()
        };

        simulate_garment(&backend, &paths, &mut props).unwrap();
        assert!(props.sim.stats["fails"].contains_key("crashes"));
    }

    #[test]
    fn test_missing_body_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let (mut paths, mut props) = setup(dir.path());
        paths.body_mesh = dir.path().join("missing.obj");

        let err = simulate_garment(&MockBackend::default(), &paths, &mut props).unwrap_err();
        assert!(matches!(err, PatternError::FileNotFound { .. }));
    }

    #[test]
    fn test_external_backend_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, props) = setup(dir.path());
        let backend = ExternalBackend::new(dir.path().join("no-such-simulator"));

        let err = backend.generate_box_mesh(&paths, &props).unwrap_err();
        assert!(matches!(err, PatternError::SimulatorLaunch { .. }));
        assert_eq!(err.code_value(), 20);
    }

    #[test]
    fn test_box_mesh_args_carry_uv_texture() {
        let dir = tempfile::tempdir().unwrap();
        let (paths, props) = setup(dir.path());
        let args = box_mesh_args(&paths, &props).unwrap();
        assert_eq!(args.len(), 6);
        assert!(!args.iter().any(|a| a == "--uv-texture"));

        let props = SimProperties::from_yaml_str(
            "sim:\n  config:\n    resolution_scale: 2\nrender:\n  config:\n    uv_texture:\n      dpi: 1500\n",
        )
        .unwrap();
        let args = box_mesh_args(&paths, &props).unwrap();
        let pos = args.iter().position(|a| a == "--uv-texture").unwrap();
        assert_eq!(args[pos + 1], OsString::from(r#"{"dpi":1500}"#));
        assert_eq!(args[pos - 1], OsString::from("2"));
        assert_eq!(args.last(), Some(&paths.box_mesh.clone().into_os_string()));
    }

    #[test]
    fn test_stats_parse_with_defaults() {
        let stats: SimulationStats =
            serde_json::from_str(r#"{"sim_time": 3.5, "fin_frame": 120}"#).unwrap();
        assert_eq!(stats.fin_frame, 120);
        assert!(stats.fails.is_empty());
        assert!(stats.render_time.is_none());
    }
}
