//! File layout of one simulation run.

use crate::config::SPECIFICATION_SUFFIX;
use std::path::{Path, PathBuf};

/// Input and output paths of a simulation run.
///
/// Results go to `<out_root>/<garment>_<body>[<tag>]/`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathConfig {
    /// Serialized pattern specification.
    pub in_spec: PathBuf,
    /// Body mesh (`.obj`).
    pub body_mesh: PathBuf,
    /// Folder for all outputs of this run.
    pub out_element: PathBuf,
    /// Box mesh generated from the pattern.
    pub box_mesh: PathBuf,
    /// Draped garment mesh.
    pub sim_mesh: PathBuf,
    /// Simulation properties with the recorded stats.
    pub sim_props: PathBuf,
    garment_name: String,
}

impl PathConfig {
    /// Derive the layout. `garment_name` is the specification stem without
    /// its suffix, `tag` is appended to the output folder name.
    pub fn new(
        spec_folder: &Path,
        out_root: &Path,
        garment_name: &str,
        body_mesh: &Path,
        tag: Option<&str>,
    ) -> Self {
        let body_name = body_mesh
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("body");
        let out_element = out_root.join(format!(
            "{}_{}{}",
            garment_name,
            body_name,
            tag.unwrap_or("")
        ));

        Self {
            in_spec: spec_folder.join(format!("{garment_name}{SPECIFICATION_SUFFIX}")),
            body_mesh: body_mesh.to_path_buf(),
            box_mesh: out_element.join(format!("{garment_name}_boxmesh.obj")),
            sim_mesh: out_element.join(format!("{garment_name}_sim.obj")),
            sim_props: out_element.join("sim_props.yaml"),
            out_element,
            garment_name: garment_name.to_string(),
        }
    }

    /// Layout for an existing specification file, named after its stem.
    pub fn from_specification(
        spec_path: &Path,
        out_root: &Path,
        body_mesh: &Path,
        tag: Option<&str>,
    ) -> Self {
        let name = garment_name_from_spec(spec_path);
        let folder = spec_path.parent().unwrap_or_else(|| Path::new("."));
        let mut paths = Self::new(folder, out_root, &name, body_mesh, tag);
        paths.in_spec = spec_path.to_path_buf();
        paths
    }

    /// Garment name used in the output file names.
    pub fn garment_name(&self) -> &str {
        &self.garment_name
    }
}

/// `<name>_specification.json` -> `<name>`.
pub fn garment_name_from_spec(spec_path: &Path) -> String {
    let stem = spec_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((name, _)) => name.to_string(),
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_layout() {
        let paths = PathConfig::new(
            Path::new("out/intermediates/tee_v1"),
            Path::new("out/intermediates"),
            "tee_v1",
            Path::new("bodies/mean_all.obj"),
            Some("_run"),
        );
        let el = Path::new("out/intermediates/tee_v1_mean_all_run");
        assert_eq!(paths.out_element, el);
        assert_eq!(
            paths.in_spec,
            Path::new("out/intermediates/tee_v1/tee_v1_specification.json")
        );
        assert_eq!(paths.box_mesh, el.join("tee_v1_boxmesh.obj"));
        assert_eq!(paths.sim_mesh, el.join("tee_v1_sim.obj"));
        assert_eq!(paths.sim_props, el.join("sim_props.yaml"));
    }

    #[test]
    fn test_garment_name_from_spec() {
        let spec = Path::new("x/t-shirt_240101-10-00-00/t-shirt_240101-10-00-00_specification.json");
        assert_eq!(garment_name_from_spec(spec), "t-shirt_240101-10-00-00");

        let paths = PathConfig::from_specification(spec, Path::new("o"), Path::new("b.obj"), None);
        assert_eq!(paths.in_spec, spec);
        assert_eq!(paths.garment_name(), "t-shirt_240101-10-00-00");
        assert_eq!(paths.out_element, Path::new("o/t-shirt_240101-10-00-00_b"));
    }
}
