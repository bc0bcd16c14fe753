//! Pattern serialization: JSON specification and SVG preview.

mod spec;
mod svg;

pub use spec::{
    CurvatureSpec, CurveKind, EdgeSpec, PanelSpec, PatternBody, PatternSpec, SpecProperties,
};
pub use svg::{generate_svg, SvgColors, SvgWriter};

use crate::config::{PATTERN_SVG_SUFFIX, SPECIFICATION_SUFFIX, TIMESTAMP_FORMAT};
use crate::error::Result;
use crate::model::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for [`serialize_pattern`].
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Appended to the pattern name in folder and file names.
    pub tag: Option<String>,
    /// Write into `<root>/<name><tag>/` instead of `<root>/`.
    pub to_subfolder: bool,
    /// Also write the SVG preview.
    pub with_svg: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            tag: None,
            to_subfolder: true,
            with_svg: true,
        }
    }
}

impl SerializeOptions {
    /// Options tagged with the current local time.
    pub fn timestamped() -> Self {
        Self {
            tag: Some(timestamp_tag()),
            ..Self::default()
        }
    }
}

/// Files written by [`serialize_pattern`].
#[derive(Debug, Clone)]
pub struct SerializedPattern {
    pub folder: PathBuf,
    pub specification: PathBuf,
    pub svg: Option<PathBuf>,
}

/// `_<yymmdd-HH-MM-SS>` in local time.
pub fn timestamp_tag() -> String {
    format!("_{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
}

/// Write the pattern specification (and preview) under `root`.
pub fn serialize_pattern(
    pattern: &Pattern,
    root: &Path,
    options: &SerializeOptions,
) -> Result<SerializedPattern> {
    let stem = format!("{}{}", pattern.name, options.tag.as_deref().unwrap_or(""));
    let folder = if options.to_subfolder {
        root.join(&stem)
    } else {
        root.to_path_buf()
    };
    fs::create_dir_all(&folder)?;

    let specification = folder.join(format!("{stem}{SPECIFICATION_SUFFIX}"));
    fs::write(
        &specification,
        PatternSpec::from_pattern(pattern).to_json_string()?,
    )?;

    let svg = if options.with_svg {
        let path = folder.join(format!("{stem}{PATTERN_SVG_SUFFIX}"));
        fs::write(&path, generate_svg(pattern)?)?;
        Some(path)
    } else {
        None
    };

    info!(
        "Serialized pattern {} to {}",
        pattern.name,
        specification.display()
    );
    Ok(SerializedPattern {
        folder,
        specification,
        svg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{pt, EdgeSequence};
    use crate::model::Panel;

    fn square() -> Pattern {
        let edges = EdgeSequence::from_verts(
            pt(0.0, 0.0),
            &[pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0)],
        )
        .close_loop();
        Pattern {
            name: "square".into(),
            panels: vec![Panel::new("p", edges)],
            stitches: Vec::new(),
        }
    }

    #[test]
    fn test_timestamp_tag_format() {
        let tag = timestamp_tag();
        // _yymmdd-HH-MM-SS
        assert_eq!(tag.len(), 16);
        assert!(tag.starts_with('_'));
        assert_eq!(tag.matches('-').count(), 3);
    }

    #[test]
    fn test_serialize_to_subfolder() {
        let dir = tempfile::tempdir().unwrap();
        let options = SerializeOptions {
            tag: Some("_v1".into()),
            ..SerializeOptions::default()
        };
        let out = serialize_pattern(&square(), dir.path(), &options).unwrap();

        assert_eq!(out.folder, dir.path().join("square_v1"));
        assert_eq!(
            out.specification,
            dir.path().join("square_v1").join("square_v1_specification.json")
        );
        assert!(out.specification.exists());
        assert!(out.svg.unwrap().exists());

        let text = std::fs::read_to_string(&out.specification).unwrap();
        let spec = PatternSpec::from_json_str(&text).unwrap();
        assert_eq!(spec.pattern.panel_order, vec!["p".to_string()]);
    }

    #[test]
    fn test_serialize_flat_without_svg() {
        let dir = tempfile::tempdir().unwrap();
        let options = SerializeOptions {
            tag: None,
            to_subfolder: false,
            with_svg: false,
        };
        let out = serialize_pattern(&square(), dir.path(), &options).unwrap();
        assert_eq!(out.specification, dir.path().join("square_specification.json"));
        assert!(out.svg.is_none());
    }
}
