//! Error types for pattern construction and simulation hand-off.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes, used as process exit codes by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found (2)
    FileNotFound = 2,
    /// Parameter or config file could not be parsed (3)
    ParseError = 3,
    /// Panel geometry could not be constructed (10)
    InvalidGeometry = 10,
    /// Garment assembly failed (11)
    Assembly = 11,
    /// External simulator failed (20)
    Simulator = 20,
}

/// Main error type for the pattern library.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing section '{section}' in {path}")]
    MissingSection { path: PathBuf, section: String },

    #[error("Invalid value for '{field}': expected {expected}, got '{value}'")]
    InvalidValue {
        field: String,
        expected: String,
        value: String,
    },

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Dart of width {width} at offset {offset} does not fit on edge of length {length}")]
    DartOutOfBounds {
        width: f64,
        offset: f64,
        length: f64,
    },

    #[error("Unknown garment program: {name}")]
    UnknownGarment { name: String },

    #[error("Panel not found: {name}")]
    PanelNotFound { name: String },

    #[error("Duplicate panel name: {name}")]
    DuplicatePanel { name: String },

    #[error("Edge {edge} not found in panel {panel}")]
    EdgeNotFound { panel: String, edge: u64 },

    #[error("Interface not found: {component}.{name}")]
    InterfaceNotFound { component: String, name: String },

    #[error("Cannot stitch an empty interface")]
    EmptyInterface,

    #[error("Failed to launch simulator {program}: {source}")]
    SimulatorLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator step '{step}' failed ({status}): {stderr}")]
    SimulatorFailed {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl PatternError {
    /// Shorthand for geometry construction failures.
    pub fn geometry(message: impl Into<String>) -> Self {
        PatternError::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PatternError::FileNotFound { .. } => ErrorCode::FileNotFound,
            PatternError::Yaml { .. } => ErrorCode::ParseError,
            PatternError::MissingSection { .. } => ErrorCode::ParseError,
            PatternError::InvalidValue { .. } => ErrorCode::ParseError,
            PatternError::InvalidGeometry { .. } => ErrorCode::InvalidGeometry,
            PatternError::DartOutOfBounds { .. } => ErrorCode::InvalidGeometry,
            PatternError::UnknownGarment { .. } => ErrorCode::ParseError,
            PatternError::PanelNotFound { .. } => ErrorCode::Assembly,
            PatternError::DuplicatePanel { .. } => ErrorCode::Assembly,
            PatternError::EdgeNotFound { .. } => ErrorCode::Assembly,
            PatternError::InterfaceNotFound { .. } => ErrorCode::Assembly,
            PatternError::EmptyInterface => ErrorCode::Assembly,
            PatternError::SimulatorLaunch { .. } => ErrorCode::Simulator,
            PatternError::SimulatorFailed { .. } => ErrorCode::Simulator,
            PatternError::Json(_) => ErrorCode::ParseError,
            PatternError::Io(_) => ErrorCode::FileNotFound,
            PatternError::Fmt(_) => ErrorCode::InvalidGeometry,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Result type alias for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
