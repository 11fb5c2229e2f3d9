//! Error types
//!
//! Each stage has its own error so callers can tell a bad CSV apart from a
//! bad selector value. [`Error`] wraps all of them for code that just wants
//! to bubble up with `?`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading the listening-history CSV
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed row {row}: {source}")]
    Row {
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: timestamp {value} is out of range")]
    Timestamp { row: u64, value: f64 },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// An unrecognized window key, e.g. `"2w"`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown window '{0}' (expected one of: 1w, 1m, 3m, 12m, 3y, all)")]
pub struct InvalidWindowError(pub String);

/// A grid dimension outside the offered sizes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported grid size '{0}' (expected 3, 5 or 7)")]
pub struct InvalidGridSizeError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("dataset contains no events")]
    EmptyDataset,

    #[error(transparent)]
    InvalidWindow(#[from] InvalidWindowError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("layout.cell_size must be greater than zero")]
    ZeroCellSize,

    #[error("layout.{field} = {value} exceeds the maximum of {max}")]
    LayoutOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("no data file given (pass a CSV path or set data_path in the config)")]
    MissingDataPath,
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Window(#[from] InvalidWindowError),

    #[error(transparent)]
    GridSize(#[from] InvalidGridSizeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
