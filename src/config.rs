//! Configuration: CLI flags plus an optional TOML file
//!
//! ```toml
//! data_path = "./data/scrobbles_w_image.csv"
//! port = 3001
//! default_grid = 5
//! default_window = "1m"
//! report_dir = "artistgrid-reports"
//!
//! [layout]
//! cell_size = 256
//! gap = 5
//! padding = 20
//! ```
//!
//! Values from the file override the CLI where present. A data file picked
//! interactively overrides both.

use crate::error::ConfigError;
use crate::grid::{GridLayout, GridSize, MAX_CELL_SIZE, MAX_GAP, MAX_PADDING};
use crate::window::Window;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_REPORT_DIR: &str = "artistgrid-reports";

/// Contents of the TOML file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub default_grid: Option<GridSize>,
    pub default_window: Option<Window>,
    pub report_dir: Option<PathBuf>,
    pub layout: Option<GridLayout>,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The subset of CLI arguments that feed config resolution
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub data_path: Option<PathBuf>,
    /// Chosen in the file dialog; beats `data_path` from the config file
    pub interactive_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub grid: Option<GridSize>,
    pub window: Option<Window>,
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub default_grid: GridSize,
    pub default_window: Window,
    pub report_dir: PathBuf,
    pub layout: GridLayout,
}

impl AppConfig {
    /// Merge CLI and file settings. TOML values override CLI values where
    /// present, except for a data file the user just picked.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self, ConfigError> {
        let file = file_config.unwrap_or_default();

        let data_path = cli
            .interactive_path
            .clone()
            .or(file.data_path)
            .or_else(|| cli.data_path.clone())
            .ok_or(ConfigError::MissingDataPath)?;

        let layout = file.layout.unwrap_or_default();
        if layout.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        for (field, value, max) in [
            ("cell_size", layout.cell_size, MAX_CELL_SIZE),
            ("gap", layout.gap, MAX_GAP),
            ("padding", layout.padding, MAX_PADDING),
        ] {
            if value > max {
                return Err(ConfigError::LayoutOutOfRange { field, value, max });
            }
        }

        Ok(Self {
            data_path,
            port: file.port.or(cli.port).unwrap_or(DEFAULT_PORT),
            default_grid: file.default_grid.or(cli.grid).unwrap_or_default(),
            default_window: file.default_window.or(cli.window).unwrap_or_default(),
            report_dir: file
                .report_dir
                .or_else(|| cli.report_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
            layout,
        })
    }
}
