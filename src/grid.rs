//! Grid dimensions and pixel layout

use crate::error::InvalidGridSizeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CELL_SIZE: u32 = 256;
pub const DEFAULT_GAP: u32 = 5;
pub const DEFAULT_PADDING: u32 = 20;

pub const MAX_CELL_SIZE: u32 = 4096;
pub const MAX_GAP: u32 = 1024;
pub const MAX_PADDING: u32 = 1024;

/// Grid dimension K; the grid shows K² artists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridSize(usize);

impl GridSize {
    pub const THREE: GridSize = GridSize(3);
    pub const FIVE: GridSize = GridSize(5);
    pub const SEVEN: GridSize = GridSize(7);

    /// Sizes offered by the selector
    pub const ALL: [GridSize; 3] = [GridSize::THREE, GridSize::FIVE, GridSize::SEVEN];

    pub fn get(&self) -> usize {
        self.0
    }

    /// Number of cells (K²)
    pub fn capacity(&self) -> usize {
        self.0 * self.0
    }
}

impl Default for GridSize {
    fn default() -> Self {
        GridSize::THREE
    }
}

impl TryFrom<usize> for GridSize {
    type Error = InvalidGridSizeError;

    fn try_from(k: usize) -> Result<Self, Self::Error> {
        GridSize::ALL
            .into_iter()
            .find(|g| g.0 == k)
            .ok_or_else(|| InvalidGridSizeError(k.to_string()))
    }
}

impl FromStr for GridSize {
    type Err = InvalidGridSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let k: usize = s
            .trim()
            .parse()
            .map_err(|_| InvalidGridSizeError(s.to_string()))?;
        GridSize::try_from(k)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for GridSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0 as u64)
    }
}

impl<'de> Deserialize<'de> for GridSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Query strings hand us text, TOML and JSON hand us integers
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(k) => GridSize::try_from(k as usize).map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Pixel geometry of the rendered grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Max width/height of one image cell
    pub cell_size: u32,
    /// Space between cells
    pub gap: u32,
    /// Page padding on each side
    pub padding: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            gap: DEFAULT_GAP,
            padding: DEFAULT_PADDING,
        }
    }
}

impl GridLayout {
    /// Height of a frame that shows the whole grid without scrolling
    pub fn frame_height(&self, grid: GridSize) -> u32 {
        let k = grid.get() as u32;
        k.saturating_mul(self.cell_size)
            .saturating_add(self.gap.saturating_mul(k - 1))
            .saturating_add(self.padding.saturating_mul(2))
    }

    /// The grid is square
    pub fn frame_width(&self, grid: GridSize) -> u32 {
        self.frame_height(grid)
    }
}
