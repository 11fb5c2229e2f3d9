//! Report generation for artist rankings
//!
//! This module provides output formatters for a ranking in multiple formats:
//!
//! - **HTML**: The image grid, as a standalone page (also used as the
//!   dashboard iframe content)
//! - **JSON**: Machine-readable format for programmatic consumption
//! - **CSV**: Spreadsheet-compatible format
//!
//! # Usage
//!
//! ```ignore
//! use artistgrid::report;
//!
//! // Automatically picks format based on extension
//! report::generate("grid.html", &report)?;  // HTML
//! report::generate("grid.json", &report)?;  // JSON
//! report::generate("grid.csv", &report)?;   // CSV
//! ```

pub mod csv;
pub mod html;
pub mod json;

use crate::aggregator::RankedEntity;
use crate::grid::{GridLayout, GridSize};
use crate::history::{self, Event};
use crate::window::Window;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::Path;

/// A ranking together with the selection that produced it
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated: String,
    pub window: Window,
    pub window_label: &'static str,
    pub grid: GridSize,
    #[serde(skip)]
    pub layout: GridLayout,
    pub summary: Summary,
    pub artists: Vec<RankedEntity>,
}

impl Report {
    pub fn new(
        window: Window,
        grid: GridSize,
        layout: GridLayout,
        events: &[Event],
        artists: Vec<RankedEntity>,
    ) -> Self {
        Self {
            generated: chrono::Local::now().to_rfc3339(),
            window,
            window_label: window.label(),
            grid,
            layout,
            summary: Summary::new(events, &artists),
            artists,
        }
    }

    /// Page heading, e.g. "Top 5x5 artists for the last 1 month"
    pub fn title(&self) -> String {
        title(self.grid, self.window)
    }
}

pub fn title(grid: GridSize, window: Window) -> String {
    format!("Top {0}x{0} artists for {1}", grid, window.label())
}

/// Auto-generated report name, e.g. `artistgrid_1m_5x5_20240101_120000.html`
pub fn default_filename(window: Window, grid: GridSize, timestamp: &str) -> String {
    format!("artistgrid_{0}_{1}x{1}_{2}.html", window.key(), grid, timestamp)
}

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, report: &Report) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, report),
        "csv" => csv::write(&mut file, report),
        _ => html::write(&mut file, report),
    }
}

/// Dataset-level numbers shown next to the grid
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    /// Listens in the whole dataset
    pub total_listens: usize,
    /// Listens credited to the artists in the grid
    pub shown_listens: u64,
    pub shown_artists: usize,
    pub first_listen: Option<DateTime<Utc>>,
    pub last_listen: Option<DateTime<Utc>>,
}

impl Summary {
    pub fn new(events: &[Event], artists: &[RankedEntity]) -> Self {
        let span = history::span(events);
        Self {
            total_listens: events.len(),
            shown_listens: artists.iter().map(|a| a.count).sum(),
            shown_artists: artists.len(),
            first_listen: span.map(|(first, _)| first),
            last_listen: span.map(|(_, last)| last),
        }
    }
}
