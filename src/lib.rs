//! artistgrid - Your most-played artists as an image grid
//!
//! artistgrid reads a listening-history CSV (one row per scrobble), keeps
//! the listens inside a time window, ranks artists by play count, and
//! renders the top K×K of them as a grid of artist images.
//!
//! # Overview
//!
//! Windows are resolved against the newest listen in the file rather than
//! the current date, so an export from last year still has a meaningful
//! "last week". Grid sizes are 3, 5 or 7, i.e. 9, 25 or 49 artists.
//!
//! # Quick Start
//!
//! ```no_run
//! use artistgrid::{history, top_grid, GridSize, Window};
//!
//! let events = history::load("scrobbles_w_image.csv")?;
//! let top = top_grid(&events, Window::OneMonth, GridSize::FIVE)?;
//!
//! for (rank, artist) in top.iter().enumerate() {
//!     println!("{:>2}. {} ({} plays)", rank + 1, artist.entity_label, artist.count);
//! }
//! # Ok::<(), artistgrid::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`history`]: CSV loading
//! - [`window`]: named lookback windows
//! - [`grid`]: grid sizes and pixel layout
//! - [`aggregator`]: the time-windowed top-K ranking
//! - [`cache`]: rankings memoized per file version
//! - [`report`]: HTML grid, JSON and CSV output
//! - [`serve`]: interactive dashboard

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod error;
pub mod grid;
pub mod history;
pub mod report;
pub mod serve;
pub mod window;

pub use aggregator::{top_entities, top_entities_by_key, top_grid, RankedEntity};
pub use cache::RankingCache;
pub use error::{AggregateError, Error, InvalidGridSizeError, InvalidWindowError, LoadError};
pub use grid::{GridLayout, GridSize};
pub use history::Event;
pub use window::Window;
