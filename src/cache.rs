//! Ranking cache keyed by file checksum, window and grid size
//!
//! Every selector change in the dashboard asks for a ranking. Rankings are
//! memoized per `(window, grid)` for the current file contents; when the
//! CSV on disk changes (length or mtime differ, then the SHA-256 differs)
//! the history is reloaded and every memoized ranking is dropped.

use crate::aggregator::{self, RankedEntity};
use crate::error::{AggregateError, LoadError, Result};
use crate::grid::GridSize;
use crate::history::{self, Event};
use crate::window::Window;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Cheap change detector checked before hashing
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn read(path: &Path) -> Result<Self, LoadError> {
        let meta = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub reloads: u64,
    pub events: usize,
    pub entries: usize,
}

pub struct RankingCache {
    path: PathBuf,
    stamp: FileStamp,
    checksum: String,
    events: Vec<Event>,
    rankings: HashMap<(Window, GridSize), Arc<[RankedEntity]>>,
    hits: u64,
    misses: u64,
    reloads: u64,
}

impl RankingCache {
    /// Load and fingerprint the CSV at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let stamp = FileStamp::read(&path)?;
        let (checksum, events) = read_and_hash(&path)?;

        Ok(Self {
            path,
            stamp,
            checksum,
            events,
            rankings: HashMap::new(),
            hits: 0,
            misses: 0,
            reloads: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hex SHA-256 of the file contents currently loaded
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Reload if the file changed on disk. Returns `true` when it did.
    pub fn refresh(&mut self) -> Result<bool> {
        let stamp = FileStamp::read(&self.path)?;
        if stamp == self.stamp {
            return Ok(false);
        }

        let (checksum, events) = read_and_hash(&self.path)?;
        self.stamp = stamp;
        if checksum == self.checksum {
            // Touched but identical
            debug!("{} touched, contents unchanged", self.path.display());
            return Ok(false);
        }

        warn!(
            "{} changed on disk, reloading ({} -> {} listens)",
            self.path.display(),
            self.events.len(),
            events.len()
        );
        self.checksum = checksum;
        self.events = events;
        self.reloads += 1;
        self.invalidate();
        Ok(true)
    }

    /// Drop every memoized ranking
    pub fn invalidate(&mut self) {
        self.rankings.clear();
    }

    /// Ranking for `(window, grid)`, computed at most once per file version.
    ///
    /// An empty history yields an empty ranking rather than an error so
    /// the UI can render an empty grid.
    pub fn ranking(&mut self, window: Window, grid: GridSize) -> Result<Arc<[RankedEntity]>> {
        self.refresh()?;

        if let Some(cached) = self.rankings.get(&(window, grid)) {
            self.hits += 1;
            debug!("cache hit: window={} grid={}", window, grid);
            return Ok(Arc::clone(cached));
        }

        self.misses += 1;
        debug!("cache miss: window={} grid={}", window, grid);

        let ranked: Arc<[RankedEntity]> = match aggregator::top_grid(&self.events, window, grid) {
            Ok(ranked) => ranked.into(),
            Err(AggregateError::EmptyDataset) => Arc::from(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        self.rankings.insert((window, grid), Arc::clone(&ranked));
        Ok(ranked)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            reloads: self.reloads,
            events: self.events.len(),
            entries: self.rankings.len(),
        }
    }
}

fn read_and_hash(path: &Path) -> Result<(String, Vec<Event>), LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let checksum = hex(&Sha256::digest(&bytes));
    let events = history::from_reader(bytes.as_slice()).map_err(|e| e.with_path(path))?;
    info!("Loaded {} listens from {} (sha256 {})", events.len(), path.display(), &checksum[..12]);
    Ok((checksum, events))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
