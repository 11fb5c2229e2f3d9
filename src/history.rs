//! Listening-history loading
//!
//! The input is a scrobble export with one row per listen. Only four columns
//! matter, matched by header name so column order and extra columns don't:
//!
//! ```text
//! sp_artist_id,artist,sp_artist_image,timestamp
//! 4Z8W4fKeB5YxbusRsdQVPb,Radiohead,https://i.scdn.co/image/ab67...,1700000000
//! ```
//!
//! `timestamp` is Unix epoch seconds, integer or fractional (`1700000000.0`
//! as written by spreadsheet and dataframe exports).

use crate::error::LoadError;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub const COL_ENTITY_ID: &str = "sp_artist_id";
pub const COL_ENTITY_LABEL: &str = "artist";
pub const COL_ENTITY_IMAGE: &str = "sp_artist_image";
pub const COL_TIMESTAMP: &str = "timestamp";

const REQUIRED_COLUMNS: [&str; 4] = [COL_ENTITY_ID, COL_ENTITY_LABEL, COL_ENTITY_IMAGE, COL_TIMESTAMP];

/// One listen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub entity_id: String,
    pub entity_label: String,
    pub entity_image: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        entity_id: impl Into<String>,
        entity_label: impl Into<String>,
        entity_image: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_label: entity_label.into(),
            entity_image: entity_image.into(),
            timestamp,
        }
    }
}

/// Raw CSV row as it sits in the file
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "sp_artist_id")]
    entity_id: String,
    #[serde(rename = "artist")]
    entity_label: String,
    #[serde(rename = "sp_artist_image", default)]
    entity_image: String,
    timestamp: f64,
}

/// Load a listening-history CSV from disk
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Event>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let events = from_reader(BufReader::new(file)).map_err(|e| e.with_path(path))?;

    match span(&events) {
        Some((first, last)) => info!(
            "Loaded {} listens from {} ({} .. {})",
            events.len(),
            path.display(),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        ),
        None => info!("Loaded {} (no listens)", path.display()),
    }

    Ok(events)
}

/// Parse listening history from any reader
pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Event>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut events = Vec::new();
    for (idx, record) in rdr.deserialize::<Row>().enumerate() {
        // Header is line 1, first data row is row 1
        let row_no = idx as u64 + 1;
        let row = record.map_err(|source| LoadError::Row { row: row_no, source })?;

        let timestamp = epoch_to_datetime(row.timestamp).ok_or(LoadError::Timestamp {
            row: row_no,
            value: row.timestamp,
        })?;

        events.push(Event {
            entity_id: row.entity_id,
            entity_label: row.entity_label,
            entity_image: row.entity_image,
            timestamp,
        });
    }

    debug!("Parsed {} rows", events.len());
    Ok(events)
}

/// Epoch seconds to a UTC instant; `None` for NaN, infinities and values
/// chrono can't represent
fn epoch_to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos).single()
}

impl LoadError {
    /// Attach the file name to errors raised while parsing its contents
    pub(crate) fn with_path(self, path: &Path) -> LoadError {
        match self {
            LoadError::Io { .. } | LoadError::Parse { .. } => self,
            other => LoadError::Parse {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }
}

/// Earliest and latest timestamps, `None` when there are no events
pub fn span(events: &[Event]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let min = events.iter().map(|e| e.timestamp).min()?;
    let max = events.iter().map(|e| e.timestamp).max()?;
    Some((min, max))
}
