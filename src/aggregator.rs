//! Time-windowed top-K ranking
//!
//! Takes the full listening history, keeps the listens that fall inside the
//! window (resolved against the newest listen), counts plays per artist and
//! returns the K² most played.
//!
//! Ordering is by play count descending. Equal counts are ordered by artist
//! id ascending so the same history always produces the same grid.

use crate::error::AggregateError;
use crate::grid::GridSize;
use crate::history::{self, Event};
use crate::window::Window;
use serde::Serialize;
use std::collections::HashMap;

/// One artist in the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntity {
    pub entity_id: String,
    pub entity_label: String,
    pub entity_image: String,
    /// Listens inside the window
    pub count: u64,
}

/// Rank entities by play count within `window`, keeping the top `k * k`
pub fn top_entities(
    events: &[Event],
    window: Window,
    k: usize,
) -> Result<Vec<RankedEntity>, AggregateError> {
    let (min_time, max_time) = history::span(events).ok_or(AggregateError::EmptyDataset)?;
    let start_time = window.start_time(min_time, max_time);

    // id -> index into `ranked`, first-seen label/image wins
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<RankedEntity> = Vec::new();

    for event in events
        .iter()
        .filter(|e| e.timestamp >= start_time && e.timestamp <= max_time)
    {
        let slot = *index.entry(event.entity_id.as_str()).or_insert_with(|| {
            ranked.push(RankedEntity {
                entity_id: event.entity_id.clone(),
                entity_label: event.entity_label.clone(),
                entity_image: event.entity_image.clone(),
                count: 0,
            });
            ranked.len() - 1
        });
        ranked[slot].count += 1;
    }

    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    ranked.truncate(k.saturating_mul(k));

    Ok(ranked)
}

/// [`top_entities`] for a validated grid size
pub fn top_grid(
    events: &[Event],
    window: Window,
    grid: GridSize,
) -> Result<Vec<RankedEntity>, AggregateError> {
    top_entities(events, window, grid.get())
}

/// [`top_entities`] with the window given as its selector key
pub fn top_entities_by_key(
    events: &[Event],
    window_key: &str,
    k: usize,
) -> Result<Vec<RankedEntity>, AggregateError> {
    let window: Window = window_key.parse()?;
    top_entities(events, window, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidWindowError;
    use chrono::{DateTime, TimeZone, Utc};

    const DAY: i64 = 86_400;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn ev(id: &str, secs: i64) -> Event {
        Event::new(id, format!("Artist {}", id), format!("http://img/{}.jpg", id), at(secs))
    }

    fn ids(ranked: &[RankedEntity]) -> Vec<&str> {
        ranked.iter().map(|r| r.entity_id.as_str()).collect()
    }

    fn assert_non_increasing(ranked: &[RankedEntity]) {
        for pair in ranked.windows(2) {
            assert!(
                pair[0].count >= pair[1].count,
                "counts must be non-increasing: {:?}",
                ranked
            );
        }
    }

    // ==========================================================================
    // WORKED EXAMPLES
    // ==========================================================================

    #[test]
    fn test_single_cell_all_time() {
        let events = vec![ev("A", 0), ev("A", DAY), ev("B", 2 * DAY)];
        let ranked = top_entities(&events, Window::AllTime, 1).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entity_id, "A");
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn test_short_span_week_window_keeps_everything() {
        // Two days of history, one-week window: nothing is cut
        let events = vec![ev("A", 0), ev("A", DAY), ev("B", 2 * DAY)];
        let week = top_entities(&events, Window::OneWeek, 1).unwrap();
        let all = top_entities(&events, Window::AllTime, 1).unwrap();
        assert_eq!(week, all);
    }

    // ==========================================================================
    // WINDOW FILTERING
    // ==========================================================================

    #[test]
    fn test_window_excludes_old_listens() {
        let now = 400 * DAY;
        let events = vec![
            ev("old", 0),
            ev("old", DAY),
            ev("old", 2 * DAY),
            ev("new", now - DAY),
            ev("new", now),
        ];

        let week = top_entities(&events, Window::OneWeek, 3).unwrap();
        assert_eq!(ids(&week), vec!["new"]);
        assert_eq!(week[0].count, 2);

        let all = top_entities(&events, Window::AllTime, 3).unwrap();
        assert_eq!(ids(&all), vec!["old", "new"]);
    }

    #[test]
    fn test_window_start_is_inclusive() {
        let now = 100 * DAY;
        let events = vec![ev("edge", now - 7 * DAY), ev("outside", now - 7 * DAY - 1), ev("x", now)];
        let ranked = top_entities(&events, Window::OneWeek, 3).unwrap();
        assert!(ids(&ranked).contains(&"edge"));
        assert!(!ids(&ranked).contains(&"outside"));
    }

    #[test]
    fn test_all_time_includes_every_event() {
        let events: Vec<Event> = (0..50).map(|i| ev(&format!("e{:02}", i % 7), i * 100 * DAY)).collect();
        let ranked = top_entities(&events, Window::AllTime, 7).unwrap();
        let total: u64 = ranked.iter().map(|r| r.count).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn test_unsorted_input_accepted() {
        let events = vec![ev("B", 5 * DAY), ev("A", 0), ev("B", DAY), ev("A", 40 * DAY), ev("A", 39 * DAY)];
        let ranked = top_entities(&events, Window::OneWeek, 3).unwrap();
        // max is day 40; only the two A listens fall in the last week
        assert_eq!(ids(&ranked), vec!["A"]);
        assert_eq!(ranked[0].count, 2);
    }

    // ==========================================================================
    // ORDERING AND TRUNCATION
    // ==========================================================================

    #[test]
    fn test_counts_non_increasing() {
        let mut events = Vec::new();
        for (i, id) in ["c", "a", "d", "b", "e"].iter().enumerate() {
            for j in 0..=(i * 3 % 5) {
                events.push(ev(id, (i * 10 + j) as i64));
            }
        }
        for window in Window::ALL {
            let ranked = top_entities(&events, window, 3).unwrap();
            assert_non_increasing(&ranked);
        }
    }

    #[test]
    fn test_length_bounded_by_k_squared() {
        let events: Vec<Event> = (0..30).map(|i| ev(&format!("id{:02}", i), i)).collect();
        assert_eq!(top_entities(&events, Window::AllTime, 3).unwrap().len(), 9);
        assert_eq!(top_entities(&events, Window::AllTime, 5).unwrap().len(), 25);
        // Fewer distinct entities than cells
        assert_eq!(top_entities(&events, Window::AllTime, 7).unwrap().len(), 30);
    }

    #[test]
    fn test_zero_k_is_empty() {
        let events = vec![ev("A", 0)];
        assert!(top_entities(&events, Window::AllTime, 0).unwrap().is_empty());
    }

    #[test]
    fn test_ties_broken_by_id() {
        let events = vec![ev("zeta", 0), ev("alpha", 1), ev("mid", 2), ev("mid", 3)];
        let ranked = top_entities(&events, Window::AllTime, 3).unwrap();
        assert_eq!(ids(&ranked), vec!["mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_first_seen_label_is_representative() {
        let events = vec![
            Event::new("A", "Old Name", "http://img/old.jpg", at(0)),
            Event::new("A", "New Name", "http://img/new.jpg", at(1)),
        ];
        let ranked = top_entities(&events, Window::AllTime, 1).unwrap();
        assert_eq!(ranked[0].entity_label, "Old Name");
        assert_eq!(ranked[0].entity_image, "http://img/old.jpg");
        assert_eq!(ranked[0].count, 2);
    }

    #[test]
    fn test_first_seen_is_within_window() {
        // The representative comes from listens that survive the filter
        let events = vec![
            Event::new("A", "Old Name", "http://img/old.jpg", at(0)),
            Event::new("A", "New Name", "http://img/new.jpg", at(365 * DAY)),
        ];
        let ranked = top_entities(&events, Window::OneWeek, 1).unwrap();
        assert_eq!(ranked[0].entity_label, "New Name");
    }

    // ==========================================================================
    // FAILURE MODES AND PURITY
    // ==========================================================================

    #[test]
    fn test_empty_dataset() {
        let err = top_entities(&[], Window::AllTime, 3).unwrap_err();
        assert_eq!(err, AggregateError::EmptyDataset);
    }

    #[test]
    fn test_invalid_window_key() {
        let events = vec![ev("A", 0)];
        let err = top_entities_by_key(&events, "6w", 3).unwrap_err();
        assert_eq!(err, AggregateError::InvalidWindow(InvalidWindowError("6w".into())));
        assert!(top_entities_by_key(&events, "3m", 3).is_ok());
    }

    #[test]
    fn test_idempotent() {
        let events = vec![ev("A", 0), ev("B", 1), ev("A", 2), ev("C", 3), ev("B", 4)];
        let before = events.clone();
        let first = top_entities(&events, Window::OneMonth, 3).unwrap();
        let second = top_entities(&events, Window::OneMonth, 3).unwrap();
        assert_eq!(first, second);
        assert_eq!(events, before);
    }

    #[test]
    fn test_top_grid_matches_k() {
        let events: Vec<Event> = (0..60).map(|i| ev(&format!("id{:02}", i), i)).collect();
        let ranked = top_grid(&events, Window::AllTime, GridSize::FIVE).unwrap();
        assert_eq!(ranked, top_entities(&events, Window::AllTime, 5).unwrap());
        assert_eq!(ranked.len(), GridSize::FIVE.capacity());
    }
}
