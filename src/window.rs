//! Time windows for filtering listening history
//!
//! A window is always resolved against the newest listen in the dataset,
//! not against the wall clock, so an old export still shows a full week
//! under `1w`.
//!
//! ```text
//! Key  | Lookback   | Label
//! -----|------------|--------------------
//! 1w   | 7 days     | the last 1 week
//! 1m   | 30 days    | the last 1 month
//! 3m   | 90 days    | the last 3 months
//! 12m  | 365 days   | the last year
//! 3y   | 1095 days  | the last 3 years
//! all  | -          | all time
//! ```

use crate::error::InvalidWindowError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Window {
    #[default]
    OneWeek,
    OneMonth,
    ThreeMonths,
    TwelveMonths,
    ThreeYears,
    AllTime,
}

impl Window {
    /// Every window in selector order
    pub const ALL: [Window; 6] = [
        Window::OneWeek,
        Window::OneMonth,
        Window::ThreeMonths,
        Window::TwelveMonths,
        Window::ThreeYears,
        Window::AllTime,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Window::OneWeek => "1w",
            Window::OneMonth => "1m",
            Window::ThreeMonths => "3m",
            Window::TwelveMonths => "12m",
            Window::ThreeYears => "3y",
            Window::AllTime => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Window::OneWeek => "the last 1 week",
            Window::OneMonth => "the last 1 month",
            Window::ThreeMonths => "the last 3 months",
            Window::TwelveMonths => "the last year",
            Window::ThreeYears => "the last 3 years",
            Window::AllTime => "all time",
        }
    }

    /// Lookback duration, `None` for [`Window::AllTime`]
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Window::OneWeek => Some(Duration::weeks(1)),
            Window::OneMonth => Some(Duration::days(30)),
            Window::ThreeMonths => Some(Duration::days(90)),
            Window::TwelveMonths => Some(Duration::days(365)),
            Window::ThreeYears => Some(Duration::days(1095)),
            Window::AllTime => None,
        }
    }

    /// First instant included by this window, given the dataset's span
    pub fn start_time(&self, min: DateTime<Utc>, max: DateTime<Utc>) -> DateTime<Utc> {
        match self.duration() {
            // Subtraction can only overflow near chrono's minimum date;
            // everything before that is "the beginning" anyway.
            Some(lookback) => max.checked_sub_signed(lookback).unwrap_or(min),
            None => min,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Window {
    type Err = InvalidWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Window::ALL
            .into_iter()
            .find(|w| w.key() == s.trim())
            .ok_or_else(|| InvalidWindowError(s.to_string()))
    }
}

impl Serialize for Window {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Window {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}
