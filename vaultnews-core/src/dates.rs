//! Date prefixes for digest lines.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Date shown in front of a digest line.
///
/// The legacy single-letter codes (`N`, `D`, `DH`, `DOW`) are accepted as
/// aliases so older configuration files keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    #[serde(alias = "N")]
    None,
    /// `5/12/2020`
    #[default]
    #[serde(alias = "D")]
    Day,
    /// `5/12/2020 10:50:21`
    #[serde(alias = "DH")]
    DayAndTime,
    /// `Tue May 12 2020 10:50:21`
    #[serde(alias = "DOW")]
    DayOfWeekAndTime,
}

impl DateFormat {
    /// Prefix for a timestamp, rendered in local time.
    pub fn prefix(&self, at: DateTime<Utc>) -> String {
        self.prefix_naive(&at.with_timezone(&Local).naive_local())
    }

    /// Prefix for an already-localized timestamp, separator included.
    pub fn prefix_naive(&self, at: &NaiveDateTime) -> String {
        match self {
            DateFormat::None => String::new(),
            DateFormat::Day => format!("{} : ", at.format("%-m/%-d/%Y")),
            DateFormat::DayAndTime => format!("{} : ", at.format("%-m/%-d/%Y %H:%M:%S")),
            DateFormat::DayOfWeekAndTime => format!("{} : ", at.format("%a %b %d %Y %H:%M:%S")),
        }
    }
}
