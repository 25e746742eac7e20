use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// Meteorological season window used to filter a station's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Fall,
        Season::Winter,
    ];

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            _ => Err(ProcessingError::UnknownSeason(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }

    /// Calendar months covered, in chronological order within the window.
    pub fn months(&self) -> [u32; 3] {
        match self {
            Season::Spring => [3, 4, 5],
            Season::Summer => [6, 7, 8],
            Season::Fall => [9, 10, 11],
            Season::Winter => [12, 1, 2],
        }
    }

    /// Whether a reading taken in `year`/`month` falls in this season.
    ///
    /// Winter is anchored on the station's most recent year: December of
    /// `max_year - 1` plus January and February of `max_year`.
    pub fn contains(&self, year: i32, month: u32, max_year: i32) -> bool {
        match self {
            Season::Spring => (3..=5).contains(&month),
            Season::Summer => (6..=8).contains(&month),
            Season::Fall => (9..=11).contains(&month),
            Season::Winter => {
                (month == 12 && year == max_year - 1)
                    || ((1..=2).contains(&month) && year == max_year)
            }
        }
    }
}

impl FromStr for Season {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        Season::parse(s)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
