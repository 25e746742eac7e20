use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::Observation;

/// Per-station facts computed once when a dataset is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station: String,
    pub rows: usize,
    pub min_year: i32,
    pub max_year: i32,
    /// Schema columns with at least one non-missing reading.
    pub available_columns: BTreeSet<String>,
}

impl StationSummary {
    pub fn new(observation: &Observation, columns: &[String]) -> Self {
        let mut summary = Self {
            station: observation.station.clone(),
            rows: 0,
            min_year: observation.year,
            max_year: observation.year,
            available_columns: BTreeSet::new(),
        };
        summary.record(observation, columns);
        summary
    }

    pub fn record(&mut self, observation: &Observation, columns: &[String]) {
        self.rows += 1;
        self.min_year = self.min_year.min(observation.year);
        self.max_year = self.max_year.max(observation.year);

        for (index, column) in columns.iter().enumerate() {
            if observation.value(index).is_some() && !self.available_columns.contains(column) {
                self.available_columns.insert(column.clone());
            }
        }
    }

    pub fn year_span(&self) -> u32 {
        (self.max_year - self.min_year) as u32 + 1
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.available_columns.contains(column)
    }
}
