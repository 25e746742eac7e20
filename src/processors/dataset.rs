use crate::models::{Observation, ObservationTable, StationSummary};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Immutable, shareable handle over a loaded observation table.
///
/// Per-station summaries and row indices are computed once here so the
/// aggregations never rescan the whole table to find a station's rows or
/// its most recent year.
#[derive(Debug, Clone)]
pub struct Dataset {
    inner: Arc<DatasetInner>,
}

#[derive(Debug)]
struct DatasetInner {
    table: ObservationTable,
    station_order: Vec<String>,
    summaries: HashMap<String, StationSummary>,
    station_rows: HashMap<String, Vec<usize>>,
}

impl Dataset {
    pub fn new(table: ObservationTable) -> Self {
        let mut station_order = Vec::new();
        let mut summaries: HashMap<String, StationSummary> = HashMap::new();
        let mut station_rows: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, observation) in table.observations().iter().enumerate() {
            match summaries.get_mut(&observation.station) {
                Some(summary) => summary.record(observation, table.columns()),
                None => {
                    station_order.push(observation.station.clone());
                    summaries.insert(
                        observation.station.clone(),
                        StationSummary::new(observation, table.columns()),
                    );
                }
            }
            station_rows
                .entry(observation.station.clone())
                .or_default()
                .push(index);
        }

        info!(
            rows = table.len(),
            stations = station_order.len(),
            columns = table.columns().len(),
            "Dataset loaded"
        );

        Self {
            inner: Arc::new(DatasetInner {
                table,
                station_order,
                summaries,
                station_rows,
            }),
        }
    }

    pub fn table(&self) -> &ObservationTable {
        &self.inner.table
    }

    pub fn columns(&self) -> &[String] {
        self.inner.table.columns()
    }

    pub fn station(&self, station: &str) -> Option<&StationSummary> {
        self.inner.summaries.get(station)
    }

    /// Station summaries in the order stations first appear in the input.
    pub fn stations(&self) -> impl Iterator<Item = &StationSummary> + '_ {
        self.inner
            .station_order
            .iter()
            .filter_map(|s| self.inner.summaries.get(s))
    }

    /// Rows for one station (exact, case-sensitive match).
    pub fn station_rows<'a>(&'a self, station: &str) -> impl Iterator<Item = &'a Observation> + 'a {
        let observations = self.inner.table.observations();
        self.inner
            .station_rows
            .get(station)
            .map(|rows| rows.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&i| &observations[i])
    }
}

impl From<ObservationTable> for Dataset {
    fn from(table: ObservationTable) -> Self {
        Self::new(table)
    }
}
