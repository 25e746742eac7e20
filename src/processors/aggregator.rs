use crate::error::{ProcessingError, Result};
use crate::models::{AggregateRow, AggregateTable, BucketKey, Granularity, Season};
use crate::processors::Dataset;
use std::collections::HashMap;
use tracing::debug;

/// Running sum and count of the non-missing readings in one bucket.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Group-by-mean over one station's observations.
pub struct Aggregator<'a> {
    dataset: &'a Dataset,
}

impl<'a> Aggregator<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Mean of each requested column per `(year, month, day)`.
    pub fn daily_mean<S: AsRef<str>>(&self, station: &str, columns: &[S]) -> Result<AggregateTable> {
        self.aggregate(station, columns, Granularity::Daily, None)
    }

    /// Daily means restricted to one season window of the station's data.
    pub fn seasonal_mean<S: AsRef<str>>(
        &self,
        station: &str,
        columns: &[S],
        season: Season,
    ) -> Result<AggregateTable> {
        self.aggregate(station, columns, Granularity::Daily, Some(season))
    }

    /// Mean of each requested column per hour of day, across all dates.
    pub fn hourly_mean<S: AsRef<str>>(&self, station: &str, columns: &[S]) -> Result<AggregateTable> {
        self.aggregate(station, columns, Granularity::Hourly, None)
    }

    fn aggregate<S: AsRef<str>>(
        &self,
        station: &str,
        columns: &[S],
        granularity: Granularity,
        season: Option<Season>,
    ) -> Result<AggregateTable> {
        // Columns are checked before the station so a bad column name fails
        // even when the station has no rows.
        let indices = self.resolve_columns(columns)?;
        let names: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();

        let Some(summary) = self.dataset.station(station) else {
            debug!(station, "No observations for station");
            return Ok(AggregateTable::empty(granularity, names));
        };

        let mut buckets: HashMap<BucketKey, Vec<MeanAccumulator>> = HashMap::new();
        let mut matched = 0usize;

        for observation in self.dataset.station_rows(station) {
            if let Some(season) = season {
                if !season.contains(observation.year, observation.month, summary.max_year) {
                    continue;
                }
            }
            matched += 1;

            let accumulators = buckets
                .entry(granularity.key_for(observation))
                .or_insert_with(|| vec![MeanAccumulator::default(); indices.len()]);

            for (accumulator, &index) in accumulators.iter_mut().zip(&indices) {
                accumulator.push(observation.value(index));
            }
        }

        let rows: Vec<AggregateRow> = buckets
            .into_iter()
            .map(|(key, accumulators)| {
                AggregateRow::new(key, accumulators.iter().map(MeanAccumulator::mean).collect())
            })
            .collect();

        debug!(
            station,
            %granularity,
            season = season.map(|s| s.as_str()),
            matched,
            buckets = rows.len(),
            "Aggregated station observations"
        );

        AggregateTable::new(granularity, names, rows)
    }

    fn resolve_columns<S: AsRef<str>>(&self, columns: &[S]) -> Result<Vec<usize>> {
        if columns.is_empty() {
            return Err(ProcessingError::EmptyColumnSelection);
        }

        columns
            .iter()
            .map(|c| self.dataset.table().column_index(c.as_ref()))
            .collect()
    }
}

pub fn daily_mean<S: AsRef<str>>(
    dataset: &Dataset,
    station: &str,
    columns: &[S],
) -> Result<AggregateTable> {
    Aggregator::new(dataset).daily_mean(station, columns)
}

pub fn seasonal_mean<S: AsRef<str>>(
    dataset: &Dataset,
    station: &str,
    columns: &[S],
    season: Season,
) -> Result<AggregateTable> {
    Aggregator::new(dataset).seasonal_mean(station, columns, season)
}

pub fn hourly_mean<S: AsRef<str>>(
    dataset: &Dataset,
    station: &str,
    columns: &[S],
) -> Result<AggregateTable> {
    Aggregator::new(dataset).hourly_mean(station, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Observation, ObservationTable};
    use pretty_assertions::assert_eq;

    fn dataset(rows: Vec<Observation>) -> Dataset {
        let columns = vec!["PM10".to_string(), "NO2".to_string()];
        Dataset::new(ObservationTable::new(columns, rows).unwrap())
    }

    #[test]
    fn test_daily_mean_groups_by_day() {
        let data = dataset(vec![
            Observation::new("A", 2013, 3, 2, 0, vec![Some(4.0), Some(1.0)]),
            Observation::new("A", 2013, 3, 1, 0, vec![Some(10.0), None]),
            Observation::new("A", 2013, 3, 1, 1, vec![Some(20.0), Some(3.0)]),
            Observation::new("B", 2013, 3, 1, 0, vec![Some(99.0), Some(99.0)]),
        ]);

        let table = daily_mean(&data, "A", &["PM10", "NO2"]).unwrap();

        assert_eq!(
            table.keys().collect::<Vec<_>>(),
            vec![BucketKey::day(2013, 3, 1), BucketKey::day(2013, 3, 2)]
        );
        assert_eq!(table.rows()[0].values, vec![Some(15.0), Some(3.0)]);
        assert_eq!(table.rows()[1].values, vec![Some(4.0), Some(1.0)]);
    }

    #[test]
    fn test_all_missing_group_yields_none() {
        let data = dataset(vec![
            Observation::new("A", 2013, 3, 1, 0, vec![None, Some(2.0)]),
            Observation::new("A", 2013, 3, 1, 1, vec![Some(f64::NAN), Some(4.0)]),
        ]);

        let table = daily_mean(&data, "A", &["PM10", "NO2"]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].values, vec![None, Some(3.0)]);
    }

    #[test]
    fn test_station_match_is_case_sensitive() {
        let data = dataset(vec![Observation::new("Dongsi", 2013, 3, 1, 0, vec![Some(1.0), None])]);

        assert!(daily_mean(&data, "dongsi", &["PM10"]).unwrap().is_empty());
        assert_eq!(daily_mean(&data, "Dongsi", &["PM10"]).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_column_fails_even_for_unknown_station() {
        let data = dataset(vec![Observation::new("A", 2013, 3, 1, 0, vec![Some(1.0), None])]);

        let err = daily_mean(&data, "NOPE", &["PM10", "NOT_A_COLUMN"]).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::ColumnNotFound { column } if column == "NOT_A_COLUMN"
        ));
    }

    #[test]
    fn test_empty_column_selection_rejected() {
        let data = dataset(vec![]);
        let columns: [&str; 0] = [];
        assert!(matches!(
            hourly_mean(&data, "A", &columns),
            Err(ProcessingError::EmptyColumnSelection)
        ));
    }

    #[test]
    fn test_requested_column_order_is_kept() {
        let data = dataset(vec![Observation::new("A", 2013, 3, 1, 0, vec![Some(1.0), Some(2.0)])]);

        let table = daily_mean(&data, "A", &["NO2", "PM10"]).unwrap();
        assert_eq!(table.columns(), &["NO2".to_string(), "PM10".to_string()]);
        assert_eq!(table.rows()[0].values, vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_hourly_mean_collapses_dates() {
        let data = dataset(vec![
            Observation::new("A", 2013, 3, 1, 5, vec![Some(10.0), None]),
            Observation::new("A", 2014, 7, 9, 5, vec![Some(20.0), None]),
            Observation::new("A", 2015, 1, 1, 5, vec![None, None]),
            Observation::new("A", 2015, 1, 1, 0, vec![Some(1.0), None]),
        ]);

        let table = hourly_mean(&data, "A", &["PM10"]).unwrap();
        assert_eq!(
            table.keys().collect::<Vec<_>>(),
            vec![BucketKey::hour(0), BucketKey::hour(5)]
        );
        assert_eq!(table.value(&BucketKey::hour(5), "PM10").unwrap(), Some(15.0));
    }

    #[test]
    fn test_seasonal_mean_uses_station_max_year() {
        let data = dataset(vec![
            Observation::new("A", 2013, 12, 30, 0, vec![Some(1.0), None]),
            Observation::new("A", 2014, 1, 2, 0, vec![Some(2.0), None]),
            Observation::new("A", 2014, 12, 30, 0, vec![Some(3.0), None]),
            Observation::new("A", 2015, 2, 1, 0, vec![Some(4.0), None]),
            // B's max year must not leak into A's window
            Observation::new("B", 2016, 1, 1, 0, vec![Some(5.0), None]),
        ]);

        let winter = seasonal_mean(&data, "A", &["PM10"], Season::Winter).unwrap();
        assert_eq!(
            winter.keys().collect::<Vec<_>>(),
            vec![BucketKey::day(2014, 12, 30), BucketKey::day(2015, 2, 1)]
        );
    }

    #[test]
    fn test_single_year_winter_only_has_jan_feb() {
        let data = dataset(vec![
            Observation::new("A", 2014, 1, 5, 0, vec![Some(1.0), None]),
            Observation::new("A", 2014, 12, 5, 0, vec![Some(2.0), None]),
        ]);

        let winter = seasonal_mean(&data, "A", &["PM10"], Season::Winter).unwrap();
        assert_eq!(winter.keys().collect::<Vec<_>>(), vec![BucketKey::day(2014, 1, 5)]);

        let summer = seasonal_mean(&data, "A", &["PM10"], Season::Summer).unwrap();
        assert!(summer.is_empty());
    }
}
