use crate::error::{ProcessingError, Result};
use crate::processors::Dataset;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub text_columns: Vec<String>,
    pub stations: Vec<StationReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StationReport {
    pub station: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub years: (i32, i32),
    pub coverage: Vec<ColumnCoverage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnCoverage {
    pub column: String,
    pub present: usize,
    pub missing: usize,
}

impl ColumnCoverage {
    pub fn missing_percentage(&self) -> f64 {
        let total = self.present + self.missing;
        if total == 0 {
            return 0.0;
        }
        (self.missing as f64 / total as f64) * 100.0
    }
}

pub struct StationAnalyzer;

impl StationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> Result<DatasetReport> {
        if dataset.table().is_empty() {
            return Err(ProcessingError::MissingData(
                "No observations to analyze".to_string(),
            ));
        }

        let stations = dataset
            .stations()
            .map(|summary| self.analyze_station(dataset, &summary.station))
            .collect();

        Ok(DatasetReport {
            total_rows: dataset.table().len(),
            columns: dataset.columns().to_vec(),
            text_columns: dataset.table().text_columns().to_vec(),
            stations,
        })
    }

    fn analyze_station(&self, dataset: &Dataset, station: &str) -> StationReport {
        let columns = dataset.columns();
        let mut present = vec![0usize; columns.len()];
        let mut rows = 0;
        let mut first: Option<(i32, u32, u32)> = None;
        let mut last: Option<(i32, u32, u32)> = None;

        for observation in dataset.station_rows(station) {
            rows += 1;

            let ymd = (observation.year, observation.month, observation.day);
            if first.map_or(true, |f| ymd < f) {
                first = Some(ymd);
            }
            if last.map_or(true, |l| ymd > l) {
                last = Some(ymd);
            }

            for (index, count) in present.iter_mut().enumerate() {
                if observation.value(index).is_some() {
                    *count += 1;
                }
            }
        }

        let coverage = columns
            .iter()
            .zip(present)
            .map(|(column, present)| ColumnCoverage {
                column: column.clone(),
                present,
                missing: rows - present,
            })
            .collect();

        let to_date = |ymd: Option<(i32, u32, u32)>| {
            ymd.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        };

        StationReport {
            station: station.to_string(),
            rows,
            first_date: to_date(first),
            last_date: to_date(last),
            years: first.zip(last).map_or((0, 0), |(f, l)| (f.0, l.0)),
            coverage,
        }
    }
}

impl Default for StationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "unknown".to_string(), |d| d.to_string())
}

impl StationReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} records, {} to {} ({}-{})",
            self.station,
            self.rows,
            format_date(self.first_date),
            format_date(self.last_date),
            self.years.0,
            self.years.1
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();
        for coverage in &self.coverage {
            out.push_str(&format!(
                "\n  - {:<6} {:>8} present, {:>5.1}% missing",
                coverage.column,
                coverage.present,
                coverage.missing_percentage()
            ));
        }
        out
    }
}

impl DatasetReport {
    pub fn summary(&self) -> String {
        let text = if self.text_columns.is_empty() {
            "none".to_string()
        } else {
            self.text_columns.join(", ")
        };

        format!(
            "Records: {} total\n\
            Stations: {}\n\
            Measurement columns: {}\n\
            Text columns (not aggregatable): {}",
            self.total_rows,
            self.stations.len(),
            self.columns.join(", "),
            text
        )
    }

    pub fn detailed_summary(&self) -> String {
        let stations: Vec<String> = self
            .stations
            .iter()
            .map(StationReport::detailed_summary)
            .collect();

        format!("{}\n\nStations:\n{}", self.summary(), stations.join("\n"))
    }
}
