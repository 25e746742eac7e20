use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ProcessingError, Result};
use crate::models::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Hourly,
}

impl Granularity {
    pub fn key_for(&self, observation: &Observation) -> BucketKey {
        match self {
            Granularity::Daily => BucketKey::Day {
                year: observation.year,
                month: observation.month,
                day: observation.day,
            },
            Granularity::Hourly => BucketKey::Hour {
                hour: observation.hour,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Hourly => "hourly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time bucket a group of observations is reduced into.
///
/// The derived ordering compares daily keys by year, month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Day { year: i32, month: u32, day: u32 },
    Hour { hour: u32 },
}

impl BucketKey {
    pub fn day(year: i32, month: u32, day: u32) -> Self {
        BucketKey::Day { year, month, day }
    }

    pub fn hour(hour: u32) -> Self {
        BucketKey::Hour { hour }
    }

    /// Calendar date of a daily bucket; `None` for hourly buckets or
    /// impossible dates such as 2014-02-30.
    pub fn date(&self) -> Option<NaiveDate> {
        match *self {
            BucketKey::Day { year, month, day } => NaiveDate::from_ymd_opt(year, month, day),
            BucketKey::Hour { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: BucketKey,
    pub values: Vec<Option<f64>>,
}

impl AggregateRow {
    pub fn new(key: BucketKey, values: Vec<Option<f64>>) -> Self {
        Self { key, values }
    }
}

/// One row per bucket, each cell the mean of the requested column.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    granularity: Granularity,
    columns: Vec<String>,
    rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Rows are sorted by bucket key regardless of input order. Every row
    /// must carry exactly one value per column.
    pub fn new(
        granularity: Granularity,
        columns: Vec<String>,
        mut rows: Vec<AggregateRow>,
    ) -> Result<Self> {
        if let Some(row) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(ProcessingError::SchemaMismatch {
                expected: columns.len(),
                found: row.values.len(),
            });
        }

        rows.sort_by_key(|r| r.key);
        Ok(Self {
            granularity,
            columns,
            rows,
        })
    }

    pub fn empty(granularity: Granularity, columns: Vec<String>) -> Self {
        Self {
            granularity,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.rows.iter().map(|r| r.key)
    }

    pub fn row(&self, key: &BucketKey) -> Option<&AggregateRow> {
        self.rows
            .binary_search_by(|r| r.key.cmp(key))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Mean for `column` in the bucket `key`; `None` when the bucket is
    /// absent or every reading in it was missing.
    pub fn value(&self, key: &BucketKey, column: &str) -> Result<Option<f64>> {
        let index = self.column_index(column)?;
        Ok(self.row(key).and_then(|r| r.values[index]))
    }

    pub fn column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.values[index]).collect())
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ProcessingError::ColumnNotFound {
                column: name.to_string(),
            })
    }
}

impl Serialize for AggregateTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows: Vec<RowView<'_>> = self
            .rows
            .iter()
            .map(|row| RowView {
                columns: &self.columns,
                row,
            })
            .collect();

        let mut state = serializer.serialize_struct("AggregateTable", 3)?;
        state.serialize_field("granularity", &self.granularity)?;
        state.serialize_field("columns", &self.columns)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

/// Flat `{ key fields..., column: mean, ... }` rendering of one row.
struct RowView<'a> {
    columns: &'a [String],
    row: &'a AggregateRow,
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self.row.key {
            BucketKey::Day { year, month, day } => {
                map.serialize_entry("year", &year)?;
                map.serialize_entry("month", &month)?;
                map.serialize_entry("day", &day)?;
                map.serialize_entry("date", &self.row.key.date())?;
            }
            BucketKey::Hour { hour } => {
                map.serialize_entry("hour", &hour)?;
            }
        }
        for (column, value) in self.columns.iter().zip(&self.row.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
