use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// One hourly reading from a single station.
///
/// `values` holds one slot per measurement column of the owning
/// [`ObservationTable`], in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    #[validate(length(min = 1))]
    pub station: String,

    pub year: i32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    #[validate(range(min = 1, max = 31))]
    pub day: u32,

    #[validate(range(max = 23))]
    pub hour: u32,

    pub values: Vec<Option<f64>>,
}

impl Observation {
    pub fn new(
        station: impl Into<String>,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            station: station.into(),
            year,
            month,
            day,
            hour,
            values,
        }
    }

    /// Reading at `index`, with NaN folded into missing.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .copied()
            .flatten()
            .filter(|v| !v.is_nan())
    }
}

/// The loaded input table: measurement schema plus rows.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    text_columns: Vec<String>,
    observations: Vec<Observation>,
}

impl ObservationTable {
    /// Build a table, checking every row against the schema width and the
    /// calendar/hour ranges.
    pub fn new(columns: Vec<String>, observations: Vec<Observation>) -> Result<Self> {
        for observation in &observations {
            if observation.values.len() != columns.len() {
                return Err(ProcessingError::SchemaMismatch {
                    expected: columns.len(),
                    found: observation.values.len(),
                });
            }
            observation.validate()?;
        }

        Ok(Self {
            columns,
            text_columns: Vec::new(),
            observations,
        })
    }

    /// Record columns that exist in the source but hold non-numeric data.
    pub fn with_text_columns(mut self, text_columns: Vec<String>) -> Self {
        self.text_columns = text_columns;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn text_columns(&self) -> &[String] {
        &self.text_columns
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Resolve a measurement column name to its slot index.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        if let Some(index) = self.columns.iter().position(|c| c == name) {
            return Ok(index);
        }

        if self.text_columns.iter().any(|c| c == name) {
            Err(ProcessingError::NonNumericColumn {
                column: name.to_string(),
            })
        } else {
            Err(ProcessingError::ColumnNotFound {
                column: name.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["PM10".to_string(), "TEMP".to_string()]
    }

    #[test]
    fn test_value_treats_nan_as_missing() {
        let obs = Observation::new("A", 2013, 3, 1, 0, vec![Some(f64::NAN), Some(4.0)]);
        assert_eq!(obs.value(0), None);
        assert_eq!(obs.value(1), Some(4.0));
        assert_eq!(obs.value(2), None);
    }

    #[test]
    fn test_table_rejects_wrong_width() {
        let obs = Observation::new("A", 2013, 3, 1, 0, vec![Some(1.0)]);
        let err = ObservationTable::new(columns(), vec![obs]).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::SchemaMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_table_rejects_out_of_range_hour() {
        let obs = Observation::new("A", 2013, 3, 1, 24, vec![None, None]);
        let err = ObservationTable::new(columns(), vec![obs]).unwrap_err();
        assert!(matches!(err, ProcessingError::Validation(_)));
    }

    #[test]
    fn test_column_index_distinguishes_text_columns() {
        let table = ObservationTable::new(columns(), vec![])
            .unwrap()
            .with_text_columns(vec!["wd".to_string()]);

        assert_eq!(table.column_index("TEMP").unwrap(), 1);
        assert!(matches!(
            table.column_index("wd"),
            Err(ProcessingError::NonNumericColumn { .. })
        ));
        assert!(matches!(
            table.column_index("pm10"),
            Err(ProcessingError::ColumnNotFound { .. })
        ));
    }
}
