use crate::error::Result;
use crate::models::{AggregateTable, BucketKey, Granularity};
use crate::utils::constants::{DAY_COLUMN, HOUR_COLUMN, MONTH_COLUMN, YEAR_COLUMN};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes aggregate tables as CSV with key columns first; missing means
/// become empty cells.
pub struct CsvTableWriter {
    delimiter: u8,
}

impl CsvTableWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_path(&self, table: &AggregateTable, path: &Path) -> Result<()> {
        self.write(table, File::create(path)?)
    }

    pub fn write<W: Write>(&self, table: &AggregateTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        let mut header: Vec<&str> = match table.granularity() {
            Granularity::Daily => vec![YEAR_COLUMN, MONTH_COLUMN, DAY_COLUMN, "date"],
            Granularity::Hourly => vec![HOUR_COLUMN],
        };
        header.extend(table.columns().iter().map(String::as_str));
        csv_writer.write_record(&header)?;

        for row in table.rows() {
            let mut record: Vec<String> = match row.key {
                BucketKey::Day { year, month, day } => vec![
                    year.to_string(),
                    month.to_string(),
                    day.to_string(),
                    row.key.date().map(|d| d.to_string()).unwrap_or_default(),
                ],
                BucketKey::Hour { hour } => vec![hour.to_string()],
            };
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for CsvTableWriter {
    fn default() -> Self {
        Self::new()
    }
}
