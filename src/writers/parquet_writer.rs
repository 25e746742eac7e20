use crate::error::{ProcessingError, Result};
use crate::models::{AggregateRow, AggregateTable, BucketKey, Granularity};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DAY_COLUMN, DEFAULT_ROW_GROUP_SIZE, HOUR_COLUMN, MONTH_COLUMN, UNIX_EPOCH_DAYS_FROM_CE,
    YEAR_COLUMN,
};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int32Array, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write an aggregate table to a Parquet file.
    ///
    /// A table with no rows still produces a file carrying the schema.
    pub fn write_table(&self, table: &AggregateTable, path: &Path) -> Result<()> {
        self.write_table_batched(table, path, table.len().max(1))
    }

    /// Write an aggregate table in record batches of `batch_size` rows
    pub fn write_table_batched(
        &self,
        table: &AggregateTable,
        path: &Path,
        batch_size: usize,
    ) -> Result<()> {
        let schema = self.create_schema(table);
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in table.rows().chunks(batch_size.max(1)) {
            let batch = self.rows_to_batch(table, chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;
        debug!(path = %path.display(), rows = table.len(), "Wrote Parquet table");
        Ok(())
    }

    /// Arrow schema: bucket key columns followed by one nullable Float64
    /// column per aggregated measurement
    fn create_schema(&self, table: &AggregateTable) -> Arc<Schema> {
        let mut fields = match table.granularity() {
            Granularity::Daily => vec![
                Field::new(YEAR_COLUMN, DataType::Int32, false),
                Field::new(MONTH_COLUMN, DataType::UInt32, false),
                Field::new(DAY_COLUMN, DataType::UInt32, false),
                Field::new("date", DataType::Date32, true),
            ],
            Granularity::Hourly => vec![Field::new(HOUR_COLUMN, DataType::UInt32, false)],
        };

        for column in table.columns() {
            fields.push(Field::new(column, DataType::Float64, true));
        }

        Arc::new(Schema::new(fields))
    }

    /// Convert rows to Arrow RecordBatch
    fn rows_to_batch(
        &self,
        table: &AggregateTable,
        rows: &[AggregateRow],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

        match table.granularity() {
            Granularity::Daily => {
                let mut years = Vec::with_capacity(rows.len());
                let mut months = Vec::with_capacity(rows.len());
                let mut days = Vec::with_capacity(rows.len());
                let mut dates = Vec::with_capacity(rows.len());

                for row in rows {
                    let BucketKey::Day { year, month, day } = row.key else {
                        return Err(ProcessingError::InvalidFormat(format!(
                            "Hourly key {:?} in a daily table",
                            row.key
                        )));
                    };
                    years.push(year);
                    months.push(month);
                    days.push(day);
                    dates.push(
                        row.key
                            .date()
                            .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
                    );
                }

                arrays.push(Arc::new(Int32Array::from(years)));
                arrays.push(Arc::new(UInt32Array::from(months)));
                arrays.push(Arc::new(UInt32Array::from(days)));
                arrays.push(Arc::new(Date32Array::from(dates)));
            }
            Granularity::Hourly => {
                let mut hours = Vec::with_capacity(rows.len());
                for row in rows {
                    let BucketKey::Hour { hour } = row.key else {
                        return Err(ProcessingError::InvalidFormat(format!(
                            "Daily key {:?} in an hourly table",
                            row.key
                        )));
                    };
                    hours.push(hour);
                }
                arrays.push(Arc::new(UInt32Array::from(hours)));
            }
        }

        for index in 0..table.columns().len() {
            let values: Vec<Option<f64>> = rows.iter().map(|r| r.values[index]).collect();
            arrays.push(Arc::new(Float64Array::from(values)));
        }

        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Get information about a Parquet file
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Info:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression
        )
    }
}
