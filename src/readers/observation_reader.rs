use crate::error::{ProcessingError, Result};
use crate::models::{Observation, ObservationTable};
use crate::utils::constants::{
    DAY_COLUMN, DEFAULT_BUFFER_SIZE, HOUR_COLUMN, INDEX_COLUMNS, MISSING_TOKENS, MONTH_COLUMN,
    STATION_COLUMN, YEAR_COLUMN,
};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Positions of the key columns and measurement candidates in a header row.
#[derive(Debug)]
struct HeaderLayout {
    station: usize,
    year: usize,
    month: usize,
    day: usize,
    hour: usize,
    measurements: Vec<(usize, String)>,
}

impl HeaderLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ProcessingError::MissingColumn(name.to_string()))
        };

        let station = find(STATION_COLUMN)?;
        let year = find(YEAR_COLUMN)?;
        let month = find(MONTH_COLUMN)?;
        let day = find(DAY_COLUMN)?;
        let hour = find(HOUR_COLUMN)?;
        let keys = [station, year, month, day, hour];

        let measurements = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !keys.contains(i) && !is_index_column(h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        Ok(Self {
            station,
            year,
            month,
            day,
            hour,
            measurements,
        })
    }
}

pub struct ObservationReader {
    use_mmap: bool,
    delimiter: u8,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            delimiter: b',',
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read the observation table from a CSV file
    pub fn read_path(&self, path: &Path) -> Result<ObservationTable> {
        info!(path = %path.display(), mmap = self.use_mmap, "Reading observations");

        let file = File::open(path)?;
        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from(&mmap[..])
        } else {
            self.read_from(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file))
        }
    }

    /// Read the observation table from any CSV source with a header row
    pub fn read_from<R: Read>(&self, reader: R) -> Result<ObservationTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let layout = HeaderLayout::from_headers(csv_reader.headers()?)?;
        let mut numeric = vec![true; layout.measurements.len()];
        let mut observations = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let station = record.get(layout.station).unwrap_or("");
            if station.is_empty() {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Empty station identifier on line {}",
                    line
                )));
            }

            let year: i32 = parse_key(&record, layout.year, YEAR_COLUMN, line)?;
            let month: u32 = parse_key(&record, layout.month, MONTH_COLUMN, line)?;
            let day: u32 = parse_key(&record, layout.day, DAY_COLUMN, line)?;
            let hour: u32 = parse_key(&record, layout.hour, HOUR_COLUMN, line)?;

            let mut values = Vec::with_capacity(layout.measurements.len());
            for (slot, (index, _)) in layout.measurements.iter().enumerate() {
                let raw = record.get(*index).unwrap_or("");
                let value = if is_missing(raw) {
                    None
                } else {
                    match raw.parse::<f64>() {
                        Ok(v) if v.is_finite() => Some(v),
                        Ok(_) => None,
                        Err(_) => {
                            numeric[slot] = false;
                            None
                        }
                    }
                };
                values.push(value);
            }

            observations.push(Observation::new(station, year, month, day, hour, values));
        }

        let mut columns = Vec::new();
        let mut text_columns = Vec::new();
        for ((_, name), is_numeric) in layout.measurements.into_iter().zip(&numeric) {
            if *is_numeric {
                columns.push(name);
            } else {
                warn!(column = %name, "Column holds non-numeric values; excluded from measurements");
                text_columns.push(name);
            }
        }

        if !text_columns.is_empty() {
            for observation in &mut observations {
                let mut slot = 0;
                observation.values.retain(|_| {
                    let keep = numeric[slot];
                    slot += 1;
                    keep
                });
            }
        }

        debug!(
            rows = observations.len(),
            columns = columns.len(),
            text_columns = text_columns.len(),
            "Parsed observation rows"
        );

        Ok(ObservationTable::new(columns, observations)?.with_text_columns(text_columns))
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw)
}

/// Unnamed headers and row-index columns carry no readings.
fn is_index_column(header: &str) -> bool {
    header.is_empty() || INDEX_COLUMNS.contains(&header)
}

fn parse_key<T: FromStr>(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<T> {
    let raw = record.get(index).unwrap_or("");
    raw.parse::<T>().map_err(|_| {
        ProcessingError::InvalidFormat(format!("Invalid {} '{}' on line {}", name, raw, line))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,wd,station
1,2013,3,1,0,4,4,4,7,300,77,-0.7,NNW,Aotizhongxin
2,2013,3,1,1,8,8,4,7,300,77,-1.1,N,Aotizhongxin
3,2013,3,1,2,NA,,5,10,300,73,-1.1,NNW,Dongsi
";

    #[test]
    fn test_read_sample() -> Result<()> {
        let table = ObservationReader::new().read_from(SAMPLE.as_bytes())?;

        assert_eq!(
            table.columns(),
            &["PM2.5", "PM10", "SO2", "NO2", "CO", "O3", "TEMP"].map(String::from)
        );
        assert_eq!(table.text_columns(), &["wd".to_string()]);
        assert_eq!(table.len(), 3);

        let first = &table.observations()[0];
        assert_eq!(first.station, "Aotizhongxin");
        assert_eq!((first.year, first.month, first.day, first.hour), (2013, 3, 1, 0));
        assert_eq!(first.values.len(), 7);
        assert_eq!(first.value(table.column_index("TEMP")?), Some(-0.7));

        let third = &table.observations()[2];
        assert_eq!(third.value(table.column_index("PM2.5")?), None);
        assert_eq!(third.value(table.column_index("PM10")?), None);
        assert_eq!(third.value(table.column_index("SO2")?), Some(5.0));

        Ok(())
    }

    #[test]
    fn test_index_columns_are_not_measurements() -> Result<()> {
        let csv = ",No,station,year,month,day,hour,PM10\n0,1,A,2013,3,1,0,4\n";
        let table = ObservationReader::new().read_from(csv.as_bytes())?;

        assert_eq!(table.columns(), &["PM10".to_string()]);
        assert!(table.text_columns().is_empty());
        assert!(matches!(
            table.column_index("No"),
            Err(ProcessingError::ColumnNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_infinite_readings_are_missing() -> Result<()> {
        let csv = "station,year,month,day,hour,PM10,TEMP\n\
                   A,2013,3,1,0,inf,-1.5\n\
                   A,2013,3,1,1,12,-infinity\n";
        let table = ObservationReader::new().read_from(csv.as_bytes())?;

        assert_eq!(table.columns(), &["PM10".to_string(), "TEMP".to_string()]);
        let values: Vec<Vec<Option<f64>>> = table
            .observations()
            .iter()
            .map(|o| o.values.clone())
            .collect();
        assert_eq!(values, vec![vec![None, Some(-1.5)], vec![Some(12.0), None]]);
        Ok(())
    }

    #[test]
    fn test_missing_key_column() {
        let csv = "station,year,month,day,PM10\nA,2013,3,1,4\n";
        let err = ObservationReader::new().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ProcessingError::MissingColumn(c) if c == "hour"));
    }

    #[test]
    fn test_invalid_key_reports_line() {
        let csv = "station,year,month,day,hour,PM10\nA,2013,3,1,0,4\nA,20x3,3,1,1,4\n";
        let err = ObservationReader::new().read_from(csv.as_bytes()).unwrap_err();
        match err {
            ProcessingError::InvalidFormat(msg) => {
                assert!(msg.contains("year"));
                assert!(msg.contains("line 3"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_out_of_range_month_rejected() {
        let csv = "station,year,month,day,hour,PM10\nA,2013,13,1,0,4\n";
        let err = ObservationReader::new().read_from(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ProcessingError::Validation(_)));
    }

    #[test]
    fn test_read_path_buffered_and_mmap_agree() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", SAMPLE)?;

        let buffered = ObservationReader::new().read_path(temp_file.path())?;
        let mapped = ObservationReader::new()
            .with_mmap(true)
            .read_path(temp_file.path())?;

        assert_eq!(buffered.observations(), mapped.observations());
        assert_eq!(buffered.columns(), mapped.columns());
        Ok(())
    }

    #[test]
    fn test_semicolon_delimiter() -> Result<()> {
        let csv = "station;year;month;day;hour;PM10\nA;2013;3;1;0;4.5\n";
        let table = ObservationReader::new()
            .with_delimiter(b';')
            .read_from(csv.as_bytes())?;
        assert_eq!(table.observations()[0].value(0), Some(4.5));
        Ok(())
    }
}
