pub mod station_analyzer;

pub use station_analyzer::{ColumnCoverage, DatasetReport, StationAnalyzer, StationReport};
