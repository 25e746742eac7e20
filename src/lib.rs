pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
pub use models::{AggregateTable, Observation, ObservationTable, Season};
pub use processors::{daily_mean, hourly_mean, seasonal_mean, Aggregator, Dataset};
