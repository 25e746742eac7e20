pub mod aggregate;
pub mod observation;
pub mod season;
pub mod station;

pub use aggregate::{AggregateRow, AggregateTable, BucketKey, Granularity};
pub use observation::{Observation, ObservationTable};
pub use season::Season;
pub use station::StationSummary;
