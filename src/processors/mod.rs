pub mod aggregator;
pub mod dashboard;
pub mod dataset;
pub mod trendline;

pub use aggregator::{daily_mean, hourly_mean, seasonal_mean, Aggregator};
pub use dashboard::{DashboardBuilder, DashboardReport};
pub use dataset::Dataset;
pub use trendline::{fit_trendline, Trendline};
