use crate::config::DashboardSettings;
use crate::error::Result;
use crate::models::{AggregateTable, Season, StationSummary};
use crate::processors::trendline::{fit_trendline, Trendline};
use crate::processors::{Aggregator, Dataset};
use serde::Serialize;
use tracing::info;

/// Every data panel shown for a single station.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub station: String,
    pub summary: Option<StationSummary>,
    pub daily: DailyPanels,
    pub seasonal: SeasonalPanels,
    pub hourly: HourlyPanels,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyPanels {
    pub particles: AggregateTable,
    pub gases: AggregateTable,
    pub carbon_monoxide: AggregateTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalPanels {
    pub season: Season,
    pub particles: AggregateTable,
    pub gases: AggregateTable,
    pub particle_trends: Vec<Trendline>,
    pub gas_trends: Vec<Trendline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyPanels {
    pub particles: AggregateTable,
    pub gases: AggregateTable,
}

impl DashboardReport {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
    }
}

pub struct DashboardBuilder<'a> {
    aggregator: Aggregator<'a>,
    settings: DashboardSettings,
}

impl<'a> DashboardBuilder<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            aggregator: Aggregator::new(dataset),
            settings: DashboardSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DashboardSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.settings.season = season;
        self
    }

    pub fn build(&self, station: &str) -> Result<DashboardReport> {
        let settings = &self.settings;
        let aggregator = &self.aggregator;

        let daily = DailyPanels {
            particles: aggregator.daily_mean(station, &settings.particle_columns)?,
            gases: aggregator.daily_mean(station, &settings.gas_columns)?,
            carbon_monoxide: aggregator.daily_mean(station, &settings.carbon_monoxide_columns)?,
        };

        let particles = aggregator.seasonal_mean(
            station,
            &self.with_temperature(&settings.particle_columns),
            settings.season,
        )?;
        let gases = aggregator.seasonal_mean(
            station,
            &self.with_temperature(&settings.gas_columns),
            settings.season,
        )?;
        let seasonal = SeasonalPanels {
            season: settings.season,
            particle_trends: self.trends(&particles, &settings.particle_columns)?,
            gas_trends: self.trends(&gases, &settings.gas_columns)?,
            particles,
            gases,
        };

        let hourly = HourlyPanels {
            particles: aggregator.hourly_mean(station, &settings.particle_columns)?,
            gases: aggregator.hourly_mean(station, &settings.gas_columns)?,
        };

        let summary = aggregator.dataset().station(station).cloned();
        info!(
            station,
            season = %settings.season,
            found = summary.is_some(),
            "Built dashboard report"
        );

        Ok(DashboardReport {
            station: station.to_string(),
            summary,
            daily,
            seasonal,
            hourly,
        })
    }

    fn with_temperature(&self, columns: &[String]) -> Vec<String> {
        let temperature = &self.settings.temperature_column;
        let mut columns = columns.to_vec();
        if !columns.contains(temperature) {
            columns.push(temperature.clone());
        }
        columns
    }

    /// One pollutant-vs-temperature fit per column; unfittable columns are
    /// left out.
    fn trends(&self, table: &AggregateTable, columns: &[String]) -> Result<Vec<Trendline>> {
        let temperature = &self.settings.temperature_column;
        let mut trends = Vec::new();
        for column in columns.iter().filter(|c| *c != temperature) {
            if let Some(trend) = fit_trendline(table, temperature, column)? {
                trends.push(trend);
            }
        }
        Ok(trends)
    }
}
