use crate::error::Result;
use crate::models::Season;
use crate::utils::constants::{
    CO, DEFAULT_CONFIG_NAME, DEFAULT_DATA_PATH, ENV_PREFIX, NO2, O3, PM10, PM25, SO2, TEMP,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub data: DataSettings,

    #[validate(nested)]
    pub dashboard: DashboardSettings,

    #[validate(nested)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DataSettings {
    pub path: PathBuf,
    pub use_mmap: bool,
}

/// Column groups for each dashboard panel.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardSettings {
    pub season: Season,

    #[validate(length(min = 1))]
    pub particle_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub gas_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub carbon_monoxide_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub temperature_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingSettings {
    #[validate(length(min = 1))]
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: DataSettings {
                path: PathBuf::from(DEFAULT_DATA_PATH),
                use_mmap: false,
            },
            dashboard: DashboardSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            season: Season::Winter,
            particle_columns: vec![PM10.to_string(), PM25.to_string()],
            gas_columns: vec![NO2.to_string(), SO2.to_string(), O3.to_string()],
            carbon_monoxide_columns: vec![CO.to_string()],
            temperature_column: TEMP.to_string(),
        }
    }
}

impl Settings {
    /// Layer built-in defaults, a TOML file and `AIRQ__*` environment
    /// variables, in that order of precedence.
    ///
    /// An explicit `path` must exist; otherwise `airq.toml` in the working
    /// directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.dashboard.season, Season::Winter);
        assert_eq!(settings.dashboard.particle_columns, vec!["PM10", "PM2.5"]);
    }

    #[test]
    fn test_load_file_overrides_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            r#"
[data]
path = "elsewhere.csv"

[dashboard]
season = "summer"
gas_columns = ["NO2"]
"#
        )?;

        let settings = Settings::load(Some(file.path()))?;
        assert_eq!(settings.data.path, PathBuf::from("elsewhere.csv"));
        assert!(!settings.data.use_mmap);
        assert_eq!(settings.dashboard.season, Season::Summer);
        assert_eq!(settings.dashboard.gas_columns, vec!["NO2"]);
        assert_eq!(settings.dashboard.temperature_column, "TEMP");
        Ok(())
    }

    #[test]
    fn test_load_rejects_blank_temperature_column() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[dashboard]\ntemperature_column = \"\"")?;

        assert!(Settings::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file_and_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[logging]\nlevel = \"warn\"")?;

        // No other test in this binary reads the logging section.
        std::env::set_var("AIRQ__LOGGING__LEVEL", "debug");
        let loaded = Settings::load(Some(file.path()));
        std::env::remove_var("AIRQ__LOGGING__LEVEL");

        let settings = loaded?;
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.data.path, PathBuf::from(DEFAULT_DATA_PATH));
        Ok(())
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = Path::new("definitely/not/here.toml");
        assert!(Settings::load(Some(path)).is_err());
    }
}
