use crate::analyzers::StationAnalyzer;
use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::{AggregateTable, Granularity};
use crate::processors::{Aggregator, DashboardBuilder, Dataset};
use crate::readers::ObservationReader;
use crate::utils::filename::generate_default_output_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::{CsvTableWriter, ParquetWriter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute one CLI command. The caller owns settings loading and the
/// global tracing subscriber.
pub fn run(cli: Cli, settings: &Settings) -> Result<()> {
    match cli.command {
        Commands::Stations { input } => {
            let dataset = load_dataset(input.as_deref(), settings)?;

            println!("{:<20} {:>8} {:>6} {:>6}  columns", "station", "rows", "from", "to");
            for summary in dataset.stations() {
                let columns: Vec<&str> = summary
                    .available_columns
                    .iter()
                    .map(String::as_str)
                    .collect();
                println!(
                    "{:<20} {:>8} {:>6} {:>6}  {}",
                    summary.station,
                    summary.rows,
                    summary.min_year,
                    summary.max_year,
                    columns.join(",")
                );
            }
        }

        Commands::Aggregate {
            input,
            station,
            columns,
            by,
            season,
            format,
            output,
            compression,
        } => {
            let granularity = Granularity::from(by);
            if season.is_some() && granularity == Granularity::Hourly {
                return Err(ProcessingError::Config(
                    "A season filter only applies to daily aggregation".to_string(),
                ));
            }

            let dataset = load_dataset(input.as_deref(), settings)?;
            let aggregator = Aggregator::new(&dataset);

            let table = match (granularity, season) {
                (Granularity::Daily, Some(season)) => {
                    aggregator.seasonal_mean(&station, &columns, season)?
                }
                (Granularity::Daily, None) => aggregator.daily_mean(&station, &columns)?,
                (Granularity::Hourly, _) => aggregator.hourly_mean(&station, &columns)?,
            };

            if table.is_empty() {
                info!(station = %station, "No rows matched; writing an empty table");
            }

            write_table(&table, &station, format, output, &compression)?;
        }

        Commands::Dashboard {
            input,
            station,
            season,
            output,
        } => {
            let dataset = load_dataset(input.as_deref(), settings)?;

            let mut builder =
                DashboardBuilder::new(&dataset).with_settings(settings.dashboard.clone());
            if let Some(season) = season {
                builder = builder.with_season(season);
            }
            let report = builder.build(&station)?;

            if report.is_empty() {
                info!(station = %station, "Station not found; dashboard panels are empty");
            }

            let mut writer = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writeln!(writer)?;
            writer.flush()?;
        }

        Commands::Info { input } => {
            let dataset = load_dataset(input.as_deref(), settings)?;
            let report = StationAnalyzer::new().analyze(&dataset)?;
            println!("{}", report.detailed_summary());
        }
    }

    Ok(())
}

fn load_dataset(input: Option<&Path>, settings: &Settings) -> Result<Dataset> {
    let path = input.unwrap_or(&settings.data.path);

    let progress = ProgressReporter::new_spinner(
        &format!("Loading {}...", path.display()),
        false,
    );

    let table = ObservationReader::new()
        .with_mmap(settings.data.use_mmap)
        .read_path(path)?;

    progress.finish_and_clear();
    Ok(Dataset::new(table))
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => {
            create_parent_dir(path)?;
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn write_table(
    table: &AggregateTable,
    station: &str,
    format: OutputFormat,
    output: Option<PathBuf>,
    compression: &str,
) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let writer = open_output(output.as_deref())?;
            CsvTableWriter::new().write(table, writer)?;
        }
        OutputFormat::Json => {
            let mut writer = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut writer, table)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        OutputFormat::Parquet => {
            let path = output.unwrap_or_else(|| {
                generate_default_output_filename(station, table.granularity().as_str(), "parquet")
            });
            create_parent_dir(&path)?;

            let writer = ParquetWriter::new().with_compression(compression)?;
            writer.write_table(table, &path)?;

            let file_info = writer.get_file_info(&path)?;
            info!(path = %path.display(), rows = file_info.total_rows, "Parquet output written");
            eprintln!("{}", file_info.summary());
        }
    }
    Ok(())
}
