use crate::models::{Granularity, Season};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "air-quality-processor")]
#[command(about = "Station-level air quality aggregation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: ./airq.toml if present]")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stations in the dataset
    Stations {
        #[arg(short, long, help = "Input CSV file [default: configured data path]")]
        input: Option<PathBuf>,
    },

    /// Compute daily, seasonal or hourly means for one station
    Aggregate {
        #[arg(short, long, help = "Input CSV file [default: configured data path]")]
        input: Option<PathBuf>,

        #[arg(short, long)]
        station: String,

        #[arg(short, long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        #[arg(long, value_enum, default_value = "daily")]
        by: AggregateBy,

        #[arg(long, value_parser = parse_season, help = "Season window (daily only)")]
        season: Option<Season>,

        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,

        #[arg(
            short,
            long,
            help = "Output path [default: stdout, or output/airq-{station}-{by}-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(long, default_value = "snappy")]
        compression: String,
    },

    /// Build every dashboard panel for one station as JSON
    Dashboard {
        #[arg(short, long, help = "Input CSV file [default: configured data path]")]
        input: Option<PathBuf>,

        #[arg(short, long)]
        station: String,

        #[arg(long, value_parser = parse_season, help = "Season for the scatter panels [default: configured]")]
        season: Option<Season>,

        #[arg(short, long, help = "Output JSON path [default: stdout]")]
        output: Option<PathBuf>,
    },

    /// Display coverage information about the dataset
    Info {
        #[arg(short, long, help = "Input CSV file [default: configured data path]")]
        input: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AggregateBy {
    Daily,
    Hourly,
}

impl From<AggregateBy> for Granularity {
    fn from(by: AggregateBy) -> Self {
        match by {
            AggregateBy::Daily => Granularity::Daily,
            AggregateBy::Hourly => Granularity::Hourly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
    Parquet,
}

fn parse_season(s: &str) -> Result<Season, String> {
    Season::parse(s).map_err(|e| e.to_string())
}
