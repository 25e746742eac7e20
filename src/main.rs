use air_quality_processor::cli::{run, Cli};
use air_quality_processor::config::Settings;
use air_quality_processor::error::Result;
use air_quality_processor::logging;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    logging::init(cli.verbose, cli.log_file.as_deref(), &settings.logging)?;

    run(cli, &settings)
}
