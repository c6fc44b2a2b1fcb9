use anyhow::{Context, Result};
use clap::Parser;

use vgclean::{clean_with_config, CleanConfig, Cli, StatsFormat, TableSummary};

mod logging;
mod platform;

use platform::ExitCode;

fn run(config: &CleanConfig) -> Result<()> {
    let cleaned = clean_with_config(config).with_context(|| {
        format!(
            "cleaning {} into {}",
            config.input.path.display(),
            config.output.path.display()
        )
    })?;

    match config.output.stats {
        Some(StatsFormat::Table) => {
            eprintln!("{}", cleaned.stats.format_stats());
            eprintln!("{}", TableSummary::from_table(&cleaned.table).format());
        }
        Some(StatsFormat::Json) => {
            let json = serde_json::json!({
                "stats": cleaned.stats,
                "summary": TableSummary::from_table(&cleaned.table),
            });
            let text = serde_json::to_string_pretty(&json).context("serializing stats")?;
            eprintln!("{}", text);
        }
        None => {}
    }

    Ok(())
}

fn main() {
    // clap exits with status 2 on invalid usage
    let cli = Cli::parse();

    logging::init_logging(cli.quiet, cli.verbose);

    let config = CleanConfig::from_cli(&cli);
    if let Err(e) = run(&config) {
        eprintln!("vgclean: Error: {:#}", e);
        ExitCode::GeneralError.exit();
    }
}
