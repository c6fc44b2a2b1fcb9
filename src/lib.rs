// Core library for the vgclean video game sales cleaner

pub use cli::{Cli, StatsFormat};
pub use config::{CleanConfig, InputConfig, OutputConfig};
pub use error::{CleanError, Result};
pub use pipeline::{Pipeline, Stage};
pub use report::TableSummary;
pub use stats::CleaningStats;
pub use table::{Column, Row, Schema, Table, Value};

pub mod cli;
pub mod config;
pub mod error;
pub mod formatters;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;
pub mod timestamp;

use std::path::Path;
use tracing::{debug, info};

/// Result of a cleaning run: the table that was written plus its counters
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub table: Table,
    pub stats: CleaningStats,
}

/// Clean `source` with default settings and write the result to `destination`.
///
/// Returns the cleaned table, identical to what was written.
pub fn clean(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Table> {
    let config = CleanConfig::new(source, destination);
    clean_with_config(&config).map(|cleaned| cleaned.table)
}

/// Load, run the standard stages, then persist according to `config`.
///
/// Nothing is written unless every earlier step succeeded.
pub fn clean_with_config(config: &CleanConfig) -> Result<Cleaned> {
    let mut stats = CleaningStats::new();

    let table = config.loader().load_path(&config.input.path)?;
    stats.rows_loaded = table.len();
    stats.columns = table.width();
    info!(
        rows = table.len(),
        columns = table.width(),
        source = %config.input.path.display(),
        "loaded table"
    );

    let table = Pipeline::standard().run(table, &mut stats);
    stats.rows_output = table.len();

    config.writer().write_path(&table, &config.output.path)?;
    stats.finish_processing();
    info!(
        rows = table.len(),
        columns = table.width(),
        destination = %config.output.path.display(),
        "wrote cleaned table"
    );
    debug!("{}", stats.format_stats());
    debug!("final table:\n{}", TableSummary::from_table(&table).format());

    Ok(Cleaned { table, stats })
}
