use std::path::{Path, PathBuf};

use crate::cli::{Cli, StatsFormat};
use crate::formatters::CsvWriter;
use crate::parsers::csv::{CsvLoader, DEFAULT_NA_VALUES};

/// Main configuration struct for one cleaning run
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    pub na_values: Vec<String>,
    pub keep_empty: bool,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub delimiter: char,
    /// Summary printed by the binary when set
    pub stats: Option<StatsFormat>,
}

impl CleanConfig {
    /// Default settings for a source/destination pair
    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Self {
        Self {
            input: InputConfig {
                path: source.as_ref().to_path_buf(),
                delimiter: b',',
                na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
                keep_empty: false,
            },
            output: OutputConfig {
                path: destination.as_ref().to_path_buf(),
                delimiter: ',',
                stats: None,
            },
        }
    }

    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self::new(&cli.source, &cli.destination);
        // the CLI only accepts ASCII delimiters
        config.input.delimiter = cli.delimiter as u8;
        if !cli.na_values.is_empty() {
            config.input.na_values = cli.na_values.clone();
        }
        config.input.keep_empty = cli.keep_empty;
        config.output.delimiter = cli.output_delimiter.unwrap_or(cli.delimiter);
        config.output.stats = cli.stats.then(|| cli.stats_format.clone());
        config
    }

    /// Loader configured for the input side
    pub fn loader(&self) -> CsvLoader {
        CsvLoader::new()
            .with_delimiter(self.input.delimiter)
            .with_na_values(self.input.na_values.iter())
            .with_keep_empty(self.input.keep_empty)
    }

    /// Writer configured for the output side; the output stays loadable
    /// with the same null markers
    pub fn writer(&self) -> CsvWriter {
        CsvWriter::new()
            .with_delimiter(self.output.delimiter)
            .with_na_values(self.input.na_values.iter())
    }
}
