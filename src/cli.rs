// CLI-specific types and structures
// This module contains the command-line interface definitions and parsing logic

use clap::Parser;
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum StatsFormat {
    #[default]
    Table,
    Json,
}

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "vgclean")]
#[command(about = "Clean a video game sales table in one pass")]
#[command(
    long_about = "Clean a video game sales table in one pass\n\nSTAGES:\n  1. coerce sales, critic_score and date columns (bad cells become missing)\n  2. drop rows without total_sales, fill developer/publisher, critic_score and regional sales\n  3. recompute total_sales from the regional columns, drop negative rows\n  4. drop exact duplicate rows\n  5. trim and re-case genre, console, publisher and developer\n\nEXAMPLE:\n  vgclean data/raw/vgchartz.csv data/clean/vgchartz.csv --stats"
)]
#[command(version)]
pub struct Cli {
    /// Raw delimited file with a header row
    pub source: PathBuf,

    /// Where to write the cleaned file (parent directories are created)
    pub destination: PathBuf,

    /// Field delimiter of the source file
    #[arg(
        short = 'd',
        long = "delimiter",
        default_value = ",",
        value_parser = parse_delimiter,
        help_heading = "Input Options"
    )]
    pub delimiter: char,

    /// Cell value read as missing; repeat to build a list that replaces the defaults
    #[arg(long = "na-value", help_heading = "Input Options")]
    pub na_values: Vec<String>,

    /// Read empty cells as empty text instead of missing values
    #[arg(long = "keep-empty", help_heading = "Input Options")]
    pub keep_empty: bool,

    /// Field delimiter of the output file (defaults to the input delimiter)
    #[arg(
        long = "output-delimiter",
        value_parser = parse_delimiter,
        help_heading = "Output Options"
    )]
    pub output_delimiter: Option<char>,

    /// Print a cleaning summary to stderr when done
    #[arg(short = 's', long = "stats", help_heading = "Output Options")]
    pub stats: bool,

    /// Format of the --stats summary
    #[arg(
        long = "stats-format",
        value_enum,
        default_value = "table",
        help_heading = "Output Options"
    )]
    pub stats_format: StatsFormat,

    /// Only log warnings and errors
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help_heading = "Logging Options"
    )]
    pub quiet: bool,

    /// Log per-stage details and column summaries
    #[arg(short = 'v', long = "verbose", help_heading = "Logging Options")]
    pub verbose: bool,
}

/// Accept a single character, or `\t` / `tab` for tab
fn parse_delimiter(s: &str) -> Result<char, String> {
    match s {
        "\\t" | "tab" => return Ok('\t'),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c),
        (Some(_), None) => Err(format!("unsupported delimiter '{}'", s)),
        _ => Err(format!("delimiter must be a single character, got '{}'", s)),
    }
}
