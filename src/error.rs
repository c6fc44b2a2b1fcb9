use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of a cleaning run.
///
/// Cell-level coercion failures are never reported here; they become
/// missing values inside the table.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to parse {}{}: {message}", .path.display(), line_suffix(.line))]
    Parse {
        path: PathBuf,
        line: Option<u64>,
        message: String,
    },

    #[error("schema error: {}", describe_schema_problem(.missing, .duplicated))]
    Schema {
        missing: Vec<String>,
        duplicated: Vec<String>,
    },

    #[error("row {row} has {found} values but the header has {expected} columns")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CleanError>;

impl CleanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleanError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: Option<u64>, message: impl Into<String>) -> Self {
        CleanError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

fn describe_schema_problem(missing: &[String], duplicated: &[String]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing required columns: {}", missing.join(", ")));
    }
    if !duplicated.is_empty() {
        parts.push(format!("duplicated columns: {}", duplicated.join(", ")));
    }
    if parts.is_empty() {
        "invalid header".to_string()
    } else {
        parts.join("; ")
    }
}
