use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{CleanError, Result};
use crate::parsers::csv::DEFAULT_NA_VALUES;
use crate::table::{Row, Table, Value};

/// Check if a CSV value needs quoting
pub(crate) fn needs_csv_quoting(value: &str, delimiter: char) -> bool {
    value.is_empty()
        || value.contains(delimiter)
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r')
        || value.starts_with(' ')
        || value.ends_with(' ')
}

/// Escape CSV value with proper quoting
pub(crate) fn escape_csv_value(value: &str, delimiter: char) -> String {
    if needs_csv_quoting(value, delimiter) {
        let escaped = value.replace('"', "\"\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

/// Writes a table as delimited text with a header row.
///
/// Missing cells are bare empty fields. Text that the loader would read as
/// missing (empty, or equal to a null marker) is quoted.
pub struct CsvWriter {
    delimiter: char,
    na_values: HashSet<String>,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Null markers to protect with quotes
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Missing => String::new(),
            Value::Text(s) if self.na_values.contains(s.as_str()) => {
                format!("\"{}\"", s.replace('"', "\"\""))
            }
            other => escape_csv_value(&other.to_string(), self.delimiter),
        }
    }

    /// Format the header row
    pub fn format_header(&self, headers: &[String]) -> String {
        headers
            .iter()
            .map(|h| escape_csv_value(h, self.delimiter))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }

    /// Format a data row
    pub fn format_row(&self, row: &Row) -> String {
        row.values()
            .iter()
            .map(|value| self.format_value(value))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }

    /// Write header and rows to any writer
    pub fn write_table<W: Write>(&self, table: &Table, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", self.format_header(table.headers()))?;
        for row in table.rows() {
            writeln!(out, "{}", self.format_row(row))?;
        }
        out.flush()
    }

    /// Write the table to `path`, creating parent directories as needed.
    ///
    /// Rows go to a temporary file next to the destination which is then
    /// renamed into place, so a failure never leaves a partial file.
    pub fn write_path(&self, table: &Table, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|err| CleanError::io(dir, err))?;

        let temp = NamedTempFile::new_in(dir).map_err(|err| CleanError::io(dir, err))?;
        {
            let mut out = BufWriter::new(temp.as_file());
            self.write_table(table, &mut out)
                .map_err(|err| CleanError::io(path, err))?;
        }
        temp.persist(path)
            .map_err(|err| CleanError::io(path, err.error))?;
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
