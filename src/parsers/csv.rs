use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{CleanError, Result};
use crate::table::{Row, Table, Value};

/// Cell contents read as missing unless overridden (the pandas defaults)
pub static DEFAULT_NA_VALUES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
        "#N/A N/A", "#NA", "<NA>", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
    ]
});

/// Delimited text loader producing an all-text `Table`.
///
/// Every cell is read as text or missing; typing happens later in the
/// coercion stage so a bad cell never fails the load.
pub struct CsvLoader {
    delimiter: u8,
    na_values: HashSet<String>,
    keep_empty: bool,
}

impl CsvLoader {
    /// Comma-separated loader with the default null markers
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            keep_empty: false,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the null-marker list
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Read empty cells as empty text instead of missing
    pub fn with_keep_empty(mut self, keep_empty: bool) -> Self {
        self.keep_empty = keep_empty;
        self
    }

    /// Load a table from a file on disk
    pub fn load_path(&self, path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => CleanError::SourceNotFound {
                path: path.to_path_buf(),
            },
            _ => CleanError::io(path, err),
        })?;
        self.load_reader(BufReader::new(file), path)
    }

    /// Load a table from any reader; `origin` is only used in error messages.
    ///
    /// Quoted fields are always text, so `""` and `"NA"` survive a
    /// write/load round trip.
    pub fn load_reader<R: Read>(&self, mut reader: R, origin: &Path) -> Result<Table> {
        let mut raw = Vec::new();
        reader
            .read_to_end(&mut raw)
            .map_err(|err| CleanError::io(origin, err))?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(raw.as_slice());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| csv_error(origin, err))?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
                h.trim().to_string()
            })
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(CleanError::parse(origin, Some(1), "missing header row"));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|err| csv_error(origin, err))?;
            if record.len() > width {
                let line = record.position().map(|p| p.line());
                return Err(CleanError::parse(
                    origin,
                    line,
                    format!("found {} fields, expected {}", record.len(), width),
                ));
            }

            // Quoting only matters for cells that would otherwise be missing
            let quoted = match record.position() {
                Some(pos) if record.iter().any(|field| self.is_null(field)) => {
                    let start = usize::try_from(pos.byte()).unwrap_or(usize::MAX);
                    quoted_fields(raw.get(start..).unwrap_or_default(), self.delimiter)
                }
                _ => Vec::new(),
            };

            let mut values: Vec<Value> = record
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    if quoted.get(i).copied().unwrap_or(false) {
                        Value::text(field)
                    } else {
                        self.cell_value(field)
                    }
                })
                .collect();
            values.resize(width, Value::Missing);
            rows.push(Row::new(values));
        }

        Table::from_rows(headers, rows)
    }

    fn is_null(&self, field: &str) -> bool {
        field.is_empty() || self.na_values.contains(field)
    }

    fn cell_value(&self, field: &str) -> Value {
        if field.is_empty() {
            if self.keep_empty {
                return Value::text("");
            }
            return Value::Missing;
        }
        if self.na_values.contains(field) {
            return Value::Missing;
        }
        Value::text(field)
    }
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Which fields of the record starting at `raw` were quoted.
///
/// Follows the csv reader's rules: a field is quoted when its first byte is
/// a quote, and `""` inside quotes is an escaped quote. Stops at the first
/// unquoted line break.
fn quoted_fields(raw: &[u8], delimiter: u8) -> Vec<bool> {
    let mut flags = Vec::new();
    let mut i = 0;
    loop {
        let quoted = raw.get(i) == Some(&b'"');
        flags.push(quoted);
        if quoted {
            i += 1;
            while i < raw.len() {
                if raw[i] == b'"' {
                    if raw.get(i + 1) == Some(&b'"') {
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
        }
        while i < raw.len() && raw[i] != delimiter && raw[i] != b'\n' && raw[i] != b'\r' {
            i += 1;
        }
        if raw.get(i) == Some(&delimiter) {
            i += 1;
        } else {
            return flags;
        }
    }
}

fn csv_error(origin: &Path, err: csv::Error) -> CleanError {
    let line = err.position().map(|p| p.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => CleanError::io(origin, source),
        _ => CleanError::parse(origin, line, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use std::io::Cursor;

    const HEADER: &str = "title,console,genre,publisher,developer,critic_score,total_sales,na_sales,jp_sales,pal_sales,other_sales,release_date,last_update";

    fn load(content: &str) -> Result<Table> {
        CsvLoader::new().load_reader(Cursor::new(content.to_string()), Path::new("test.csv"))
    }

    #[test]
    fn test_load_reads_text_cells() {
        let content = format!(
            "{}\nGrand Theft Auto V,PS3,Action,Rockstar Games,Rockstar North,9.4,20.32,6.37,0.99,9.85,3.12,2013-09-17,\n",
            HEADER
        );
        let table = load(&content).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.width(), 13);
        assert_eq!(table.value(0, Column::Console), &Value::text("PS3"));
        assert_eq!(table.value(0, Column::TotalSales), &Value::text("20.32"));
        assert!(table.value(0, Column::LastUpdate).is_missing());
    }

    #[test]
    fn test_load_treats_na_markers_as_missing() {
        let content = format!("{}\nTetris,GB,Puzzle,NA,null,,,1,2,3,4,N/A,\n", HEADER);
        let table = load(&content).unwrap();
        assert!(table.value(0, Column::Publisher).is_missing());
        assert!(table.value(0, Column::Developer).is_missing());
        assert!(table.value(0, Column::CriticScore).is_missing());
        assert!(table.value(0, Column::ReleaseDate).is_missing());
    }

    #[test]
    fn test_keep_empty_reads_empty_text() {
        let content = format!("{}\nTetris,GB,Puzzle,Nintendo,,,,1,2,3,4,,\n", HEADER);
        let table = CsvLoader::new()
            .with_keep_empty(true)
            .load_reader(Cursor::new(content), Path::new("test.csv"))
            .unwrap();
        assert_eq!(table.value(0, Column::Developer), &Value::text(""));
    }

    #[test]
    fn test_custom_na_values_replace_defaults() {
        let content = format!("{}\nTetris,GB,Puzzle,NA,-,,,1,2,3,4,,\n", HEADER);
        let table = CsvLoader::new()
            .with_na_values(["-"])
            .load_reader(Cursor::new(content), Path::new("test.csv"))
            .unwrap();
        assert_eq!(table.value(0, Column::Publisher), &Value::text("NA"));
        assert!(table.value(0, Column::Developer).is_missing());
    }

    #[test]
    fn test_short_rows_are_padded() {
        let content = format!("{}\nTetris,GB,Puzzle\n", HEADER);
        let table = load(&content).unwrap();
        assert!(table.value(0, Column::LastUpdate).is_missing());
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let content = format!("{}\nTetris,GB,Puzzle,a,b,1,2,3,4,5,6,7,8,extra\n", HEADER);
        match load(&content) {
            Err(CleanError::Parse { line, message, .. }) => {
                assert_eq!(line, Some(2));
                assert!(message.contains("expected 13"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_is_a_parse_error() {
        assert!(matches!(load(""), Err(CleanError::Parse { .. })));
    }

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = load(&format!("{}\n", HEADER)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_required_column_is_a_schema_error() {
        let content = "title,console\nTetris,GB\n";
        assert!(matches!(load(content), Err(CleanError::Schema { .. })));
    }

    #[test]
    fn test_header_bom_and_padding_are_stripped() {
        let content = format!("\u{feff}{}\n", HEADER.replace("console", " console "));
        let table = load(&content).unwrap();
        assert_eq!(table.headers()[0], "title");
        assert_eq!(table.headers()[1], "console");
    }

    #[test]
    fn test_quoted_fields() {
        let content = format!(
            "{}\n\"Ratchet, Clank\",PS2,Platform,\"Sony \"\"SCE\"\"\",Insomniac,8,1,1,0,0,0,,\n",
            HEADER
        );
        let table = load(&content).unwrap();
        assert_eq!(table.rows()[0].get(0), &Value::text("Ratchet, Clank"));
        assert_eq!(table.value(0, Column::Publisher), &Value::text("Sony \"SCE\""));
    }

    #[test]
    fn test_tab_delimiter() {
        let content = format!("{}\nTetris\tGB\tPuzzle\n", HEADER.replace(',', "\t"));
        let table = CsvLoader::new()
            .with_delimiter(b'\t')
            .load_reader(Cursor::new(content), Path::new("test.tsv"))
            .unwrap();
        assert_eq!(table.value(0, Column::Genre), &Value::text("Puzzle"));
    }

    #[test]
    fn test_quoted_empty_and_markers_stay_text() {
        let content = format!(
            "{}\nTetris,GB,Puzzle,\"None\",\"\",,,1,2,3,4,NA,\n",
            HEADER
        );
        let table = load(&content).unwrap();
        assert_eq!(table.value(0, Column::Publisher), &Value::text("None"));
        assert_eq!(table.value(0, Column::Developer), &Value::text(""));
        assert!(table.value(0, Column::CriticScore).is_missing());
        assert!(table.value(0, Column::ReleaseDate).is_missing());
    }

    #[test]
    fn test_quoted_fields_flags() {
        assert_eq!(quoted_fields(b"a,\"\",b\n", b','), vec![false, true, false]);
        assert_eq!(
            quoted_fields(b"\"x,\"\"y\"\"\",NA\r\nnext,\"q\"", b','),
            vec![true, false]
        );
        assert_eq!(quoted_fields(b"\"multi\nline\",\"NA\"", b','), vec![true, true]);
        assert_eq!(quoted_fields(b"", b';'), vec![false]);
        assert_eq!(quoted_fields(b"a;\"b\";", b';'), vec![false, true, false]);
    }

    #[test]
    fn test_invalid_utf8_record_is_a_parse_error() {
        let mut content = format!("{}\nTetris,GB,", HEADER).into_bytes();
        content.extend_from_slice(&[0xff, 0xfe]);
        content.extend_from_slice(b",Nintendo\n");
        let err = CsvLoader::new()
            .load_reader(content.as_slice(), Path::new("test.csv"))
            .unwrap_err();
        assert!(matches!(err, CleanError::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_invalid_utf8_header_is_a_parse_error() {
        let mut content = vec![0xff, 0xfe, b','];
        content.extend_from_slice(HEADER.as_bytes());
        content.push(b'\n');
        let err = CsvLoader::new()
            .load_reader(content.as_slice(), Path::new("test.csv"))
            .unwrap_err();
        assert!(matches!(err, CleanError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_source_not_found() {
        let err = CsvLoader::new()
            .load_path(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, CleanError::SourceNotFound { .. }));
    }
}
