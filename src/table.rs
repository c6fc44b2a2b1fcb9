use chrono::NaiveDate;
use indexmap::IndexMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{CleanError, Result};

/// Columns the cleaning pass reads or rewrites.
///
/// Any other header column is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    NaSales,
    PalSales,
    JpSales,
    OtherSales,
    TotalSales,
    ReleaseDate,
    LastUpdate,
    CriticScore,
    Developer,
    Publisher,
    Genre,
    Console,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::NaSales,
        Column::PalSales,
        Column::JpSales,
        Column::OtherSales,
        Column::TotalSales,
        Column::ReleaseDate,
        Column::LastUpdate,
        Column::CriticScore,
        Column::Developer,
        Column::Publisher,
        Column::Genre,
        Column::Console,
    ];

    /// The four additive regional sales columns, in summation order
    pub const REGIONAL_SALES: [Column; 4] = [
        Column::NaSales,
        Column::PalSales,
        Column::JpSales,
        Column::OtherSales,
    ];

    pub const SALES: [Column; 5] = [
        Column::NaSales,
        Column::PalSales,
        Column::JpSales,
        Column::OtherSales,
        Column::TotalSales,
    ];

    pub const DATES: [Column; 2] = [Column::ReleaseDate, Column::LastUpdate];

    pub fn name(self) -> &'static str {
        match self {
            Column::NaSales => "na_sales",
            Column::PalSales => "pal_sales",
            Column::JpSales => "jp_sales",
            Column::OtherSales => "other_sales",
            Column::TotalSales => "total_sales",
            Column::ReleaseDate => "release_date",
            Column::LastUpdate => "last_update",
            Column::CriticScore => "critic_score",
            Column::Developer => "developer",
            Column::Publisher => "publisher",
            Column::Genre => "genre",
            Column::Console => "console",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Positions of the required columns inside a header, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    positions: [usize; 12],
}

impl Schema {
    /// Resolve the required columns against a header row
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let mut lookup: IndexMap<&str, usize> = IndexMap::with_capacity(headers.len());
        let mut duplicated = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            if lookup.insert(header.as_str(), index).is_some() && !duplicated.contains(header) {
                duplicated.push(header.clone());
            }
        }

        let mut positions = [0usize; 12];
        let mut missing = Vec::new();
        for column in Column::ALL {
            match lookup.get(column.name()) {
                Some(&index) => positions[column.slot()] = index,
                None => missing.push(column.name().to_string()),
            }
        }

        // Duplicates only matter when they make a required column ambiguous
        duplicated.retain(|name| Column::ALL.iter().any(|c| c.name() == name.as_str()));

        if !missing.is_empty() || !duplicated.is_empty() {
            return Err(CleanError::Schema {
                missing,
                duplicated,
            });
        }

        Ok(Self { positions })
    }

    pub fn index(&self, column: Column) -> usize {
        self.positions[column.slot()]
    }
}

/// A single cell after loading or coercion
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Missing,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Wrap a float, mapping NaN to `Missing`
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Value::Missing
        } else {
            Value::Number(n)
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            _ => false,
        }
    }
}

// Numbers never hold NaN (see `Value::number`), so equality is reflexive.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Missing => {}
            Value::Text(s) => s.hash(state),
            Value::Number(n) => {
                // 0.0 and -0.0 compare equal and must hash equal
                let n = if *n == 0.0 { 0.0 } else { *n };
                n.to_bits().hash(state);
            }
            Value::Date(d) => d.hash(state),
        }
    }
}

/// Renders the cell the way it is written to the output file
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Date(d) => write!(f, "{}", d.format(DATE_OUTPUT_FORMAT)),
        }
    }
}

pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Decimal rendering with a trailing `.0` on integral values
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

/// One record; slots follow the table's header order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn set(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub fn take(&mut self, index: usize) -> Value {
        std::mem::take(&mut self.values[index])
    }
}

/// The in-memory record table handed from stage to stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from a header and rows, validating the schema and row widths
    pub fn from_rows(headers: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let schema = Schema::resolve(&headers)?;
        let width = headers.len();
        let mut rows = rows;
        for (index, row) in rows.iter_mut().enumerate() {
            if row.len() > width {
                return Err(CleanError::RowWidth {
                    row: index,
                    found: row.len(),
                    expected: width,
                });
            }
            row.values.resize(width, Value::Missing);
        }
        Ok(Self {
            headers,
            schema,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cell lookup by row number and required column
    pub fn value(&self, row: usize, column: Column) -> &Value {
        self.rows[row].get(self.schema.index(column))
    }

    /// Iterate one required column top to bottom
    pub fn column(&self, column: Column) -> impl Iterator<Item = &Value> + '_ {
        let index = self.schema.index(column);
        self.rows.iter().map(move |row| row.get(index))
    }

    /// Keep only rows matching the predicate, returning how many were removed
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Apply `f` to one column in every row
    pub fn map_column<F>(&mut self, column: Column, mut f: F)
    where
        F: FnMut(Value) -> Value,
    {
        let index = self.schema.index(column);
        for row in &mut self.rows {
            let value = row.take(index);
            row.set(index, f(value));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn standard_headers() -> Vec<String> {
        [
            "title",
            "console",
            "genre",
            "publisher",
            "developer",
            "critic_score",
            "total_sales",
            "na_sales",
            "jp_sales",
            "pal_sales",
            "other_sales",
            "release_date",
            "last_update",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_schema_resolves_positions() {
        let schema = Schema::resolve(&standard_headers()).unwrap();
        assert_eq!(schema.index(Column::Console), 1);
        assert_eq!(schema.index(Column::NaSales), 7);
        assert_eq!(schema.index(Column::LastUpdate), 12);
    }

    #[test]
    fn test_schema_reports_missing_columns() {
        let headers: Vec<String> = standard_headers()
            .into_iter()
            .filter(|h| h != "genre" && h != "jp_sales")
            .collect();
        match Schema::resolve(&headers) {
            Err(CleanError::Schema { missing, .. }) => {
                assert_eq!(missing, vec!["jp_sales".to_string(), "genre".to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_rejects_duplicated_required_column() {
        let mut headers = standard_headers();
        headers.push("genre".to_string());
        match Schema::resolve(&headers) {
            Err(CleanError::Schema { duplicated, .. }) => {
                assert_eq!(duplicated, vec!["genre".to_string()]);
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_ignores_duplicated_passthrough_column() {
        let mut headers = standard_headers();
        headers.push("title".to_string());
        assert!(Schema::resolve(&headers).is_ok());
    }

    #[test]
    fn test_value_equality_treats_signed_zero_alike() {
        use std::collections::hash_map::DefaultHasher;

        let a = Value::Number(0.0);
        let b = Value::Number(-0.0);
        assert_eq!(a, b);

        let hash = |v: &Value| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_value_number_maps_nan_to_missing() {
        assert!(Value::number(f64::NAN).is_missing());
        assert_eq!(Value::number(1.5), Value::Number(1.5));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Missing.to_string(), "");
        assert_eq!(Value::Number(3.0).to_string(), "3.0");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(0.1 + 0.2).to_string(), "0.30000000000000004");
        let date = NaiveDate::from_ymd_opt(2013, 9, 17).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2013-09-17");
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = Table::from_rows(
            standard_headers(),
            vec![Row::new(vec![Value::text("Tetris")])],
        )
        .unwrap();
        assert_eq!(table.rows()[0].len(), 13);
        assert!(table.value(0, Column::Genre).is_missing());
    }

    #[test]
    fn test_retain_counts_removed_rows() {
        let rows = (0..4)
            .map(|i| Row::new(vec![Value::text(format!("game {}", i))]))
            .collect();
        let mut table = Table::from_rows(standard_headers(), rows).unwrap();
        let removed = table.retain(|row| row.get(0) != &Value::text("game 2"));
        assert_eq!(removed, 1);
        assert_eq!(table.len(), 3);
    }
}
