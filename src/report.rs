//! Table quality summary
//!
//! Shape, per-column missing counts and the kind of values each column
//! holds. Logged after coercion and printed with `--stats`.

use serde::Serialize;

use crate::table::{Table, Value};

/// What a column holds once missing cells are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Number,
    Date,
    Text,
    Mixed,
    Empty,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Missing => None,
            Value::Number(_) => Some(ColumnKind::Number),
            Value::Date(_) => Some(ColumnKind::Date),
            Value::Text(_) => Some(ColumnKind::Text),
        }
    }

    fn merge(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (ColumnKind::Empty, k) | (k, ColumnKind::Empty) => k,
            (a, b) if a == b => a,
            _ => ColumnKind::Mixed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
}

/// Shape and per-column summary of a table
#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_summaries: Vec<ColumnSummary>,
}

impl TableSummary {
    pub fn from_table(table: &Table) -> Self {
        let mut kinds = vec![ColumnKind::Empty; table.width()];
        let mut missing = vec![0usize; table.width()];

        for row in table.rows() {
            for (index, value) in row.values().iter().enumerate() {
                match ColumnKind::of(value) {
                    Some(kind) => kinds[index] = kinds[index].merge(kind),
                    None => missing[index] += 1,
                }
            }
        }

        let column_summaries = table
            .headers()
            .iter()
            .zip(kinds.into_iter().zip(missing))
            .map(|(name, (kind, missing))| ColumnSummary {
                name: name.clone(),
                kind,
                missing,
            })
            .collect();

        Self {
            rows: table.len(),
            columns: table.width(),
            column_summaries,
        }
    }

    /// Human-readable table, one column per line
    pub fn format(&self) -> String {
        let name_width = self
            .column_summaries
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("column".len());

        let mut output = format!("Shape: {} rows x {} columns\n", self.rows, self.columns);
        output.push_str(&format!(
            "{:<width$}  {:<6}  {:>7}\n",
            "column",
            "kind",
            "missing",
            width = name_width
        ));
        for column in &self.column_summaries {
            output.push_str(&format!(
                "{:<width$}  {:<6}  {:>7}\n",
                column.name,
                column.kind.as_str(),
                column.missing,
                width = name_width
            ));
        }
        output
    }
}
