use std::collections::HashSet;
use tracing::{debug, info};

use super::{Stage, UNKNOWN_SENTINEL};
use crate::parsers::type_conversion::{convert_value_to_type, FieldType};
use crate::report::TableSummary;
use crate::stats::CleaningStats;
use crate::table::{Column, Table, Value};
use crate::timestamp::AdaptiveDateParser;

/// Best-effort typing of the sales, score and date columns
pub struct CoerceTypesStage {
    dates: AdaptiveDateParser,
}

impl CoerceTypesStage {
    pub fn new() -> Self {
        Self {
            dates: AdaptiveDateParser::new(),
        }
    }

    fn targets() -> impl Iterator<Item = (Column, FieldType)> {
        Column::SALES
            .into_iter()
            .map(|c| (c, FieldType::Number))
            .chain(Column::DATES.into_iter().map(|c| (c, FieldType::Date)))
            .chain(std::iter::once((Column::CriticScore, FieldType::Number)))
    }
}

impl Default for CoerceTypesStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for CoerceTypesStage {
    fn name(&self) -> &'static str {
        "coerce_types"
    }

    fn apply(&mut self, table: Table, stats: &mut CleaningStats) -> Table {
        let mut table = table;
        let dates = &mut self.dates;
        let mut unparseable = 0;

        for (column, field_type) in Self::targets() {
            table.map_column(column, |value| {
                let was_present = !value.is_missing();
                let converted = convert_value_to_type(value, field_type, dates);
                if was_present && converted.is_missing() {
                    unparseable += 1;
                }
                converted
            });
        }

        stats.unparseable_cells += unparseable;
        if unparseable > 0 {
            info!(cells = unparseable, "unparseable cells read as missing");
        }
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                "column kinds after coercion:\n{}",
                TableSummary::from_table(&table).format()
            );
        }
        table
    }
}

/// Drops rows without a total, then fills the remaining gaps
pub struct NullHandlingStage;

impl Stage for NullHandlingStage {
    fn name(&self) -> &'static str {
        "null_handling"
    }

    fn apply(&mut self, table: Table, stats: &mut CleaningStats) -> Table {
        let mut table = table;

        let total = table.schema().index(Column::TotalSales);
        let dropped = table.retain(|row| !row.get(total).is_missing());
        stats.rows_dropped_missing_total += dropped;
        info!(dropped, remaining = table.len(), "dropped rows without total_sales");

        for column in [Column::Developer, Column::Publisher] {
            table.map_column(column, |value| {
                if value.is_missing() {
                    Value::text(UNKNOWN_SENTINEL)
                } else {
                    value
                }
            });
        }

        // Median of the scores that survived the row drop above
        let scores: Vec<f64> = table
            .column(Column::CriticScore)
            .filter_map(Value::as_number)
            .collect();
        let median = median(scores);
        stats.critic_score_median = median;
        if let Some(median) = median {
            let mut filled = 0;
            table.map_column(Column::CriticScore, |value| {
                if value.is_missing() {
                    filled += 1;
                    Value::Number(median)
                } else {
                    value
                }
            });
            stats.critic_scores_filled += filled;
            debug!(median, filled, "filled missing critic_score with median");
        }

        for column in Column::REGIONAL_SALES {
            table.map_column(column, |value| {
                if value.is_missing() {
                    Value::Number(0.0)
                } else {
                    value
                }
            });
        }

        table
    }
}

/// Median of a set of numbers, `None` when the set is empty
pub fn median(values: Vec<f64>) -> Option<f64> {
    let mut values = values;
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

/// Replaces `total_sales` with the regional sum and drops negative rows
pub struct ConsistencyStage;

impl ConsistencyStage {
    fn is_non_negative(value: &Value) -> bool {
        value.as_number().is_some_and(|n| n >= 0.0)
    }
}

impl Stage for ConsistencyStage {
    fn name(&self) -> &'static str {
        "consistency"
    }

    fn apply(&mut self, table: Table, stats: &mut CleaningStats) -> Table {
        let mut table = table;
        let schema = table.schema().clone();
        let regional = Column::REGIONAL_SALES.map(|c| schema.index(c));
        let total = schema.index(Column::TotalSales);

        let mut mismatches = 0;
        for row in table.rows_mut() {
            let derived = regional
                .iter()
                .try_fold(0.0, |sum, &i| row.get(i).as_number().map(|n| sum + n));
            let differs = match (row.get(total).as_number(), derived) {
                (Some(stored), Some(derived)) => stored != derived,
                _ => true,
            };
            if differs {
                mismatches += 1;
            }
            // The regional components win even where they already agree
            row.set(total, derived.map(Value::number).unwrap_or_default());
        }
        stats.total_mismatches += mismatches;
        info!(rows = mismatches, "total_sales differed from the regional sum");

        let sales = Column::SALES.map(|c| schema.index(c));
        let dropped_sales =
            table.retain(|row| sales.iter().all(|&i| Self::is_non_negative(row.get(i))));
        stats.rows_dropped_negative_sales += dropped_sales;

        let score = schema.index(Column::CriticScore);
        let dropped_score = table.retain(|row| Self::is_non_negative(row.get(score)));
        stats.rows_dropped_invalid_score += dropped_score;

        info!(
            negative_sales = dropped_sales,
            invalid_score = dropped_score,
            remaining = table.len(),
            "dropped inconsistent rows"
        );
        table
    }
}

/// Removes rows identical to an earlier row in every column
pub struct DeduplicateStage;

impl Stage for DeduplicateStage {
    fn name(&self) -> &'static str {
        "deduplicate"
    }

    fn apply(&mut self, table: Table, stats: &mut CleaningStats) -> Table {
        let mut table = table;
        let keep: Vec<bool> = {
            let mut seen = HashSet::with_capacity(table.len());
            table.rows().iter().map(|row| seen.insert(row)).collect()
        };

        let mut flags = keep.into_iter();
        let removed = table.retain(|_| flags.next().unwrap_or(true));
        stats.duplicates_removed += removed;
        info!(removed, remaining = table.len(), "removed duplicate rows");
        table
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseRule {
    Lower,
    Upper,
    Title,
}

impl CaseRule {
    pub fn apply(&self, s: &str) -> String {
        match self {
            CaseRule::Lower => s.to_lowercase(),
            CaseRule::Upper => s.to_uppercase(),
            CaseRule::Title => title_case(s),
        }
    }
}

/// Trims and re-cases the categorical columns
pub struct NormalizeCategoriesStage;

impl NormalizeCategoriesStage {
    pub const RULES: [(Column, CaseRule); 4] = [
        (Column::Genre, CaseRule::Lower),
        (Column::Console, CaseRule::Upper),
        (Column::Publisher, CaseRule::Title),
        (Column::Developer, CaseRule::Title),
    ];

    /// Non-text cells are rendered first; a missing cell renders as ""
    fn normalize(value: Value, rule: CaseRule) -> Value {
        let text = match value {
            Value::Text(s) => s,
            other => other.to_string(),
        };
        Value::Text(rule.apply(text.trim()))
    }
}

impl Stage for NormalizeCategoriesStage {
    fn name(&self) -> &'static str {
        "normalize_categories"
    }

    fn apply(&mut self, table: Table, _stats: &mut CleaningStats) -> Table {
        let mut table = table;
        for (column, rule) in Self::RULES {
            table.map_column(column, |value| Self::normalize(value, rule));
        }
        table
    }
}

/// Title-case like Python's `str.title`: a letter is upper-cased when the
/// character before it is not a cased letter, lower-cased otherwise.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_cased = false;
    for c in s.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}
