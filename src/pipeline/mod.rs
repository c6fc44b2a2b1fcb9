use tracing::debug;

use crate::stats::CleaningStats;
use crate::table::Table;

pub mod stages;

pub use stages::*;

/// Placeholder written into missing developer and publisher cells
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// One step of the cleaning pass.
///
/// A stage consumes the previous table state and hands back the next one.
/// Stages never fail: cell-level problems become missing values or
/// dropped rows, and are recorded in `stats`.
pub trait Stage {
    fn name(&self) -> &'static str;
    fn apply(&mut self, table: Table, stats: &mut CleaningStats) -> Table;
}

/// Ordered list of stages applied to an in-memory table
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// The fixed cleaning order: coercion, nulls, totals, dedup, categories
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Box::new(CoerceTypesStage::new()),
                Box::new(NullHandlingStage),
                Box::new(ConsistencyStage),
                Box::new(DeduplicateStage),
                Box::new(NormalizeCategoriesStage),
            ],
        }
    }

    pub fn from_stages(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order
    pub fn run(&mut self, table: Table, stats: &mut CleaningStats) -> Table {
        let mut table = table;
        for stage in &mut self.stages {
            let before = table.len();
            table = stage.apply(table, stats);
            debug!(
                stage = stage.name(),
                rows_in = before,
                rows_out = table.len(),
                "stage finished"
            );
        }
        table
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}
