use serde::Serialize;
use std::time::{Duration, Instant};

/// Counters collected while cleaning one table.
///
/// Passed explicitly through the stages; the counts are observations
/// and never change what a stage does.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningStats {
    pub rows_loaded: usize,
    pub columns: usize,
    pub unparseable_cells: usize,
    pub rows_dropped_missing_total: usize,
    pub total_mismatches: usize,
    pub rows_dropped_negative_sales: usize,
    pub rows_dropped_invalid_score: usize,
    pub critic_score_median: Option<f64>,
    pub critic_scores_filled: usize,
    pub duplicates_removed: usize,
    pub rows_output: usize,
    #[serde(rename = "processing_time_ms", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
    #[serde(skip)]
    pub start_time: Option<Instant>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl CleaningStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn finish_processing(&mut self) {
        if let Some(start) = self.start_time {
            self.processing_time = start.elapsed();
        }
    }

    /// Rows removed by any stage
    pub fn rows_removed(&self) -> usize {
        self.rows_dropped_missing_total
            + self.rows_dropped_negative_sales
            + self.rows_dropped_invalid_score
            + self.duplicates_removed
    }

    pub fn format_stats(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Rows processed: {} total, {} output, {} removed",
            self.rows_loaded,
            self.rows_output,
            self.rows_removed()
        ));

        if self.rows_dropped_missing_total > 0 {
            output.push_str(&format!(
                "; {} without total_sales",
                self.rows_dropped_missing_total
            ));
        }
        if self.rows_dropped_negative_sales > 0 {
            output.push_str(&format!(
                "; {} with negative sales",
                self.rows_dropped_negative_sales
            ));
        }
        if self.rows_dropped_invalid_score > 0 {
            output.push_str(&format!(
                "; {} with negative or missing critic_score",
                self.rows_dropped_invalid_score
            ));
        }
        if self.duplicates_removed > 0 {
            output.push_str(&format!("; {} duplicates", self.duplicates_removed));
        }

        if self.unparseable_cells > 0 {
            output.push_str(&format!(
                "\nUnparseable cells read as missing: {}",
                self.unparseable_cells
            ));
        }

        output.push_str(&format!(
            "\nTotals recomputed: {} differed from the regional sum",
            self.total_mismatches
        ));

        match self.critic_score_median {
            Some(median) => output.push_str(&format!(
                "\nCritic score median: {} ({} filled)",
                median, self.critic_scores_filled
            )),
            None => output.push_str("\nCritic score median: none"),
        }

        output.push_str(&format!(
            "\nColumns: {}; finished in {}ms",
            self.columns,
            self.processing_time.as_millis()
        ));

        output
    }
}
