use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::trace;

/// Adaptive date parser that moves successful formats to the front.
///
/// Date columns in one file almost always share a single layout, so after
/// the first hit every following cell is matched on the first try.
pub struct AdaptiveDateParser {
    /// Format list with successful formats moved to front
    formats: Vec<DateFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateFormat {
    /// Calendar date only
    Date(&'static str),
    /// Date and time of day without offset
    DateTime(&'static str),
    /// Date and time with an explicit offset
    Zoned(&'static str),
}

impl DateFormat {
    fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Date(p) | DateFormat::DateTime(p) | DateFormat::Zoned(p) => p,
        }
    }

    fn parse(&self, s: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::Date(fmt) => NaiveDate::parse_from_str(s, fmt).ok(),
            DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.date()),
            // Keep the calendar date as written, in its own offset
            DateFormat::Zoned(fmt) => DateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.date_naive()),
        }
    }
}

impl AdaptiveDateParser {
    pub fn new() -> Self {
        Self {
            formats: initial_date_formats(),
        }
    }

    /// Parse a cell into a calendar date, `None` when no format matches
    pub fn parse_date(&mut self, raw: &str) -> Option<NaiveDate> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        // RFC 3339 covers most ISO 8601 timestamps with offsets
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }

        self.try_formats_with_reordering(s)
    }

    fn try_formats_with_reordering(&mut self, s: &str) -> Option<NaiveDate> {
        for (index, format) in self.formats.iter().enumerate() {
            if let Some(date) = format.parse(s) {
                if index > 0 {
                    let successful = self.formats.remove(index);
                    trace!(format = successful.pattern(), "date format moved to front");
                    self.formats.insert(0, successful);
                }
                return Some(date);
            }
        }

        None
    }
}

impl Default for AdaptiveDateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial list of accepted layouts, most common first.
/// Slash dates are read month first, as in US-style exports.
fn initial_date_formats() -> Vec<DateFormat> {
    vec![
        DateFormat::Date("%Y-%m-%d"),
        DateFormat::DateTime("%Y-%m-%d %H:%M:%S"),
        DateFormat::DateTime("%Y-%m-%d %H:%M:%S%.f"),
        DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"),
        DateFormat::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
        DateFormat::DateTime("%Y-%m-%d %H:%M"),
        DateFormat::Zoned("%Y-%m-%d %H:%M:%S%z"),
        DateFormat::Zoned("%Y-%m-%d %H:%M:%S%.f%z"),
        DateFormat::Date("%Y/%m/%d"),
        DateFormat::DateTime("%Y/%m/%d %H:%M:%S"),
        DateFormat::Date("%m/%d/%Y"),
        DateFormat::DateTime("%m/%d/%Y %H:%M:%S"),
        DateFormat::Date("%d.%m.%Y"),
        DateFormat::Date("%Y%m%d"),
        DateFormat::Date("%B %d, %Y"),
        DateFormat::Date("%b %d, %Y"),
        DateFormat::Date("%d %B %Y"),
        DateFormat::Date("%d %b %Y"),
    ]
}
