// Trend aggregation: count canonical-topic occurrences per day.
//
// Every canonical topic seen in the input gets a row, and every row has a
// cell for every day in the window, zero or not. Occurrences dated outside
// the window are dropped; they are data outside the requested span, not
// errors.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::validate_window;
use crate::error::Result;

use super::window::TrendWindow;

/// One dated sighting of a canonical topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub canonical_topic: String,
    pub date: NaiveDate,
}

impl Occurrence {
    pub fn new(canonical_topic: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            canonical_topic: canonical_topic.into(),
            date,
        }
    }
}

impl<S: Into<String>> From<(S, NaiveDate)> for Occurrence {
    fn from((canonical_topic, date): (S, NaiveDate)) -> Self {
        Self::new(canonical_topic, date)
    }
}

/// Daily counts for one canonical topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendRow {
    pub canonical_topic: String,
    /// One entry per window day, ascending. Days without sightings hold 0.
    pub counts: BTreeMap<NaiveDate, u32>,
}

impl TrendRow {
    fn zeroed(canonical_topic: String, days: &[NaiveDate]) -> Self {
        Self {
            canonical_topic,
            counts: days.iter().map(|&d| (d, 0)).collect(),
        }
    }

    /// Sum across the window.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Count on `date`, or None if the date is outside the window.
    pub fn count_on(&self, date: NaiveDate) -> Option<u32> {
        self.counts.get(&date).copied()
    }
}

/// Canonical topic x day frequency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendTable {
    pub window: TrendWindow,
    /// Column headers, ascending.
    pub dates: Vec<NaiveDate>,
    /// Ordered by descending total, then canonical topic ascending.
    pub rows: Vec<TrendRow>,
}

impl TrendTable {
    pub fn row(&self, canonical_topic: &str) -> Option<&TrendRow> {
        self.rows.iter().find(|r| r.canonical_topic == canonical_topic)
    }

    /// Sum of all cells.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(TrendRow::total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds trend tables over a fixed trailing window.
#[derive(Debug, Clone, Copy)]
pub struct TrendAggregator {
    window_days: u32,
}

impl TrendAggregator {
    pub fn new(window_days: u32) -> Result<Self> {
        validate_window(window_days)?;
        Ok(Self { window_days })
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Count `occurrences` into a table covering [reference - window, reference].
    ///
    /// Empty input is fine: the table has no rows but still carries every
    /// date column.
    pub fn aggregate(&self, occurrences: &[Occurrence], reference: NaiveDate) -> Result<TrendTable> {
        let window = self.window(reference)?;
        Ok(self.aggregate_over(occurrences, window))
    }

    /// The window this aggregator covers when ending on `reference`.
    pub fn window(&self, reference: NaiveDate) -> Result<TrendWindow> {
        TrendWindow::new(reference, self.window_days)
    }

    /// Count `occurrences` into a table over an already-built window.
    pub fn aggregate_over(&self, occurrences: &[Occurrence], window: TrendWindow) -> TrendTable {
        let dates = window.days();

        let mut rows: HashMap<&str, TrendRow> = HashMap::new();
        let mut dropped = 0usize;

        for occ in occurrences {
            let row = rows
                .entry(occ.canonical_topic.as_str())
                .or_insert_with(|| TrendRow::zeroed(occ.canonical_topic.clone(), &dates));

            if window.contains(occ.date) {
                if let Some(cell) = row.counts.get_mut(&occ.date) {
                    *cell += 1;
                }
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!(
                dropped,
                start = %window.start,
                end = %window.end,
                "Dropped occurrences outside the trend window"
            );
        }

        let mut rows: Vec<TrendRow> = rows.into_values().collect();
        rows.sort_by(|a, b| {
            b.total()
                .cmp(&a.total())
                .then_with(|| a.canonical_topic.cmp(&b.canonical_topic))
        });

        info!(
            topics = rows.len(),
            days = dates.len(),
            "Built trend table: {} topics x {} days",
            rows.len(),
            dates.len()
        );

        TrendTable {
            window,
            dates,
            rows,
        }
    }
}

/// Aggregate with a one-off aggregator.
pub fn aggregate(
    occurrences: &[Occurrence],
    window_days: u32,
    reference: NaiveDate,
) -> Result<TrendTable> {
    TrendAggregator::new(window_days)?.aggregate(occurrences, reference)
}
