// The trailing date window a trend table covers.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::config::validate_window;
use crate::error::{Result, TrendError};

/// Closed calendar-day range [reference - window_days, reference].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TrendWindow {
    pub fn new(reference: NaiveDate, window_days: u32) -> Result<Self> {
        validate_window(window_days)?;
        let start = reference
            .checked_sub_days(Days::new(u64::from(window_days)))
            .ok_or_else(|| {
                TrendError::config(format!(
                    "window of {window_days} days before {reference} is out of the calendar range"
                ))
            })?;
        Ok(Self {
            start,
            end: reference,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the window, ascending.
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    /// Number of columns the window produces (window_days + 1).
    pub fn day_count(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}
