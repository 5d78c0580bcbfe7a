//! Calendar alignment of the index series.
//!
//! News is published every calendar day; the index only trades on market
//! days. Gap-filling puts the index on a daily calendar so weekends and
//! holidays carry the last known market state.

use crate::domain::IndexBar;
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AlignError {
    #[error("no index data to align: the index collection is empty")]
    NoIndexData,
}

/// Gap-free daily index table.
#[derive(Debug, Clone)]
pub struct FilledIndex {
    /// One bar per calendar day from `first` to `last`, ascending.
    pub bars: Vec<IndexBar>,
    /// Number of days that had no bar before filling.
    pub introduced: usize,
}

impl FilledIndex {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Date → bar lookup for joining.
    pub fn by_date(&self) -> HashMap<NaiveDate, &IndexBar> {
        self.bars.iter().map(|b| (b.date, b)).collect()
    }
}

/// Put the bars on a gap-free daily calendar.
///
/// 1. Duplicate dates keep their first occurrence in input order.
/// 2. Every calendar day in `[min date, max date]` gets exactly one row.
/// 3. Unset values are forward-filled from the previous day in ascending
///    order, so introduced days copy the nearest earlier real bar.
pub fn fill_calendar_gaps(bars: &[IndexBar]) -> Result<FilledIndex, AlignError> {
    let mut first_seen: HashMap<NaiveDate, &IndexBar> = HashMap::with_capacity(bars.len());
    for bar in bars {
        first_seen.entry(bar.date).or_insert(bar);
    }

    let start = first_seen.keys().min().copied().ok_or(AlignError::NoIndexData)?;
    let end = first_seen.keys().max().copied().ok_or(AlignError::NoIndexData)?;

    let mut filled: Vec<IndexBar> = Vec::new();
    let mut introduced = 0;

    for date in start.iter_days().take_while(|d| *d <= end) {
        let mut bar = match first_seen.get(&date) {
            Some(real) => (*real).clone(),
            None => {
                introduced += 1;
                IndexBar::unset(date)
            }
        };
        if let Some(prev) = filled.last() {
            bar.fill_from(prev);
        }
        filled.push(bar);
    }

    Ok(FilledIndex {
        bars: filled,
        introduced,
    })
}
