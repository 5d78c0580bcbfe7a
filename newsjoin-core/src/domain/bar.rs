//! IndexBar: one trading day of the tracked index.

use super::fields::{self, DecodeError};
use bson::{Bson, Document};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored field names, as the market-data provider spells them.
pub const FIELD_DATE: &str = "Date";
pub const FIELD_OPEN: &str = "Open";
pub const FIELD_HIGH: &str = "High";
pub const FIELD_LOW: &str = "Low";
pub const FIELD_CLOSE: &str = "Close";
pub const FIELD_VOLUME: &str = "Volume";
pub const FIELD_DIVIDENDS: &str = "Dividends";
pub const FIELD_STOCK_SPLITS: &str = "Stock Splits";

/// Daily OHLCV bar for the index, keyed by calendar date.
///
/// Every value is optional: stored records may lack `Dividends` or
/// `Stock Splits`, and gap-filled days start out with no values at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub dividends: Option<f64>,
    pub stock_splits: Option<f64>,
}

impl IndexBar {
    /// A bar for `date` with every value unset.
    pub fn unset(date: NaiveDate) -> Self {
        Self {
            date,
            ..Self::default()
        }
    }

    /// Returns true if no value is set.
    pub fn is_unset(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
            && self.dividends.is_none()
            && self.stock_splits.is_none()
    }

    /// Fill every unset value from `prev`, leaving set values alone.
    pub fn fill_from(&mut self, prev: &IndexBar) {
        self.open = self.open.or(prev.open);
        self.high = self.high.or(prev.high);
        self.low = self.low.or(prev.low);
        self.close = self.close.or(prev.close);
        self.volume = self.volume.or(prev.volume);
        self.dividends = self.dividends.or(prev.dividends);
        self.stock_splits = self.stock_splits.or(prev.stock_splits);
    }

    /// Decode a stored bar. `Date` is reduced to its UTC calendar date.
    pub fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        Ok(Self {
            date: fields::calendar_date(fields::timestamp(doc, FIELD_DATE)?),
            open: fields::opt_f64(doc, FIELD_OPEN)?,
            high: fields::opt_f64(doc, FIELD_HIGH)?,
            low: fields::opt_f64(doc, FIELD_LOW)?,
            close: fields::opt_f64(doc, FIELD_CLOSE)?,
            volume: fields::opt_i64(doc, FIELD_VOLUME)?,
            dividends: fields::opt_f64(doc, FIELD_DIVIDENDS)?,
            stock_splits: fields::opt_f64(doc, FIELD_STOCK_SPLITS)?,
        })
    }

    /// Encode as a flat record with the date promoted to a `Date` field
    /// (midnight UTC).
    pub fn to_document(&self) -> Document {
        let midnight = self
            .date
            .and_hms_opt(0, 0, 0)
            .map(|naive| bson::DateTime::from_chrono(naive.and_utc()))
            .map(Bson::DateTime)
            .unwrap_or(Bson::Null);

        let mut doc = Document::new();
        doc.insert(FIELD_DATE, midnight);
        doc.insert(FIELD_OPEN, fields::f64_or_null(self.open));
        doc.insert(FIELD_HIGH, fields::f64_or_null(self.high));
        doc.insert(FIELD_LOW, fields::f64_or_null(self.low));
        doc.insert(FIELD_CLOSE, fields::f64_or_null(self.close));
        doc.insert(FIELD_VOLUME, fields::i64_or_null(self.volume));
        doc.insert(FIELD_DIVIDENDS, fields::f64_or_null(self.dividends));
        doc.insert(FIELD_STOCK_SPLITS, fields::f64_or_null(self.stock_splits));
        doc
    }
}
