//! Typed field access on stored documents.
//!
//! Stored records come from more than one writer, so scalar fields are read
//! leniently: numbers may be any BSON numeric type, timestamps may be BSON
//! datetimes or ISO-8601 strings, and null, missing or NaN values read as
//! `None`.

use bson::{Bson, Document};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}': expected {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field '{field}': unparseable timestamp '{value}'")]
    BadTimestamp { field: String, value: String },
}

fn wrong_type(field: &str, expected: &'static str, value: &Bson) -> DecodeError {
    DecodeError::WrongType {
        field: field.to_string(),
        expected,
        found: format!("{:?}", value.element_type()),
    }
}

/// Reduce a timestamp to its UTC calendar date.
pub fn calendar_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Optional string field.
pub fn opt_str(doc: &Document, field: &str) -> Result<Option<String>, DecodeError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(wrong_type(field, "string", other)),
    }
}

/// Optional float field. NaN reads as `None`.
pub fn opt_f64(doc: &Document, field: &str) -> Result<Option<f64>, DecodeError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Double(v)) if v.is_nan() => Ok(None),
        Some(Bson::Double(v)) => Ok(Some(*v)),
        Some(Bson::Int32(v)) => Ok(Some(f64::from(*v))),
        Some(Bson::Int64(v)) => Ok(Some(*v as f64)),
        Some(other) => Err(wrong_type(field, "number", other)),
    }
}

/// Optional integer field. Doubles are truncated; NaN reads as `None`.
pub fn opt_i64(doc: &Document, field: &str) -> Result<Option<i64>, DecodeError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Double(v)) if v.is_nan() => Ok(None),
        Some(Bson::Double(v)) => Ok(Some(*v as i64)),
        Some(Bson::Int32(v)) => Ok(Some(i64::from(*v))),
        Some(Bson::Int64(v)) => Ok(Some(*v)),
        Some(other) => Err(wrong_type(field, "number", other)),
    }
}

/// Required timestamp field.
pub fn timestamp(doc: &Document, field: &str) -> Result<DateTime<Utc>, DecodeError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Err(DecodeError::MissingField {
            field: field.to_string(),
        }),
        Some(Bson::DateTime(dt)) => Ok(dt.to_chrono()),
        Some(Bson::String(s)) => parse_timestamp(s).ok_or_else(|| DecodeError::BadTimestamp {
            field: field.to_string(),
            value: s.clone(),
        }),
        Some(other) => Err(wrong_type(field, "datetime", other)),
    }
}

/// Parse RFC 3339, a naive ISO-8601 datetime (taken as UTC), or a bare date.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Optional nested document.
pub fn opt_document<'a>(doc: &'a Document, field: &str) -> Result<Option<&'a Document>, DecodeError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Document(inner)) => Ok(Some(inner)),
        Some(other) => Err(wrong_type(field, "document", other)),
    }
}

/// Optional float written as BSON (`Null` for `None`).
pub fn f64_or_null(value: Option<f64>) -> Bson {
    value.map(Bson::Double).unwrap_or(Bson::Null)
}

/// Optional integer written as BSON (`Null` for `None`).
pub fn i64_or_null(value: Option<i64>) -> Bson {
    value.map(Bson::Int64).unwrap_or(Bson::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;

    #[test]
    fn numbers_read_leniently() {
        let d = doc! { "a": 1.5, "b": 2_i32, "c": 3_i64, "d": f64::NAN, "e": Bson::Null };
        assert_eq!(opt_f64(&d, "a").unwrap(), Some(1.5));
        assert_eq!(opt_f64(&d, "b").unwrap(), Some(2.0));
        assert_eq!(opt_f64(&d, "c").unwrap(), Some(3.0));
        assert_eq!(opt_f64(&d, "d").unwrap(), None);
        assert_eq!(opt_f64(&d, "e").unwrap(), None);
        assert_eq!(opt_f64(&d, "missing").unwrap(), None);
        assert_eq!(opt_i64(&d, "a").unwrap(), Some(1));
        assert_eq!(opt_i64(&d, "c").unwrap(), Some(3));
    }

    #[test]
    fn string_in_number_field_is_rejected() {
        let d = doc! { "Close": "abc" };
        let err = opt_f64(&d, "Close").unwrap_err();
        assert!(matches!(err, DecodeError::WrongType { ref field, .. } if field == "Close"));
    }

    #[test]
    fn timestamps_from_bson_and_strings() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();
        let d = doc! {
            "bson": bson::DateTime::from_chrono(expected),
            "rfc": "2024-01-02T08:00:00Z",
            "offset": "2024-01-02T09:00:00+01:00",
            "naive": "2024-01-02T08:00:00",
            "date": "2024-01-02",
            "junk": "yesterday",
        };
        assert_eq!(timestamp(&d, "bson").unwrap(), expected);
        assert_eq!(timestamp(&d, "rfc").unwrap(), expected);
        assert_eq!(timestamp(&d, "offset").unwrap(), expected);
        assert_eq!(timestamp(&d, "naive").unwrap(), expected);
        assert_eq!(
            calendar_date(timestamp(&d, "date").unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert!(matches!(
            timestamp(&d, "junk"),
            Err(DecodeError::BadTimestamp { .. })
        ));
        assert!(matches!(
            timestamp(&d, "missing"),
            Err(DecodeError::MissingField { .. })
        ));
    }

    #[test]
    fn calendar_date_drops_time_of_day() {
        let late = Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap();
        assert_eq!(calendar_date(late), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
