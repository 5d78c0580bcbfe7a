//! Output schema contract for the refined news table.
//!
//! Defines the exact column names, column types and column order that every
//! table sink (Postgres, Parquet, in-memory) writes. The row key `date` is
//! always the first column.
//!
//! Source field → output column:
//!
//! | source          | column         |
//! |-----------------|----------------|
//! | `Date`          | `date`         |
//! | `urlToImage`    | `url_to_image` |
//! | `Open`          | `open`         |
//! | `High`          | `high`         |
//! | `Low`           | `low`          |
//! | `Close`         | `close`        |
//! | `Volume`        | `volume`       |
//! | `Dividends`     | `dividends`    |
//! | `Stock Splits`  | `stock_splits` |
//! | `source.id`     | `source_id`    |
//! | `source.name`   | `source_name`  |
//!
//! Other article fields keep their names. Fields the article model does not
//! know about are carried as JSON columns between the article columns and the
//! index columns.

use crate::domain::RefinedRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column types a sink must be able to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaType {
    Date,
    Text,
    Float64,
    Int64,
    Json,
}

impl SchemaType {
    /// Postgres column type for this schema type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            SchemaType::Date => "DATE",
            SchemaType::Text => "TEXT",
            SchemaType::Float64 => "DOUBLE PRECISION",
            SchemaType::Int64 => "BIGINT",
            SchemaType::Json => "JSONB",
        }
    }
}

/// A single column of the refined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub dtype: SchemaType,
}

impl SchemaField {
    fn fixed(name: &'static str, dtype: SchemaType) -> Self {
        Self {
            name: name.to_string(),
            dtype,
        }
    }
}

/// One value of a refined row, borrowed from the row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Date(NaiveDate),
    Text(Option<&'a str>),
    Float64(Option<f64>),
    Int64(Option<i64>),
    Json(Option<&'a serde_json::Value>),
}

impl Cell<'_> {
    pub fn dtype(&self) -> SchemaType {
        match self {
            Cell::Date(_) => SchemaType::Date,
            Cell::Text(_) => SchemaType::Text,
            Cell::Float64(_) => SchemaType::Float64,
            Cell::Int64(_) => SchemaType::Int64,
            Cell::Json(_) => SchemaType::Json,
        }
    }
}

/// Row key of the refined table.
pub const ROW_KEY: &str = "date";

/// Article columns, in output order, after the row key.
pub const ARTICLE_COLUMNS: &[&str] = &[
    "author",
    "title",
    "description",
    "url",
    "url_to_image",
    "content",
];

/// Index-bar columns, in output order.
pub const INDEX_COLUMNS: &[(&str, SchemaType)] = &[
    ("open", SchemaType::Float64),
    ("high", SchemaType::Float64),
    ("low", SchemaType::Float64),
    ("close", SchemaType::Float64),
    ("volume", SchemaType::Int64),
    ("dividends", SchemaType::Float64),
    ("stock_splits", SchemaType::Float64),
];

/// Flattened source columns, last in output order.
pub const SOURCE_COLUMNS: &[&str] = &["source_id", "source_name"];

/// Returns true if `name` is one of the fixed output columns.
pub fn is_fixed_column(name: &str) -> bool {
    name == ROW_KEY
        || ARTICLE_COLUMNS.contains(&name)
        || INDEX_COLUMNS.iter().any(|(c, _)| *c == name)
        || SOURCE_COLUMNS.contains(&name)
}

/// Output names for one article's passthrough fields, in the given order.
///
/// A name that collides with a fixed column, with another passthrough field
/// of the same article, or with a name already handed out gets `_x`
/// appended until it is unique, so every value keeps its own column.
pub fn passthrough_names(fields: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(fields.len());
    for &field in fields {
        let mut name = field.to_string();
        while is_fixed_column(&name)
            || (name != field && fields.contains(&name.as_str()))
            || names.contains(&name)
        {
            name.push_str("_x");
        }
        names.push(name);
    }
    names
}

/// Full column list for a batch of rows.
///
/// Passthrough columns are the union of every row's passthrough fields, in
/// first-seen order.
pub fn refined_schema(rows: &[RefinedRow]) -> Vec<SchemaField> {
    let mut fields = vec![SchemaField::fixed(ROW_KEY, SchemaType::Date)];
    fields.extend(
        ARTICLE_COLUMNS
            .iter()
            .map(|&name| SchemaField::fixed(name, SchemaType::Text)),
    );

    for name in passthrough_columns(rows) {
        fields.push(SchemaField {
            name,
            dtype: SchemaType::Json,
        });
    }

    fields.extend(
        INDEX_COLUMNS
            .iter()
            .map(|&(name, dtype)| SchemaField::fixed(name, dtype)),
    );
    fields.extend(
        SOURCE_COLUMNS
            .iter()
            .map(|&name| SchemaField::fixed(name, SchemaType::Text)),
    );
    fields
}

/// Passthrough column names across `rows`, first-seen order, no duplicates.
pub fn passthrough_columns(rows: &[RefinedRow]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        for (name, _) in &row.extra {
            if !names.iter().any(|n| n == name) {
                names.push(name.clone());
            }
        }
    }
    names
}
