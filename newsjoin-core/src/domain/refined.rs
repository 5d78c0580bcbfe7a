//! RefinedRow: one article joined with the index values of its day.

use super::{Article, IndexBar};
use crate::schema::{self, Cell};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Output record of the join job. Column names and order are defined in
/// [`crate::schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinedRow {
    /// Row key: the shared calendar date of the article and the bar.
    pub date: NaiveDate,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub content: Option<String>,
    /// Passthrough article fields as relaxed extended JSON, keyed by output
    /// column name.
    pub extra: Vec<(String, serde_json::Value)>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
    pub dividends: Option<f64>,
    pub stock_splits: Option<f64>,
    pub source_id: Option<String>,
    pub source_name: Option<String>,
}

impl RefinedRow {
    /// Flatten and rename an article and its matching bar into an output row.
    ///
    /// The nested source becomes `source_id`/`source_name`; the store ids,
    /// the version field and the raw publication timestamp are dropped.
    pub fn from_joined(article: &Article, bar: &IndexBar) -> Self {
        let keys: Vec<&str> = article.extra.keys().map(String::as_str).collect();
        let extra = schema::passthrough_names(&keys)
            .into_iter()
            .zip(article.extra.values())
            .map(|(name, value)| (name, value.clone().into_relaxed_extjson()))
            .collect();

        Self {
            date: bar.date,
            author: article.author.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            url_to_image: article.url_to_image.clone(),
            content: article.content.clone(),
            extra,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            dividends: bar.dividends,
            stock_splits: bar.stock_splits,
            source_id: article.source.id.clone(),
            source_name: article.source.name.clone(),
        }
    }

    /// Values in [`schema::refined_schema`] order, given the batch's
    /// passthrough columns. Missing passthrough values are `None`.
    pub fn cells<'a>(&'a self, passthrough: &[String]) -> Vec<Cell<'a>> {
        let mut cells = vec![
            Cell::Date(self.date),
            Cell::Text(self.author.as_deref()),
            Cell::Text(self.title.as_deref()),
            Cell::Text(self.description.as_deref()),
            Cell::Text(self.url.as_deref()),
            Cell::Text(self.url_to_image.as_deref()),
            Cell::Text(self.content.as_deref()),
        ];
        cells.extend(passthrough.iter().map(|c| Cell::Json(self.extra_value(c))));
        cells.extend([
            Cell::Float64(self.open),
            Cell::Float64(self.high),
            Cell::Float64(self.low),
            Cell::Float64(self.close),
            Cell::Int64(self.volume),
            Cell::Float64(self.dividends),
            Cell::Float64(self.stock_splits),
            Cell::Text(self.source_id.as_deref()),
            Cell::Text(self.source_name.as_deref()),
        ]);
        cells
    }

    /// Passthrough value for `column`, if this row has one.
    pub fn extra_value(&self, column: &str) -> Option<&serde_json::Value> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}
