//! Article ⋈ index join: decode, align, merge and reshape.
//!
//! Everything here is pure: stored documents in, refined rows out. The job
//! layer does the store I/O around it.

use super::align::{fill_calendar_gaps, AlignError, FilledIndex};
use crate::domain::{Article, DecodeError, IndexBar, RefinedRow};
use bson::Document;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinError {
    #[error("article #{index} could not be decoded: {source}")]
    Article {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("index bar #{index} could not be decoded: {source}")]
    IndexBar {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Align(#[from] AlignError),
}

/// An article paired with the filled bar of its publication date.
#[derive(Debug, Clone, Copy)]
pub struct Joined<'a> {
    pub article: &'a Article,
    pub bar: &'a IndexBar,
}

/// Output of [`refine`]: rows plus the counts the job reports.
#[derive(Debug, Clone)]
pub struct Refined {
    pub rows: Vec<RefinedRow>,
    pub articles_read: usize,
    pub bars_read: usize,
    pub filled_days: usize,
    pub introduced_days: usize,
}

pub fn decode_articles(docs: &[Document]) -> Result<Vec<Article>, JoinError> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| {
            Article::from_document(doc).map_err(|source| JoinError::Article { index, source })
        })
        .collect()
}

pub fn decode_bars(docs: &[Document]) -> Result<Vec<IndexBar>, JoinError> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| {
            IndexBar::from_document(doc).map_err(|source| JoinError::IndexBar { index, source })
        })
        .collect()
}

/// Inner join on publication date = bar date.
///
/// Scans articles in their original order and emits each one whose date has a
/// filled bar; the rest are dropped.
pub fn merge<'a>(articles: &'a [Article], filled: &'a FilledIndex) -> Vec<Joined<'a>> {
    let by_date = filled.by_date();
    articles
        .iter()
        .filter_map(|article| {
            by_date
                .get(&article.published_date())
                .map(|bar| Joined { article, bar })
        })
        .collect()
}

/// Flatten and rename joined records into output rows.
pub fn reshape(joined: &[Joined<'_>]) -> Vec<RefinedRow> {
    joined
        .iter()
        .map(|j| RefinedRow::from_joined(j.article, j.bar))
        .collect()
}

/// Full transformation from stored documents to refined rows.
pub fn refine(article_docs: &[Document], bar_docs: &[Document]) -> Result<Refined, JoinError> {
    let articles = decode_articles(article_docs)?;
    let bars = decode_bars(bar_docs)?;
    let filled = fill_calendar_gaps(&bars)?;
    let joined = merge(&articles, &filled);
    let rows = reshape(&joined);

    Ok(Refined {
        rows,
        articles_read: articles.len(),
        bars_read: bars.len(),
        filled_days: filled.bars.len(),
        introduced_days: filled.introduced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId, Bson};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn bar_doc(y: i32, m: u32, d: u32, close: f64) -> Document {
        doc! {
            "_id": ObjectId::new(),
            "Date": bson::DateTime::from_chrono(Utc.with_ymd_and_hms(y, m, d, 5, 0, 0).unwrap()),
            "Open": close,
            "High": close,
            "Low": close,
            "Close": close,
            "Volume": 1000_i64,
            "Dividends": 0.0,
            "Stock Splits": 0.0,
        }
    }

    fn article_doc(title: &str, published: &str) -> Document {
        doc! {
            "_id": ObjectId::new(),
            "source": { "id": Bson::Null, "name": "Wire" },
            "title": title,
            "urlToImage": Bson::Null,
            "publishedAt": published,
            "__v": 0_i32,
        }
    }

    #[test]
    fn article_on_filled_day_joins_previous_close() {
        let bars = vec![bar_doc(2024, 1, 1, 100.0), bar_doc(2024, 1, 3, 102.0)];
        let articles = vec![article_doc("a", "2024-01-02T08:00:00")];

        let refined = refine(&articles, &bars).unwrap();
        assert_eq!(refined.rows.len(), 1);
        assert_eq!(refined.rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(refined.rows[0].close, Some(100.0));
        assert_eq!(refined.filled_days, 3);
        assert_eq!(refined.introduced_days, 1);
    }

    #[test]
    fn articles_outside_range_are_dropped_and_order_is_kept() {
        let bars = vec![bar_doc(2024, 1, 1, 100.0), bar_doc(2024, 1, 3, 102.0)];
        let articles = vec![
            article_doc("late", "2024-01-03T23:00:00Z"),
            article_doc("too-early", "2023-12-31T12:00:00Z"),
            article_doc("early", "2024-01-01T00:00:00Z"),
            article_doc("too-late", "2024-01-04T00:00:00Z"),
        ];

        let refined = refine(&articles, &bars).unwrap();
        let titles: Vec<&str> = refined
            .rows
            .iter()
            .map(|r| r.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, vec!["late", "early"]);
        assert_eq!(refined.articles_read, 4);
    }

    #[test]
    fn many_articles_can_share_a_day() {
        let bars = vec![bar_doc(2024, 1, 1, 100.0)];
        let articles = vec![
            article_doc("x", "2024-01-01T01:00:00Z"),
            article_doc("y", "2024-01-01T22:00:00Z"),
        ];
        let refined = refine(&articles, &bars).unwrap();
        assert_eq!(refined.rows.len(), 2);
        assert!(refined.rows.iter().all(|r| r.close == Some(100.0)));
    }

    #[test]
    fn empty_index_is_a_descriptive_error() {
        let articles = vec![article_doc("a", "2024-01-02T08:00:00Z")];
        let err = refine(&articles, &[]).unwrap_err();
        assert!(matches!(err, JoinError::Align(AlignError::NoIndexData)));
        assert!(err.to_string().contains("no index data"));
    }

    #[test]
    fn no_articles_yields_no_rows() {
        let refined = refine(&[], &[bar_doc(2024, 1, 1, 1.0)]).unwrap();
        assert!(refined.rows.is_empty());
    }

    #[test]
    fn bad_article_reports_its_position() {
        let mut broken = article_doc("b", "2024-01-01T00:00:00Z");
        broken.remove("publishedAt");
        let articles = vec![article_doc("a", "2024-01-01T00:00:00Z"), broken];
        let err = refine(&articles, &[bar_doc(2024, 1, 1, 1.0)]).unwrap_err();
        assert!(matches!(err, JoinError::Article { index: 1, .. }));
    }

    #[test]
    fn store_ids_and_version_do_not_reach_output() {
        let bars = vec![bar_doc(2024, 1, 1, 100.0)];
        let articles = vec![article_doc("a", "2024-01-01T09:00:00Z")];
        let refined = refine(&articles, &bars).unwrap();
        assert!(refined.rows[0].extra.is_empty());
        assert_eq!(refined.rows[0].source_id, None);
        assert_eq!(refined.rows[0].source_name.as_deref(), Some("Wire"));
    }
}
