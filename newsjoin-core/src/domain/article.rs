//! Article: a scraped news article as stored by the news collector.

use super::fields::{self, DecodeError};
use bson::{Bson, Document};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

/// Store-assigned identifier.
const FIELD_ID: &str = "_id";
/// Internal document version written by the collector's ODM.
const FIELD_VERSION: &str = "__v";

const FIELD_SOURCE: &str = "source";
const FIELD_AUTHOR: &str = "author";
const FIELD_TITLE: &str = "title";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_URL: &str = "url";
const FIELD_URL_TO_IMAGE: &str = "urlToImage";
const FIELD_PUBLISHED_AT: &str = "publishedAt";
const FIELD_CONTENT: &str = "content";

const KNOWN_FIELDS: &[&str] = &[
    FIELD_ID,
    FIELD_VERSION,
    FIELD_SOURCE,
    FIELD_AUTHOR,
    FIELD_TITLE,
    FIELD_DESCRIPTION,
    FIELD_URL,
    FIELD_URL_TO_IMAGE,
    FIELD_PUBLISHED_AT,
    FIELD_CONTENT,
];

/// The publisher an article came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    pub content: Option<String>,
    /// Stored fields the model does not name, in stored order. Excludes the
    /// store identifier and the version field.
    pub extra: Document,
}

impl Article {
    /// Publication date with time-of-day discarded.
    pub fn published_date(&self) -> NaiveDate {
        fields::calendar_date(self.published_at)
    }

    /// Decode a stored article.
    ///
    /// Only `publishedAt` is required. A known text field holding a
    /// non-text value is not an error: the value moves to `extra` under its
    /// output name and the field reads as `None`.
    pub fn from_document(doc: &Document) -> Result<Self, DecodeError> {
        let mut extra: Document = doc
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let source = match fields::opt_document(doc, FIELD_SOURCE) {
            Ok(Some(src)) => ArticleSource {
                id: lenient_text(src, "id", "source_id", &mut extra),
                name: lenient_text(src, "name", "source_name", &mut extra),
            },
            Ok(None) => ArticleSource::default(),
            Err(err) => {
                warn!(%err, "carrying article source as a passthrough column");
                if let Some(value) = doc.get(FIELD_SOURCE) {
                    stash(&mut extra, FIELD_SOURCE, value.clone());
                }
                ArticleSource::default()
            }
        };

        Ok(Self {
            source,
            author: lenient_text(doc, FIELD_AUTHOR, FIELD_AUTHOR, &mut extra),
            title: lenient_text(doc, FIELD_TITLE, FIELD_TITLE, &mut extra),
            description: lenient_text(doc, FIELD_DESCRIPTION, FIELD_DESCRIPTION, &mut extra),
            url: lenient_text(doc, FIELD_URL, FIELD_URL, &mut extra),
            url_to_image: lenient_text(doc, FIELD_URL_TO_IMAGE, "url_to_image", &mut extra),
            published_at: fields::timestamp(doc, FIELD_PUBLISHED_AT)?,
            content: lenient_text(doc, FIELD_CONTENT, FIELD_CONTENT, &mut extra),
            extra,
        })
    }
}

/// Text field of `doc`, or `None` with the raw value stashed in `extra`
/// under `column` when it is not text.
fn lenient_text(doc: &Document, field: &str, column: &str, extra: &mut Document) -> Option<String> {
    match fields::opt_str(doc, field) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, column, "carrying non-text article value as a passthrough column");
            if let Some(value) = doc.get(field) {
                stash(extra, column, value.clone());
            }
            None
        }
    }
}

/// Insert under `key`, appending `_x` until the key is free.
fn stash(extra: &mut Document, key: &str, value: Bson) {
    let mut key = key.to_string();
    while extra.contains_key(&key) {
        key.push_str("_x");
    }
    extra.insert(key, value);
}
