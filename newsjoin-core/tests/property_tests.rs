//! Property tests for the alignment and join invariants.
//!
//! Uses proptest to verify:
//! 1. Gap-fill completeness: one row per calendar day over the input range
//! 2. Forward-fill correctness: filled days copy the nearest earlier real day
//! 3. Dedup stability: the first row wins for a duplicated date
//! 4. Join exactness: an article survives iff its date is in range, carrying
//!    that day's filled values, in input order

use bson::Document;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use newsjoin_core::data::fill_calendar_gaps;
use newsjoin_core::data::join::{merge, reshape};
use newsjoin_core::domain::{Article, ArticleSource, IndexBar};
use proptest::prelude::*;
use std::collections::HashMap;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn bar(offset: i64, close: f64) -> IndexBar {
    IndexBar {
        date: base() + Duration::days(offset),
        open: Some(close),
        high: Some(close + 1.0),
        low: Some(close - 1.0),
        close: Some(close),
        volume: Some(1_000),
        dividends: Some(0.0),
        stock_splits: Some(0.0),
    }
}

fn article(offset: i64, hour: u32, seq: usize) -> Article {
    let day = base() + Duration::days(offset);
    let published = day.and_hms_opt(hour, 30, 0).unwrap();
    Article {
        source: ArticleSource {
            id: None,
            name: Some("Wire".into()),
        },
        author: None,
        title: Some(format!("article-{seq}")),
        description: None,
        url: None,
        url_to_image: None,
        published_at: Utc.from_utc_datetime(&published),
        content: None,
        extra: Document::new(),
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

/// Bars at day offsets within two months, possibly duplicated and unsorted.
fn arb_bars() -> impl Strategy<Value = Vec<IndexBar>> {
    prop::collection::vec((0..60_i64, 1.0..500.0_f64), 1..40)
        .prop_map(|raw| raw.into_iter().map(|(o, c)| bar(o, c)).collect::<Vec<_>>())
}

fn arb_articles() -> impl Strategy<Value = Vec<Article>> {
    prop::collection::vec((-10..70_i64, 0..24_u32), 0..30).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(seq, (o, h))| article(o, h, seq))
            .collect::<Vec<_>>()
    })
}

/// First-seen close per date.
fn first_closes(bars: &[IndexBar]) -> HashMap<NaiveDate, f64> {
    let mut map = HashMap::new();
    for b in bars {
        if let Some(close) = b.close {
            map.entry(b.date).or_insert(close);
        }
    }
    map
}

// ── 1. Completeness ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_day_in_range_has_exactly_one_row(bars in arb_bars()) {
        let filled = fill_calendar_gaps(&bars).unwrap();
        let min = bars.iter().map(|b| b.date).min().unwrap();
        let max = bars.iter().map(|b| b.date).max().unwrap();

        prop_assert_eq!(filled.bars.len() as i64, (max - min).num_days() + 1);
        for (i, b) in filled.bars.iter().enumerate() {
            prop_assert_eq!(b.date, min + Duration::days(i as i64));
        }
    }
}

// ── 2. Forward-fill correctness ──────────────────────────────────────

proptest! {
    #[test]
    fn filled_days_copy_nearest_earlier_real_day(bars in arb_bars()) {
        let filled = fill_calendar_gaps(&bars).unwrap();
        let real = first_closes(&bars);

        for b in &filled.bars {
            let source_day = (0..)
                .map(|back| b.date - Duration::days(back))
                .find(|d| real.contains_key(d))
                .unwrap();
            prop_assert_eq!(b.close, Some(real[&source_day]));
            prop_assert_eq!(b.volume, Some(1_000));
        }
        prop_assert_eq!(filled.introduced, filled.bars.len() - real.len());
    }
}

// ── 3. Dedup stability ───────────────────────────────────────────────

proptest! {
    #[test]
    fn duplicated_date_keeps_first_row(
        bars in arb_bars(),
        offset in 0..60_i64,
        first in 1.0..500.0_f64,
        second in 1.0..500.0_f64,
    ) {
        let mut input = vec![bar(offset, first)];
        input.extend(bars.into_iter().filter(|b| b.date != base() + Duration::days(offset)));
        input.push(bar(offset, second));

        let filled = fill_calendar_gaps(&input).unwrap();
        let day = filled
            .bars
            .iter()
            .find(|b| b.date == base() + Duration::days(offset))
            .unwrap();
        prop_assert_eq!(day.close, Some(first));
    }
}

// ── 4. Join exactness ────────────────────────────────────────────────

proptest! {
    #[test]
    fn article_joins_iff_its_date_is_in_range(
        bars in arb_bars(),
        articles in arb_articles(),
    ) {
        let filled = fill_calendar_gaps(&bars).unwrap();
        let first = filled.first_date().unwrap();
        let last = filled.last_date().unwrap();
        let by_date = filled.by_date();

        let rows = reshape(&merge(&articles, &filled));
        let expected: Vec<&Article> = articles
            .iter()
            .filter(|a| (first..=last).contains(&a.published_date()))
            .collect();

        prop_assert_eq!(rows.len(), expected.len());
        for (row, article) in rows.iter().zip(expected) {
            prop_assert_eq!(&row.title, &article.title);
            prop_assert_eq!(row.date, article.published_date());
            prop_assert_eq!(row.close, by_date[&row.date].close);
            prop_assert_eq!(row.source_name.as_deref(), Some("Wire"));
        }
    }
}
