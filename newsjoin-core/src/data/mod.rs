//! Market data: provider, calendar alignment, and the article join.

pub mod align;
pub mod join;
pub mod provider;
pub mod yahoo;

pub use align::{fill_calendar_gaps, AlignError, FilledIndex};
pub use join::{refine, JoinError, Refined};
pub use provider::{DataError, FetchResult, MarketDataProvider};
pub use yahoo::YahooProvider;
