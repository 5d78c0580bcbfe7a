//! Domain records: stored articles and index bars, and the refined output row.

pub mod article;
pub mod bar;
pub mod fields;
pub mod refined;

pub use article::{Article, ArticleSource};
pub use bar::IndexBar;
pub use fields::DecodeError;
pub use refined::RefinedRow;
