//! Search module: local relevance scoring, query classification, delegation
//! with fallback, and autocomplete suggestions.

pub mod classify;
pub mod engine;
pub mod keywords;
pub mod scorer;
pub mod suggest;
pub mod types;

pub use classify::{classify, is_sentence_like, QueryKind};
pub use engine::{SearchEngine, DEFAULT_DELEGATION_TIMEOUT};
pub use keywords::KeywordTable;
pub use scorer::{score, search_local};
pub use suggest::{suggest, DEFAULT_MAX_SUGGESTIONS};
pub use types::{RankedResult, SearchMode, SearchResults};
