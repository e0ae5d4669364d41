//! Result types shared by the scorer, the engine and the HTTP layer.

use crate::catalog::ToolRecord;
use serde::Serialize;

/// A catalog record paired with its local relevance score.
///
/// `relevance` is `None` for result sets that are not ranked: the show-all
/// listing and delegated answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    pub record: ToolRecord,
    pub relevance: Option<u32>,
}

impl RankedResult {
    pub fn scored(record: ToolRecord, relevance: u32) -> Self {
        Self {
            record,
            relevance: Some(relevance),
        }
    }

    pub fn unranked(record: ToolRecord) -> Self {
        Self {
            record,
            relevance: None,
        }
    }
}

/// Which path produced a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Blank query, full catalog, unsorted.
    All,
    /// Local scoring, descending relevance.
    Ranked,
    /// Names picked by the delegate, in catalog order.
    Delegated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub mode: SearchMode,
    pub results: Vec<RankedResult>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// A real search ran and nothing matched. Never true for the show-all
    /// listing, even over an empty catalog.
    pub fn is_no_match(&self) -> bool {
        self.mode != SearchMode::All && self.results.is_empty()
    }

    /// Record names in result order.
    pub fn names(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.record.name.as_str())
            .collect()
    }
}
