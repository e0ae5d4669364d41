//! Autocomplete suggestions. Purely local, unranked, never delegates.

use crate::catalog::ToolRecord;
use std::collections::HashSet;

/// Default number of suggestions returned.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Queries at least this long skip description matching.
const DESCRIPTION_QUERY_LIMIT: usize = 20;

/// Suggest record names for a partially typed query.
///
/// Names containing the query come first, then (for queries shorter than 20
/// characters) names of records whose description contains it. Duplicates are
/// dropped keeping the first occurrence; at most `limit` names are returned.
pub fn suggest(query: &str, catalog: &[ToolRecord], limit: usize) -> Vec<String> {
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let q = query.to_lowercase();

    let by_name = catalog
        .iter()
        .filter(|tool| tool.name.to_lowercase().contains(&q));

    let by_description = catalog
        .iter()
        .filter(|_| query.chars().count() < DESCRIPTION_QUERY_LIMIT)
        .filter(|tool| tool.description.to_lowercase().contains(&q));

    let mut seen = HashSet::new();
    by_name
        .chain(by_description)
        .map(|tool| tool.name.as_str())
        .filter(|name| seen.insert(*name))
        .take(limit)
        .map(str::to_string)
        .collect()
}
