//! Local relevance scoring.
//!
//! Additive substring heuristic over name, description and keywords:
//!
//! | signal                                             | score |
//! |----------------------------------------------------|-------|
//! | name contains the whole query                      | +10   |
//! | description contains the whole query               | +8    |
//! | related word of a triggered expansion entry found  | +5    |
//! | query token longer than 2 chars found              | +3    |
//!
//! Increments are uncapped and never normalized.

use crate::catalog::ToolRecord;
use crate::search::keywords::KeywordTable;
use crate::search::types::RankedResult;

const NAME_MATCH: u32 = 10;
const DESCRIPTION_MATCH: u32 = 8;
const EXPANSION_MATCH: u32 = 5;
const TOKEN_MATCH: u32 = 3;

/// Tokens must be longer than this many characters to count.
const MIN_TOKEN_CHARS: usize = 2;

/// Lowercased view of the matchable fields of one record.
struct Haystack {
    name: String,
    description: String,
    keywords: Vec<String>,
}

impl Haystack {
    fn new(record: &ToolRecord) -> Self {
        Self {
            name: record.name.to_lowercase(),
            description: record.description.to_lowercase(),
            keywords: record.keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.name.contains(needle)
            || self.description.contains(needle)
            || self.keywords.iter().any(|k| k.contains(needle))
    }
}

/// Score one record against a query. Blank queries score 0.
pub fn score(query: &str, record: &ToolRecord, table: &KeywordTable) -> u32 {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return 0;
    }
    score_lowered(&q, &Haystack::new(record), table)
}

fn score_lowered(q: &str, hay: &Haystack, table: &KeywordTable) -> u32 {
    let mut total = 0;

    if hay.name.contains(q) {
        total += NAME_MATCH;
    }
    if hay.description.contains(q) {
        total += DESCRIPTION_MATCH;
    }

    for related in table.triggered(q) {
        for word in related {
            if hay.contains(word) {
                total += EXPANSION_MATCH;
            }
        }
    }

    for token in q.split_whitespace() {
        if token.chars().count() > MIN_TOKEN_CHARS && hay.contains(token) {
            total += TOKEN_MATCH;
        }
    }

    total
}

/// Score every record and keep those with a positive score, best first.
///
/// Ties keep catalog order (`sort_by` is stable).
pub fn search_local(
    query: &str,
    catalog: &[ToolRecord],
    table: &KeywordTable,
) -> Vec<RankedResult> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<RankedResult> = catalog
        .iter()
        .filter_map(|record| {
            let relevance = score_lowered(&q, &Haystack::new(record), table);
            (relevance > 0).then(|| RankedResult::scored(record.clone(), relevance))
        })
        .collect();

    scored.sort_by(|a, b| b.relevance.cmp(&a.relevance));

    tracing::trace!(
        query = %q,
        matched = scored.len(),
        total = catalog.len(),
        "Local scoring complete"
    );

    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<ToolRecord> {
        vec![
            ToolRecord::new("MCStacker", "Generate custom commands for Minecraft"),
            ToolRecord::new("Chunkbase", "Find structures and biomes from a world seed"),
            ToolRecord::new("Minecraft Wiki", "Vanilla information and guides"),
            ToolRecord::new("Plotz", "Sphere and ellipsoid shape generator"),
        ]
    }

    #[test]
    fn test_direct_name_and_description_match() {
        let table = KeywordTable::empty();
        let record = ToolRecord::new("Map Maker", "Turns a map image into blocks");

        // name +10, description +8, token "map" +3
        assert_eq!(score("map", &record, &table), 21);
    }

    #[test]
    fn test_exact_name_scores_at_least_ten() {
        let table = KeywordTable::default();
        for record in fixture() {
            assert!(score(&record.name, &record, &table) >= 10);
            assert!(score(&record.description, &record, &table) >= 10);
        }
    }

    #[test]
    fn test_expansion_is_additive_per_related_word() {
        let table = KeywordTable::from_entries([("command", ["generate", "custom", "absent"])]);
        let record = ToolRecord::new("Stacker", "Generate custom things");

        // "generate" +5, "custom" +5; "command" token not present
        assert_eq!(score("command", &record, &table), 10);
    }

    #[test]
    fn test_short_tokens_ignored() {
        let table = KeywordTable::empty();
        let record = ToolRecord::new("Go", "a to z");
        assert_eq!(score("xx a", &record, &table), 0);
    }

    #[test]
    fn test_keywords_field_matches_tokens() {
        let table = KeywordTable::empty();
        let record = ToolRecord::new("Taglib", "Tag library").with_keywords(["datapack"]);
        assert_eq!(score("datapack", &record, &table), 3);
    }

    #[test]
    fn test_blank_query_scores_zero() {
        let record = ToolRecord::new("Anything", "at all");
        assert_eq!(score("   ", &record, &KeywordTable::default()), 0);
    }

    #[test]
    fn test_search_local_orders_and_filters() {
        let table = KeywordTable::default();
        let results = search_local("seed", &fixture(), &table);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.name, "Chunkbase");
        assert!(results[0].relevance.unwrap() > 0);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let table = KeywordTable::empty();
        let catalog = vec![
            ToolRecord::new("Alpha", "shared word"),
            ToolRecord::new("Beta", "nothing"),
            ToolRecord::new("Gamma", "shared word"),
        ];

        let results = search_local("shared", &catalog, &table);
        let names: Vec<&str> = results.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[test]
    fn test_search_local_is_deterministic() {
        let table = KeywordTable::default();
        let first = search_local("command generator", &fixture(), &table);
        let second = search_local("command generator", &fixture(), &table);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
