//! Query classification: short keyword phrases vs. sentence-like requests.

/// How the engine should treat a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Blank input: show the whole catalog.
    Empty,
    /// Short phrase, scored locally.
    Keyword,
    /// Conversational request, eligible for delegation.
    Sentence,
}

/// Classify a raw query string.
pub fn classify(query: &str) -> QueryKind {
    if query.trim().is_empty() {
        QueryKind::Empty
    } else if is_sentence_like(query) {
        QueryKind::Sentence
    } else {
        QueryKind::Keyword
    }
}

/// A query is sentence-like when it has more than 3 tokens, contains a `?`,
/// contains "a generator where", or has more than one token and contains
/// "i need". Phrase checks ignore case.
pub fn is_sentence_like(query: &str) -> bool {
    let lower = query.to_lowercase();
    let tokens = lower.split_whitespace().count();

    tokens > 3
        || lower.contains('?')
        || lower.contains("a generator where")
        || (tokens > 1 && lower.contains("i need"))
}
