//! Search delegate trait: the boundary to an external language model.
//!
//! The engine hands a delegate the query and the catalog's names; the
//! delegate answers with the names it considers relevant. Anything that goes
//! wrong is a [`DelegationError`], which the engine absorbs by falling back to
//! local scoring.

use crate::catalog::ToolRecord;
use crate::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of names the delegate is asked to pick.
pub const MAX_DELEGATED_PICKS: usize = 3;

/// Errors from delegated search calls.
#[derive(Debug, thiserror::Error)]
pub enum DelegationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed (check API key): {0}")]
    Auth(String),

    #[error("provider error: {status} {message}")]
    Provider { status: u16, message: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// What is sent to the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegationRequest {
    pub system_instruction: String,
    pub user_query: String,
}

impl DelegationRequest {
    /// Build the instruction for `query` over the given candidate names.
    pub fn new(query: &str, names: &[&str]) -> Self {
        let listing = names
            .iter()
            .map(|name| format!("- {}", name))
            .collect::<Vec<_>>()
            .join("\n");

        let system_instruction = format!(
            "You help users find tools in a directory. Choose up to {max} tools from the \
             list below that best match what the user is asking for. Use the names exactly \
             as written in the list. Respond with a single JSON object of the form \
             {{\"relevant_tools\": [\"Name\", ...]}}. If nothing fits, respond with \
             {{\"relevant_tools\": []}}.\n\nAvailable tools:\n{listing}",
            max = MAX_DELEGATED_PICKS,
            listing = listing,
        );

        Self {
            system_instruction,
            user_query: query.to_string(),
        }
    }
}

/// The structured answer expected back from the delegate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DelegationResponse {
    pub relevant_tools: Vec<String>,
}

impl DelegationResponse {
    /// Parse the delegate's raw text answer.
    ///
    /// Models sometimes wrap JSON in a markdown code fence; the fence is
    /// stripped before parsing. A missing `relevant_tools` field is an error.
    pub fn parse(raw: &str) -> Result<Self, DelegationError> {
        let body = strip_code_fence(raw.trim());
        serde_json::from_str(body).map_err(|e| DelegationError::Parse(e.to_string()))
    }

    /// Catalog records whose name equals one of the picked names, ignoring
    /// case. Catalog order is preserved and unknown names are skipped.
    pub fn select(&self, catalog: &[ToolRecord]) -> Vec<ToolRecord> {
        let picked: HashSet<String> = self
            .relevant_tools
            .iter()
            .map(|name| name.trim().to_lowercase())
            .collect();

        catalog
            .iter()
            .filter(|tool| picked.contains(&tool.name.to_lowercase()))
            .cloned()
            .collect()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let Some(rest) = raw.strip_prefix("```") else {
        return raw;
    };
    // language tag in any case: `json`, `JSON`, ...
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// An external collaborator able to pick relevant catalog names.
///
/// Implementations must be `Send + Sync` so the engine can share them.
/// Uses `BoxFuture` for object safety (allows `Arc<dyn SearchDelegate>`).
pub trait SearchDelegate: Send + Sync {
    /// Display name used in logs.
    fn name(&self) -> &str;

    /// Ask the delegate which tools match the request.
    fn select(
        &self,
        request: &DelegationRequest,
    ) -> BoxFuture<'_, Result<DelegationResponse, DelegationError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_lists_every_name() {
        let request = DelegationRequest::new("I need a map maker", &["Map Art", "Chunkbase"]);
        assert_eq!(request.user_query, "I need a map maker");
        assert!(request.system_instruction.contains("- Map Art\n- Chunkbase"));
        assert!(request.system_instruction.contains("relevant_tools"));
    }

    #[test]
    fn test_parse_plain_and_fenced() {
        let plain = DelegationResponse::parse(r#"{"relevant_tools": ["A"]}"#).unwrap();
        assert_eq!(plain.relevant_tools, vec!["A"]);

        let fenced =
            DelegationResponse::parse("```json\n{\"relevant_tools\": [\"B\", \"C\"]}\n```").unwrap();
        assert_eq!(fenced.relevant_tools, vec!["B", "C"]);
    }

    #[test]
    fn test_parse_fence_tag_any_case() {
        for raw in [
            "```JSON\n{\"relevant_tools\": [\"A\"]}\n```",
            "```Json {\"relevant_tools\": [\"A\"]}```",
            "```\n{\"relevant_tools\": [\"A\"]}\n```",
        ] {
            let parsed = DelegationResponse::parse(raw).unwrap();
            assert_eq!(parsed.relevant_tools, vec!["A"], "failed on {:?}", raw);
        }
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        assert!(matches!(
            DelegationResponse::parse(r#"{"tools": ["A"]}"#),
            Err(DelegationError::Parse(_))
        ));
        assert!(DelegationResponse::parse("not json").is_err());
    }

    #[test]
    fn test_select_exact_case_insensitive_in_catalog_order() {
        let catalog = vec![
            ToolRecord::new("Chunkbase", "seed map"),
            ToolRecord::new("Map Art", "pictures"),
            ToolRecord::new("Map", "short name"),
        ];
        let response = DelegationResponse {
            relevant_tools: vec!["map art".into(), "CHUNKBASE".into(), "Unknown".into()],
        };

        let names: Vec<String> = response
            .select(&catalog)
            .into_iter()
            .map(|t| t.name)
            .collect();

        // "Map" is not selected: matching is exact, not substring
        assert_eq!(names, vec!["Chunkbase", "Map Art"]);
    }
}
