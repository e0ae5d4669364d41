use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default OpenAI-compatible chat completions endpoint used for delegation.
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Where the static catalog is fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Local JSON file.
    File(PathBuf),
    /// Remote JSON document fetched with a single GET.
    Url(String),
}

impl CatalogSource {
    /// Classify a raw setting: `http://` and `https://` values are URLs,
    /// everything else is a filesystem path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Settings for the external search-delegation collaborator.
#[derive(Debug, Clone)]
pub struct DelegationConfig {
    /// Chat completions endpoint (OpenAI wire format).
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Upper bound on a single delegated call.
    pub timeout: Duration,
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Catalog file path or URL.
    pub catalog_source: CatalogSource,
    /// Optional JSON file replacing the built-in keyword-expansion table.
    pub keywords_path: Option<PathBuf>,
    /// `None` when delegation is disabled or no API key is configured.
    pub delegation: Option<DelegationConfig>,
    /// Maximum number of autocomplete suggestions.
    pub max_suggestions: usize,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Delegation is only switched on when `DELEGATION_ENABLED` is truthy
    /// *and* `LLM_API_KEY` is set; otherwise sentence-like queries are scored
    /// locally like any other query.
    pub fn from_env() -> anyhow::Result<Self> {
        let delegation_enabled = parse_flag(&env::var("DELEGATION_ENABLED").unwrap_or_default());
        let api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());

        let delegation = match (delegation_enabled, api_key) {
            (true, Some(api_key)) => Some(DelegationConfig {
                api_url: env::var("LLM_API_URL")
                    .unwrap_or_else(|_| DEFAULT_LLM_API_URL.to_string()),
                api_key,
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                timeout: Duration::from_millis(
                    env::var("DELEGATION_TIMEOUT_MS")
                        .unwrap_or_else(|_| "5000".to_string())
                        .parse()?,
                ),
            }),
            (true, None) => {
                tracing::warn!(
                    "DELEGATION_ENABLED is set but LLM_API_KEY is missing; delegation disabled"
                );
                None
            }
            _ => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            catalog_source: CatalogSource::parse(
                &env::var("CATALOG_SOURCE").unwrap_or_else(|_| "./tools.json".to_string()),
            ),
            keywords_path: env::var("KEYWORDS_PATH").ok().map(PathBuf::from),
            delegation,
            max_suggestions: env::var("MAX_SUGGESTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
