//! Type definitions for the catalog module.

use serde::{Deserialize, Serialize};

/// One entry of the tool catalog.
///
/// The catalog file historically names the display name `tool`; both `tool`
/// and `name` are accepted when parsing, `name` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    #[serde(alias = "tool")]
    pub name: String,

    pub description: String,

    /// Extra matchable terms for the relevance scorer.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Free-form price label, e.g. "Free", "Freemium", "Paid".
    #[serde(default)]
    pub price: String,

    #[serde(default)]
    pub links: Vec<ToolLink>,
}

impl ToolRecord {
    /// Creates a record with no keywords, price or links.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            keywords: Vec::new(),
            price: String::new(),
            links: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_link(mut self, link: ToolLink) -> Self {
        self.links.push(link);
        self
    }

    pub fn price_tier(&self) -> PriceTier {
        PriceTier::classify(&self.price)
    }
}

/// A named external link attached to a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolLink {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl ToolLink {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            tooltip: None,
        }
    }
}

/// Price bucket derived from a free-form price label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Free,
    Freemium,
    Paid,
    Unknown,
}

impl PriceTier {
    /// Classify a price label, case-insensitively.
    ///
    /// `freemium` wins over everything, then `paid`. `free` only counts when
    /// the label does not also mention `paid`, so "Free / Paid" is [`Paid`].
    ///
    /// [`Paid`]: PriceTier::Paid
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("freemium") {
            Self::Freemium
        } else if lower.contains("paid") {
            Self::Paid
        } else if lower.contains("free") && !lower.contains("paid") {
            Self::Free
        } else {
            Self::Unknown
        }
    }
}
