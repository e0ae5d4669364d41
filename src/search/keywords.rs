//! Keyword-expansion table for the relevance scorer.
//!
//! Each entry maps a trigger word to related words. When a query contains the
//! trigger, every related word found in a record earns it extra score.

use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in expansion table for the Minecraft tool catalog.
const DEFAULT_TABLE: &[(&str, &[&str])] = &[
    ("command", &["command", "generate", "create", "custom", "mcstacker", "gamergeeks"]),
    ("generator", &["generator", "generate", "create", "build", "make"]),
    ("structure", &["structure", "find", "locate", "seed", "chunkbase", "biome"]),
    ("map", &["map", "picture", "image", "upload", "mc-map"]),
    ("armor", &["armor", "stand", "customize", "haselkern"]),
    ("obj", &["obj", "schematic", "worldedit", "litematica", "convert"]),
    ("update", &["update", "convert", "version", "papermc", "command"]),
    ("wiki", &["wiki", "information", "guide", "vanilla", "minecraft"]),
    ("skin", &["skin", "banner", "totem", "avatar", "achievement"]),
    ("heads", &["heads", "player", "gallery", "minecraft-heads"]),
    ("bedrock", &["bedrock", "addon", "creator", "mctools"]),
    ("enchant", &["enchant", "enchanting", "efficient", "optimize"]),
    ("world", &["world", "convert", "edit", "universal"]),
    ("server", &["server", "hosting", "tunnel", "playit", "mctools"]),
    ("shape", &["shape", "build", "sphere", "ellipsoid", "plotz"]),
    ("datapack", &["datapack", "misode", "loot", "advancement", "recipe"]),
    ("science", &["science", "command", "minecraftcommand"]),
    ("asset", &["asset", "mcasset", "library", "texture"]),
    ("resource", &["resource", "pack", "datapack", "mod", "planetminecraft", "modrinth", "curseforge"]),
    ("creator", &["creator", "ija", "minecraft", "content"]),
    ("hosting", &["hosting", "server", "bisect", "nitrado", "aternos"]),
    ("modded", &["modded", "kubejs", "custom", "gui"]),
    ("image", &["image", "particle", "display", "convert"]),
    ("tag", &["tag", "taglib", "library"]),
    ("alphabet", &["alphabet", "galactic", "enchantment", "encode", "decode"]),
    ("emoji", &["emoji", "emoticon", "symbol"]),
    ("tools", &["tools", "garretto", "command", "mrgarretto"]),
];

/// Trigger word to related words, all stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    /// An empty table; only direct and token matches contribute to scores.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a table from `(trigger, related words)` pairs.
    pub fn from_entries<I, T, W, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, W)>,
        T: Into<String>,
        W: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(trigger, words)| {
                let trigger: String = trigger.into();
                let words = words
                    .into_iter()
                    .map(|w| Into::<String>::into(w).to_lowercase())
                    .collect();
                (trigger.to_lowercase(), words)
            })
            .filter(|(trigger, _)| !trigger.is_empty())
            .collect();
        Self { entries }
    }

    /// Load a table from a JSON object of the form `{"trigger": ["word", ...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "failed to read keyword table {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let map: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)
            .map_err(|e| AppError::ConfigError(format!("malformed keyword table: {}", e)))?;
        Ok(Self::from_entries(map))
    }

    /// Entries whose trigger occurs as a substring of `query_lower`.
    pub fn triggered<'a>(
        &'a self,
        query_lower: &'a str,
    ) -> impl Iterator<Item = &'a [String]> + 'a {
        self.entries
            .iter()
            .filter(move |(trigger, _)| query_lower.contains(trigger.as_str()))
            .map(|(_, words)| words.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_TABLE
                .iter()
                .map(|(trigger, words)| (*trigger, words.iter().copied())),
        )
    }
}
