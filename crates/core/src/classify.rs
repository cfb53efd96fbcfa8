use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::lead::MatchStatus;
use crate::domain::role::RoleTag;
use crate::normalize::{normalize_source, NormalizedSource};

/// Result of classifying one raw source value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub role: RoleTag,
    pub status: MatchStatus,
}

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("could not read rules file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse rules file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("rule key `{key}` normalizes to `{normalized}`, which is already mapped")]
    DuplicateRule { key: String, normalized: String },
    #[error("rule key is empty after normalization")]
    BlankRule,
}

/// Source-text to role mapping. Keys are stored normalized, so lookups are
/// case- and whitespace-insensitive. The table is plain data: adding a role
/// never requires touching the classification algorithm.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: BTreeMap<String, RoleTag>,
    fallback: RoleTag,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    fallback: Option<String>,
    #[serde(default)]
    rules: BTreeMap<String, String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        let shipped = [
            // Variants used by the lead capture forms.
            ("buyer_line", "BUYER"),
            ("partner_line", "CHANNEL_PARTNER"),
            ("visit_line", "SITE_VISIT"),
            ("enquiry_line", "ENQUIRY"),
            // Variants that appear in exported lead sheets.
            ("buyer", "BUYER"),
            ("channel partner", "CHANNEL_PARTNER"),
            ("site visit", "SITE_VISIT"),
            ("enquiry", "ENQUIRY"),
        ];

        let mut set = Self::empty(RoleTag::unknown());
        for (source, role) in shipped {
            set.insert(source, RoleTag::new(role)).expect("shipped rules are collision-free");
        }
        set
    }
}

impl RuleSet {
    pub fn empty(fallback: RoleTag) -> Self {
        Self { rules: BTreeMap::new(), fallback }
    }

    /// Loads a declarative rule table. The file carries a `[rules]` table of
    /// `source = "ROLE"` entries and an optional top-level `fallback`.
    pub fn load(path: &Path) -> Result<Self, RuleSetError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| RuleSetError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
            .map_err(|error| match error {
                RuleSetError::ParseFile { source, .. } => {
                    RuleSetError::ParseFile { path: path.to_path_buf(), source }
                }
                other => other,
            })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, RuleSetError> {
        let file = toml::from_str::<RuleFile>(raw).map_err(|source| RuleSetError::ParseFile {
            path: PathBuf::from("<inline>"),
            source,
        })?;

        let fallback = file.fallback.map(RoleTag::new).unwrap_or_else(RoleTag::unknown);
        let mut set = Self::empty(fallback);
        for (key, role) in file.rules {
            set.insert(&key, RoleTag::new(role))?;
        }
        Ok(set)
    }

    /// Inserts one rule, normalizing the key. Rejects keys that collapse to
    /// nothing or collide with an existing normalized key.
    pub fn insert(&mut self, source: &str, role: RoleTag) -> Result<(), RuleSetError> {
        let NormalizedSource::Value(normalized) = normalize_source(Some(source)) else {
            return Err(RuleSetError::BlankRule);
        };
        if self.rules.contains_key(&normalized) {
            return Err(RuleSetError::DuplicateRule { key: source.to_string(), normalized });
        }
        self.rules.insert(normalized, role);
        Ok(())
    }

    pub fn fallback(&self) -> &RoleTag {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Classifies one raw source value. Total and deterministic: every input
    /// resolves to a role and a match status.
    pub fn classify(&self, raw: Option<&str>) -> Classification {
        match normalize_source(raw) {
            NormalizedSource::Missing => Classification {
                role: self.fallback.clone(),
                status: MatchStatus::Missing,
            },
            NormalizedSource::Value(key) => match self.rules.get(&key) {
                Some(role) => Classification { role: role.clone(), status: MatchStatus::Matched },
                None => Classification {
                    role: self.fallback.clone(),
                    status: MatchStatus::Unrecognized,
                },
            },
        }
    }
}
