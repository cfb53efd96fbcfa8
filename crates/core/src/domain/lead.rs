use serde::{Deserialize, Serialize};

use crate::domain::role::RoleTag;

/// Sequential lead identifier in `LEAD-0001` form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn from_row_number(row_number: usize) -> Self {
        Self(format!("LEAD-{row_number:04}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How a lead's raw source text resolved against the rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Matched,
    Missing,
    Unrecognized,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Missing => "missing",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// One row as handed over by the external tabular reader, before
/// classification. Field values are carried verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawLeadRow {
    pub name: String,
    pub phone: String,
    pub source: String,
}

/// Enriched lead record emitted by the batch pipeline. Immutable once
/// written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub id: LeadId,
    pub name: String,
    pub phone: String,
    pub source: String,
    pub role: RoleTag,
    pub status: MatchStatus,
}

#[cfg(test)]
mod tests {
    use super::{LeadId, MatchStatus};

    #[test]
    fn lead_ids_are_zero_padded_and_sequential() {
        assert_eq!(LeadId::from_row_number(1).as_str(), "LEAD-0001");
        assert_eq!(LeadId::from_row_number(42).as_str(), "LEAD-0042");
        assert_eq!(LeadId::from_row_number(12345).as_str(), "LEAD-12345");
    }

    #[test]
    fn match_status_serializes_snake_case() {
        assert_eq!(MatchStatus::Matched.as_str(), "matched");
        assert_eq!(MatchStatus::Unrecognized.as_str(), "unrecognized");
    }
}
