use serde::{Deserialize, Serialize};

/// Role assigned to a lead and used to select a knowledge scope.
///
/// Open newtype rather than a closed enum: the set of roles is defined by
/// the rule and profile tables, so adding a role is a data edit with no
/// code change.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTag(pub String);

impl RoleTag {
    pub const UNKNOWN: &'static str = "UNKNOWN";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Fallback role for missing, unrecognized, or unresolvable sources.
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::RoleTag;

    #[test]
    fn unknown_round_trip() {
        let role = RoleTag::unknown();
        assert!(role.is_unknown());
        assert_eq!(role.to_string(), "UNKNOWN");
        assert!(!RoleTag::new("BUYER").is_unknown());
    }
}
