/// Outcome of normalizing a raw source value. Absent and whitespace-only
/// inputs collapse to `Missing` so callers never have to distinguish the two.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedSource {
    Missing,
    Value(String),
}

impl NormalizedSource {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Value(value) => Some(value.as_str()),
        }
    }
}

/// Trims, lower-cases, and collapses interior whitespace runs to a single
/// space. Total and idempotent: normalizing an already-normalized value
/// returns it unchanged.
pub fn normalize_source(raw: Option<&str>) -> NormalizedSource {
    let Some(raw) = raw else {
        return NormalizedSource::Missing;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NormalizedSource::Missing;
    }

    let lowered = trimmed.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    NormalizedSource::Value(collapsed)
}

#[cfg(test)]
mod tests {
    use super::{normalize_source, NormalizedSource};

    #[test]
    fn absent_and_blank_inputs_are_missing() {
        assert_eq!(normalize_source(None), NormalizedSource::Missing);
        assert_eq!(normalize_source(Some("")), NormalizedSource::Missing);
        assert_eq!(normalize_source(Some("   \t  ")), NormalizedSource::Missing);
    }

    #[test]
    fn trims_lowercases_and_collapses_spaces() {
        assert_eq!(
            normalize_source(Some("  Channel   Partner  ")),
            NormalizedSource::Value("channel partner".to_string())
        );
        assert_eq!(normalize_source(Some("BUYER")), NormalizedSource::Value("buyer".to_string()));
        assert_eq!(
            normalize_source(Some("site\t\tvisit")),
            NormalizedSource::Value("site visit".to_string())
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let cases = ["buyer", "channel partner", "site visit", "enquiry_line"];
        for case in cases {
            let once = normalize_source(Some(case));
            let value = once.as_value().expect("normalized value").to_string();
            assert_eq!(normalize_source(Some(&value)), NormalizedSource::Value(value.clone()));
        }
    }
}
