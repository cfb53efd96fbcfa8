use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::role::RoleTag;

/// Knowledge scope for one role: who the agent claims to be, the fixed
/// topic-to-answer mapping it may serve, and the terms it must refuse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    pub role: RoleTag,
    pub identity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub knowledge: BTreeMap<String, String>,
    #[serde(default)]
    pub banned: Vec<String>,
}

impl RoleProfile {
    /// Topic keys in deterministic order, for refusal and fallback messages.
    pub fn topics(&self) -> Vec<&str> {
        self.knowledge.keys().map(String::as_str).collect()
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("could not read profiles file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse profiles file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("duplicate profile for role `{0}`")]
    DuplicateRole(RoleTag),
}

/// Static role-to-profile mapping. Unknown tags resolve to `None`; callers
/// surface that as an "unknown role" outcome, never a crash.
#[derive(Clone, Debug)]
pub struct ProfileRegistry {
    profiles: BTreeMap<RoleTag, RoleProfile>,
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<RoleProfile>,
}

impl ProfileRegistry {
    pub fn new(profiles: Vec<RoleProfile>) -> Result<Self, ProfileError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            let role = profile.role.clone();
            if map.insert(role.clone(), profile).is_some() {
                return Err(ProfileError::DuplicateRole(role));
            }
        }
        Ok(Self { profiles: map })
    }

    /// Loads a declarative profile table: a `[[profiles]]` array with
    /// `role`, `identity`, `description`, a `knowledge` table, and a
    /// `banned` list per entry.
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ProfileError::ReadFile { path: path.to_path_buf(), source })?;
        let file = toml::from_str::<ProfileFile>(&raw)
            .map_err(|source| ProfileError::ParseFile { path: path.to_path_buf(), source })?;
        Self::new(file.profiles)
    }

    pub fn get(&self, role: &RoleTag) -> Option<&RoleProfile> {
        self.profiles.get(role)
    }

    pub fn roles(&self) -> Vec<&RoleTag> {
        self.profiles.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new(vec![
            buyer_profile(),
            channel_partner_profile(),
            site_visit_profile(),
            enquiry_profile(),
        ])
        .expect("shipped profiles have unique roles")
    }
}

fn profile(
    role: &str,
    identity: &str,
    description: &str,
    knowledge: &[(&str, &str)],
    banned: &[&str],
) -> RoleProfile {
    RoleProfile {
        role: RoleTag::new(role),
        identity: identity.to_string(),
        description: description.to_string(),
        knowledge: knowledge
            .iter()
            .map(|(topic, answer)| (topic.to_string(), answer.to_string()))
            .collect(),
        banned: banned.iter().map(|term| term.to_string()).collect(),
    }
}

fn buyer_profile() -> RoleProfile {
    profile(
        "BUYER",
        "Residential Sales Expert",
        "Expert in home pricing, luxury amenities, and booking procedures.",
        &[
            (
                "pricing",
                "Our residential units are competitively priced. 1BHK starts at \u{20b9}45 Lakhs, \
                 2BHK at \u{20b9}75 Lakhs, and 3BHK premium units are between \u{20b9}1.1Cr and \
                 \u{20b9}1.4Cr.",
            ),
            (
                "emi",
                "Multiple banking partners (HDFC, ICICI, SBI) offer interest rates starting from \
                 8.25%. A 20% down payment is standard.",
            ),
            (
                "project",
                "Aurora Heights is a sustainable 15-acre development featuring 70% open green \
                 space and a luxury clubhouse.",
            ),
            (
                "booking",
                "The reservation process is simple: pay an initial \u{20b9}2 Lakhs as a booking \
                 amount and submit your KYC documents.",
            ),
            (
                "availability",
                "Current availability: Tower B has limited 2BHKs remaining. Tower C has new 1BHK \
                 and 3BHK launches.",
            ),
            (
                "location",
                "Located in the Tech Corridor, with a 5-minute walk to the new Metro terminal for \
                 easy city access.",
            ),
        ],
        &[
            "commission",
            "payout",
            "partner portal",
            "slab",
            "brokerage fee",
            "incentive",
            "partnership term",
        ],
    )
}

fn channel_partner_profile() -> RoleProfile {
    profile(
        "CHANNEL_PARTNER",
        "Partner Relations Manager",
        "Dedicated lead for business incentives, commissions, and partner conduct.",
        &[
            (
                "commission",
                "Our standard commission slab is 2%. 'Club Elite' partners (5+ bookings) receive \
                 2.5% plus performance bonuses.",
            ),
            (
                "payout",
                "Commissions are processed within 21 days of the buyer's first 10% payment \
                 clearance and registration.",
            ),
            (
                "partnership",
                "We offer a 1-year renewable RERA-registered partnership with dedicated \
                 relationship manager support.",
            ),
            (
                "registration",
                "Onboarding requires a valid RERA certificate, GST details, and a company \
                 profile via the partner portal.",
            ),
            (
                "referral",
                "Lead protection is active for 60 days. All leads must be logged in the \
                 PartnerConnect app before arrival.",
            ),
            (
                "terms",
                "Partners must adhere to our zero-tolerance policy for misrepresentation and \
                 follow RERA guidelines strictly.",
            ),
        ],
        &[
            "pricing",
            "cost",
            "personal discount",
            "end-user discount",
            "booking form",
            "emi rates",
            "loan interest",
        ],
    )
}

fn site_visit_profile() -> RoleProfile {
    profile(
        "SITE_VISIT",
        "Site Visit Coordinator",
        "Logistics lead for site tours, directions, and scheduling.",
        &[
            (
                "location",
                "Aurora Heights Site Office is located at ITPL Main Road junction. Search \
                 'Aurora Heights' on Maps.",
            ),
            (
                "schedule",
                "Site visits are open 7 days a week from 9:30 AM to 6:30 PM. We recommend early \
                 morning slots.",
            ),
            (
                "slots",
                "Currently available slots: 11:00 AM, 2:30 PM, and 4:30 PM today. Shall I \
                 reserve one for you?",
            ),
            (
                "contact",
                "Site Tour Lead: Vikram (+91 99000-11223). Reception Desk: +91 80-4555-6677.",
            ),
            (
                "shuttle",
                "A complimentary luxury shuttle runs from the Metro station Gate 2 every 20 \
                 minutes for visitors.",
            ),
            (
                "amenities",
                "The tour includes a walk through the sample 2BHK flat, the viewing gallery, and \
                 properties Phase 1.",
            ),
        ],
        &[
            "pricing",
            "cost",
            "commission",
            "payout",
            "partnership",
            "emi",
            "booking",
            "financing",
            "loan",
        ],
    )
}

fn enquiry_profile() -> RoleProfile {
    profile(
        "ENQUIRY",
        "General Enquiry Specialist",
        "Expert in project overview, developer legacy, and general project features.",
        &[
            (
                "project",
                "Aurora Heights is a flagship 15-acre residential development featuring smart \
                 homes and sustainable living.",
            ),
            (
                "developer",
                "Global Realty is an award-winning developer with a legacy of 25 years and over \
                 40 million sq. ft. of space delivered.",
            ),
            (
                "location",
                "Located at the heart of the IT corridor, we offer seamless connectivity to the \
                 airport and major business hubs.",
            ),
            (
                "features",
                "Our project includes a 50,000 sq. ft. clubhouse, organic gardens, and a \
                 futuristic security system.",
            ),
            (
                "contact",
                "For general queries, you can reach us at 1800-AURORA-INFO or email \
                 contact@auroraheights.com.",
            ),
            (
                "legacy",
                "We are known for 'Quality First' construction and have been rated 5-star by \
                 independent realty auditors.",
            ),
        ],
        &[
            "commission",
            "payout",
            "partner portal",
            "slab",
            "brokerage fee",
            "incentive",
            "partnership term",
            "pricing",
            "cost",
            "discount",
            "emi",
            "booking",
            "loan",
        ],
    )
}

#[cfg(test)]
mod tests {
    use crate::domain::role::RoleTag;

    use super::{ProfileError, ProfileRegistry, RoleProfile};

    #[test]
    fn default_registry_covers_the_four_shipped_roles() {
        let registry = ProfileRegistry::default();
        for role in ["BUYER", "CHANNEL_PARTNER", "SITE_VISIT", "ENQUIRY"] {
            let profile = registry.get(&RoleTag::new(role));
            assert!(profile.is_some(), "missing profile for {role}");
        }
        assert!(registry.get(&RoleTag::unknown()).is_none());
    }

    #[test]
    fn buyer_profile_has_emi_topic_and_commission_ban() {
        let registry = ProfileRegistry::default();
        let buyer = registry.get(&RoleTag::new("BUYER")).expect("buyer profile");
        assert!(buyer.knowledge.contains_key("emi"));
        assert!(buyer.banned.iter().any(|term| term == "commission"));
        assert_eq!(buyer.identity, "Residential Sales Expert");
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let duplicate = RoleProfile {
            role: RoleTag::new("BUYER"),
            identity: "Copy".to_string(),
            description: String::new(),
            knowledge: Default::default(),
            banned: Vec::new(),
        };
        let error = ProfileRegistry::new(vec![duplicate.clone(), duplicate])
            .expect_err("duplicate role should fail");
        assert!(matches!(error, ProfileError::DuplicateRole(ref role) if role.as_str() == "BUYER"));
    }

    #[test]
    fn loads_declarative_profile_file() {
        let raw = r#"
[[profiles]]
role = "BROKER"
identity = "Broker Desk"
banned = ["pricing"]

[profiles.knowledge]
onboarding = "Register through the broker desk with your license number."
"#;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("profiles.toml");
        std::fs::write(&path, raw).expect("write profiles");

        let registry = ProfileRegistry::load(&path).expect("profiles load");
        let broker = registry.get(&RoleTag::new("BROKER")).expect("broker profile");
        assert_eq!(broker.topics(), vec!["onboarding"]);
        assert_eq!(broker.banned, vec!["pricing".to_string()]);
    }
}
