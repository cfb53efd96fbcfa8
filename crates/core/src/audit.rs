use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::RoleTag;
use crate::errors::ApplicationError;

pub const MISMATCH_EVENT: &str = "ROLE_MISMATCH_REPORTED";

/// One append-only audit entry: either a routed interaction or a reported
/// role mismatch. Never mutated or deleted once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(default)]
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub violation_flag: bool,
    #[serde(flatten)]
    pub kind: AuditKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditKind {
    Interaction { role: RoleTag, query: String, response: String },
    RoleMismatch { phone: String, event: String, current_role: RoleTag },
}

impl AuditRecord {
    pub fn interaction(
        role: RoleTag,
        query: impl Into<String>,
        response: impl Into<String>,
        violation_flag: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            violation_flag,
            kind: AuditKind::Interaction {
                role,
                query: query.into(),
                response: response.into(),
            },
        }
    }

    /// Mismatch reports are always flagged for admin review.
    pub fn role_mismatch(phone: impl Into<String>, current_role: RoleTag) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            violation_flag: true,
            kind: AuditKind::RoleMismatch {
                phone: phone.into(),
                event: MISMATCH_EVENT.to_string(),
                current_role,
            },
        }
    }
}

pub trait AuditTrail: Send + Sync {
    fn append(&self, record: AuditRecord) -> Result<(), ApplicationError>;
}

#[derive(Clone, Default)]
pub struct InMemoryAuditTrail {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl InMemoryAuditTrail {
    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditTrail for InMemoryAuditTrail {
    fn append(&self, record: AuditRecord) -> Result<(), ApplicationError> {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::role::RoleTag;

    use super::{AuditKind, AuditRecord, AuditTrail, InMemoryAuditTrail, MISMATCH_EVENT};

    #[test]
    fn in_memory_trail_records_interactions() {
        let trail = InMemoryAuditTrail::default();
        trail
            .append(AuditRecord::interaction(
                RoleTag::new("BUYER"),
                "tell me about emi",
                "Multiple banking partners...",
                false,
            ))
            .expect("append succeeds");

        let records = trail.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].violation_flag);
        assert!(matches!(
            records[0].kind,
            AuditKind::Interaction { ref role, .. } if role.as_str() == "BUYER"
        ));
    }

    #[test]
    fn mismatch_records_are_always_violations() {
        let record = AuditRecord::role_mismatch("9999999999", RoleTag::new("SITE_VISIT"));
        assert!(record.violation_flag);
        assert!(matches!(
            record.kind,
            AuditKind::RoleMismatch { ref event, .. } if event == MISMATCH_EVENT
        ));
    }

    #[test]
    fn records_round_trip_through_json() {
        let interaction =
            AuditRecord::interaction(RoleTag::new("ENQUIRY"), "who is the developer", "...", false);
        let mismatch = AuditRecord::role_mismatch("8888888888", RoleTag::new("BUYER"));

        for record in [interaction, mismatch] {
            let raw = serde_json::to_string(&record).expect("serializes");
            let back: AuditRecord = serde_json::from_str(&raw).expect("deserializes");
            assert_eq!(back, record);
        }
    }
}
