pub mod audit;
pub mod classify;
pub mod config;
pub mod domain;
pub mod errors;
pub mod normalize;
pub mod pipeline;
pub mod profile;

pub use audit::{AuditKind, AuditRecord, AuditTrail, InMemoryAuditTrail, MISMATCH_EVENT};
pub use classify::{Classification, RuleSet, RuleSetError};
pub use domain::lead::{LeadId, LeadRecord, MatchStatus, RawLeadRow};
pub use domain::role::RoleTag;
pub use errors::{ApplicationError, DomainError};
pub use normalize::{normalize_source, NormalizedSource};
pub use pipeline::{
    BatchOutcome, BatchProcessor, BatchSummary, InMemoryLeadSink, InMemoryLeadSource, LeadSink,
    LeadSource, StatusCounts,
};
pub use profile::{ProfileError, ProfileRegistry, RoleProfile};
