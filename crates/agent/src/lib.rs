//! Role-governed conversational layer.
//!
//! One agent type, parameterized by a role profile, answers queries under a
//! strict contract: refuse banned topics, serve fixed knowledge on keyword
//! match, optionally expand through an external text-generation collaborator,
//! and otherwise fall back to a canned redirect. The collaborator sits behind
//! the narrow [`llm::LlmClient`] seam so everything here is testable with
//! stubs.

pub mod agent;
pub mod llm;
pub mod router;

pub use agent::{AgentReply, GuardViolation, RoleAgent};
pub use llm::{LlmClient, OllamaClient};
pub use router::{RouteOutcome, Router, UNKNOWN_ROLE_RESPONSE};
