use leadgate_core::profile::ProfileRegistry;
use leadgate_core::RoleTag;

use crate::agent::RoleAgent;
use crate::llm::LlmClient;

pub const UNKNOWN_ROLE_RESPONSE: &str =
    "Unknown role. No knowledge scope is registered for this role tag.";

/// What one routed query produced, ready for display and for the audit
/// trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteOutcome {
    pub role: RoleTag,
    pub response: String,
    pub violation: bool,
    pub trigger_term: Option<String>,
}

/// Resolves a role tag to its profile-bound agent and delegates the query.
/// Role dispatch is a mapping lookup; an unrecognized tag is a terminal
/// "unknown role" outcome, not an error.
pub struct Router {
    registry: ProfileRegistry,
    llm: Option<Box<dyn LlmClient>>,
}

impl Router {
    pub fn new(registry: ProfileRegistry) -> Self {
        Self { registry, llm: None }
    }

    pub fn with_llm(mut self, llm: Box<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub async fn route(&self, role: &RoleTag, query: &str) -> RouteOutcome {
        let Some(profile) = self.registry.get(role) else {
            return RouteOutcome {
                role: role.clone(),
                response: UNKNOWN_ROLE_RESPONSE.to_string(),
                violation: false,
                trigger_term: None,
            };
        };

        let agent = RoleAgent::new(profile);
        let reply = agent.respond(query, self.llm.as_deref()).await;

        RouteOutcome {
            role: role.clone(),
            response: reply.response,
            violation: reply.violation,
            trigger_term: reply.trigger_term,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use leadgate_core::profile::ProfileRegistry;
    use leadgate_core::RoleTag;

    use crate::llm::LlmClient;

    use super::{RouteOutcome, Router, UNKNOWN_ROLE_RESPONSE};

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("endpoint unavailable"))
        }
    }

    fn router() -> Router {
        Router::new(ProfileRegistry::default())
    }

    #[tokio::test]
    async fn unknown_role_is_terminal_and_not_a_violation() {
        let outcome = router().route(&RoleTag::new("INVESTOR"), "what are the terms").await;
        assert_eq!(
            outcome,
            RouteOutcome {
                role: RoleTag::new("INVESTOR"),
                response: UNKNOWN_ROLE_RESPONSE.to_string(),
                violation: false,
                trigger_term: None,
            }
        );
    }

    #[tokio::test]
    async fn known_role_routes_to_its_knowledge_scope() {
        let outcome = router().route(&RoleTag::new("BUYER"), "tell me about the emi options").await;
        assert!(!outcome.violation);
        assert!(outcome.response.contains("banking partners"));
    }

    #[tokio::test]
    async fn violation_outcome_carries_the_trigger_term() {
        let outcome =
            router().route(&RoleTag::new("CHANNEL_PARTNER"), "what is the pricing for a 2BHK").await;
        assert!(outcome.violation);
        assert_eq!(outcome.trigger_term.as_deref(), Some("pricing"));
    }

    #[tokio::test]
    async fn failing_collaborator_never_escapes_the_router() {
        let router = router().with_llm(Box::new(FailingClient));
        let outcome = router.route(&RoleTag::new("ENQUIRY"), "how do handovers work").await;
        assert!(!outcome.violation);
        assert!(outcome.response.contains("rephrase your question"));
    }
}
