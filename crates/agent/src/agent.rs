use leadgate_core::profile::RoleProfile;
use tracing::debug;

use crate::llm::LlmClient;

/// Final reply for one query, with the violation outcome the audit trail
/// records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentReply {
    pub response: String,
    pub violation: bool,
    pub trigger_term: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardViolation {
    pub refusal: String,
    pub term: String,
}

/// A knowledge agent strictly bounded by one role profile. A single type
/// covers every role: behavior differences live entirely in the profile
/// data.
pub struct RoleAgent<'a> {
    profile: &'a RoleProfile,
}

impl<'a> RoleAgent<'a> {
    pub fn new(profile: &'a RoleProfile) -> Self {
        Self { profile }
    }

    /// Banned-term check. Runs unconditionally before any answer path; the
    /// first banned term found as a substring of the lowered query wins.
    /// Substring semantics are deliberate: partial-word overlaps match.
    pub fn guard(&self, query: &str) -> Option<GuardViolation> {
        let lowered = query.to_lowercase();
        for term in &self.profile.banned {
            if lowered.contains(term.as_str()) {
                let refusal = format!(
                    "I am authorized to share details only regarding {}. I am strictly \
                     restricted from providing information on '{term}'.",
                    self.profile.topics().join(", "),
                );
                return Some(GuardViolation { refusal, term: term.clone() });
            }
        }
        None
    }

    /// Answer path, only reached when the guard passed: fixed topic text,
    /// then the external collaborator, then the canned fallback. Collaborator
    /// failures are swallowed here and never reach the caller.
    pub async fn answer(&self, query: &str, llm: Option<&dyn LlmClient>) -> String {
        let lowered = query.to_lowercase();

        for (topic, text) in &self.profile.knowledge {
            if lowered.contains(topic.as_str()) {
                return self.attributed(text);
            }
        }

        if let Some(client) = llm {
            match client.complete(&self.build_prompt(query)).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    return self.attributed(reply.trim());
                }
                Ok(_) => {
                    debug!(role = %self.profile.role, "collaborator returned an empty reply");
                }
                Err(error) => {
                    debug!(role = %self.profile.role, %error, "collaborator call failed");
                }
            }
        }

        format!(
            "[{}] I can provide clear information about {}. Could you please rephrase your \
             question using one of these keywords?",
            self.profile.identity,
            self.profile.topics().join(", "),
        )
    }

    pub async fn respond(&self, query: &str, llm: Option<&dyn LlmClient>) -> AgentReply {
        if let Some(violation) = self.guard(query) {
            return AgentReply {
                response: violation.refusal,
                violation: true,
                trigger_term: Some(violation.term),
            };
        }

        AgentReply { response: self.answer(query, llm).await, violation: false, trigger_term: None }
    }

    fn attributed(&self, text: &str) -> String {
        format!("[{}] {text}", self.profile.identity)
    }

    /// Bounded instruction for the external collaborator: identity, allowed
    /// topics, the knowledge content, the banned list, and a stay-in-scope
    /// directive, followed by the user question verbatim.
    fn build_prompt(&self, query: &str) -> String {
        let knowledge = self
            .profile
            .knowledge
            .iter()
            .map(|(topic, text)| format!("- {topic}: {text}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "You are the {identity}. {description}\n\
             Your expertise is ONLY: {topics}.\n\
             Base your answer on this knowledge:\n{knowledge}\n\
             DO NOT mention anything about {banned}.\n\
             Stay within your allowed topics. Be professional and clear.\n\n\
             User question: {query}",
            identity = self.profile.identity,
            description = self.profile.description,
            topics = self.profile.topics().join(", "),
            banned = self.profile.banned.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use leadgate_core::profile::ProfileRegistry;
    use leadgate_core::RoleTag;

    use crate::llm::LlmClient;

    use super::RoleAgent;

    struct FixedClient(&'static str);

    #[async_trait]
    impl LlmClient for FixedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Err(anyhow!("endpoint unavailable"))
        }
    }

    struct EmptyClient;

    #[async_trait]
    impl LlmClient for EmptyClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(String::new())
        }
    }

    fn registry() -> ProfileRegistry {
        ProfileRegistry::default()
    }

    #[tokio::test]
    async fn banned_term_is_refused_and_named() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("CHANNEL_PARTNER")).expect("profile");
        let agent = RoleAgent::new(profile);

        let reply = agent.respond("what is the pricing for a 2BHK", None).await;
        assert!(reply.violation);
        assert_eq!(reply.trigger_term.as_deref(), Some("pricing"));
        assert!(reply.response.contains("'pricing'"));
        assert!(reply.response.contains("commission"), "refusal lists the allowed topics");
    }

    #[tokio::test]
    async fn guard_beats_topic_match_when_both_occur() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("SITE_VISIT")).expect("profile");
        let agent = RoleAgent::new(profile);

        // "schedule" is an allowed topic, "pricing" is banned. The guard
        // always runs first, so this must refuse.
        let reply = agent.respond("can we discuss pricing during the schedule?", None).await;
        assert!(reply.violation);
        assert_eq!(reply.trigger_term.as_deref(), Some("pricing"));
    }

    #[tokio::test]
    async fn topic_match_returns_fixed_text_with_attribution() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("BUYER")).expect("profile");
        let agent = RoleAgent::new(profile);

        let reply = agent.respond("tell me about the emi options", None).await;
        assert!(!reply.violation);
        assert_eq!(reply.trigger_term, None);
        assert_eq!(
            reply.response,
            format!("[{}] {}", profile.identity, profile.knowledge["emi"]),
        );
    }

    #[tokio::test]
    async fn topic_match_wins_over_available_collaborator() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("BUYER")).expect("profile");
        let agent = RoleAgent::new(profile);
        let client = FixedClient("generated text that must not be used");

        let reply = agent.respond("tell me about the emi options", Some(&client)).await;
        assert_eq!(
            reply.response,
            format!("[{}] {}", profile.identity, profile.knowledge["emi"]),
        );
    }

    #[tokio::test]
    async fn collaborator_reply_is_used_for_open_questions() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("ENQUIRY")).expect("profile");
        let agent = RoleAgent::new(profile);
        let client = FixedClient("We hand over homes with a 30-day quality audit.");

        let reply = agent.respond("how do handovers work", Some(&client)).await;
        assert!(!reply.violation);
        assert_eq!(
            reply.response,
            format!("[{}] We hand over homes with a 30-day quality audit.", profile.identity),
        );
    }

    #[tokio::test]
    async fn collaborator_failure_degrades_to_fallback() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("ENQUIRY")).expect("profile");
        let agent = RoleAgent::new(profile);

        let clients: [&dyn LlmClient; 2] = [&FailingClient, &EmptyClient];
        for client in clients {
            let reply = agent.respond("how do handovers work", Some(client)).await;
            assert!(!reply.violation);
            assert!(
                reply.response.contains("rephrase your question"),
                "fallback text expected, got: {}",
                reply.response
            );
        }
    }

    #[tokio::test]
    async fn fallback_lists_allowed_topics_without_collaborator() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("SITE_VISIT")).expect("profile");
        let agent = RoleAgent::new(profile);

        let reply = agent.respond("something entirely unrelated", None).await;
        assert!(!reply.violation);
        for topic in profile.topics() {
            assert!(reply.response.contains(topic), "fallback should list topic {topic}");
        }
    }

    #[test]
    fn prompt_is_bounded_by_the_profile() {
        let registry = registry();
        let profile = registry.get(&RoleTag::new("BUYER")).expect("profile");
        let agent = RoleAgent::new(profile);

        let prompt = agent.build_prompt("is there a gym");
        assert!(prompt.contains(&profile.identity));
        assert!(prompt.contains("DO NOT mention anything about"));
        assert!(prompt.contains("commission"), "banned list is in the prompt");
        assert!(prompt.contains("emi:"), "knowledge content is in the prompt");
        assert!(prompt.ends_with("User question: is there a gym"));
    }
}
