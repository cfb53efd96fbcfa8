use std::time::Duration;

use leadgate_agent::{LlmClient, OllamaClient, RouteOutcome, Router};
use leadgate_core::audit::{AuditRecord, AuditTrail};
use leadgate_core::config::{AppConfig, LoadOptions};
use leadgate_core::RoleTag;
use leadgate_store::{lookup_role_by_phone, JsonAuditTrail};
use serde::Serialize;
use tracing::warn;

use super::{load_profiles, CommandResult};

#[derive(Debug, Serialize)]
struct AskPayload {
    command: &'static str,
    status: &'static str,
    role: String,
    response: String,
    violation: bool,
    trigger_term: Option<String>,
}

pub fn run(role: Option<&str>, phone: Option<&str>, query: &str, json: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("ask", "config_validation", error.to_string(), 2)
        }
    };

    let role = match (role, phone) {
        (Some(role), _) => RoleTag::new(role.trim().to_uppercase()),
        (None, Some(phone)) => lookup_role_by_phone(&config.data.output_csv, phone),
        (None, None) => {
            return CommandResult::failure(
                "ask",
                "bad_arguments",
                "provide --role or --phone to select a knowledge scope",
                2,
            )
        }
    };

    let registry = match load_profiles(&config) {
        Ok(registry) => registry,
        Err(error) => return CommandResult::failure("ask", "profiles_table", error, 2),
    };

    let mut router = Router::new(registry);
    if config.llm.enabled {
        match build_llm(&config) {
            Some(client) => router = router.with_llm(client),
            // Routing still works without the collaborator; only open-ended
            // expansion is lost.
            None => warn!("llm is enabled but the client could not be built, continuing without"),
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        }
    };

    let outcome = runtime.block_on(router.route(&role, query));

    let trail = JsonAuditTrail::new(&config.data.audit_log);
    let record = AuditRecord::interaction(
        outcome.role.clone(),
        query,
        outcome.response.clone(),
        outcome.violation,
    );
    if let Err(error) = trail.append(record) {
        return CommandResult::failure("ask", "audit_store", error.to_string(), 3);
    }

    render(&outcome, json)
}

fn build_llm(config: &AppConfig) -> Option<Box<dyn LlmClient>> {
    let client = OllamaClient::new(
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    );

    match client {
        Ok(client) => {
            let client = match config.llm.api_key.clone() {
                Some(api_key) => client.with_api_key(api_key),
                None => client,
            };
            Some(Box::new(client))
        }
        Err(error) => {
            warn!(%error, "could not build completion client");
            None
        }
    }
}

fn render(outcome: &RouteOutcome, json: bool) -> CommandResult {
    if json {
        let payload = AskPayload {
            command: "ask",
            status: "ok",
            role: outcome.role.to_string(),
            response: outcome.response.clone(),
            violation: outcome.violation,
            trigger_term: outcome.trigger_term.clone(),
        };
        let output = serde_json::to_string(&payload)
            .unwrap_or_else(|error| format!("{{\"status\":\"error\",\"message\":\"{error}\"}}"));
        return CommandResult { exit_code: 0, output };
    }

    CommandResult { exit_code: 0, output: outcome.response.clone() }
}
