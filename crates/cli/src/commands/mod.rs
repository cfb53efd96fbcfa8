pub mod ask;
pub mod classify;
pub mod config;
pub mod doctor;
pub mod lookup;
pub mod report_mismatch;

use leadgate_core::classify::RuleSet;
use leadgate_core::config::AppConfig;
use leadgate_core::profile::ProfileRegistry;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Rule table per config: the declarative file when one is configured,
/// otherwise the shipped defaults.
pub(crate) fn load_rules(config: &AppConfig) -> Result<RuleSet, String> {
    match &config.data.rules_file {
        Some(path) => RuleSet::load(path).map_err(|error| error.to_string()),
        None => Ok(RuleSet::default()),
    }
}

/// Profile table per config, same source precedence as the rules.
pub(crate) fn load_profiles(config: &AppConfig) -> Result<ProfileRegistry, String> {
    match &config.data.profiles_file {
        Some(path) => ProfileRegistry::load(path).map_err(|error| error.to_string()),
        None => Ok(ProfileRegistry::default()),
    }
}
