use leadgate_core::config::{AppConfig, LoadOptions};
use leadgate_store::JsonAuditTrail;
use serde::Serialize;

use super::{load_profiles, load_rules};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rules(&config));
            checks.push(check_profiles(&config));
            checks.push(check_audit_store(&config));
            checks.push(check_llm(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["rule_table", "profile_table", "audit_store", "llm_readiness"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_ok =
        checks.iter().all(|check| matches!(check.status, CheckStatus::Pass | CheckStatus::Skipped));
    let any_pass = checks.iter().any(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_ok && any_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if overall_status == CheckStatus::Pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rules(config: &AppConfig) -> DoctorCheck {
    match load_rules(config) {
        Ok(rules) => DoctorCheck {
            name: "rule_table",
            status: CheckStatus::Pass,
            details: format!(
                "{} rules loaded (fallback role: {})",
                rules.len(),
                rules.fallback()
            ),
        },
        Err(error) => DoctorCheck { name: "rule_table", status: CheckStatus::Fail, details: error },
    }
}

fn check_profiles(config: &AppConfig) -> DoctorCheck {
    match load_profiles(config) {
        Ok(registry) => DoctorCheck {
            name: "profile_table",
            status: CheckStatus::Pass,
            details: format!(
                "{} role profiles loaded: {}",
                registry.len(),
                registry.roles().iter().map(|role| role.as_str()).collect::<Vec<_>>().join(", ")
            ),
        },
        Err(error) => {
            DoctorCheck { name: "profile_table", status: CheckStatus::Fail, details: error }
        }
    }
}

fn check_audit_store(config: &AppConfig) -> DoctorCheck {
    let trail = JsonAuditTrail::new(&config.data.audit_log);
    let records = trail.read_all();
    DoctorCheck {
        name: "audit_store",
        status: CheckStatus::Pass,
        details: format!(
            "{} records readable at `{}` (missing or corrupt stores reinitialize on append)",
            records.len(),
            config.data.audit_log.display()
        ),
    }
}

fn check_llm(config: &AppConfig) -> DoctorCheck {
    if !config.llm.enabled {
        return DoctorCheck {
            name: "llm_readiness",
            status: CheckStatus::Skipped,
            details: "llm is disabled; routing uses fixed knowledge and fallbacks only"
                .to_string(),
        };
    }

    DoctorCheck {
        name: "llm_readiness",
        status: CheckStatus::Pass,
        details: format!(
            "endpoint configured: {} (model `{}`, not probed)",
            config.llm.base_url, config.llm.model
        ),
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
